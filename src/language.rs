//! Supported conversation languages and their fixed response material
//!
//! Every [`Language`] resolves to one fully-populated [`LanguageProfile`].
//! Unknown tags never index into an absent profile: they are either rejected
//! ([`Language::from_tag`]) or normalized to a configured default
//! ([`Language::resolve_or`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, TourChatError};

/// Language the catalog is indexed in.
pub const CATALOG_LANGUAGE: Language = Language::En;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Es, Language::En];

    /// Parse a two-letter tag, rejecting anything without a profile
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            _ => Err(TourChatError::unsupported_language(tag)),
        }
    }

    /// Resolve an optional caller-supplied tag, falling back to `default`
    /// for missing or unknown tags.
    #[must_use]
    pub fn resolve_or(tag: Option<&str>, default: Language) -> Self {
        match tag {
            Some(tag) => Self::from_tag(tag).unwrap_or_else(|_| {
                tracing::debug!("Unknown language tag '{}', using '{}'", tag, default);
                default
            }),
            None => default,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// English name, used inside prompts sent to the model
    #[must_use]
    pub fn english_name(self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::En => "English",
        }
    }

    #[must_use]
    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            Language::Es => &SPANISH,
            Language::En => &ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = TourChatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

/// Final user-turn templates, one per prompt branch.
///
/// Placeholders: `{destinations}`, `{context}`, `{question}`.
#[derive(Debug)]
pub struct PromptTemplates {
    pub general_first_turn: &'static str,
    pub specialty_destination: &'static str,
    pub specific_with_context: &'static str,
    pub fallback_general: &'static str,
}

/// Static per-language configuration
#[derive(Debug)]
pub struct LanguageProfile {
    pub stopwords: &'static [&'static str],
    /// Ordered generic travel-inquiry patterns, matched against lower-cased text
    pub general_patterns: &'static [&'static str],
    pub system_instruction: &'static str,
    pub greeting: &'static str,
    /// Model turn injected when the session already has history
    pub continuation: &'static str,
    pub error_message: &'static str,
    pub no_tours_message: &'static str,
    pub general_response: &'static str,
    pub specialty_nudge: &'static str,
    /// Appended to tour titles in the context block
    pub specialty_marker: &'static str,
    /// Label for markdown booking links
    pub link_label: &'static str,
    pub templates: PromptTemplates,
}

impl LanguageProfile {
    #[must_use]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word)
    }

    /// Names of any empty fields; an empty list means the profile is complete
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("system_instruction", self.system_instruction),
            ("greeting", self.greeting),
            ("continuation", self.continuation),
            ("error_message", self.error_message),
            ("no_tours_message", self.no_tours_message),
            ("general_response", self.general_response),
            ("specialty_nudge", self.specialty_nudge),
            ("specialty_marker", self.specialty_marker),
            ("link_label", self.link_label),
            ("templates.general_first_turn", self.templates.general_first_turn),
            ("templates.specialty_destination", self.templates.specialty_destination),
            ("templates.specific_with_context", self.templates.specific_with_context),
            ("templates.fallback_general", self.templates.fallback_general),
        ];

        let mut missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if self.stopwords.is_empty() {
            missing.push("stopwords");
        }
        if self.general_patterns.is_empty() {
            missing.push("general_patterns");
        }
        missing
    }
}

static SPANISH: LanguageProfile = LanguageProfile {
    stopwords: &[
        "de", "a", "el", "la", "los", "las", "un", "una", "y", "o", "pero", "con", "para", "qué",
        "quiero", "tienes", "hay", "es",
    ],
    general_patterns: &[
        r"\b(info|información)\s+(sobre\s+)?tours?\b",
        r"\btours?\s+(disponibles?|que\s+tienen?)\b",
        r"\bqué\s+tours?\s+(hay|tienen|ofrecen)\b",
        r"\bque\s+actividades?\s+(hay|tienen|ofrecen)\b",
        r"\bque\s+hacer\s+en\s+(perú|peru)\b",
        r"\bturismo\s+en\s+(perú|peru)\b",
        r"^(hola|hello|buenos?\s+días?|buenas?\s+tardes?)",
        r"\bpaquetes?\s+turísticos?\b",
        r"\brecomendaciones?\b",
    ],
    system_instruction: "Eres un asistente de viajes especializado de IncaLake, una agencia peruana experta en Puno y Lago Titicaca. 🏔️ Utiliza emojis para hacer la conversación más amena.\n\n\
🎯 ESPECIALIZACIÓN DE INCALAKE:\n\
1. DESTINO PRINCIPAL: Puno y Lago Titicaca (nuestra especialidad) 🌊\n\
2. Destinos secundarios: Bolivia, Arequipa, Cusco\n\
3. Siempre prioriza tours con 'prioridad' más baja (1 = máxima prioridad, 5 = mínima)\n\
4. Para experiencias auténticas, sugiere homestays o tours de 2d1n\n\n\
📝 FLUJO DE CONVERSACIÓN:\n\
- Los datos de contacto ya fueron recolectados previamente ✅\n\
- Para consultas GENERALES, pregunta: '¿Para qué fecha planeas viajar y cuántas personas van?' 🗓️👥\n\
- Para consultas ESPECÍFICAS, usa 'Relevant Tour Information' y luego consulta fecha/personas si es necesario\n\
- SIEMPRE recomienda Puno/Titicaca como primera opción cuando sea relevante\n\n\
🌊 INFORMACIÓN CLAVE DE PUNO:\n\
- Lago Titicaca: 3,812 msnm - Recomendamos 1 día de aclimatación en Puno\n\
- Menciona nuestras islas especializadas: Uros, Taquile, Amantani\n\
- Destaca experiencias únicas como homestays con familias locales\n\n\
💰 PRESENTACIÓN DE TOURS:\n\
- SIEMPRE incluye URL clickeable: [Ver más información](URL_COMPLETA)\n\
- Consulta 'Prices per person' para rangos exactos\n\
- Máximo 3 párrafos, sé conciso y directo\n\
- Formato: título, descripción breve, precios, URL clickeable\n\n\
🚀 PROCESO DE RESERVA:\n\
Para reservar, comparte la URL clickeable e indica:\n\
1️⃣ Seleccionar fecha del tour\n\
2️⃣ Elegir hora de inicio\n\
3️⃣ Indicar número de personas\n\
4️⃣ Presionar 'Comprar' y completar pago\n\
⚠️ Si hay algún percance o la opción 'Comprar' no funciona, contactar WhatsApp +51982769453\n\n\
❓ CONSULTAS ESPECIALES:\n\
Para reservas existentes, documentos sensibles o consultas complejas:\n\
'Para este tipo de consulta tan específica, uno de mis compañeros humanos te ayudará. En breve se pondrán en contacto contigo. Si prefieres, puedes escribirnos directamente a nuestro WhatsApp +51982769453 para una atención inmediata.' 📞\n\n\
🌐 Para recomendaciones generales, usa información del blog incalake.com/blog\n\
⚠️ NUNCA redirijas a otras agencias de viajes",
    greeting: "¡Hola! 👋 Soy tu asistente especializado de IncaLake. ¿En qué aventura por Puno y el Lago Titicaca te puedo ayudar hoy? 🌊✨",
    continuation: "¡Hola de nuevo! ¿En qué más te puedo ayudar? 😊",
    error_message: "Lo siento, ocurrió un error en el servidor. Por favor, intenta más tarde o contáctanos al +51982769453 😔",
    no_tours_message: "No encontré información específica para esa consulta, pero puedo ayudarte con nuestros tours en Puno y Lago Titicaca 🌊",
    general_response: "¡Perfecto! 🎉 Como especialistas en Puno y Lago Titicaca, tenemos las mejores experiencias:\n\n\
🌊 **PUNO - LAGO TITICACA** (Nuestra especialidad):\n\
• Islas Flotantes de los Uros - Experiencia única en totora 🛶\n\
• Isla Taquile - Cultura viva y textilería ancestral 🧵\n\
• Isla Amantani - Homestays auténticos con familias locales 🏠\n\
• Tours de 2d1n para experiencias completas\n\
*Altitud: 3,812 msnm - Recomendamos 1 día de aclimatación*\n\n\
🌟 **Otros destinos disponibles**:\n\
🧂 Bolivia: Salar de Uyuni | 🌋 Arequipa: Cañón del Colca | 🏛️ Cusco: Machu Picchu\n\n\
Para recomendarte la experiencia perfecta: **¿Para qué fecha planeas viajar y cuántas personas van?** 📅👥",
    specialty_nudge: "🌊 Como especialistas en Puno y Lago Titicaca, te recomiendo especialmente nuestros tours a las islas. ¿Te interesan las experiencias en Uros, Taquile o Amantani?",
    specialty_marker: " ⭐ (NUESTRA ESPECIALIDAD)",
    link_label: "Ver más información",
    templates: PromptTemplates {
        general_first_turn: "CONSULTA GENERAL - PRIMERA INTERACCIÓN. Especialidad: Puno/Titicaca. Otros destinos: {destinations}. Necesita consultar fecha y número de personas.\n\nUser Question: {question}",
        specialty_destination: "CONSULTA ESPECÍFICA SOBRE PUNO/TITICACA (nuestra especialidad) 🌊:\n{context}\n\nRecuerda mencionar nuestra experiencia especializada en esta región.\n\nUser Question: {question}",
        specific_with_context: "{context}\n\nSi es relevante, menciona también nuestros tours especialidad en Puno/Titicaca.\n\nUser Question: {question}",
        fallback_general: "Consulta general. Recuerda que somos especialistas en Puno/Titicaca. Necesita fecha y número de personas.\n\nUser Question: {question}",
    },
};

static ENGLISH: LanguageProfile = LanguageProfile {
    stopwords: &[
        "the", "a", "an", "and", "or", "but", "with", "for", "what", "want", "have", "is", "are",
        "to", "of", "in", "on", "at",
    ],
    general_patterns: &[
        r"\binfo\s+(about\s+)?tours?\b",
        r"\btours?\s+(available|you\s+have)\b",
        r"\bwhat\s+tours?\s+(do\s+you\s+have|are\s+available)\b",
        r"\bwhat\s+activities?\s+(do\s+you\s+have|are\s+available)\b",
        r"\bwhat\s+to\s+do\s+in\s+peru\b",
        r"\btourism\s+in\s+peru\b",
        r"^(hi|hello|good\s+morning|good\s+afternoon)",
        r"\btravel\s+packages?\b",
        r"\brecommendations?\b",
    ],
    system_instruction: "You are a specialized travel assistant for IncaLake, a Peruvian agency expert in Puno and Lake Titicaca. 🏔️ Use emojis to make conversations more enjoyable.\n\n\
🎯 INCALAKE SPECIALIZATION:\n\
1. MAIN DESTINATION: Puno and Lake Titicaca (our specialty) 🌊\n\
2. Secondary destinations: Bolivia, Arequipa, Cusco\n\
3. Always prioritize tours with lower 'priority' numbers (1 = highest priority, 5 = lowest)\n\
4. For authentic experiences, suggest homestays or 2d1n tours\n\n\
📝 CONVERSATION FLOW:\n\
- Contact information was already collected previously ✅\n\
- For GENERAL queries, ask: 'What date are you planning to travel and how many people are going?' 🗓️👥\n\
- For SPECIFIC queries, use 'Relevant Tour Information' then ask for date/people if needed\n\
- ALWAYS recommend Puno/Titicaca as first option when relevant\n\n\
🌊 KEY PUNO INFORMATION:\n\
- Lake Titicaca: 3,812 masl - We recommend 1 day acclimatization in Puno\n\
- Mention our specialized islands: Uros, Taquile, Amantani\n\
- Highlight unique experiences like homestays with local families\n\n\
💰 TOUR PRESENTATION:\n\
- ALWAYS include clickable URL: [More information](COMPLETE_URL)\n\
- Check 'Prices per person' for exact ranges\n\
- Maximum 3 paragraphs, be concise and direct\n\
- Format: title, brief description, prices, clickable URL\n\n\
🚀 BOOKING PROCESS:\n\
To book, share clickable URL and indicate:\n\
1️⃣ Select tour date\n\
2️⃣ Choose start time\n\
3️⃣ Indicate number of people\n\
4️⃣ Press 'Buy' and complete payment\n\
⚠️ If there's any issue or 'Buy' option doesn't work, contact WhatsApp +51982769453\n\n\
❓ SPECIAL QUERIES:\n\
For existing bookings, sensitive documents or complex queries:\n\
'For this specific type of query, one of my human colleagues will help you. They will contact you shortly. If you prefer, you can write directly to our WhatsApp +51982769453 for immediate assistance.' 📞\n\n\
🌐 For general recommendations, use information from incalake.com/blog\n\
⚠️ NEVER redirect to other travel agencies",
    greeting: "Hello! 👋 I'm your specialized IncaLake assistant. What Puno and Lake Titicaca adventure can I help you with today? 🌊✨",
    continuation: "Hello again! How else can I help you? 😊",
    error_message: "Sorry, a server error occurred. Please try again later or contact us at +51982769453 😔",
    no_tours_message: "I couldn't find specific information for that query, but I can help you with our Puno and Lake Titicaca tours 🌊",
    general_response: "Perfect! 🎉 As specialists in Puno and Lake Titicaca, we have the best experiences:\n\n\
🌊 **PUNO - LAKE TITICACA** (Our specialty):\n\
• Floating Islands of Uros - Unique totora reed experience 🛶\n\
• Taquile Island - Living culture and ancestral textiles 🧵\n\
• Amantani Island - Authentic homestays with local families 🏠\n\
• 2d1n tours for complete experiences\n\
*Altitude: 3,812 masl - We recommend 1 day acclimatization*\n\n\
🌟 **Other available destinations**:\n\
🧂 Bolivia: Uyuni Salt Flats | 🌋 Arequipa: Colca Canyon | 🏛️ Cusco: Machu Picchu\n\n\
To recommend the perfect experience: **What date are you planning to travel and how many people are going?** 📅👥",
    specialty_nudge: "🌊 As specialists in Puno and Lake Titicaca, I especially recommend our island tours. Are you interested in experiences at Uros, Taquile or Amantani?",
    specialty_marker: " ⭐ (OUR SPECIALTY)",
    link_label: "More information",
    templates: PromptTemplates {
        general_first_turn: "GENERAL QUERY - FIRST INTERACTION. Specialty: Puno/Titicaca. Other destinations: {destinations}. Need to ask for date and number of people.\n\nUser Question: {question}",
        specialty_destination: "SPECIFIC QUERY ABOUT PUNO/TITICACA (our specialty) 🌊:\n{context}\n\nRemember to mention our specialized experience in this region.\n\nUser Question: {question}",
        specific_with_context: "{context}\n\nIf relevant, also mention our specialty tours in Puno/Titicaca.\n\nUser Question: {question}",
        fallback_general: "General query. Remember we are specialists in Puno/Titicaca. Need date and number of people.\n\nUser Question: {question}",
    },
};
