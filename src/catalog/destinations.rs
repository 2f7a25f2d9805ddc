use serde::Serialize;

use super::TourRecord;

/// Flagship-region terms searched for inside catalog text
pub const SPECIALTY_TERMS: &[&str] = &["puno", "titicaca", "uros", "taquile", "amantani"];

/// Flagship-region terms recognised in user utterances
pub const SPECIALTY_QUERY_TERMS: &[&str] = &[
    "puno",
    "titicaca",
    "uros",
    "taquile",
    "amantani",
    "floating islands",
    "islas flotantes",
];

/// `text` must already be lower-cased
#[must_use]
pub fn mentions_specialty(text: &str) -> bool {
    SPECIALTY_TERMS.iter().any(|term| text.contains(term))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Puno,
    Cusco,
    Arequipa,
    Uyuni,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationSummary {
    pub destination: String,
    pub tour_count: usize,
}

impl Destination {
    pub const ALL: [Destination; 4] = [
        Destination::Puno,
        Destination::Cusco,
        Destination::Arequipa,
        Destination::Uyuni,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Destination::Puno => "Puno",
            Destination::Cusco => "Cusco",
            Destination::Arequipa => "Arequipa",
            Destination::Uyuni => "Uyuni",
        }
    }

    fn terms(self) -> &'static [&'static str] {
        match self {
            Destination::Puno => SPECIALTY_TERMS,
            Destination::Cusco => &["cusco", "machu picchu", "sacred valley"],
            Destination::Arequipa => &["arequipa", "colca", "canyon"],
            Destination::Uyuni => &["uyuni", "salar", "bolivia"],
        }
    }

    /// Matches against title and service type only
    #[must_use]
    pub fn covers(self, tour: &TourRecord) -> bool {
        let text = format!("{} {}", tour.title, tour.service_type).to_lowercase();
        self.terms().iter().any(|term| text.contains(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::tour;
    use rstest::rstest;

    #[rstest]
    #[case("Sacred Valley Full Day", Destination::Cusco)]
    #[case("Colca Canyon 2 days", Destination::Arequipa)]
    #[case("Salar de Uyuni", Destination::Uyuni)]
    #[case("Uros floating islands", Destination::Puno)]
    fn test_destination_covers_title(#[case] title: &str, #[case] destination: Destination) {
        assert!(destination.covers(&tour(title, "", "", 3)));
    }

    #[test]
    fn test_destination_ignores_description() {
        let t = tour("City tour", "Half day", "Views of Lake Titicaca", 3);
        assert!(!Destination::Puno.covers(&t));
    }

    #[test]
    fn test_query_terms_extend_catalog_terms() {
        for term in SPECIALTY_TERMS {
            assert!(SPECIALTY_QUERY_TERMS.contains(term));
        }
        assert!(mentions_specialty("day trip to taquile"));
        assert!(!mentions_specialty("floating islands"));
    }
}
