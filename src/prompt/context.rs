use std::fmt::Write;

use crate::catalog::TourRecord;
use crate::catalog::price::summarize_prices;
use crate::language::Language;

pub const CONTEXT_HEADER: &str = "--- Relevant Tour Information ---";
pub const ITINERARY_PREVIEW_CHARS: usize = 150;

const NO_TITLE: &str = "No title";
const NO_DESCRIPTION: &str = "No description";
const NO_ITINERARY: &str = "No itinerary provided.";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() { placeholder } else { value }
}

/// First [`ITINERARY_PREVIEW_CHARS`] characters, with `...` when cut
fn itinerary_preview(itinerary: Option<&str>) -> String {
    let text = itinerary
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NO_ITINERARY);

    let mut preview: String = text.chars().take(ITINERARY_PREVIEW_CHARS).collect();
    if text.chars().count() > ITINERARY_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Render the selected records as the context block of the final prompt turn
#[must_use]
pub fn format_context(records: &[&TourRecord], language: Language) -> String {
    let profile = language.profile();
    if records.is_empty() {
        return profile.no_tours_message.to_string();
    }

    let mut out = String::from(CONTEXT_HEADER);
    for record in records {
        let marker = if record.is_specialty() {
            profile.specialty_marker
        } else {
            ""
        };
        let url = &record.booking_url;

        // writing to a String cannot fail
        let _ = write!(
            out,
            "\n\n🎯 Tour: {}{}\n\
             Priority: {}/5 (1=highest priority)\n\
             Description: {}\n\
             Brief Itinerary: {}\n\
             Prices per person: {}\n\
             Booking URL: {}\n\
             IMPORTANT: Make URL clickable as: [{}]({})",
            or_placeholder(&record.title, NO_TITLE),
            marker,
            record.priority_rank,
            or_placeholder(&record.description, NO_DESCRIPTION),
            itinerary_preview(record.itinerary_summary.as_deref()),
            summarize_prices(record.price_range_table.as_deref()),
            url,
            profile.link_label,
            url,
        );
    }
    out
}
