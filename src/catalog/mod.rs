//! Tour catalog
//!
//! The catalog is loaded once at startup (see [`loader`]) and shared
//! read-only behind an `Arc<Catalog>` for the lifetime of the process.

pub mod destinations;
pub mod loader;
pub mod price;

pub use destinations::{Destination, DestinationSummary, SPECIALTY_QUERY_TERMS, SPECIALTY_TERMS};
pub use loader::CatalogLoader;
pub use price::{PRICE_ON_REQUEST, PriceTable};

use serde::Serialize;

/// Lowest priority a tour can carry; also the default when the source omits it.
pub const LOWEST_PRIORITY: u8 = 5;
pub const HIGHEST_PRIORITY: u8 = 1;

/// One bookable tour. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourRecord {
    pub title: String,
    pub service_type: String,
    pub description: String,
    pub itinerary_summary: Option<String>,
    pub booking_url: String,
    /// 1 (highest) ..= 5 (lowest)
    pub priority_rank: u8,
    /// Raw `precios_rango` payload; parsed lazily by [`PriceTable::parse`]
    pub price_range_table: Option<String>,
}

impl TourRecord {
    /// Weight contributed by the priority rank: rank 1 gives 5, rank 5 gives 1.
    #[must_use]
    pub fn priority_weight(&self) -> i32 {
        6 - i32::from(self.priority_rank)
    }

    /// Lower-cased `title + service type + description`, the text searched by the ranker
    #[must_use]
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title, self.service_type, self.description
        )
        .to_lowercase()
    }

    /// Whether the title or description mentions the flagship region
    #[must_use]
    pub fn is_specialty(&self) -> bool {
        let text = format!("{}{}", self.title, self.description).to_lowercase();
        destinations::mentions_specialty(&text)
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    tours: Vec<TourRecord>,
}

impl Catalog {
    #[must_use]
    pub fn new(tours: Vec<TourRecord>) -> Self {
        Self { tours }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tours(&self) -> &[TourRecord] {
        &self.tours
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// Destinations with at least one tour, sorted by name
    #[must_use]
    pub fn destinations(&self) -> Vec<Destination> {
        let mut found: Vec<Destination> = Destination::ALL
            .into_iter()
            .filter(|destination| self.tours.iter().any(|tour| destination.covers(tour)))
            .collect();
        found.sort_by_key(|destination| destination.name());
        found
    }

    #[must_use]
    pub fn destination_names(&self) -> Vec<String> {
        self.destinations()
            .into_iter()
            .map(|destination| destination.name().to_string())
            .collect()
    }

    #[must_use]
    pub fn tour_count(&self, destination: Destination) -> usize {
        self.tours
            .iter()
            .filter(|tour| destination.covers(tour))
            .count()
    }

    #[must_use]
    pub fn destination_summaries(&self) -> Vec<DestinationSummary> {
        self.destinations()
            .into_iter()
            .map(|destination| DestinationSummary {
                destination: destination.name().to_string(),
                tour_count: self.tour_count(destination),
            })
            .collect()
    }
}
