//! Catalog Loading Module
//!
//! Reads the tour export once at startup. A missing or unreadable file
//! yields an empty catalog; individual malformed entries are skipped.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{Catalog, HIGHEST_PRIORITY, LOWEST_PRIORITY, TourRecord};
use crate::{Result, TourChatError};

/// Tour entry as exported by the booking site
#[derive(Debug, Deserialize)]
struct RawTour {
    titulo_producto: Option<String>,
    tipo_servicio: Option<String>,
    descripcion_tab: Option<String>,
    itinerario_ta: Option<String>,
    url_servicio: Option<String>,
    prioridad: Option<Value>,
    precios_rango: Option<Value>,
}

impl RawTour {
    fn into_record(self) -> TourRecord {
        TourRecord {
            title: self.titulo_producto.unwrap_or_default(),
            service_type: self.tipo_servicio.unwrap_or_default(),
            description: self.descripcion_tab.unwrap_or_default(),
            itinerary_summary: self.itinerario_ta,
            booking_url: self.url_servicio.unwrap_or_default(),
            priority_rank: parse_priority(self.prioridad.as_ref()),
            price_range_table: self.precios_rango.and_then(|value| match value {
                Value::Null => None,
                Value::String(raw) => Some(raw),
                other => Some(other.to_string()),
            }),
        }
    }
}

/// Clamp into 1..=5; anything unreadable counts as lowest priority
fn parse_priority(value: Option<&Value>) -> u8 {
    let rank = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match rank {
        Some(rank) => rank.clamp(i64::from(HIGHEST_PRIORITY), i64::from(LOWEST_PRIORITY)) as u8,
        None => LOWEST_PRIORITY,
    }
}

/// Loader for the tour catalog
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load the catalog, degrading to an empty one on any failure
    pub fn load<P: AsRef<Path>>(path: P) -> Catalog {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(tours) => {
                info!("✅ {} tours loaded from {}", tours.len(), path.display());
                Catalog::new(tours)
            }
            Err(e) => {
                error!("❌ Could not load tours from {}: {}", path.display(), e);
                Catalog::empty()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Vec<TourRecord>> {
        if !path.exists() {
            return Err(TourChatError::config(format!(
                "catalog file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    /// Parse a JSON array of tour entries
    pub fn parse_json(content: &str) -> Result<Vec<TourRecord>> {
        let entries: Vec<Value> = serde_json::from_str(content)
            .map_err(|e| TourChatError::config(format!("catalog is not a JSON array: {e}")))?;

        let mut tours = Vec::with_capacity(entries.len());
        let mut parse_errors = 0;

        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<RawTour>(entry) {
                Ok(raw) => tours.push(raw.into_record()),
                Err(e) => {
                    warn!("Skipping catalog entry {}: {}", index, e);
                    parse_errors += 1;
                }
            }
        }

        debug!(
            "Parsed {} tours ({} parse errors)",
            tours.len(),
            parse_errors
        );
        Ok(tours)
    }
}
