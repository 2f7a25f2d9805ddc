//! Per-person price tables carried in the `precios_rango` catalog field.
//!
//! The field is a JSON-encoded object with three parallel arrays:
//! `{"desde": [1, 5], "hasta": [4, 10], "precio": [50, 40]}`.

use serde::Deserialize;
use serde_json::Value;

use crate::{Result, TourChatError};

pub const PRICE_ON_REQUEST: &str = "Price on request.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceTable {
    #[serde(rename = "desde")]
    pub from_people: Vec<Value>,
    #[serde(rename = "hasta")]
    pub to_people: Vec<Value>,
    #[serde(rename = "precio")]
    pub price: Vec<Value>,
}

impl PriceTable {
    pub fn parse(raw: &str) -> Result<Self> {
        let table: PriceTable = serde_json::from_str(raw)
            .map_err(|e| TourChatError::validation(format!("malformed price table: {e}")))?;

        if table.from_people.len() != table.to_people.len()
            || table.to_people.len() != table.price.len()
        {
            return Err(TourChatError::validation(format!(
                "price table arrays differ in length ({}/{}/{})",
                table.from_people.len(),
                table.to_people.len(),
                table.price.len()
            )));
        }
        if table.price.is_empty() {
            return Err(TourChatError::validation("price table is empty"));
        }

        Ok(table)
    }

    /// `For 1-4 people: $50 USD | For 5-10 people: $40 USD`
    #[must_use]
    pub fn summary(&self) -> String {
        self.from_people
            .iter()
            .zip(&self.to_people)
            .zip(&self.price)
            .map(|((from, to), price)| {
                format!(
                    "For {}-{} people: ${} USD",
                    render_value(from),
                    render_value(to),
                    render_value(price)
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Renders a record's price field, degrading to [`PRICE_ON_REQUEST`] on any problem.
#[must_use]
pub fn summarize_prices(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return PRICE_ON_REQUEST.to_string();
    };

    match PriceTable::parse(raw) {
        Ok(table) => table.summary(),
        Err(e) => {
            tracing::debug!("Falling back to price on request: {}", e);
            PRICE_ON_REQUEST.to_string()
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}
