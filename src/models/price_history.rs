use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{PartCategory, Price};

/// One dated price reading for a part. Rows are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceObservation {
    pub id: i64,
    pub part_id: i64,
    pub website: String,
    pub link: String,
    pub price: Price,
    pub observed_on: NaiveDate,
}

/// A part identity joined with one of its price observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRecord {
    pub category: PartCategory,
    pub part_id: i64,
    pub name: String,
    pub brand: String,
    pub website: String,
    pub link: String,
    pub price: Price,
    pub observed_on: NaiveDate,
}

impl fmt::Display for SearchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {} | {}",
            self.name, self.brand, self.price, self.website, self.link, self.observed_on
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    AllObservations,
    LatestOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: PartCategory,
    pub parts: i64,
    pub observations: i64,
}

/// Lowest listed price among observations, if any had one.
pub fn lowest_price(observations: &[PriceObservation]) -> Option<&PriceObservation> {
    observations
        .iter()
        .filter_map(|o| o.price.amount().map(|amount| (amount, o)))
        .min_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, o)| o)
}
