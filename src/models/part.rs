use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PartCategory, Price};

/// Durable, deduplicated record for one component model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartIdentity {
    pub id: i64,
    pub category: PartCategory,
    pub brand: String,
    pub name: String,
}

/// One catalog entry as read from a page, before classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawListing {
    pub title: String,
    pub link: String,
    pub price: Price,
}

/// A classified listing, ready for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartListing {
    pub category: PartCategory,
    pub brand: String,
    pub name: String,
    pub website: String,
    pub link: String,
    pub price: Price,
    pub observed_on: NaiveDate,
}

impl PartListing {
    pub fn from_raw(
        category: PartCategory,
        name: String,
        brand: String,
        website: &str,
        raw: RawListing,
        observed_on: NaiveDate,
    ) -> Self {
        Self {
            category,
            brand,
            name,
            website: website.to_string(),
            link: raw.link,
            price: raw.price,
            observed_on,
        }
    }
}
