use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored in place of a price when a listing shows none.
pub const UNAVAILABLE_SENTINEL: &str = "N/A";

/// Current price of a listing as shown on the catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "lowercase")]
pub enum Price {
    /// Decimal-like text exactly as displayed, e.g. `1,299.99`.
    Listed(String),
    /// No price block, or the listing is not orderable yet.
    Unavailable,
}

impl Price {
    pub fn as_stored(&self) -> &str {
        match self {
            Price::Listed(text) => text,
            Price::Unavailable => UNAVAILABLE_SENTINEL,
        }
    }

    pub fn from_stored(value: &str) -> Self {
        if value == UNAVAILABLE_SENTINEL {
            Price::Unavailable
        } else {
            Price::Listed(value.to_string())
        }
    }

    /// Numeric amount with thousands separators removed.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Price::Listed(text) => {
                let cleaned: String = text
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                Decimal::from_str(&cleaned).ok()
            }
            Price::Unavailable => None,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Listed(text) => write!(f, "${}", text),
            Price::Unavailable => f.write_str(UNAVAILABLE_SENTINEL),
        }
    }
}
