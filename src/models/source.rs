use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::PartCategory;
use crate::utils::{AppError, Result};

/// One paginated catalog query, e.g. a filtered listing page on the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSource {
    pub category: PartCategory,
    pub url: Url,
}

/// Every source query that makes up one category's listing set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCatalog {
    pub category: PartCategory,
    pub sources: Vec<CatalogSource>,
}

impl CatalogSource {
    pub fn parse(category: PartCategory, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| AppError::Validation(format!("Invalid {} catalog URL '{}': {}", category, url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "Catalog URL '{}' must use http or https",
                url
            )));
        }

        Ok(Self { category, url })
    }

    /// URL of the given 1-based page, replacing any `page` parameter already present.
    /// Every other query pair is kept exactly as configured, escapes included.
    pub fn page_url(&self, page: u32) -> String {
        let mut url = self.url.clone();
        let page_pair = format!("page={}", page);
        let mut replaced = false;
        let mut pairs: Vec<String> = url
            .query()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                if pair == "page" || pair.starts_with("page=") {
                    replaced = true;
                    page_pair.clone()
                } else {
                    pair.to_string()
                }
            })
            .collect();

        if !replaced {
            pairs.push(page_pair);
        }

        url.set_query(Some(&pairs.join("&")));
        url.to_string()
    }
}

impl CategoryCatalog {
    pub fn new(category: PartCategory, urls: &[String]) -> Result<Self> {
        let sources = urls
            .iter()
            .map(|url| CatalogSource::parse(category, url))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { category, sources })
    }
}
