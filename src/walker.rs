use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::extractor::ListingExtractor;
use crate::models::{CatalogSource, CategoryCatalog, RawListing};
use crate::scraper::PageFetcher;
use crate::utils::Result;

/// Randomized pause between successive page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessDelay {
    min: Duration,
    max: Duration,
}

impl PolitenessDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            Duration::from_millis(config.delay_min_ms),
            Duration::from_millis(config.delay_max_ms),
        )
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn pick(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = rand::thread_rng().gen_range(self.min.as_millis()..=self.max.as_millis());
        Duration::from_millis(millis as u64)
    }

    /// Sleeps for a random duration in the interval. Dropping the future cancels the wait.
    pub async fn wait(&self) {
        let delay = self.pick();
        if delay.is_zero() {
            return;
        }
        debug!("Waiting {:.1}s before next page", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// Follows a catalog query across all of its result pages.
pub struct CatalogWalker {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ListingExtractor,
    delay: PolitenessDelay,
}

impl CatalogWalker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, delay: PolitenessDelay) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor: ListingExtractor::new()?,
            delay,
        })
    }

    /// Every listing of one source query, in page order. Any fetch or
    /// pagination failure fails the whole walk.
    pub async fn walk(&self, source: &CatalogSource) -> Result<Vec<RawListing>> {
        let first_url = source.page_url(1);
        let first_page = self.fetcher.fetch(&first_url).await?;
        let pages = self.extractor.page_count(&first_page, &first_url)?;
        info!("{} catalog {} has {} page(s)", source.category, source.url, pages);

        let mut listings = self.extractor.extract(&first_page);
        debug!(page = 1, found = listings.len(), "Extracted listings");

        for page in 2..=pages {
            self.delay.wait().await;

            let markup = self.fetcher.fetch(&source.page_url(page)).await?;
            let page_listings = self.extractor.extract(&markup);
            debug!(page, found = page_listings.len(), "Extracted listings");
            listings.extend(page_listings);
        }

        Ok(listings)
    }

    /// Concatenated listings of every source query in a category.
    pub async fn walk_category(&self, catalog: &CategoryCatalog) -> Result<Vec<RawListing>> {
        let mut listings = Vec::new();

        for (index, source) in catalog.sources.iter().enumerate() {
            if index > 0 {
                self.delay.wait().await;
            }
            listings.extend(self.walk(source).await?);
        }

        info!("Found {} {} listings", listings.len(), catalog.category);
        Ok(listings)
    }
}
