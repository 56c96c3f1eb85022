use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classifier::{Classification, TitleClassifier};
use crate::config::AppConfig;
use crate::models::{CategoryCatalog, PartCategory, PartListing};
use crate::repository::PartRepository;
use crate::scraper::PageFetcher;
use crate::utils::{AppError, Result};
use crate::walker::{CatalogWalker, PolitenessDelay};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: PartCategory,
    pub found: usize,
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
    pub error: Option<String>,
}

impl CategoryReport {
    fn new(category: PartCategory) -> Self {
        Self {
            category,
            found: 0,
            stored: 0,
            skipped: 0,
            failed: 0,
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub observed_on: NaiveDate,
    pub categories: Vec<CategoryReport>,
    pub total_time_ms: u64,
}

impl UpdateReport {
    pub fn total_stored(&self) -> usize {
        self.categories.iter().map(|c| c.stored).sum()
    }

    pub fn failed_categories(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| !c.success())
    }

    pub fn category(&self, category: PartCategory) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Update for {}:", self.observed_on)?;
        for report in &self.categories {
            write!(
                f,
                "  {:<13} found {:>4}  stored {:>4}  skipped {:>4}  failed {:>4}",
                report.category.plural(),
                report.found,
                report.stored,
                report.skipped,
                report.failed
            )?;
            if let Some(error) = &report.error {
                write!(f, "  ERROR: {}", error)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "Stored {} observation(s) in {:.1}s",
            self.total_stored(),
            self.total_time_ms as f64 / 1000.0
        )
    }
}

/// Runs one ingestion pass: walk every catalog, classify each listing and
/// persist the matches.
pub struct Updater {
    walker: CatalogWalker,
    classifier: TitleClassifier,
    repository: PartRepository,
    catalogs: Vec<CategoryCatalog>,
    website: String,
}

impl Updater {
    pub fn new(
        walker: CatalogWalker,
        classifier: TitleClassifier,
        repository: PartRepository,
        catalogs: Vec<CategoryCatalog>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            walker,
            classifier,
            repository,
            catalogs,
            website: website.into(),
        }
    }

    pub fn from_config(config: &AppConfig, fetcher: Arc<dyn PageFetcher>, repository: PartRepository) -> Result<Self> {
        let walker = CatalogWalker::new(fetcher, PolitenessDelay::from_config(&config.scraper))?;

        Ok(Self::new(
            walker,
            TitleClassifier::new()?,
            repository,
            config.catalogs()?,
            config.scraper.website.clone(),
        ))
    }

    pub async fn run(&self) -> Result<UpdateReport> {
        self.run_on(Local::now().date_naive()).await
    }

    /// Runs until `shutdown` resolves first, in which case the run fails with
    /// `Interrupted`. Observations stored before that are kept.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<UpdateReport>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = shutdown => {
                warn!("Update interrupted, observations stored so far are kept");
                Err(AppError::Interrupted)
            }
            report = self.run() => report,
        }
    }

    /// Every observation stored by this run carries `observed_on`.
    pub async fn run_on(&self, observed_on: NaiveDate) -> Result<UpdateReport> {
        let start_time = Instant::now();
        self.repository.ensure_schema().await?;

        let mut categories = Vec::with_capacity(self.catalogs.len());
        for catalog in &self.catalogs {
            let report = self.update_category(catalog, observed_on).await?;
            categories.push(report);
        }

        let report = UpdateReport {
            observed_on,
            categories,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };
        info!("Update finished: {} observation(s) stored", report.total_stored());
        Ok(report)
    }

    /// Fetch and pagination failures end only this category; anything else aborts the run.
    async fn update_category(&self, catalog: &CategoryCatalog, observed_on: NaiveDate) -> Result<CategoryReport> {
        let category = catalog.category;
        let mut report = CategoryReport::new(category);
        info!("Updating {}", category.plural());

        let listings = match self.walker.walk_category(catalog).await {
            Ok(listings) => listings,
            Err(e) if e.is_walk_failure() => {
                warn!("Skipping {}: {}", category.plural(), e);
                report.error = Some(e.to_string());
                return Ok(report);
            }
            Err(e) => return Err(e),
        };
        report.found = listings.len();

        for raw in listings {
            let (name, brand) = match self.classifier.classify(category, &raw.title) {
                Classification::Matched { name, brand } => (name, brand),
                Classification::Unmatched => {
                    debug!(title = %raw.title, "No {} name rule matched, skipping", category);
                    report.skipped += 1;
                    continue;
                }
            };

            let listing = PartListing::from_raw(category, name, brand, &self.website, raw, observed_on);
            match self.repository.ingest(&listing).await {
                Ok(_) => report.stored += 1,
                Err(e) => {
                    warn!(name = %listing.name, "Failed to store {} listing: {}", category, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "{}: {} found, {} stored, {} skipped, {} failed",
            category.plural(),
            report.found,
            report.stored,
            report.skipped,
            report.failed
        );
        Ok(report)
    }
}
