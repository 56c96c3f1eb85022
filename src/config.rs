use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::models::{CategoryCatalog, PartCategory};
use crate::utils::Result;

const CPU_CATALOG: &str = "https://www.newegg.ca/p/pl?N=100007670%204814%208000&page=1&ComboBundle=true";
const GPU_CATALOG: &str = "https://www.newegg.ca/p/pl?N=100007708%208000&page=1&ComboBundle=true";
const AMD_MOTHERBOARD_CATALOG: &str =
    "https://www.newegg.ca/p/pl?N=100007624%20601413462%20601413455%208000&page=1&ComboBundle=true";
const INTEL_MOTHERBOARD_CATALOG: &str =
    "https://www.newegg.ca/p/pl?N=100007626%208000%20601413471%20601458446&page=1&ComboBundle=true";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scraper: ScraperConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Recorded on every price observation.
    pub website: String,
    pub user_agent: String,
    pub request_timeout: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub cpu: Vec<String>,
    pub gpu: Vec<String>,
    pub motherboard: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://data/pcparts.db".to_string(),
                max_connections: 5,
            },
            scraper: ScraperConfig {
                website: "newegg".to_string(),
                user_agent: format!("pcpart-tracker/{}", env!("CARGO_PKG_VERSION")),
                request_timeout: 30,
                delay_min_ms: 1500,
                delay_max_ms: 3000,
            },
            catalog: CatalogConfig {
                cpu: vec![CPU_CATALOG.to_string()],
                gpu: vec![GPU_CATALOG.to_string()],
                motherboard: vec![
                    AMD_MOTHERBOARD_CATALOG.to_string(),
                    INTEL_MOTHERBOARD_CATALOG.to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
            },
        }
    }
}

impl AppConfig {
    /// Built-in defaults, then `config/default`, `config/{RUN_MODE}`, `config/local`,
    /// the optional extra file and finally `PCPART__*` environment variables.
    pub fn load(extra: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path).required(true));
        }

        let s = builder
            .add_source(
                Environment::with_prefix("PCPART")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("catalog.cpu")
                    .with_list_parse_key("catalog.gpu")
                    .with_list_parse_key("catalog.motherboard"),
            )
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message("Database max_connections must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.scraper.delay_min_ms > self.scraper.delay_max_ms {
            return Err(ConfigError::Message("Scraper delay_min_ms cannot exceed delay_max_ms".into()));
        }

        if self.scraper.website.trim().is_empty() {
            return Err(ConfigError::Message("Scraper website must not be empty".into()));
        }

        for category in PartCategory::ALL {
            let urls = self.catalog.urls(category);
            if urls.is_empty() {
                return Err(ConfigError::Message(format!(
                    "Catalog for {} must list at least one source URL",
                    category.plural()
                )));
            }

            CategoryCatalog::new(category, urls).map_err(|e| ConfigError::Message(e.to_string()))?;
        }

        Ok(())
    }

    /// Category catalogs in update order.
    pub fn catalogs(&self) -> Result<Vec<CategoryCatalog>> {
        PartCategory::ALL
            .into_iter()
            .map(|category| CategoryCatalog::new(category, self.catalog.urls(category)))
            .collect()
    }
}

impl CatalogConfig {
    pub fn urls(&self, category: PartCategory) -> &[String] {
        match category {
            PartCategory::Cpu => &self.cpu,
            PartCategory::Gpu => &self.gpu,
            PartCategory::Motherboard => &self.motherboard,
        }
    }
}
