pub mod browser;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod repository;
pub mod scraper;
pub mod updater;
pub mod utils;
pub mod walker;

// Re-export commonly used types
pub use config::AppConfig;
pub use repository::PartRepository;
pub use updater::{UpdateReport, Updater};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
