use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::PartCategory;

#[derive(Parser, Debug)]
#[command(name = "pcpart-tracker", version, about = "Track PC part listings and their price history")]
pub struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape every catalog and store today's prices
    Update,
    /// Browse stored parts interactively
    Browse,
    /// Search stored parts by name
    Search {
        /// cpu, gpu or motherboard
        category: PartCategory,
        /// Case-insensitive name fragment (default: all parts)
        name: Option<String>,
        /// Only the newest observation of each part
        #[arg(long)]
        latest: bool,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every stored price of one part
    History {
        category: PartCategory,
        part_id: i64,
    },
    /// Show part and observation counts per category
    Stats,
}
