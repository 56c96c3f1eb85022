use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod part;
pub mod price;
pub mod price_history;
pub mod source;

// Re-exports for convenience
pub use part::*;
pub use price::*;
pub use price_history::*;
pub use source::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PartCategory {
    Cpu,
    Gpu,
    Motherboard,
}

/// SQL identifiers backing one category. Resolved from a fixed table, never
/// built from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableNames {
    pub parts: &'static str,
    pub prices: &'static str,
    pub foreign_key: &'static str,
}

const CPU_TABLES: TableNames = TableNames {
    parts: "cpus",
    prices: "cpu_prices",
    foreign_key: "cpu_id",
};

const GPU_TABLES: TableNames = TableNames {
    parts: "gpus",
    prices: "gpu_prices",
    foreign_key: "gpu_id",
};

const MOBO_TABLES: TableNames = TableNames {
    parts: "mobos",
    prices: "mobo_prices",
    foreign_key: "mobo_id",
};

impl PartCategory {
    pub const ALL: [PartCategory; 3] = [PartCategory::Cpu, PartCategory::Gpu, PartCategory::Motherboard];

    pub fn tables(self) -> TableNames {
        match self {
            PartCategory::Cpu => CPU_TABLES,
            PartCategory::Gpu => GPU_TABLES,
            PartCategory::Motherboard => MOBO_TABLES,
        }
    }

    /// Plural label used in menus and reports.
    pub fn plural(self) -> &'static str {
        match self {
            PartCategory::Cpu => "CPUs",
            PartCategory::Gpu => "GPUs",
            PartCategory::Motherboard => "Motherboards",
        }
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PartCategory::Cpu => "CPU",
            PartCategory::Gpu => "GPU",
            PartCategory::Motherboard => "Motherboard",
        };
        f.write_str(label)
    }
}

impl FromStr for PartCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" | "cpus" => Ok(PartCategory::Cpu),
            "gpu" | "gpus" => Ok(PartCategory::Gpu),
            "motherboard" | "motherboards" | "mobo" | "mobos" => Ok(PartCategory::Motherboard),
            other => Err(format!("unknown part category '{}' (expected cpu, gpu or motherboard)", other)),
        }
    }
}
