pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{freight::ShipsmartClient, storage::LocalStorage, tariff::CsvTariffTable};
pub use config::ComparisonConfig;
pub use core::pipeline::{ComparisonContext, ComparisonEngine, ComparisonInput};
pub use core::report::{ComparisonReport, ReportFormat};
pub use utils::error::{LandedCostError, Result};
