pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::LocalDirectory;
pub use crate::core::{
    engine::DutyEngine,
    rate::{parse_duty_fraction, RateRule},
    tariff_table::{TableSchema, TariffTable},
};
pub use domain::model::{DutyQuote, ShipmentQuery, TariffRecord};
pub use utils::error::{DutyError, Result};
