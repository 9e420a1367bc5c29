pub mod engine;
pub mod extract;
pub mod format;
pub mod rate;
pub mod tariff_table;

pub use crate::domain::model::{DutyQuote, RateLine, ShipmentQuery, TariffRecord};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, TariffSource};
pub use crate::utils::error::Result;
