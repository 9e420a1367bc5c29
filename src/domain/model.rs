use serde::{Deserialize, Serialize};

/// A secondary rate column carried alongside the primary duty expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRate {
    pub column: String,
    pub expression: String,
}

/// One row of the tariff schedule. `code` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    pub code: String,
    pub rate_expression: String,
    #[serde(default)]
    pub extra_rates: Vec<NamedRate>,
    pub source: String,
}

impl TariffRecord {
    pub fn new(code: impl Into<String>, rate_expression: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            rate_expression: rate_expression.into(),
            extra_rates: Vec::new(),
            source: "<memory>".to_string(),
        }
    }

    pub fn with_extra_rate(mut self, column: impl Into<String>, expression: impl Into<String>) -> Self {
        self.extra_rates.push(NamedRate {
            column: column.into(),
            expression: expression.into(),
        });
        self
    }
}

/// Shipment economics for a single duty request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentQuery {
    pub hts_code: String,
    pub cost: f64,
    #[serde(default)]
    pub freight: f64,
    #[serde(default)]
    pub insurance: f64,
    pub weight_kg: Option<f64>,
    pub quantity: Option<u64>,
}

impl ShipmentQuery {
    pub fn new(hts_code: impl Into<String>, cost: f64) -> Self {
        Self {
            hts_code: hts_code.into(),
            cost,
            freight: 0.0,
            insurance: 0.0,
            weight_kg: None,
            quantity: None,
        }
    }

    /// Cost + insurance + freight; negative inputs are not rejected.
    pub fn cif(&self) -> f64 {
        self.cost + self.freight + self.insurance
    }
}

/// Computed duty for one rate column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLine {
    pub column: String,
    pub expression: String,
    pub rule: String,
    pub duty: f64,
}

/// Full result of a duty calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyQuote {
    pub hts_code: String,
    pub cif: f64,
    pub duty: f64,
    pub landed_cost: f64,
    pub rate_expression: String,
    pub rule: String,
    pub unrecognized_rate: bool,
    pub breakdown: Vec<RateLine>,
    pub shipment: ShipmentQuery,
}
