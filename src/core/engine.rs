use std::sync::Arc;

use crate::core::extract::extract_shipment_query;
use crate::core::format::{format_error, render_quote};
use crate::core::rate::RateRule;
use crate::core::tariff_table::TariffTable;
use crate::domain::model::{DutyQuote, RateLine, ShipmentQuery, TariffRecord};
use crate::utils::error::Result;

/// Duty computation over an immutable tariff table.
///
/// Cloning is cheap; every clone shares the same table.
#[derive(Debug, Clone)]
pub struct DutyEngine {
    table: Arc<TariffTable>,
}

impl DutyEngine {
    pub fn new(table: Arc<TariffTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TariffTable {
        &self.table
    }

    /// Duty owed for a shipment, in the same currency as the inputs.
    ///
    /// Fails with [`NotFoundError`](crate::utils::error::DutyError::NotFoundError) when `hts_code` is not in the table.
    pub fn calculate(
        &self,
        cost: f64,
        freight: f64,
        insurance: f64,
        hts_code: &str,
        weight_kg: Option<f64>,
        quantity: Option<u64>,
    ) -> Result<f64> {
        let cif = cost + freight + insurance;
        let record = self.table.lookup(hts_code)?;
        let rule = RateRule::parse(&record.rate_expression, weight_kg, quantity);
        audit_rule(record, &rule);
        Ok(rule.duty_amount(cif))
    }

    /// Full quote: duty, landed cost and a per-column breakdown.
    pub fn quote(&self, shipment: &ShipmentQuery) -> Result<DutyQuote> {
        let cif = shipment.cif();
        let record = self.table.lookup(&shipment.hts_code)?;

        let rule = RateRule::parse(&record.rate_expression, shipment.weight_kg, shipment.quantity);
        audit_rule(record, &rule);
        let duty = rule.duty_amount(cif);

        let mut breakdown = Vec::with_capacity(1 + record.extra_rates.len());
        breakdown.push(RateLine {
            column: self.table.schema().duty_column.clone(),
            expression: record.rate_expression.clone(),
            rule: rule.kind().to_string(),
            duty,
        });
        for extra in &record.extra_rates {
            let extra_rule = RateRule::parse(&extra.expression, shipment.weight_kg, shipment.quantity);
            breakdown.push(RateLine {
                column: extra.column.clone(),
                expression: extra.expression.clone(),
                rule: extra_rule.kind().to_string(),
                duty: extra_rule.duty_amount(cif),
            });
        }

        tracing::debug!(
            "Quoted {}: CIF {:.2}, duty {:.2} ({})",
            record.code,
            cif,
            duty,
            rule.kind()
        );

        Ok(DutyQuote {
            hts_code: record.code.clone(),
            cif,
            duty,
            landed_cost: cif + duty,
            rate_expression: record.rate_expression.clone(),
            rule: rule.kind().to_string(),
            unrecognized_rate: rule.is_unrecognized() && !record.rate_expression.trim().is_empty(),
            breakdown,
            shipment: shipment.clone(),
        })
    }

    /// Typed natural-language entry point.
    pub fn quote_from_query(&self, text: &str) -> Result<DutyQuote> {
        let shipment = extract_shipment_query(text)?;
        self.quote(&shipment)
    }

    /// Natural-language entry point. Never fails: errors come back as `❗️`-prefixed text.
    pub fn calculate_from_query(&self, text: &str) -> String {
        match self.quote_from_query(text) {
            Ok(quote) => render_quote(&quote),
            Err(e) => {
                tracing::info!("Duty query rejected: {}", e);
                format_error(&e.user_friendly_message())
            }
        }
    }
}

/// Unrecognized expressions compute zero duty; leave a trail so under-reporting can be audited.
fn audit_rule(record: &TariffRecord, rule: &RateRule) {
    if rule.is_unrecognized() && !record.rate_expression.trim().is_empty() {
        tracing::warn!(
            hts_code = %record.code,
            expression = %record.rate_expression,
            source = %record.source,
            "Unrecognized duty-rate expression, treating duty as zero"
        );
    }
}

impl From<TariffTable> for DutyEngine {
    fn from(table: TariffTable) -> Self {
        Self::new(Arc::new(table))
    }
}
