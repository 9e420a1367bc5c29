//! Duty-rate expression parsing.
//!
//! Patterns are tried in a fixed order against the lowercased expression and the
//! first one that applies wins:
//!
//! 1. `free` anywhere → exempt
//! 2. `N%` → ad valorem
//! 3. `N¢/kg` → specific per kilogram (needs a weight)
//! 4. `$N/unit` → specific per unit (needs a quantity)
//!
//! Anything else yields [`RateRule::Unrecognized`], which computes zero duty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9.]+)%").expect("valid percent regex"));

static CENTS_PER_KG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9.]+)¢/kg").expect("valid cents-per-kg regex"));

static DOLLARS_PER_UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([0-9.]+)/unit").expect("valid dollars-per-unit regex"));

/// Normalized computation derived from a rate expression and the shipment context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateRule {
    Exempt,
    AdValorem { percent: f64 },
    SpecificPerWeight { cents_per_kg: f64, weight_kg: f64 },
    SpecificPerUnit { dollars_per_unit: f64, quantity: u64 },
    Unrecognized,
}

impl RateRule {
    /// Resolve `expression`; the weight and quantity decide whether the specific
    /// patterns can apply at all.
    pub fn parse(expression: &str, weight_kg: Option<f64>, quantity: Option<u64>) -> Self {
        let s = expression.to_lowercase();
        if s.trim().is_empty() {
            return RateRule::Unrecognized;
        }

        if s.contains("free") {
            return RateRule::Exempt;
        }

        if let Some(percent) = first_number(&PERCENT_RE, &s) {
            return RateRule::AdValorem { percent };
        }

        if let Some(weight_kg) = weight_kg {
            if let Some(cents_per_kg) = first_number(&CENTS_PER_KG_RE, &s) {
                return RateRule::SpecificPerWeight {
                    cents_per_kg,
                    weight_kg,
                };
            }
        }

        if let Some(quantity) = quantity {
            if let Some(dollars_per_unit) = first_number(&DOLLARS_PER_UNIT_RE, &s) {
                return RateRule::SpecificPerUnit {
                    dollars_per_unit,
                    quantity,
                };
            }
        }

        RateRule::Unrecognized
    }

    /// Absolute duty owed on a shipment with the given CIF value.
    pub fn duty_amount(&self, cif: f64) -> f64 {
        match *self {
            RateRule::Exempt | RateRule::Unrecognized => 0.0,
            RateRule::AdValorem { percent } => percent / 100.0 * cif,
            RateRule::SpecificPerWeight {
                cents_per_kg,
                weight_kg,
            } => cents_per_kg * weight_kg / 100.0,
            RateRule::SpecificPerUnit {
                dollars_per_unit,
                quantity,
            } => dollars_per_unit * quantity as f64,
        }
    }

    /// Duty as a fraction of CIF. Specific rates divide by CIF; a zero CIF gives 0.0.
    pub fn fraction(&self, cif: f64) -> f64 {
        match *self {
            RateRule::Exempt | RateRule::Unrecognized => 0.0,
            RateRule::AdValorem { percent } => percent / 100.0,
            RateRule::SpecificPerWeight { .. } | RateRule::SpecificPerUnit { .. } => {
                if cif == 0.0 {
                    0.0
                } else {
                    self.duty_amount(cif) / cif
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RateRule::Exempt => "exempt",
            RateRule::AdValorem { .. } => "ad_valorem",
            RateRule::SpecificPerWeight { .. } => "specific_per_weight",
            RateRule::SpecificPerUnit { .. } => "specific_per_unit",
            RateRule::Unrecognized => "unrecognized",
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, RateRule::Unrecognized)
    }
}

/// Number captured by the first match of `re`; a capture like `1.2.3` counts as no match.
fn first_number(re: &Regex, s: &str) -> Option<f64> {
    re.captures(s)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Duty as a fraction of `cif` for `expression`. Never fails.
pub fn parse_duty_fraction(expression: &str, cif: f64, weight_kg: Option<f64>, quantity: Option<u64>) -> f64 {
    RateRule::parse(expression, weight_kg, quantity).fraction(cif)
}
