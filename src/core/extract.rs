//! Field extraction from free-text duty queries.
//!
//! Each field has its own case-insensitive pattern and the first match in the text
//! is used. Fields are independent: a missing freight or insurance amount defaults
//! to zero, a missing weight or quantity stays absent. Only the HTS code and the
//! cost are mandatory.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::ShipmentQuery;
use crate::utils::error::{DutyError, Result};

pub const MISSING_FIELDS_MESSAGE: &str = "Could not parse HTS code or cost from the query.";

static HTS_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)hts code\s*([0-9.]+)").expect("valid hts code regex"));

static COST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:cost|product cost|fob cost)\s*(?:of\s*)?\$?([0-9,]+(?:\.[0-9]+)?)")
        .expect("valid cost regex")
});

static FREIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)freight\s*(?:of\s*)?\$?([0-9,]+(?:\.[0-9]+)?)").expect("valid freight regex")
});

static INSURANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)insurance\s*(?:of\s*)?\$?([0-9,]+(?:\.[0-9]+)?)").expect("valid insurance regex")
});

static WEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9,]+(?:\.[0-9]+)?)\s*kg").expect("valid weight regex"));

static QUANTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9,]+)\s*units?").expect("valid quantity regex"));

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

fn strip_grouping(raw: &str) -> String {
    raw.replace(',', "")
}

/// Parse a comma-grouped decimal such as `10,000.50`.
pub fn parse_grouped_decimal(raw: &str) -> Option<f64> {
    strip_grouping(raw).parse::<f64>().ok()
}

/// Parse a comma-grouped integer such as `1,200`.
pub fn parse_grouped_integer(raw: &str) -> Option<u64> {
    strip_grouping(raw).parse::<u64>().ok()
}

fn amount(re: &Regex, text: &str) -> Option<f64> {
    first_capture(re, text).and_then(parse_grouped_decimal)
}

/// Pull a [`ShipmentQuery`] out of `text`.
pub fn extract_shipment_query(text: &str) -> Result<ShipmentQuery> {
    let hts_code = first_capture(&HTS_CODE_RE, text);
    let cost = amount(&COST_RE, text);

    let (hts_code, cost) = match (hts_code, cost) {
        (Some(code), Some(cost)) => (code.to_string(), cost),
        (code, cost) => {
            tracing::debug!(
                "Query extraction failed (hts code found: {}, cost found: {})",
                code.is_some(),
                cost.is_some()
            );
            return Err(DutyError::ExtractionError {
                message: MISSING_FIELDS_MESSAGE.to_string(),
            });
        }
    };

    let query = ShipmentQuery {
        hts_code,
        cost,
        freight: amount(&FREIGHT_RE, text).unwrap_or(0.0),
        insurance: amount(&INSURANCE_RE, text).unwrap_or(0.0),
        weight_kg: amount(&WEIGHT_RE, text),
        quantity: first_capture(&QUANTITY_RE, text).and_then(parse_grouped_integer),
    };

    tracing::debug!("Extracted shipment query: {:?}", query);
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_every_field() {
        let query = extract_shipment_query(
            "HTS code 0101.30.00.00, cost $10,000, freight $500, insurance $100, 5 units, 500 kg.",
        )
        .unwrap();

        assert_eq!(query.hts_code, "0101.30.00.00");
        assert_eq!(query.cost, 10_000.0);
        assert_eq!(query.freight, 500.0);
        assert_eq!(query.insurance, 100.0);
        assert_eq!(query.weight_kg, Some(500.0));
        assert_eq!(query.quantity, Some(5));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let query = extract_shipment_query("hts CODE 8471.30 FOB COST of $1,234.50 FREIGHT OF 20").unwrap();
        assert_eq!(query.hts_code, "8471.30");
        assert_eq!(query.cost, 1234.5);
        assert_eq!(query.freight, 20.0);
    }

    #[test]
    fn test_optional_fields_default() {
        let query = extract_shipment_query("HTS code 0101.30.00.00 cost 250").unwrap();
        assert_eq!(query.freight, 0.0);
        assert_eq!(query.insurance, 0.0);
        assert_eq!(query.weight_kg, None);
        assert_eq!(query.quantity, None);
    }

    #[test]
    fn test_missing_cost_is_extraction_error() {
        let err = extract_shipment_query("HTS code 1234.56.78, freight $10").unwrap_err();
        assert!(matches!(err, DutyError::ExtractionError { .. }));
        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
    }

    #[test]
    fn test_missing_code_is_extraction_error() {
        assert!(extract_shipment_query("cost $10,000 freight $500").is_err());
    }

    #[test]
    fn test_first_match_wins() {
        let query = extract_shipment_query("HTS code 0101 cost $10 then cost $99, 3 units or 7 units").unwrap();
        assert_eq!(query.cost, 10.0);
        assert_eq!(query.quantity, Some(3));
    }

    #[test]
    fn test_grouped_weight_and_quantity() {
        let query = extract_shipment_query("HTS code 0101 cost $1 weight 1,250.5 kg qty 1,200 units").unwrap();
        assert_eq!(query.weight_kg, Some(1250.5));
        assert_eq!(query.quantity, Some(1200));
    }

    #[test]
    fn test_keyword_style_phrasing() {
        let query =
            extract_shipment_query("HTS code 0101.30.00.00 cost $10000 freight $0 insurance $0 weight 500 kg qty 5 units")
                .unwrap();
        assert_eq!(query.cost, 10_000.0);
        assert_eq!(query.freight, 0.0);
        assert_eq!(query.weight_kg, Some(500.0));
        assert_eq!(query.quantity, Some(5));
    }

    #[test]
    fn test_parse_grouped_numbers() {
        assert_eq!(parse_grouped_decimal("10,000"), Some(10_000.0));
        assert_eq!(parse_grouped_decimal(","), None);
        assert_eq!(parse_grouped_integer("1,200"), Some(1200));
    }
}
