use crate::domain::model::DutyQuote;

/// Prefix marking user-facing error strings from the natural-language front door.
pub const ERROR_PREFIX: &str = "❗️ ";

/// Format as `$#,##0.00`. Negative values render as `$-1,234.50`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }

    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.001 rounds to 0.00 and must not print a sign
    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    format!("${}{}.{}", sign, grouped, frac_part)
}

pub fn format_error(message: &str) -> String {
    format!("{}{}", ERROR_PREFIX, message)
}

/// Human-readable result block.
pub fn render_quote(quote: &DutyQuote) -> String {
    let mut lines = vec![
        format!("**HTS Code:** {}", quote.hts_code),
        format!("**CIF:** {}", format_currency(quote.cif)),
        format!("**Duty:** {}", format_currency(quote.duty)),
        format!("**Landed Cost (CIF + Duties):** {}", format_currency(quote.landed_cost)),
    ];

    if !quote.breakdown.is_empty() {
        lines.push("**Rate Breakdown:**".to_string());
        for line in &quote.breakdown {
            let expression = if line.expression.trim().is_empty() {
                "(none)"
            } else {
                line.expression.as_str()
            };
            lines.push(format!(
                "- {}: {} → Duty = {}",
                line.column,
                expression,
                format_currency(line.duty)
            ));
        }
    }

    if quote.unrecognized_rate {
        lines.push(format!(
            "⚠️ Rate expression '{}' was not recognized; duty reported as {}.",
            quote.rate_expression,
            format_currency(0.0)
        ));
    }

    lines.join("\n")
}
