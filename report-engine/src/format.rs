//! FILENAME: report-engine/src/format.rs
//! PURPOSE: Display formatting of raw cell values.
//! CONTEXT: Formatters are attached to leaf columns and applied after
//! path resolution. They are pure value -> value transforms with no
//! shared state; aggregation always runs on the raw value and applies
//! the formatter exactly once on the total.

use serde::{Deserialize, Serialize};

use crate::view::CellValue;

/// Display format for a leaf column.
///
/// Modeled as data rather than a function pointer so that report
/// definitions round-trip through serde. Non-numeric raw values pass
/// through every variant unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellFormat {
    /// Fixed decimal places, optional thousands separator.
    Number {
        decimal_places: u8,
        use_thousands_separator: bool,
    },
    /// Currency symbol + fixed decimals, e.g. "¥1000.00".
    Currency { symbol: String, decimal_places: u8 },
    /// Raw fraction rendered as a percentage, e.g. 0.5 -> "50.00%".
    Percentage { decimal_places: u8 },
    /// Unix-seconds timestamp rendered with a strftime pattern.
    Date { format: String },
}

impl CellFormat {
    /// The currency convention observed across the reporting modals.
    pub fn currency() -> Self {
        CellFormat::Currency {
            symbol: "¥".to_string(),
            decimal_places: 2,
        }
    }

    pub fn percentage() -> Self {
        CellFormat::Percentage { decimal_places: 2 }
    }

    /// Applies the format to a raw value, producing the display value.
    pub fn apply(&self, raw: &CellValue) -> CellValue {
        let value = match raw {
            CellValue::Number(n) => *n,
            other => return other.clone(),
        };

        match self {
            CellFormat::Number {
                decimal_places,
                use_thousands_separator,
            } => CellValue::Text(format_decimal(value, *decimal_places, *use_thousands_separator)),
            CellFormat::Currency {
                symbol,
                decimal_places,
            } => CellValue::Text(format_currency(value, symbol, *decimal_places)),
            CellFormat::Percentage { decimal_places } => {
                CellValue::Text(format_percentage(value, *decimal_places))
            }
            CellFormat::Date { format } => format_date(value, format)
                .map(CellValue::Text)
                .unwrap_or_else(|| raw.clone()),
        }
    }
}

/// Format a number with fixed decimal places and optional separators.
fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
fn add_thousands_separator(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Format a number as currency: sign, symbol, fixed decimals.
/// No thousands separator; matches the historical report output.
fn format_currency(value: f64, symbol: &str, decimal_places: u8) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimal_places as usize);

    if value < 0.0 {
        format!("-{}{}", symbol, formatted)
    } else {
        format!("{}{}", symbol, formatted)
    }
}

/// Format a raw fraction as a percentage.
fn format_percentage(value: f64, decimal_places: u8) -> String {
    format!(
        "{:.prec$}%",
        value * 100.0,
        prec = decimal_places as usize
    )
}

/// Format a Unix-seconds timestamp with a strftime pattern.
/// Returns None for timestamps chrono cannot represent.
fn format_date(value: f64, pattern: &str) -> Option<String> {
    let timestamp = chrono::DateTime::from_timestamp(value as i64, 0)?;
    Some(timestamp.format(pattern).to_string())
}
