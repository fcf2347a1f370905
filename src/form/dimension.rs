//! Dimension string normalization
//!
//! Staff type dimensions every which way ("12x8x3", `24" by 18"`,
//! "30 x 20 cm"). Normalize to `W x D x H unit` so the receipt column
//! stays readable.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
    static ref UNIT_RE: Regex =
        Regex::new(r#"(?i)\b(inches|inch|in|cm|mm|ft|feet)\b|""#).unwrap();
}

/// Normalize a freeform dimension string.
///
/// Numeric tokens are joined with " x "; the first recognized unit is
/// appended once. Input with no numbers is returned trimmed as-is.
pub fn normalize_dimensions(raw: &str) -> String {
    let numbers: Vec<&str> = NUMBER_RE.find_iter(raw).map(|m| m.as_str()).collect();
    if numbers.is_empty() {
        return raw.trim().to_string();
    }

    let unit = UNIT_RE.find(raw).map(|m| canonical_unit(m.as_str()));

    match unit {
        Some(unit) => format!("{} {}", numbers.join(" x "), unit),
        None => numbers.join(" x "),
    }
}

fn canonical_unit(raw: &str) -> &'static str {
    match raw.to_ascii_lowercase().as_str() {
        "\"" | "in" | "inch" | "inches" => "in",
        "cm" => "cm",
        "mm" => "mm",
        "ft" | "feet" => "ft",
        _ => "in",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_triplet() {
        assert_eq!(normalize_dimensions("12x8x3"), "12 x 8 x 3");
    }

    #[test]
    fn test_inches_variants() {
        assert_eq!(normalize_dimensions("24\" by 18\""), "24 x 18 in");
        assert_eq!(normalize_dimensions("24 in by 18 inches"), "24 x 18 in");
    }

    #[test]
    fn test_metric() {
        assert_eq!(normalize_dimensions("30 x 20 cm"), "30 x 20 cm");
    }

    #[test]
    fn test_decimals() {
        assert_eq!(normalize_dimensions("8.5 by 11 in"), "8.5 x 11 in");
    }

    #[test]
    fn test_no_numbers_passthrough() {
        assert_eq!(normalize_dimensions("  oversized  "), "oversized");
    }
}
