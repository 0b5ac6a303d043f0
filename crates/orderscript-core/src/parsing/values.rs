use crate::parsing::normalize::normalize_digits;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Coerce free text into a money value.
///
/// Handles formats like:
/// - "150" -> 150
/// - "1,250" / "1،250" -> 1250 (thousands separators)
/// - "٣٥٠ ج" -> 350 (Arabic digits, currency suffix)
/// - "99.5 EGP" -> 99.5
/// - "abc" / "" / "1.2.3" -> 0 (unparsable)
pub fn coerce_decimal(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or(Decimal::ZERO)
}

/// Like [`coerce_decimal`] but distinguishes "nothing numeric" from zero.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let digits = normalize_digits(s.trim());
    let mut cleaned = String::with_capacity(digits.len());
    for c in digits.chars() {
        match c {
            '0'..='9' | '.' => cleaned.push(c),
            '-' if cleaned.is_empty() => cleaned.push(c),
            _ => {}
        }
    }
    let cleaned = cleaned.trim_end_matches('.');
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}

/// Coerce a catalog JSON value (number or numeric string) into a decimal.
pub fn coerce_json(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else if let Some(u) = n.as_u64() {
                Decimal::from(u)
            } else {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .unwrap_or(Decimal::ZERO)
            }
        }
        Value::String(s) => coerce_decimal(s),
        _ => Decimal::ZERO,
    }
}

/// `price × quantity`, or `None` when the product leaves the decimal range.
pub fn line_amount(price: Decimal, quantity: u32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// Sum that stops at `Decimal::MAX` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Parse a quantity. Anything missing, unparsable or zero becomes 1.
pub fn parse_quantity(s: &str) -> u32 {
    normalize_digits(s.trim())
        .parse::<u32>()
        .ok()
        .filter(|q| *q >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_plain_integer() {
        assert_eq!(coerce_decimal("150"), dec!(150));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(coerce_decimal("1,250"), dec!(1250));
        assert_eq!(coerce_decimal("1،250"), dec!(1250));
    }

    #[test]
    fn test_arabic_digits_with_currency() {
        assert_eq!(coerce_decimal("٣٥٠ ج"), dec!(350));
        assert_eq!(coerce_decimal("99.5 EGP"), dec!(99.5));
    }

    #[test]
    fn test_trailing_dot_ignored() {
        assert_eq!(coerce_decimal("200 ج.م"), dec!(200));
    }

    #[test]
    fn test_unparsable_is_zero() {
        assert_eq!(coerce_decimal("abc"), Decimal::ZERO);
        assert_eq!(coerce_decimal(""), Decimal::ZERO);
        assert_eq!(coerce_decimal("1.2.3"), Decimal::ZERO);
        assert!(parse_decimal("بدون").is_none());
    }

    #[test]
    fn test_json_values() {
        assert_eq!(coerce_json(&json!(120)), dec!(120));
        assert_eq!(coerce_json(&json!(99.5)), dec!(99.5));
        assert_eq!(coerce_json(&json!("1,100")), dec!(1100));
        assert_eq!(coerce_json(&json!(null)), Decimal::ZERO);
        assert_eq!(coerce_json(&json!(true)), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity("٤"), 4);
        assert_eq!(parse_quantity("0"), 1);
        assert_eq!(parse_quantity("x"), 1);
        assert_eq!(parse_quantity(""), 1);
    }

    #[test]
    fn test_line_amount_overflow_is_none() {
        assert_eq!(line_amount(dec!(150), 3), Some(dec!(450)));
        assert_eq!(line_amount(Decimal::MAX, 2), None);
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([dec!(1.5), dec!(2)]), dec!(3.5));
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::MAX]), Decimal::MAX);
    }
}
