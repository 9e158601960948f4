//! Field validators for input validation
//!
//! Each check returns `Err(message)` with the text shown to the client.
//! Coercions return `None` when a value cannot be read as the wanted type.

use serde_json::Value;

/// Validate string length (in characters) against an upper bound
pub fn validate_max_length(value: &str, max: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{} must be {} chars or less", field_name, max));
    }
    Ok(())
}

/// Validate a number against a lower bound
pub fn validate_min(value: f64, min: f64, field_name: &str) -> Result<(), String> {
    if value < min {
        return Err(format!("{} must be {} or greater", field_name, min));
    }
    Ok(())
}

/// Read a JSON number or a numeric string as a finite `f64`
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Read a JSON boolean or the strings `"true"` / `"false"`
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Match a string case-insensitively against allowed values, returning the
/// canonical spelling
pub fn coerce_choice(value: &Value, choices: &[&'static str]) -> Option<&'static str> {
    let raw = value.as_str()?.trim();
    choices
        .iter()
        .copied()
        .find(|choice| choice.eq_ignore_ascii_case(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_max_length_counts_chars() {
        assert!(validate_max_length("héllo", 5, "name").is_ok());
        assert_eq!(
            validate_max_length("hello!", 5, "name"),
            Err("name must be 5 chars or less".to_string())
        );
    }

    #[test]
    fn test_validate_min() {
        assert!(validate_min(0.0, 0.0, "quantity").is_ok());
        assert_eq!(
            validate_min(-1.0, 0.0, "quantity"),
            Err("quantity must be 0 or greater".to_string())
        );
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(2)), Some(2.0));
        assert_eq!(coerce_number(&json!(1.5)), Some(1.5));
        assert_eq!(coerce_number(&json!(" 3 ")), Some(3.0));
        assert_eq!(coerce_number(&json!("three")), None);
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!("False")), Some(false));
        assert_eq!(coerce_bool(&json!("yes")), None);
        assert_eq!(coerce_bool(&json!(1)), None);
    }

    #[test]
    fn test_coerce_choice() {
        let choices = ["Low", "Medium", "High"];
        assert_eq!(coerce_choice(&json!("high"), &choices), Some("High"));
        assert_eq!(coerce_choice(&json!(" Low "), &choices), Some("Low"));
        assert_eq!(coerce_choice(&json!("urgent"), &choices), None);
        assert_eq!(coerce_choice(&json!(3), &choices), None);
    }
}
