//! Normalization of jersey printing requests (name and number on the back).

use crate::error::{AppError, AppResult};
use serde_json::Value;

pub const MAX_CUSTOM_NAME_LEN: usize = 50;

/// Trimmed and upper-cased; blank means "no name".
pub fn normalize_custom_name(raw: Option<&str>) -> AppResult<Option<String>> {
    let Some(name) = raw.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if name.chars().count() > MAX_CUSTOM_NAME_LEN {
        return Err(AppError::ValidationError(format!(
            "custom_name must be at most {MAX_CUSTOM_NAME_LEN} characters"
        )));
    }
    Ok(Some(name.to_uppercase()))
}

/// Accepts a JSON integer or a numeric string; blank or null means "no number".
pub fn normalize_custom_number(raw: Option<&Value>) -> AppResult<Option<i32>> {
    let invalid = || AppError::ValidationError("custom_number must be an integer".to_string());
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<i32>().map(Some).map_err(|_| invalid())
            }
        }
        Some(_) => Err(invalid()),
    }
}

/// A line is customized when it carries a name or a number.
pub fn is_customized(custom_name: Option<&str>, custom_number: Option<i32>) -> bool {
    custom_name.is_some_and(|n| !n.is_empty()) || custom_number.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_name_is_trimmed_and_uppercased() {
        assert_eq!(
            normalize_custom_name(Some("  messi ")).unwrap(),
            Some("MESSI".to_string())
        );
        assert_eq!(normalize_custom_name(Some("   ")).unwrap(), None);
        assert_eq!(normalize_custom_name(None).unwrap(), None);
        assert!(normalize_custom_name(Some(&"a".repeat(51))).is_err());
    }

    #[test]
    fn test_custom_number_accepts_numbers_and_strings() {
        assert_eq!(normalize_custom_number(Some(&json!(10))).unwrap(), Some(10));
        assert_eq!(normalize_custom_number(Some(&json!(" 7 "))).unwrap(), Some(7));
        assert_eq!(normalize_custom_number(Some(&json!(""))).unwrap(), None);
        assert_eq!(normalize_custom_number(Some(&json!(null))).unwrap(), None);
        assert!(normalize_custom_number(Some(&json!("ten"))).is_err());
        assert!(normalize_custom_number(Some(&json!(1.5))).is_err());
    }

    #[test]
    fn test_is_customized() {
        assert!(is_customized(Some("MESSI"), None));
        assert!(is_customized(None, Some(0)));
        assert!(!is_customized(None, None));
        assert!(!is_customized(Some(""), None));
    }
}
