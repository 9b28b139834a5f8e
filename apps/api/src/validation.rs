//! Boundary checks shared by request structs. Anything rejected here maps to
//! `INVALID_INPUT` and never reaches a gate.

use crate::errors::AppError;

const MAX_EMAIL_LEN: usize = 254;

/// Trims and lower-cases an email, rejecting anything without a plausible
/// `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::InvalidInput("email is required".to_string()));
    }
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidInput("email is malformed".to_string()));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::InvalidInput("email is malformed".to_string()));
    }
    Ok(email)
}

/// Trims `value` and checks it is non-empty and at most `max_chars` long.
pub fn require_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::InvalidInput(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(result: Result<String, AppError>) -> String {
        match result {
            Err(AppError::InvalidInput(msg)) => msg,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
    }

    #[test]
    fn test_email_missing() {
        assert_eq!(rejected(normalize_email("   ")), "email is required");
    }

    #[test]
    fn test_email_shapes_rejected() {
        for bad in ["ana", "@example.com", "ana@example", "ana@@example.com", "a na@x.com", "ana@.com", "ana@x."] {
            assert_eq!(rejected(normalize_email(bad)), "email is malformed", "{bad}");
        }
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("first_name", "  Ana ", 40).unwrap(), "Ana");
    }

    #[test]
    fn test_require_text_limits() {
        assert_eq!(rejected(require_text("first_name", "", 40)), "first_name is required");
        assert!(rejected(require_text("first_name", &"a".repeat(41), 40)).contains("at most 40"));
    }
}
