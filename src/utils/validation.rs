use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("static email pattern")
    })
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.@+\-]{3,150}$").expect("static username pattern"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{7,14}$").expect("static phone pattern"))
}

/// Trims and lower-cases a valid address.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_ascii_lowercase();
    if email.len() > 254 || !email_regex().is_match(&email) {
        return Err(AppError::ValidationError(
            "Enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if !username_regex().is_match(username) {
        return Err(AppError::ValidationError(
            "Username must be 3-150 characters: letters, digits and @/./+/-/_ only".to_string(),
        ));
    }
    Ok(())
}

/// Empty is allowed (the field is optional); anything else must look like a phone number.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    if phone.is_empty() || phone_regex().is_match(phone) {
        Ok(())
    } else {
        Err(AppError::ValidationError(
            "Invalid phone number format".to_string(),
        ))
    }
}
