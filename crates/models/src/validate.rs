//! Field validators reused across entities.

use crate::errors::ModelError;

pub fn required(field: &str, value: &str, max_len: usize) -> Result<(), ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(ModelError::Validation(format!("{field} too long (max {max_len})")));
    }
    Ok(())
}

pub fn length_between(field: &str, value: &str, min: usize, max: usize) -> Result<(), ModelError> {
    let n = value.trim().chars().count();
    if n < min || n > max {
        return Err(ModelError::Validation(format!("{field} must be {min}..={max} characters")));
    }
    Ok(())
}

pub fn http_url(field: &str, value: &str) -> Result<(), ModelError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) || value.len() < 10 {
        return Err(ModelError::Validation(format!("{field} must be an http(s) URL")));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ModelError> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || !domain.contains('.') || value.contains(char::is_whitespace) || value.len() > 255 {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

/// E.164: leading `+` then 8 to 15 digits.
pub fn phone(value: &str) -> Result<(), ModelError> {
    let digits = value.strip_prefix('+').unwrap_or("");
    if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("phone must be E.164 (+ and 8 to 15 digits)".into()));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: i64) -> Result<(), ModelError> {
    if value < 0 {
        return Err(ModelError::Validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

pub fn positive(field: &str, value: i64) -> Result<(), ModelError> {
    if value <= 0 {
        return Err(ModelError::Validation(format!("{field} must be > 0")));
    }
    Ok(())
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn iso_date(field: &str, value: &str) -> Result<(), ModelError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ModelError::Validation(format!("{field} must be YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(email("jane@example.com").is_ok());
        assert!(email("jane.example.com").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("jane@localhost").is_err());
        assert!(email("ja ne@example.com").is_err());
    }

    #[test]
    fn phone_rules() {
        assert!(phone("+33612345678").is_ok());
        assert!(phone("0612345678").is_err());
        assert!(phone("+33 6 12").is_err());
        assert!(phone("+1234567").is_err());
    }

    #[test]
    fn required_trims_and_bounds() {
        assert!(required("name", "  ", 10).is_err());
        assert!(required("name", "abc", 2).is_err());
        assert!(required("name", "abc", 3).is_ok());
    }

    #[test]
    fn iso_date_rules() {
        assert!(iso_date("d", "2027-06-30").is_ok());
        assert!(iso_date("d", "2027-02-30").is_err());
        assert!(iso_date("d", "30/06/2027").is_err());
    }

    #[test]
    fn http_url_rules() {
        assert!(http_url("url", "https://cdn.example.com/a.jpg").is_ok());
        assert!(http_url("url", "ftp://cdn.example.com/a.jpg").is_err());
    }
}
