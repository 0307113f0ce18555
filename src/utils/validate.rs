use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::error::{AppError, AppResult};

// E.164-like: optional leading +, no leading zero, 8 to 15 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{7,14}$").unwrap());

pub const MAX_MILEAGE: i32 = 9_999_999;

pub fn phone_number(value: &str) -> AppResult<()> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::validation(
            "phone_number",
            "must be a valid phone number",
        ))
    }
}

/// A service date may be today, never later.
pub fn service_date(value: NaiveDate) -> AppResult<()> {
    if value > Utc::now().date_naive() {
        Err(AppError::validation(
            "service_date",
            "Service date cannot be in the future.",
        ))
    } else {
        Ok(())
    }
}

pub fn service_mileage(value: i32) -> AppResult<()> {
    if (0..=MAX_MILEAGE).contains(&value) {
        Ok(())
    } else {
        Err(AppError::validation(
            "mileage",
            format!("must be between 0 and {}", MAX_MILEAGE),
        ))
    }
}

pub fn vehicle_mileage(value: i32) -> AppResult<()> {
    if value >= 0 {
        Ok(())
    } else {
        Err(AppError::validation("mileage", "must not be negative"))
    }
}

pub fn taxonomy_name(value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::validation("name", "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    #[test]
    fn phone_number_pattern() {
        assert!(phone_number("+15551234567").is_ok());
        assert!(phone_number("989123456789").is_ok());
        assert!(phone_number("+0123456789").is_err());
        assert!(phone_number("12345").is_err());
        assert!(phone_number("not-a-number").is_err());
        assert!(phone_number("").is_err());
    }

    #[test]
    fn service_date_today_is_accepted() {
        assert!(service_date(Utc::now().date_naive()).is_ok());
    }

    #[test]
    fn service_date_tomorrow_is_rejected() {
        let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap();
        assert!(service_date(tomorrow).is_err());
    }

    #[test]
    fn service_mileage_range() {
        assert!(service_mileage(0).is_ok());
        assert!(service_mileage(MAX_MILEAGE).is_ok());
        assert!(service_mileage(-1).is_err());
        assert!(service_mileage(MAX_MILEAGE + 1).is_err());
    }

    #[test]
    fn taxonomy_name_must_not_be_blank() {
        assert!(taxonomy_name("Car").is_ok());
        assert!(taxonomy_name("").is_err());
        assert!(taxonomy_name("   ").is_err());
    }
}
