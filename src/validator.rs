use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::HrError;

/// Collects per-field messages; the first message for a field wins.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), HrError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> HrError {
        HrError::FailedValidation(self.errors)
    }

    pub fn email(&mut self, email: &str) {
        self.check(!email.trim().is_empty(), "email", "must be provided");
        self.check(is_email(email), "email", "must be a valid email address");
    }

    pub fn password(&mut self, password: &str) {
        self.check(!password.is_empty(), "password", "must be provided");
        self.check(password.len() >= 8, "password", "must be at least 8 bytes long");
        self.check(password.len() <= 72, "password", "must not be more than 72 bytes long");
    }

    /// Parses `YYYY-MM-DD`, recording an error for `field` on failure.
    pub fn date(&mut self, raw: &str, field: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add_error(field, "must be a valid date (YYYY-MM-DD)");
                None
            }
        }
    }
}

fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
        && !email.chars().any(char::is_whitespace)
}
