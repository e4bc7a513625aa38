use rust_decimal::Decimal;

use crate::error::{ApiError, FieldErrors};

/// Collects per-field problems so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, field: &str, ok: bool, message: impl Into<String>) -> Self {
        if !ok && !self.errors.contains_key(field) {
            self.errors.insert(field.to_string(), message.into());
        }
        self
    }

    pub fn length(self, field: &str, value: &str, min: usize, max: usize) -> Self {
        let len = value.chars().count();
        self.check(
            field,
            (min..=max).contains(&len),
            format!("must be between {} and {} characters", min, max),
        )
    }

    pub fn optional_length(self, field: &str, value: Option<&str>, min: usize, max: usize) -> Self {
        match value {
            Some(v) => self.length(field, v, min, max),
            None => self,
        }
    }

    /// Rejects an explicit `null` for a column that cannot hold one.
    pub fn not_null<T>(self, field: &str, value: &Option<Option<T>>) -> Self {
        self.check(field, !matches!(value, Some(None)), "cannot be null")
    }

    pub fn non_negative(self, field: &str, value: Option<i32>) -> Self {
        self.check(field, value.map_or(true, |v| v >= 0), "must be zero or greater")
    }

    pub fn fraction(self, field: &str, value: Option<Decimal>) -> Self {
        self.check(
            field,
            value.map_or(true, |v| v >= Decimal::ZERO && v <= Decimal::ONE),
            "must be between 0 and 1",
        )
    }

    pub fn url(self, field: &str, value: Option<&str>) -> Self {
        self.check(field, value.map_or(true, |v| url::Url::parse(v).is_ok()), "must be a valid URL")
    }

    pub fn email(self, field: &str, value: Option<&str>) -> Self {
        let ok = value.map_or(true, |v| {
            let len = v.chars().count();
            (6..=60).contains(&len) && v.find('@').is_some_and(|at| at > 0)
        });
        self.check(field, ok, "must be a valid email address")
    }

    pub fn finish(self, message: &str) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, Some(self.errors)))
        }
    }
}
