use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use url::Url;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_HANDLE_LEN: usize = 512;
pub const MAX_TITLE_LEN: usize = 512;
pub const MAX_URL_LEN: usize = 2048;
pub const MAX_INFO_LEN: usize = 10_000;
pub const MAX_TASKS_PER_AIRDROP: usize = 256;

pub const REQUIRED: &str = "Required";

/// A request field that distinguishes omission (`None`) from an explicit `null` (`Some(None)`).
pub type Nullable<T> = Option<Option<T>>;

/// Field-level validation failures keyed by the wire name of the field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }

    /// Returns `value` when nothing was recorded, otherwise the collected errors.
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Unwraps a field that may be absent but must not be `null`.
    pub fn non_null<T>(&mut self, field: &str, value: Nullable<T>, expected: &str) -> Option<T> {
        match value {
            Some(None) => {
                self.push(field, format!("Expected {expected}, received null"));
                None
            }
            other => other.flatten(),
        }
    }

    /// Records a missing required field. An explicit `null` counts as a type error, not a miss.
    pub fn required<T>(&mut self, field: &str, value: Nullable<T>, expected: &str) -> Option<T> {
        if value.is_none() {
            self.push(field, REQUIRED);
        }
        self.non_null(field, value, expected)
    }

    /// Like [`FieldErrors::check`] but a missing value is an error too.
    pub fn require<T>(
        &mut self,
        field: &str,
        value: Nullable<String>,
        check: impl FnOnce(&str) -> Result<T>,
    ) -> Option<T> {
        let value = self.required(field, value, "string")?;
        self.check(field, Some(Some(value)), check)
    }

    /// Runs `check` on a present string value, recording its error under `field`.
    pub fn check<T>(
        &mut self,
        field: &str,
        value: Nullable<String>,
        check: impl FnOnce(&str) -> Result<T>,
    ) -> Option<T> {
        let value = self.non_null(field, value, "string")?;
        match check(&value) {
            Ok(valid) => Some(valid),
            Err(err) => {
                self.push(field, err.to_string());
                None
            }
        }
    }
}

pub fn sanitize_text(value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("String must contain at least 1 character(s)"));
    }
    if trimmed.chars().count() > max_len {
        return Err(anyhow!("String exceeds {max_len} character limit"));
    }
    Ok(trimmed.to_string())
}

/// Accepts any absolute URL, whatever its scheme. The trimmed input is stored as given, not normalized.
pub fn sanitize_url(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Invalid url"));
    }
    if trimmed.len() > MAX_URL_LEN {
        return Err(anyhow!("Url exceeds {MAX_URL_LEN} character limit"));
    }
    // Relative references and special schemes without a host fail to parse.
    Url::parse(trimmed).map_err(|_| anyhow!("Invalid url"))?;
    Ok(trimmed.to_string())
}

pub fn sanitize_name(value: &str) -> Result<String> {
    sanitize_text(value, MAX_NAME_LEN)
}

pub fn sanitize_handle(value: &str) -> Result<String> {
    sanitize_text(value, MAX_HANDLE_LEN)
}

pub fn sanitize_title(value: &str) -> Result<String> {
    sanitize_text(value, MAX_TITLE_LEN)
}

pub fn sanitize_info(value: &str) -> Result<String> {
    sanitize_text(value, MAX_INFO_LEN)
}
