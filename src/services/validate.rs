//! Input checks shared by the CRUD services.

use chrono::NaiveDate;

use crate::error::{AppError, Result};

/// Trimmed value, or a validation error when blank.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed value, with blank treated as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Money must be finite and non-negative.
pub(crate) fn amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

pub(crate) fn date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(AppError::validation(format!(
            "end date {end} is before start date {start}"
        )));
    }
    Ok(())
}
