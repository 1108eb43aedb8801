use crate::utils::error::{LandedCostError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LandedCostError::ConfigValidationError {
            field: field_name.to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LandedCostError::ConfigValidationError {
                field: field_name.to_string(),
                message: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LandedCostError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(LandedCostError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(LandedCostError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Finite and strictly greater than zero.
pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LandedCostError::invalid_input(
            field_name,
            value,
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Finite and zero or more. Used for fees and rates.
pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(LandedCostError::invalid_input(
            field_name,
            value,
            "must not be negative",
        ));
    }
    Ok(())
}

pub fn validate_quantity(field_name: &str, value: u64) -> Result<()> {
    if value < 1 {
        return Err(LandedCostError::invalid_input(
            field_name,
            value,
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Classification codes are digits only, optionally with the dots used in
/// printed tariff schedules (`6109.10.00`).
pub fn validate_classification_prefix(field_name: &str, code: &str, min_digits: usize) -> Result<()> {
    let digits = code.chars().filter(|c| *c != '.').collect::<String>();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(LandedCostError::invalid_input(
            field_name,
            code,
            "classification code must contain only digits",
        ));
    }
    if digits.len() < min_digits {
        return Err(LandedCostError::invalid_input(
            field_name,
            code,
            format!("enter at least {} digits", min_digits),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LandedCostError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
