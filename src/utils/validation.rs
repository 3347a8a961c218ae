use crate::utils::error::{FinderError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FinderError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FinderError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FinderError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(FinderError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FinderError::Validation {
            message: format!("{} cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(FinderError::Validation {
            message: format!("{} is not a valid email address: {}", field_name, trimmed),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both bounds, so it is rejected too.
    if !(min..=max).contains(&value) {
        return Err(FinderError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("service.base_url", "https://example.com").is_ok());
        assert!(validate_url("service.base_url", "http://localhost:5000").is_ok());
        assert!(validate_url("service.base_url", "").is_err());
        assert!(validate_url("service.base_url", "invalid-url").is_err());
        assert!(validate_url("service.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("query.quiescence_ms", 300, 1).is_ok());
        assert!(validate_positive_number("query.quiescence_ms", 0, 1).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "jane@example.com").is_ok());
        assert!(validate_email("email", "  ").is_err());
        assert!(validate_email("email", "jane.example.com").is_err());
        assert!(validate_email("email", "@example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("filters.fee_ceiling", 60000.0, 0.0, 1_000_000.0).is_ok());
        assert!(validate_range("filters.fee_floor", -1.0, 0.0, 1_000_000.0).is_err());
    }
}
