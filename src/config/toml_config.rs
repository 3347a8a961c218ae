use crate::core::criteria::FeeBounds;
use crate::core::session::SessionOptions;
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Upper limit accepted for the fee ceiling.
const MAX_FEE_CEILING: f64 = 1_000_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub service: ServiceConfig,
    pub query: QueryConfig,
    pub filters: FiltersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: Some(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub quiescence_ms: u64,
    pub abort_superseded: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: 300,
            abort_superseded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub fee_floor: f64,
    pub fee_ceiling: f64,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        let bounds = FeeBounds::default();
        Self {
            fee_floor: bounds.floor,
            fee_ceiling: bounds.ceiling,
        }
    }
}

impl FinderConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FinderError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML text after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FinderError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value. Unset variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FinderError::Config {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("service.base_url", &self.service.base_url)?;

        if let Some(timeout) = self.service.timeout_seconds {
            validate_positive_number("service.timeout_seconds", timeout, 1)?;
        }

        validate_positive_number("query.quiescence_ms", self.query.quiescence_ms, 1)?;

        validate_range("filters.fee_floor", self.filters.fee_floor, 0.0, MAX_FEE_CEILING)?;
        validate_range(
            "filters.fee_ceiling",
            self.filters.fee_ceiling,
            self.filters.fee_floor,
            MAX_FEE_CEILING,
        )?;
        FeeBounds::new(self.filters.fee_floor, self.filters.fee_ceiling)?;

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.service.timeout_seconds.map(Duration::from_secs)
    }

    pub fn fee_bounds(&self) -> FeeBounds {
        FeeBounds {
            floor: self.filters.fee_floor,
            ceiling: self.filters.fee_ceiling,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            quiescence: Duration::from_millis(self.query.quiescence_ms),
            abort_superseded: self.query.abort_superseded,
            fee_bounds: self.fee_bounds(),
            ..SessionOptions::default()
        }
    }
}

impl Validate for FinderConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
