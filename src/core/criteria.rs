//! Filter criteria and the store that normalizes user edits.
//!
//! Edits arrive as raw form text. Every edit is coerced field by field, so a
//! [`FilterCriteria`] snapshot is never partially invalid:
//!
//! - unparseable numbers become "absent", never zero
//! - fee bounds are clamped to the configured [`FeeBounds`] and `min <= max`
//! - unknown country or degree labels fall back to "All"

use crate::domain::model::{CatalogItem, DegreeLevel, MAX_GPA, MAX_IELTS};
use crate::utils::error::{FinderError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountryFilter {
    #[default]
    All,
    Usa,
    Uk,
    Canada,
    Australia,
    Germany,
}

impl CountryFilter {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "usa" | "us" | "united states" => CountryFilter::Usa,
            "uk" | "united kingdom" => CountryFilter::Uk,
            "canada" => CountryFilter::Canada,
            "australia" => CountryFilter::Australia,
            "germany" => CountryFilter::Germany,
            _ => CountryFilter::All,
        }
    }

    /// Value the catalog uses in its `country` field, `None` for "All".
    pub fn as_catalog_str(&self) -> Option<&'static str> {
        match self {
            CountryFilter::All => None,
            CountryFilter::Usa => Some("USA"),
            CountryFilter::Uk => Some("UK"),
            CountryFilter::Canada => Some("Canada"),
            CountryFilter::Australia => Some("Australia"),
            CountryFilter::Germany => Some("Germany"),
        }
    }
}

impl fmt::Display for CountryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_catalog_str().unwrap_or("All Countries"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegreeFilter {
    #[default]
    All,
    Only(DegreeLevel),
}

impl DegreeFilter {
    pub fn from_label(label: &str) -> Self {
        DegreeLevel::from_label(label).map_or(DegreeFilter::All, DegreeFilter::Only)
    }
}

impl fmt::Display for DegreeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreeFilter::All => f.write_str("All Degrees"),
            DegreeFilter::Only(level) => f.write_str(level.display_label()),
        }
    }
}

/// Configured limits for the tuition fee slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBounds {
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for FeeBounds {
    fn default() -> Self {
        Self {
            floor: 0.0,
            ceiling: 60_000.0,
        }
    }
}

impl FeeBounds {
    /// Bounds must be finite, non-negative and ordered.
    pub fn new(floor: f64, ceiling: f64) -> Result<Self> {
        if !floor.is_finite() || !ceiling.is_finite() || floor < 0.0 || floor > ceiling {
            return Err(FinderError::InvalidConfigValue {
                field: "filters".to_string(),
                value: format!("{}..{}", floor, ceiling),
                reason: "fee bounds must be finite, non-negative and floor <= ceiling".to_string(),
            });
        }
        Ok(Self { floor, ceiling })
    }

    /// Unusable bounds are replaced by the defaults.
    fn sanitized(self) -> Self {
        match Self::new(self.floor, self.ceiling) {
            Ok(bounds) => bounds,
            Err(e) => {
                tracing::warn!("⚠️ {}; falling back to default fee bounds", e);
                Self::default()
            }
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.max(self.floor).min(self.ceiling)
    }
}

/// Inclusive tuition fee range. Always `floor <= min <= max <= ceiling`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeRange {
    min: f64,
    max: f64,
}

impl FeeRange {
    pub fn full(bounds: FeeBounds) -> Self {
        Self {
            min: bounds.floor,
            max: bounds.ceiling,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, fee: f64) -> bool {
        fee >= self.min && fee <= self.max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub country: CountryFilter,
    pub degree: DegreeFilter,
    pub fee_range: FeeRange,
    pub user_gpa: Option<f64>,
    pub user_ielts: Option<f64>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::with_bounds(FeeBounds::default())
    }
}

impl FilterCriteria {
    pub fn with_bounds(bounds: FeeBounds) -> Self {
        Self {
            country: CountryFilter::All,
            degree: DegreeFilter::All,
            fee_range: FeeRange::full(bounds),
            user_gpa: None,
            user_ielts: None,
        }
    }

    /// Local equivalent of the service-side filter: country, degree and fee range.
    /// Applicant scores only drive eligibility, they never hide items.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let country_ok = self
            .country
            .as_catalog_str()
            .map_or(true, |country| item.country.eq_ignore_ascii_case(country));
        let degree_ok = match self.degree {
            DegreeFilter::All => true,
            DegreeFilter::Only(level) => item.degree_level == level,
        };
        country_ok && degree_ok && self.fee_range.contains(item.tuition_fee)
    }

    /// Query string for `GET /universities/filter`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(country) = self.country.as_catalog_str() {
            pairs.push(("country", country.to_string()));
        }
        if let DegreeFilter::Only(level) = self.degree {
            pairs.push(("degree_level", level.as_catalog_str().to_string()));
        }
        pairs.push(("min_fee", self.fee_range.min.to_string()));
        pairs.push(("max_fee", self.fee_range.max.to_string()));
        if let Some(gpa) = self.user_gpa {
            pairs.push(("user_gpa", gpa.to_string()));
        }
        if let Some(ielts) = self.user_ielts {
            pairs.push(("user_ielts", ielts.to_string()));
        }
        pairs
    }
}

/// One user edit, carrying the raw text the user entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaUpdate {
    Country(String),
    Degree(String),
    MinFee(String),
    MaxFee(String),
    UserGpa(String),
    UserIelts(String),
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaChanged {
    pub revision: u64,
    pub criteria: FilterCriteria,
}

#[derive(Debug, Clone)]
pub struct CriteriaStore {
    bounds: FeeBounds,
    current: FilterCriteria,
    revision: u64,
}

impl Default for CriteriaStore {
    fn default() -> Self {
        Self::new(FeeBounds::default())
    }
}

impl CriteriaStore {
    pub fn new(bounds: FeeBounds) -> Self {
        let bounds = bounds.sanitized();
        Self {
            bounds,
            current: FilterCriteria::with_bounds(bounds),
            revision: 0,
        }
    }

    pub fn current(&self) -> &FilterCriteria {
        &self.current
    }

    /// Applies one edit. Always emits exactly one change event, even when the
    /// normalized value is unchanged.
    pub fn update(&mut self, update: CriteriaUpdate) -> CriteriaChanged {
        let mut next = self.current.clone();
        match update {
            CriteriaUpdate::Country(label) => next.country = CountryFilter::from_label(&label),
            CriteriaUpdate::Degree(label) => next.degree = DegreeFilter::from_label(&label),
            CriteriaUpdate::MinFee(raw) => {
                let min = parse_amount(&raw).map_or(self.bounds.floor, |v| self.bounds.clamp(v));
                next.fee_range.min = min.min(next.fee_range.max);
            }
            CriteriaUpdate::MaxFee(raw) => {
                let max = parse_amount(&raw).map_or(self.bounds.ceiling, |v| self.bounds.clamp(v));
                next.fee_range.max = max;
                next.fee_range.min = next.fee_range.min.min(max);
            }
            CriteriaUpdate::UserGpa(raw) => next.user_gpa = parse_amount(&raw).map(|v| v.min(MAX_GPA)),
            CriteriaUpdate::UserIelts(raw) => {
                next.user_ielts = parse_amount(&raw).map(|v| v.min(MAX_IELTS))
            }
            CriteriaUpdate::Reset => next = FilterCriteria::with_bounds(self.bounds),
        }

        self.current = next;
        self.revision += 1;
        tracing::debug!(revision = self.revision, criteria = ?self.current, "criteria updated");

        CriteriaChanged {
            revision: self.revision,
            criteria: self.current.clone(),
        }
    }
}

/// Parses a non-negative, finite number. Anything else is treated as absent.
fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}
