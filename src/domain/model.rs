use crate::utils::error::{FinderError, Result};
use crate::utils::validation::{validate_email, validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_GPA: f64 = 4.0;
pub const MAX_IELTS: f64 = 9.0;

/// Stable catalog identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Degree level in the catalog's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DegreeLevel {
    Bachelor,
    Master,
    PhD,
}

impl DegreeLevel {
    /// Value sent as `degree_level` to the catalog service.
    pub fn as_catalog_str(&self) -> &'static str {
        match self {
            DegreeLevel::Bachelor => "Bachelor",
            DegreeLevel::Master => "Master",
            DegreeLevel::PhD => "PhD",
        }
    }

    /// Possessive label used by the search form ("Bachelor's", "Master's", "PhD").
    pub fn display_label(&self) -> &'static str {
        match self {
            DegreeLevel::Bachelor => "Bachelor's",
            DegreeLevel::Master => "Master's",
            DegreeLevel::PhD => "PhD",
        }
    }

    /// Accepts both the form labels and the catalog vocabulary, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().trim_end_matches("'s").to_ascii_lowercase();
        match normalized.as_str() {
            "bachelor" => Some(DegreeLevel::Bachelor),
            "master" => Some(DegreeLevel::Master),
            "phd" => Some(DegreeLevel::PhD),
            _ => None,
        }
    }
}

impl fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// Wire shape of a university record. Only used at the service boundary.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogRecord {
    id: u64,
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    country: String,
    degree_level: DegreeLevel,
    tuition_fee: f64,
    #[serde(default)]
    required_gpa: Option<f64>,
    #[serde(default)]
    required_ielts: Option<f64>,
    ranking: u32,
    #[serde(default)]
    logo_url: Option<String>,
}

/// One institution in the catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub city: String,
    pub country: String,
    pub degree_level: DegreeLevel,
    pub tuition_fee: f64,
    pub required_gpa: f64,
    pub required_ielts: f64,
    pub ranking: u32,
    pub logo_url: Option<String>,
}

impl CatalogItem {
    /// Up to two uppercase initials, shown when the item has no logo.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

impl TryFrom<CatalogRecord> for CatalogItem {
    type Error = FinderError;

    fn try_from(record: CatalogRecord) -> Result<Self> {
        let invalid = |reason: String| FinderError::InvalidRecord {
            reason: format!("university {}: {}", record.id, reason),
        };

        if !record.tuition_fee.is_finite() || record.tuition_fee < 0.0 {
            return Err(invalid(format!(
                "tuition_fee must be non-negative, got {}",
                record.tuition_fee
            )));
        }

        let required_gpa = record.required_gpa.unwrap_or(0.0);
        if !(0.0..=MAX_GPA).contains(&required_gpa) {
            return Err(invalid(format!(
                "required_gpa must be within 0-{}, got {}",
                MAX_GPA, required_gpa
            )));
        }

        let required_ielts = record.required_ielts.unwrap_or(0.0);
        if !(0.0..=MAX_IELTS).contains(&required_ielts) {
            return Err(invalid(format!(
                "required_ielts must be within 0-{}, got {}",
                MAX_IELTS, required_ielts
            )));
        }

        if record.ranking == 0 {
            return Err(invalid("ranking must be positive".to_string()));
        }

        Ok(CatalogItem {
            id: ItemId(record.id),
            name: record.name,
            city: record.city,
            country: record.country,
            degree_level: record.degree_level,
            tuition_fee: record.tuition_fee,
            required_gpa,
            required_ielts,
            ranking: record.ranking,
            logo_url: record.logo_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

/// Decodes a JSON array of catalog records, skipping records that fail validation.
pub fn decode_catalog(payload: serde_json::Value) -> Result<Vec<CatalogItem>> {
    let serde_json::Value::Array(entries) = payload else {
        return Err(FinderError::InvalidRecord {
            reason: "expected a JSON array of universities".to_string(),
        });
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let item = serde_json::from_value::<CatalogRecord>(entry)
            .map_err(FinderError::from)
            .and_then(CatalogItem::try_from);
        match item {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!("⚠️ Skipping catalog record: {}", e),
        }
    }
    Ok(items)
}

/// Body of `POST /universities/applications`. Form values are forwarded as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub university_id: ItemId,
    pub university_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub gpa: String,
    pub ielts: String,
    pub message: String,
}

impl ApplicationRequest {
    pub fn for_item(item: &CatalogItem) -> Self {
        Self {
            university_id: item.id,
            university_name: item.name.clone(),
            ..Self::default()
        }
    }
}

impl Validate for ApplicationRequest {
    /// Only the fields the service cannot do without are checked here.
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("university_name", &self.university_name)?;
        validate_non_empty_string("full_name", &self.full_name)?;
        validate_email("email", &self.email)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationAck {
    pub university_id: ItemId,
    pub message: String,
    pub received_at: DateTime<Utc>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_degree_labels_translate_to_catalog_vocabulary() {
        assert_eq!(DegreeLevel::from_label("Bachelor's"), Some(DegreeLevel::Bachelor));
        assert_eq!(DegreeLevel::from_label("Master"), Some(DegreeLevel::Master));
        assert_eq!(DegreeLevel::from_label("phd"), Some(DegreeLevel::PhD));
        assert_eq!(DegreeLevel::from_label("All Degrees"), None);
        assert_eq!(DegreeLevel::Master.as_catalog_str(), "Master");
        assert_eq!(DegreeLevel::Master.display_label(), "Master's");
    }

    #[test]
    fn test_decode_catalog_skips_invalid_records() {
        let payload = json!([
            {"id": 1, "name": "Harvard University", "city": "Cambridge", "country": "USA",
             "degree_level": "Master", "tuition_fee": 52000, "required_gpa": 3.8,
             "required_ielts": 7.5, "ranking": 4},
            {"id": 2, "name": "Broken", "degree_level": "Master", "tuition_fee": -1, "ranking": 9},
            {"id": 3, "name": "No Thresholds", "degree_level": "PhD", "tuition_fee": 0, "ranking": 12},
            {"id": 4, "name": "Bad Degree", "degree_level": "Diploma", "tuition_fee": 10, "ranking": 1}
        ]);

        let items = decode_catalog(payload).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, ItemId(1));
        assert_eq!(items[0].degree_level, DegreeLevel::Master);
        assert_eq!(items[1].required_gpa, 0.0);
        assert_eq!(items[1].required_ielts, 0.0);
    }

    #[test]
    fn test_decode_catalog_rejects_non_array() {
        assert!(decode_catalog(json!({"error": "nope"})).is_err());
    }

    #[test]
    fn test_initials() {
        let mut item = fixtures::item(1, "UK", DegreeLevel::PhD, 1000.0);
        item.name = "university of oxford".to_string();
        assert_eq!(item.initials(), "UO");
        item.name = "MIT".to_string();
        assert_eq!(item.initials(), "M");
    }

    #[test]
    fn test_application_request_serializes_contract_fields() {
        let item = fixtures::item(7, "UK", DegreeLevel::Master, 20000.0);
        let mut request = ApplicationRequest::for_item(&item);
        request.full_name = "Jane Doe".to_string();

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["university_id"], json!(7));
        assert_eq!(body["university_name"], json!("University 7"));
        assert_eq!(body["full_name"], json!("Jane Doe"));
        for key in ["email", "phone", "country", "gpa", "ielts", "message"] {
            assert!(body.get(key).is_some(), "missing {}", key);
        }
    }
}
