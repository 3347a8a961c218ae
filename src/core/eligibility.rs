use crate::domain::model::CatalogItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityVerdict {
    /// The applicant entered neither a GPA nor an IELTS score.
    Unknown,
    Eligible,
    Ineligible,
}

impl EligibilityVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            EligibilityVerdict::Unknown => "",
            EligibilityVerdict::Eligible => "Eligible",
            EligibilityVerdict::Ineligible => "Not Eligible",
        }
    }
}

/// Scores one item against the applicant's optional GPA and IELTS.
///
/// A missing score skips that check. Meeting a requirement exactly passes.
pub fn evaluate(
    item: &CatalogItem,
    user_gpa: Option<f64>,
    user_ielts: Option<f64>,
) -> EligibilityVerdict {
    if user_gpa.is_none() && user_ielts.is_none() {
        return EligibilityVerdict::Unknown;
    }

    let gpa_ok = user_gpa.map_or(true, |gpa| gpa >= item.required_gpa);
    let ielts_ok = user_ielts.map_or(true, |ielts| ielts >= item.required_ielts);

    if gpa_ok && ielts_ok {
        EligibilityVerdict::Eligible
    } else {
        EligibilityVerdict::Ineligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::fixtures::item;
    use crate::domain::model::DegreeLevel;

    fn demanding_item() -> CatalogItem {
        let mut item = item(1, "UK", DegreeLevel::Master, 30_000.0);
        item.required_gpa = 3.5;
        item.required_ielts = 6.5;
        item
    }

    #[test]
    fn test_no_scores_is_unknown() {
        for fee in [0.0, 10_000.0, 55_000.0] {
            let item = item(2, "USA", DegreeLevel::PhD, fee);
            assert_eq!(evaluate(&item, None, None), EligibilityVerdict::Unknown);
        }
    }

    #[test]
    fn test_boundary_values_pass() {
        let item = demanding_item();
        assert_eq!(evaluate(&item, Some(3.5), Some(6.5)), EligibilityVerdict::Eligible);
        assert_eq!(evaluate(&item, Some(3.4), Some(6.5)), EligibilityVerdict::Ineligible);
        assert_eq!(evaluate(&item, Some(3.5), Some(6.0)), EligibilityVerdict::Ineligible);
    }

    #[test]
    fn test_missing_score_skips_check() {
        let item = demanding_item();
        assert_eq!(evaluate(&item, None, Some(7.0)), EligibilityVerdict::Eligible);
        assert_eq!(evaluate(&item, Some(3.9), None), EligibilityVerdict::Eligible);
        assert_eq!(evaluate(&item, None, Some(5.5)), EligibilityVerdict::Ineligible);
    }
}
