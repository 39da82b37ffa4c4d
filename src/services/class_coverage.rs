use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassCoverage {
    pub name: String,
    pub covered_percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualValidationOutcome {
    pub result: bool,
    pub classes_with_invalid_coverage: Vec<ClassCoverage>,
}

/// Every class and trigger must individually meet the threshold; the failing
/// subset is returned for reporting.
pub fn validate_individual_class_coverage(
    classes: &[ClassCoverage],
    threshold: u64,
) -> IndividualValidationOutcome {
    let classes_with_invalid_coverage: Vec<ClassCoverage> = classes
        .iter()
        .filter(|c| c.covered_percent < threshold as f64)
        .cloned()
        .collect();
    IndividualValidationOutcome {
        result: classes_with_invalid_coverage.is_empty(),
        classes_with_invalid_coverage,
    }
}
