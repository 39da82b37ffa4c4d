use crate::project::{PackageDescriptor, PackageType};
use crate::services::class_coverage::{validate_individual_class_coverage, ClassCoverage};
use crate::services::org::OrgQueries;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MINIMUM_COVERAGE_THRESHOLD: u64 = 75;

#[derive(thiserror::Error, Debug)]
pub enum CoverageError {
    #[error("package {0} has no measurable coverage data")]
    NoCoverageData(String),
    #[error("unhandled package type: {0}")]
    UnhandledPackageType(String),
}

/// One class or trigger in the test-run coverage report. A null
/// `coveredPercent` means no applicable data point; the record is excluded
/// from the aggregate entirely.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRecord {
    pub name: String,
    pub covered_percent: Option<f64>,
    pub total_lines: u64,
    pub total_covered: u64,
}

pub fn load_coverage_report(path: &Path) -> anyhow::Result<Vec<CoverageRecord>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read coverage report {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&raw)?)
}

#[derive(Debug, Serialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub percent: u64,
    pub total_lines: u64,
    pub total_covered: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageValidationResult {
    pub result: bool,
    pub package_test_coverage: u64,
    pub classes_covered: Vec<ClassCoverage>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes_with_invalid_coverage: Option<Vec<ClassCoverage>>,
}

/// Aggregates a package's coverage from a test-run report and validates it
/// against the policy for the package's type. The aggregate is computed once
/// per instance and reused by later calls.
pub struct PackageTestCoverage<'a> {
    pkg: &'a PackageDescriptor,
    report: &'a [CoverageRecord],
    summary: Option<CoverageSummary>,
}

impl<'a> PackageTestCoverage<'a> {
    pub fn new(pkg: &'a PackageDescriptor, report: &'a [CoverageRecord]) -> Self {
        Self {
            pkg,
            report,
            summary: None,
        }
    }

    /// Classes and triggers of the package that never appear in the report:
    /// nothing executed them, so the report has no record at all.
    fn untouched(names: &[String], report: &[CoverageRecord]) -> Vec<String> {
        names
            .iter()
            .filter(|name| !report.iter().any(|rec| rec.name == **name))
            .cloned()
            .collect()
    }

    fn filtered_report(&self) -> Vec<&'a CoverageRecord> {
        self.report
            .iter()
            .filter(|rec| {
                self.pkg.classes.iter().any(|c| *c == rec.name)
                    || self.pkg.triggers.iter().any(|t| *t == rec.name)
            })
            .collect()
    }

    pub fn aggregate(&mut self, org: &dyn OrgQueries) -> anyhow::Result<CoverageSummary> {
        if let Some(summary) = self.summary {
            return Ok(summary);
        }

        let mut total_lines: u64 = 0;
        let mut total_covered: u64 = 0;
        for rec in self.filtered_report() {
            if rec.covered_percent.is_some() {
                total_lines += rec.total_lines;
                total_covered += rec.total_covered;
            }
        }

        let mut entity_ids: Vec<String> = Vec::new();
        let untouched_classes = Self::untouched(&self.pkg.classes, self.report);
        if !untouched_classes.is_empty() {
            entity_ids.extend(
                org.apex_class_ids(&untouched_classes)?
                    .into_iter()
                    .map(|r| r.id),
            );
        }
        let untouched_triggers = Self::untouched(&self.pkg.triggers, self.report);
        if !untouched_triggers.is_empty() {
            entity_ids.extend(org.trigger_ids(&untouched_triggers)?.into_iter().map(|r| r.id));
        }

        // never-tested code widens the denominator only
        if !entity_ids.is_empty() {
            for rec in org.uncovered_line_aggregates(&entity_ids)? {
                total_lines += rec.num_lines_uncovered;
            }
        }

        if total_lines == 0 {
            return Err(CoverageError::NoCoverageData(self.pkg.name.clone()).into());
        }

        let summary = CoverageSummary {
            percent: total_covered * 100 / total_lines,
            total_lines,
            total_covered,
        };
        self.summary = Some(summary);
        Ok(summary)
    }

    pub fn individual_class_coverage(&self) -> Vec<ClassCoverage> {
        let mut out: Vec<ClassCoverage> = self
            .filtered_report()
            .iter()
            .filter_map(|rec| {
                rec.covered_percent.map(|pct| ClassCoverage {
                    name: rec.name.clone(),
                    covered_percent: pct,
                })
            })
            .collect();

        for name in Self::untouched(&self.pkg.classes, self.report) {
            out.push(ClassCoverage {
                name,
                covered_percent: 0.0,
            });
        }
        for name in Self::untouched(&self.pkg.triggers, self.report) {
            out.push(ClassCoverage {
                name,
                covered_percent: 0.0,
            });
        }
        out
    }

    pub fn validate(
        &mut self,
        org: &dyn OrgQueries,
        threshold: Option<u64>,
    ) -> anyhow::Result<CoverageValidationResult> {
        let summary = self.aggregate(org)?;
        let classes_covered = self.individual_class_coverage();
        let threshold = threshold
            .unwrap_or(MINIMUM_COVERAGE_THRESHOLD)
            .max(MINIMUM_COVERAGE_THRESHOLD);

        match self.pkg.package_type {
            PackageType::Unlocked => {
                if summary.percent < threshold {
                    Ok(CoverageValidationResult {
                        result: false,
                        package_test_coverage: summary.percent,
                        classes_covered,
                        message: format!(
                            "The package has an overall coverage of {}%, which does not meet the required overall coverage of {}%",
                            summary.percent, threshold
                        ),
                        classes_with_invalid_coverage: None,
                    })
                } else {
                    Ok(CoverageValidationResult {
                        result: true,
                        package_test_coverage: summary.percent,
                        classes_covered,
                        message: format!("Package overall coverage is greater than {}%", threshold),
                        classes_with_invalid_coverage: None,
                    })
                }
            }
            PackageType::Source | PackageType::Diff => {
                let outcome = validate_individual_class_coverage(&classes_covered, threshold);
                let message = if outcome.result {
                    format!("Individual coverage of classes is greater than {}%", threshold)
                } else {
                    format!(
                        "There are classes that do not satisfy the minimum code coverage of {}%",
                        threshold
                    )
                };
                Ok(CoverageValidationResult {
                    result: outcome.result,
                    package_test_coverage: summary.percent,
                    classes_covered,
                    message,
                    classes_with_invalid_coverage: Some(outcome.classes_with_invalid_coverage),
                })
            }
            other => Err(CoverageError::UnhandledPackageType(other.to_string()).into()),
        }
    }
}
