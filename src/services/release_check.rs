use crate::domain::models::{CoverageGate, PlanStatus, ReleaseCheckReport};
use crate::services::analyzers::Finding;

pub fn build_release_check_report(
    manifest: String,
    findings: Vec<Finding>,
    plan: PlanStatus,
    coverage: Option<CoverageGate>,
) -> ReleaseCheckReport {
    let coverage_ok = coverage.as_ref().map(|c| c.status == "passed").unwrap_or(true);
    let overall = if manifest == "ok" && findings.is_empty() && plan.status == "ok" && coverage_ok
    {
        "ok"
    } else {
        "needs_attention"
    }
    .to_string();

    let mut recommendations = Vec::new();
    if manifest != "ok" {
        recommendations
            .push("Run `convoy validate` and fix duplicate package declarations.".to_string());
    }
    if !findings.is_empty() {
        recommendations.push(
            "Run `convoy analyze` and resolve analyzer findings before release.".to_string(),
        );
    }
    if plan.status != "ok" {
        recommendations.push(
            "Run `convoy plan` and break the dependency cycle among the reported packages."
                .to_string(),
        );
    }
    if !coverage_ok {
        recommendations.push(
            "Run `convoy coverage` for the failing package and raise test coverage above the threshold."
                .to_string(),
        );
    }

    ReleaseCheckReport {
        overall,
        manifest,
        findings,
        plan,
        coverage,
        recommendations,
    }
}
