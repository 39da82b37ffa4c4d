use crate::services::org::{OrgQueries, PermsetAssignment};
use serde::Serialize;

#[derive(Debug, Serialize, Default)]
pub struct AssignmentOutcome {
    pub successful: Vec<PermsetAssignment>,
    pub failed: Vec<PermsetAssignment>,
}

/// Assigns the given permission sets to a user. Sets already assigned in the
/// org count as successes; the rest go through the platform CLI one by one.
pub fn assign_permsets(
    org: &dyn OrgQueries,
    username: &str,
    permsets: &[String],
) -> anyhow::Result<AssignmentOutcome> {
    let assigned = org.permset_assignments(username)?;

    let mut outcome = AssignmentOutcome::default();
    for permset in permsets {
        let entry = PermsetAssignment {
            username: username.to_string(),
            permset: permset.clone(),
        };

        if assigned.iter().any(|a| a.permset == *permset) {
            outcome.successful.push(entry);
            continue;
        }

        if run_assign_cli(username, permset).unwrap_or(false) {
            outcome.successful.push(entry);
        } else {
            outcome.failed.push(entry);
        }
    }

    Ok(outcome)
}

fn run_assign_cli(username: &str, permset: &str) -> anyhow::Result<bool> {
    let output = std::process::Command::new("sf")
        .args(["org", "assign", "permset", "-n", permset, "-o", username, "--json"])
        .output()?;
    if !output.status.success() {
        return Ok(false);
    }
    let parsed: serde_json::Value = match serde_json::from_slice(&output.stdout) {
        Ok(v) => v,
        Err(_) => return Ok(false),
    };
    Ok(parsed.get("status").and_then(|s| s.as_i64()) == Some(0))
}
