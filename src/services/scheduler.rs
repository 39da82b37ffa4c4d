use crate::project::ProjectManifest;
use crate::services::dependency::{fulfill_parents, in_scope, parents_of_all_packages};
use serde::Serialize;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    #[error("dependency cycle among packages: {0}")]
    CycleDetected(String),
}

/// Ordered build waves; every package in a wave can build in parallel once the
/// previous waves complete.
#[derive(Debug, Serialize, Clone)]
pub struct BuildPlan {
    pub waves: Vec<Vec<String>>,
}

pub fn build_plan(
    project: &ProjectManifest,
    filter: Option<&[String]>,
    completed: &HashSet<String>,
) -> anyhow::Result<BuildPlan> {
    let mut parents = parents_of_all_packages(project, filter);
    let mut done = completed.clone();
    fulfill_parents(&mut parents, &done);

    // manifest order, minus anything already built
    let mut pending: Vec<String> = project
        .packages
        .iter()
        .filter(|p| in_scope(filter, &p.name) && !done.contains(&p.name))
        .map(|p| p.name.clone())
        .collect();

    let mut waves = Vec::new();
    while !pending.is_empty() {
        let wave: Vec<String> = pending
            .iter()
            .filter(|name| parents.get(*name).map(|v| v.is_empty()).unwrap_or(true))
            .cloned()
            .collect();

        if wave.is_empty() {
            return Err(ScheduleError::CycleDetected(pending.join(", ")).into());
        }

        for name in &wave {
            done.insert(name.clone());
        }
        pending.retain(|name| !wave.contains(name));
        fulfill_parents(&mut parents, &done);
        waves.push(wave);
    }

    Ok(BuildPlan { waves })
}
