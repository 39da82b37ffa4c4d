use crate::project::ProjectManifest;
use std::collections::{BTreeMap, HashSet};

/// Package name -> ordered related package names (parents or children).
pub type AdjacencyList = BTreeMap<String, Vec<String>>;

pub(crate) fn in_scope(filter: Option<&[String]>, name: &str) -> bool {
    filter.map(|f| f.iter().any(|p| p == name)).unwrap_or(true)
}

/// For every package in scope, the packages that declare a dependency on it.
/// Children lists keep manifest order and may repeat a name when a package
/// declares the same dependency more than once.
pub fn children_of_all_packages(
    project: &ProjectManifest,
    filter: Option<&[String]>,
) -> AdjacencyList {
    let mut dag = AdjacencyList::new();
    for pkg in &project.packages {
        if !in_scope(filter, &pkg.name) {
            continue;
        }
        let mut dependents = Vec::new();
        for other in &project.packages {
            for dep in &other.dependencies {
                if dep.package == pkg.name && in_scope(filter, &other.name) {
                    dependents.push(other.name.clone());
                }
            }
        }
        dag.insert(pkg.name.clone(), dependents);
    }
    dag
}

/// For every package in scope, the deduplicated list of its dependencies that
/// exist in the project. Dependencies on packages outside the manifest (or
/// outside the filter set) are dropped, not rewritten.
pub fn parents_of_all_packages(
    project: &ProjectManifest,
    filter: Option<&[String]>,
) -> AdjacencyList {
    let known: HashSet<&str> = project.packages.iter().map(|p| p.name.as_str()).collect();

    let mut dag = AdjacencyList::new();
    for pkg in &project.packages {
        if !in_scope(filter, &pkg.name) {
            continue;
        }
        let mut parents: Vec<String> = Vec::new();
        for dep in &pkg.dependencies {
            if known.contains(dep.package.as_str())
                && !parents.iter().any(|p| p == &dep.package)
                && in_scope(filter, &dep.package)
            {
                parents.push(dep.package.clone());
            }
        }
        dag.insert(pkg.name.clone(), parents);
    }
    dag
}

/// Drop parents already built, leaving only unmet prerequisites. A package
/// becomes buildable once its list drains to empty.
pub fn fulfill_parents(parents: &mut AdjacencyList, completed: &HashSet<String>) {
    for remaining in parents.values_mut() {
        remaining.retain(|p| !completed.contains(p));
    }
}
