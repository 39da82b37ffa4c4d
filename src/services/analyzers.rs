use crate::project::{PackageDescriptor, ProjectManifest};
use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
pub struct Finding {
    pub analyzer: &'static str,
    pub package: String,
    pub message: String,
}

/// Structural checks over a package declaration. The set of analyzers is
/// closed and assembled at startup.
pub trait PackageAnalyzer {
    fn name(&self) -> &'static str;
    fn is_enabled(&self, pkg: &PackageDescriptor) -> bool;
    fn analyze(&self, project: &ProjectManifest, pkg: &PackageDescriptor) -> Vec<Finding>;
}

pub fn analyzers() -> Vec<Box<dyn PackageAnalyzer>> {
    vec![
        Box::new(DuplicateClassAnalyzer),
        Box::new(MissingDependencyAnalyzer),
        Box::new(SelfDependencyAnalyzer),
    ]
}

pub fn analyze_project(project: &ProjectManifest, only: Option<&str>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for pkg in &project.packages {
        if only.map(|o| o != pkg.name).unwrap_or(false) {
            continue;
        }
        for analyzer in analyzers() {
            if analyzer.is_enabled(pkg) {
                findings.extend(analyzer.analyze(project, pkg));
            }
        }
    }
    findings
}

/// Flags classes or triggers claimed by more than one package. Each pair is
/// reported once, from the later package in manifest order.
struct DuplicateClassAnalyzer;

impl PackageAnalyzer for DuplicateClassAnalyzer {
    fn name(&self) -> &'static str {
        "duplicate-class"
    }

    fn is_enabled(&self, pkg: &PackageDescriptor) -> bool {
        !pkg.classes.is_empty() || !pkg.triggers.is_empty()
    }

    fn analyze(&self, project: &ProjectManifest, pkg: &PackageDescriptor) -> Vec<Finding> {
        let position = project
            .packages
            .iter()
            .position(|p| p.name == pkg.name)
            .unwrap_or(0);
        let earlier = &project.packages[..position];

        let mut findings = Vec::new();
        for unit in pkg.classes.iter().chain(pkg.triggers.iter()) {
            for other in earlier {
                if other.classes.iter().any(|c| c == unit)
                    || other.triggers.iter().any(|t| t == unit)
                {
                    findings.push(Finding {
                        analyzer: self.name(),
                        package: pkg.name.clone(),
                        message: format!("{} is also declared by package {}", unit, other.name),
                    });
                }
            }
        }
        findings
    }
}

struct MissingDependencyAnalyzer;

impl PackageAnalyzer for MissingDependencyAnalyzer {
    fn name(&self) -> &'static str {
        "missing-dependency"
    }

    fn is_enabled(&self, pkg: &PackageDescriptor) -> bool {
        !pkg.dependencies.is_empty()
    }

    fn analyze(&self, project: &ProjectManifest, pkg: &PackageDescriptor) -> Vec<Finding> {
        pkg.dependencies
            .iter()
            .filter(|dep| !project.packages.iter().any(|p| p.name == dep.package))
            .map(|dep| Finding {
                analyzer: self.name(),
                package: pkg.name.clone(),
                message: format!("dependency {} names no package in the project", dep.package),
            })
            .collect()
    }
}

struct SelfDependencyAnalyzer;

impl PackageAnalyzer for SelfDependencyAnalyzer {
    fn name(&self) -> &'static str {
        "self-dependency"
    }

    fn is_enabled(&self, pkg: &PackageDescriptor) -> bool {
        !pkg.dependencies.is_empty()
    }

    fn analyze(&self, _project: &ProjectManifest, pkg: &PackageDescriptor) -> Vec<Finding> {
        pkg.dependencies
            .iter()
            .filter(|dep| dep.package == pkg.name)
            .map(|_| Finding {
                analyzer: self.name(),
                package: pkg.name.clone(),
                message: "package declares a dependency on itself".to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{DependencyRef, PackageType};

    fn pkg(name: &str, deps: &[&str], classes: &[&str]) -> PackageDescriptor {
        PackageDescriptor {
            name: name.to_string(),
            package_type: PackageType::default(),
            version_number: None,
            dependencies: deps
                .iter()
                .map(|d| DependencyRef {
                    package: d.to_string(),
                    version_number: None,
                })
                .collect(),
            classes: classes.iter().map(|s| s.to_string()).collect(),
            test_classes: vec![],
            triggers: vec![],
            permission_sets: vec![],
        }
    }

    fn project(packages: Vec<PackageDescriptor>) -> ProjectManifest {
        ProjectManifest {
            name: "demo".to_string(),
            packages,
        }
    }

    #[test]
    fn duplicate_class_reported_once_from_the_later_package() {
        let p = project(vec![
            pkg("core", &[], &["AccountService"]),
            pkg("api", &[], &["AccountService"]),
        ]);
        let findings = analyze_project(&p, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].analyzer, "duplicate-class");
        assert_eq!(findings[0].package, "api");
        assert!(findings[0].message.contains("core"));
    }

    #[test]
    fn missing_dependency_is_flagged() {
        let p = project(vec![pkg("core", &["ghost"], &[])]);
        let findings = analyze_project(&p, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].analyzer, "missing-dependency");
    }

    #[test]
    fn self_dependency_is_flagged_alongside_missing_check() {
        let p = project(vec![pkg("core", &["core"], &[])]);
        let findings = analyze_project(&p, None);
        assert!(findings.iter().any(|f| f.analyzer == "self-dependency"));
    }

    #[test]
    fn only_filter_restricts_findings_to_one_package() {
        let p = project(vec![pkg("core", &["ghost"], &[]), pkg("api", &["phantom"], &[])]);
        let findings = analyze_project(&p, Some("api"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].package, "api");
    }

    #[test]
    fn clean_project_yields_no_findings() {
        let p = project(vec![pkg("base", &[], &["A"]), pkg("core", &["base"], &["B"])]);
        assert!(analyze_project(&p, None).is_empty());
    }
}
