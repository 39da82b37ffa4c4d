use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE_NAME: &str = "convoy.json";

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("duplicate package name: {0}")]
    DuplicatePackage(String),
    #[error("package not found in project: {0}")]
    PackageNotFound(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectManifest {
    pub name: String,
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub package_type: PackageType,
    pub version_number: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
    /// Classes counted for coverage; test classes are listed separately.
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub test_classes: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub permission_sets: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Unlocked,
    Source,
    Diff,
    Data,
}

impl Default for PackageType {
    fn default() -> Self {
        PackageType::Source
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PackageType::Unlocked => "unlocked",
            PackageType::Source => "source",
            PackageType::Diff => "diff",
            PackageType::Data => "data",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRef {
    pub package: String,
    pub version_number: Option<String>,
}

pub fn resolve_project_file(source: &str) -> PathBuf {
    let p = Path::new(source);
    if p.is_dir() {
        p.join(PROJECT_FILE_NAME)
    } else {
        p.to_path_buf()
    }
}

pub fn load_project(source: &str) -> anyhow::Result<ProjectManifest> {
    let file = resolve_project_file(source);
    let raw = std::fs::read_to_string(&file)
        .map_err(|e| anyhow::anyhow!("cannot read project file {}: {}", file.display(), e))?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn validate_project(project: &ProjectManifest) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for pkg in &project.packages {
        if !seen.insert(&pkg.name) {
            return Err(ProjectError::DuplicatePackage(pkg.name.clone()).into());
        }
    }
    Ok(())
}

pub fn find_package<'a>(
    project: &'a ProjectManifest,
    name: &str,
) -> anyhow::Result<&'a PackageDescriptor> {
    project
        .packages
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ProjectError::PackageNotFound(name.to_string()).into())
}
