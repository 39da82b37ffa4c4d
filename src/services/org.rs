use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 2500;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EntityRecord {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    #[serde(alias = "ApexClassOrTriggerId")]
    pub entity_id: String,
    #[serde(alias = "NumLinesUncovered")]
    pub num_lines_uncovered: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PermsetAssignment {
    pub username: String,
    pub permset: String,
}

/// Narrow seam over the platform query API. Everything the release flow needs
/// from an org goes through these four lookups.
pub trait OrgQueries {
    fn apex_class_ids(&self, names: &[String]) -> anyhow::Result<Vec<EntityRecord>>;
    fn trigger_ids(&self, names: &[String]) -> anyhow::Result<Vec<EntityRecord>>;
    fn uncovered_line_aggregates(&self, ids: &[String]) -> anyhow::Result<Vec<AggregateRecord>>;
    fn permset_assignments(&self, username: &str) -> anyhow::Result<Vec<PermsetAssignment>>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    records: Vec<T>,
}

pub struct OrgClient {
    base_url: String,
    timeout_ms: u64,
}

impl OrgClient {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
        }
    }

    fn cache_path(&self, soql: &str) -> anyhow::Result<PathBuf> {
        let home = std::env::var("HOME")?;
        let mut hasher = Sha256::new();
        hasher.update(self.base_url.as_bytes());
        hasher.update(soql.as_bytes());
        let id = hex::encode(hasher.finalize());
        Ok(PathBuf::from(home)
            .join(".cache")
            .join("convoy")
            .join("queries")
            .join(format!("{}.json", id)))
    }

    fn fetch_query_text(&self, soql: &str) -> anyhow::Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()?;
        let resp = client
            .get(format!("{}/query", self.base_url))
            .query(&[("q", soql)])
            .send()?
            .error_for_status()?;
        Ok(resp.text()?)
    }

    /// Runs a query, caching successful responses on disk. On a transport
    /// failure a previously cached response is served if present; otherwise
    /// the error propagates unmodified.
    fn run_query<T: serde::de::DeserializeOwned>(&self, soql: &str) -> anyhow::Result<Vec<T>> {
        let cache = self.cache_path(soql)?;
        let raw = match self.fetch_query_text(soql) {
            Ok(body) => {
                if let Some(parent) = cache.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&cache, &body)?;
                body
            }
            Err(_) if cache.exists() => std::fs::read_to_string(&cache)?,
            Err(e) => return Err(e),
        };
        let resp: QueryResponse<T> = serde_json::from_str(&raw)?;
        Ok(resp.records)
    }
}

fn soql_string_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl OrgQueries for OrgClient {
    fn apex_class_ids(&self, names: &[String]) -> anyhow::Result<Vec<EntityRecord>> {
        self.run_query(&format!(
            "SELECT Id, Name FROM ApexClass WHERE Name IN ({})",
            soql_string_list(names)
        ))
    }

    fn trigger_ids(&self, names: &[String]) -> anyhow::Result<Vec<EntityRecord>> {
        self.run_query(&format!(
            "SELECT Id, Name FROM ApexTrigger WHERE Name IN ({})",
            soql_string_list(names)
        ))
    }

    fn uncovered_line_aggregates(&self, ids: &[String]) -> anyhow::Result<Vec<AggregateRecord>> {
        self.run_query(&format!(
            "SELECT ApexClassOrTriggerId, NumLinesUncovered FROM ApexCodeCoverageAggregate WHERE ApexClassOrTriggerId IN ({})",
            soql_string_list(ids)
        ))
    }

    fn permset_assignments(&self, username: &str) -> anyhow::Result<Vec<PermsetAssignment>> {
        self.run_query(&format!(
            "SELECT PermissionSet.Name, Assignee.Username FROM PermissionSetAssignment WHERE Assignee.Username = '{}'",
            username.replace('\'', "\\'")
        ))
    }
}

/// File-backed org snapshot for offline runs and tests. Carries the same
/// record sets a live org would answer with.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrgSnapshot {
    #[serde(default)]
    pub classes: Vec<EntityRecord>,
    #[serde(default)]
    pub triggers: Vec<EntityRecord>,
    #[serde(default)]
    pub coverage_aggregates: Vec<AggregateRecord>,
    #[serde(default)]
    pub permset_assignments: Vec<PermsetAssignment>,
}

impl OrgSnapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read org snapshot {}: {}", path.display(), e))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl OrgQueries for OrgSnapshot {
    fn apex_class_ids(&self, names: &[String]) -> anyhow::Result<Vec<EntityRecord>> {
        Ok(self
            .classes
            .iter()
            .filter(|r| names.contains(&r.name))
            .cloned()
            .collect())
    }

    fn trigger_ids(&self, names: &[String]) -> anyhow::Result<Vec<EntityRecord>> {
        Ok(self
            .triggers
            .iter()
            .filter(|r| names.contains(&r.name))
            .cloned()
            .collect())
    }

    fn uncovered_line_aggregates(&self, ids: &[String]) -> anyhow::Result<Vec<AggregateRecord>> {
        Ok(self
            .coverage_aggregates
            .iter()
            .filter(|r| ids.contains(&r.entity_id))
            .cloned()
            .collect())
    }

    fn permset_assignments(&self, username: &str) -> anyhow::Result<Vec<PermsetAssignment>> {
        Ok(self
            .permset_assignments
            .iter()
            .filter(|r| r.username == username)
            .cloned()
            .collect())
    }
}

pub fn open_org(
    org: Option<&str>,
    snapshot: Option<&str>,
    settings: &crate::services::config::Settings,
) -> anyhow::Result<Box<dyn OrgQueries>> {
    if let Some(path) = snapshot {
        return Ok(Box::new(OrgSnapshot::load(Path::new(path))?));
    }
    let timeout = settings.org.timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS);
    if let Some(url) = org {
        return Ok(Box::new(OrgClient::new(url, timeout)));
    }
    if let Some(url) = &settings.org.url {
        return Ok(Box::new(OrgClient::new(url, timeout)));
    }
    anyhow::bail!("no org configured: pass --org, --org-snapshot, or set org.url in config")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> OrgSnapshot {
        serde_json::from_str(
            r#"{
                "classes": [
                    {"id": "01p000A", "name": "AccountService"},
                    {"id": "01p000B", "name": "LeadService"}
                ],
                "triggers": [{"id": "01q000A", "name": "AccountTrigger"}],
                "coverageAggregates": [
                    {"entityId": "01p000A", "numLinesUncovered": 12},
                    {"entityId": "01q000A", "numLinesUncovered": 4}
                ],
                "permsetAssignments": [
                    {"username": "release@demo", "permset": "Release_Manager"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn snapshot_filters_classes_by_requested_names() {
        let snap = snapshot();
        let records = snap
            .apex_class_ids(&["AccountService".to_string()])
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "01p000A");
    }

    #[test]
    fn snapshot_filters_aggregates_by_id() {
        let snap = snapshot();
        let records = snap
            .uncovered_line_aggregates(&["01q000A".to_string()])
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].num_lines_uncovered, 4);
    }

    #[test]
    fn snapshot_filters_assignments_by_username() {
        let snap = snapshot();
        assert_eq!(snap.permset_assignments("release@demo").unwrap().len(), 1);
        assert!(snap.permset_assignments("other@demo").unwrap().is_empty());
    }

    #[test]
    fn soql_lists_are_quoted_and_escaped() {
        let clause = soql_string_list(&["Plain".to_string(), "O'Neil".to_string()]);
        assert_eq!(clause, r"'Plain', 'O\'Neil'");
    }
}
