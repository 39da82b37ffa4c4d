use crate::domain::models::{BuildRecord, State};
use std::collections::HashSet;
use std::path::PathBuf;

pub fn audit(action: &str, data: serde_json::Value) {
    let home = match std::env::var("HOME") {
        Ok(h) => h,
        Err(_) => return,
    };
    let path = PathBuf::from(home).join(".config/convoy/audit.jsonl");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": epoch_seconds(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
}

pub fn epoch_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn record_built(state: &mut State, project: &str, package: &str) {
    let record = BuildRecord {
        project: project.to_string(),
        package: package.to_string(),
        recorded_at: epoch_seconds(),
    };
    if let Some(existing) = state
        .completed
        .iter_mut()
        .find(|r| r.project == project && r.package == package)
    {
        *existing = record;
    } else {
        state.completed.push(record);
    }
}

pub fn reset_project(state: &mut State, project: &str) -> usize {
    let before = state.completed.len();
    state.completed.retain(|r| r.project != project);
    before.saturating_sub(state.completed.len())
}

pub fn completed_for(state: &State, project: &str) -> HashSet<String> {
    state
        .completed
        .iter()
        .filter(|r| r.project == project)
        .map(|r| r.package.clone())
        .collect()
}

fn state_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/convoy/state.json"))
}

pub fn load_state() -> anyhow::Result<State> {
    let p = state_path()?;
    if !p.exists() {
        return Ok(State::default());
    }
    let raw = std::fs::read_to_string(p)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_state(s: &State) -> anyhow::Result<()> {
    let p = state_path()?;
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(p, serde_json::to_string_pretty(s)?)?;
    Ok(())
}
