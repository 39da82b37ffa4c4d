use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub coverage: CoverageSettings,
    #[serde(default)]
    pub org: OrgSettings,
}

#[derive(Debug, Deserialize, Default)]
pub struct CoverageSettings {
    pub threshold: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OrgSettings {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let home = std::env::var("HOME")?;
    let path = PathBuf::from(home).join(".config/convoy/config.toml");
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_partial_files() {
        let settings: Settings = toml::from_str(
            r#"[coverage]
threshold = 80
"#,
        )
        .unwrap();
        assert_eq!(settings.coverage.threshold, Some(80));
        assert!(settings.org.url.is_none());
    }

    #[test]
    fn empty_settings_default_cleanly() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.coverage.threshold.is_none());
        assert!(settings.org.timeout_ms.is_none());
    }
}
