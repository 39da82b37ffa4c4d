use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub project: PathBuf,
    pub report: PathBuf,
    pub snapshot: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let project = make_fixture_project(tmp.path());
        let report = make_coverage_report(tmp.path());
        let snapshot = make_org_snapshot(tmp.path());

        Self {
            _tmp: tmp,
            home,
            project,
            report,
            snapshot,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("convoy");
        cmd.env("HOME", &self.home);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--project")
            .arg(self.project.to_str().expect("project path utf8"))
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Same as `run_json` but for commands expected to exit nonzero while
    /// still printing a JSON document.
    pub fn run_json_failure(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--project")
            .arg(self.project.to_str().expect("project path utf8"))
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

fn make_fixture_project(base: &Path) -> PathBuf {
    let app = base.join("app");
    fs::create_dir_all(&app).expect("create project dir");

    let manifest = serde_json::json!({
        "name": "fixture-app",
        "packages": [
            {
                "name": "base",
                "type": "unlocked",
                "versionNumber": "1.0.0",
                "classes": ["BaseUtil"],
                "testClasses": ["BaseUtilTest"],
                "permissionSets": ["Release_Manager"]
            },
            {
                "name": "core",
                "type": "unlocked",
                "dependencies": [{"package": "base"}],
                "classes": ["AccountService", "LeadService"],
                "triggers": ["AccountTrigger"]
            },
            {
                "name": "ui",
                "type": "source",
                "dependencies": [{"package": "core"}],
                "classes": ["UiController"]
            }
        ]
    });
    fs::write(
        app.join("convoy.json"),
        serde_json::to_string_pretty(&manifest).expect("serialize manifest"),
    )
    .expect("write project manifest");

    app
}

fn make_coverage_report(base: &Path) -> PathBuf {
    let report = serde_json::json!([
        {"name": "BaseUtil", "coveredPercent": 90.0, "totalLines": 10, "totalCovered": 9},
        {"name": "AccountService", "coveredPercent": 85.0, "totalLines": 20, "totalCovered": 17},
        {"name": "LeadService", "coveredPercent": 80.0, "totalLines": 10, "totalCovered": 8},
        {"name": "UiController", "coveredPercent": 60.0, "totalLines": 10, "totalCovered": 6}
    ]);
    let path = base.join("coverage.json");
    fs::write(
        &path,
        serde_json::to_string_pretty(&report).expect("serialize report"),
    )
    .expect("write coverage report");
    path
}

fn make_org_snapshot(base: &Path) -> PathBuf {
    let snapshot = serde_json::json!({
        "triggers": [{"id": "01q000A", "name": "AccountTrigger"}],
        "coverageAggregates": [{"entityId": "01q000A", "numLinesUncovered": 2}],
        "permsetAssignments": [{"username": "release@demo", "permset": "Release_Manager"}]
    });
    let path = base.join("org-snapshot.json");
    fs::write(
        &path,
        serde_json::to_string_pretty(&snapshot).expect("serialize snapshot"),
    )
    .expect("write org snapshot");
    path
}
