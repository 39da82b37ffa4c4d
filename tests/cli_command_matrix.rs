use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn run_help(home: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("convoy");
    cmd.env("HOME", home.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let home = TempDir::new().expect("temp home");

    // top-level
    run_help(&home, &[]);

    run_help(&home, &["validate"]);
    run_help(&home, &["plan"]);
    run_help(&home, &["record"]);
    run_help(&home, &["reset"]);
    run_help(&home, &["list"]);
    run_help(&home, &["analyze"]);
    run_help(&home, &["coverage"]);
    run_help(&home, &["check"]);

    // grouped subcommands
    run_help(&home, &["graph"]);
    run_help(&home, &["graph", "parents"]);
    run_help(&home, &["graph", "children"]);

    run_help(&home, &["permsets"]);
    run_help(&home, &["permsets", "assign"]);
}
