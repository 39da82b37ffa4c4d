use crate::*;
use std::collections::HashSet;
use std::path::Path;

pub fn handle_release_commands(
    cli: &Cli,
    project: &ProjectManifest,
    settings: &Settings,
) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Analyze { package } => {
            if let Some(name) = package {
                find_package(project, name)?;
            }
            let findings = analyze_project(project, package.as_deref());
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: findings.is_empty(),
                        data: &findings
                    })?
                );
            } else {
                for f in &findings {
                    println!("{}\t{}\t{}", f.analyzer, f.package, f.message);
                }
            }
            if !findings.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Coverage {
            package,
            report,
            threshold,
        } => {
            let pkg = find_package(project, package)?;
            let records = load_coverage_report(Path::new(report))?;
            let org = open_org(cli.org.as_deref(), cli.org_snapshot.as_deref(), settings)?;
            let mut coverage = PackageTestCoverage::new(pkg, &records);
            let verdict =
                coverage.validate(org.as_ref(), threshold.or(settings.coverage.threshold))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: verdict.result,
                        data: &verdict
                    })?
                );
            } else {
                println!("coverage: {}%", verdict.package_test_coverage);
                println!("{}", verdict.message);
            }
            if !verdict.result {
                std::process::exit(1);
            }
        }
        Commands::Permsets { command } => match command {
            PermsetCommands::Assign { package, username } => {
                let pkg = find_package(project, package)?;
                let org = open_org(cli.org.as_deref(), cli.org_snapshot.as_deref(), settings)?;
                let started = std::time::Instant::now();
                let outcome = assign_permsets(org.as_ref(), username, &pkg.permission_sets)?;
                audit(
                    "permsets_assign",
                    serde_json::json!({
                        "package": package,
                        "username": username,
                        "successful": outcome.successful.len(),
                        "failed": outcome.failed.len()
                    }),
                );
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&JsonOut {
                            ok: outcome.failed.is_empty(),
                            data: &outcome
                        })?
                    );
                } else {
                    for a in &outcome.successful {
                        println!("assigned\t{}\t{}", a.username, a.permset);
                    }
                    for a in &outcome.failed {
                        println!("failed\t{}\t{}", a.username, a.permset);
                    }
                    println!(
                        "completed in {}",
                        format_elapsed(started.elapsed().as_millis())
                    );
                }
                if !outcome.failed.is_empty() {
                    std::process::exit(1);
                }
            }
        },
        Commands::Check {
            package,
            report,
            threshold,
        } => {
            let manifest = match validate_project(project) {
                Ok(()) => "ok".to_string(),
                Err(e) => e.to_string(),
            };
            let findings = analyze_project(project, None);
            let plan = match build_plan(project, None, &HashSet::new()) {
                Ok(plan) => PlanStatus {
                    status: "ok".to_string(),
                    waves: plan.waves.len(),
                },
                Err(_) => PlanStatus {
                    status: "cycle".to_string(),
                    waves: 0,
                },
            };

            let coverage = match (package, report) {
                (Some(name), Some(report_path)) => {
                    let pkg = find_package(project, name)?;
                    let records = load_coverage_report(Path::new(report_path))?;
                    let org =
                        open_org(cli.org.as_deref(), cli.org_snapshot.as_deref(), settings)?;
                    let mut coverage = PackageTestCoverage::new(pkg, &records);
                    let verdict = coverage
                        .validate(org.as_ref(), threshold.or(settings.coverage.threshold))?;
                    Some(CoverageGate {
                        package: name.clone(),
                        status: if verdict.result { "passed" } else { "failed" }.to_string(),
                        package_test_coverage: verdict.package_test_coverage,
                    })
                }
                _ => None,
            };

            let report = build_release_check_report(manifest, findings, plan, coverage);
            print_one(cli.json, report, |r| format!("release-check: {}", r.overall))?;
        }
        _ => return Ok(false),
    }

    Ok(true)
}
