use crate::*;
use std::collections::HashSet;

pub fn handle_build_commands(
    cli: &Cli,
    project: &ProjectManifest,
    state: &mut State,
) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Validate => {
            validate_project(project)?;
            print_one(cli.json, "valid", |_| "project valid".to_string())?;
        }
        Commands::Graph { command } => {
            let dag = match command {
                GraphCommands::Parents { packages } => {
                    parents_of_all_packages(project, packages.as_deref())
                }
                GraphCommands::Children { packages } => {
                    children_of_all_packages(project, packages.as_deref())
                }
            };
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut { ok: true, data: dag })?
                );
            } else {
                for (name, related) in &dag {
                    println!("{}\t{}", name, related.join(", "));
                }
            }
        }
        Commands::Plan { packages, resume } => {
            let completed = if *resume {
                completed_for(state, &project.name)
            } else {
                HashSet::new()
            };
            let plan = build_plan(project, packages.as_deref(), &completed)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: &plan
                    })?
                );
            } else {
                for (i, wave) in plan.waves.iter().enumerate() {
                    println!("wave {}\t{}", i + 1, wave.join(", "));
                }
            }
        }
        Commands::Record { package } => {
            find_package(project, package)?;
            record_built(state, &project.name, package);
            audit(
                "record_build",
                serde_json::json!({"project": project.name, "package": package}),
            );
            save_state(state)?;
            print_one(cli.json, package, |p| format!("recorded {}", p))?;
        }
        Commands::List => {
            print_out(cli.json, &project.packages, |p| {
                format!(
                    "{}\t{}\t{}",
                    p.name,
                    p.package_type,
                    p.version_number.clone().unwrap_or_else(|| "n/a".to_string())
                )
            })?;
        }
        Commands::Reset => {
            let removed = reset_project(state, &project.name);
            audit(
                "reset_ledger",
                serde_json::json!({"project": project.name, "removed": removed}),
            );
            save_state(state)?;
            print_one(cli.json, removed, |r| format!("cleared {} build records", r))?;
        }
        _ => return Ok(false),
    }

    Ok(true)
}
