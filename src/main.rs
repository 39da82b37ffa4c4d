mod cli;
mod commands;
mod domain;
mod project;
mod services;

pub use cli::*;
pub use commands::*;
pub use domain::models::*;
pub use project::*;
pub use services::analyzers::*;
pub use services::class_coverage::*;
pub use services::config::*;
pub use services::coverage::*;
pub use services::dependency::*;
pub use services::org::*;
pub use services::output::*;
pub use services::permsets::*;
pub use services::release_check::*;
pub use services::scheduler::*;
pub use services::storage::*;

use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        print_error(cli.json, error_code(&err), &format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_settings()?;
    let project = load_project(&cli.project)?;
    let mut state = load_state()?;

    if handle_build_commands(cli, &project, &mut state)? {
        return Ok(());
    }
    if handle_release_commands(cli, &project, &settings)? {
        return Ok(());
    }
    Ok(())
}

fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<ProjectError>() {
        return match e {
            ProjectError::DuplicatePackage(_) => "DUPLICATE_PACKAGE",
            ProjectError::PackageNotFound(_) => "PACKAGE_NOT_FOUND",
        };
    }
    if err.downcast_ref::<ScheduleError>().is_some() {
        return "CYCLE_DETECTED";
    }
    if let Some(e) = err.downcast_ref::<CoverageError>() {
        return match e {
            CoverageError::NoCoverageData(_) => "NO_COVERAGE_DATA",
            CoverageError::UnhandledPackageType(_) => "UNHANDLED_PACKAGE_TYPE",
        };
    }
    "INTERNAL"
}
