use clap::{Parser, Subcommand};

pub const DEFAULT_PROJECT_DIR: &str = ".";

#[derive(Parser, Debug)]
#[command(name = "convoy", version, about = "Release orchestration for multi-package projects")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_PROJECT_DIR,
        help = "Project directory or path to convoy.json"
    )]
    pub project: String,
    #[arg(long, global = true, help = "Org base URL for platform queries")]
    pub org: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Offline org snapshot file used instead of live queries"
    )]
    pub org_snapshot: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Validate,
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    Plan {
        #[arg(long, value_delimiter = ',', help = "Restrict the plan to these packages")]
        packages: Option<Vec<String>>,
        #[arg(long, default_value_t = false, help = "Skip packages recorded as built")]
        resume: bool,
    },
    Record {
        package: String,
    },
    Reset,
    List,
    Analyze {
        #[arg(long)]
        package: Option<String>,
    },
    Coverage {
        #[arg(long)]
        package: String,
        #[arg(long, help = "Path to a coverage report JSON file")]
        report: String,
        #[arg(long, help = "Coverage threshold percent (floored at 75)")]
        threshold: Option<u64>,
    },
    Permsets {
        #[command(subcommand)]
        command: PermsetCommands,
    },
    Check {
        #[arg(long)]
        package: Option<String>,
        #[arg(long, help = "Coverage report to gate the release on")]
        report: Option<String>,
        #[arg(long)]
        threshold: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    Parents {
        #[arg(long, value_delimiter = ',')]
        packages: Option<Vec<String>>,
    },
    Children {
        #[arg(long, value_delimiter = ',')]
        packages: Option<Vec<String>>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PermsetCommands {
    Assign {
        #[arg(long)]
        package: String,
        #[arg(long)]
        username: String,
    },
}
