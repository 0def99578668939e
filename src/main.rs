use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::deps::{cmd_check, cmd_import, cmd_list, cmd_owner, cmd_remove, cmd_tree, cmd_upgrade};

#[derive(Parser)]
#[command(
    name = "project-deps",
    version,
    about = "Resolve and manage imported project dependencies"
)]
struct Cli {
    /// Package catalog JSON (overrides $PROJECT_DEPS_CATALOG)
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Concurrent metadata fetches (overrides $PROJECT_DEPS_FETCH_CONCURRENCY)
    #[arg(long, global = true, value_parser = project_deps::config::parse_concurrency)]
    fetch_concurrency: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved dependency tree
    Tree {
        /// Project document (JSON)
        project: PathBuf,
    },
    /// List direct dependencies and available updates
    List {
        /// Project document (JSON)
        project: PathBuf,
        /// Re-fetch metadata for every direct dependency
        #[arg(long)]
        refresh: bool,
    },
    /// Show which package owns an object
    Owner {
        /// Project document (JSON)
        project: PathBuf,
        /// Object id (component, token, mixin, theme, image or variant group)
        object: String,
    },
    /// Check whether another project could be imported, without importing it
    Check {
        /// Project document (JSON)
        project: PathBuf,
        /// Id of the project to import
        project_id: String,
    },
    /// Import the latest published version of another project
    Import {
        /// Project document (JSON)
        project: PathBuf,
        /// Id of the project to import
        project_id: String,
    },
    /// Remove a direct dependency
    Remove {
        /// Project document (JSON)
        project: PathBuf,
        /// Package id of the dependency
        package_id: String,
    },
    /// Upgrade direct dependencies to their latest published versions
    Upgrade {
        /// Project document (JSON)
        project: PathBuf,
        /// Package ids to upgrade (default: all)
        packages: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli::load_config(cli.catalog, cli.fetch_concurrency);
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .init();

    match cli.command {
        Command::Tree { project } => cmd_tree(&project),
        Command::List { project, refresh } => cmd_list(&project, refresh, &config).await,
        Command::Owner { project, object } => cmd_owner(&project, &object),
        Command::Check {
            project,
            project_id,
        } => cmd_check(&project, &project_id, &config).await,
        Command::Import {
            project,
            project_id,
        } => cmd_import(&project, &project_id, &config).await,
        Command::Remove {
            project,
            package_id,
        } => cmd_remove(&project, &package_id, &config).await,
        Command::Upgrade { project, packages } => cmd_upgrade(&project, &packages, &config).await,
    }
}
