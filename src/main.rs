//! Ripple CLI entry point

use clap::{Parser, Subcommand};
use ripple_core::ChangeKind;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(about = "Dependency graph, coherence and change-impact analysis for TypeScript projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the project and report graph and coherence
    Analyze {
        /// Print the full analysis result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Predict the impact of a change to one node
    Impact {
        /// Target node id (project-relative path) or primary name
        #[arg(short, long)]
        node: String,

        /// rename, add-field, remove-field, change-type or delete
        #[arg(short, long)]
        change: ChangeKind,

        #[arg(long)]
        before_name: Option<String>,

        #[arg(long)]
        before_type: Option<String>,

        #[arg(long)]
        after_name: Option<String>,

        #[arg(long)]
        after_type: Option<String>,

        /// Apply the auto-fixable fixes
        #[arg(long)]
        apply: bool,

        /// Confirm applying fixes for a critical-risk change
        #[arg(short, long)]
        yes: bool,
    },
    /// Roll back applied patches (all of them by default)
    Rollback {
        /// Patch ids to roll back
        #[arg(long = "id")]
        ids: Vec<String>,
    },
    /// List applied patches
    History,
    /// Delete the .ripple state directory
    Clear,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("ripple={log_level}")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Project root: {}", cli.root.display());

    match cli.command {
        Commands::Analyze { json } => commands::analyze(cli.root, json).await,
        Commands::Impact {
            node,
            change,
            before_name,
            before_type,
            after_name,
            after_type,
            apply,
            yes,
        } => {
            let request = commands::ImpactRequest {
                node,
                change,
                before_name,
                before_type,
                after_name,
                after_type,
                apply,
                yes,
            };
            commands::impact(cli.root, request).await
        }
        Commands::Rollback { ids } => commands::rollback(cli.root, ids).await,
        Commands::History => commands::history(cli.root),
        Commands::Clear => commands::clear(cli.root),
        Commands::Version => {
            println!("Ripple v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
