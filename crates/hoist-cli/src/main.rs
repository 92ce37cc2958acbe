mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hoist", about = "Containerize a repository and release it to AWS")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, push, and release the workspace source
    Deploy(commands::DeployArgs),
    /// Destroy the infrastructure created by the last deploy
    Destroy {
        /// AWS region (overrides hoist.toml)
        #[arg(long)]
        region: Option<String>,
        /// AWS credentials profile (overrides hoist.toml)
        #[arg(long)]
        profile: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Detect the ecosystem and listen port of a source tree
    Detect {
        /// Source directory to inspect
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Port reported when the source names none (overrides hoist.toml)
        #[arg(long, value_parser = clap::value_parser!(u16).range(2..))]
        default_port: Option<u16>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check tools, credentials, and project layout
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy(args) => commands::deploy(args).await?,
        Commands::Destroy {
            region,
            profile,
            yes,
        } => commands::destroy(region, profile, yes).await?,
        Commands::Detect {
            path,
            default_port,
            json,
        } => commands::detect(&path, default_port, json)?,
        Commands::Doctor => commands::doctor().await?,
    }

    Ok(())
}
