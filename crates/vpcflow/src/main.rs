mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vpcflow")]
#[command(
    about = "Declarative VPC networks: describe the topology, bring it up, tear it down",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a region document
    Validate {
        /// Region document (JSON or YAML)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Also require that nothing in the document has been created yet
        #[arg(long)]
        fresh: bool,
    },
    /// Create every resource in the region document
    Up {
        /// Region document (JSON or YAML)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Override the document's region code
        #[arg(short, long)]
        region: Option<String>,
        /// AWS profile to take credentials from
        #[arg(short, long, env = "AWS_PROFILE")]
        profile: Option<String>,
        /// Continue an interrupted run from its `.created` checkpoint
        #[arg(long)]
        resume: bool,
    },
    /// Delete every resource recorded in the `.created` checkpoint
    Down {
        /// Region document (JSON or YAML)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Override the document's region code
        #[arg(short, long)]
        region: Option<String>,
        /// AWS profile to take credentials from
        #[arg(short, long, env = "AWS_PROFILE")]
        profile: Option<String>,
        /// Seconds to wait for each NAT gateway to finish deleting
        #[arg(long, default_value = "600")]
        nat_timeout: u64,
        /// Continue an interrupted teardown from its `.removed` checkpoint
        #[arg(long)]
        resume: bool,
        /// Run without the dry-run listing
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the region graph as a tree
    Show {
        /// Region document (JSON or YAML)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr; stdout is for progress output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("vpcflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Validate { file, fresh } => commands::validate::handle(file, fresh),
        Commands::Show { file } => commands::show::handle(file),
        Commands::Up {
            file,
            region,
            profile,
            resume,
        } => commands::up::handle(file, region, profile, resume).await,
        Commands::Down {
            file,
            region,
            profile,
            nat_timeout,
            resume,
            yes,
        } => commands::down::handle(file, region, profile, nat_timeout, resume, yes).await,
    }
}
