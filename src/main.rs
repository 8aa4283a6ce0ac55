use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sploitdesk::workspace::Workspace;

mod cli_exec;

const LOG_ENV: &str = "SPLOITDESK_LOG";

#[derive(Parser)]
#[command(name = "sploitdesk")]
#[command(about = "Exploit workstation for attack/defense CTFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace (.sploitdesk)
    Init {
        /// Re-initialize if .sploitdesk already exists
        #[arg(long)]
        force: bool,
        /// Path to initialize (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Base URL of the runner API (e.g. http://localhost:1337/api)
        #[arg(long)]
        backend_url: Option<String>,
    },

    /// Refresh and list services
    Services {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List exploit files
    Ls {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a file from the exploit template
    New {
        name: String,
        /// Target service (defaults to the last used one)
        #[arg(long)]
        service: Option<String>,
    },

    /// Make a file the active one
    Select { id: String },

    /// Print a file (defaults to the active one)
    Show { id: Option<String> },

    /// Replace a file's content
    Edit {
        id: String,
        /// Read the new content from this path
        #[arg(long)]
        from: PathBuf,
    },

    /// Delete a file
    Rm { id: String },

    /// Run a file against a target host
    Run {
        id: String,
        #[arg(long)]
        host: String,
    },

    /// Ask the AI for a rewrite of a file
    Rewrite {
        id: String,
        /// Replace the file with the rewrite
        #[arg(long)]
        apply: bool,
    },

    /// Show flag statistics
    Stats {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Push every file to the remote runner
    Sync,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            force,
            path,
            backend_url,
        } => {
            let root = path.unwrap_or(std::env::current_dir().context("get current dir")?);
            let mut config = sploitdesk::model::DeskConfig::default();
            if let Some(url) = backend_url {
                config.backend.base_url = url;
            }
            Workspace::init_with_config(&root, config, force)?;
            println!("Initialized sploitdesk workspace at {}", root.display());
        }
        command => cli_exec::handle_command(command).await?,
    }

    Ok(())
}
