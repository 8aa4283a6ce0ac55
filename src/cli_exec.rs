use anyhow::{Context, Result, anyhow};

use sploitdesk::model::FileId;
use sploitdesk::workspace::{MirrorReport, Workspace};

use crate::Commands;

mod files;
mod run;
mod stats;

pub(super) async fn handle_command(command: Commands) -> Result<()> {
    let mut ws = discover_workspace()?;
    match command {
        Commands::Init { .. } => Err(anyhow!("init is handled before workspace discovery")),
        Commands::Services { json } => files::services(&mut ws, json).await,
        Commands::Ls { json } => files::list(&ws, json),
        Commands::New { name, service } => files::create(&mut ws, &name, service).await,
        Commands::Select { id } => files::select(&mut ws, &id),
        Commands::Show { id } => files::show(&ws, id.as_deref()),
        Commands::Edit { id, from } => files::edit(&mut ws, &id, &from).await,
        Commands::Rm { id } => files::remove(&mut ws, &id).await,
        Commands::Sync => files::sync(&mut ws).await,
        Commands::Run { id, host } => run::run(&ws, &id, &host).await,
        Commands::Rewrite { id, apply } => run::rewrite(&mut ws, &id, apply).await,
        Commands::Stats { watch, json } => stats::stats(&ws, watch, json).await,
    }
}

fn discover_workspace() -> Result<Workspace> {
    Workspace::discover(&std::env::current_dir().context("get current dir")?)
}

fn parse_id(raw: &str) -> Result<FileId> {
    raw.parse::<FileId>()
        .map_err(|_| anyhow!("invalid file id: {}", raw))
}

fn report_mirror(what: &str, report: &MirrorReport) {
    if let Some(warning) = &report.warning {
        eprintln!("warning: {} saved locally, remote not updated: {}", what, warning);
    }
}
