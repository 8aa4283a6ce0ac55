use std::path::Path;

use sploitdesk::model::SyncStatus;

use super::*;

pub(super) async fn services(ws: &mut Workspace, json: bool) -> Result<()> {
    let report = ws.refresh_services().await;
    if let Some(warning) = &report.warning {
        eprintln!("warning: showing cached services: {}", warning);
    }
    let services = ws.store.list_services();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(services).context("serialize services json")?
        );
        return Ok(());
    }
    if services.is_empty() {
        println!("No services");
    }
    for service in services {
        let marker = if service == ws.store.default_service() { "*" } else { " " };
        println!("{} {}", marker, service);
    }
    Ok(())
}

pub(super) fn list(ws: &Workspace, json: bool) -> Result<()> {
    let files = ws.store.list_files();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(files).context("serialize files json")?
        );
        return Ok(());
    }
    if files.is_empty() {
        println!("No files");
    }
    let active = ws.store.active_id();
    for file in files {
        let marker = if Some(file.id) == active { "*" } else { " " };
        println!("{} {} {} [{}]", marker, file.id, file.name, file.service);
    }
    Ok(())
}

pub(super) async fn create(ws: &mut Workspace, name: &str, service: Option<String>) -> Result<()> {
    let report = ws.refresh_services().await;
    if let Some(warning) = &report.warning {
        tracing::debug!(error = %warning, "creating with cached services");
    }
    let (file, report) = ws.create_file(name, service.as_deref()).await?;
    report_mirror(&file.name, &report);
    println!("{}", file.id);
    Ok(())
}

pub(super) fn select(ws: &mut Workspace, raw: &str) -> Result<()> {
    let id = parse_id(raw)?;
    if !ws.select_file(id) {
        return Err(anyhow!("no file with id {}", id));
    }
    println!("Selected {}", id);
    Ok(())
}

pub(super) fn show(ws: &Workspace, raw: Option<&str>) -> Result<()> {
    let file = match raw {
        Some(raw) => {
            let id = parse_id(raw)?;
            ws.store
                .file(id)
                .ok_or_else(|| anyhow!("no file with id {}", id))?
        }
        None => ws
            .store
            .active_file()
            .ok_or_else(|| anyhow!("no active file (use `sploitdesk select`)"))?,
    };
    print!("{}", file.content);
    if !file.content.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub(super) async fn edit(ws: &mut Workspace, raw: &str, from: &Path) -> Result<()> {
    let id = parse_id(raw)?;
    let content =
        std::fs::read_to_string(from).with_context(|| format!("read {}", from.display()))?;
    if !ws.select_file(id) {
        return Err(anyhow!("no file with id {}", id));
    }
    let report = ws
        .edit_file(id, &content)
        .await?
        .ok_or_else(|| anyhow!("file {} is not active", id))?;
    report_mirror(raw, &report);
    println!("Updated {}", id);
    Ok(())
}

pub(super) async fn remove(ws: &mut Workspace, raw: &str) -> Result<()> {
    let id = parse_id(raw)?;
    let report = ws
        .delete_file(id)
        .await
        .ok_or_else(|| anyhow!("no file with id {}", id))?;
    report_mirror(raw, &report);
    println!("Deleted {}", id);
    Ok(())
}

pub(super) async fn sync(ws: &mut Workspace) -> Result<()> {
    let reports = ws.push_all().await;
    let mut failed = 0usize;
    for (id, _) in &reports {
        if let SyncStatus::Failed(reason) = ws.store.sync_status(*id) {
            failed += 1;
            eprintln!("{}: {}", id, reason);
        }
    }
    println!("Pushed {} of {} files", reports.len() - failed, reports.len());
    if failed > 0 {
        return Err(anyhow!("{} file(s) failed to sync", failed));
    }
    Ok(())
}
