use std::time::Duration;

use sploitdesk::stats::StatsSnapshot;

use super::*;

pub(super) async fn stats(ws: &Workspace, watch: bool, json: bool) -> Result<()> {
    let mut poller = ws.stats_poller();
    if !watch {
        let snapshot = poller.poll_once().await.clone();
        if poller.failures() > 0 {
            return Err(anyhow!("statistics unavailable"));
        }
        return print_snapshot(&snapshot, json);
    }

    let interval = Duration::from_secs(ws.config.stats.interval_secs);
    let mut printed = Ok(());
    tokio::select! {
        _ = poller.run(interval, |snapshot| {
            if printed.is_ok() {
                printed = print_snapshot(snapshot, json);
            }
        }) => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    printed
}

fn print_snapshot(snapshot: &StatsSnapshot, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string(snapshot).context("serialize statistics json")?
        );
        return Ok(());
    }
    println!("total flags: {}", snapshot.total_flags);
    for stat in &snapshot.flag_stats {
        println!(
            "  {:<16} {:<20} {:>5}  {}",
            stat.ip, stat.service, stat.flags, stat.last_capture
        );
    }
    for event in &snapshot.events {
        println!("  [{}] {} {}", event.timestamp, event.kind, event.message);
    }
    Ok(())
}
