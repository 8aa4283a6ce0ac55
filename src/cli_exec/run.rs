use sploitdesk::exec::{ExecState, ExecStatus};
use sploitdesk::rewrite::{HeaderCheck, RewriteStatus};

use super::*;

pub(super) async fn run(ws: &Workspace, raw: &str, host: &str) -> Result<()> {
    let id = parse_id(raw)?;
    let file = ws
        .store
        .file(id)
        .ok_or_else(|| anyhow!("no file with id {}", id))?;
    let controller = ws.execution_controller()?;
    let mut progress = controller.subscribe();

    let call = controller.run(file.snapshot(), host);
    tokio::pin!(call);
    let mut warned = false;
    let state = loop {
        tokio::select! {
            state = &mut call => break state,
            Ok(()) = progress.changed() => {
                let status = progress.borrow_and_update().status;
                if status == ExecStatus::SoftTimeout && !warned {
                    warned = true;
                    eprintln!(
                        "still running after {}s, aborting at {}s",
                        controller.timeouts().soft().as_secs(),
                        controller.timeouts().hard().as_secs()
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => controller.cancel(),
        }
    };

    print_state(&state);
    match state.status {
        ExecStatus::Succeeded => Ok(()),
        _ => Err(anyhow!("run {}", state.status.as_str())),
    }
}

fn print_state(state: &ExecState) {
    if !state.output.is_empty() {
        print!("{}", state.output);
        if !state.output.ends_with('\n') {
            println!();
        }
    }
    if let Some(error) = &state.error {
        eprintln!("stderr: {}", error);
    }
    if let Some(failure) = &state.failure {
        eprintln!("error: {}", failure);
    }
    eprintln!(
        "{} on {} after {:.1}s",
        state.status.as_str(),
        state.host,
        state.elapsed.as_secs_f64()
    );
}

pub(super) async fn rewrite(ws: &mut Workspace, raw: &str, apply: bool) -> Result<()> {
    let id = parse_id(raw)?;
    let snapshot = ws
        .store
        .file(id)
        .ok_or_else(|| anyhow!("no file with id {}", id))?
        .snapshot();

    let mut session = ws.rewrite_session();
    if let RewriteStatus::Error(err) = session.fetch_credential().await {
        return Err(anyhow!("fetch AI credential: {}", err));
    }
    if let RewriteStatus::Error(err) = session.rewrite(&snapshot).await {
        return Err(anyhow!("rewrite {}: {}", snapshot.name, err));
    }
    let rewritten = session
        .rewritten()
        .ok_or_else(|| anyhow!("rewrite produced no content"))?;
    if rewritten.header == HeaderCheck::Altered {
        eprintln!("warning: rewrite does not keep the required header");
    }

    if !apply {
        print!("{}", rewritten.content);
        if !rewritten.content.ends_with('\n') {
            println!();
        }
        return Ok(());
    }

    ws.select_file(id);
    let report = ws.apply_rewrite(session, id).await?;
    report_mirror(&snapshot.name, &report);
    println!("Applied rewrite to {}", id);
    Ok(())
}
