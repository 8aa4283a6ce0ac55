use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use super::*;

#[derive(Clone)]
struct FakeRunner {
    calls: Arc<AtomicUsize>,
    finished: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
    delay: Option<Duration>,
    reply: Result<HttpReply, TransportError>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl FakeRunner {
    fn replying(delay: Option<Duration>, status: u16, body: serde_json::Value) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicBool::new(false)),
            delay,
            reply: Ok(HttpReply {
                status,
                body: body.to_string(),
            }),
        }
    }

    fn hanging() -> Self {
        Self::replying(None, 200, serde_json::json!({ "output": "never" }))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExecBackend for FakeRunner {
    fn run_code(
        &self,
        _request: &RunCodeRequest,
    ) -> impl Future<Output = Result<HttpReply, TransportError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;
        let reply = self.reply.clone();
        let finished = self.finished.clone();
        let guard = DropFlag(self.dropped.clone());
        async move {
            let _guard = guard;
            match delay {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
            finished.store(true, Ordering::SeqCst);
            reply
        }
    }
}

fn snapshot() -> FileSnapshot {
    FileSnapshot {
        name: "solve.py".to_string(),
        service: "A".to_string(),
        content: crate::model::TEMPLATE.to_string(),
    }
}

fn controller(runner: &FakeRunner) -> ExecutionController<FakeRunner> {
    ExecutionController::new(runner.clone(), ExecTimeouts::default())
}

#[tokio::test(start_paused = true)]
async fn blank_host_fails_without_a_call() {
    let runner = FakeRunner::hanging();
    let ctl = controller(&runner);

    let state = ctl.run(snapshot(), "   ").await;
    assert_eq!(state.status, ExecStatus::Failed);
    assert!(matches!(state.failure, Some(DeskError::InvalidInput(_))));
    assert_eq!(runner.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn quick_success_is_reported_verbatim() {
    let runner = FakeRunner::replying(
        Some(Duration::from_secs(1)),
        200,
        serde_json::json!({ "output": "FLAG{1}\n" }),
    );
    let ctl = controller(&runner);

    let state = ctl.run(snapshot(), "10.10.1.10").await;
    assert_eq!(state.status, ExecStatus::Succeeded);
    assert_eq!(state.output, "FLAG{1}\n");
    assert_eq!(state.host, "10.10.1.10");
    assert!(state.elapsed >= Duration::from_secs(1));
    assert!(state.elapsed < ExecTimeouts::default().soft());
    assert_eq!(runner.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_call_soft_times_out_then_is_cancelled() {
    let runner = FakeRunner::hanging();
    let ctl = controller(&runner);
    let mut rx = ctl.subscribe();

    let started = Instant::now();
    let state = ctl.run(snapshot(), "10.10.1.10").await;
    let took = started.elapsed();

    assert_eq!(state.status, ExecStatus::SoftTimeout);
    assert!(state.is_timeout());
    assert_eq!(state.output, "");
    assert!(state.elapsed >= Duration::from_secs(5));
    assert!(state.elapsed < Duration::from_secs(6));

    assert!(took >= Duration::from_secs(6));
    assert!(took < Duration::from_secs(7));
    assert!(runner.dropped.load(Ordering::SeqCst));
    assert!(!runner.finished.load(Ordering::SeqCst));

    assert_eq!(rx.borrow_and_update().status, ExecStatus::SoftTimeout);
}

#[tokio::test(start_paused = true)]
async fn reply_after_hard_abort_never_lands() {
    let runner = FakeRunner::replying(
        Some(Duration::from_secs(10)),
        200,
        serde_json::json!({ "output": "too late" }),
    );
    let ctl = controller(&runner);

    let state = ctl.run(snapshot(), "10.10.1.10").await;
    assert_eq!(state.status, ExecStatus::SoftTimeout);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(ctl.state(), state);
    assert!(!runner.finished.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn reply_between_soft_and_hard_is_ignored() {
    let runner = FakeRunner::replying(
        Some(Duration::from_millis(5_500)),
        200,
        serde_json::json!({ "output": "late success" }),
    );
    let ctl = controller(&runner);

    let state = ctl.run(snapshot(), "10.10.1.10").await;
    assert_eq!(state.status, ExecStatus::SoftTimeout);
    assert_eq!(state.output, "");
    assert!(runner.finished.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn backend_ceiling_is_a_timeout_with_no_output() {
    let runner = FakeRunner::replying(
        Some(Duration::from_millis(4_900)),
        TIMEOUT_STATUS,
        serde_json::json!({ "output": "", "error": "Timeout: Script execution took longer than 5 seconds" }),
    );
    let ctl = controller(&runner);

    let state = ctl.run(snapshot(), "10.10.1.10").await;
    assert_eq!(state.status, ExecStatus::Failed);
    assert!(state.is_timeout());
    assert_eq!(state.output, "");
}

#[tokio::test(start_paused = true)]
async fn elapsed_ticks_while_running() {
    let runner = FakeRunner::replying(
        Some(Duration::from_secs(2)),
        200,
        serde_json::json!({ "output": "ok" }),
    );
    let ctl = controller(&runner);

    let probe = async {
        tokio::time::sleep(Duration::from_millis(550)).await;
        ctl.state()
    };
    let (final_state, mid) = tokio::join!(ctl.run(snapshot(), "h"), probe);

    assert_eq!(mid.status, ExecStatus::Running);
    assert!(mid.elapsed >= Duration::from_millis(500));
    assert_eq!(final_state.status, ExecStatus::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn cancel_aborts_the_call() {
    let runner = FakeRunner::hanging();
    let ctl = controller(&runner);

    let canceller = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        ctl.cancel();
    };
    let (state, ()) = tokio::join!(ctl.run(snapshot(), "h"), canceller);

    assert_eq!(state.status, ExecStatus::Aborted);
    assert_eq!(state.failure, Some(DeskError::Cancelled));
    assert!(runner.dropped.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn disposed_controller_freezes_state() {
    let runner = FakeRunner::hanging();
    let ctl = controller(&runner);

    let disposer = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        ctl.dispose();
    };
    let (state, ()) = tokio::join!(ctl.run(snapshot(), "h"), disposer);

    assert_eq!(state.status, ExecStatus::Running);
    assert!(runner.dropped.load(Ordering::SeqCst));

    let again = ctl.run(snapshot(), "h").await;
    assert_eq!(again, state);
    assert_eq!(runner.calls(), 1);
}

#[test]
fn hard_abort_must_exceed_soft_timeout() {
    let tick = Duration::from_millis(100);
    assert!(ExecTimeouts::new(Duration::from_secs(6), Duration::from_secs(5), tick).is_err());
    assert!(ExecTimeouts::new(Duration::from_secs(5), Duration::from_secs(5), tick).is_err());
    assert!(ExecTimeouts::new(Duration::from_secs(5), Duration::from_secs(6), Duration::ZERO).is_err());

    let t = ExecTimeouts::new(Duration::from_secs(5), Duration::from_secs(6), tick)
        .expect("valid timeouts");
    assert!(t.hard() > t.soft());
    assert!(ExecTimeouts::default().hard() > ExecTimeouts::default().soft());
}
