// Shared test support: a scriptable fake speech engine plus helpers for
// waiting on controller status changes under tokio's paused clock.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dicta::engine::{EngineError, EngineErrorKind, EngineEvent, SpeechBackend};
use dicta::session::{SessionState, SessionStatus};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// Everything the controller asked the engine to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Configure(String),
    Start,
    Stop,
    Abort,
}

pub type CallLog = Arc<Mutex<Vec<EngineCall>>>;

pub fn calls(log: &CallLog) -> Vec<EngineCall> {
    log.lock().unwrap().clone()
}

pub fn start_count(log: &CallLog) -> usize {
    calls(log)
        .iter()
        .filter(|c| **c == EngineCall::Start)
        .count()
}

/// What one engine session should do
#[derive(Clone)]
pub enum SessionPlan {
    /// Reject the launch from `start()` itself
    Reject(EngineError),
    /// Accept, then play a timeline of events (ms from session start)
    Emit {
        timeline: Vec<(u64, EngineEvent)>,
        /// Delivered when the controller stops this session
        on_stop: Vec<EngineEvent>,
    },
}

impl SessionPlan {
    /// Accept and sit silent after `Started` until stopped.
    pub fn started_then_idle() -> Self {
        SessionPlan::Emit {
            timeline: vec![(0, EngineEvent::Started)],
            on_stop: vec![EngineEvent::Ended],
        }
    }
}

enum FakeCtrl {
    Stop,
    Abort,
}

/// Fake engine: consumes one `SessionPlan` per `start()` and records every
/// call. Once the plans run out, further sessions behave like
/// `started_then_idle`.
pub struct FakeEngine {
    plans: VecDeque<SessionPlan>,
    log: CallLog,
    ctrl: Option<mpsc::UnboundedSender<FakeCtrl>>,
}

impl FakeEngine {
    pub fn new(plans: Vec<SessionPlan>) -> (Self, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                plans: plans.into(),
                log: log.clone(),
                ctrl: None,
            },
            log,
        )
    }
}

#[async_trait::async_trait]
impl SpeechBackend for FakeEngine {
    fn configure(&mut self, language: &str) {
        self.log
            .lock()
            .unwrap()
            .push(EngineCall::Configure(language.to_string()));
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<EngineEvent>, EngineError> {
        self.log.lock().unwrap().push(EngineCall::Start);

        let plan = self
            .plans
            .pop_front()
            .unwrap_or_else(SessionPlan::started_then_idle);

        let (timeline, on_stop) = match plan {
            SessionPlan::Reject(err) => return Err(err),
            SessionPlan::Emit { timeline, on_stop } => (timeline, on_stop),
        };

        let (event_tx, event_rx) = mpsc::channel(64);
        let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_session(timeline, on_stop, event_tx, ctrl_rx));

        self.ctrl = Some(ctrl_tx);
        Ok(event_rx)
    }

    async fn stop(&mut self) {
        self.log.lock().unwrap().push(EngineCall::Stop);
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(FakeCtrl::Stop);
        }
    }

    async fn abort(&mut self) {
        self.log.lock().unwrap().push(EngineCall::Abort);
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(FakeCtrl::Abort);
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

async fn run_session(
    timeline: Vec<(u64, EngineEvent)>,
    on_stop: Vec<EngineEvent>,
    event_tx: mpsc::Sender<EngineEvent>,
    mut ctrl_rx: mpsc::UnboundedReceiver<FakeCtrl>,
) {
    let origin = Instant::now();

    for (at_ms, event) in timeline {
        tokio::select! {
            _ = tokio::time::sleep_until(origin + Duration::from_millis(at_ms)) => {
                let terminal = matches!(event, EngineEvent::Ended | EngineEvent::Failed(_));
                if event_tx.send(event).await.is_err() {
                    return;
                }
                if terminal {
                    return;
                }
            }
            cmd = ctrl_rx.recv() => {
                finish(cmd, on_stop, &event_tx).await;
                return;
            }
        }
    }

    // Timeline exhausted; stay live until the controller stops us
    let cmd = ctrl_rx.recv().await;
    finish(cmd, on_stop, &event_tx).await;
}

async fn finish(
    cmd: Option<FakeCtrl>,
    on_stop: Vec<EngineEvent>,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match cmd {
        Some(FakeCtrl::Stop) => {
            for event in on_stop {
                if event_tx.send(event).await.is_err() {
                    return;
                }
            }
        }
        // Abort (or the engine being dropped) suppresses everything
        Some(FakeCtrl::Abort) | None => {}
    }
}

/// Fake engine with a slow graceful stop: the session stays live for
/// `linger` after `stop()`, then delivers `stop_flush` and the terminal
/// `Ended`. `start()` rejects overlap with `AlreadyStarted`, the way the
/// backend trait documents it.
pub struct LingeringStopEngine {
    linger: Duration,
    stop_flush: Vec<EngineEvent>,
    live: Arc<AtomicBool>,
    log: CallLog,
    ctrl: Option<mpsc::UnboundedSender<FakeCtrl>>,
}

impl LingeringStopEngine {
    pub fn new(linger: Duration, stop_flush: Vec<EngineEvent>) -> (Self, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                linger,
                stop_flush,
                live: Arc::new(AtomicBool::new(false)),
                log: log.clone(),
                ctrl: None,
            },
            log,
        )
    }
}

#[async_trait::async_trait]
impl SpeechBackend for LingeringStopEngine {
    fn configure(&mut self, language: &str) {
        self.log
            .lock()
            .unwrap()
            .push(EngineCall::Configure(language.to_string()));
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<EngineEvent>, EngineError> {
        self.log.lock().unwrap().push(EngineCall::Start);
        if self.live.load(Ordering::SeqCst) {
            return Err(EngineError::new(
                EngineErrorKind::AlreadyStarted,
                "recognition session already started",
            ));
        }
        self.live.store(true, Ordering::SeqCst);

        let (event_tx, event_rx) = mpsc::channel(64);
        let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_lingering(
            self.linger,
            self.stop_flush.clone(),
            self.live.clone(),
            event_tx,
            ctrl_rx,
        ));

        self.ctrl = Some(ctrl_tx);
        Ok(event_rx)
    }

    async fn stop(&mut self) {
        self.log.lock().unwrap().push(EngineCall::Stop);
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(FakeCtrl::Stop);
        }
    }

    async fn abort(&mut self) {
        self.log.lock().unwrap().push(EngineCall::Abort);
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(FakeCtrl::Abort);
        }
    }

    fn name(&self) -> &str {
        "lingering"
    }
}

async fn run_lingering(
    linger: Duration,
    stop_flush: Vec<EngineEvent>,
    live: Arc<AtomicBool>,
    event_tx: mpsc::Sender<EngineEvent>,
    mut ctrl_rx: mpsc::UnboundedReceiver<FakeCtrl>,
) {
    if event_tx.send(EngineEvent::Started).await.is_err() {
        live.store(false, Ordering::SeqCst);
        return;
    }

    match ctrl_rx.recv().await {
        Some(FakeCtrl::Stop) => {
            tokio::time::sleep(linger).await;
            for event in stop_flush {
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
            // Live until the terminal event goes out
            live.store(false, Ordering::SeqCst);
            let _ = event_tx.send(EngineEvent::Ended).await;
        }
        Some(FakeCtrl::Abort) | None => live.store(false, Ordering::SeqCst),
    }
}

/// Wait until the published status satisfies `pred`; panics on timeout.
pub async fn wait_until(
    rx: &mut watch::Receiver<SessionStatus>,
    timeout: Duration,
    pred: impl Fn(&SessionStatus) -> bool,
) -> SessionStatus {
    let deadline = Instant::now() + timeout;
    loop {
        {
            let status = rx.borrow_and_update();
            if pred(&status) {
                return status.clone();
            }
        }
        tokio::select! {
            changed = rx.changed() => {
                assert!(changed.is_ok(), "status channel closed while waiting");
            }
            _ = tokio::time::sleep_until(deadline) => {
                panic!("timed out waiting for status, last was {:?}", *rx.borrow());
            }
        }
    }
}

pub async fn wait_for_state(
    rx: &mut watch::Receiver<SessionStatus>,
    state: SessionState,
    timeout: Duration,
) -> SessionStatus {
    wait_until(rx, timeout, |s| s.state == state).await
}
