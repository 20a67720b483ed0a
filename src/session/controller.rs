use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::status::{RecordingSession, SessionState, SessionStatus};
use crate::engine::{EngineError, EngineErrorKind, EngineEvent, RecognitionResult, SpeechBackend};
use crate::transcript::SharedTranscript;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Errors returned by controller commands
#[derive(Debug, Error)]
pub enum SessionError {
    /// No recognition engine is available; the controller is terminal
    #[error("speech recognition unavailable: {0}")]
    Unsupported(String),

    /// start() while a session is already active
    #[error("a dictation session is already active")]
    AlreadyRecording,

    /// The engine rejected the launch with a fatal error
    #[error("recognition engine error: {0}")]
    Engine(#[from] EngineError),

    /// The controller task is gone (disposed)
    #[error("session controller is closed")]
    Closed,
}

enum Command {
    Start {
        language: Option<String>,
        reply: oneshot::Sender<Result<String, SessionError>>,
    },
    Stop {
        reply: oneshot::Sender<SessionStatus>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Internal phase; maps onto the public `SessionState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Paused,
    Unsupported,
    Listening,
    /// Engine launch accepted, waiting for the `Started` event
    AwaitingStart(StartKind),
    /// Stop requested, waiting for the terminal event before launching
    WindingDown(StartKind),
    /// Terminal event seen, settle delay armed before launching
    Settling(StartKind),
    /// Retry: backoff delay armed
    Backoff,
}

/// What the next engine launch is for; decides the public face of the
/// wind-down/settle/awaiting chain that leads up to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartKind {
    Fresh,
    Restart,
    Retry,
}

impl StartKind {
    fn public_state(self) -> SessionState {
        match self {
            StartKind::Fresh => SessionState::Starting,
            StartKind::Restart => SessionState::Restarting,
            StartKind::Retry => SessionState::Retrying,
        }
    }
}

impl Phase {
    fn public_state(self) -> SessionState {
        match self {
            Phase::Idle => SessionState::Idle,
            Phase::Paused => SessionState::Paused,
            Phase::Unsupported => SessionState::Unsupported,
            Phase::Listening => SessionState::Listening,
            Phase::AwaitingStart(kind) | Phase::WindingDown(kind) | Phase::Settling(kind) => {
                kind.public_state()
            }
            Phase::Backoff => SessionState::Retrying,
        }
    }
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Shutdown,
}

enum EngineSlot {
    Ready(Box<dyn SpeechBackend>),
    Unavailable(String),
}

/// Cloneable handle to a running session controller
///
/// The controller itself is a spawned task that owns the engine. It keeps
/// dictation uninterrupted on top of an engine that cuts sessions off after
/// a few minutes: it restarts the engine before the cutoff, retries
/// transient errors with backoff, and leaves committed transcript untouched
/// through every cycle. Dropping every handle disposes the controller.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<SessionStatus>,
}

impl ControllerHandle {
    /// Spawn a controller around an engine.
    pub fn spawn(
        engine: Box<dyn SpeechBackend>,
        transcript: SharedTranscript,
        config: SessionConfig,
    ) -> Self {
        Self::spawn_inner(EngineSlot::Ready(engine), transcript, config)
    }

    /// Spawn a controller for a host without any recognition engine.
    ///
    /// The controller sits in the terminal unsupported state; `start()`
    /// always fails with `reason`.
    pub fn spawn_unsupported(
        reason: impl Into<String>,
        transcript: SharedTranscript,
        config: SessionConfig,
    ) -> Self {
        Self::spawn_inner(EngineSlot::Unavailable(reason.into()), transcript, config)
    }

    fn spawn_inner(
        engine: EngineSlot,
        transcript: SharedTranscript,
        config: SessionConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        let (phase, initial) = match &engine {
            EngineSlot::Ready(_) => (Phase::Idle, SessionStatus::idle()),
            EngineSlot::Unavailable(reason) => {
                warn!("Speech recognition unavailable: {}", reason);
                (Phase::Unsupported, SessionStatus::unsupported(reason))
            }
        };
        let (status_tx, status_rx) = watch::channel(initial);

        let controller = Controller {
            config,
            engine,
            transcript,
            commands: cmd_rx,
            status_tx,
            phase,
            session: None,
            events: None,
            retry_attempts: 0,
            last_error: None,
            window_deadline: None,
            settle_deadline: None,
            retry_deadline: None,
            tick_deadline: None,
        };
        tokio::spawn(controller.run());

        Self {
            commands: cmd_tx,
            status: status_rx,
        }
    }

    /// Start a new dictation session.
    ///
    /// Valid from idle or paused; returns the new session id. A transient
    /// launch failure still starts the session and recovers automatically,
    /// and a start while the previous engine session is still winding down
    /// defers the launch until that session ends.
    pub async fn start(&self, language: Option<String>) -> Result<String, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Start {
                language,
                reply: tx,
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Stop the current session. Idempotent; returns the resulting status.
    pub async fn stop(&self) -> Result<SessionStatus, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Stop { reply: tx })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Empty the transcript; discards the stored session when not active.
    pub async fn clear(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Clear { reply: tx })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Current status snapshot.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Dispose of the controller: aborts any live engine session and stops
    /// the state machine for good. After this every command fails with
    /// `Closed`.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self
            .commands
            .send(Command::Shutdown { reply: tx })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}

struct Controller {
    config: SessionConfig,
    engine: EngineSlot,
    transcript: SharedTranscript,
    commands: mpsc::Receiver<Command>,
    status_tx: watch::Sender<SessionStatus>,

    phase: Phase,
    session: Option<RecordingSession>,
    events: Option<mpsc::Receiver<EngineEvent>>,
    retry_attempts: u32,
    last_error: Option<String>,

    window_deadline: Option<Instant>,
    settle_deadline: Option<Instant>,
    retry_deadline: Option<Instant>,
    tick_deadline: Option<Instant>,
}

impl Controller {
    async fn run(mut self) {
        debug!("Session controller running");

        loop {
            let flow = tokio::select! {
                cmd = self.commands.recv() => self.handle_command(cmd).await,
                event = recv_engine_event(&mut self.events) => {
                    match event {
                        Some(event) => self.handle_engine_event(event),
                        None => self.on_event_channel_closed(),
                    }
                    Flow::Continue
                }
                _ = sleep_until_armed(self.window_deadline) => {
                    self.on_window_elapsed().await;
                    Flow::Continue
                }
                _ = sleep_until_armed(self.settle_deadline) => {
                    self.on_settle_elapsed().await;
                    Flow::Continue
                }
                _ = sleep_until_armed(self.retry_deadline) => {
                    self.on_retry_elapsed().await;
                    Flow::Continue
                }
                _ = sleep_until_armed(self.tick_deadline) => {
                    self.on_tick();
                    Flow::Continue
                }
            };

            self.publish();

            if flow == Flow::Shutdown {
                break;
            }
        }

        debug!("Session controller stopped");
    }

    async fn handle_command(&mut self, cmd: Option<Command>) -> Flow {
        match cmd {
            Some(Command::Start { language, reply }) => {
                let result = self.handle_start(language).await;
                let _ = reply.send(result);
                Flow::Continue
            }
            Some(Command::Stop { reply }) => {
                self.handle_stop().await;
                let _ = reply.send(self.current_status());
                Flow::Continue
            }
            Some(Command::Clear { reply }) => {
                self.handle_clear();
                let _ = reply.send(());
                Flow::Continue
            }
            Some(Command::Shutdown { reply }) => {
                self.teardown().await;
                let _ = reply.send(());
                Flow::Shutdown
            }
            None => {
                // Every handle dropped
                self.teardown().await;
                Flow::Shutdown
            }
        }
    }

    async fn handle_start(&mut self, language: Option<String>) -> Result<String, SessionError> {
        match self.phase {
            Phase::Unsupported => Err(SessionError::Unsupported(
                self.unavailable_reason()
                    .unwrap_or("speech recognition is not available")
                    .to_string(),
            )),
            Phase::Idle | Phase::Paused => self.begin_session(language).await,
            _ => Err(SessionError::AlreadyRecording),
        }
    }

    async fn begin_session(&mut self, language: Option<String>) -> Result<String, SessionError> {
        let language = language.unwrap_or_else(|| self.config.language.clone());
        let session = RecordingSession::new(&language);
        let session_id = session.id.clone();

        info!("Starting dictation session {} ({})", session_id, language);

        self.session = Some(session);
        self.retry_attempts = 0;
        self.last_error = None;
        self.cancel_timers();
        self.transcript.with(|t| t.clear_interim());

        let engine = match &mut self.engine {
            EngineSlot::Ready(engine) => engine,
            EngineSlot::Unavailable(reason) => {
                return Err(SessionError::Unsupported(reason.clone()))
            }
        };
        engine.configure(&language);

        // A start right on the heels of a stop can land while the stopped
        // engine session is still delivering its flush. Launching now would
        // overlap two engine sessions; ride out the wind-down instead and
        // let the terminal event drive the launch.
        if self.events.is_some() {
            info!("Prior engine session still winding down; launch deferred");
            self.set_phase(Phase::WindingDown(StartKind::Fresh));
            return Ok(session_id);
        }

        match engine.start().await {
            Ok(events) => {
                self.events = Some(events);
                self.set_phase(Phase::AwaitingStart(StartKind::Fresh));
                Ok(session_id)
            }
            Err(err) if err.kind.is_retryable() => {
                warn!("Engine launch failed ({}), will retry: {}", err.kind, err.message);
                if self.schedule_retry(&err) {
                    Ok(session_id)
                } else {
                    Err(SessionError::Engine(err))
                }
            }
            Err(err) => {
                error!("Engine launch failed: {}", err);
                self.fail_session(&err);
                Err(SessionError::Engine(err))
            }
        }
    }

    async fn handle_stop(&mut self) {
        match self.phase {
            Phase::Idle | Phase::Paused | Phase::Unsupported => {
                warn!("Stop requested but no dictation session is active");
            }
            _ => {
                // In wind-down the engine was already asked to stop
                let stop_engine = matches!(self.phase, Phase::Listening | Phase::AwaitingStart(_));

                info!("Stopping dictation session");
                self.cancel_timers();
                if let Some(session) = self.session.as_mut() {
                    session.ended_at = Some(Utc::now());
                }
                self.set_phase(Phase::Paused);

                if stop_engine {
                    if let EngineSlot::Ready(engine) = &mut self.engine {
                        engine.stop().await;
                    }
                }
                // self.events stays open so a final flush still commits
            }
        }
    }

    fn handle_clear(&mut self) {
        info!("Clearing transcript");
        self.transcript.clear();
        if matches!(self.phase, Phase::Idle | Phase::Paused | Phase::Unsupported) {
            self.session = None;
        }
    }

    async fn teardown(&mut self) {
        debug!("Disposing session controller");
        self.cancel_timers();
        self.events = None;

        if self.phase.public_state().is_active() {
            if let EngineSlot::Ready(engine) = &mut self.engine {
                engine.abort().await;
            }
        }
        if let Some(session) = self.session.as_mut() {
            if session.ended_at.is_none() {
                session.ended_at = Some(Utc::now());
            }
        }
        if self.phase != Phase::Unsupported {
            self.set_phase(Phase::Idle);
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => self.on_engine_started(),
            EngineEvent::Results(results) => self.on_results(results),
            EngineEvent::Ended => self.on_engine_ended(),
            EngineEvent::Failed(err) => self.on_engine_failed(err),
        }
    }

    fn on_engine_started(&mut self) {
        match self.phase {
            Phase::AwaitingStart(kind) => {
                match kind {
                    StartKind::Fresh => info!("Engine session started"),
                    StartKind::Restart => info!("Engine session restarted"),
                    StartKind::Retry => {
                        info!("Engine session recovered after {} attempt(s)", self.retry_attempts)
                    }
                }
                self.retry_attempts = 0;
                self.last_error = None;
                let now = Instant::now();
                self.window_deadline = Some(now + self.config.window);
                self.tick_deadline = Some(now + TICK_INTERVAL);
                self.set_phase(Phase::Listening);
            }
            Phase::Idle | Phase::Paused | Phase::WindingDown(_) => {
                debug!("Engine started after the session was stopped; ignoring");
            }
            _ => warn!("Unexpected engine start in phase {:?}", self.phase),
        }
    }

    fn on_results(&mut self, results: Vec<RecognitionResult>) {
        if !matches!(
            self.phase,
            Phase::Listening | Phase::WindingDown(_) | Phase::Paused
        ) {
            debug!(
                "Dropping {} result(s) in phase {:?}",
                results.len(),
                self.phase
            );
            return;
        }

        // Whole batch under one lock hold: finals land before the interim
        // update and readers never observe the batch half-applied.
        let committed = self.transcript.with(|t| {
            let mut committed = 0usize;
            let mut interim = String::new();
            for result in &results {
                if result.is_final {
                    if t.commit_final(&result.text, result.confidence, result.speaker.clone())
                        .is_some()
                    {
                        committed += 1;
                    }
                } else {
                    if !interim.is_empty() {
                        interim.push(' ');
                    }
                    interim.push_str(result.text.trim());
                }
            }
            t.set_interim(&interim);
            committed
        });

        if committed > 0 {
            debug!("Committed {} segment(s) from result batch", committed);
        }
    }

    fn on_engine_ended(&mut self) {
        self.events = None;
        match self.phase {
            Phase::WindingDown(kind) => self.begin_settling(kind),
            Phase::Listening => {
                // The engine cut the session off before our window elapsed
                info!("Engine session ended early; restarting");
                self.begin_unplanned_restart();
            }
            Phase::AwaitingStart(_) => {
                warn!("Engine session ended before it started");
                let err = EngineError::new(
                    EngineErrorKind::Unknown,
                    "engine session ended before it started",
                );
                self.on_launch_error(err);
            }
            Phase::Paused => debug!("Engine session ended after stop"),
            _ => debug!("Ignoring engine end in phase {:?}", self.phase),
        }
    }

    fn on_engine_failed(&mut self, err: EngineError) {
        self.events = None;

        if err.kind.is_benign() {
            debug!("Ignoring benign engine error: {}", err);
            match self.phase {
                Phase::WindingDown(kind) => self.begin_settling(kind),
                // The engine session is gone either way; relaunch quietly
                Phase::Listening => self.begin_unplanned_restart(),
                Phase::AwaitingStart(kind) => self.begin_settling(kind),
                _ => {}
            }
            return;
        }

        match self.phase {
            Phase::Listening | Phase::AwaitingStart(_) => {
                self.window_deadline = None;
                self.tick_deadline = None;
                self.transcript.with(|t| t.clear_interim());
                self.on_launch_error(err);
            }
            Phase::WindingDown(kind) => {
                if err.kind.is_retryable() {
                    warn!("Engine error during wind-down ({}): {}", err.kind, err.message);
                    self.begin_settling(kind);
                } else {
                    error!("Fatal engine error during wind-down: {}", err);
                    self.fail_session(&err);
                }
            }
            Phase::Paused => debug!("Engine error after stop: {}", err),
            _ => debug!("Ignoring engine error in phase {:?}: {}", self.phase, err),
        }
    }

    /// Shared classification for errors that kill a launch or a live session.
    fn on_launch_error(&mut self, err: EngineError) {
        if err.kind.is_retryable() {
            warn!("Engine error ({}), scheduling retry: {}", err.kind, err.message);
            self.schedule_retry(&err);
        } else {
            error!("Fatal engine error: {}", err);
            self.fail_session(&err);
        }
    }

    fn on_event_channel_closed(&mut self) {
        self.events = None;
        match self.phase {
            Phase::WindingDown(kind) => {
                warn!("Engine event channel closed before the terminal event");
                self.begin_settling(kind);
            }
            Phase::Listening => {
                warn!("Engine event channel closed unexpectedly; restarting");
                self.begin_unplanned_restart();
            }
            Phase::AwaitingStart(_) => {
                let err = EngineError::new(
                    EngineErrorKind::Unknown,
                    "engine event channel closed before the session started",
                );
                self.on_launch_error(err);
            }
            _ => {}
        }
    }

    /// The engine session died in Listening without our timer asking for it.
    fn begin_unplanned_restart(&mut self) {
        self.window_deadline = None;
        self.tick_deadline = None;
        if let Some(session) = self.session.as_mut() {
            session.engine_restarts += 1;
        }
        self.transcript.with(|t| t.clear_interim());
        self.begin_settling(StartKind::Restart);
    }

    fn begin_settling(&mut self, kind: StartKind) {
        self.settle_deadline = Some(Instant::now() + self.config.settle);
        self.set_phase(Phase::Settling(kind));
    }

    async fn on_window_elapsed(&mut self) {
        self.window_deadline = None;
        if self.phase != Phase::Listening {
            return;
        }

        info!(
            "Session window elapsed after {:?}; restarting engine session",
            self.config.window
        );
        self.tick_deadline = None;
        if let Some(session) = self.session.as_mut() {
            session.engine_restarts += 1;
        }
        self.transcript.with(|t| t.clear_interim());
        self.set_phase(Phase::WindingDown(StartKind::Restart));

        if let EngineSlot::Ready(engine) = &mut self.engine {
            engine.stop().await;
        }
    }

    async fn on_settle_elapsed(&mut self) {
        self.settle_deadline = None;
        let kind = match self.phase {
            Phase::Settling(kind) => kind,
            _ => return,
        };
        self.relaunch(kind).await;
    }

    async fn on_retry_elapsed(&mut self) {
        self.retry_deadline = None;
        if self.phase != Phase::Backoff {
            return;
        }
        self.relaunch(StartKind::Retry).await;
    }

    async fn relaunch(&mut self, kind: StartKind) {
        let engine = match &mut self.engine {
            EngineSlot::Ready(engine) => engine,
            EngineSlot::Unavailable(_) => return,
        };

        match engine.start().await {
            Ok(events) => {
                self.events = Some(events);
                self.set_phase(Phase::AwaitingStart(kind));
            }
            Err(err) if err.kind.is_retryable() => {
                warn!("Engine relaunch failed ({}), will retry: {}", err.kind, err.message);
                self.schedule_retry(&err);
            }
            Err(err) => {
                error!("Engine relaunch failed: {}", err);
                self.fail_session(&err);
            }
        }
    }

    fn on_tick(&mut self) {
        if self.phase != Phase::Listening {
            self.tick_deadline = None;
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.duration_secs += 1;
        }
        // Re-arm from the previous deadline so ticks do not drift
        self.tick_deadline = self.tick_deadline.map(|d| d + TICK_INTERVAL);
    }

    /// Arm the next retry, or give up once the budget is spent.
    /// Returns whether a retry was armed.
    fn schedule_retry(&mut self, err: &EngineError) -> bool {
        self.retry_attempts += 1;
        self.last_error = Some(err.to_string());

        if self.retry_attempts >= self.config.max_retries {
            error!(
                "Recognition failed after {} attempt(s); giving up: {}",
                self.retry_attempts, err
            );
            self.fail_with_message(format!(
                "recognition failed after {} attempts: {}",
                self.retry_attempts, err
            ));
            return false;
        }

        let delay = self.config.retry_backoff * self.retry_attempts;
        debug!("Retry attempt {} in {:?}", self.retry_attempts, delay);
        self.retry_deadline = Some(Instant::now() + delay);
        self.set_phase(Phase::Backoff);
        true
    }

    fn fail_session(&mut self, err: &EngineError) {
        self.fail_with_message(err.to_string());
    }

    fn fail_with_message(&mut self, message: String) {
        self.cancel_timers();
        self.events = None;
        self.last_error = Some(message);
        if let Some(session) = self.session.as_mut() {
            if session.ended_at.is_none() {
                session.ended_at = Some(Utc::now());
            }
        }
        self.set_phase(Phase::Idle);
    }

    fn cancel_timers(&mut self) {
        self.window_deadline = None;
        self.settle_deadline = None;
        self.retry_deadline = None;
        self.tick_deadline = None;
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("Controller phase: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn unavailable_reason(&self) -> Option<&str> {
        match &self.engine {
            EngineSlot::Unavailable(reason) => Some(reason.as_str()),
            EngineSlot::Ready(_) => None,
        }
    }

    fn current_status(&self) -> SessionStatus {
        let (interim, segments, words) = self
            .transcript
            .with(|t| (t.interim().to_string(), t.len(), t.word_count()));

        SessionStatus {
            state: self.phase.public_state(),
            session: self.session.clone(),
            interim,
            segments_committed: segments,
            word_count: words,
            last_error: self.last_error.clone(),
            retry_attempts: self.retry_attempts,
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.current_status());
    }
}

async fn recv_engine_event(events: &mut Option<mpsc::Receiver<EngineEvent>>) -> Option<EngineEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => futures::future::pending().await,
    }
}

async fn sleep_until_armed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => futures::future::pending().await,
    }
}
