use std::sync::Arc;

use coach_core::Clock;
use coach_core::model::{SessionSnapshot, SessionSummary};
use storage::repository::WorkoutSource;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::controller::{SessionController, SessionIntent, TimerEvents};
use crate::config::SessionConfig;
use crate::error::SessionError;

const INTENT_BUFFER: usize = 16;

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Presentation-side handle to a running session.
///
/// Sends intents in, and reads snapshots and the final summary out. Dropping
/// every handle and intent sender aborts the session.
#[derive(Debug)]
pub struct SessionHandle {
    intents: mpsc::Sender<SessionIntent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<Result<SessionSummary, SessionError>>,
}

impl SessionHandle {
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session loop has already exited.
    pub async fn send(&self, intent: SessionIntent) -> Result<(), SessionError> {
        self.intents
            .send(intent)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session loop has already exited.
    pub async fn complete_set(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::CompleteSet).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session loop has already exited.
    pub async fn skip_rest(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::SkipRest).await
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session loop has already exited.
    pub async fn abort(&self) -> Result<(), SessionError> {
        self.send(SessionIntent::Abort).await
    }

    /// Extra sender for UI code that posts intents from elsewhere.
    #[must_use]
    pub fn intents(&self) -> mpsc::Sender<SessionIntent> {
        self.intents.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot updates (every transition and every rest tick).
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Give up the handle and wait for the session's summary.
    ///
    /// Consuming the handle counts as dropping it: intents already sent are
    /// still applied, and then a session that is still running is aborted
    /// unless another sender from `intents()` is alive.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task panicked or was cancelled.
    pub async fn finished(self) -> Result<SessionSummary, SessionError> {
        let Self { intents, task, .. } = self;
        drop(intents);
        task.await.map_err(|_| SessionError::Closed)?
    }
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

/// Run `controller` on its own task.
///
/// User intents and timer events are handled one at a time on that task, so
/// transitions never interleave.
#[must_use]
pub fn spawn_session(controller: SessionController, events: TimerEvents) -> SessionHandle {
    let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    let task = tokio::spawn(run_session(controller, events, intent_rx, snapshot_tx));

    SessionHandle {
        intents: intent_tx,
        snapshots: snapshot_rx,
        task,
    }
}

async fn run_session(
    mut controller: SessionController,
    mut events: TimerEvents,
    mut intents: mpsc::Receiver<SessionIntent>,
    snapshots: watch::Sender<SessionSnapshot>,
) -> Result<SessionSummary, SessionError> {
    while !controller.is_finished() {
        let snapshot = tokio::select! {
            biased;
            intent = intents.recv() => match intent {
                Some(intent) => Some(controller.apply(intent)),
                None => {
                    tracing::debug!("all session handles dropped, aborting");
                    Some(controller.abort())
                }
            },
            Some(event) = events.recv() => controller.handle_timer_event(event),
        };

        if let Some(snapshot) = snapshot {
            snapshots.send_replace(snapshot);
        }
    }

    controller.summary()
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Starts sessions from a workout source.
#[derive(Clone)]
pub struct WorkoutSessionService {
    clock: Clock,
    source: Arc<dyn WorkoutSource>,
    config: SessionConfig,
}

impl WorkoutSessionService {
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn WorkoutSource>, config: SessionConfig) -> Self {
        Self {
            clock,
            source,
            config,
        }
    }

    /// Fetch a workout, validate it, and start running it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Source` if the workout cannot be fetched.
    /// Returns `SessionError::InvalidWorkout` if it fails validation.
    pub async fn start_session(&self) -> Result<SessionHandle, SessionError> {
        let draft = self.source.next_workout().await?;
        let (controller, events) = SessionController::new(draft, self.config, self.clock)?;
        Ok(spawn_session(controller, events))
    }
}
