use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use coach_core::Clock;
use coach_core::model::{
    ProgressState, SessionMode, SessionOutcome, SessionPosition, SessionSnapshot, SessionSummary,
    Workout, WorkoutDraft,
};
use coach_core::progression::{self, SessionEvent};
use tokio::sync::mpsc;

use super::progress::SessionProgress;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::rest_timer::{RestTimer, TimerEvent, TimerEventReceiver, TimerEventSender, TimerId};

//
// ─── INTENTS ───────────────────────────────────────────────────────────────────
//

/// What the athlete asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionIntent {
    CompleteSet,
    SkipRest,
    Abort,
}

/// Receiving end for the controller's rest-timer notifications.
///
/// Feed every event back through `SessionController::handle_timer_event`.
#[derive(Debug)]
pub struct TimerEvents(TimerEventReceiver);

impl TimerEvents {
    pub async fn recv(&mut self) -> Option<TimerEvent> {
        self.0.recv().await
    }

    pub fn try_recv(&mut self) -> Option<TimerEvent> {
        self.0.try_recv().ok()
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns the progress of one workout session.
///
/// Position and mode change only through `progression::next_state`. At most
/// one `RestTimer` is alive, and only while resting.
pub struct SessionController {
    workout: Arc<Workout>,
    config: SessionConfig,
    clock: Clock,
    state: ProgressState,
    rest_remaining: u32,
    timer: Option<RestTimer>,
    next_timer_id: TimerId,
    events: TimerEventSender,
    sets_completed: u32,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl SessionController {
    /// Validate `draft` and start a session at the first set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidWorkout` if the draft has no exercises or
    /// any exercise has fewer than one set.
    pub fn new(
        draft: WorkoutDraft,
        config: SessionConfig,
        clock: Clock,
    ) -> Result<(Self, TimerEvents), SessionError> {
        let workout = draft.validate()?;
        Ok(Self::from_workout(workout, config, clock))
    }

    /// Start a session for an already validated workout.
    #[must_use]
    pub fn from_workout(
        workout: Workout,
        config: SessionConfig,
        clock: Clock,
    ) -> (Self, TimerEvents) {
        let (events, rx) = mpsc::unbounded_channel();
        let started_at = clock.now();

        tracing::info!(
            exercises = workout.len(),
            total_sets = workout.total_sets(),
            rest_ticks = config.rest_ticks(),
            "workout session started"
        );

        let controller = Self {
            workout: Arc::new(workout),
            config,
            clock,
            state: ProgressState::initial(),
            rest_remaining: 0,
            timer: None,
            next_timer_id: TimerId::new(1),
            events,
            sets_completed: 0,
            started_at,
            ended_at: None,
        };
        (controller, TimerEvents(rx))
    }

    #[must_use]
    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    #[must_use]
    pub fn position(&self) -> SessionPosition {
        self.state.position
    }

    #[must_use]
    pub fn rest_remaining(&self) -> u32 {
        if self.state.mode == SessionMode::Resting {
            self.rest_remaining
        } else {
            0
        }
    }

    /// Id of the live rest timer, if resting.
    #[must_use]
    pub fn live_timer(&self) -> Option<TimerId> {
        self.timer.as_ref().map(RestTimer::id)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.mode.is_terminal()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let rest_total = self.timer.as_ref().map_or(0, RestTimer::ticks);
        SessionSnapshot::project(&self.workout, self.state, self.rest_remaining, rest_total)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total_sets = self.workout.total_sets();
        SessionProgress {
            total_sets,
            sets_completed: self.sets_completed,
            remaining_sets: total_sets.saturating_sub(self.sets_completed),
            is_complete: self.state.mode == SessionMode::Completed,
        }
    }

    /// Summary of a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` while the session is still running.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let outcome = SessionOutcome::try_from(self.state.mode)?;
        let ended_at = self.ended_at.unwrap_or_else(|| self.stamp_end());
        Ok(SessionSummary::new(
            self.started_at,
            ended_at,
            outcome,
            self.sets_completed,
            self.workout.total_sets(),
        )?)
    }

    /// Dispatch an intent. Intents that do not apply in the current mode are
    /// ignored, including everything after the session has ended.
    pub fn apply(&mut self, intent: SessionIntent) -> SessionSnapshot {
        match intent {
            SessionIntent::CompleteSet => self.complete_set(),
            SessionIntent::SkipRest => self.skip_rest(),
            SessionIntent::Abort => self.abort(),
        }
    }

    /// The current set is done: start resting.
    pub fn complete_set(&mut self) -> SessionSnapshot {
        self.transition(SessionEvent::SetCompleted);
        self.snapshot()
    }

    /// End the rest period now and move on.
    pub fn skip_rest(&mut self) -> SessionSnapshot {
        self.transition(SessionEvent::RestFinished);
        self.snapshot()
    }

    /// Quit the session. Any live rest timer is cancelled before this returns.
    pub fn abort(&mut self) -> SessionSnapshot {
        self.transition(SessionEvent::Aborted);
        self.snapshot()
    }

    /// Apply a rest-timer notification.
    ///
    /// Only events from the live timer count. Events from a cancelled timer,
    /// including an expiry that was already queued when the rest was skipped,
    /// return `None` and change nothing. Each rest period therefore advances
    /// exactly once.
    pub fn handle_timer_event(&mut self, event: TimerEvent) -> Option<SessionSnapshot> {
        if self.live_timer() != Some(event.timer()) {
            tracing::trace!(timer = %event.timer(), "dropping stale timer event");
            return None;
        }

        match event {
            TimerEvent::Tick { remaining, .. } => {
                tracing::trace!(remaining, "rest tick");
                self.rest_remaining = remaining;
            }
            TimerEvent::Expired { .. } => {
                tracing::debug!("rest period expired");
                self.transition(SessionEvent::RestFinished);
            }
        }
        Some(self.snapshot())
    }

    fn transition(&mut self, event: SessionEvent) {
        let before = self.state;
        let after = progression::next_state(&self.workout, before, event);
        if after == before {
            tracing::debug!(mode = before.mode.as_str(), ?event, "intent ignored");
            return;
        }

        if before.mode == SessionMode::Resting {
            self.release_timer();
        }
        if event == SessionEvent::SetCompleted {
            self.sets_completed = self.sets_completed.saturating_add(1);
        }
        self.state = after;

        tracing::debug!(
            from = before.mode.as_str(),
            to = after.mode.as_str(),
            exercise = after.position.exercise_index(),
            set = after.position.set(),
            "session transition"
        );

        match after.mode {
            SessionMode::Resting => self.acquire_timer(),
            SessionMode::Completed | SessionMode::Aborted => {
                self.ended_at = Some(self.stamp_end());
                tracing::info!(
                    outcome = after.mode.as_str(),
                    sets_completed = self.sets_completed,
                    "workout session ended"
                );
            }
            SessionMode::Active => {}
        }
    }

    /// Wall-clock end time, never earlier than the start even if the system
    /// clock stepped backwards mid-session.
    fn stamp_end(&self) -> DateTime<Utc> {
        self.clock.now().max(self.started_at)
    }

    fn acquire_timer(&mut self) {
        self.release_timer();
        let id = self.next_timer_id;
        self.next_timer_id = id.next();
        self.rest_remaining = self.config.rest_ticks();
        self.timer = Some(RestTimer::start(
            id,
            self.config.rest_ticks(),
            self.config.tick(),
            self.events.clone(),
        ));
    }

    fn release_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.rest_remaining = 0;
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if !self.is_finished() {
            tracing::debug!(mode = self.state.mode.as_str(), "session abandoned");
        }
        self.release_timer();
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("exercises", &self.workout.len())
            .field("state", &self.state)
            .field("rest_remaining", &self.rest_remaining)
            .field("timer", &self.timer)
            .field("sets_completed", &self.sets_completed)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
