use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{RepsLabel, Workout};

//
// ─── MODE & POSITION ───────────────────────────────────────────────────────────
//

/// What the athlete is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    Active,
    Resting,
    Completed,
    Aborted,
}

impl SessionMode {
    /// `Completed` and `Aborted` accept no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionMode::Completed | SessionMode::Aborted)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Active => "active",
            SessionMode::Resting => "resting",
            SessionMode::Completed => "completed",
            SessionMode::Aborted => "aborted",
        }
    }
}

/// Where in the workout the session is. `set` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionPosition {
    exercise_index: usize,
    set: u32,
}

impl SessionPosition {
    /// First set of the first exercise.
    #[must_use]
    pub fn start() -> Self {
        Self {
            exercise_index: 0,
            set: 1,
        }
    }

    pub(crate) fn new(exercise_index: usize, set: u32) -> Self {
        Self {
            exercise_index,
            set,
        }
    }

    #[must_use]
    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    #[must_use]
    pub fn set(&self) -> u32 {
        self.set
    }
}

impl Default for SessionPosition {
    fn default() -> Self {
        Self::start()
    }
}

/// Position plus mode: the full input of the progression function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressState {
    pub position: SessionPosition,
    pub mode: SessionMode,
}

impl ProgressState {
    #[must_use]
    pub fn initial() -> Self {
        Self {
            position: SessionPosition::start(),
            mode: SessionMode::Active,
        }
    }
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Read-only projection of a running session, for display and telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub exercise_name: String,
    /// 1-based, for "exercise 2/5" headers.
    pub exercise_number: usize,
    pub total_exercises: usize,
    pub current_set: u32,
    pub target_sets: u32,
    pub reps_label: RepsLabel,
    pub mode: SessionMode,
    /// Ticks left in the current rest period; zero unless resting.
    pub rest_remaining: u32,
    /// Length of the current rest period; zero unless resting.
    pub rest_total: u32,
}

impl SessionSnapshot {
    /// Project `state` onto `workout`.
    ///
    /// `rest_remaining` / `rest_total` are only carried while resting.
    #[must_use]
    pub fn project(
        workout: &Workout,
        state: ProgressState,
        rest_remaining: u32,
        rest_total: u32,
    ) -> Self {
        let index = state.position.exercise_index().min(workout.len() - 1);
        let exercise = workout.exercise(index).unwrap_or_else(|| workout.last());
        let resting = state.mode == SessionMode::Resting;

        Self {
            exercise_name: exercise.name().to_owned(),
            exercise_number: index + 1,
            total_exercises: workout.len(),
            current_set: state.position.set(),
            target_sets: exercise.target_sets(),
            reps_label: exercise.reps_label().clone(),
            mode: state.mode,
            rest_remaining: if resting { rest_remaining } else { 0 },
            rest_total: if resting { rest_total } else { 0 },
        }
    }

    /// Share of the rest period still to go, in `[0, 1]`.
    #[must_use]
    pub fn rest_fraction(&self) -> f32 {
        if self.rest_total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.rest_remaining as f32 / self.rest_total as f32;
        fraction.clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.mode.is_terminal()
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("ended_at is before started_at")]
    InvalidTimeRange,

    #[error("sets completed ({completed}) exceeds total sets ({total})")]
    SetCountMismatch { completed: u32, total: u32 },

    #[error("session summary requires a terminal mode, got {0:?}")]
    NotTerminal(SessionMode),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Completed,
    Aborted,
}

impl TryFrom<SessionMode> for SessionOutcome {
    type Error = SessionSummaryError;

    fn try_from(mode: SessionMode) -> Result<Self, Self::Error> {
        match mode {
            SessionMode::Completed => Ok(SessionOutcome::Completed),
            SessionMode::Aborted => Ok(SessionOutcome::Aborted),
            other => Err(SessionSummaryError::NotTerminal(other)),
        }
    }
}

/// Aggregate record of one finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    outcome: SessionOutcome,
    sets_completed: u32,
    total_sets: u32,
}

impl SessionSummary {
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `ended_at` is before `started_at`.
    /// Returns `SessionSummaryError::SetCountMismatch` if more sets were completed than exist.
    pub fn new(
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        outcome: SessionOutcome,
        sets_completed: u32,
        total_sets: u32,
    ) -> Result<Self, SessionSummaryError> {
        if ended_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if sets_completed > total_sets {
            return Err(SessionSummaryError::SetCountMismatch {
                completed: sets_completed,
                total: total_sets,
            });
        }

        Ok(Self {
            started_at,
            ended_at,
            outcome,
            sets_completed,
            total_sets,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }

    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    #[must_use]
    pub fn sets_completed(&self) -> u32 {
        self.sets_completed
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseDraft, WorkoutDraft};
    use crate::time::fixed_now;

    fn workout() -> Workout {
        WorkoutDraft::new(vec![
            ExerciseDraft::new("Squat", 2, "10"),
            ExerciseDraft::new("Press", 1, "8"),
        ])
        .validate()
        .unwrap()
    }

    #[test]
    fn snapshot_hides_rest_outside_resting() {
        let snap = SessionSnapshot::project(&workout(), ProgressState::initial(), 30, 45);
        assert_eq!(snap.exercise_name, "Squat");
        assert_eq!(snap.exercise_number, 1);
        assert_eq!(snap.total_exercises, 2);
        assert_eq!(snap.current_set, 1);
        assert_eq!(snap.target_sets, 2);
        assert_eq!(snap.rest_remaining, 0);
        assert_eq!(snap.rest_total, 0);
        assert!((snap.rest_fraction() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_reports_rest_fraction() {
        let state = ProgressState {
            position: SessionPosition::start(),
            mode: SessionMode::Resting,
        };
        let snap = SessionSnapshot::project(&workout(), state, 15, 60);
        assert_eq!(snap.rest_remaining, 15);
        assert!((snap.rest_fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let snap = SessionSnapshot::project(&workout(), ProgressState::initial(), 0, 0);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["exerciseName"], "Squat");
        assert_eq!(json["repsLabel"], "10");
        assert_eq!(json["mode"], "Active");
    }

    #[test]
    fn summary_rejects_inverted_time_range() {
        let now = fixed_now();
        let err = SessionSummary::new(
            now,
            now - Duration::seconds(1),
            SessionOutcome::Completed,
            3,
            3,
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn summary_rejects_more_sets_than_exist() {
        let now = fixed_now();
        let err = SessionSummary::new(now, now, SessionOutcome::Aborted, 4, 3).unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::SetCountMismatch {
                completed: 4,
                total: 3
            }
        );
    }

    #[test]
    fn summary_reports_duration() {
        let now = fixed_now();
        let summary = SessionSummary::new(
            now,
            now + Duration::minutes(12),
            SessionOutcome::Completed,
            3,
            3,
        )
        .unwrap();
        assert_eq!(summary.duration(), Duration::minutes(12));
    }

    #[test]
    fn summary_serializes_timestamps_as_rfc3339() {
        let now = fixed_now();
        let summary = SessionSummary::new(now, now, SessionOutcome::Aborted, 1, 3).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["startedAt"], "2023-11-14T22:13:20Z");
        assert_eq!(json["endedAt"], "2023-11-14T22:13:20Z");
        assert_eq!(json["setsCompleted"], 1);
    }

    #[test]
    fn only_terminal_modes_become_outcomes() {
        assert_eq!(
            SessionOutcome::try_from(SessionMode::Aborted),
            Ok(SessionOutcome::Aborted)
        );
        assert_eq!(
            SessionOutcome::try_from(SessionMode::Resting),
            Err(SessionSummaryError::NotTerminal(SessionMode::Resting))
        );
    }
}
