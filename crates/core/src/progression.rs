//! Workout progression as a single total transition function.
//!
//! Everything that decides "next set, next exercise, or done" lives here, so
//! callers never branch on last-set / last-exercise themselves.

use crate::model::{ProgressState, SessionMode, SessionPosition, Workout};

/// Inputs that can move a session forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// The athlete finished the current set.
    SetCompleted,
    /// The rest period ended, by expiry or by skipping.
    RestFinished,
    /// The athlete quit.
    Aborted,
}

/// Result of stepping past a rest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextSet(SessionPosition),
    NextExercise(SessionPosition),
    /// Last set of the last exercise is done; carries the frozen final position.
    Finished(SessionPosition),
}

impl Advance {
    #[must_use]
    pub fn position(self) -> SessionPosition {
        match self {
            Advance::NextSet(p) | Advance::NextExercise(p) | Advance::Finished(p) => p,
        }
    }

    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Advance::Finished(_))
    }
}

/// Step from `position` to whatever comes after its rest period.
///
/// Total: a position past the end of the workout is treated as finished and
/// clamped to the last exercise's last set.
#[must_use]
pub fn advance(workout: &Workout, position: SessionPosition) -> Advance {
    let Some(exercise) = workout.exercise(position.exercise_index()) else {
        return Advance::Finished(final_position(workout));
    };

    if position.set() < exercise.target_sets() {
        return Advance::NextSet(SessionPosition::new(
            position.exercise_index(),
            position.set() + 1,
        ));
    }

    let next_index = position.exercise_index() + 1;
    if next_index < workout.len() {
        Advance::NextExercise(SessionPosition::new(next_index, 1))
    } else {
        Advance::Finished(final_position(workout))
    }
}

/// Last set of the last exercise.
#[must_use]
pub fn final_position(workout: &Workout) -> SessionPosition {
    SessionPosition::new(workout.len() - 1, workout.last().target_sets())
}

/// Apply `event` to `state`.
///
/// Defined for every `(state, event)` pair. Terminal states absorb everything,
/// and events that make no sense in the current mode leave the state unchanged.
#[must_use]
pub fn next_state(workout: &Workout, state: ProgressState, event: SessionEvent) -> ProgressState {
    use SessionEvent as E;
    use SessionMode as M;

    match (state.mode, event) {
        (M::Completed | M::Aborted, _) => state,
        (M::Active | M::Resting, E::Aborted) => ProgressState {
            position: state.position,
            mode: M::Aborted,
        },
        (M::Active, E::SetCompleted) => ProgressState {
            position: state.position,
            mode: M::Resting,
        },
        (M::Resting, E::RestFinished) => match advance(workout, state.position) {
            Advance::Finished(position) => ProgressState {
                position,
                mode: M::Completed,
            },
            step => ProgressState {
                position: step.position(),
                mode: M::Active,
            },
        },
        (M::Active, E::RestFinished) | (M::Resting, E::SetCompleted) => state,
    }
}
