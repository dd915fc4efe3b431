use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::exercise::{Exercise, ExerciseDraft};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a workout cannot be run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorkoutError {
    #[error("workout has no exercises")]
    Empty,

    #[error("exercise {index} ({name:?}) must have at least one set, got {target_sets}")]
    InvalidTargetSets {
        index: usize,
        name: String,
        target_sets: i64,
    },

    #[error("exercise {index} has too many sets: {target_sets}")]
    TooManySets { index: usize, target_sets: i64 },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Workout structure exactly as a workout source delivered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    #[serde(default)]
    pub exercises: Vec<ExerciseDraft>,
}

impl WorkoutDraft {
    #[must_use]
    pub fn new(exercises: Vec<ExerciseDraft>) -> Self {
        Self { exercises }
    }

    /// Check the draft and freeze it into a runnable `Workout`.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutError::Empty` if there are no exercises.
    /// Returns `WorkoutError::InvalidTargetSets` for any exercise with `target_sets <= 0`.
    /// Returns `WorkoutError::TooManySets` if a set count does not fit in `u32`.
    pub fn validate(self) -> Result<Workout, WorkoutError> {
        if self.exercises.is_empty() {
            return Err(WorkoutError::Empty);
        }

        let exercises = self
            .exercises
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                if draft.target_sets <= 0 {
                    return Err(WorkoutError::InvalidTargetSets {
                        index,
                        name: draft.name,
                        target_sets: draft.target_sets,
                    });
                }
                let target_sets =
                    u32::try_from(draft.target_sets).map_err(|_| WorkoutError::TooManySets {
                        index,
                        target_sets: draft.target_sets,
                    })?;
                Ok(Exercise::new(draft.name, target_sets, draft.reps))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Workout { exercises })
    }
}

impl TryFrom<WorkoutDraft> for Workout {
    type Error = WorkoutError;

    fn try_from(draft: WorkoutDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

//
// ─── WORKOUT ───────────────────────────────────────────────────────────────────
//

/// An ordered, non-empty list of exercises. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workout {
    exercises: Vec<Exercise>,
}

impl Workout {
    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    /// Final exercise. Always present because a `Workout` is never empty.
    #[must_use]
    pub fn last(&self) -> &Exercise {
        &self.exercises[self.exercises.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Sum of sets across every exercise.
    #[must_use]
    pub fn total_sets(&self) -> u32 {
        self.exercises
            .iter()
            .fold(0_u32, |acc, e| acc.saturating_add(e.target_sets()))
    }
}
