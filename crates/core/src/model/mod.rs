mod exercise;
mod session;
mod workout;

pub use exercise::{Exercise, ExerciseDraft, RepsLabel};
pub use session::{
    ProgressState, SessionMode, SessionOutcome, SessionPosition, SessionSnapshot, SessionSummary,
    SessionSummaryError,
};
pub use workout::{Workout, WorkoutDraft, WorkoutError};
