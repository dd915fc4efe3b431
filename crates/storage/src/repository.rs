use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use coach_core::model::WorkoutDraft;
use thiserror::Error;

/// Errors surfaced by workout sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("no workout available")]
    NotFound,

    #[error("workout source is not configured")]
    Disabled,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("workout source returned status {0}")]
    HttpStatus(u16),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Serialization(err.to_string())
    }
}

/// Anything that can hand the session engine a workout to run.
///
/// Sources return drafts; validation belongs to whoever starts the session.
#[async_trait]
pub trait WorkoutSource: Send + Sync {
    /// Fetch the next workout to run.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the workout cannot be loaded or decoded.
    async fn next_workout(&self) -> Result<WorkoutDraft, SourceError>;
}

/// Serves a fixed draft. Handy for tests and demos.
#[derive(Clone, Default)]
pub struct InMemoryWorkoutSource {
    draft: Arc<Mutex<Option<WorkoutDraft>>>,
}

impl InMemoryWorkoutSource {
    #[must_use]
    pub fn new(draft: WorkoutDraft) -> Self {
        Self {
            draft: Arc::new(Mutex::new(Some(draft))),
        }
    }

    /// Source that never has a workout.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the served draft.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connection` if the lock is poisoned.
    pub fn set(&self, draft: WorkoutDraft) -> Result<(), SourceError> {
        let mut guard = self
            .draft
            .lock()
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        *guard = Some(draft);
        Ok(())
    }
}

#[async_trait]
impl WorkoutSource for InMemoryWorkoutSource {
    async fn next_workout(&self) -> Result<WorkoutDraft, SourceError> {
        let guard = self
            .draft
            .lock()
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        guard.clone().ok_or(SourceError::NotFound)
    }
}

/// Reads a workout from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct JsonFileWorkoutSource {
    path: PathBuf,
}

impl JsonFileWorkoutSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WorkoutSource for JsonFileWorkoutSource {
    async fn next_workout(&self) -> Result<WorkoutDraft, SourceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound
            } else {
                SourceError::Io(format!("{}: {e}", self.path.display()))
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::model::ExerciseDraft;
    use std::io::Write;

    #[tokio::test]
    async fn in_memory_source_serves_and_replaces() {
        let source = InMemoryWorkoutSource::empty();
        assert!(matches!(
            source.next_workout().await,
            Err(SourceError::NotFound)
        ));

        let draft = WorkoutDraft::new(vec![ExerciseDraft::new("Squat", 2, "10")]);
        source.set(draft.clone()).unwrap();
        assert_eq!(source.next_workout().await.unwrap(), draft);
    }

    #[tokio::test]
    async fn json_file_source_decodes_generator_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"exercises":[{{"exerciseName":"Squat","sets":2,"reps":"10"}}]}}"#
        )
        .unwrap();

        let source = JsonFileWorkoutSource::new(file.path());
        let draft = source.next_workout().await.unwrap();
        assert_eq!(draft.exercises.len(), 1);
        assert_eq!(draft.exercises[0].name, "Squat");
        assert_eq!(draft.exercises[0].target_sets, 2);
    }

    #[tokio::test]
    async fn json_file_source_reports_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = JsonFileWorkoutSource::new(dir.path().join("nope.json"));
        assert!(matches!(
            missing.next_workout().await,
            Err(SourceError::NotFound)
        ));

        let bad_path = dir.path().join("bad.json");
        std::fs::write(&bad_path, "{ not json").unwrap();
        let bad = JsonFileWorkoutSource::new(bad_path);
        assert!(matches!(
            bad.next_workout().await,
            Err(SourceError::Serialization(_))
        ));
    }
}
