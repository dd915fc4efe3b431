use std::env;

use async_trait::async_trait;
use coach_core::model::WorkoutDraft;
use reqwest::Client;
use storage::repository::{SourceError, WorkoutSource};

#[derive(Clone, Debug)]
pub struct RemoteWorkoutConfig {
    pub base_url: String,
    pub token: String,
}

impl RemoteWorkoutConfig {
    /// Reads `COACH_API_TOKEN` and `COACH_API_BASE_URL`. `None` without a token.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let token = env::var("COACH_API_TOKEN").ok()?;
        if token.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("COACH_API_BASE_URL").unwrap_or_else(|_| "http://localhost:7123/api".into());
        Some(Self { base_url, token })
    }

    #[must_use]
    pub fn generate_url(&self) -> String {
        format!("{}/Workout/generate", self.base_url.trim_end_matches('/'))
    }
}

/// Asks the remote generation service for today's workout.
#[derive(Clone)]
pub struct RemoteWorkoutSource {
    client: Client,
    config: Option<RemoteWorkoutConfig>,
}

impl RemoteWorkoutSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RemoteWorkoutConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<RemoteWorkoutConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl WorkoutSource for RemoteWorkoutSource {
    async fn next_workout(&self) -> Result<WorkoutDraft, SourceError> {
        let config = self.config.as_ref().ok_or(SourceError::Disabled)?;

        let url = config.generate_url();
        tracing::debug!(%url, "requesting generated workout");

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.token)
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }

        let draft: WorkoutDraft = response
            .json()
            .await
            .map_err(|e| SourceError::Serialization(e.to_string()))?;
        tracing::info!(exercises = draft.exercises.len(), "generated workout received");
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_source_reports_disabled() {
        let source = RemoteWorkoutSource::new(None);
        assert!(!source.enabled());
        assert!(matches!(
            source.next_workout().await,
            Err(SourceError::Disabled)
        ));
    }

    #[test]
    fn generate_url_tolerates_trailing_slash() {
        let config = RemoteWorkoutConfig {
            base_url: "https://coach.example/api/".into(),
            token: "t".into(),
        };
        assert_eq!(config.generate_url(), "https://coach.example/api/Workout/generate");
    }
}
