#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod remote_workouts;
pub mod rest_timer;
pub mod sessions;

pub use coach_core::Clock;

pub use config::SessionConfig;
pub use error::{ConfigError, SessionError};
pub use remote_workouts::{RemoteWorkoutConfig, RemoteWorkoutSource};
pub use rest_timer::{RestTimer, TimerEvent, TimerId};

pub use sessions::{
    SessionController, SessionHandle, SessionIntent, SessionProgress, TimerEvents,
    WorkoutSessionService, spawn_session,
};
