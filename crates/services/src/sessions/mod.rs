mod controller;
mod progress;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{SessionController, SessionIntent, TimerEvents};
pub use progress::SessionProgress;
pub use workflow::{SessionHandle, WorkoutSessionService, spawn_session};
