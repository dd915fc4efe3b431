#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{InMemoryWorkoutSource, JsonFileWorkoutSource, SourceError, WorkoutSource};
