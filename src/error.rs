//! Error types for FernSonic

use crate::runtime::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FernSonicError {
    /// No content exists at the given path. Checked on the caller's side
    /// before the engine is asked to load anything.
    #[error("Resource not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    /// The engine returned a non-success status. Carries the engine's
    /// status code and message verbatim.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// A liveness-checked handle was used after the session was released.
    #[error("Session used after release")]
    InvalidState,

    /// A bank was loaded with a cache key that is already registered.
    #[error("Bank cache key already registered: {0}")]
    DuplicateCacheKey(String),
}

pub type Result<T> = std::result::Result<T, FernSonicError>;
