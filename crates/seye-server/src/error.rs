//! Error types for the track feed binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the track feed binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: seye_core::config::ConfigError,
    },

    /// Simulation clock construction failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: seye_core::clock::ClockError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: seye_observer::ServerError,
    },

    /// The simulation clock task panicked or was cancelled.
    #[error("clock task failed: {message}")]
    ClockTask {
        /// Description of the join failure.
        message: String,
    },
}
