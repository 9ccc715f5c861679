//! Error types for the metrics overlay.

use thiserror::Error;

/// Errors returned by [`PerfOverlay`](crate::PerfOverlay) operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("metrics overlay was not initialized, call `initialize` first")]
    NotInitialized,

    #[error("metrics overlay is already initialized")]
    AlreadyInitialized,

    #[error("unknown metric `{0}`")]
    UnknownMetric(String),

    #[error("metric `{0}` is registered more than once")]
    DuplicateMetric(String),

    #[error("metrics overlay has been closed")]
    Closed,

    #[error("failed to spawn the overlay render thread: {source}")]
    ThreadSpawn {
        #[from]
        source: std::io::Error,
    },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors raised by an [`OverlaySurface`](crate::OverlaySurface) or its factory.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("could not create overlay surface: {0}")]
    Creation(String),

    #[error("could not present overlay frame: {0}")]
    Present(String),
}

pub type Result<T, E = OverlayError> = std::result::Result<T, E>;
