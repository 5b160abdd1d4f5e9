use thiserror::Error;

/// Top-level error type for the tracekit editing engine.
#[derive(Debug, Error)]
pub enum TracekitError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Errors related to geometric computations.
///
/// Geometric failures are always local to one pointer event: callers keep
/// the previous valid result for that frame instead of propagating further.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the trace graph and commit operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Convenience type alias for results using [`TracekitError`].
pub type Result<T> = std::result::Result<T, TracekitError>;
