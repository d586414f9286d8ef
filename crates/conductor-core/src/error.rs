use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("conductor is not set up: run 'conductor init' and write the product, tech-stack and workflow documents")]
    NotSetUp,

    #[error("track not found: {0}")]
    TrackNotFound(String),

    #[error("invalid track id '{0}': expected track-<digits>")]
    InvalidTrackId(String),

    #[error("track id space exhausted at '{0}': no larger id can be allocated")]
    TrackIdOverflow(String),

    #[error("invalid status '{0}': expected pending, in_progress or completed")]
    InvalidStatus(String),

    #[error("invalid description {0:?}: must be a single non-empty line")]
    InvalidDescription(String),

    #[error("unknown context document '{0}': expected product, guidelines, tech_stack or workflow")]
    UnknownDocument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConductorError>;
