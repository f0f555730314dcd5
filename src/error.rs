use thiserror::Error;

/// Recoverable failures of the timing edit operations.
///
/// A failed edit never produces a partial result: callers keep the snapshot
/// they passed in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("split point {time:.3}s is outside or too close to the edges of [{start:.3}, {end:.3}]")]
    InvalidRange { time: f64, start: f64, end: f64 },

    #[error("split at character {index} would leave an empty text segment")]
    EmptyPartition { index: usize },

    #[error("word {id} has no positive duration")]
    DegenerateDuration { id: String },
}

impl TimingError {
    pub(crate) fn sentence(id: &str) -> Self {
        TimingError::NotFound {
            kind: "sentence",
            id: id.to_string(),
        }
    }

    pub(crate) fn word(id: &str) -> Self {
        TimingError::NotFound {
            kind: "word",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TimingError>;
