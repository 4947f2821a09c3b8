use crate::placement::{Placement, Rect};
use crate::session::SessionId;

/// Everything a request against the engine can be rejected for. Running out of legal placements
/// is not in here: that's an expected end state, reported as an empty result.
#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("invalid word {word:?}: {reason}")]
    InvalidWord { word: String, reason: &'static str },
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
    #[error("rectangle has inverted bounds: {0:?}")]
    InvertedRect(Rect),
    #[error("snapshot was taken from a different lattice")]
    ForeignSnapshot,
    #[error("snapshot no longer matches the commit history")]
    StaleSnapshot,
    #[error("illegal placement {placement:?}: {reason}")]
    IllegalPlacement { placement: Placement, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, LatticeError>;
