use thiserror::Error;

use crate::scoring::ScoringError;

/// Failures surfaced by the service layer. Handlers map these onto HTTP
/// statuses; everything except `Internal` is a caller mistake.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("round {0} is already recorded; use the correction endpoint to replace it")]
    RoundExists(u32),
    #[error("round {0} does not exist")]
    RoundMissing(u32),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
