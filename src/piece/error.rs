use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid piece size: {0}")]
    InvalidPieceSize(u64),

    #[error("too many pieces: {0}")]
    TooManyPieces(u64),
}
