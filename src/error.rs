use crate::game::action::Action;

/// failure modes of the engine. all of these surface to the nearest
/// orchestrator (self-play loop or trainer); nothing inside the core
/// retries or swallows them. Cancelled is not an error so much as a
/// distinguished result from long-running operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("illegal move ({0})")]
    IllegalMove(Action),
    #[error("no legal moves available")]
    NoMoves,
    #[error("dimension mismatch (expected {expected}, found {found})")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("incompatible checkpoint ({0})")]
    CheckpointIncompatible(String),
    #[error("cancelled")]
    Cancelled,
    #[error("evaluator returned malformed output ({0})")]
    EvaluatorFailure(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
