use chess::FenError;

use crate::session::SessionMode;

/// Puzzle data that cannot be turned into a playable line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] FenError),
    #[error("Puzzle has no solution moves")]
    EmptySolution,
    #[error("Illegal solution move {index} ({text}): {reason}")]
    IllegalSolutionMove {
        index: usize,
        text: String,
        reason: String,
    },
    #[error("Solution has no moves for the {0} side")]
    NoUserMoves(chess::PlayerSide),
}

/// Move text that cannot be resolved against a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("Empty move")]
    Empty,
    #[error("Unrecognised move notation: {0}")]
    Unrecognized(String),
    #[error("Illegal move: {0}")]
    Illegal(String),
}

impl NotationError {
    /// Whether the text had the shape of a move (and was merely illegal).
    pub fn is_illegal(&self) -> bool {
        matches!(self, Self::Illegal(_))
    }
}

/// Failure of a puzzle fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("No puzzle matches the requested filters")]
    NotFound,
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    #[error("Invalid puzzle: {0}")]
    InvalidPuzzle(String),
}

impl From<PuzzleError> for LoadError {
    fn from(e: PuzzleError) -> Self {
        Self::InvalidPuzzle(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("No puzzle loaded")]
    NoPuzzle,
    #[error("{operation} is not allowed in {mode:?} mode")]
    NotAllowed {
        operation: &'static str,
        mode: SessionMode,
    },
    #[error("Puzzle is not completed yet")]
    NotCompleted,
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] FenError),
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
}
