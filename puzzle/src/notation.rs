//! Move normalization shared by solution validation and user attempts.
//!
//! Both sides of every comparison go through [`resolve_move`], so a SAN
//! solution ("Nxe7+") matches a UCI attempt ("c6e7") and vice versa.

use std::fmt;

use chess::{
    format_square, format_uci_move, looks_like_uci, parse_san, parse_square, resolve_uci_move,
    Board, Move, Piece, Rank, SanError, Square, UciError,
};

use crate::error::NotationError;

/// A move as entered on a board: origin, destination, optional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInput {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl MoveInput {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: Piece) -> Self {
        self.promotion = Some(piece);
        self
    }

    /// Parse from square names ("e2", "e4").
    pub fn from_squares(from: &str, to: &str) -> Option<Self> {
        Some(Self::new(parse_square(from)?, parse_square(to)?))
    }
}

impl From<Move> for MoveInput {
    fn from(mv: Move) -> Self {
        Self {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion,
        }
    }
}

impl fmt::Display for MoveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_uci_move(Move {
                from: self.from,
                to: self.to,
                promotion: self.promotion,
            })
        )
    }
}

/// Resolve UCI ("e2e4", "e1g1") or SAN ("Nf3", "O-O", "e8=Q+") text to a
/// legal move on `board`.
pub fn resolve_move(board: &Board, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NotationError::Empty);
    }

    if looks_like_uci(text) {
        return resolve_uci_move(board, text).map_err(|e| match e {
            UciError::IllegalMove(t) => NotationError::Illegal(t),
            other => NotationError::Unrecognized(other.to_string()),
        });
    }

    parse_san(board, text).map_err(|e| match e {
        SanError::InvalidFormat(t) => NotationError::Unrecognized(t),
        SanError::NoLegalMove(t) | SanError::AmbiguousMove(t) => NotationError::Illegal(t),
    })
}

/// Resolve a board input to a legal move.
///
/// Standard castling squares (e1g1) are accepted, and a pawn reaching the
/// last rank without a promotion piece promotes to a queen.
pub fn resolve_input(board: &Board, input: MoveInput) -> Result<Move, NotationError> {
    let mut input = input;
    if input.promotion.is_none() && is_promotion_square(board, input) {
        input.promotion = Some(Piece::Queen);
    }

    resolve_uci_move(board, &input.to_string()).map_err(|_| {
        NotationError::Illegal(format!(
            "{}{}",
            format_square(input.from),
            format_square(input.to)
        ))
    })
}

fn is_promotion_square(board: &Board, input: MoveInput) -> bool {
    board.piece_on(input.from) == Some(Piece::Pawn)
        && matches!(input.to.rank(), Rank::First | Rank::Eighth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    #[test]
    fn test_uci_and_san_resolve_to_same_move() {
        let b = Board::default();
        assert_eq!(resolve_move(&b, "g1f3").unwrap(), resolve_move(&b, "Nf3").unwrap());
        assert_eq!(resolve_move(&b, " e4 ").unwrap(), resolve_move(&b, "e2e4").unwrap());
    }

    #[test]
    fn test_error_kinds() {
        let b = Board::default();
        assert_eq!(resolve_move(&b, ""), Err(NotationError::Empty));
        assert!(resolve_move(&b, "e2e5").unwrap_err().is_illegal());
        assert!(resolve_move(&b, "Qh5").unwrap_err().is_illegal());
        assert!(!resolve_move(&b, "hello").unwrap_err().is_illegal());
    }

    #[test]
    fn test_input_auto_queens() {
        let b = board("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let input = MoveInput::from_squares("e7", "e8").unwrap();
        let mv = resolve_input(&b, input).unwrap();
        assert_eq!(mv.promotion, Some(Piece::Queen));

        let under = resolve_input(&b, input.with_promotion(Piece::Knight)).unwrap();
        assert_eq!(under.promotion, Some(Piece::Knight));
    }

    #[test]
    fn test_input_standard_castling() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let mv = resolve_input(&b, MoveInput::from_squares("e1", "g1").unwrap()).unwrap();
        assert_eq!(mv, resolve_move(&b, "O-O").unwrap());
    }

    #[test]
    fn test_input_display_is_uci() {
        let input = MoveInput::from_squares("e7", "e8")
            .unwrap()
            .with_promotion(Piece::Queen);
        assert_eq!(input.to_string(), "e7e8q");
        assert!(resolve_input(&Board::default(), MoveInput::from_squares("e2", "e5").unwrap())
            .unwrap_err()
            .is_illegal());
    }
}
