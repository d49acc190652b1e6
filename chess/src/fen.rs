use cozy_chess::Board;

use crate::types::PlayerSide;

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::InvalidFormat);
    }
    if parts[0].split('/').count() != 8 {
        return Err(FenError::InvalidBoardLayout);
    }

    fen.parse().map_err(|_| FenError::InvalidFormat)
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    // cozy-chess Display emits standard (non-Shredder) FEN
    board.to_string()
}

/// Side to move encoded in a FEN string.
pub fn side_to_move(fen: &str) -> Result<PlayerSide, FenError> {
    parse_fen(fen).map(|board| PlayerSide::from(board.side_to_move()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_round_trip_start_position() {
        let board = parse_fen(START).unwrap();
        assert_eq!(format_fen(&board), START);
    }

    #[test]
    fn test_side_to_move() {
        assert_eq!(side_to_move(START).unwrap(), PlayerSide::White);
        assert_eq!(
            side_to_move("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap(),
            PlayerSide::Black
        );
    }

    #[test]
    fn test_rejects_truncated_fen() {
        assert!(matches!(parse_fen(""), Err(FenError::InvalidFormat)));
        assert!(matches!(
            parse_fen("8/8/8 w - -"),
            Err(FenError::InvalidBoardLayout)
        ));
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    }
}
