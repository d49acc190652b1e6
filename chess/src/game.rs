use cozy_chess::{Board, Color, GameStatus, Move, Piece};

use crate::san::{format_san, parse_san, SanError};
use crate::uci::{format_standard_uci, legal_moves, looks_like_uci, resolve_uci_move, UciError};

/// Game state wrapper around a cozy-chess Board with replayable history.
#[derive(Debug, Clone)]
pub struct Game {
    position: Board,
    history: Vec<HistoryEntry>,
    start_fen: String,
}

/// One played move together with its notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub piece: Piece,
    pub color: Color,
    pub captured: Option<Piece>,
    /// Standard Algebraic Notation, including the check suffix.
    pub san: String,
    /// Coordinate notation with castling written as a two-square king move.
    pub uci: String,
    /// FEN after this move.
    pub fen: String,
}

impl Game {
    /// Create a game from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position = crate::fen::parse_fen(fen)?;
        Ok(Self {
            position,
            history: Vec::new(),
            start_fen: fen.trim().to_string(),
        })
    }

    /// Create a game starting from an already parsed position
    pub fn from_board(board: Board) -> Self {
        let fen = crate::fen::format_fen(&board);
        Self {
            position: board,
            history: Vec::new(),
            start_fen: fen,
        }
    }

    /// Get the current board position
    pub fn position(&self) -> &Board {
        &self.position
    }

    /// Get the move history
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Make a move on the board
    pub fn make_move(&mut self, mv: Move) -> Result<HistoryEntry, GameError> {
        let piece = self
            .position
            .piece_on(mv.from)
            .ok_or(GameError::IllegalMove)?;
        let color = self.position.side_to_move();
        let captured = match self.position.color_on(mv.to) {
            Some(c) if c != color => self.position.piece_on(mv.to),
            // En passant lands on an empty square
            None if piece == Piece::Pawn && mv.from.file() != mv.to.file() => Some(Piece::Pawn),
            _ => None,
        };

        // Notation is relative to the position before the move
        let san = format_san(&self.position, mv);
        let uci = format_standard_uci(&self.position, mv);

        self.position
            .try_play(mv)
            .map_err(|_| GameError::IllegalMove)?;

        let entry = HistoryEntry {
            mv,
            piece,
            color,
            captured,
            san,
            uci,
            fen: self.to_fen(),
        };
        self.history.push(entry.clone());

        Ok(entry)
    }

    /// Parse `text` as UCI or SAN and play it.
    pub fn make_move_text(&mut self, text: &str) -> Result<HistoryEntry, GameError> {
        let mv = self.resolve_move(text)?;
        self.make_move(mv)
    }

    /// Resolve UCI or SAN text to a legal move in the current position.
    pub fn resolve_move(&self, text: &str) -> Result<Move, GameError> {
        if looks_like_uci(text) {
            Ok(resolve_uci_move(&self.position, text)?)
        } else {
            Ok(parse_san(&self.position, text)?)
        }
    }

    /// Undo the last move
    pub fn undo(&mut self) -> Result<HistoryEntry, GameError> {
        let entry = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.rebuild_position()?;
        Ok(entry)
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.position)
    }

    /// Get the current game status
    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    pub fn is_check(&self) -> bool {
        !self.position.checkers().is_empty()
    }

    /// Get the side to move
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Export position to FEN string
    pub fn to_fen(&self) -> String {
        crate::fen::format_fen(&self.position)
    }

    /// Rebuild position from start + history (for undo)
    fn rebuild_position(&mut self) -> Result<(), GameError> {
        let mut board = crate::fen::parse_fen(&self.start_fen)?;

        for entry in &self.history {
            board
                .try_play(entry.mv)
                .map_err(|_| GameError::IllegalMove)?;
        }

        self.position = board;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move")]
    IllegalMove,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("FEN parse error: {0}")]
    Fen(#[from] crate::fen::FenError),
    #[error(transparent)]
    Uci(#[from] UciError),
    #[error(transparent)]
    San(#[from] SanError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_move_records_notation() {
        let mut game = Game::from_board(Board::default());
        let entry = game.make_move_text("e4").unwrap();
        assert_eq!(entry.san, "e4");
        assert_eq!(entry.uci, "e2e4");
        assert_eq!(entry.color, Color::White);
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_make_move_rejects_illegal() {
        let mut game = Game::from_board(Board::default());
        assert!(game.make_move_text("e2e5").is_err());
        assert!(game.make_move_text("Qh5").is_err());
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_undo_restores_position() {
        let mut game = Game::from_board(Board::default());
        let start = game.to_fen();
        game.make_move_text("e2e4").unwrap();
        let after_one = game.to_fen();
        game.make_move_text("e7e5").unwrap();

        let undone = game.undo().unwrap();
        assert_eq!(undone.uci, "e7e5");
        assert_eq!(game.to_fen(), after_one);
        game.undo().unwrap();
        assert_eq!(game.to_fen(), start);
        assert!(matches!(game.undo(), Err(GameError::NothingToUndo)));
    }

    #[test]
    fn test_undo_from_fen_start() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut game = Game::from_fen(fen).unwrap();
        let entry = game.make_move_text("e1g1").unwrap();
        assert_eq!(entry.san, "O-O");
        assert_eq!(entry.uci, "e1g1");
        game.undo().unwrap();
        assert_eq!(game.to_fen(), fen);
    }

    #[test]
    fn test_capture_is_recorded() {
        let mut game = Game::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let entry = game.make_move_text("exd6").unwrap();
        assert_eq!(entry.captured, Some(Piece::Pawn));
    }

    #[test]
    fn test_checkmate_status() {
        let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/3RK3 w - - 0 1").unwrap();
        let entry = game.make_move_text("d1d8").unwrap();
        assert_eq!(entry.san, "Rd8#");
        assert_eq!(game.status(), GameStatus::Won);
        assert!(game.is_check());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn random_playout_notation_and_undo(choices in proptest::collection::vec(any::<u16>(), 1..40)) {
                let mut game = Game::from_board(Board::default());
                let mut fens = vec![game.to_fen()];

                for choice in choices {
                    let legal = game.legal_moves();
                    if legal.is_empty() {
                        break;
                    }
                    let mv = legal[choice as usize % legal.len()];
                    let san = format_san(game.position(), mv);
                    prop_assert_eq!(parse_san(game.position(), &san).unwrap(), mv);

                    let entry = game.make_move(mv).unwrap();
                    prop_assert_eq!(resolve_uci_move(
                        &crate::fen::parse_fen(&fens[fens.len() - 1]).unwrap(),
                        &entry.uci,
                    ).unwrap(), mv);
                    fens.push(game.to_fen());
                }

                while game.undo().is_ok() {
                    fens.pop();
                    prop_assert_eq!(game.to_fen(), fens[fens.len() - 1].clone());
                }
                prop_assert_eq!(fens.len(), 1);
            }
        }
    }
}
