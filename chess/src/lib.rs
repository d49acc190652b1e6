pub mod analysis;
pub mod board_display;
pub mod converters;
pub mod fen;
pub mod game;
pub mod san;
pub mod types;
pub mod uci;

pub use analysis::AnalysisScore;
pub use board_display::{DisplayBoard, DisplayBoardError};
pub use converters::*;
pub use fen::{format_fen, parse_fen, FenError};
pub use game::{Game, GameError, HistoryEntry};
pub use san::{format_san, parse_san, SanError};
pub use types::{PieceColor, PieceKind, PlayerSide};
pub use uci::{
    convert_uci_castling_to_cozy, format_standard_uci, format_uci_move, looks_like_uci,
    parse_uci_move, resolve_uci_move, UciError,
};

// Re-exported so downstream crates share one cozy-chess version
pub use cozy_chess::{Board, Color, File, GameStatus, Move, Piece, Rank, Square};
