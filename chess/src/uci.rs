//! UCI (Universal Chess Interface) move utilities

use cozy_chess::{Board, File, Move, Rank, Square};

use crate::converters::{format_piece, format_square, parse_piece, parse_square};

/// Parse coordinate notation ("e2e4", "e7e8q") without checking legality.
pub fn parse_uci_move(text: &str) -> Result<Move, UciError> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(UciError::InvalidFormat(text.to_string()));
    }

    let from = parse_square(&text[0..2]).ok_or_else(|| UciError::InvalidSquare(text.to_string()))?;
    let to = parse_square(&text[2..4]).ok_or_else(|| UciError::InvalidSquare(text.to_string()))?;
    let promotion = match text[4..].chars().next() {
        Some(c) => Some(parse_piece(c).ok_or(UciError::InvalidPromotion(c))?),
        None => None,
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Returns true if the text has the shape of a coordinate move.
pub fn looks_like_uci(text: &str) -> bool {
    let bytes = text.trim().as_bytes();
    let coord = |f: u8, r: u8| (b'a'..=b'h').contains(&f) && (b'1'..=b'8').contains(&r);
    match bytes.len() {
        4 => coord(bytes[0], bytes[1]) && coord(bytes[2], bytes[3]),
        5 => {
            coord(bytes[0], bytes[1])
                && coord(bytes[2], bytes[3])
                && matches!(bytes[4].to_ascii_lowercase(), b'q' | b'r' | b'b' | b'n')
        }
        _ => false,
    }
}

/// Resolve coordinate notation to a legal move on `board`.
///
/// Standard castling notation (e1g1) is translated to cozy-chess's
/// king-captures-rook form before the legality check.
pub fn resolve_uci_move(board: &Board, text: &str) -> Result<Move, UciError> {
    let mv = parse_uci_move(text)?;
    let legal = legal_moves(board);
    let mv = convert_uci_castling_to_cozy(mv, &legal);
    if legal.contains(&mv) {
        Ok(mv)
    } else {
        Err(UciError::IllegalMove(text.trim().to_string()))
    }
}

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let target_square = match (mv.from.rank(), mv.to.file()) {
            (Rank::First, File::G) => Square::new(File::H, Rank::First),
            (Rank::First, File::C) => Square::new(File::A, Rank::First),
            (Rank::Eighth, File::G) => Square::new(File::H, Rank::Eighth),
            (Rank::Eighth, File::C) => Square::new(File::A, Rank::Eighth),
            _ => return mv,
        };

        let converted = Move {
            from: mv.from,
            to: target_square,
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Returns true if `mv` is a castling move in cozy-chess form on `board`.
pub fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(cozy_chess::Piece::King)
        && board.color_on(mv.to) == board.color_on(mv.from)
}

/// Format a move in raw UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

/// Format a move in standard UCI notation, writing castling as a two-square
/// king move (e1g1) rather than cozy-chess's king-captures-rook form.
pub fn format_standard_uci(board: &Board, mv: Move) -> String {
    if is_castling(board, mv) {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        let to = Square::new(file, mv.from.rank());
        return format!("{}{}", format_square(mv.from), format_square(to));
    }
    format_uci_move(mv)
}

pub(crate) fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UciError {
    #[error("Invalid UCI move: {0}")]
    InvalidFormat(String),
    #[error("Invalid square in move: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion piece: {0}")]
    InvalidPromotion(char),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
}
