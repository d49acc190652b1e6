//! Standard Algebraic Notation (SAN) parsing and formatting.

use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::converters::{
    format_file, format_piece_upper, format_rank, format_square, parse_file, parse_piece,
    parse_rank, parse_square,
};
use crate::uci::{format_uci_move, is_castling, legal_moves};

/// Parse a SAN move ("Nxe5+", "exd6", "O-O", "e8=Q#") against `board`.
///
/// Check and annotation suffixes are ignored; over-specified disambiguation
/// ("Ng1f3") is accepted.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let text = strip_annotations(san);
    if text.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);

    if let Some(kingside) = castling_side(&text) {
        return legal
            .into_iter()
            .find(|&mv| is_castling(board, mv) && (mv.to.file() as u8 > mv.from.file() as u8) == kingside)
            .ok_or_else(|| SanError::NoLegalMove(san.to_string()));
    }

    let pattern = SanPattern::parse(&text).ok_or_else(|| SanError::InvalidFormat(san.to_string()))?;

    let mut candidates = legal.into_iter().filter(|&mv| {
        board.piece_on(mv.from) == Some(pattern.piece)
            && !is_castling(board, mv)
            && mv.to == pattern.to
            && mv.promotion == pattern.promotion
            && pattern.from_file.map_or(true, |f| mv.from.file() == f)
            && pattern.from_rank.map_or(true, |r| mv.from.rank() == r)
    });

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(SanError::AmbiguousMove(san.to_string())),
        (None, _) => Err(SanError::NoLegalMove(san.to_string())),
    }
}

/// Format a legal move as SAN, including the check or mate suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = san_body(board, mv);

    let mut after = board.clone();
    if after.try_play(mv).is_ok() {
        if after.status() == GameStatus::Won {
            san.push('#');
        } else if !after.checkers().is_empty() {
            san.push('+');
        }
    }

    san
}

/// Remove check/mate markers and annotation glyphs, and canonicalise the
/// spellings of castling and promotion ("0-0" → "O-O", "e8q" → "e8=Q").
pub fn strip_annotations(san: &str) -> String {
    let trimmed = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'))
        .trim_end_matches(" e.p.")
        .trim_end_matches("e.p.");

    if castling_side(&trimmed.replace('0', "O")).is_some() {
        return trimmed.replace('0', "O");
    }

    let mut out: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    // Trailing promotion piece without '=' (e8Q, e8q, exd1n)
    let chars: Vec<char> = out.chars().collect();
    if chars.len() >= 3 {
        let last = chars[chars.len() - 1];
        let before = chars[chars.len() - 2];
        if before.is_ascii_digit() && matches!(last.to_ascii_uppercase(), 'Q' | 'R' | 'B' | 'N') {
            out.pop();
            out.push('=');
            out.push(last.to_ascii_uppercase());
        } else if before == '=' {
            out.pop();
            out.push(last.to_ascii_uppercase());
        }
    }

    out
}

fn castling_side(text: &str) -> Option<bool> {
    match text {
        "O-O" => Some(true),
        "O-O-O" => Some(false),
        _ => None,
    }
}

fn san_body(board: &Board, mv: Move) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return format_uci_move(mv);
    };

    if is_castling(board, mv) {
        return if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let is_capture = board.color_on(mv.to) == Some(!board.side_to_move())
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    let mut san = String::new();
    if piece == Piece::Pawn {
        if is_capture {
            san.push(format_file(mv.from.file()));
        }
    } else {
        san.push(format_piece_upper(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(format_piece_upper(promo));
    }

    san
}

fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|m| {
            m.to == mv.to
                && m.from != mv.from
                && board.piece_on(m.from) == Some(piece)
                && !is_castling(board, *m)
        })
        .map(|m| m.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|s| s.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|s| s.rank() == mv.from.rank());

    if !shares_file {
        format_file(mv.from.file()).to_string()
    } else if !shares_rank {
        format_rank(mv.from.rank()).to_string()
    } else {
        format_square(mv.from)
    }
}

/// Structural pieces of a non-castling SAN move.
struct SanPattern {
    piece: Piece,
    from_file: Option<cozy_chess::File>,
    from_rank: Option<cozy_chess::Rank>,
    to: Square,
    promotion: Option<Piece>,
}

impl SanPattern {
    fn parse(text: &str) -> Option<Self> {
        let mut chars: Vec<char> = text.chars().filter(|&c| c != 'x' && c != '-').collect();

        let piece = match chars.first() {
            Some(&c) if matches!(c, 'K' | 'Q' | 'R' | 'B' | 'N') => {
                chars.remove(0);
                parse_piece(c)?
            }
            _ => Piece::Pawn,
        };

        let promotion = match chars.iter().position(|&c| c == '=') {
            Some(idx) => {
                let promo = chars.get(idx + 1).copied().and_then(parse_piece)?;
                chars.truncate(idx);
                Some(promo)
            }
            None => None,
        };

        if chars.len() < 2 || chars.len() > 4 {
            return None;
        }

        let dest: String = chars[chars.len() - 2..].iter().collect();
        let to = parse_square(&dest)?;

        let mut from_file = None;
        let mut from_rank = None;
        for &c in &chars[..chars.len() - 2] {
            if let Some(file) = parse_file(c).filter(|_| c.is_ascii_lowercase()) {
                from_file = Some(file);
            } else if let Some(rank) = parse_rank(c) {
                from_rank = Some(rank);
            } else {
                return None;
            }
        }

        Some(Self {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
