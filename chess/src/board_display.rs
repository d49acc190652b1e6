//! Lightweight board representation for rendering from FEN.

use crate::types::{PieceColor, PieceKind, PlayerSide};

/// An 8x8 board for display purposes only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PieceColor)>; 8]; 8],
}

impl DisplayBoard {
    /// Parse the board placement from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, DisplayBoardError> {
        let placement = fen
            .split_whitespace()
            .next()
            .ok_or(DisplayBoardError::InvalidFen)?;

        let mut squares = [[None; 8]; 8];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(DisplayBoardError::InvalidFen);
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(DisplayBoardError::InvalidFen);
                    }
                } else {
                    if file > 7 {
                        return Err(DisplayBoardError::InvalidFen);
                    }
                    let color = if c.is_uppercase() {
                        PieceColor::White
                    } else {
                        PieceColor::Black
                    };
                    let kind = PieceKind::from_char(c).ok_or(DisplayBoardError::InvalidPiece(c))?;
                    squares[rank][file] = Some((kind, color));
                    file += 1;
                }
            }
        }

        Ok(DisplayBoard { squares })
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Render as text with rank and file labels, from `perspective`'s side
    /// of the board. White pieces are uppercase, empty squares are dots.
    pub fn render(&self, perspective: PlayerSide) -> String {
        let ranks: Vec<u8> = match perspective {
            PlayerSide::White => (0..8).rev().collect(),
            PlayerSide::Black => (0..8).collect(),
        };
        let files: Vec<u8> = match perspective {
            PlayerSide::White => (0..8).collect(),
            PlayerSide::Black => (0..8).rev().collect(),
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push(char::from(b'1' + rank));
            for &file in &files {
                out.push(' ');
                out.push(match self.piece_at(file, rank) {
                    Some((kind, PieceColor::White)) => kind.to_char_upper(),
                    Some((kind, PieceColor::Black)) => kind.to_char_lower(),
                    None => '.',
                });
            }
            out.push('\n');
        }
        out.push(' ');
        for &file in &files {
            out.push(' ');
            out.push(char::from(b'a' + file));
        }
        out.push('\n');
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayBoardError {
    #[error("Invalid FEN string")]
    InvalidFen,
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}
