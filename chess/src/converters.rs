// Square, file, rank and piece text forms shared by the UCI and SAN code

use cozy_chess::{File, Piece, Rank, Square};

use crate::types::PieceKind;

/// Parse a square string like "e2"
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = parse_file(chars.next()?)?;
    let rank = parse_rank(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }

    Some(Square::new(file, rank))
}

/// 'a'..='h', either case
pub fn parse_file(c: char) -> Option<File> {
    let index = (c.to_ascii_lowercase() as u32).checked_sub('a' as u32)?;
    File::ALL.get(index as usize).copied()
}

/// '1'..='8'
pub fn parse_rank(c: char) -> Option<Rank> {
    let index = c.to_digit(10)?.checked_sub(1)?;
    Rank::ALL.get(index as usize).copied()
}

pub fn format_square(sq: Square) -> String {
    format!("{}{}", format_file(sq.file()), format_rank(sq.rank()))
}

pub fn format_file(f: File) -> char {
    char::from(b'a' + f as u8)
}

pub fn format_rank(r: Rank) -> char {
    char::from(b'1' + r as u8)
}

/// Lowercase letter, as in a UCI promotion suffix
pub fn format_piece(piece: Piece) -> char {
    PieceKind::from(piece).to_char_lower()
}

/// Uppercase letter, as in SAN
pub fn format_piece_upper(piece: Piece) -> char {
    PieceKind::from(piece).to_char_upper()
}

pub fn parse_piece(c: char) -> Option<Piece> {
    PieceKind::from_char(c).map(Piece::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_text() {
        let sq = parse_square("e2").unwrap();
        assert_eq!(sq.file(), File::E);
        assert_eq!(sq.rank(), Rank::Second);
        assert_eq!(format_square(Square::new(File::H, Rank::Eighth)), "h8");
        assert_eq!(parse_square("A1"), Some(Square::A1));
    }

    #[test]
    fn test_parse_square_rejects_garbage() {
        for bad in ["", "e", "e22", "i1", "a9", "a0", "`1"] {
            assert_eq!(parse_square(bad), None, "{bad}");
        }
    }

    #[test]
    fn test_every_square_survives_formatting() {
        for sq in Square::ALL {
            assert_eq!(parse_square(&format_square(sq)), Some(sq));
        }
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(format_piece(Piece::Knight), 'n');
        assert_eq!(format_piece_upper(Piece::Queen), 'Q');
        assert_eq!(parse_piece('R'), Some(Piece::Rook));
        assert_eq!(parse_piece('x'), None);
    }
}
