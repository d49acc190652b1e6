//! Immutable puzzle data and its resolved solution line.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chess::{Game, Move, PlayerSide};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PuzzleError;
use crate::notation::resolve_move;

/// Catalog difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    /// Rating band associated with the label, as `(min, max)`.
    pub fn rating_range(self) -> (u32, u32) {
        match self {
            Self::Beginner => (0, 1400),
            Self::Intermediate => (1400, 1800),
            Self::Advanced => (1800, 2200),
            Self::Expert => (2200, 3000),
        }
    }

    /// Label for a rating, using the same bands as [`Difficulty::rating_range`].
    pub fn for_rating(rating: u32) -> Self {
        match rating {
            0..=1399 => Self::Beginner,
            1400..=1799 => Self::Intermediate,
            1800..=2199 => Self::Advanced,
            _ => Self::Expert,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

// The catalog is not consistent about casing ("Beginner" vs "beginner")
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw puzzle fields as delivered by the catalog, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PuzzleRecord {
    pub id: String,
    pub fen: String,
    pub moves: Vec<String>,
    pub user_side: Option<PlayerSide>,
    pub rating: u32,
    pub difficulty: Option<Difficulty>,
    pub themes: Vec<String>,
    pub hint: String,
    pub game_url: Option<String>,
    pub popularity: Option<i32>,
    pub description: Option<String>,
}

/// One ply of the solution line, resolved against its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionPly {
    pub index: usize,
    pub mv: Move,
    pub uci: String,
    pub san: String,
    pub mover: PlayerSide,
}

/// A validated puzzle. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    id: String,
    fen: String,
    moves: Vec<String>,
    user_side: PlayerSide,
    rating: u32,
    difficulty: Difficulty,
    themes: BTreeSet<String>,
    hint: String,
    game_url: Option<String>,
    popularity: Option<i32>,
    description: Option<String>,
    solution: Vec<SolutionPly>,
}

impl Puzzle {
    /// Validate a record and resolve its solution line.
    ///
    /// Plies alternate starting with the FEN's side to move. When the record
    /// carries no user side, the user plays the side that does not move first.
    pub fn new(record: PuzzleRecord) -> Result<Self, PuzzleError> {
        let mut game = start_game(&record.fen)?;

        if record.moves.is_empty() {
            return Err(PuzzleError::EmptySolution);
        }

        let first_mover = PlayerSide::from(game.side_to_move());
        let user_side = record.user_side.unwrap_or(first_mover.opposite());

        let mut solution = Vec::with_capacity(record.moves.len());
        for (index, text) in record.moves.iter().enumerate() {
            let mover = PlayerSide::from(game.side_to_move());
            let mv = resolve_move(game.position(), text).map_err(|e| {
                PuzzleError::IllegalSolutionMove {
                    index,
                    text: text.clone(),
                    reason: e.to_string(),
                }
            })?;
            let entry = game
                .make_move(mv)
                .map_err(|e| PuzzleError::IllegalSolutionMove {
                    index,
                    text: text.clone(),
                    reason: e.to_string(),
                })?;
            solution.push(SolutionPly {
                index,
                mv,
                uci: entry.uci,
                san: entry.san,
                mover,
            });
        }

        if !solution.iter().any(|ply| ply.mover == user_side) {
            return Err(PuzzleError::NoUserMoves(user_side));
        }

        let difficulty = record
            .difficulty
            .unwrap_or_else(|| Difficulty::for_rating(record.rating));

        Ok(Self {
            id: record.id,
            fen: record.fen.trim().to_string(),
            moves: record.moves,
            user_side,
            rating: record.rating,
            difficulty,
            themes: record
                .themes
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            hint: record.hint,
            game_url: record.game_url.filter(|u| !u.is_empty()),
            popularity: record.popularity,
            description: record.description,
            solution,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Solution moves exactly as delivered.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn user_side(&self) -> PlayerSide {
        self.user_side
    }

    pub fn rating(&self) -> u32 {
        self.rating
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn themes(&self) -> &BTreeSet<String> {
        &self.themes
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn game_url(&self) -> Option<&str> {
        self.game_url.as_deref()
    }

    pub fn popularity(&self) -> Option<i32> {
        self.popularity
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn solution(&self) -> &[SolutionPly] {
        &self.solution
    }

    pub fn is_user_ply(&self, index: usize) -> bool {
        self.solution
            .get(index)
            .is_some_and(|ply| ply.mover == self.user_side)
    }

    /// Number of plies the user has to find.
    pub fn user_ply_count(&self) -> usize {
        self.solution
            .iter()
            .filter(|ply| ply.mover == self.user_side)
            .count()
    }
}

/// Game positioned at `fen`.
pub(crate) fn start_game(fen: &str) -> Result<Game, PuzzleError> {
    Ok(Game::from_board(chess::parse_fen(fen)?))
}
