//! JSON shapes exchanged with the puzzle backend.

use std::collections::BTreeMap;

use chess::{AnalysisScore, PlayerSide};
use puzzle::{Difficulty, EngineAnalysisResult, PuzzleRecord, StatsReport};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClientError, ClientResult};

/// A response body, either wrapped in the backend envelope or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Envelope(Envelope<T>),
    Bare(T),
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Reason given by a `success: false` envelope.
    pub fn failure(self) -> Option<String> {
        if self.success {
            return None;
        }
        Some(
            self.error
                .or(self.message)
                .unwrap_or_else(|| "request failed".into()),
        )
    }
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> ClientResult<T> {
        match self {
            Self::Bare(value) => Ok(value),
            Self::Envelope(envelope) if envelope.success => envelope
                .data
                .ok_or_else(|| ClientError::InvalidResponse("envelope without data".into())),
            Self::Envelope(envelope) => Err(ClientError::Rejected(
                envelope.failure().unwrap_or_default(),
            )),
        }
    }
}

/// A list sent either as a JSON array or as one delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireList {
    List(Vec<String>),
    Text(String),
}

impl Default for WireList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl WireList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Self::Text(text) => text
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePuzzle {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub fen: String,
    #[serde(default)]
    pub moves: WireList,
    /// Older catalog rows carry the line here instead of `moves`.
    #[serde(default)]
    pub solution: Option<WireList>,
    #[serde(default)]
    pub user_side: Option<String>,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub themes: WireList,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub game_url: Option<String>,
    #[serde(default)]
    pub popularity: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl WirePuzzle {
    pub fn into_record(self) -> PuzzleRecord {
        let mut moves = self.moves.into_vec();
        if moves.is_empty() {
            moves = self.solution.unwrap_or_default().into_vec();
        }

        let user_side = self.user_side.as_deref().and_then(|s| {
            s.parse::<PlayerSide>()
                .map_err(|e| tracing::warn!(puzzle_id = %self.id, "Ignoring user side: {e}"))
                .ok()
        });
        let difficulty = self.difficulty.as_deref().and_then(|d| {
            d.parse::<Difficulty>()
                .map_err(|e| tracing::warn!(puzzle_id = %self.id, "Ignoring difficulty: {e}"))
                .ok()
        });

        PuzzleRecord {
            id: self.id,
            fen: self.fen,
            moves,
            user_side,
            rating: self.rating.unwrap_or_default(),
            difficulty,
            themes: self.themes.into_vec(),
            hint: self.hint.unwrap_or_default(),
            game_url: self.game_url,
            popularity: self.popularity,
            description: self.description,
        }
    }
}

/// Summary returned by `GET /puzzles/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogStats {
    pub total: u64,
    pub by_difficulty: BTreeMap<String, u64>,
    pub average_rating: u32,
    pub min_rating: u32,
    pub max_rating: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub fen: String,
    pub depth: u32,
    pub time_per_move: u64,
}

/// Engine evaluation in any of the forms the backend emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireEvaluation {
    /// Pawns from White's point of view.
    Pawns(f64),
    /// "+1.25", "#-3", "M2"
    Text(String),
    Tagged {
        #[serde(rename = "type")]
        kind: String,
        value: f64,
    },
}

impl WireEvaluation {
    pub fn to_score(&self) -> Option<AnalysisScore> {
        match self {
            Self::Pawns(pawns) if pawns.is_finite() => Some(AnalysisScore::from_pawns(*pawns)),
            Self::Pawns(_) => None,
            Self::Text(text) => AnalysisScore::parse(text),
            Self::Tagged { kind, value } => match kind.to_ascii_lowercase().as_str() {
                "mate" => Some(AnalysisScore::Mate(value.round() as i32)),
                "centipawn" | "cp" => Some(AnalysisScore::Centipawns(value.round() as i32)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAnalysis {
    pub evaluation: WireEvaluation,
    #[serde(default)]
    pub best_move: Option<String>,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub pv: Option<WireList>,
    #[serde(default)]
    pub principal_variation: Option<WireList>,
}

impl WireAnalysis {
    /// `requested_depth` fills in when the backend omits the depth reached.
    pub fn into_result(self, requested_depth: u32) -> ClientResult<EngineAnalysisResult> {
        let evaluation = self.evaluation.to_score().ok_or_else(|| {
            ClientError::InvalidResponse(format!("unreadable evaluation: {:?}", self.evaluation))
        })?;
        let pv = self
            .pv
            .or(self.principal_variation)
            .map(WireList::into_vec)
            .unwrap_or_default();

        Ok(EngineAnalysisResult {
            evaluation,
            best_move: self.best_move.filter(|m| !m.is_empty()),
            depth: self.depth.unwrap_or(requested_depth),
            pv,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdateRequest {
    pub user_id: String,
    pub puzzle_id: String,
    pub correct: bool,
    pub time_spent_seconds: u64,
    pub hints_used: u32,
    pub solution_shown: bool,
}

impl StatsUpdateRequest {
    pub fn new(user_id: &str, report: &StatsReport) -> Self {
        Self {
            user_id: user_id.to_string(),
            puzzle_id: report.puzzle_id.clone(),
            correct: report.solved,
            time_spent_seconds: report.elapsed_seconds,
            hints_used: report.hints_used,
            solution_shown: report.solution_shown,
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
