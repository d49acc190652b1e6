use chess::AnalysisScore;
use serde::Serialize;

/// Engine evaluation of one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineAnalysisResult {
    pub evaluation: AnalysisScore,
    pub best_move: Option<String>,
    pub depth: u32,
    /// Principal variation, when the engine reports one.
    pub pv: Vec<String>,
}

impl EngineAnalysisResult {
    pub fn summary(&self) -> String {
        match &self.best_move {
            Some(best) => format!("{} (depth {}) best {}", self.evaluation, self.depth, best),
            None => format!("{} (depth {})", self.evaluation, self.depth),
        }
    }
}

/// Identifies an in-flight analysis request. Results are only accepted for
/// the session epoch they were requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub epoch: u64,
    pub fen: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Applied,
    /// The session changed since the request; result discarded.
    Stale,
    /// The request failed. The session is unaffected.
    Failed(String),
}

/// Outcome of a finished puzzle, queued once per session for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub puzzle_id: String,
    /// Clean solve: no wrong attempt and the solution was never shown.
    pub solved: bool,
    pub elapsed_seconds: u64,
    pub hints_used: u32,
    pub solution_shown: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut result = EngineAnalysisResult {
            evaluation: AnalysisScore::Mate(2),
            best_move: Some("d1d8".into()),
            depth: 15,
            pv: vec![],
        };
        assert_eq!(result.summary(), "+M2 (depth 15) best d1d8");
        result.best_move = None;
        result.evaluation = AnalysisScore::Centipawns(-35);
        assert_eq!(result.summary(), "-0.35 (depth 15)");
    }
}
