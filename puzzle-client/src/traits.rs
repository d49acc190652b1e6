//! PuzzleService trait abstraction for backend implementations

use crate::error::ClientResult;
use crate::wire::CatalogStats;
use async_trait::async_trait;
use puzzle::{EngineAnalysisResult, PuzzleFilters, PuzzleRecord, StatsReport};

/// Backend operations the puzzle driver needs.
/// Implemented by both HttpPuzzleClient and MockPuzzleService
#[async_trait]
pub trait PuzzleService: Send + Sync {
    /// Fetch one random puzzle matching the filters
    async fn random_puzzle(&self, filters: &PuzzleFilters) -> ClientResult<PuzzleRecord>;

    /// Fetch a puzzle by id, including the source game link
    async fn game_context(&self, id: &str) -> ClientResult<PuzzleRecord>;

    /// List every theme the catalog knows about
    async fn themes(&self) -> ClientResult<Vec<String>>;

    /// Catalog-wide counts and rating bounds
    async fn catalog_stats(&self) -> ClientResult<CatalogStats>;

    /// Evaluate a position
    async fn analyze(
        &self,
        fen: &str,
        depth: u32,
        time_per_move_ms: u64,
    ) -> ClientResult<EngineAnalysisResult>;

    /// Record a finished attempt for a user
    async fn report_outcome(&self, user_id: &str, report: &StatsReport) -> ClientResult<()>;
}
