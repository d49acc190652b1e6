//! Mock PuzzleService implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::traits::PuzzleService;
use crate::wire::CatalogStats;
use async_trait::async_trait;
use puzzle::{EngineAnalysisResult, PuzzleFilters, PuzzleRecord, StatsReport};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder<T> = Option<Box<dyn Fn() -> ClientResult<T> + Send>>;

/// Mock service for testing - only compiled in test mode or with mock feature
#[cfg(any(test, feature = "mock"))]
#[derive(Clone)]
pub struct MockPuzzleService {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
struct MockResponses {
    random_puzzle: Responder<PuzzleRecord>,
    game_context: Responder<PuzzleRecord>,
    themes: Responder<Vec<String>>,
    catalog_stats: Responder<CatalogStats>,
    analyze: Responder<EngineAnalysisResult>,
    report_outcome: Responder<()>,
}

#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    RandomPuzzle {
        filters: PuzzleFilters,
    },
    GameContext {
        id: String,
    },
    Themes,
    CatalogStats,
    Analyze {
        fen: String,
        depth: u32,
        time_per_move_ms: u64,
    },
    ReportOutcome {
        user_id: String,
        report: StatsReport,
    },
}

#[cfg(any(test, feature = "mock"))]
impl Default for MockPuzzleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockPuzzleService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Configure random_puzzle response
    pub fn with_random_puzzle_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<PuzzleRecord> + Send + 'static,
    {
        self.responses.lock().unwrap().random_puzzle = Some(Box::new(f));
        self
    }

    /// Configure game_context response
    pub fn with_game_context_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<PuzzleRecord> + Send + 'static,
    {
        self.responses.lock().unwrap().game_context = Some(Box::new(f));
        self
    }

    /// Configure themes response
    pub fn with_themes_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<Vec<String>> + Send + 'static,
    {
        self.responses.lock().unwrap().themes = Some(Box::new(f));
        self
    }

    /// Configure catalog_stats response
    pub fn with_catalog_stats_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<CatalogStats> + Send + 'static,
    {
        self.responses.lock().unwrap().catalog_stats = Some(Box::new(f));
        self
    }

    /// Configure analyze response
    pub fn with_analyze_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<EngineAnalysisResult> + Send + 'static,
    {
        self.responses.lock().unwrap().analyze = Some(Box::new(f));
        self
    }

    /// Configure report_outcome response
    pub fn with_report_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<()> + Send + 'static,
    {
        self.responses.lock().unwrap().report_outcome = Some(Box::new(f));
        self
    }

    /// Always serve the same puzzle
    pub fn with_puzzle(self, record: PuzzleRecord) -> Self {
        self.with_random_puzzle_response(move || Ok(record.clone()))
    }

    /// Delay every response, so tests can overlap requests
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    async fn respond<T>(
        &self,
        call: MockCall,
        name: &str,
        pick: impl Fn(&MockResponses) -> &Responder<T>,
    ) -> ClientResult<T> {
        self.call_log.lock().unwrap().push(call);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let responses = self.responses.lock().unwrap();
        match pick(&responses) {
            Some(f) => f(),
            None => Err(ClientError::NotConfigured(name.to_string())),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl PuzzleService for MockPuzzleService {
    async fn random_puzzle(&self, filters: &PuzzleFilters) -> ClientResult<PuzzleRecord> {
        let call = MockCall::RandomPuzzle {
            filters: filters.clone(),
        };
        self.respond(call, "random_puzzle", |r| &r.random_puzzle)
            .await
    }

    async fn game_context(&self, id: &str) -> ClientResult<PuzzleRecord> {
        let call = MockCall::GameContext { id: id.to_string() };
        self.respond(call, "game_context", |r| &r.game_context)
            .await
    }

    async fn themes(&self) -> ClientResult<Vec<String>> {
        self.respond(MockCall::Themes, "themes", |r| &r.themes)
            .await
    }

    async fn catalog_stats(&self) -> ClientResult<CatalogStats> {
        self.respond(MockCall::CatalogStats, "catalog_stats", |r| &r.catalog_stats)
            .await
    }

    async fn analyze(
        &self,
        fen: &str,
        depth: u32,
        time_per_move_ms: u64,
    ) -> ClientResult<EngineAnalysisResult> {
        let call = MockCall::Analyze {
            fen: fen.to_string(),
            depth,
            time_per_move_ms,
        };
        self.respond(call, "analyze", |r| &r.analyze).await
    }

    async fn report_outcome(&self, user_id: &str, report: &StatsReport) -> ClientResult<()> {
        let call = MockCall::ReportOutcome {
            user_id: user_id.to_string(),
            report: report.clone(),
        };
        self.respond(call, "report_outcome", |r| &r.report_outcome)
            .await
    }
}
