//! Async driver: runs backend requests as tokio tasks and applies their
//! results to the [`PuzzleController`] on the task that owns it.

use std::sync::Arc;

use puzzle::{
    AnalysisOutcome, AnalysisTicket, AttemptOutcome, BoardKey, ControllerError,
    EngineAnalysisResult, LoadError, LoadOutcome, LoadTicket, MoveInput, Puzzle,
    PuzzleController, PuzzleFilters, StatsReport,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::traits::PuzzleService;

/// Settings that shape outbound requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    /// Stats are only reported when a user is known.
    pub user_id: Option<String>,
    pub analysis_depth: u32,
    pub analysis_time_ms: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            user_id: None,
            analysis_depth: 15,
            analysis_time_ms: 2000,
        }
    }
}

/// Results coming back from spawned requests.
#[derive(Debug)]
enum DriverEvent {
    PuzzleLoaded {
        ticket: LoadTicket,
        result: Result<Puzzle, LoadError>,
    },
    AnalysisFinished {
        ticket: AnalysisTicket,
        result: Result<EngineAnalysisResult, String>,
    },
    GameLinkFound {
        epoch: u64,
        url: String,
    },
    ReportFinished {
        puzzle_id: String,
        result: Result<(), String>,
    },
}

/// What changed after an event was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverUpdate {
    PuzzleInstalled(BoardKey),
    LoadFailed(LoadError),
    AnalysisReady(EngineAnalysisResult),
    AnalysisFailed(String),
    GameLink(String),
    ReportDelivered { puzzle_id: String },
    ReportFailed { puzzle_id: String, reason: String },
    /// A response arrived for a request that is no longer current.
    Discarded,
}

pub struct PuzzleDriver {
    service: Arc<dyn PuzzleService>,
    controller: PuzzleController,
    settings: DriverSettings,
    events_tx: mpsc::UnboundedSender<DriverEvent>,
    events_rx: mpsc::UnboundedReceiver<DriverEvent>,
    load_task: Option<JoinHandle<()>>,
    analysis_task: Option<JoinHandle<()>>,
    context_task: Option<JoinHandle<()>>,
}

impl PuzzleDriver {
    pub fn new(service: Arc<dyn PuzzleService>, settings: DriverSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            service,
            controller: PuzzleController::new(),
            settings,
            events_tx,
            events_rx,
            load_task: None,
            analysis_task: None,
            context_task: None,
        }
    }

    pub fn controller(&self) -> &PuzzleController {
        &self.controller
    }

    pub fn service(&self) -> Arc<dyn PuzzleService> {
        Arc::clone(&self.service)
    }

    /// Fetch a new puzzle. A load still in flight is aborted.
    pub fn request_puzzle(&mut self, filters: PuzzleFilters) -> LoadTicket {
        abort(&mut self.load_task);
        let ticket = self.controller.begin_load(filters);
        info!(seq = ticket.seq, filters = ?ticket.filters, "Loading puzzle");

        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        let sent = ticket.clone();
        self.load_task = Some(tokio::spawn(async move {
            let result = match service.random_puzzle(&sent.filters).await {
                Ok(record) => Puzzle::new(record).map_err(LoadError::from),
                Err(e) => Err(e.into_load_error()),
            };
            let _ = tx.send(DriverEvent::PuzzleLoaded {
                ticket: sent,
                result,
            });
        }));
        ticket
    }

    /// Restart the current puzzle. Analysis for the old session is aborted.
    pub fn reset(&mut self) -> Result<BoardKey, ControllerError> {
        abort(&mut self.analysis_task);
        abort(&mut self.context_task);
        self.controller.reset_puzzle()
    }

    pub fn submit_text(&mut self, text: &str) -> AttemptOutcome {
        let outcome = self.controller.submit_text(text);
        self.flush_report();
        outcome
    }

    pub fn submit_move(&mut self, input: MoveInput) -> bool {
        let accepted = self.controller.submit_move(input);
        self.flush_report();
        accepted
    }

    pub fn show_hint(&mut self) -> Result<String, ControllerError> {
        self.controller.show_hint()
    }

    pub fn controller_mut(&mut self) -> &mut PuzzleController {
        &mut self.controller
    }

    /// Ask the engine about `fen`, or the board on screen. The puzzle must be
    /// completed. When the puzzle has no game link one is looked up as well.
    pub fn request_analysis(&mut self, fen: Option<&str>) -> Result<AnalysisTicket, ControllerError> {
        let ticket = self.controller.begin_analysis(fen)?;
        abort(&mut self.analysis_task);

        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        let sent = ticket.clone();
        let (depth, time_ms) = (self.settings.analysis_depth, self.settings.analysis_time_ms);
        self.analysis_task = Some(tokio::spawn(async move {
            let result = service
                .analyze(&sent.fen, depth, time_ms)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(DriverEvent::AnalysisFinished {
                ticket: sent,
                result,
            });
        }));

        self.request_game_link(ticket.epoch);
        Ok(ticket)
    }

    fn request_game_link(&mut self, epoch: u64) {
        let Some(puzzle) = self.controller.puzzle() else {
            return;
        };
        if puzzle.game_url().is_some() || self.context_task.is_some() {
            return;
        }

        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        let id = puzzle.id().to_string();
        self.context_task = Some(tokio::spawn(async move {
            match service.game_context(&id).await {
                Ok(record) => {
                    if let Some(url) = record.game_url.filter(|u| !u.is_empty()) {
                        let _ = tx.send(DriverEvent::GameLinkFound { epoch, url });
                    }
                }
                Err(e) => debug!(puzzle_id = %id, "No game context: {e}"),
            }
        }));
    }

    /// Send the queued stats report, if any. Failures are logged only.
    fn flush_report(&mut self) {
        let Some(report) = self.controller.take_pending_report() else {
            return;
        };
        let Some(user_id) = self.settings.user_id.clone() else {
            debug!(puzzle_id = %report.puzzle_id, "No user configured, dropping stats report");
            return;
        };

        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = send_report(service.as_ref(), &user_id, &report).await;
            let _ = tx.send(DriverEvent::ReportFinished {
                puzzle_id: report.puzzle_id,
                result,
            });
        });
    }

    /// Wait for the next response and apply it.
    pub async fn next_update(&mut self) -> Option<DriverUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    fn apply(&mut self, event: DriverEvent) -> DriverUpdate {
        match event {
            DriverEvent::PuzzleLoaded { ticket, result } => {
                let outcome = self.controller.finish_load(&ticket, result);
                if !self.controller.is_loading() {
                    self.load_task = None;
                }
                match outcome {
                    Ok(LoadOutcome::Installed(key)) => {
                        abort(&mut self.analysis_task);
                        abort(&mut self.context_task);
                        DriverUpdate::PuzzleInstalled(key)
                    }
                    Ok(LoadOutcome::Stale) => DriverUpdate::Discarded,
                    Err(e) => {
                        warn!(seq = ticket.seq, "Puzzle load failed: {e}");
                        DriverUpdate::LoadFailed(e)
                    }
                }
            }
            DriverEvent::AnalysisFinished { ticket, result } => {
                match self.controller.accept_analysis(&ticket, result) {
                    AnalysisOutcome::Applied => {
                        self.analysis_task = None;
                        match self.controller.last_analysis() {
                            Some(analysis) => DriverUpdate::AnalysisReady(analysis.clone()),
                            None => DriverUpdate::Discarded,
                        }
                    }
                    AnalysisOutcome::Failed(reason) => {
                        self.analysis_task = None;
                        DriverUpdate::AnalysisFailed(reason)
                    }
                    AnalysisOutcome::Stale => DriverUpdate::Discarded,
                }
            }
            DriverEvent::GameLinkFound { epoch, url } => {
                self.context_task = None;
                if self.controller.session().map(|s| s.epoch()) == Some(epoch) {
                    DriverUpdate::GameLink(url)
                } else {
                    warn!(epoch, "Discarding stale game context");
                    DriverUpdate::Discarded
                }
            }
            DriverEvent::ReportFinished { puzzle_id, result } => match result {
                Ok(()) => {
                    info!(%puzzle_id, "Stats reported");
                    DriverUpdate::ReportDelivered { puzzle_id }
                }
                Err(reason) => {
                    warn!(%puzzle_id, "Failed to report stats: {reason}");
                    DriverUpdate::ReportFailed { puzzle_id, reason }
                }
            },
        }
    }
}

impl Drop for PuzzleDriver {
    fn drop(&mut self) {
        abort(&mut self.load_task);
        abort(&mut self.analysis_task);
        abort(&mut self.context_task);
    }
}

async fn send_report(
    service: &dyn PuzzleService,
    user_id: &str,
    report: &StatsReport,
) -> Result<(), String> {
    service
        .report_outcome(user_id, report)
        .await
        .map_err(|e| e.to_string())
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        if !handle.is_finished() {
            debug!("Aborting superseded request");
        }
        handle.abort();
    }
}
