//! Owner of the active puzzle, its session and the solution replay.
//!
//! The controller is synchronous. Network work happens elsewhere and comes
//! back through [`PuzzleController::finish_load`] and
//! [`PuzzleController::accept_analysis`], carrying the ticket issued when the
//! request was started so stale results can be discarded.

use chess::{parse_fen, HistoryEntry};
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisOutcome, AnalysisTicket, EngineAnalysisResult, StatsReport};
use crate::error::{ControllerError, LoadError, PuzzleError};
use crate::filters::PuzzleFilters;
use crate::model::{Puzzle, SolutionPly};
use crate::notation::{resolve_input, resolve_move, MoveInput};
use crate::replay::{SolutionReplay, SolutionReplayState};
use crate::session::{AttemptOutcome, BoardKey, PuzzleSession, SessionMode, SessionSnapshot};

/// Identifies a puzzle fetch. Only the newest ticket may install a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub filters: PuzzleFilters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Installed(BoardKey),
    /// A newer load was started after this one; result discarded.
    Stale,
}

#[derive(Debug, Default)]
pub struct PuzzleController {
    puzzle: Option<Puzzle>,
    session: Option<PuzzleSession>,
    replay: Option<SolutionReplay>,
    analysis: Option<EngineAnalysisResult>,
    pending_report: Option<StatsReport>,
    generation: u64,
    epoch: u64,
    load_seq: u64,
    pending_load: Option<u64>,
}

impl PuzzleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub fn session(&self) -> Option<&PuzzleSession> {
        self.session.as_ref()
    }

    pub fn replay(&self) -> Option<&SolutionReplay> {
        self.replay.as_ref()
    }

    pub fn replay_state(&self) -> Option<SolutionReplayState> {
        self.replay.as_ref().map(SolutionReplay::state)
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let (puzzle, session) = self.active().ok()?;
        Some(session.snapshot(puzzle))
    }

    // ---- Loading ----------------------------------------------------------

    /// Start a fetch. Any earlier outstanding load becomes stale.
    pub fn begin_load(&mut self, filters: PuzzleFilters) -> LoadTicket {
        self.load_seq += 1;
        if let Some(previous) = self.pending_load.replace(self.load_seq) {
            debug!(previous, seq = self.load_seq, "Superseding pending load");
        }
        LoadTicket {
            seq: self.load_seq,
            filters,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Apply the result of a fetch. On error the current session is kept.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Puzzle, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        if self.pending_load != Some(ticket.seq) {
            warn!(seq = ticket.seq, "Discarding stale puzzle load");
            return Ok(LoadOutcome::Stale);
        }
        self.pending_load = None;

        let puzzle = result?;
        let key = self.install_puzzle(puzzle)?;
        Ok(LoadOutcome::Installed(key))
    }

    /// Replace the current puzzle and start a fresh session for it.
    pub fn install_puzzle(&mut self, puzzle: Puzzle) -> Result<BoardKey, PuzzleError> {
        let key = self.next_board_key();
        self.epoch += 1;
        let session = PuzzleSession::new(&puzzle, key, self.epoch)?;

        info!(
            puzzle_id = puzzle.id(),
            rating = puzzle.rating(),
            difficulty = %puzzle.difficulty(),
            user_side = %puzzle.user_side(),
            "Puzzle installed"
        );
        self.puzzle = Some(puzzle);
        self.session = Some(session);
        self.replay = None;
        self.analysis = None;
        Ok(key)
    }

    /// Restart the current puzzle without fetching it again.
    pub fn reset_puzzle(&mut self) -> Result<BoardKey, ControllerError> {
        let puzzle = self.puzzle.as_ref().ok_or(ControllerError::NoPuzzle)?;
        let key = BoardKey(self.generation + 1);
        let session = PuzzleSession::new(puzzle, key, self.epoch + 1)?;

        self.generation += 1;
        self.epoch += 1;
        debug!(puzzle_id = puzzle.id(), %key, "Puzzle reset");
        self.session = Some(session);
        self.replay = None;
        self.analysis = None;
        Ok(key)
    }

    // ---- Attempts ---------------------------------------------------------

    /// Submit a board move. Returns true when it was the expected move.
    pub fn submit_move(&mut self, input: MoveInput) -> bool {
        self.try_move(input).is_correct()
    }

    pub fn try_move(&mut self, input: MoveInput) -> AttemptOutcome {
        let text = input.to_string();
        self.attempt(&text, |board| resolve_input(board, input))
    }

    /// Submit a move typed as UCI or SAN.
    pub fn submit_text(&mut self, text: &str) -> AttemptOutcome {
        self.attempt(text, |board| resolve_move(board, text))
    }

    fn attempt<F>(&mut self, text: &str, resolve: F) -> AttemptOutcome
    where
        F: FnOnce(&chess::Board) -> Result<chess::Move, crate::error::NotationError>,
    {
        let (Some(puzzle), Some(session)) = (self.puzzle.as_ref(), self.session.as_mut()) else {
            return AttemptOutcome::Rejected;
        };
        if !session.accepts_moves() {
            return AttemptOutcome::Rejected;
        }

        let outcome = match resolve(session.game().position()) {
            Ok(mv) => session.submit(puzzle, mv, text),
            Err(e) if e.is_illegal() => {
                session.record_unplayable(text);
                AttemptOutcome::Illegal
            }
            Err(e) => return AttemptOutcome::Unrecognized(e.to_string()),
        };

        if let AttemptOutcome::Correct {
            completed: true, ..
        } = outcome
        {
            self.queue_report();
        }
        outcome
    }

    fn queue_report(&mut self) {
        let (Some(puzzle), Some(session)) = (self.puzzle.as_ref(), self.session.as_mut()) else {
            return;
        };
        if !session.claim_report() {
            return;
        }

        let report = StatsReport {
            puzzle_id: puzzle.id().to_string(),
            solved: session.solved_cleanly(),
            elapsed_seconds: session.elapsed().as_secs(),
            hints_used: session.hints_used(),
            solution_shown: session.solution_shown(),
        };
        info!(
            puzzle_id = %report.puzzle_id,
            solved = report.solved,
            elapsed_seconds = report.elapsed_seconds,
            "Puzzle finished"
        );
        self.pending_report = Some(report);
    }

    /// The stats report for the last completion, if not yet taken.
    pub fn take_pending_report(&mut self) -> Option<StatsReport> {
        self.pending_report.take()
    }

    // ---- Hint and solution ------------------------------------------------

    /// Reveal the puzzle hint. Moves are still accepted afterwards.
    pub fn show_hint(&mut self) -> Result<String, ControllerError> {
        let (puzzle, session) = self.active_mut()?;
        if !matches!(
            session.mode(),
            SessionMode::Interactive | SessionMode::HintVisible
        ) {
            return Err(ControllerError::NotAllowed {
                operation: "hint",
                mode: session.mode(),
            });
        }
        session.note_hint();
        debug!(hints_used = session.hints_used(), "Hint shown");
        Ok(puzzle.hint().to_string())
    }

    pub fn enter_solution_mode(&mut self) -> Result<SolutionReplayState, ControllerError> {
        let key = BoardKey(self.generation + 1);
        let (puzzle, session) = self.active_mut()?;
        if session.mode() == SessionMode::SolutionStepping {
            return Err(ControllerError::NotAllowed {
                operation: "enter solution",
                mode: session.mode(),
            });
        }

        let replay = SolutionReplay::new(puzzle)?;
        session.enter_solution(key);
        let state = replay.state();

        self.generation += 1;
        self.replay = Some(replay);
        debug!(%key, "Entered solution mode");
        Ok(state)
    }

    pub fn step_solution_forward(&mut self) -> Result<SolutionReplayState, ControllerError> {
        let replay = self.replay_mut("step forward")?;
        if let Some(entry) = replay.step_forward() {
            debug!(san = %entry.san, index = replay.index(), "Replay forward");
        }
        Ok(replay.state())
    }

    pub fn step_solution_backward(&mut self) -> Result<SolutionReplayState, ControllerError> {
        let replay = self.replay_mut("step backward")?;
        if let Some(entry) = replay.step_backward() {
            debug!(san = %entry.san, index = replay.index(), "Replay backward");
        }
        Ok(replay.state())
    }

    /// Last ply applied on the replay board.
    pub fn replay_last_move(&self) -> Option<&HistoryEntry> {
        self.replay.as_ref().and_then(SolutionReplay::last_move)
    }

    /// Discard the replay and return to the mode active before entry.
    pub fn exit_solution_mode(&mut self) -> Result<BoardKey, ControllerError> {
        let key = BoardKey(self.generation + 1);
        let (_, session) = self.active_mut()?;
        if session.mode() != SessionMode::SolutionStepping {
            return Err(ControllerError::NotAllowed {
                operation: "exit solution",
                mode: session.mode(),
            });
        }
        session.exit_solution(key);
        let mode = session.mode();

        self.generation += 1;
        self.replay = None;
        debug!(%key, ?mode, "Left solution mode");
        Ok(key)
    }

    // ---- Analysis ---------------------------------------------------------

    pub fn enter_analysis_mode(&mut self) -> Result<(), ControllerError> {
        let (_, session) = self.active_mut()?;
        if !session.is_completed() {
            return Err(ControllerError::NotCompleted);
        }
        match session.mode() {
            SessionMode::AnalysisMode => Ok(()),
            SessionMode::SolutionStepping => Err(ControllerError::NotAllowed {
                operation: "analysis",
                mode: session.mode(),
            }),
            SessionMode::Interactive | SessionMode::HintVisible => {
                session.enter_analysis();
                debug!("Entered analysis mode");
                Ok(())
            }
        }
    }

    /// Start an analysis request for `fen`, or for the board on screen when
    /// no FEN is given. Only allowed once the puzzle is completed.
    pub fn begin_analysis(&mut self, fen: Option<&str>) -> Result<AnalysisTicket, ControllerError> {
        {
            let (_, session) = self.active()?;
            if !session.is_completed() {
                return Err(ControllerError::NotCompleted);
            }
        }
        if self.replay.is_none() {
            self.enter_analysis_mode()?;
        }

        let (_, session) = self.active()?;
        let fen = match fen {
            Some(fen) => chess::format_fen(&parse_fen(fen)?),
            None => match &self.replay {
                Some(replay) => replay.position(),
                None => session.position(),
            },
        };

        debug!(epoch = session.epoch(), %fen, "Analysis requested");
        Ok(AnalysisTicket {
            epoch: session.epoch(),
            fen,
        })
    }

    /// Apply an analysis result. Failures never touch the session.
    pub fn accept_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: Result<EngineAnalysisResult, String>,
    ) -> AnalysisOutcome {
        let current = self.session.as_ref().map(PuzzleSession::epoch);
        if current != Some(ticket.epoch) {
            warn!(
                ticket_epoch = ticket.epoch,
                current_epoch = ?current,
                "Discarding stale analysis"
            );
            return AnalysisOutcome::Stale;
        }

        match result {
            Ok(analysis) => {
                debug!(summary = %analysis.summary(), "Analysis applied");
                self.analysis = Some(analysis);
                AnalysisOutcome::Applied
            }
            Err(reason) => {
                warn!(%reason, "Analysis failed");
                AnalysisOutcome::Failed(reason)
            }
        }
    }

    pub fn last_analysis(&self) -> Option<&EngineAnalysisResult> {
        self.analysis.as_ref()
    }

    // ---- Queries ----------------------------------------------------------

    /// Share of the user's plies already found, 0 to 100.
    pub fn progress_percent(&self) -> u8 {
        match self.session.as_ref() {
            Some(s) if s.total_moves() > 0 => (s.solved_moves() * 100 / s.total_moves()) as u8,
            _ => 0,
        }
    }

    /// Solution plies not yet played on the live board.
    pub fn remaining_plies(&self) -> usize {
        match self.active() {
            Ok((puzzle, session)) => puzzle.solution().len().saturating_sub(session.cursor()),
            Err(_) => 0,
        }
    }

    /// The ply the user is expected to play next.
    pub fn next_expected_move(&self) -> Option<&SolutionPly> {
        let (puzzle, session) = self.active().ok()?;
        if session.is_completed() {
            return None;
        }
        puzzle.solution().get(session.cursor())
    }

    fn active(&self) -> Result<(&Puzzle, &PuzzleSession), ControllerError> {
        match (self.puzzle.as_ref(), self.session.as_ref()) {
            (Some(p), Some(s)) => Ok((p, s)),
            _ => Err(ControllerError::NoPuzzle),
        }
    }

    fn active_mut(&mut self) -> Result<(&Puzzle, &mut PuzzleSession), ControllerError> {
        match (self.puzzle.as_ref(), self.session.as_mut()) {
            (Some(p), Some(s)) => Ok((p, s)),
            _ => Err(ControllerError::NoPuzzle),
        }
    }

    fn replay_mut(&mut self, operation: &'static str) -> Result<&mut SolutionReplay, ControllerError> {
        let mode = self.active()?.1.mode();
        self.replay
            .as_mut()
            .ok_or(ControllerError::NotAllowed { operation, mode })
    }

    fn next_board_key(&mut self) -> BoardKey {
        self.generation += 1;
        BoardKey(self.generation)
    }
}
