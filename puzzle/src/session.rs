use std::time::{Duration, Instant};

use chess::{Game, HistoryEntry, Move, PlayerSide};
use serde::Serialize;
use tracing::debug;

use crate::error::PuzzleError;
use crate::model::{start_game, Puzzle, SolutionPly};

/// Interaction mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionMode {
    Interactive,
    HintVisible,
    SolutionStepping,
    AnalysisMode,
}

/// Attempt state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionPhase {
    AwaitingUser,
    AutoReplying,
    Completed,
}

/// Opaque generation token. Consumers drop cached board state whenever it
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BoardKey(pub u64);

impl std::fmt::Display for BoardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "board-{}", self.0)
    }
}

/// One recorded user attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub move_text: String,
    pub correct: bool,
}

/// Result of submitting a move to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Input not accepted in the current mode or phase; nothing recorded.
    Rejected,
    /// Text that is not a move at all; nothing recorded.
    Unrecognized(String),
    /// Not a legal move in the current position.
    Illegal,
    /// Legal, but not the expected solution move.
    Incorrect,
    Correct {
        /// Opponent replies played automatically, in SAN.
        auto_replies: Vec<String>,
        completed: bool,
    },
}

impl AttemptOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }

    pub fn is_recorded(&self) -> bool {
        !matches!(self, Self::Rejected | Self::Unrecognized(_))
    }
}

/// Mutable attempt state for one puzzle. A reset replaces the whole session.
#[derive(Debug, Clone)]
pub struct PuzzleSession {
    game: Game,
    solved_moves: usize,
    total_moves: usize,
    user_attempts: Vec<Attempt>,
    completed: bool,
    failed: bool,
    hints_used: u32,
    solution_shown: bool,
    mode: SessionMode,
    mode_before_solution: Option<SessionMode>,
    phase: SessionPhase,
    cursor: usize,
    board_key: BoardKey,
    epoch: u64,
    started_at: Instant,
    finished_after: Option<Duration>,
    report_emitted: bool,
}

impl PuzzleSession {
    /// Start a fresh attempt. Opponent plies preceding the user's first ply
    /// are played immediately.
    pub fn new(puzzle: &Puzzle, board_key: BoardKey, epoch: u64) -> Result<Self, PuzzleError> {
        let game = start_game(puzzle.fen())?;

        let mut session = Self {
            game,
            solved_moves: 0,
            total_moves: puzzle.user_ply_count(),
            user_attempts: Vec::new(),
            completed: false,
            failed: false,
            hints_used: 0,
            solution_shown: false,
            mode: SessionMode::Interactive,
            mode_before_solution: None,
            phase: SessionPhase::AwaitingUser,
            cursor: 0,
            board_key,
            epoch,
            started_at: Instant::now(),
            finished_after: None,
            report_emitted: false,
        };
        let replies = session.play_opponent_plies(puzzle);
        debug!(
            puzzle_id = puzzle.id(),
            %board_key,
            epoch,
            auto_played = replies.len(),
            total_moves = session.total_moves,
            "Session started"
        );
        Ok(session)
    }

    /// FEN of the live attempt.
    pub fn position(&self) -> String {
        self.game.to_fen()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn solved_moves(&self) -> usize {
        self.solved_moves
    }

    pub fn total_moves(&self) -> usize {
        self.total_moves
    }

    pub fn user_attempts(&self) -> &[Attempt] {
        &self.user_attempts
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// True once any incorrect or illegal attempt was recorded.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn solution_shown(&self) -> bool {
        self.solution_shown
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Index of the next solution ply.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn board_key(&self) -> BoardKey {
        self.board_key
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.game.last_move()
    }

    /// Time spent on the attempt, frozen at completion.
    pub fn elapsed(&self) -> Duration {
        self.finished_after
            .unwrap_or_else(|| self.started_at.elapsed())
    }

    /// A clean solve: no wrong attempt and the solution was never shown.
    pub fn solved_cleanly(&self) -> bool {
        self.completed && !self.failed && !self.solution_shown
    }

    pub fn accepts_moves(&self) -> bool {
        !self.completed
            && self.phase == SessionPhase::AwaitingUser
            && matches!(self.mode, SessionMode::Interactive | SessionMode::HintVisible)
    }

    /// Validate `mv` (already resolved against the live position) against
    /// the expected ply and advance on a match.
    pub fn submit(&mut self, puzzle: &Puzzle, mv: Move, move_text: &str) -> AttemptOutcome {
        if !self.accepts_moves() {
            debug!(mode = ?self.mode, phase = ?self.phase, "Move rejected");
            return AttemptOutcome::Rejected;
        }

        if !self.game.legal_moves().contains(&mv) {
            self.record(move_text, false);
            return AttemptOutcome::Illegal;
        }

        let Some(expected) = puzzle.solution().get(self.cursor) else {
            self.record(move_text, false);
            return AttemptOutcome::Incorrect;
        };

        if expected.mv != mv {
            debug!(
                attempted = move_text,
                expected = %expected.uci,
                "Incorrect attempt"
            );
            self.record(move_text, false);
            return AttemptOutcome::Incorrect;
        }

        if self.game.make_move(mv).is_err() {
            self.record(move_text, false);
            return AttemptOutcome::Illegal;
        }
        self.record(move_text, true);
        self.solved_moves += 1;
        self.cursor += 1;

        let auto_replies = self.play_opponent_plies(puzzle);

        if self.solved_moves == self.total_moves && self.total_moves > 0 {
            self.completed = true;
            self.phase = SessionPhase::Completed;
            self.finished_after = Some(self.started_at.elapsed());
            debug!(
                attempts = self.user_attempts.len(),
                failed = self.failed,
                "Puzzle completed"
            );
        }

        AttemptOutcome::Correct {
            auto_replies,
            completed: self.completed,
        }
    }

    pub(crate) fn record_unplayable(&mut self, move_text: &str) {
        if self.accepts_moves() {
            self.record(move_text, false);
        }
    }

    pub(crate) fn note_hint(&mut self) {
        self.hints_used += 1;
        if self.mode == SessionMode::Interactive {
            self.mode = SessionMode::HintVisible;
        }
    }

    pub(crate) fn enter_solution(&mut self, board_key: BoardKey) {
        self.mode_before_solution = Some(self.mode);
        self.mode = SessionMode::SolutionStepping;
        self.solution_shown = true;
        self.board_key = board_key;
    }

    pub(crate) fn exit_solution(&mut self, board_key: BoardKey) {
        self.mode = self
            .mode_before_solution
            .take()
            .unwrap_or(SessionMode::Interactive);
        self.board_key = board_key;
    }

    pub(crate) fn enter_analysis(&mut self) {
        self.mode = SessionMode::AnalysisMode;
    }

    /// Claim the single stats report allowed per session.
    pub(crate) fn claim_report(&mut self) -> bool {
        if self.completed && !self.report_emitted {
            self.report_emitted = true;
            true
        } else {
            false
        }
    }

    fn record(&mut self, move_text: &str, correct: bool) {
        if !correct {
            self.failed = true;
        }
        self.user_attempts.push(Attempt {
            move_text: move_text.trim().to_string(),
            correct,
        });
    }

    /// Play consecutive opponent plies starting at the cursor.
    fn play_opponent_plies(&mut self, puzzle: &Puzzle) -> Vec<String> {
        let mut played = Vec::new();
        while let Some(ply) = self.opponent_ply_at_cursor(puzzle) {
            self.phase = SessionPhase::AutoReplying;
            let mv = ply.mv;
            let san = ply.san.clone();
            // Solution plies were validated when the puzzle was built
            if self.game.make_move(mv).is_err() {
                break;
            }
            debug!(reply = %san, "Opponent reply");
            played.push(san);
            self.cursor += 1;
        }
        self.phase = SessionPhase::AwaitingUser;
        played
    }

    fn opponent_ply_at_cursor<'a>(&self, puzzle: &'a Puzzle) -> Option<&'a SolutionPly> {
        puzzle
            .solution()
            .get(self.cursor)
            .filter(|_| !puzzle.is_user_ply(self.cursor))
    }

    /// Build a snapshot of the current state.
    pub fn snapshot(&self, puzzle: &Puzzle) -> SessionSnapshot {
        SessionSnapshot {
            puzzle_id: puzzle.id().to_string(),
            fen: self.position(),
            side_to_move: PlayerSide::from(self.game.side_to_move()),
            user_side: puzzle.user_side(),
            solved_moves: self.solved_moves,
            total_moves: self.total_moves,
            attempts: self.user_attempts.len(),
            completed: self.completed,
            failed: self.failed,
            hints_used: self.hints_used,
            solution_shown: self.solution_shown,
            mode: self.mode,
            phase: self.phase,
            board_key: self.board_key,
            last_move: self.game.last_move().map(|e| e.san.clone()),
        }
    }
}

/// Immutable view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub puzzle_id: String,
    pub fen: String,
    pub side_to_move: PlayerSide,
    pub user_side: PlayerSide,
    pub solved_moves: usize,
    pub total_moves: usize,
    pub attempts: usize,
    pub completed: bool,
    pub failed: bool,
    pub hints_used: u32,
    pub solution_shown: bool,
    pub mode: SessionMode,
    pub phase: SessionPhase,
    pub board_key: BoardKey,
    pub last_move: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PuzzleRecord;

    fn lichess_style() -> Puzzle {
        // White moves first, so the user plays black
        Puzzle::new(PuzzleRecord {
            id: "ls".into(),
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".into(),
            moves: vec!["e2e4".into(), "e7e5".into(), "g1f3".into(), "b8c6".into()],
            rating: 1200,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_leading_opponent_ply_is_auto_played() {
        let puzzle = lichess_style();
        let session = PuzzleSession::new(&puzzle, BoardKey(1), 1).unwrap();
        assert_eq!(puzzle.user_side(), PlayerSide::Black);
        assert_eq!(session.total_moves(), 2);
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.last_move().unwrap().uci, "e2e4");
        assert_eq!(session.phase(), SessionPhase::AwaitingUser);
    }

    #[test]
    fn test_submit_outcomes() {
        let puzzle = lichess_style();
        let mut session = PuzzleSession::new(&puzzle, BoardKey(1), 1).unwrap();
        let before = session.position();

        let wrong = session.game().resolve_move("d7d5").unwrap();
        assert_eq!(session.submit(&puzzle, wrong, "d7d5"), AttemptOutcome::Incorrect);
        assert_eq!(session.position(), before);
        assert!(session.is_failed());

        let right = session.game().resolve_move("e5").unwrap();
        let outcome = session.submit(&puzzle, right, "e5");
        assert_eq!(
            outcome,
            AttemptOutcome::Correct {
                auto_replies: vec!["Nf3".to_string()],
                completed: false,
            }
        );
        assert_eq!(session.solved_moves(), 1);
    }

    #[test]
    fn test_completion_claims_one_report() {
        let puzzle = lichess_style();
        let mut session = PuzzleSession::new(&puzzle, BoardKey(1), 1).unwrap();
        for text in ["e7e5", "b8c6"] {
            let mv = session.game().resolve_move(text).unwrap();
            assert!(session.submit(&puzzle, mv, text).is_correct());
        }
        assert!(session.is_completed());
        assert!(session.solved_cleanly());
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert!(session.claim_report());
        assert!(!session.claim_report());

        let mv = session.game().resolve_move("d2d4").unwrap();
        assert_eq!(session.submit(&puzzle, mv, "d2d4"), AttemptOutcome::Rejected);
    }
}
