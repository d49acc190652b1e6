//! Puzzle-solving state: validated puzzles, attempt sessions, solution
//! replay and the controller that ties them together.
//!
//! Everything here is synchronous and free of I/O; fetching puzzles,
//! engine analysis and stats reporting live in `puzzle-client`.

pub mod analysis;
pub mod controller;
pub mod error;
pub mod filters;
pub mod model;
pub mod notation;
pub mod replay;
pub mod session;

pub use analysis::{AnalysisOutcome, AnalysisTicket, EngineAnalysisResult, StatsReport};
pub use controller::{LoadOutcome, LoadTicket, PuzzleController};
pub use error::{ControllerError, LoadError, NotationError, PuzzleError};
pub use filters::PuzzleFilters;
pub use model::{Difficulty, Puzzle, PuzzleRecord, SolutionPly};
pub use notation::{resolve_input, resolve_move, MoveInput};
pub use replay::{SolutionReplay, SolutionReplayState};
pub use session::{
    Attempt, AttemptOutcome, BoardKey, PuzzleSession, SessionMode, SessionPhase, SessionSnapshot,
};
