//! Step-through replay of a puzzle's solution on its own board.

use chess::{Game, HistoryEntry};
use serde::Serialize;

use crate::error::PuzzleError;
use crate::model::{start_game, Puzzle};

/// Replay board for solution stepping. Never shares state with the live
/// attempt.
#[derive(Debug, Clone)]
pub struct SolutionReplay {
    game: Game,
    solution: Vec<chess::Move>,
}

impl SolutionReplay {
    /// Start at the puzzle's initial position, index 0.
    pub fn new(puzzle: &Puzzle) -> Result<Self, PuzzleError> {
        Ok(Self {
            game: start_game(puzzle.fen())?,
            solution: puzzle.solution().iter().map(|ply| ply.mv).collect(),
        })
    }

    pub fn position(&self) -> String {
        self.game.to_fen()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Number of plies already applied.
    pub fn index(&self) -> usize {
        self.game.history().len()
    }

    pub fn len(&self) -> usize {
        self.solution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.index() == self.solution.len()
    }

    /// Apply the next ply. Returns `None` at the end of the line.
    pub fn step_forward(&mut self) -> Option<HistoryEntry> {
        let mv = *self.solution.get(self.index())?;
        self.game.make_move(mv).ok()
    }

    /// Take back the last applied ply. Returns `None` at the start.
    pub fn step_backward(&mut self) -> Option<HistoryEntry> {
        self.game.undo().ok()
    }

    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.game.last_move()
    }

    pub fn state(&self) -> SolutionReplayState {
        SolutionReplayState {
            replay_position: self.position(),
            solution_index: self.index(),
            active: true,
        }
    }
}

/// Rendering view of the replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionReplayState {
    pub replay_position: String,
    pub solution_index: usize,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PuzzleRecord;

    fn puzzle() -> Puzzle {
        Puzzle::new(PuzzleRecord {
            id: "r".into(),
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".into(),
            moves: vec!["e4".into(), "e5".into(), "Nf3".into()],
            rating: 1000,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_steps_are_clamped() {
        let puzzle = puzzle();
        let mut replay = SolutionReplay::new(&puzzle).unwrap();
        assert!(replay.step_backward().is_none());
        assert_eq!(replay.index(), 0);

        for expected in ["e4", "e5", "Nf3"] {
            assert_eq!(replay.step_forward().unwrap().san, expected);
        }
        assert!(replay.at_end());
        assert!(replay.step_forward().is_none());
        assert_eq!(replay.index(), 3);
    }

    #[test]
    fn test_full_walk_returns_to_start() {
        let puzzle = puzzle();
        let mut replay = SolutionReplay::new(&puzzle).unwrap();
        let start = replay.position();
        while replay.step_forward().is_some() {}
        while replay.step_backward().is_some() {}
        assert_eq!(replay.position(), start);
        assert_eq!(
            replay.state(),
            SolutionReplayState {
                replay_position: start,
                solution_index: 0,
                active: true,
            }
        );
    }
}
