//! The interactive trainer loop.

use chess::DisplayBoard;
use puzzle::{
    AttemptOutcome, ControllerError, PuzzleController, PuzzleFilters, SessionMode,
};
use puzzle_client::{DriverUpdate, PuzzleDriver};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{Command, HELP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Trainer {
    driver: PuzzleDriver,
    filters: PuzzleFilters,
}

impl Trainer {
    pub fn new(driver: PuzzleDriver, filters: PuzzleFilters) -> Self {
        Self { driver, filters }
    }

    /// Read commands from stdin until `quit` or end of input, applying
    /// backend responses as they arrive.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Loading puzzle...");
        self.driver.request_puzzle(self.filters.clone());

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };
                    if self.handle(command).await? == Flow::Quit {
                        break;
                    }
                }
                Some(update) = self.driver.next_update() => {
                    self.show_update(update);
                }
            }
        }

        tracing::info!("Trainer loop finished");
        Ok(())
    }

    pub async fn handle(&mut self, command: Command) -> anyhow::Result<Flow> {
        tracing::debug!(?command, "Handling command");
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => println!("{HELP}"),
            Command::Move(text) => {
                let outcome = self.driver.submit_text(&text);
                println!("{}", describe_outcome(&outcome));
                if outcome.is_correct() {
                    self.print_board();
                }
            }
            Command::Hint => match self.driver.show_hint() {
                Ok(hint) if hint.is_empty() => println!("No hint for this puzzle."),
                Ok(hint) => println!("Hint: {hint}"),
                Err(e) => println!("{e}"),
            },
            Command::Solution => {
                report(self.driver.controller_mut().enter_solution_mode().map(|_| ()));
                self.print_board();
            }
            Command::Next => {
                report(self.driver.controller_mut().step_solution_forward().map(|_| ()));
                self.print_board();
            }
            Command::Prev => {
                report(self.driver.controller_mut().step_solution_backward().map(|_| ()));
                self.print_board();
            }
            Command::Exit => {
                report(self.driver.controller_mut().exit_solution_mode().map(|_| ()));
                self.print_board();
            }
            Command::Reset => {
                report(self.driver.reset().map(|_| ()));
                self.print_board();
            }
            Command::New => {
                println!("Loading puzzle...");
                self.driver.request_puzzle(self.filters.clone());
            }
            Command::Analyze(fen) => match self.driver.request_analysis(fen.as_deref()) {
                Ok(ticket) => println!("Analyzing {}...", ticket.fen),
                Err(e) => println!("{e}"),
            },
            Command::Status => println!("{}", status_text(self.driver.controller())),
            Command::Themes => match self.driver.service().themes().await {
                Ok(themes) => println!("Themes: {}", themes.join(", ")),
                Err(e) => println!("Could not fetch themes: {e}"),
            },
            Command::Stats => match self.driver.service().catalog_stats().await {
                Ok(stats) => {
                    println!(
                        "{} puzzles, rating {}-{} (avg {})",
                        stats.total, stats.min_rating, stats.max_rating, stats.average_rating
                    );
                    for (difficulty, count) in &stats.by_difficulty {
                        println!("  {difficulty}: {count}");
                    }
                }
                Err(e) => println!("Could not fetch catalog stats: {e}"),
            },
        }
        Ok(Flow::Continue)
    }

    fn show_update(&mut self, update: DriverUpdate) {
        match update {
            DriverUpdate::PuzzleInstalled(_) => {
                println!("{}", status_text(self.driver.controller()));
                self.print_board();
            }
            DriverUpdate::LoadFailed(e) => println!("Could not load a puzzle: {e}. Type `new` to retry."),
            DriverUpdate::AnalysisReady(analysis) => {
                println!("Engine: {}", analysis.summary());
                if !analysis.pv.is_empty() {
                    println!("Line: {}", analysis.pv.join(" "));
                }
            }
            DriverUpdate::AnalysisFailed(reason) => println!("Analysis unavailable: {reason}"),
            DriverUpdate::GameLink(url) => println!("Game: {url}"),
            DriverUpdate::ReportDelivered { .. } | DriverUpdate::Discarded => {}
            DriverUpdate::ReportFailed { reason, .. } => {
                tracing::debug!(%reason, "Stats report failed");
            }
        }
    }

    fn print_board(&self) {
        if let Some(board) = board_text(self.driver.controller()) {
            println!("{board}");
        }
    }
}

fn report(result: Result<(), ControllerError>) {
    if let Err(e) = result {
        println!("{e}");
    }
}

pub fn describe_outcome(outcome: &AttemptOutcome) -> String {
    match outcome {
        AttemptOutcome::Rejected => "Moves are not accepted right now.".to_string(),
        AttemptOutcome::Unrecognized(text) => format!("`{text}` is not a move or command. Type `help`."),
        AttemptOutcome::Illegal => "Illegal move.".to_string(),
        AttemptOutcome::Incorrect => "Not the best move. Try again.".to_string(),
        AttemptOutcome::Correct {
            auto_replies,
            completed: true,
        } if auto_replies.is_empty() => "Correct! Puzzle solved.".to_string(),
        AttemptOutcome::Correct {
            auto_replies,
            completed,
        } => {
            let mut text = String::from("Correct!");
            if !auto_replies.is_empty() {
                text.push_str(&format!(" Opponent plays {}.", auto_replies.join(" ")));
            }
            if *completed {
                text.push_str(" Puzzle solved.");
            }
            text
        }
    }
}

/// The replay board while stepping through the solution, else the live board.
pub fn board_text(controller: &PuzzleController) -> Option<String> {
    let puzzle = controller.puzzle()?;
    let session = controller.session()?;
    let fen = match controller.replay() {
        Some(replay) => replay.position(),
        None => session.position(),
    };
    let board = DisplayBoard::from_fen(&fen).ok()?;

    let mut text = board.render(puzzle.user_side());
    if let Some(state) = controller.replay_state() {
        text.push_str(&format!(
            "\nSolution {}/{}",
            state.solution_index,
            puzzle.solution().len()
        ));
        if let Some(last) = controller.replay_last_move() {
            text.push_str(&format!(" ({})", last.san));
        }
    } else if let Some(last) = session.last_move() {
        text.push_str(&format!("\nLast move: {}", last.san));
    }
    Some(text)
}

pub fn status_text(controller: &PuzzleController) -> String {
    let (Some(puzzle), Some(snapshot)) = (controller.puzzle(), controller.snapshot()) else {
        return "No puzzle loaded.".to_string();
    };

    let mut lines = vec![
        format!(
            "Puzzle {} | rating {} ({}) | you play {}",
            puzzle.id(),
            puzzle.rating(),
            puzzle.difficulty(),
            puzzle.user_side()
        ),
        format!(
            "Progress {}/{} ({}%) | attempts {} | hints {}",
            snapshot.solved_moves,
            snapshot.total_moves,
            controller.progress_percent(),
            snapshot.attempts,
            snapshot.hints_used
        ),
    ];
    if !puzzle.themes().is_empty() {
        let themes: Vec<&str> = puzzle.themes().iter().map(String::as_str).collect();
        lines.push(format!("Themes: {}", themes.join(", ")));
    }
    if let Some(description) = puzzle.description() {
        lines.push(description.to_string());
    }

    let state = match (snapshot.completed, snapshot.mode) {
        (_, SessionMode::SolutionStepping) => "Stepping through the solution",
        (true, SessionMode::AnalysisMode) => "Solved, analysing",
        (true, _) if snapshot.failed || snapshot.solution_shown => "Completed with help",
        (true, _) => "Solved",
        (false, _) => "Your move",
    };
    lines.push(state.to_string());
    if let Some(analysis) = controller.last_analysis() {
        lines.push(format!("Engine: {}", analysis.summary()));
    }
    lines.join("\n")
}
