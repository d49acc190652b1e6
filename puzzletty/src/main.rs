//! puzzletty - terminal chess puzzle trainer.
//!
//! Fetches puzzles from the puzzle backend, checks the moves typed at the
//! prompt against the solution line, and offers hints, solution stepping and
//! engine analysis once a puzzle is solved. Runtime tunables live in
//! [`config`]; logs go to a daily rolling file so they never interleave with
//! the prompt.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use puzzle::{Difficulty, PuzzleFilters};
use puzzle_client::{DriverSettings, HttpPuzzleClient, PuzzleDriver};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod command;
mod config;

/// Command-line arguments. Filters apply to every puzzle fetched this run.
#[derive(Parser, Debug)]
#[command(name = "puzzletty", about = "Chess puzzle trainer for the terminal")]
struct Cli {
    /// Only puzzles with this theme (repeatable)
    #[arg(short, long = "theme")]
    themes: Vec<String>,

    /// beginner, intermediate, advanced or expert
    #[arg(short, long)]
    difficulty: Option<String>,

    #[arg(long)]
    min_rating: Option<u32>,

    #[arg(long)]
    max_rating: Option<u32>,

    /// Backend base URL (overrides PUZZLETTY_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

impl Cli {
    fn filters(&self) -> Result<PuzzleFilters, CliError> {
        if let Some(difficulty) = &self.difficulty {
            if !difficulty.eq_ignore_ascii_case("all") {
                difficulty
                    .parse::<Difficulty>()
                    .map_err(|_| CliError::InvalidArgument(format!("unknown difficulty `{difficulty}`")))?;
            }
        }
        if let (Some(min), Some(max)) = (self.min_rating, self.max_rating) {
            if min > max {
                return Err(CliError::InvalidArgument(format!(
                    "--min-rating {min} is above --max-rating {max}"
                )));
            }
        }

        Ok(PuzzleFilters {
            themes: self.themes.clone(),
            difficulty: self.difficulty.clone(),
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        })
    }
}

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to set up the puzzle client: {0}")]
    Client(#[from] puzzle_client::ClientError),
}

fn prepare_log_dir(path: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(path).map_err(|source| CliError::LogDir {
        path: path.to_path_buf(),
        source,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filters = cli.filters()?;

    let log_dir = config::get_log_dir();
    prepare_log_dir(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "puzzletty");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let api_url = cli.api_url.clone().unwrap_or_else(config::get_api_url);
    tracing::info!(%api_url, ?filters, "Puzzletty starting up");

    let mut client = HttpPuzzleClient::new(&api_url, config::get_http_timeout())
        .map_err(CliError::from)?;
    if let Some(token) = config::get_auth_token() {
        client = client.with_auth_token(token);
    }

    let settings = DriverSettings {
        user_id: config::get_user_id(),
        analysis_depth: config::get_analysis_depth(),
        analysis_time_ms: config::get_analysis_time_ms(),
    };
    if settings.user_id.is_none() {
        tracing::info!("PUZZLETTY_USER_ID not set, stats will not be reported");
    }

    println!("puzzletty - chess puzzle trainer");
    println!("Backend: {api_url}");
    println!("Debug logs: {}/puzzletty.YYYY-MM-DD", log_dir.display());
    println!("Type `help` for commands.");
    println!();

    let driver = PuzzleDriver::new(Arc::new(client), settings);
    app::Trainer::new(driver, filters).run().await?;

    tracing::info!("Puzzletty shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("puzzletty").chain(args.iter().copied()))
    }

    #[test]
    fn test_filters_from_flags() {
        let filters = cli(&["--theme", "fork", "-t", "pin", "--difficulty", "Advanced", "--min-rating", "1800"])
            .filters()
            .unwrap();
        assert_eq!(filters.themes, vec!["fork", "pin"]);
        assert_eq!(filters.difficulty.as_deref(), Some("Advanced"));
        assert_eq!(filters.min_rating, Some(1800));
        assert_eq!(filters.max_rating, None);
    }

    #[test]
    fn test_invalid_filters_rejected() {
        assert!(matches!(
            cli(&["--difficulty", "grandmaster"]).filters(),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            cli(&["--min-rating", "2000", "--max-rating", "1500"]).filters(),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(cli(&["--difficulty", "all"]).filters().is_ok());
    }

    #[test]
    fn test_prepare_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("logs");
        prepare_log_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
