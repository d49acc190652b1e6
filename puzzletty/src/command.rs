//! Parsing of the trainer's line commands.

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a keyword is tried as a move (`e2e4`, `Nf3`, `O-O`).
    Move(String),
    Hint,
    Solution,
    Next,
    Prev,
    Exit,
    Reset,
    New,
    Analyze(Option<String>),
    Status,
    Themes,
    Stats,
    Help,
    Quit,
}

impl Command {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "hint" | "h" => Self::Hint,
            "solution" | "sol" => Self::Solution,
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "exit" => Self::Exit,
            "reset" => Self::Reset,
            "new" => Self::New,
            "analyze" | "analyse" => Self::Analyze(Some(rest.to_string()).filter(|f| !f.is_empty())),
            "status" => Self::Status,
            "themes" => Self::Themes,
            "stats" => Self::Stats,
            "help" | "?" => Self::Help,
            "quit" | "q" => Self::Quit,
            _ => Self::Move(line.to_string()),
        };
        Some(command)
    }
}

pub const HELP: &str = "\
Commands:
  <move>          play a move in UCI (e2e4) or SAN (Nf3, O-O)
  hint            show the puzzle hint
  solution        step through the solution (next / prev / exit)
  reset           restart this puzzle
  new             load another puzzle
  analyze [fen]   engine evaluation once solved
  status          progress and puzzle details
  themes, stats   catalog information
  quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(Command::parse("hint"), Some(Command::Hint));
        assert_eq!(Command::parse("  NEXT "), Some(Command::Next));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_moves_fall_through() {
        assert_eq!(Command::parse("e2e4"), Some(Command::Move("e2e4".into())));
        assert_eq!(Command::parse("Nxe7+"), Some(Command::Move("Nxe7+".into())));
        assert_eq!(Command::parse("O-O"), Some(Command::Move("O-O".into())));
    }

    #[test]
    fn test_analyze_with_fen() {
        assert_eq!(Command::parse("analyze"), Some(Command::Analyze(None)));
        assert_eq!(
            Command::parse("analyze 8/8/8/8/8/8/8/K6k w - - 0 1"),
            Some(Command::Analyze(Some("8/8/8/8/8/8/8/K6k w - - 0 1".into())))
        );
    }
}
