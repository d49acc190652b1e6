//! Engine evaluation types.

use serde::{Deserialize, Serialize};

/// Engine evaluation score.
///
/// Centipawns: positive = White is better.
/// Mate: positive N = White mates in N moves,
/// negative N = Black mates in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisScore {
    Centipawns(i32),
    Mate(i32),
}

impl AnalysisScore {
    /// Build a score from an evaluation expressed in pawns (1.25 → 125cp).
    pub fn from_pawns(pawns: f64) -> Self {
        Self::Centipawns((pawns * 100.0).round() as i32)
    }

    /// Parse the textual forms engines and backends emit:
    /// `"+1.25"`, `"-0.40"`, `"#3"`, `"#-2"`, `"M2"`, `"-M4"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) if rest.starts_with(['#', 'M', 'm']) => (true, rest),
            _ => (false, text),
        };

        if let Some(mate) = body.strip_prefix(['#', 'M', 'm']) {
            let n: i32 = mate.trim_start_matches('+').parse().ok()?;
            return Some(Self::Mate(if negative { -n } else { n }));
        }

        let pawns: f64 = text.trim_start_matches('+').parse().ok()?;
        pawns.is_finite().then(|| Self::from_pawns(pawns))
    }

    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m > 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.abs())
                }
            }
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_centipawns() {
        assert_eq!(AnalysisScore::parse("+1.25"), Some(AnalysisScore::Centipawns(125)));
        assert_eq!(AnalysisScore::parse("-0.4"), Some(AnalysisScore::Centipawns(-40)));
        assert_eq!(AnalysisScore::parse("0"), Some(AnalysisScore::Centipawns(0)));
    }

    #[test]
    fn test_parse_mate() {
        assert_eq!(AnalysisScore::parse("#3"), Some(AnalysisScore::Mate(3)));
        assert_eq!(AnalysisScore::parse("#-2"), Some(AnalysisScore::Mate(-2)));
        assert_eq!(AnalysisScore::parse("M2"), Some(AnalysisScore::Mate(2)));
        assert_eq!(AnalysisScore::parse("-M4"), Some(AnalysisScore::Mate(-4)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(AnalysisScore::parse("winning"), None);
        assert_eq!(AnalysisScore::parse("#"), None);
        assert_eq!(AnalysisScore::parse("NaN"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AnalysisScore::Centipawns(125).display(), "+1.25");
        assert_eq!(AnalysisScore::Centipawns(-40).display(), "-0.40");
        assert_eq!(AnalysisScore::Mate(3).display(), "+M3");
        assert_eq!(AnalysisScore::Mate(-2).display(), "-M2");
    }
}
