use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

/// Catalog filters for the next puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleFilters {
    pub themes: Vec<String>,
    pub difficulty: Option<String>,
    pub min_rating: Option<u32>,
    pub max_rating: Option<u32>,
}

impl PuzzleFilters {
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.themes.push(theme.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty.as_str().to_string());
        self
    }

    pub fn with_rating_range(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_rating = min;
        self.max_rating = max;
        self
    }

    /// Query parameters for the random-puzzle endpoint. Empty and `"all"`
    /// values are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let themes: Vec<&str> = self
            .themes
            .iter()
            .map(|t| t.trim())
            .filter(|t| is_meaningful(t))
            .collect();
        if !themes.is_empty() {
            pairs.push(("themes", themes.join(",")));
        }

        if let Some(difficulty) = self
            .difficulty
            .as_deref()
            .map(str::trim)
            .filter(|d| is_meaningful(d))
        {
            pairs.push(("difficulty", difficulty.to_ascii_lowercase()));
        }

        if let Some(min) = self.min_rating {
            pairs.push(("minRating", min.to_string()));
        }
        if let Some(max) = self.max_rating {
            pairs.push(("maxRating", max.to_string()));
        }

        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

fn is_meaningful(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case("all")
}
