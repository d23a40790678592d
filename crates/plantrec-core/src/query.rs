//! User query representations and free-text sanitization.

use serde::{Deserialize, Serialize};

use crate::mappings::Category;

/// Longest free text accepted; anything beyond is cut, not rejected.
pub const MAX_FREE_TEXT_LEN: usize = 300;

/// Sentinel answer meaning the user has no preference for a category.
pub const DONT_CARE: &str = "don't care";

/// One answered questionnaire category, already resolved to its bucket
/// value ("don't care" answers never make it this far).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerChoice {
    pub category: Category,
    pub value: String,
}

/// What the user submitted. Exactly one variant exists per submission;
/// structured answers and free text never feed the same scoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Structured(Vec<AnswerChoice>),
    FreeText(String),
}

impl Query {
    /// Build a free-text query, sanitizing on the way in so the scorers
    /// never see disallowed characters.
    pub fn free_text(raw: &str) -> Self {
        Query::FreeText(sanitize_free_text(raw))
    }

    /// True when there is nothing to match against: no answered
    /// categories, or free text that sanitized down to nothing. Scorers
    /// treat this as a degenerate but valid run.
    pub fn is_blank(&self) -> bool {
        match self {
            Query::Structured(answers) => answers.is_empty(),
            Query::FreeText(text) => text.is_empty(),
        }
    }
}

/// Rewrite free text into the allowed character class: alphanumerics,
/// spaces and basic punctuation. Runs of whitespace collapse to one
/// space, and the result is bounded to [`MAX_FREE_TEXT_LEN`] characters.
/// Sanitization never rejects input, it rewrites it.
pub fn sanitize_free_text(raw: &str) -> String {
    let filtered: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == ' ' || matches!(c, '.' | ',' | '\'' | '-'))
        .collect();

    let mut collapsed = String::with_capacity(filtered.len());
    let mut last_was_space = true;
    for c in filtered.chars() {
        if c == ' ' {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(c);
            last_was_space = false;
        }
    }
    while collapsed.ends_with(' ') {
        collapsed.pop();
    }

    collapsed.chars().take(MAX_FREE_TEXT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_disallowed_characters() {
        assert_eq!(
            sanitize_free_text("a plant <script>alert(1)</script> for my desk!"),
            "a plant scriptalert1script for my desk"
        );
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_free_text("  sunny \t\n windowsill  "), "sunny windowsill");
    }

    #[test]
    fn sanitize_bounds_length() {
        let long = "x".repeat(2 * MAX_FREE_TEXT_LEN);
        assert_eq!(sanitize_free_text(&long).len(), MAX_FREE_TEXT_LEN);
    }

    #[test]
    fn blank_queries() {
        assert!(Query::Structured(vec![]).is_blank());
        assert!(Query::free_text("???").is_blank());
        assert!(!Query::free_text("fern").is_blank());
    }
}
