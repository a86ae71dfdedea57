//! Records exchanged with the remote puzzle service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single move of a puzzle solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleMove {
    pub from: String,
    pub to: String,
}

/// The next rated puzzle handed out to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    pub moves: Vec<PuzzleMove>,
}

/// A solution ready to be submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub puzzle_id: String,
    pub moves: Vec<PuzzleMove>,
    /// Reported attempt duration; unrelated to real elapsed time
    pub reported_duration_secs: f64,
}

impl Submission {
    /// Attempt duration as the remote expects it, e.g. `"23.517s"`
    pub fn attempt_duration(&self) -> String {
        format!("{:.3}s", self.reported_duration_secs)
    }
}

/// Remote answer to a submitted solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Puzzle rating after the submission; 0 when the remote did not report one
    pub rating: i32,
}

/// Outcome of one fetch + submit exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedPuzzle {
    pub puzzle_id: String,
    pub solved_at: DateTime<Utc>,
    /// Unknown when the pre-puzzle stats lookup failed
    pub rating_before: Option<i32>,
    pub rating_after: i32,
    pub reported_duration_secs: f64,
    pub success: bool,
}

/// Profile settings of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
}

/// Membership status of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub level: String,
    pub is_premium: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Puzzle statistics of the authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticsStats {
    pub rating: i32,
    #[serde(default)]
    pub highest_rating: i32,
    #[serde(default)]
    pub today_attempted: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_duration_has_millisecond_precision() {
        let submission = Submission {
            puzzle_id: "42".into(),
            moves: vec![],
            reported_duration_secs: 23.51749,
        };
        assert_eq!(submission.attempt_duration(), "23.517s");
    }
}
