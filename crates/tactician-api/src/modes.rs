//! Strategy mode enums
//!
//! The string forms are the ones written to `strategies.json`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// When an account stops submitting puzzles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopMode {
    /// Stop once a number of puzzles has been completed
    #[serde(rename = "stop_at_puzzles_completed")]
    PuzzleCount,
    /// Stop once the puzzle rating reaches a target
    #[serde(rename = "stop_at_rating")]
    TargetRating,
}

impl StopMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "stop_at_puzzles_completed" | "puzzle_count" => Some(Self::PuzzleCount),
            "stop_at_rating" | "target_rating" => Some(Self::TargetRating),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PuzzleCount => "stop_at_puzzles_completed",
            Self::TargetRating => "stop_at_rating",
        }
    }
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Duration reported to the remote service for each attempt.
///
/// This only changes the submitted number; real pacing is [`SubmitMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportedTimeMode {
    /// Human-plausible 15-45 s
    #[serde(rename = "legit")]
    Legit,
    /// 3600-5400 s, inflates the "time spent" statistic
    #[serde(rename = "hour")]
    HourLong,
    /// 0.1-0.4 s
    #[serde(rename = "zero")]
    NearZero,
    /// Anything else in the catalog; reports a fixed duration
    #[serde(rename = "fixed")]
    Fixed,
}

impl ReportedTimeMode {
    /// Duration reported when the mode has no range
    pub const FIXED_SECS: f64 = 15.0;

    /// Unknown strings map to [`ReportedTimeMode::Fixed`]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "legit" => Self::Legit,
            "hour" | "hour_long" => Self::HourLong,
            "zero" | "near_zero" => Self::NearZero,
            _ => Self::Fixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legit => "legit",
            Self::HourLong => "hour",
            Self::NearZero => "zero",
            Self::Fixed => "fixed",
        }
    }

    /// Half-open range of reported seconds, or `None` for the fixed fallback
    pub fn range(&self) -> Option<Range<f64>> {
        match self {
            Self::Legit => Some(15.0..45.0),
            Self::HourLong => Some(3600.0..5400.0),
            Self::NearZero => Some(0.1..0.4),
            Self::Fixed => None,
        }
    }
}

impl fmt::Display for ReportedTimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the worker really waits between submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmitMode {
    /// Submit the next puzzle as soon as possible
    #[serde(rename = "asap")]
    Immediate,
    /// Sleep for the reported duration before the next puzzle
    #[serde(rename = "legit")]
    Paced,
}

impl SubmitMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asap" | "immediate" => Some(Self::Immediate),
            "legit" | "paced" => Some(Self::Paced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "asap",
            Self::Paced => "legit",
        }
    }
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_mode_accepts_catalog_and_short_names() {
        assert_eq!(StopMode::parse("stop_at_rating"), Some(StopMode::TargetRating));
        assert_eq!(StopMode::parse("puzzle_count"), Some(StopMode::PuzzleCount));
        assert_eq!(StopMode::parse("forever"), None);
    }

    #[test]
    fn test_unknown_time_mode_falls_back_to_fixed() {
        assert_eq!(ReportedTimeMode::parse("hour_long"), ReportedTimeMode::HourLong);
        assert_eq!(ReportedTimeMode::parse("glacial"), ReportedTimeMode::Fixed);
        assert!(ReportedTimeMode::Fixed.range().is_none());
    }

    #[test]
    fn test_submit_mode_round_trips_through_as_str() {
        for mode in [SubmitMode::Immediate, SubmitMode::Paced] {
            assert_eq!(SubmitMode::parse(mode.as_str()), Some(mode));
        }
    }
}
