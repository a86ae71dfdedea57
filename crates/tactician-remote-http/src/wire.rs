//! JSON shapes of the remote service
//!
//! Only the fields tactician reads are modelled; everything else is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tactician_api::{Membership, Profile, Puzzle, PuzzleMove, TacticsStats};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NextRatedResponse {
    pub user_puzzle: UserPuzzle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserPuzzle {
    pub puzzle: WirePuzzle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePuzzle {
    #[serde(default)]
    pub legacy_puzzle_id: String,
    #[serde(default)]
    pub moves: Vec<WireMoveEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMoveEntry {
    #[serde(rename = "move")]
    pub mv: WireMove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireMove {
    pub from: String,
    pub to: String,
}

impl From<NextRatedResponse> for Puzzle {
    fn from(resp: NextRatedResponse) -> Self {
        let puzzle = resp.user_puzzle.puzzle;
        Puzzle {
            id: puzzle.legacy_puzzle_id,
            moves: puzzle
                .moves
                .into_iter()
                .map(|entry| PuzzleMove {
                    from: entry.mv.from,
                    to: entry.mv.to,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SolutionPayload {
    pub legacy_puzzle_id: String,
    pub moves: Vec<WireMove>,
    pub attempt_duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitResponse {
    #[serde(default)]
    pub user_ratings: Vec<UserRating>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRating {
    pub rating: i32,
}

impl SubmitResponse {
    /// First reported user rating, 0 when none was reported
    pub fn rating(&self) -> i32 {
        self.user_ratings.first().map(|r| r.rating).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    pub user_profile_settings: ProfileSettings,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileSettings {
    pub username: String,
}

impl From<ProfileResponse> for Profile {
    fn from(resp: ProfileResponse) -> Self {
        Profile {
            username: resp.user_profile_settings.username,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MembershipResponse {
    #[serde(default)]
    pub membership_level: String,
    #[serde(default = "default_true")]
    pub is_free: bool,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl From<MembershipResponse> for Membership {
    fn from(resp: MembershipResponse) -> Self {
        Membership {
            level: resp.membership_level,
            is_premium: !resp.is_free,
            // The service encodes "no expiry" as the zero timestamp
            expires_at: resp.expiry_date.filter(|d| d.timestamp() > 0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsResponse {
    pub rating: i32,
    #[serde(default)]
    pub highest_rating: i32,
    #[serde(default)]
    pub today_attempted: u32,
}

impl From<StatsResponse> for TacticsStats {
    fn from(resp: StatsResponse) -> Self {
        TacticsStats {
            rating: resp.rating,
            highest_rating: resp.highest_rating,
            today_attempted: resp.today_attempted,
        }
    }
}

/// Chat-webhook body carrying one embed
#[derive(Debug, Serialize)]
pub(crate) struct WebhookPayload<'a> {
    pub embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Embed<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'a str,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField<'a>>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbedField<'a> {
    pub name: &'a str,
    pub value: &'a str,
    #[serde(skip_serializing_if = "is_false")]
    pub inline: bool,
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_expiry_is_no_expiry() {
        let json = r#"{ "membershipLevel": "basic", "isFree": true, "expiryDate": "0001-01-01T00:00:00Z" }"#;
        let membership: Membership = serde_json::from_str::<MembershipResponse>(json).unwrap().into();
        assert!(!membership.is_premium);
        assert_eq!(membership.expires_at, None);
    }

    #[test]
    fn test_submit_without_ratings_reports_zero() {
        let resp: SubmitResponse = serde_json::from_str(r#"{ "solutionResult": "ok" }"#).unwrap();
        assert_eq!(resp.rating(), 0);
    }
}
