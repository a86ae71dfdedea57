//! Remote puzzle service over HTTP

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tactician_api::{Membership, Profile, Puzzle, Submission, SubmitOutcome, TacticsStats};
use tactician_remote_api::{PuzzleRemote, RemoteError, RemoteResult};
use tracing::{debug, trace};

use crate::wire::{
    MembershipResponse, NextRatedResponse, ProfileResponse, SolutionPayload, StatsResponse,
    SubmitResponse, WireMove,
};

/// Endpoint paths, relative to the configured base URL
pub mod paths {
    pub const NEXT_RATED_PUZZLE: &str = "/rpc/puzzles.v1.PuzzleService/GetNextRated";
    pub const SUBMIT_RATED_SOLUTION: &str = "/rpc/puzzles.v1.PuzzleService/SubmitRatedSolution";
    pub const PROFILE_SETTINGS: &str = "/rpc/user_profile.v1.UserProfileService/GetProfileSettings";
    pub const ACTIVE_MEMBERSHIP: &str = "/rpc/payments.v1.ProductService/GetUserActiveMembership";
    pub const TACTICS_STATS: &str = "/callback/tactics/stats/user";
}

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 512;

/// `PuzzleRemote` backed by `reqwest`
///
/// The token is sent verbatim as the `Cookie` header.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header(ACCEPT, "application/json")
            .header(COOKIE, token)
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header(ACCEPT, "application/json")
            .header(COOKIE, token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &'static str) -> RemoteResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        trace!(what, status = %status, bytes = body.len(), "Remote response");

        if !status.is_success() {
            debug!(what, status = %status, "Remote call rejected");
            return Err(RemoteError::from_status(status.as_u16(), truncate(body)));
        }

        serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
            what,
            message: e.to_string(),
        })
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

#[async_trait]
impl PuzzleRemote for HttpRemote {
    async fn fetch_next_puzzle(&self, token: &str) -> RemoteResult<Puzzle> {
        let request = self
            .post(paths::NEXT_RATED_PUZZLE, token)
            .json(&serde_json::json!({}));
        let response: NextRatedResponse = self.send(request, "next puzzle").await?;

        let puzzle = Puzzle::from(response);
        if puzzle.id.is_empty() {
            return Err(RemoteError::EmptyPuzzle);
        }
        Ok(puzzle)
    }

    async fn submit_solution(&self, token: &str, submission: &Submission) -> RemoteResult<SubmitOutcome> {
        let payload = SolutionPayload {
            legacy_puzzle_id: submission.puzzle_id.clone(),
            moves: submission
                .moves
                .iter()
                .map(|m| WireMove {
                    from: m.from.clone(),
                    to: m.to.clone(),
                })
                .collect(),
            attempt_duration: submission.attempt_duration(),
        };

        let request = self.post(paths::SUBMIT_RATED_SOLUTION, token).json(&payload);
        let response: SubmitResponse = self.send(request, "solution result").await?;

        Ok(SubmitOutcome {
            rating: response.rating(),
        })
    }

    async fn profile(&self, token: &str) -> RemoteResult<Profile> {
        let request = self
            .post(paths::PROFILE_SETTINGS, token)
            .json(&serde_json::json!({ "fieldMask": "" }));
        let response: ProfileResponse = self.send(request, "profile").await?;
        Ok(response.into())
    }

    async fn membership(&self, token: &str) -> RemoteResult<Membership> {
        let request = self
            .post(paths::ACTIVE_MEMBERSHIP, token)
            .json(&serde_json::json!({}));
        let response: MembershipResponse = self.send(request, "membership").await?;
        Ok(response.into())
    }

    async fn stats(&self, token: &str) -> RemoteResult<TacticsStats> {
        let request = self.get(paths::TACTICS_STATS, token);
        let response: StatsResponse = self.send(request, "stats").await?;
        Ok(response.into())
    }
}
