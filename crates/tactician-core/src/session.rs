//! One fetch + submit exchange with the remote service

use rand::Rng;
use tactician_api::{ReportedTimeMode, SolvedPuzzle, Submission};
use tactician_remote_api::{PuzzleRemote, RemoteResult};
use tracing::debug;

/// Draw the attempt duration reported for one puzzle, in seconds
pub fn reported_duration(mode: ReportedTimeMode) -> f64 {
    match mode.range() {
        Some(range) => rand::thread_rng().gen_range(range),
        None => ReportedTimeMode::FIXED_SECS,
    }
}

/// Fetch the next puzzle and submit its solution.
///
/// The pre-puzzle rating is read first; a failed lookup leaves
/// `rating_before` unknown and does not fail the session.
pub async fn solve_one(
    remote: &dyn PuzzleRemote,
    token: &str,
    time_mode: ReportedTimeMode,
) -> RemoteResult<SolvedPuzzle> {
    let rating_before = match remote.stats(token).await {
        Ok(stats) => Some(stats.rating),
        Err(e) => {
            debug!(error = %e, "Could not read rating before puzzle");
            None
        }
    };

    let puzzle = remote.fetch_next_puzzle(token).await?;
    debug!(puzzle_id = %puzzle.id, moves = puzzle.moves.len(), "Fetched puzzle");

    let submission = Submission {
        puzzle_id: puzzle.id,
        moves: puzzle.moves,
        reported_duration_secs: reported_duration(time_mode),
    };
    let outcome = remote.submit_solution(token, &submission).await?;

    Ok(SolvedPuzzle {
        puzzle_id: submission.puzzle_id,
        solved_at: tactician_util::now(),
        rating_before,
        rating_after: outcome.rating,
        reported_duration_secs: submission.reported_duration_secs,
        success: true,
    })
}
