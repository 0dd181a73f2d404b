use std::{
    fs,
    path::{Path, PathBuf}
};

use itertools::Itertools;
use tracing::{debug, info, warn};

use super::feed_structs::{Game, RatingExport, RawGame, RejectedGame, RosterEntry};
use crate::{
    error::{GameRecordError, ProcessorError, Result},
    model::roster::Roster
};

/// Games accepted from the feed plus the records that were refused.
#[derive(Debug, Clone, Default)]
pub struct GameFeed {
    pub games: Vec<Game>,
    pub rejected: Vec<RejectedGame>
}

/// Reads normalized JSON produced by the upstream scraper and writes the
/// rating export.
#[derive(Debug, Clone)]
pub struct FeedClient {
    games_path: PathBuf,
    roster_path: PathBuf
}

impl FeedClient {
    pub fn new(games_path: impl Into<PathBuf>, roster_path: impl Into<PathBuf>) -> FeedClient {
        FeedClient {
            games_path: games_path.into(),
            roster_path: roster_path.into()
        }
    }

    /// Loads the game table. Records that cannot be turned into a valid
    /// [`Game`] are logged and returned in [`GameFeed::rejected`]; only a file
    /// that is unreadable or not a JSON array fails the call.
    pub fn get_games(&self) -> Result<GameFeed> {
        info!(path = %self.games_path.display(), "Fetching games...");
        let contents = read(&self.games_path)?;
        let feed = parse_games(&contents)?;

        info!(
            accepted = feed.games.len(),
            rejected = feed.rejected.len(),
            "Games fetched"
        );
        Ok(feed)
    }

    pub fn get_roster(&self) -> Result<Vec<RosterEntry>> {
        info!(path = %self.roster_path.display(), "Fetching roster...");
        let contents = read(&self.roster_path)?;
        let entries: Vec<RosterEntry> = serde_json::from_str(&contents)?;

        info!(entries = entries.len(), "Roster fetched");
        Ok(entries)
    }

    pub fn get_tier_lookup(&self, implicit_non_major: bool) -> Result<Roster> {
        let entries = self.get_roster()?;
        Ok(Roster::new(&entries).with_implicit_non_major(implicit_non_major))
    }

    pub fn save_results(&self, path: &Path, export: &RatingExport) -> Result<()> {
        let json = serde_json::to_string_pretty(export)?;
        fs::write(path, json).map_err(|source| ProcessorError::Io {
            path: path.display().to_string(),
            source
        })?;

        info!(
            path = %path.display(),
            ratings = export.ratings.len(),
            checkpoints = export.checkpoints.len(),
            "Ratings saved"
        );
        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ProcessorError::Io {
        path: path.display().to_string(),
        source
    })
}

/// Parses a JSON array of game records one element at a time so a single bad
/// record does not sink the rest.
pub fn parse_games(contents: &str) -> Result<GameFeed> {
    let records: Vec<serde_json::Value> = serde_json::from_str(contents)?;
    let mut feed = GameFeed::default();

    for (index, record) in records.into_iter().enumerate() {
        let id = record_id(&record);
        let game = serde_json::from_value::<RawGame>(record)
            .map_err(|e| GameRecordError::Undecodable(e.to_string()))
            .and_then(Game::try_from);

        match game {
            Ok(game) => feed.games.push(game),
            Err(reason) => {
                warn!(index, id = ?id, %reason, "Rejected game record");
                feed.rejected.push(RejectedGame {
                    index,
                    id,
                    reason: reason.to_string()
                });
            }
        }
    }

    Ok(feed)
}

fn record_id(record: &serde_json::Value) -> Option<String> {
    ["id", "Id", "ID"]
        .iter()
        .find_map(|key| record.get(*key))
        .and_then(|id| match id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None
        })
}

/// Stable sort into (season, week) order. Games within a week keep their
/// relative order.
pub fn canonical_order(games: &mut [Game]) {
    if games.iter().tuple_windows().all(|(a, b)| (a.season, a.week) <= (b.season, b.week)) {
        return;
    }

    debug!("Reordering games by season and week");
    games.sort_by_key(|g| (g.season, g.week));
}
