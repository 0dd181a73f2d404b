use crate::model::structures::week::Week;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Unknown tier for {} competitor(s) in season {season}: {}", competitors.len(), competitors.join(", "))]
    UnknownTier { season: i32, competitors: Vec<String> },

    #[error("Out-of-order input: season {season} week {week} arrived after season {last_season} week {last_week}")]
    OutOfOrder {
        season: i32,
        week: Week,
        last_season: i32,
        last_week: Week
    },

    #[error("Stale snapshot: taken at store version {snapshot_version}, store is at version {store_version}")]
    StaleSnapshot { snapshot_version: u64, store_version: u64 },

    #[error("Invalid game {game}: {source}")]
    InvalidGame {
        game: String,
        #[source]
        source: GameRecordError
    },

    #[error("Competitor {0} has no rating to settle against")]
    Untracked(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error)
}

/// Reasons a single game record is rejected. A rejected record never stops the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameRecordError {
    #[error("record is not a JSON object with the expected fields: {0}")]
    Undecodable(String),

    #[error("missing season")]
    MissingSeason,

    #[error("missing or unparseable week")]
    MissingWeek,

    #[error("missing home competitor")]
    MissingHome,

    #[error("missing away competitor")]
    MissingAway,

    #[error("competitor '{0}' is listed as both home and away")]
    SelfPlay(String),

    #[error("winner '{winner}' is neither '{home}' nor '{away}'")]
    UnknownWinner { winner: String, home: String, away: String }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
