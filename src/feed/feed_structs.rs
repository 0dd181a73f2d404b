use crate::{
    error::GameRecordError,
    model::{
        config::RatingConfig,
        outcome::Outcome,
        structures::{adjustment_kind::AdjustmentKind, strategy_kind::StrategyKind, tier::Tier, week::Week}
    }
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// One normalized contest. Read-only once it leaves the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Option<String>,
    pub season: i32,
    pub week: Week,
    /// Home, or first-named competitor at a neutral site
    pub home: String,
    pub away: String,
    /// `None` is a draw
    pub winner: Option<String>,
    pub neutral_site: bool,
    pub date: Option<NaiveDate>
}

impl Game {
    pub fn outcome(&self) -> Result<Outcome, GameRecordError> {
        match self.winner.as_deref() {
            None => Ok(Outcome::Draw),
            Some(w) if w == self.home => Ok(Outcome::HomeWin),
            Some(w) if w == self.away => Ok(Outcome::AwayWin),
            Some(w) => Err(GameRecordError::UnknownWinner {
                winner: w.to_string(),
                home: self.home.clone(),
                away: self.away.clone()
            })
        }
    }

    /// Checks the invariants settlement relies on.
    pub fn validate(&self) -> Result<(), GameRecordError> {
        if self.home.trim().is_empty() {
            return Err(GameRecordError::MissingHome);
        }
        if self.away.trim().is_empty() {
            return Err(GameRecordError::MissingAway);
        }
        if self.home == self.away {
            return Err(GameRecordError::SelfPlay(self.home.clone()));
        }

        self.outcome().map(|_| ())
    }

    /// Winner first, loser second. `None` for a draw.
    pub fn winner_loser(&self) -> Option<(&str, &str)> {
        match self.outcome().ok()? {
            Outcome::HomeWin => Some((self.home.as_str(), self.away.as_str())),
            Outcome::AwayWin => Some((self.away.as_str(), self.home.as_str())),
            Outcome::Draw => None
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} week {}: {} vs {}", self.season, self.week, self.home, self.away)?;
        if let Some(id) = &self.id {
            write!(f, " (id {})", id)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String)
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => write!(f, "{}", s)
        }
    }
}

/// A game row as it arrives from the normalizer, before validation.
/// Column names of the original tabular export are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGame {
    #[serde(default, alias = "Id", alias = "ID")]
    pub id: Option<RawId>,
    #[serde(default, alias = "Season", deserialize_with = "deserialize_season")]
    pub season: Option<i32>,
    #[serde(default, alias = "Week")]
    pub week: Option<serde_json::Value>,
    #[serde(default, alias = "Home")]
    pub home: Option<String>,
    #[serde(default, alias = "Away")]
    pub away: Option<String>,
    #[serde(default, alias = "Winner")]
    pub winner: Option<String>,
    #[serde(default, alias = "NeutralSite")]
    pub neutral_site: Option<bool>,
    #[serde(default, alias = "Date")]
    pub date: Option<NaiveDate>
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Integer value of a JSON number, accepting whole floats such as `3.0`.
/// Tabular exports write integer columns with missing values as floats.
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn deserialize_season<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>
{
    let Some(n) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    whole_number(&n)
        .and_then(|season| i32::try_from(season).ok())
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("season {} is not a whole year", n)))
}

fn parse_week(value: &serde_json::Value) -> Option<Week> {
    match value {
        serde_json::Value::Number(n) => whole_number(n).and_then(|n| u32::try_from(n).ok()).map(Week::Regular),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None
    }
}

impl TryFrom<RawGame> for Game {
    type Error = GameRecordError;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        let season = raw.season.ok_or(GameRecordError::MissingSeason)?;
        let week = raw.week.as_ref().and_then(parse_week).ok_or(GameRecordError::MissingWeek)?;
        let home = non_empty(raw.home).ok_or(GameRecordError::MissingHome)?;
        let away = non_empty(raw.away).ok_or(GameRecordError::MissingAway)?;

        let game = Game {
            id: raw.id.map(|id| id.to_string()),
            season,
            week,
            home,
            away,
            // Blank winners come out of the normalizer for ties
            winner: non_empty(raw.winner),
            neutral_site: raw.neutral_site.unwrap_or(false),
            date: raw.date
        };

        game.validate()?;
        Ok(game)
    }
}

fn default_roster_tier() -> Tier {
    Tier::Major
}

/// One roster row. Rows without a tier are major programs, which is how
/// major-only team tables are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(alias = "Season")]
    pub season: i32,
    #[serde(alias = "Team")]
    pub team: String,
    #[serde(default = "default_roster_tier", alias = "Tier")]
    pub tier: Tier
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAdjustment {
    pub kind: AdjustmentKind,
    pub season: i32,
    pub week: Option<Week>,
    pub rating_before: f64,
    pub rating_after: f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRating {
    pub competitor: String,
    pub rating: f64,
    /// Tier from the most recently resolved season
    pub tier: Option<Tier>,
    pub games_played: u32,
    /// Updated by the leaderboard sort
    pub global_rank: i32,
    /// Updated by the leaderboard sort
    pub tier_rank: i32,
    /// Updated by the leaderboard sort
    pub percentile: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<RatingAdjustment>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonCheckpoint {
    pub season: i32,
    pub ratings: Vec<CompetitorRating>
}

/// A record the feed refused. `index` is the position in the source array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedGame {
    pub index: usize,
    pub id: Option<String>,
    pub reason: String
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingExport {
    pub generated_at: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub config: RatingConfig,
    pub ratings: Vec<CompetitorRating>,
    pub checkpoints: Vec<SeasonCheckpoint>,
    pub rejected_games: Vec<RejectedGame>
}
