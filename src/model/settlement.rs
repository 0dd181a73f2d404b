use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::{ProcessorError, Result},
    feed::feed_structs::Game,
    model::{
        config::RatingConfig,
        outcome::{exchange, win_probability},
        rating_tracker::{RatingSnapshot, RatingTracker, WeekCommit},
        roster::SeasonTiers,
        structures::{strategy_kind::StrategyKind, week::Week}
    }
};

/// What one settled week did, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub season: i32,
    pub week: Week,
    pub games: usize,
    pub competitors: usize,
    pub largest_exchange: f64
}

/// Rating exchange for one game, from the home side's perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct GameExchange<'a> {
    pub home: &'a str,
    pub away: &'a str,
    pub home_probability: f64,
    /// Added to home, subtracted from away
    pub delta: f64
}

/// A policy for turning one week of games into rating changes on the store.
/// A run picks exactly one.
pub trait SettlementStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn settle(
        &self,
        tracker: &mut RatingTracker,
        season: i32,
        week: Week,
        games: &[Game],
        tiers: &SeasonTiers,
        config: &RatingConfig
    ) -> Result<WeekSummary>;
}

pub fn strategy_for(kind: StrategyKind) -> Box<dyn SettlementStrategy> {
    match kind {
        StrategyKind::Batched => Box::new(BatchedSettlement),
        StrategyKind::Sequential => Box::new(SequentialSettlement)
    }
}

fn invalid_game(game: &Game, source: crate::error::GameRecordError) -> ProcessorError {
    ProcessorError::InvalidGame {
        game: game.to_string(),
        source
    }
}

/// Computes a game's exchange purely from the snapshot. The home-field bonus
/// only shifts the probability and is never part of a stored rating.
pub fn game_exchange<'a>(game: &'a Game, snapshot: &RatingSnapshot, config: &RatingConfig) -> Result<GameExchange<'a>> {
    let outcome = game.outcome().map_err(|e| invalid_game(game, e))?;
    let home_rating = snapshot
        .rating(&game.home)
        .ok_or_else(|| ProcessorError::Untracked(game.home.clone()))?;
    let away_rating = snapshot
        .rating(&game.away)
        .ok_or_else(|| ProcessorError::Untracked(game.away.clone()))?;

    let effective_home = home_rating + config.home_field_bonus(game);

    Ok(GameExchange {
        home: &game.home,
        away: &game.away,
        home_probability: win_probability(effective_home, away_rating),
        delta: exchange(effective_home, away_rating, outcome.home_score(), config.k)
    })
}

/// Net exchange per competitor (+ as home, - as away) and the number of games
/// each played. Folded in input order, so the result is deterministic.
pub fn aggregate(exchanges: &[GameExchange]) -> (IndexMap<String, f64>, IndexMap<String, u32>) {
    let mut deltas: IndexMap<String, f64> = IndexMap::new();
    let mut appearances: IndexMap<String, u32> = IndexMap::new();

    for ex in exchanges {
        *deltas.entry(ex.home.to_string()).or_default() += ex.delta;
        *deltas.entry(ex.away.to_string()).or_default() -= ex.delta;
        *appearances.entry(ex.home.to_string()).or_default() += 1;
        *appearances.entry(ex.away.to_string()).or_default() += 1;
    }

    (deltas, appearances)
}

/// Snapshot the week, compute every game against that snapshot, commit once.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedSettlement;

impl SettlementStrategy for BatchedSettlement {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Batched
    }

    fn settle(
        &self,
        tracker: &mut RatingTracker,
        season: i32,
        week: Week,
        games: &[Game],
        tiers: &SeasonTiers,
        config: &RatingConfig
    ) -> Result<WeekSummary> {
        let competitors = games.iter().flat_map(|g| [g.home.as_str(), g.away.as_str()]);
        let snapshot = tracker.snapshot(competitors, tiers, config)?;

        // Games only read the snapshot, so they can be scored on any thread
        let exchanges = games
            .par_iter()
            .map(|game| game_exchange(game, &snapshot, config))
            .collect::<Result<Vec<_>>>()?;

        let largest_exchange = exchanges.iter().map(|ex| ex.delta.abs()).fold(0.0, f64::max);
        let (deltas, appearances) = aggregate(&exchanges);
        let competitors = deltas.len();

        tracker.commit(WeekCommit {
            season,
            week,
            snapshot,
            deltas,
            appearances
        })?;

        debug!(season, %week, games = games.len(), competitors, "Settled week");

        Ok(WeekSummary {
            season,
            week,
            games: games.len(),
            competitors,
            largest_exchange
        })
    }
}

/// Applies games one at a time in the order given, writing both ratings
/// before the next game is read. Winner/loser framing: the winner scores 1.
/// A draw scores 0.5 for the home side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSettlement;

impl SettlementStrategy for SequentialSettlement {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }

    fn settle(
        &self,
        tracker: &mut RatingTracker,
        season: i32,
        week: Week,
        games: &[Game],
        tiers: &SeasonTiers,
        config: &RatingConfig
    ) -> Result<WeekSummary> {
        let mut largest_exchange: f64 = 0.0;
        let mut competitors: IndexSet<&str> = IndexSet::new();

        for game in games {
            game.validate().map_err(|e| invalid_game(game, e))?;
            let (first, second, score) = match game.winner_loser() {
                Some((winner, loser)) => (winner, loser, 1.0),
                None => (game.home.as_str(), game.away.as_str(), 0.5)
            };

            let first_rating = tracker.rating_or_enter(first, tiers, config, season)?;
            let second_rating = tracker.rating_or_enter(second, tiers, config, season)?;

            let bonus = config.home_field_bonus(game);
            let (first_effective, second_effective) = if first == game.home {
                (first_rating + bonus, second_rating)
            } else {
                (first_rating, second_rating + bonus)
            };

            let delta = exchange(first_effective, second_effective, score, config.k);
            tracker.write_game(first, first_rating + delta, season, week)?;
            tracker.write_game(second, second_rating - delta, season, week)?;

            largest_exchange = largest_exchange.max(delta.abs());
            competitors.insert(first);
            competitors.insert(second);
        }

        debug!(season, %week, games = games.len(), competitors = competitors.len(), "Applied games");

        Ok(WeekSummary {
            season,
            week,
            games: games.len(),
            competitors: competitors.len(),
            largest_exchange
        })
    }
}
