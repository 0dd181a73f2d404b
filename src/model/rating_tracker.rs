use std::{cmp::Ordering, collections::HashMap};

use indexmap::IndexMap;
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::{
    error::{ProcessorError, Result},
    feed::feed_structs::{CompetitorRating, RatingAdjustment},
    model::{
        config::RatingConfig,
        regression::regress,
        roster::SeasonTiers,
        structures::{adjustment_kind::AdjustmentKind, tier::Tier, week::Week}
    }
};

/// Immutable start-of-week view of the store. Only the competitors playing that
/// week are captured; competitors new to the store carry their tier baseline.
#[derive(Debug, Clone)]
pub struct RatingSnapshot {
    version: u64,
    ratings: IndexMap<String, f64>,
    // Competitors not yet in the store, with the tier they enter under
    entrants: HashMap<String, Option<Tier>>
}

impl RatingSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn rating(&self, competitor: &str) -> Option<f64> {
        self.ratings.get(competitor).copied()
    }

    pub fn is_entrant(&self, competitor: &str) -> bool {
        self.entrants.contains_key(competitor)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Everything one batched week writes back, built against a single snapshot.
#[derive(Debug, Clone)]
pub struct WeekCommit {
    pub season: i32,
    pub week: Week,
    pub snapshot: RatingSnapshot,
    /// Net exchange per competitor, in order of first appearance
    pub deltas: IndexMap<String, f64>,
    pub appearances: IndexMap<String, u32>
}

pub struct RatingTracker {
    // Keyed by competitor. Ordering is only meaningful after `sort`, which also
    // fills in the rank and percentile fields.
    leaderboard: IndexMap<String, CompetitorRating>,
    // Bumped once per write operation; snapshots are only valid for the version they were taken at
    version: u64
}

impl Default for RatingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingTracker {
    pub fn new() -> RatingTracker {
        RatingTracker {
            leaderboard: IndexMap::new(),
            version: 0
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.leaderboard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaderboard.is_empty()
    }

    pub fn contains(&self, competitor: &str) -> bool {
        self.leaderboard.contains_key(competitor)
    }

    pub fn competitors(&self) -> impl Iterator<Item = &str> {
        self.leaderboard.keys().map(|k| k.as_str())
    }

    pub fn get_rating(&self, competitor: &str) -> Option<&CompetitorRating> {
        self.leaderboard.get(competitor)
    }

    pub fn rating(&self, competitor: &str) -> Option<f64> {
        self.leaderboard.get(competitor).map(|r| r.rating)
    }

    pub fn get_rating_adjustments(&self, competitor: &str) -> Option<&Vec<RatingAdjustment>> {
        self.leaderboard.get(competitor).map(|r| &r.adjustments)
    }

    /// Plain competitor -> rating view, in store order.
    pub fn ratings(&self) -> IndexMap<String, f64> {
        self.leaderboard
            .iter()
            .map(|(competitor, r)| (competitor.clone(), r.rating))
            .collect()
    }

    /// Adds a competitor at `rating` unless it is already tracked. Returns true if it was added.
    pub fn insert_if_absent(&mut self, competitor: &str, rating: f64, season: i32, tier: Option<Tier>) -> bool {
        if self.contains(competitor) {
            return false;
        }

        self.leaderboard
            .insert(competitor.to_string(), new_rating(competitor, rating, season, tier));
        self.version += 1;

        true
    }

    /// Records this season's tier on every tracked competitor the tiers cover.
    pub fn assign_tiers(&mut self, tiers: &SeasonTiers) {
        for (competitor, rating) in self.leaderboard.iter_mut() {
            if let Some(tier) = tiers.tier(competitor) {
                rating.tier = Some(tier);
            }
        }
    }

    /// Season-boundary regression of every tracked competitor, as one write.
    pub fn regress_all(&mut self, tiers: &SeasonTiers, config: &RatingConfig) -> Result<()> {
        // Resolve everything first so a missing tier leaves the store untouched
        let targets = self
            .leaderboard
            .keys()
            .map(|competitor| tiers.tier(competitor).ok_or_else(|| competitor.clone()))
            .collect::<Vec<_>>();

        let missing = targets.iter().filter_map(|t| t.as_ref().err().cloned()).collect_vec();
        if !missing.is_empty() {
            return Err(ProcessorError::UnknownTier {
                season: tiers.season(),
                competitors: missing
            });
        }

        for ((_, rating), tier) in self.leaderboard.iter_mut().zip(targets.into_iter().flatten()) {
            rating.tier = Some(tier);
            regress(rating, config.baseline(tier), config.regression, tiers.season());
        }

        self.version += 1;
        Ok(())
    }

    /// Captures the current rating of every listed competitor. Competitors not
    /// yet tracked are captured at their tier baseline for the season.
    pub fn snapshot<'a, I>(&self, competitors: I, tiers: &SeasonTiers, config: &RatingConfig) -> Result<RatingSnapshot>
    where
        I: IntoIterator<Item = &'a str>
    {
        let mut ratings = IndexMap::new();
        let mut entrants = HashMap::new();

        for competitor in competitors {
            if ratings.contains_key(competitor) {
                continue;
            }

            let rating = match self.rating(competitor) {
                Some(rating) => rating,
                None => {
                    entrants.insert(competitor.to_string(), tiers.tier(competitor));
                    tiers.baseline(competitor, config)?
                }
            };

            ratings.insert(competitor.to_string(), rating);
        }

        Ok(RatingSnapshot {
            version: self.version,
            ratings,
            entrants
        })
    }

    /// Applies a whole week at once: every rating becomes snapshot + net delta.
    pub fn commit(&mut self, commit: WeekCommit) -> Result<()> {
        let snapshot = &commit.snapshot;
        if snapshot.version != self.version {
            return Err(ProcessorError::StaleSnapshot {
                snapshot_version: snapshot.version,
                store_version: self.version
            });
        }

        // Every delta needs a snapshot rating; check before writing anything
        let befores = commit
            .deltas
            .keys()
            .map(|competitor| {
                snapshot
                    .rating(competitor)
                    .ok_or_else(|| ProcessorError::Untracked(competitor.clone()))
            })
            .collect::<Result<Vec<f64>>>()?;

        for ((competitor, delta), before) in commit.deltas.iter().zip(befores) {
            let entry = self.leaderboard.entry(competitor.clone()).or_insert_with(|| {
                let tier = snapshot.entrants.get(competitor).copied().flatten();
                new_rating(competitor, before, commit.season, tier)
            });

            let after = before + delta;
            entry.adjustments.push(RatingAdjustment {
                kind: AdjustmentKind::Week,
                season: commit.season,
                week: Some(commit.week),
                rating_before: before,
                rating_after: after
            });
            entry.rating = after;
            entry.games_played += commit.appearances.get(competitor).copied().unwrap_or(0);
        }

        self.version += 1;
        Ok(())
    }

    /// Current rating, entering the competitor at its tier baseline first if needed.
    pub fn rating_or_enter(
        &mut self,
        competitor: &str,
        tiers: &SeasonTiers,
        config: &RatingConfig,
        season: i32
    ) -> Result<f64> {
        if let Some(rating) = self.rating(competitor) {
            return Ok(rating);
        }

        let baseline = tiers.baseline(competitor, config)?;
        self.insert_if_absent(competitor, baseline, season, tiers.tier(competitor));

        Ok(baseline)
    }

    /// Immediate single-game write used by the sequential strategy.
    pub fn write_game(&mut self, competitor: &str, rating_after: f64, season: i32, week: Week) -> Result<()> {
        let entry = self
            .leaderboard
            .get_mut(competitor)
            .ok_or_else(|| ProcessorError::Untracked(competitor.to_string()))?;

        entry.adjustments.push(RatingAdjustment {
            kind: AdjustmentKind::Game,
            season,
            week: Some(week),
            rating_before: entry.rating,
            rating_after
        });
        entry.rating = rating_after;
        entry.games_played += 1;

        self.version += 1;
        Ok(())
    }

    /// Sorted copy of the store with ranks and percentiles filled in.
    pub fn leaderboard(&mut self) -> Vec<CompetitorRating> {
        self.sort();
        self.leaderboard.values().cloned().collect()
    }

    /// Sorts and updates the global_rank, tier_rank, and percentile values.
    pub fn sort(&mut self) {
        self.leaderboard
            .sort_by(|k1, v1, k2, v2| v2.rating.total_cmp(&v1.rating).then_with(|| k1.cmp(k2)));

        let count = self.leaderboard.len() as i32;
        for (i, rating) in self.leaderboard.values_mut().enumerate() {
            let global_rank = i as i32 + 1;
            rating.global_rank = global_rank;
            rating.percentile = RatingTracker::percentile(global_rank, count).unwrap_or(0.0);
            rating.tier_rank = 0;
        }

        // Leaderboard order is already by rating, so ranks within a tier follow it
        for tier in Tier::iter() {
            let tier_leaderboard = self
                .leaderboard
                .values_mut()
                .filter(|rating| rating.tier == Some(tier));

            for (i, rating) in tier_leaderboard.enumerate() {
                rating.tier_rank = i as i32 + 1;
            }
        }
    }

    /// `P = (n/N) * 100`
    fn percentile(rank: i32, total: i32) -> Option<f64> {
        match rank.cmp(&1) {
            Ordering::Less => None,
            _ => {
                let n = total - rank; // The number of competitors below this one
                Some(n as f64 / total as f64 * 100.0)
            }
        }
    }
}

fn new_rating(competitor: &str, rating: f64, season: i32, tier: Option<Tier>) -> CompetitorRating {
    CompetitorRating {
        competitor: competitor.to_string(),
        rating,
        tier,
        games_played: 0,
        global_rank: 0,
        tier_rank: 0,
        percentile: 0.0,
        adjustments: vec![RatingAdjustment {
            kind: AdjustmentKind::Initial,
            season,
            week: None,
            rating_before: rating,
            rating_after: rating
        }]
    }
}
