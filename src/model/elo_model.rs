use chrono::Utc;
use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{ProcessorError, Result},
    feed::feed_structs::{CompetitorRating, Game, RatingExport, RejectedGame, SeasonCheckpoint},
    model::{
        config::RatingConfig,
        rating_tracker::RatingTracker,
        roster::{SeasonTiers, TierLookup},
        settlement::{strategy_for, SettlementStrategy},
        structures::{strategy_kind::StrategyKind, week::Week}
    },
    utils::progress_utils::progress_bar
};

/// Run-level switches that sit outside the rating math.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub strategy: StrategyKind,
    /// Games from earlier seasons are ignored
    pub first_season: Option<i32>,
    /// Enter every competitor in the game table at the non-major baseline before the first season
    pub seed_universe: bool,
    /// Keep a ranked leaderboard at the end of every season
    pub checkpoints: bool
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingReport {
    pub seasons: usize,
    pub weeks: usize,
    pub games_settled: usize,
    pub skipped_before_first_season: usize,
    /// Largest single-game exchange settled in this call
    pub largest_exchange: f64,
    pub rejected: Vec<RejectedGame>
}

pub struct EloModel {
    pub config: RatingConfig,
    pub rating_tracker: RatingTracker,
    options: ProcessingOptions,
    strategy: Box<dyn SettlementStrategy>,
    checkpoints: Vec<SeasonCheckpoint>,
    // Most recently settled (season, week); later input must come strictly after it
    last_settled: Option<(i32, Week)>,
    // Latest season whose boundary regression has already run
    regressed_season: Option<i32>,
    universe_seeded: bool
}

impl EloModel {
    pub fn new(config: RatingConfig, options: ProcessingOptions) -> Result<EloModel> {
        config.validate()?;

        Ok(EloModel {
            config,
            rating_tracker: RatingTracker::new(),
            strategy: strategy_for(options.strategy),
            options,
            checkpoints: Vec::new(),
            last_settled: None,
            regressed_season: None,
            universe_seeded: false
        })
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn last_settled(&self) -> Option<(i32, Week)> {
        self.last_settled
    }

    pub fn checkpoints(&self) -> &[SeasonCheckpoint] {
        &self.checkpoints
    }

    /// # Season processing
    ///
    /// Steps:
    /// 1. Drop records that fail validation (each one is logged) and games
    ///     before the configured first season.
    /// 2. Verify the remaining games are in strictly increasing (season, week)
    ///     order, continuing after anything settled by an earlier call. Nothing
    ///     is written if they are not.
    /// 3. For every season: resolve tiers once, regress every tracked
    ///     competitor toward its tier baseline, then settle each week with the
    ///     configured strategy.
    pub fn process<L>(&mut self, games: &[Game], tiers: &L) -> Result<ProcessingReport>
    where
        L: TierLookup + ?Sized
    {
        let mut report = ProcessingReport::default();
        let accepted = self.accept(games, &mut report);

        let weeks = accepted
            .iter()
            .chunk_by(|g| (g.season, g.week))
            .into_iter()
            .map(|(key, group)| (key, group.copied().collect_vec()))
            .collect_vec();

        self.check_order(weeks.iter().map(|(key, _)| *key))?;

        if self.options.seed_universe && !self.universe_seeded {
            self.seed_universe(&accepted, tiers)?;
        }

        let seasons = weeks.into_iter().chunk_by(|((season, _), _)| *season);
        let n_seasons = accepted.iter().map(|g| g.season).dedup().count();
        let bar = progress_bar(n_seasons as u64, "Processing seasons".to_string());

        for (season, season_weeks) in &seasons {
            let season_weeks = season_weeks.collect_vec();
            let season_games = season_weeks.iter().flat_map(|(_, games)| games.iter().copied());
            let season_tiers = self.start_season(season, season_games, tiers)?;

            let mut games_settled = 0;
            let mut season_largest: f64 = 0.0;
            for ((_, week), week_games) in &season_weeks {
                let owned = week_games.iter().map(|g| (*g).clone()).collect_vec();
                let summary = self.strategy.settle(
                    &mut self.rating_tracker,
                    season,
                    *week,
                    &owned,
                    &season_tiers,
                    &self.config
                )?;

                self.last_settled = Some((summary.season, summary.week));
                games_settled += summary.games;
                season_largest = season_largest.max(summary.largest_exchange);
            }

            report.weeks += season_weeks.len();
            report.games_settled += games_settled;
            report.largest_exchange = report.largest_exchange.max(season_largest);

            if self.options.checkpoints {
                self.checkpoint(season);
            }

            info!(
                season,
                weeks = season_weeks.len(),
                games = games_settled,
                largest_exchange = season_largest,
                competitors = self.rating_tracker.len(),
                "Processed season"
            );

            report.seasons += 1;
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }

        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }

        Ok(report)
    }

    /// Sorted final ratings plus everything a caller needs to publish them.
    pub fn export(&mut self, rejected_games: Vec<RejectedGame>, include_adjustments: bool) -> RatingExport {
        let mut ratings = self.rating_tracker.leaderboard();
        if !include_adjustments {
            strip_adjustments(&mut ratings);
        }

        RatingExport {
            generated_at: Utc::now(),
            strategy: self.strategy(),
            config: self.config.clone(),
            ratings,
            checkpoints: self.checkpoints.clone(),
            rejected_games
        }
    }

    fn accept<'a>(&self, games: &'a [Game], report: &mut ProcessingReport) -> Vec<&'a Game> {
        let mut accepted = Vec::with_capacity(games.len());

        for (index, game) in games.iter().enumerate() {
            if let Err(reason) = game.validate() {
                warn!(index, game = %game, %reason, "Rejected game record");
                report.rejected.push(RejectedGame {
                    index,
                    id: game.id.clone(),
                    reason: reason.to_string()
                });
                continue;
            }

            if self.options.first_season.is_some_and(|first| game.season < first) {
                report.skipped_before_first_season += 1;
                continue;
            }

            accepted.push(game);
        }

        accepted
    }

    fn check_order<I>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = (i32, Week)>
    {
        let mut last = self.last_settled;

        for (season, week) in keys {
            if let Some((last_season, last_week)) = last {
                if (season, week) <= (last_season, last_week) {
                    return Err(ProcessorError::OutOfOrder {
                        season,
                        week,
                        last_season,
                        last_week
                    });
                }
            }

            last = Some((season, week));
        }

        Ok(())
    }

    fn seed_universe<L>(&mut self, games: &[&Game], tiers: &L) -> Result<()>
    where
        L: TierLookup + ?Sized
    {
        let Some(first_season) = games.first().map(|g| g.season) else {
            return Ok(());
        };

        let universe = games
            .iter()
            .flat_map(|g| [g.home.as_str(), g.away.as_str()])
            .collect::<IndexSet<_>>();

        // The whole universe is in the store for the first season, so it must classify first
        let competitors = self.rating_tracker.competitors().chain(universe.iter().copied());
        SeasonTiers::resolve(tiers, first_season, competitors)?;

        let baseline = self.config.non_major_baseline;
        for competitor in &universe {
            self.rating_tracker
                .insert_if_absent(competitor, baseline, first_season, None);
        }

        info!(competitors = universe.len(), baseline, "Seeded competitor universe");
        self.universe_seeded = true;
        Ok(())
    }

    /// Resolves this season's tiers and, the first time the season is seen,
    /// applies the season-boundary regression.
    fn start_season<'a, I, L>(&mut self, season: i32, games: I, tiers: &L) -> Result<SeasonTiers>
    where
        I: IntoIterator<Item = &'a Game>,
        L: TierLookup + ?Sized
    {
        let game_competitors = games
            .into_iter()
            .flat_map(|g| [g.home.as_str(), g.away.as_str()])
            .collect::<IndexSet<_>>();
        let competitors = self
            .rating_tracker
            .competitors()
            .chain(game_competitors.iter().copied())
            .collect::<IndexSet<_>>();

        let season_tiers = SeasonTiers::resolve(tiers, season, competitors)?;

        if !matches!(self.regressed_season, Some(regressed) if regressed >= season) {
            self.rating_tracker.regress_all(&season_tiers, &self.config)?;
            self.regressed_season = Some(season);
        } else {
            self.rating_tracker.assign_tiers(&season_tiers);
        }

        Ok(season_tiers)
    }

    fn checkpoint(&mut self, season: i32) {
        let mut ratings: Vec<CompetitorRating> = self.rating_tracker.leaderboard();
        strip_adjustments(&mut ratings);

        // A season continued by a later call replaces its earlier checkpoint
        self.checkpoints.retain(|c| c.season != season);
        self.checkpoints.push(SeasonCheckpoint { season, ratings });
    }
}

fn strip_adjustments(ratings: &mut [CompetitorRating]) {
    for rating in ratings.iter_mut() {
        rating.adjustments.clear();
    }
}
