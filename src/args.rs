use std::path::PathBuf;

use clap::Parser;

use crate::{
    error::Result,
    model::{
        config::RatingConfig,
        constants::{HOME_FIELD, K_FACTOR, MAJOR_BASELINE, NON_MAJOR_BASELINE, REGRESSION},
        elo_model::ProcessingOptions,
        structures::strategy_kind::StrategyKind
    }
};

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "CFB Processor",
    long_about = "Generates Elo ratings for college football programs from a normalized game feed"
)]
pub struct Args {
    /// JSON array of game records, one object per game
    #[arg(short, long, env = "GAMES_PATH", help = "Path to the game feed")]
    pub games: PathBuf,

    /// JSON array of {season, team, tier} rows
    #[arg(short, long, env = "ROSTER_PATH", help = "Path to the tier roster")]
    pub roster: PathBuf,

    #[arg(
        short,
        long,
        env = "OUTPUT_PATH",
        default_value = "ratings.json",
        help = "Where to write the rating export"
    )]
    pub output: PathBuf,

    #[arg(short, long, env = "K_FACTOR", default_value_t = K_FACTOR, help = "Exchange constant K")]
    pub k: f64,

    #[arg(long, env = "MAJOR_BASELINE", default_value_t = MAJOR_BASELINE)]
    pub major_baseline: f64,

    #[arg(long, env = "NON_MAJOR_BASELINE", default_value_t = NON_MAJOR_BASELINE)]
    pub non_major_baseline: f64,

    #[arg(
        long,
        env = "REGRESSION",
        default_value_t = REGRESSION,
        help = "Fraction of the gap to the tier baseline closed every season"
    )]
    pub regression: f64,

    #[arg(long, env = "HOME_FIELD", default_value_t = HOME_FIELD, help = "Home-field bonus in rating points")]
    pub home_field: f64,

    /// Without this flag the home-field bonus is never applied
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub apply_home_field: bool,

    #[arg(short, long, value_enum, default_value_t = StrategyKind::Batched)]
    pub strategy: StrategyKind,

    /// Competitors missing from a season's roster are treated as non-major
    /// instead of failing the run. Use with major-only rosters.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub implicit_non_major: bool,

    /// Enter every competitor in the feed at the non-major baseline before the
    /// first season
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub seed_universe: bool,

    #[arg(long, env = "FIRST_SEASON", help = "Ignore games before this season")]
    pub first_season: Option<i32>,

    /// Include a ranked leaderboard for every season in the export
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub checkpoints: bool,

    /// Include each competitor's full adjustment history in the export
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub include_adjustments: bool,

    /// Sort the feed by (season, week) before processing instead of failing on
    /// out-of-order input
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub sort_input: bool,

    /// A level (trace, debug, info, warn, error) or any filter directive,
    /// e.g. `cfb_processor=debug`
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}

impl Args {
    pub fn rating_config(&self) -> Result<RatingConfig> {
        let config = RatingConfig {
            k: self.k,
            major_baseline: self.major_baseline,
            non_major_baseline: self.non_major_baseline,
            regression: self.regression,
            home_field: self.home_field,
            apply_home_field: self.apply_home_field
        };

        config.validate()?;
        Ok(config)
    }

    pub fn processing_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            strategy: self.strategy,
            first_season: self.first_season,
            seed_universe: self.seed_universe,
            checkpoints: self.checkpoints
        }
    }
}
