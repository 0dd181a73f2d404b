use crate::{
    error::{ProcessorError, Result},
    feed::feed_structs::Game,
    model::{
        constants::{HOME_FIELD, K_FACTOR, MAJOR_BASELINE, NON_MAJOR_BASELINE, REGRESSION, REGRESSION_SOFT_MAX},
        structures::tier::Tier
    }
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Rating math parameters, fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Exchange constant K
    pub k: f64,
    pub major_baseline: f64,
    pub non_major_baseline: f64,
    /// Fraction of the gap to the tier baseline closed at each season boundary
    pub regression: f64,
    /// Rating points added to the home side's effective rating
    pub home_field: f64,
    /// Off unless explicitly enabled; `home_field` is otherwise carried but unused
    pub apply_home_field: bool
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            k: K_FACTOR,
            major_baseline: MAJOR_BASELINE,
            non_major_baseline: NON_MAJOR_BASELINE,
            regression: REGRESSION,
            home_field: HOME_FIELD,
            apply_home_field: false
        }
    }
}

impl RatingConfig {
    pub fn baseline(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Major => self.major_baseline,
            Tier::NonMajor => self.non_major_baseline
        }
    }

    /// Bonus added to the home side's rating when computing a win probability.
    /// Zero at neutral sites and whenever the toggle is off.
    pub fn home_field_bonus(&self, game: &Game) -> f64 {
        if self.apply_home_field && !game.neutral_site {
            self.home_field
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(ProcessorError::InvalidConfig(format!(
                "K must be a positive finite number, got {}",
                self.k
            )));
        }

        if !self.major_baseline.is_finite() || !self.non_major_baseline.is_finite() {
            return Err(ProcessorError::InvalidConfig(format!(
                "tier baselines must be finite, got {} / {}",
                self.major_baseline, self.non_major_baseline
            )));
        }

        if !(0.0..=1.0).contains(&self.regression) {
            return Err(ProcessorError::InvalidConfig(format!(
                "regression must be within 0.0..=1.0, got {}",
                self.regression
            )));
        }

        if !self.home_field.is_finite() || self.home_field < 0.0 {
            return Err(ProcessorError::InvalidConfig(format!(
                "home field must be a non-negative finite number, got {}",
                self.home_field
            )));
        }

        if self.regression > REGRESSION_SOFT_MAX {
            warn!(
                regression = self.regression,
                "Regression above {} erases most of a season's signal", REGRESSION_SOFT_MAX
            );
        }

        Ok(())
    }
}
