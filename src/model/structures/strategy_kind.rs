use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Which update-ordering policy a run uses. Chosen once per run.
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrategyKind {
    /// Snapshot the week, settle every game against it, commit once
    #[default]
    Batched,
    /// Apply games one at a time, winner/loser framing
    Sequential
}
