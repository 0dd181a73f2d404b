use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Coarse classification of a competitor for one season. Only used to pick a
/// default rating and the regression target.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Tier {
    Major,
    NonMajor
}
