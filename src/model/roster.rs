use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::{
    error::{ProcessorError, Result},
    feed::feed_structs::RosterEntry,
    model::{config::RatingConfig, structures::tier::Tier}
};

/// Source of tier classifications. The engine never decides on its own which
/// competitors are major.
pub trait TierLookup {
    fn tier(&self, season: i32, competitor: &str) -> Option<Tier>;
}

impl<F> TierLookup for F
where
    F: Fn(i32, &str) -> Option<Tier>
{
    fn tier(&self, season: i32, competitor: &str) -> Option<Tier> {
        self(season, competitor)
    }
}

/// Per-season roster loaded from the feed.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    tiers: HashMap<(i32, String), Tier>,
    implicit_non_major: bool
}

impl Roster {
    pub fn new(entries: &[RosterEntry]) -> Roster {
        let mut tiers = HashMap::new();
        for entry in entries {
            let previous = tiers.insert((entry.season, entry.team.clone()), entry.tier);
            if let Some(previous) = previous.filter(|p| *p != entry.tier) {
                warn!(
                    season = entry.season,
                    team = entry.team.as_str(),
                    "Roster lists {} as both {} and {}, keeping {}",
                    entry.team,
                    previous,
                    entry.tier,
                    entry.tier
                );
            }
        }

        Roster {
            tiers,
            implicit_non_major: false
        }
    }

    /// Treat competitors missing from a season's roster as non-major instead of
    /// failing. Suits rosters that only list major programs.
    pub fn with_implicit_non_major(mut self, implicit_non_major: bool) -> Roster {
        self.implicit_non_major = implicit_non_major;
        self
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl TierLookup for Roster {
    fn tier(&self, season: i32, competitor: &str) -> Option<Tier> {
        match self.tiers.get(&(season, competitor.to_string())) {
            Some(tier) => Some(*tier),
            None if self.implicit_non_major => Some(Tier::NonMajor),
            None => None
        }
    }
}

/// Tiers for one season, resolved once before the season's first week.
#[derive(Debug, Clone)]
pub struct SeasonTiers {
    season: i32,
    tiers: HashMap<String, Tier>
}

impl SeasonTiers {
    /// Resolves every competitor or fails listing all of the ones the lookup
    /// could not classify.
    pub fn resolve<'a, L, I>(lookup: &L, season: i32, competitors: I) -> Result<SeasonTiers>
    where
        L: TierLookup + ?Sized,
        I: IntoIterator<Item = &'a str>
    {
        let mut tiers = HashMap::new();
        let mut missing = BTreeSet::new();

        for competitor in competitors {
            if tiers.contains_key(competitor) {
                continue;
            }

            match lookup.tier(season, competitor) {
                Some(tier) => {
                    tiers.insert(competitor.to_string(), tier);
                }
                None => {
                    missing.insert(competitor.to_string());
                }
            }
        }

        if !missing.is_empty() {
            return Err(ProcessorError::UnknownTier {
                season,
                competitors: missing.into_iter().collect()
            });
        }

        Ok(SeasonTiers { season, tiers })
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    pub fn tier(&self, competitor: &str) -> Option<Tier> {
        self.tiers.get(competitor).copied()
    }

    /// Default rating for a competitor entering the store this season.
    pub fn baseline(&self, competitor: &str, config: &RatingConfig) -> Result<f64> {
        self.tier(competitor)
            .map(|tier| config.baseline(tier))
            .ok_or_else(|| ProcessorError::UnknownTier {
                season: self.season,
                competitors: vec![competitor.to_string()]
            })
    }
}
