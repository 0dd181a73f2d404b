use crate::{
    feed::feed_structs::{CompetitorRating, Game, RosterEntry},
    model::{
        rating_tracker::RatingTracker,
        roster::SeasonTiers,
        structures::{tier::Tier, week::Week}
    }
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

pub fn generate_game(season: i32, week: u32, home: &str, away: &str, winner: Option<&str>) -> Game {
    Game {
        id: None,
        season,
        week: Week::Regular(week),
        home: home.to_string(),
        away: away.to_string(),
        winner: winner.map(|w| w.to_string()),
        neutral_site: false,
        date: None
    }
}

pub fn generate_postseason_game(season: i32, home: &str, away: &str, winner: Option<&str>) -> Game {
    Game {
        week: Week::Postseason,
        neutral_site: true,
        ..generate_game(season, 0, home, away, winner)
    }
}

pub fn generate_roster_entry(season: i32, team: &str, tier: Tier) -> RosterEntry {
    RosterEntry {
        season,
        team: team.to_string(),
        tier
    }
}

pub fn generate_competitor_rating(competitor: &str, rating: f64, tier: Option<Tier>) -> CompetitorRating {
    let mut tracker = RatingTracker::new();
    tracker.insert_if_absent(competitor, rating, 1999, tier);

    match tracker.get_rating(competitor) {
        Some(rating) => rating.clone(),
        None => panic!("Rating for {} was not inserted", competitor)
    }
}

/// A store holding each competitor at the given rating, with no tier assigned.
pub fn generate_tracker(ratings: &[(&str, f64)]) -> RatingTracker {
    let mut tracker = RatingTracker::new();
    for (competitor, rating) in ratings {
        tracker.insert_if_absent(competitor, *rating, 1999, None);
    }

    tracker
}

pub fn generate_season_tiers(season: i32, tiers: &[(&str, Tier)]) -> SeasonTiers {
    let lookup = tiers
        .iter()
        .map(|(c, t)| (c.to_string(), *t))
        .collect::<HashMap<_, _>>();
    let by_name = |_: i32, competitor: &str| lookup.get(competitor).copied();

    match SeasonTiers::resolve(&by_name, season, tiers.iter().map(|(c, _)| *c)) {
        Ok(tiers) => tiers,
        Err(e) => panic!("Failed to resolve tiers: {}", e)
    }
}

/// Generates `n_seasons` of round-robin-ish schedules for `n_teams` teams,
/// the last quarter of which are non-major. Every team plays once per week.
///
/// Seeded, so the same arguments always produce the same league.
pub fn generate_league(
    first_season: i32,
    n_seasons: i32,
    n_teams: usize,
    n_weeks: u32,
    seed: u64
) -> (Vec<Game>, Vec<RosterEntry>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let teams = (0..n_teams).map(|i| format!("Team {}", i)).collect::<Vec<_>>();
    let n_majors = n_teams - n_teams / 4;

    let mut games = Vec::new();
    let mut roster = Vec::new();

    for season in first_season..first_season + n_seasons {
        for (i, team) in teams.iter().enumerate() {
            let tier = if i < n_majors { Tier::Major } else { Tier::NonMajor };
            roster.push(generate_roster_entry(season, team, tier));
        }

        for week in 1..=n_weeks {
            let mut order = teams.iter().collect::<Vec<_>>();
            order.shuffle(&mut rng);

            for pair in order.chunks_exact(2) {
                let (home, away) = (pair[0], pair[1]);
                let winner = match rng.random_range(0..100) {
                    0..=54 => Some(home.as_str()),
                    55..=96 => Some(away.as_str()),
                    _ => None
                };

                let id = format!("{}-{}-{}", season, week, games.len());
                games.push(Game {
                    id: Some(id),
                    ..generate_game(season, week, home, away, winner)
                });
            }
        }
    }

    (games, roster)
}
