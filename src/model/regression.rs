use crate::{
    feed::feed_structs::{CompetitorRating, RatingAdjustment},
    model::structures::adjustment_kind::AdjustmentKind
};

/// # How this works
/// - Called once per competitor at the start of every season, before any of
///     that season's games are settled.
/// - The competitor's rating moves `fraction` of the way toward `baseline`,
///     the target for the tier it holds this season.
///
/// `rating <- rating + fraction * (baseline - rating)`
///
/// Returns None (and records nothing) when the rating does not move, which is
/// always the case at `fraction == 0`.
pub fn regress(rating: &mut CompetitorRating, baseline: f64, fraction: f64, season: i32) -> Option<&CompetitorRating> {
    let before = rating.rating;
    let after = regressed_rating(before, baseline, fraction);

    if after == before {
        return None;
    }

    rating.adjustments.push(RatingAdjustment {
        kind: AdjustmentKind::Regression,
        season,
        week: None,
        rating_before: before,
        rating_after: after
    });
    rating.rating = after;

    Some(rating)
}

/// Written as a weighted mean so the endpoints are exact: `fraction == 0`
/// returns `rating`, `fraction == 1` returns `baseline`.
pub fn regressed_rating(rating: f64, baseline: f64, fraction: f64) -> f64 {
    (1.0 - fraction) * rating + fraction * baseline
}
