#[path = "../common/mod.rs"]
mod common;

use cfb_processor::{
    error::ProcessorError,
    feed::feed_client::FeedClient,
    model::{
        config::RatingConfig,
        elo_model::{EloModel, ProcessingOptions},
        roster::TierLookup,
        structures::{tier::Tier, week::Week}
    }
};

#[test]
fn test_get_games_keeps_good_records() {
    common::init_test_env();
    let dir = common::scratch_dir("feed_games");
    let games = common::write_fixture(
        &dir,
        "games.json",
        r#"[
            {"Season": 1984, "Week": 1, "Home": "Brigham Young", "Away": "Pittsburgh", "Winner": "Brigham Young"},
            {"Season": 1984, "Week": "P", "Home": "Brigham Young", "Away": "Michigan", "Winner": "Brigham Young", "NeutralSite": true, "Date": "1984-12-21"},
            {"season": 1984, "home": "Army", "away": "Navy"},
            {"season": "1984", "week": 3, "home": "Army", "away": "Navy"}
        ]"#
    );
    let client = FeedClient::new(&games, dir.join("unused.json"));

    let feed = client.get_games().unwrap();

    assert_eq!(feed.games.len(), 2);
    assert_eq!(feed.games[1].week, Week::Postseason);
    assert!(feed.games[1].neutral_site);
    assert!(feed.games[1].date.is_some());

    let reasons = feed.rejected.iter().map(|r| r.index).collect::<Vec<_>>();
    assert_eq!(reasons, vec![2, 3]);
    assert!(feed.rejected[0].reason.contains("week"));
}

/// Numeric columns with gaps arrive as floats
#[test]
fn test_get_games_accepts_whole_float_columns() {
    let dir = common::scratch_dir("feed_float_columns");
    let games = common::write_fixture(
        &dir,
        "games.json",
        r#"[
            {"Season": 1984.0, "Week": 3.0, "Home": "Brigham Young", "Away": "Wyoming", "Winner": "Brigham Young"},
            {"Season": 1984.0, "Week": null, "Home": "Army", "Away": "Navy", "Winner": "Navy"},
            {"Season": 1984.0, "Week": 4.5, "Home": "Army", "Away": "Navy", "Winner": "Navy"}
        ]"#
    );
    let client = FeedClient::new(&games, dir.join("unused.json"));

    let feed = client.get_games().unwrap();

    assert_eq!(feed.games.len(), 1);
    assert_eq!(feed.games[0].season, 1984);
    assert_eq!(feed.games[0].week, Week::Regular(3));
    assert_eq!(feed.rejected.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = common::scratch_dir("feed_missing");
    let client = FeedClient::new(dir.join("nope.json"), dir.join("nope.json"));

    assert!(matches!(client.get_games(), Err(ProcessorError::Io { .. })));
    assert!(matches!(client.get_roster(), Err(ProcessorError::Io { .. })));
}

#[test]
fn test_roster_lookup() {
    let dir = common::scratch_dir("feed_roster");
    let roster = common::write_fixture(
        &dir,
        "roster.json",
        r#"[
            {"Season": 1984, "Team": "Brigham Young"},
            {"season": 1984, "team": "Montana State", "tier": "non-major"}
        ]"#
    );
    let client = FeedClient::new(dir.join("unused.json"), &roster);

    let strict = client.get_tier_lookup(false).unwrap();
    assert_eq!(strict.tier(1984, "Brigham Young"), Some(Tier::Major));
    assert_eq!(strict.tier(1984, "Montana State"), Some(Tier::NonMajor));
    assert_eq!(strict.tier(1985, "Brigham Young"), None);

    let implicit = client.get_tier_lookup(true).unwrap();
    assert_eq!(implicit.tier(1985, "Brigham Young"), Some(Tier::NonMajor));
}

#[test]
fn test_save_results() {
    let dir = common::scratch_dir("feed_save");
    let games = common::write_fixture(
        &dir,
        "games.json",
        r#"[{"season": 1990, "week": 1, "home": "Colorado", "away": "Missouri", "winner": "Colorado"}]"#
    );
    let roster = common::write_fixture(
        &dir,
        "roster.json",
        r#"[{"season": 1990, "team": "Colorado"}, {"season": 1990, "team": "Missouri"}]"#
    );
    let client = FeedClient::new(&games, &roster);

    let feed = client.get_games().unwrap();
    let mut model = EloModel::new(RatingConfig::default(), ProcessingOptions::default()).unwrap();
    model
        .process(&feed.games, &client.get_tier_lookup(false).unwrap())
        .unwrap();

    let output = dir.join("out.json");
    client
        .save_results(&output, &model.export(feed.rejected, true))
        .unwrap();

    let export: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(export["ratings"][0]["competitor"], "Colorado");
    assert_eq!(export["ratings"][0]["rating"], 1510.0);
    assert_eq!(export["ratings"][0]["tier"], "major");
    assert_eq!(export["ratings"][1]["percentile"], 0.0);

    let adjustments = export["ratings"][0]["adjustments"].as_array().unwrap();
    assert_eq!(adjustments.len(), 2);
    assert_eq!(adjustments[1]["week"], 1);

    let unwritable = dir.join("missing_dir").join("out.json");
    assert!(matches!(
        client.save_results(&unwritable, &model.export(Vec::new(), false)),
        Err(ProcessorError::Io { .. })
    ));
}
