#[path = "../common/mod.rs"]
mod common;

use approx::assert_abs_diff_eq;
use cfb_processor::{
    error::ProcessorError,
    feed::feed_client::FeedClient,
    model::{
        config::RatingConfig,
        elo_model::{EloModel, ProcessingOptions},
        outcome::win_probability,
        regression::regressed_rating,
        structures::{adjustment_kind::AdjustmentKind, tier::Tier}
    }
};
use serial_test::serial;
use std::{path::Path, process::Command};

const GAMES: &str = r#"[
    {"id": 1, "season": 2000, "week": 1, "home": "Alabama", "away": "Auburn", "winner": "Alabama"},
    {"id": 2, "season": 2000, "week": 2, "home": "Alabama", "away": "Montana", "winner": "Montana", "neutral_site": true},
    {"id": 3, "season": 2000, "week": 2, "home": "Auburn", "away": "Auburn", "winner": "Auburn"},
    {"id": 4, "season": 2001, "week": 1, "home": "Auburn", "away": "Alabama", "winner": ""}
]"#;

const ROSTER: &str = r#"[
    {"season": 2000, "team": "Alabama"},
    {"season": 2000, "team": "Auburn", "tier": "major"},
    {"season": 2000, "team": "Montana", "tier": "non-major"},
    {"season": 2001, "team": "Alabama"},
    {"season": 2001, "team": "Auburn"},
    {"season": 2001, "team": "Montana", "tier": "non-major"}
]"#;

const MAJOR_ONLY_ROSTER: &str = r#"[
    {"season": 2000, "team": "Alabama"},
    {"season": 2000, "team": "Auburn"},
    {"season": 2001, "team": "Alabama"},
    {"season": 2001, "team": "Auburn"}
]"#;

const OUT_OF_ORDER_GAMES: &str = r#"[
    {"season": 2001, "week": 1, "home": "Auburn", "away": "Alabama", "winner": "Auburn"},
    {"season": 2000, "week": 1, "home": "Alabama", "away": "Auburn", "winner": "Alabama"}
]"#;

fn run_processor(dir: &Path, games: &Path, roster: &Path, extra: &[&str]) -> std::process::Output {
    let output = dir.join("ratings.json");

    Command::new(env!("CARGO_BIN_EXE_cfb-processor"))
        .current_dir(dir)
        .arg("--games")
        .arg(games)
        .arg("--roster")
        .arg(roster)
        .arg("--output")
        .arg(&output)
        .args(extra)
        .env_remove("K_FACTOR")
        .env_remove("MAJOR_BASELINE")
        .env_remove("NON_MAJOR_BASELINE")
        .env_remove("REGRESSION")
        .env_remove("HOME_FIELD")
        .env_remove("FIRST_SEASON")
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to execute processor")
}

#[test]
fn test_two_season_flow() {
    common::init_test_env();
    let dir = common::scratch_dir("two_season_flow");
    let client = FeedClient::new(
        common::write_fixture(&dir, "games.json", GAMES),
        common::write_fixture(&dir, "roster.json", ROSTER)
    );

    let feed = client.get_games().unwrap();
    assert_eq!(feed.games.len(), 3);
    assert_eq!(feed.rejected.len(), 1);
    assert_eq!(feed.rejected[0].id.as_deref(), Some("3"));

    let roster = client.get_tier_lookup(false).unwrap();
    let mut model = EloModel::new(RatingConfig::default(), ProcessingOptions::default()).unwrap();
    let report = model.process(&feed.games, &roster).unwrap();

    assert_eq!(report.seasons, 2);
    assert_eq!(report.weeks, 3);
    assert_eq!(report.games_settled, 3);

    // 2000: Alabama beats Auburn, then loses to non-major Montana
    let upset = 20.0 * (1.0 - win_probability(1200.0, 1510.0));
    let alabama_2000 = 1510.0 - upset;
    let montana_2000 = 1200.0 + upset;

    // 2001: everyone regresses toward their tier baseline, then Auburn and Alabama draw
    let alabama = regressed_rating(alabama_2000, 1500.0, 0.333);
    let auburn = regressed_rating(1490.0, 1500.0, 0.333);
    let draw = 20.0 * (0.5 - win_probability(auburn, alabama));

    let tracker = &model.rating_tracker;
    assert_abs_diff_eq!(tracker.rating("Auburn").unwrap(), auburn + draw, epsilon = 1e-9);
    assert_abs_diff_eq!(tracker.rating("Alabama").unwrap(), alabama - draw, epsilon = 1e-9);
    assert_abs_diff_eq!(
        tracker.rating("Montana").unwrap(),
        regressed_rating(montana_2000, 1200.0, 0.333),
        epsilon = 1e-9
    );

    // Montana did not play in 2001 but was still regressed
    let montana = tracker.get_rating("Montana").unwrap();
    assert_eq!(montana.tier, Some(Tier::NonMajor));
    assert_eq!(montana.games_played, 1);
    assert_eq!(montana.adjustments.last().unwrap().kind, AdjustmentKind::Regression);
}

#[test]
fn test_unknown_tier_stops_processing() {
    common::init_test_env();
    let dir = common::scratch_dir("unknown_tier");
    let client = FeedClient::new(
        common::write_fixture(&dir, "games.json", GAMES),
        common::write_fixture(&dir, "roster.json", MAJOR_ONLY_ROSTER)
    );

    let feed = client.get_games().unwrap();
    let roster = client.get_tier_lookup(false).unwrap();
    let mut model = EloModel::new(RatingConfig::default(), ProcessingOptions::default()).unwrap();

    match model.process(&feed.games, &roster) {
        Err(ProcessorError::UnknownTier { season, competitors }) => {
            assert_eq!(season, 2000);
            assert_eq!(competitors, vec!["Montana".to_string()]);
        }
        other => panic!("Expected an unknown tier error, got {:?}", other.map(|_| ()))
    }
}

/// The binary writes a ranked export with checkpoints and rejected records
#[test]
#[serial]
fn test_binary_writes_export() {
    let dir = common::scratch_dir("binary_export");
    let games = common::write_fixture(&dir, "games.json", GAMES);
    let roster = common::write_fixture(&dir, "roster.json", ROSTER);

    let output = run_processor(&dir, &games, &roster, &["--checkpoints"]);
    assert!(
        output.status.success(),
        "Processor failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let contents = std::fs::read_to_string(dir.join("ratings.json")).unwrap();
    let export: serde_json::Value = serde_json::from_str(&contents).unwrap();

    assert_eq!(export["strategy"], "batched");
    assert_eq!(export["config"]["k"], 20.0);

    let ratings = export["ratings"].as_array().unwrap();
    assert_eq!(ratings.len(), 3);
    assert_eq!(ratings[0]["global_rank"], 1);
    let values = ratings.iter().map(|r| r["rating"].as_f64().unwrap()).collect::<Vec<_>>();
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
    assert!(ratings.iter().all(|r| r.get("adjustments").is_none()));

    let checkpoints = export["checkpoints"].as_array().unwrap();
    assert_eq!(checkpoints.len(), 2);
    assert_eq!(checkpoints[0]["season"], 2000);

    let rejected = export["rejected_games"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["index"], 2);

    std::fs::remove_dir_all(&dir).ok();
}

/// Competitors missing from the roster fail the run unless implicit non-major is requested
#[test]
#[serial]
fn test_binary_unknown_tier() {
    let dir = common::scratch_dir("binary_unknown_tier");
    let games = common::write_fixture(&dir, "games.json", GAMES);
    let roster = common::write_fixture(&dir, "roster.json", MAJOR_ONLY_ROSTER);

    let output = run_processor(&dir, &games, &roster, &[]);
    assert!(!output.status.success(), "Process should fail on an unknown tier");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown tier"), "Should name the failure: {}", stderr);
    assert!(stderr.contains("Montana"), "Should list the competitor: {}", stderr);
    assert!(!dir.join("ratings.json").exists());

    let output = run_processor(&dir, &games, &roster, &["--implicit-non-major"]);
    assert!(
        output.status.success(),
        "Processor failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    std::fs::remove_dir_all(&dir).ok();
}

/// Out-of-order input fails unless the feed is sorted first
#[test]
#[serial]
fn test_binary_out_of_order() {
    let dir = common::scratch_dir("binary_out_of_order");
    let games = common::write_fixture(&dir, "games.json", OUT_OF_ORDER_GAMES);
    let roster = common::write_fixture(&dir, "roster.json", MAJOR_ONLY_ROSTER);

    let output = run_processor(&dir, &games, &roster, &[]);
    assert!(!output.status.success(), "Process should fail on out-of-order input");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Out-of-order"));

    let output = run_processor(&dir, &games, &roster, &["--sort-input", "--strategy", "sequential"]);
    assert!(
        output.status.success(),
        "Processor failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    std::fs::remove_dir_all(&dir).ok();
}

/// RUST_LOG may hold a full filter directive, not just a level
#[test]
#[serial]
fn test_binary_accepts_log_directive() {
    let dir = common::scratch_dir("binary_log_directive");
    let games = common::write_fixture(&dir, "games.json", GAMES);
    let roster = common::write_fixture(&dir, "roster.json", ROSTER);

    let output = run_processor(&dir, &games, &roster, &["--log-level", "cfb_processor=debug,warn"]);

    assert!(
        output.status.success(),
        "Processor failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.join("ratings.json").exists());

    std::fs::remove_dir_all(&dir).ok();
}

/// Invalid parameters are rejected before any input is read
#[test]
#[serial]
fn test_binary_invalid_config() {
    let dir = common::scratch_dir("binary_invalid_config");
    let missing = dir.join("missing.json");

    let output = run_processor(&dir, &missing, &missing, &["--k=-5"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid configuration"), "{}", stderr);

    std::fs::remove_dir_all(&dir).ok();
}
