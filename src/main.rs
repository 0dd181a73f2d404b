use cfb_processor::{
    args::Args,
    error::Result,
    feed::feed_client::{canonical_order, FeedClient},
    model::elo_model::EloModel
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        error!("Ratings were not written");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.rating_config()?;
    let client = FeedClient::new(&args.games, &args.roster);

    let mut feed = client.get_games()?;
    if args.sort_input {
        canonical_order(&mut feed.games);
    }
    let roster = client.get_tier_lookup(args.implicit_non_major)?;

    let mut model = EloModel::new(config, args.processing_options())?;
    info!(strategy = %model.strategy(), "Processing ratings");
    let report = model.process(&feed.games, &roster)?;

    info!(
        seasons = report.seasons,
        weeks = report.weeks,
        games = report.games_settled,
        skipped = report.skipped_before_first_season,
        "Processing complete"
    );

    let mut rejected = feed.rejected;
    rejected.extend(report.rejected);

    let export = model.export(rejected, args.include_adjustments);
    for rating in export.ratings.iter().take(10) {
        info!(
            rank = rating.global_rank,
            competitor = rating.competitor.as_str(),
            rating = %format!("{:.1}", rating.rating),
            "Leaderboard"
        );
    }

    client.save_results(&args.output, &export)
}
