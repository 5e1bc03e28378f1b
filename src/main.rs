use clap::Parser;
use kinograph::{init_tracing, AppState, Config};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "kinograph", about = "Knowledge-graph backed movie recommender")]
struct Cli {
    /// Configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,

    /// Directory holding movies.csv, tags.csv and ratings.csv.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Target user whose taste profile drives the run.
    #[arg(long)]
    user: Option<u32>,

    /// RNG seed for a reproducible draw.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.datasets.movies = dir.join("movies.csv");
        config.datasets.tags = dir.join("tags.csv");
        config.datasets.ratings = dir.join("ratings.csv");
    }
    if let Some(user) = cli.user {
        config.profile.target_user_id = user;
    }

    info!(
        user = config.profile.target_user_id,
        endpoint = %config.sparql.endpoint,
        "starting recommendation run"
    );

    let state = AppState::new(config, cli.seed)?;
    let summary = state.recommendation_service.run().await;

    match &summary.recommendation {
        Some(recommendation) => info!(
            title = %recommendation.title,
            probability = recommendation.probability,
            "run complete"
        ),
        None => info!("run complete without a recommendation"),
    }

    Ok(())
}
