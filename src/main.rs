use std::fs;

use clap::Parser;
use skill_engine::{
    api::api_structs::MatchSetup,
    args::Args,
    model::{quality, MatchConfig, MatchGraph}
};
use tracing::info;

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    let raw = fs::read_to_string(&args.match_file).expect("Expected a readable match setup file");
    let setup: MatchSetup = serde_json::from_str(&raw).expect("Expected valid match setup JSON");
    let teams = setup.to_teams().expect("Expected well formed player ratings");

    let match_quality = quality(&teams, args.beta).expect("Expected a solvable quality model");
    info!("Computed quality for {} teams", teams.len());

    // The factor-graph path covers head-to-head matches only
    if let [team_one, team_two] = teams.as_slice() {
        let config = MatchConfig {
            beta: args.beta,
            tau: args.tau
        };
        let mut graph = MatchGraph::new(team_one, team_two, &config).expect("Expected a valid match graph");
        let delta = graph.forward_pass().expect("Expected the forward pass to succeed");
        info!("Forward pass complete, max update delta {:.6}", delta);

        for rating in graph.ratings() {
            println!("{} (conservative {:.2})", rating, rating.conservative());
        }
    }

    println!("Match quality: {:.4}", match_quality);
}

fn init_logging(log_level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into())
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Expected logging to initialize once");
}
