use std::path::PathBuf;

use clap::Parser;

use crate::model::constants;

#[derive(Parser, Clone)]
#[command(
    display_name = "Skill Engine",
    long_about = "Computes match quality and skill belief updates for competitive matches"
)]
pub struct Args {
    /// A JSON match setup, e.g.
    /// `{"teams": [[{"playerId": 1, "rating": 25.0, "volatility": 8.33}], ...]}`
    #[arg(short, long, help = "Match setup file (JSON)")]
    pub match_file: PathBuf,

    /// Performance noise scale of the model
    #[arg(short, long, default_value_t = constants::BETA)]
    pub beta: f64,

    /// Dynamics noise added to each rating per event
    #[arg(short, long, default_value_t = constants::TAU)]
    pub tau: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}
