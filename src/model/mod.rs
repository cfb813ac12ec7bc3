pub mod constants;
pub mod error;
pub mod gaussian;
pub mod graph;
pub mod match_graph;
pub mod quality;
pub mod rating;

pub use error::ModelError;
pub use gaussian::Gaussian;
pub use match_graph::{MatchConfig, MatchGraph};
pub use quality::quality;
pub use rating::Rating;
