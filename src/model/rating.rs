use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{
    constants::{CONSERVATIVE_MULTIPLIER, DEFAULT_RATING, DEFAULT_VOLATILITY},
    error::ModelError,
    gaussian::Gaussian
};

/// A player's skill belief: a gaussian bound to the owning player.
///
/// Ratings are the only values that survive between matches. Factor graphs
/// are rebuilt from them per match and their converged beliefs are read back
/// out as new ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    player_id: i32,
    gaussian: Gaussian
}

impl Rating {
    /// A new player at the default prior.
    pub fn new(player_id: i32) -> Rating {
        let pi = DEFAULT_VOLATILITY.powi(-2);

        Rating {
            player_id,
            gaussian: Gaussian::from_precision(pi, pi * DEFAULT_RATING)
        }
    }

    pub fn from_mean(player_id: i32, mu: f64, sigma: f64) -> Result<Rating, ModelError> {
        Ok(Rating {
            player_id,
            gaussian: Gaussian::from_mean(mu, sigma)?
        })
    }

    pub fn from_gaussian(player_id: i32, gaussian: Gaussian) -> Rating {
        Rating { player_id, gaussian }
    }

    pub fn player_id(&self) -> i32 {
        self.player_id
    }

    pub fn gaussian(&self) -> Gaussian {
        self.gaussian
    }

    pub fn mu(&self) -> f64 {
        self.gaussian.mu()
    }

    pub fn sigma(&self) -> f64 {
        self.gaussian.sigma()
    }

    /// Pessimistic skill estimate used for leaderboard ordering. Never flows
    /// through the factor graph itself.
    pub fn conservative(&self) -> f64 {
        self.mu() - CONSERVATIVE_MULTIPLIER * self.sigma()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}: {}", self.player_id, self.gaussian)
    }
}
