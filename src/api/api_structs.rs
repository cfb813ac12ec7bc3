use serde::{Deserialize, Serialize};

use crate::model::{error::ModelError, rating::Rating};

/// External record of one player's persisted rating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub player_id: i32,
    pub rating: f64,
    pub volatility: f64
}

/// A match setup consumed by the driver: ordered teams of player entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    pub teams: Vec<Vec<PlayerEntry>>
}

impl PlayerEntry {
    pub fn to_rating(&self) -> Result<Rating, ModelError> {
        Rating::from_mean(self.player_id, self.rating, self.volatility)
    }

    pub fn from_rating(rating: &Rating) -> PlayerEntry {
        PlayerEntry {
            player_id: rating.player_id(),
            rating: rating.mu(),
            volatility: rating.sigma()
        }
    }
}

impl MatchSetup {
    pub fn to_teams(&self) -> Result<Vec<Vec<Rating>>, ModelError> {
        self.teams
            .iter()
            .map(|team| team.iter().map(PlayerEntry::to_rating).collect())
            .collect()
    }
}
