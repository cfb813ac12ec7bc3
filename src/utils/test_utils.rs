use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::rating::Rating;

pub fn generate_rating(player_id: i32, mu: f64, sigma: f64) -> Rating {
    Rating::from_mean(player_id, mu, sigma).expect("Expected valid rating parameters")
}

/// Generates a team of `size` players with sequential ids starting at
/// `first_player_id`, all at the same rating.
pub fn generate_team(first_player_id: i32, size: usize, mu: f64, sigma: f64) -> Vec<Rating> {
    if size < 1 {
        panic!("Team size must be at least 1");
    }

    (0..size as i32)
        .map(|offset| generate_rating(first_player_id + offset, mu, sigma))
        .collect()
}

/// Generates a team whose means are jittered within `spread` of the target.
/// Seeded for reproducible results.
pub fn generate_jittered_team(first_player_id: i32, size: usize, mu: f64, sigma: f64, spread: f64) -> Vec<Rating> {
    if size < 1 {
        panic!("Team size must be at least 1");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(42);

    (0..size as i32)
        .map(|offset| {
            let jittered_mu = mu + rng.random_range(-spread..=spread);
            generate_rating(first_player_id + offset, jittered_mu, sigma)
        })
        .collect()
}
