use itertools::Itertools;
use nalgebra::{DMatrix, DVector};

use crate::model::{error::ModelError, rating::Rating};

/// Perceived quality of a matchup: the probability of an exact draw across
/// all teams under the gaussian performance model, in `[0, 1]`. Higher means
/// more evenly matched.
///
/// With `mu` the flattened mean vector, `Sigma` the diagonal matrix of
/// per-player variances (players are modeled as independent) and `A` the
/// players x (teams - 1) contrast matrix comparing consecutive teams:
///
/// ```text
/// B = beta^2 * A' * A
/// M = B + A' * Sigma * A
/// quality = exp(-0.5 * mu' * A * M^-1 * A' * mu) * sqrt(det(B) / det(M))
/// ```
///
/// Fails with `SingularModel` when `M` is not invertible, and with
/// `InvalidArgument` for fewer than two teams or an empty team.
pub fn quality(teams: &[Vec<Rating>], beta: f64) -> Result<f64, ModelError> {
    if teams.len() < 2 {
        return Err(ModelError::InvalidArgument(format!(
            "quality requires at least two teams, got {}",
            teams.len()
        )));
    }
    if teams.iter().any(|team| team.is_empty()) {
        return Err(ModelError::InvalidArgument("quality requires non-empty teams".to_string()));
    }

    let players = teams.iter().flatten().collect_vec();
    let num_players = players.len();
    let num_teams = teams.len();

    let mean_vector = DVector::from_iterator(num_players, players.iter().map(|r| r.mu()));
    let variance_matrix = DMatrix::from_diagonal(&DVector::from_iterator(
        num_players,
        players.iter().map(|r| r.sigma().powi(2))
    ));

    // Contrast matrix comparing consecutive teams pairwise: column i holds
    // +1 for members of team i and -1 for members of team i + 1.
    let mut a_matrix = DMatrix::zeros(num_players, num_teams - 1);
    let mut row = 0;
    for (team_index, team) in teams.iter().enumerate() {
        for _ in team {
            if team_index < num_teams - 1 {
                a_matrix[(row, team_index)] = 1.0;
            }
            if team_index > 0 {
                a_matrix[(row, team_index - 1)] = -1.0;
            }
            row += 1;
        }
    }

    let a_transpose = a_matrix.transpose();
    let b2ata = &a_transpose * &a_matrix * beta.powi(2);
    let atsa = &a_transpose * &variance_matrix * &a_matrix;
    let middle = &b2ata + &atsa;

    let middle_inverse = middle.clone().try_inverse().ok_or_else(|| {
        ModelError::SingularModel("combined team variance matrix is not invertible".to_string())
    })?;

    let mta = mean_vector.transpose() * &a_matrix;
    let atm = &a_transpose * &mean_vector;

    let e_arg = (mta * middle_inverse * atm)[(0, 0)] * -0.5;
    let s_arg = b2ata.determinant() / middle.determinant();

    Ok(e_arg.exp() * s_arg.sqrt())
}
