use itertools::Itertools;
use tracing::debug;

use crate::model::{
    constants::{BETA, TAU},
    error::ModelError,
    gaussian::Gaussian,
    graph::{FactorGraph, FactorId},
    rating::Rating
};

/// Model constants for one match: the performance noise scale `beta` shared
/// by every likelihood factor, and the per-event dynamics noise `tau`
/// injected by every prior.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    pub beta: f64,
    pub tau: f64
}

impl Default for MatchConfig {
    fn default() -> MatchConfig {
        MatchConfig { beta: BETA, tau: TAU }
    }
}

/// The layered factor graph for one head-to-head match.
///
/// Per player, a prior factor feeds a likelihood factor (skill to
/// performance); per team, a unit-weight sum aggregates performances into a
/// team total; a `[1, -1]` sum forms the team-difference node; and a passive
/// variable endpoint is left for an externally supplied truncation factor
/// consuming the observed outcome. Factors carry a single downstream link,
/// which pins this layout to two teams; multi-team matchups are served by
/// the quality path instead.
pub struct MatchGraph {
    graph: FactorGraph,
    players: Vec<i32>,
    priors: Vec<FactorId>,
    skills: Vec<FactorId>,
    team_sums: Vec<FactorId>,
    difference_sum: FactorId,
    difference: FactorId
}

impl MatchGraph {
    /// Assembles the graph for `team_one` vs `team_two`. Teams must be
    /// non-empty.
    pub fn new(team_one: &[Rating], team_two: &[Rating], config: &MatchConfig) -> Result<MatchGraph, ModelError> {
        if team_one.is_empty() || team_two.is_empty() {
            return Err(ModelError::InvalidArgument(
                "match graph requires two non-empty teams".to_string()
            ));
        }

        let variance = config.beta * config.beta;

        let mut graph = FactorGraph::new();
        let difference = graph.add_variable();
        let difference_sum = graph.add_weighted_sum(&[1.0, -1.0], difference);

        let mut players = Vec::new();
        let mut priors = Vec::new();
        let mut skills = Vec::new();
        let mut team_sums = Vec::new();

        for team in [team_one, team_two] {
            let team_sum = graph.add_weighted_sum(&vec![1.0; team.len()], difference_sum);
            let mut team_skills = Vec::new();

            for rating in team {
                let skill = graph.add_likelihood(team_sum, variance);
                let prior = graph.add_prior(rating.gaussian(), skill, config.tau);
                graph.set_factors_up(skill, &[prior])?;

                players.push(rating.player_id());
                priors.push(prior);
                skills.push(skill);
                team_skills.push(skill);
            }

            graph.set_factors_up(team_sum, &team_skills)?;
            team_sums.push(team_sum);
        }

        graph.set_factors_up(difference_sum, &team_sums)?;

        debug!(
            players = players.len(),
            nodes = graph.len(),
            "assembled match factor graph"
        );

        Ok(MatchGraph {
            graph,
            players,
            priors,
            skills,
            team_sums,
            difference_sum,
            difference
        })
    }

    /// One deterministic sweep of downstream messages in dependency order:
    /// priors, likelihoods, team sums, difference. Returns the maximum
    /// update delta of the sweep. Iterating to convergence, and feeding the
    /// observed outcome back up, belongs to the external schedule.
    pub fn forward_pass(&mut self) -> Result<f64, ModelError> {
        let mut max_delta = 0.0f64;

        for &prior in &self.priors {
            max_delta = max_delta.max(self.graph.down(prior)?);
        }
        for &skill in &self.skills {
            max_delta = max_delta.max(self.graph.down(skill)?);
        }
        for &team_sum in &self.team_sums {
            max_delta = max_delta.max(self.graph.down(team_sum)?);
        }
        max_delta = max_delta.max(self.graph.down(self.difference_sum)?);

        Ok(max_delta)
    }

    /// Current belief of the team-difference endpoint.
    pub fn difference(&self) -> Gaussian {
        self.graph.belief(self.difference)
    }

    /// The endpoint an external truncation factor attaches to.
    pub fn difference_id(&self) -> FactorId {
        self.difference
    }

    /// Skill-layer beliefs read back out as ratings, in the flattened
    /// player order the graph was built with.
    pub fn ratings(&self) -> Vec<Rating> {
        self.players
            .iter()
            .zip_eq(&self.skills)
            .map(|(&player_id, &skill)| Rating::from_gaussian(player_id, self.graph.belief(skill)))
            .collect()
    }

    pub fn graph(&self) -> &FactorGraph {
        &self.graph
    }

    /// Mutable access for the external message-passing schedule.
    pub fn graph_mut(&mut self) -> &mut FactorGraph {
        &mut self.graph
    }
}
