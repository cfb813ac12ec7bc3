use indexmap::IndexMap;

use crate::model::{error::ModelError, gaussian::Gaussian};

/// Index of a factor node inside its owning [`FactorGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactorId(usize);

/// The closed set of factor kinds. The external message-passing schedule
/// drives every kind uniformly through [`FactorGraph::down`].
#[derive(Debug, Clone)]
enum FactorKind {
    /// Passive endpoint updated only by its neighbors, e.g. the node an
    /// externally supplied truncation factor attaches to.
    Variable,
    /// Injects a persisted rating into the match. The node's own belief is
    /// the rating; `dynamics` is the per-event skill drift noise.
    Prior { down: FactorId, dynamics: f64 },
    /// Gaussian noise channel between a skill node and a performance node,
    /// with noise variance `variance` (beta squared).
    Likelihood {
        up: Option<FactorId>,
        down: FactorId,
        variance: f64
    },
    /// Linear combination of upstream performance nodes. The weight order is
    /// significant and fixed at construction; inputs are wired afterwards
    /// through [`FactorGraph::set_factors_up`].
    WeightedSum {
        up: Vec<FactorId>,
        weights: Vec<f64>,
        down: FactorId
    }
}

struct FactorNode {
    belief: Gaussian,
    // Last message sent to this node across each edge, keyed by the sending
    // neighbor. Absent entries read as the uninformative gaussian.
    messages: IndexMap<FactorId, Gaussian>,
    kind: FactorKind
}

impl FactorNode {
    fn new(belief: Gaussian, kind: FactorKind) -> FactorNode {
        FactorNode {
            belief,
            messages: IndexMap::new(),
            kind
        }
    }
}

/// Arena of factor nodes for a single match.
///
/// Nodes are addressed by [`FactorId`] and hold a marginal belief plus a
/// cache of the last message received across each edge. The graph lives for
/// one inference run and is discarded after convergence; ratings are the
/// only durable values. Graphs for independent matches share no state, so
/// running them on separate threads needs no locking.
#[derive(Default)]
pub struct FactorGraph {
    nodes: Vec<FactorNode>
}

impl FactorGraph {
    pub fn new() -> FactorGraph {
        FactorGraph { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a passive endpoint node with an uninformative initial belief.
    pub fn add_variable(&mut self) -> FactorId {
        self.push(Gaussian::uninformative(), FactorKind::Variable)
    }

    /// Adds a prior factor holding `prior` as its belief, pushing downstream
    /// to `down` with `dynamics` drift noise.
    pub fn add_prior(&mut self, prior: Gaussian, down: FactorId, dynamics: f64) -> FactorId {
        self.push(prior, FactorKind::Prior { down, dynamics })
    }

    /// Adds a likelihood factor with noise variance `variance`. The upstream
    /// link is wired afterwards with [`FactorGraph::set_factors_up`].
    pub fn add_likelihood(&mut self, down: FactorId, variance: f64) -> FactorId {
        self.push(
            Gaussian::uninformative(),
            FactorKind::Likelihood {
                up: None,
                down,
                variance
            }
        )
    }

    /// Adds a weighted-sum factor with the given weights, in input order.
    /// The upstream links are wired afterwards with
    /// [`FactorGraph::set_factors_up`].
    pub fn add_weighted_sum(&mut self, weights: &[f64], down: FactorId) -> FactorId {
        self.push(
            Gaussian::uninformative(),
            FactorKind::WeightedSum {
                up: Vec::new(),
                weights: weights.to_vec(),
                down
            }
        )
    }

    fn push(&mut self, belief: Gaussian, kind: FactorKind) -> FactorId {
        let id = FactorId(self.nodes.len());
        self.nodes.push(FactorNode::new(belief, kind));
        id
    }

    /// Wires the upstream neighbor(s) of a likelihood or weighted-sum node.
    /// Mutually referencing neighbors make a single-pass construction
    /// impossible, so the up side of an edge is attached once both nodes
    /// exist; the downstream link and weights stay fixed from construction.
    pub fn set_factors_up(&mut self, id: FactorId, up: &[FactorId]) -> Result<(), ModelError> {
        match &mut self.nodes[id.0].kind {
            FactorKind::Likelihood { up: slot, .. } => match up {
                [single] => {
                    *slot = Some(*single);
                    Ok(())
                }
                _ => Err(ModelError::InvalidArgument(format!(
                    "likelihood factor takes exactly one upstream neighbor, got {}",
                    up.len()
                )))
            },
            FactorKind::WeightedSum { up: slot, weights, .. } => {
                if up.len() != weights.len() {
                    return Err(ModelError::InvalidArgument(format!(
                        "weighted sum requires one input per weight, got {} inputs for {} weights",
                        up.len(),
                        weights.len()
                    )));
                }

                *slot = up.to_vec();
                Ok(())
            }
            _ => Err(ModelError::InvalidArgument(format!(
                "factor {:?} has no upstream links to wire",
                id
            )))
        }
    }

    /// Current marginal belief of a node.
    pub fn belief(&self, id: FactorId) -> Gaussian {
        self.nodes[id.0].belief
    }

    /// The message last cached for the `from -> id` edge, or the
    /// uninformative gaussian if that edge has not carried one yet.
    pub fn get_message(&self, id: FactorId, from: FactorId) -> Gaussian {
        self.nodes[id.0]
            .messages
            .get(&from)
            .copied()
            .unwrap_or_else(Gaussian::uninformative)
    }

    /// Replaces a node's belief, returning the convergence delta
    /// `max(|delta tau|, sqrt(|delta pi|))` against the previous belief.
    ///
    /// An infinite precision delta reports as `0.0`; the scheduler's
    /// termination check treats first contact between an improper belief and
    /// a fully certain one as settled, not divergent.
    pub fn update(&mut self, id: FactorId, belief: Gaussian) -> f64 {
        let node = &mut self.nodes[id.0];
        let pi_delta = (node.belief.pi() - belief.pi()).abs();
        let tau_delta = (node.belief.tau() - belief.tau()).abs();
        node.belief = belief;

        if pi_delta == f64::INFINITY {
            return 0.0;
        }

        tau_delta.max(pi_delta.sqrt())
    }

    /// Incorporates an incremental message from the `from` neighbor: that
    /// neighbor's previous contribution is stripped out of the belief and
    /// replaced by `message`.
    pub fn update_by_message(&mut self, id: FactorId, from: FactorId, message: Gaussian) -> f64 {
        let other = self.belief(id) / self.get_message(id, from);
        self.nodes[id.0].messages.insert(from, message);

        self.update(id, other * message)
    }

    /// Lets the `from` neighbor dictate the resulting marginal directly. The
    /// edge message implied by the new belief is cached so a later update on
    /// the same edge can strip it back out.
    pub fn update_by_belief(&mut self, id: FactorId, from: FactorId, belief: Gaussian) -> f64 {
        let other = self.belief(id) / self.get_message(id, from);
        self.nodes[id.0].messages.insert(from, belief / other);

        self.update(id, belief)
    }

    /// Sends this node's downstream message, updating the downstream
    /// neighbor as a side effect. Returns the downstream update delta for
    /// the scheduler's convergence tracking.
    pub fn down(&mut self, id: FactorId) -> Result<f64, ModelError> {
        // Kind data is copied out up front so the downstream update can
        // borrow the arena mutably.
        let kind = self.nodes[id.0].kind.clone();

        match kind {
            FactorKind::Variable => Err(ModelError::InvalidArgument(format!(
                "factor {:?} is a passive variable with no downstream message",
                id
            ))),
            FactorKind::Prior { down, dynamics } => {
                let prior = self.belief(id);
                let sigma = (prior.sigma().powi(2) + dynamics.powi(2)).sqrt();
                let belief = Gaussian::from_mean(prior.mu(), sigma)?;

                Ok(self.update_by_belief(down, id, belief))
            }
            FactorKind::Likelihood { up, down, variance } => {
                let up = up.ok_or_else(|| {
                    ModelError::InvalidArgument(format!("likelihood factor {:?} has no upstream neighbor wired", id))
                })?;

                let msg = self.get_message(id, up);
                let a = 1.0 / (1.0 + variance * msg.pi());
                let message = Gaussian::from_precision(a * msg.pi(), a * msg.tau());

                Ok(self.update_by_message(down, id, message))
            }
            FactorKind::WeightedSum { up, weights, down } => {
                if up.len() != weights.len() {
                    return Err(ModelError::InvalidArgument(format!(
                        "weighted sum factor {:?} has {} inputs wired for {} weights",
                        id,
                        up.len(),
                        weights.len()
                    )));
                }

                let mut new_mu = 0.0;
                let mut pi_inverse = 0.0;

                for (factor, weight) in up.iter().zip(&weights) {
                    let msg = self.get_message(id, *factor);
                    new_mu += weight * msg.mu();

                    // The inverse precision saturates as soon as one input
                    // carries zero precision; stop accumulating there.
                    if pi_inverse == f64::INFINITY {
                        continue;
                    }
                    pi_inverse += weight.powi(2) / msg.pi();
                }

                let pi = 1.0 / pi_inverse;
                let message = Gaussian::from_precision(pi, pi * new_mu);

                Ok(self.update_by_message(down, id, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::model::constants::BETA;

    fn gaussian(mu: f64, sigma: f64) -> Gaussian {
        Gaussian::from_mean(mu, sigma).unwrap()
    }

    #[test]
    fn test_get_message_defaults_to_uninformative() {
        let mut graph = FactorGraph::new();
        let a = graph.add_variable();
        let b = graph.add_variable();

        assert_eq!(graph.get_message(a, b), Gaussian::uninformative());
    }

    #[test]
    fn test_update_delta_zero_on_repeat() {
        let mut graph = FactorGraph::new();
        let node = graph.add_variable();
        let belief = gaussian(25.0, 5.0);

        let first = graph.update(node, belief);
        let second = graph.update(node, belief);

        assert!(first > 0.0);
        assert_eq!(second, 0.0);
    }

    #[test]
    fn test_update_delta_zero_on_infinite_precision_jump() {
        let mut graph = FactorGraph::new();
        let node = graph.add_variable();

        // Improper belief replaced by a fully certain one
        let certain = Gaussian::from_precision(f64::INFINITY, 0.0);

        assert_eq!(graph.update(node, certain), 0.0);
    }

    #[test]
    fn test_update_by_message_combines_with_remaining_belief() {
        let mut graph = FactorGraph::new();
        let node = graph.add_variable();
        let neighbor = graph.add_variable();

        graph.update(node, gaussian(20.0, 5.0));
        graph.update_by_message(node, neighbor, gaussian(30.0, 5.0));

        let expected = gaussian(20.0, 5.0) * gaussian(30.0, 5.0);
        assert_eq!(graph.belief(node), expected);
        assert_eq!(graph.get_message(node, neighbor), gaussian(30.0, 5.0));
    }

    #[test]
    fn test_update_by_belief_matches_equivalent_message_marginal() {
        // Sending a message, then dictating the very marginal that message
        // produced, leaves the belief unchanged.
        let mut graph = FactorGraph::new();
        let node = graph.add_variable();
        let neighbor = graph.add_variable();

        graph.update(node, gaussian(20.0, 5.0));
        graph.update_by_message(node, neighbor, gaussian(30.0, 5.0));
        let marginal = graph.belief(node);

        let delta = graph.update_by_belief(node, neighbor, marginal);

        assert_eq!(graph.belief(node), marginal);
        assert_abs_diff_eq!(delta, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_prior_down_inflates_volatility() {
        let mut graph = FactorGraph::new();
        let skill = graph.add_variable();
        let prior = graph.add_prior(gaussian(25.0, 3.0), skill, 4.0);

        graph.down(prior).unwrap();

        let belief = graph.belief(skill);
        assert_abs_diff_eq!(belief.mu(), 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(belief.sigma(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_likelihood_down_noiseless_channel_passes_message_through() {
        let mut graph = FactorGraph::new();
        let performance = graph.add_variable();
        let likelihood = graph.add_likelihood(performance, 0.0);
        let skill = graph.add_prior(gaussian(25.0, 25.0 / 3.0), likelihood, 0.0);

        graph.set_factors_up(likelihood, &[skill]).unwrap();
        graph.down(skill).unwrap();
        graph.down(likelihood).unwrap();

        let upstream = graph.get_message(likelihood, skill);
        let downstream = graph.get_message(performance, likelihood);

        assert_abs_diff_eq!(downstream.pi(), upstream.pi(), epsilon = 1e-12);
        assert_abs_diff_eq!(downstream.tau(), upstream.tau(), epsilon = 1e-12);
    }

    #[test]
    fn test_likelihood_down_large_noise_washes_out_message() {
        let mut graph = FactorGraph::new();
        let performance = graph.add_variable();
        let likelihood = graph.add_likelihood(performance, 1e12);
        let skill = graph.add_prior(gaussian(25.0, 25.0 / 3.0), likelihood, 0.0);

        graph.set_factors_up(likelihood, &[skill]).unwrap();
        graph.down(skill).unwrap();
        graph.down(likelihood).unwrap();

        let downstream = graph.get_message(performance, likelihood);
        assert_abs_diff_eq!(downstream.pi(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_sum_down_difference_of_means() {
        let mut graph = FactorGraph::new();
        let difference = graph.add_variable();
        let sum = graph.add_weighted_sum(&[1.0, -1.0], difference);
        let winner = graph.add_variable();
        let loser = graph.add_variable();

        graph.set_factors_up(sum, &[winner, loser]).unwrap();
        graph.update_by_message(sum, winner, gaussian(30.0, 5.0));
        graph.update_by_message(sum, loser, gaussian(20.0, 5.0));
        graph.down(sum).unwrap();

        let message = graph.get_message(difference, sum);
        assert_abs_diff_eq!(message.mu(), 10.0, epsilon = 1e-9);
        assert!(message.sigma().is_finite());
        assert!(message.sigma() > 0.0);
        assert_abs_diff_eq!(message.sigma(), 50.0f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_sum_down_saturates_on_zero_precision_input() {
        // One zero-precision input makes the downstream message
        // uninformative instead of NaN.
        let mut graph = FactorGraph::new();
        let output = graph.add_variable();
        let sum = graph.add_weighted_sum(&[1.0, 1.0], output);
        let known = graph.add_variable();
        let unknown = graph.add_variable();

        graph.set_factors_up(sum, &[known, unknown]).unwrap();
        graph.update_by_message(sum, known, gaussian(30.0, 5.0));
        graph.down(sum).unwrap();

        let message = graph.get_message(output, sum);
        assert_eq!(message.pi(), 0.0);
        assert_eq!(message.tau(), 0.0);
        assert!(!message.pi().is_nan());
    }

    #[test]
    fn test_down_on_variable_is_an_error() {
        let mut graph = FactorGraph::new();
        let node = graph.add_variable();

        assert!(matches!(graph.down(node), Err(ModelError::InvalidArgument(_))));
    }

    #[test]
    fn test_unwired_likelihood_is_an_error() {
        let mut graph = FactorGraph::new();
        let output = graph.add_variable();
        let likelihood = graph.add_likelihood(output, BETA * BETA);

        assert!(matches!(graph.down(likelihood), Err(ModelError::InvalidArgument(_))));
    }

    #[test]
    fn test_weighted_sum_wiring_length_checked() {
        let mut graph = FactorGraph::new();
        let output = graph.add_variable();
        let sum = graph.add_weighted_sum(&[1.0, -1.0], output);
        let only = graph.add_variable();

        assert!(graph.set_factors_up(sum, &[only]).is_err());
    }

    #[test]
    fn test_repeated_identical_message_is_idempotent() {
        let mut graph = FactorGraph::new();
        let node = graph.add_variable();
        let neighbor = graph.add_variable();
        let message = gaussian(27.0, 4.0);

        graph.update_by_message(node, neighbor, message);
        let belief = graph.belief(node);
        let delta = graph.update_by_message(node, neighbor, message);

        assert_eq!(graph.belief(node), belief);
        assert_abs_diff_eq!(delta, 0.0, epsilon = 1e-9);
    }
}
