//! Search algorithms driven by a decomposable local score: the score of a structure is the sum of
//! one score per node, each depending only on the node and its parents.

use crate::estimators::ScoreType;
use crate::math::ln_gamma;
use crate::model::BayesNet;
use crate::util::{BayesNetError, Result};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

mod hill_climber;
mod k2;
mod tabu;
mod tan;

pub use self::hill_climber::{Cache, HillClimber, Operation, OperationKind};
pub use self::k2::K2;
pub use self::tabu::TabuSearch;
pub use self::tan::Tan;


/// Scores a node against the training data of its network, for a given parent set.
///
/// The scores are computed from weighted counts of (parent configuration, value) pairs, so they
/// never touch the network's tables and never edit its structure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalScore {

    score_type: ScoreType,

    /// The pseudo-count of the `Bayes` score
    alpha: f64
}


impl Default for LocalScore {

    fn default() -> Self {
        LocalScore { score_type: ScoreType::Bayes, alpha: 0.5 }
    }

}


impl LocalScore {

    pub fn new(score_type: ScoreType) -> Self {
        LocalScore { score_type, ..LocalScore::default() }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn score_type(&self) -> ScoreType {
        self.score_type
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// # Errors
    /// `InvalidOption` if `alpha` is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if self.alpha.is_finite() && self.alpha >= 0.0 {
            Ok(())
        } else {
            Err(BayesNetError::InvalidOption(format!("alpha must be a non-negative number, got {}", self.alpha)))
        }
    }

    /// The score of `node` with its current parents
    pub fn node_score(&self, network: &BayesNet, node: usize) -> Result<f64> {
        let parents = parents_of(network, node)?;
        self.score_with_parents(network, node, parents)
    }

    /// The score of `node` with `candidate` appended to its parents, or negative infinity if
    /// `candidate` already is a parent
    pub fn score_with_extra_parent(&self, network: &BayesNet, node: usize, candidate: usize) -> Result<f64> {
        let mut parents = parents_of(network, node)?.to_vec();
        if parents.contains(&candidate) {
            return Ok(f64::NEG_INFINITY);
        }
        parents.push(candidate);
        self.score_with_parents(network, node, &parents)
    }

    /// The score of `node` with `candidate` removed from its parents, or negative infinity if
    /// `candidate` is not a parent
    pub fn score_with_missing_parent(&self, network: &BayesNet, node: usize, candidate: usize) -> Result<f64> {
        let parents = parents_of(network, node)?;
        if ! parents.contains(&candidate) {
            return Ok(f64::NEG_INFINITY);
        }

        let remaining: Vec<usize> = parents.iter().cloned().filter(|&p| p != candidate).collect();
        self.score_with_parents(network, node, &remaining)
    }

    /// The sum of the scores of all nodes
    pub fn network_score(&self, network: &BayesNet) -> Result<f64> {
        let mut score = 0.0;
        for node in 0..network.num_nodes() {
            score += self.node_score(network, node)?;
        }
        Ok(score)
    }

    /// The score of `node` if its parents were `parents`, in that order
    ///
    /// # Errors
    /// `MissingValue` or `InvalidSymbol` if a training row cannot be counted, `GammaOverflow` if
    /// the score leaves the domain of `ln_gamma`
    pub fn score_with_parents(&self, network: &BayesNet, node: usize, parents: &[usize]) -> Result<f64> {
        self.validate()?;
        let k = network.cardinality(node);
        let configs: usize = parents.iter().map(|&p| network.cardinality(p)).product();

        let mut counts = Array2::<f64>::zeros((configs, k));
        for instance in network.instances().iter() {
            let mut config = 0;
            for &p in parents {
                config = config * network.cardinality(p) + network.observed_value(p, instance)?;
            }
            let value = network.observed_value(node, instance)?;
            counts[[config, value]] += instance.weight();
        }

        self.score_of_counts(&counts, network.instances().sum_of_weights())
    }

    /// The score of a table of counts, one row per parent configuration and one column per value
    /// of the node. `total_weight` is the weight of the training data, used by the `Mdl`
    /// penalty.
    pub fn score_of_counts(&self, counts: &Array2<f64>, total_weight: f64) -> Result<f64> {
        let (configs, k) = counts.dim();
        let kf = k as f64;
        let mut score = 0.0;

        for row in counts.outer_iter() {
            match self.score_type {
                ScoreType::Bayes => {
                    let mut sum = 0.0;
                    for &n in row.iter() {
                        if self.alpha + n != 0.0 {
                            score += ln_gamma(self.alpha + n)?;
                            sum += self.alpha + n;
                        }
                    }
                    if sum != 0.0 {
                        score -= ln_gamma(sum)?;
                    }
                    if self.alpha != 0.0 {
                        score -= kf * ln_gamma(self.alpha)?;
                        score += ln_gamma(kf * self.alpha)?;
                    }
                },

                ScoreType::BDeu => {
                    let alpha_k = 1.0 / (kf * configs as f64);
                    let alpha_j = 1.0 / configs as f64;
                    let mut sum = 0.0;
                    for &n in row.iter() {
                        score += ln_gamma(alpha_k + n)? - ln_gamma(alpha_k)?;
                        sum += n;
                    }
                    score += ln_gamma(alpha_j)? - ln_gamma(alpha_j + sum)?;
                },

                ScoreType::Mdl | ScoreType::Aic | ScoreType::Entropy => {
                    let sum: f64 = row.sum();
                    score += row.iter().filter(|&&n| n > 0.0).map(|&n| n * (n / sum).ln()).sum::<f64>();
                }
            }
        }

        let free = (configs * k.max(1).saturating_sub(1)) as f64;
        match self.score_type {
            ScoreType::Mdl if total_weight > 0.0 => score -= 0.5 * free * total_weight.ln(),
            ScoreType::Aic => score -= free,
            _ => ()
        }

        Ok(score)
    }

}


fn parents_of(network: &BayesNet, node: usize) -> Result<&[usize]> {
    network
        .parent_set(node)
        .map(|s| s.parents())
        .ok_or(BayesNetError::AttributeOutOfRange { index: node, width: network.num_nodes() })
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::{Attribute, Instance, Instances};

    const EPS: f64 = 1e-9;

    /// Two binary nodes where `b` copies `a` three times out of four
    fn network() -> BayesNet {
        let mut data = Instances::new("pair", vec![
            Attribute::nominal("a", &["0", "1"]).unwrap(),
            Attribute::nominal("b", &["0", "1"]).unwrap(),
        ]).unwrap();
        data.set_class_index(Some(0)).unwrap();

        for &(a, b, n) in [(0.0, 0.0, 3.0), (0.0, 1.0, 1.0), (1.0, 1.0, 3.0), (1.0, 0.0, 1.0)].iter() {
            data.add(Instance::with_weight(vec![a, b], n)).unwrap();
        }
        BayesNet::new(data).unwrap()
    }

    #[test]
    /// Test that the local scores agree with the fitted tables of the same structure
    fn matches_network_score() {
        let mut net = network();
        net.add_arc(0, 1).unwrap();
        net.estimate_cpts().unwrap();

        for &t in &[ScoreType::Bayes, ScoreType::BDeu, ScoreType::Mdl, ScoreType::Aic, ScoreType::Entropy] {
            let local = LocalScore::new(t).network_score(&net).unwrap();
            let fitted = net.log_score(t).unwrap();
            assert!((local - fitted).abs() < EPS, "{:?}: {} vs {}", t, local, fitted);
        }
    }

    #[test]
    /// Test the scores with an extra and a missing parent
    fn extra_and_missing() {
        let mut net = network();
        let score = LocalScore::default();

        let base = score.node_score(&net, 1).unwrap();
        let extra = score.score_with_extra_parent(&net, 1, 0).unwrap();
        assert_eq!(f64::NEG_INFINITY, score.score_with_missing_parent(&net, 1, 0).unwrap());

        net.add_parent(1, 0).unwrap();
        assert!((score.node_score(&net, 1).unwrap() - extra).abs() < EPS);
        assert!((score.score_with_missing_parent(&net, 1, 0).unwrap() - base).abs() < EPS);
        assert_eq!(f64::NEG_INFINITY, score.score_with_extra_parent(&net, 1, 0).unwrap());

        // scoring never edits the structure
        assert_eq!(&[0], net.parent_sets()[1].parents());
    }

    #[test]
    /// Test the entropy score against the closed form
    fn entropy() {
        let net = network();
        let score = LocalScore::new(ScoreType::Entropy);

        // b alone is a fair coin over 8 rows
        let expected = 8.0 * 0.5f64.ln();
        assert!((score.node_score(&net, 1).unwrap() - expected).abs() < EPS);

        // given a, it is right three times out of four
        let expected = 2.0 * (3.0 * 0.75f64.ln() + 0.25f64.ln());
        assert!((score.score_with_extra_parent(&net, 1, 0).unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn invalid_alpha() {
        let net = network();
        assert!(LocalScore::default().with_alpha(-1.0).node_score(&net, 0).is_err());
        assert!(LocalScore::default().node_score(&net, 5).is_err());
    }
}
