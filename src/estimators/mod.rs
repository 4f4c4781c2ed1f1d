//! Defines the estimators used to fill the conditional probability tables of a `BayesNet`, and the
//! `ScoreType` criteria they can be scored under.

use serde::{Deserialize, Serialize};

mod discrete;
mod simple;

pub use self::discrete::DiscreteEstimator;
pub use self::simple::{BayesNetEstimator, SimpleEstimator};

/// The criterion used to score a node (or a whole network) against the data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreType {

    /// Marginal likelihood under a Dirichlet prior with a constant pseudo-count
    #[default]
    Bayes,

    /// Bayesian Dirichlet equivalent uniform: marginal likelihood under a prior that spreads an
    /// equivalent sample size of 1 over the parent configurations and symbols
    BDeu,

    /// Log-likelihood minus half the number of free parameters times ln N
    Mdl,

    /// Log-likelihood minus the number of free parameters
    Aic,

    /// Plain log-likelihood
    Entropy
}
