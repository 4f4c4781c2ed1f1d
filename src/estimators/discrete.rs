//! Defines the `DiscreteEstimator`, a single cell of a conditional probability table.

use super::ScoreType;
use crate::math::ln_gamma;
use crate::util::{BayesNetError, Result};


/// Pseudo-count seeded frequencies of the `K` symbols of a discrete variable, under one
/// configuration of its parents.
///
/// Every count starts at `prior`, so `probability` is the smoothed relative frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteEstimator {

    /// The accumulated count of each symbol, prior included
    counts: Vec<f64>,

    /// The sum of `counts`
    sum_of_counts: f64,

    /// The pseudo-count every symbol started from
    prior: f64
}


impl DiscreteEstimator {

    /// Construct an estimator over `num_symbols` symbols, each seeded with `prior`
    pub fn new(num_symbols: usize, prior: f64) -> Self {
        DiscreteEstimator {
            counts: vec![prior; num_symbols],
            sum_of_counts: prior * num_symbols as f64,
            prior
        }
    }

    /// Add `weight` observations of `symbol`. A negative weight withdraws earlier observations.
    ///
    /// # Errors
    /// `InvalidSymbol` if `symbol` is not an index into the domain, `InvalidWeight` if `weight`
    /// is not finite
    pub fn add_value(&mut self, symbol: f64, weight: f64) -> Result<()> {
        let k = self.symbol_index(symbol)?;
        if ! weight.is_finite() {
            return Err(BayesNetError::InvalidWeight(weight));
        }

        self.counts[k] += weight;
        self.sum_of_counts += weight;
        Ok(())
    }

    /// The smoothed probability of `symbol`, or 0 if nothing has been counted
    pub fn probability(&self, symbol: f64) -> Result<f64> {
        let k = self.symbol_index(symbol)?;
        if self.sum_of_counts == 0.0 {
            return Ok(0.0);
        }
        Ok(self.counts[k] / self.sum_of_counts)
    }

    /// The accumulated count of `symbol`, prior included
    pub fn count(&self, symbol: f64) -> Result<f64> {
        self.symbol_index(symbol).map(|k| self.counts[k])
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn sum_of_counts(&self) -> f64 {
        self.sum_of_counts
    }

    pub fn num_symbols(&self) -> usize {
        self.counts.len()
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    /// The contribution of this cell to the score of its node.
    ///
    /// `parent_cardinality` is the number of parent configurations of the node, needed by the
    /// BDeu prior. The complexity penalties of `Mdl` and `Aic` depend on the whole node, so they
    /// are left to the caller and this returns the log-likelihood term for all three of
    /// `Mdl`, `Aic` and `Entropy`.
    ///
    /// # Errors
    /// `GammaOverflow` if a gamma term leaves the domain of `ln_gamma`
    pub fn log_score(&self, score_type: ScoreType, parent_cardinality: usize) -> Result<f64> {
        let k = self.counts.len() as f64;

        match score_type {
            ScoreType::Bayes => {
                let mut score = 0.0;
                for &c in self.counts.iter().filter(|&&c| c != 0.0) {
                    score += ln_gamma(c)?;
                }

                if self.sum_of_counts != 0.0 {
                    score -= ln_gamma(self.sum_of_counts)?;
                }

                if self.prior != 0.0 {
                    score -= k * ln_gamma(self.prior)?;
                    score += ln_gamma(k * self.prior)?;
                }

                Ok(score)
            },

            ScoreType::BDeu => {
                let alpha = 1.0 / (k * parent_cardinality.max(1) as f64);
                let mut score = 0.0;
                let mut observed_total = 0.0;

                for &c in self.counts.iter() {
                    let n = c - self.prior;
                    observed_total += n;
                    score += ln_gamma(alpha + n)? - ln_gamma(alpha)?;
                }

                score += ln_gamma(k * alpha)? - ln_gamma(k * alpha + observed_total)?;
                Ok(score)
            },

            ScoreType::Mdl | ScoreType::Aic | ScoreType::Entropy => {
                let observed: Vec<f64> = self.counts.iter().map(|&c| c - self.prior).collect();
                let total: f64 = observed.iter().sum();

                Ok(observed
                    .iter()
                    .filter(|&&n| n > 0.0)
                    .map(|&n| n * (n / total).ln())
                    .sum())
            }
        }
    }

    fn symbol_index(&self, symbol: f64) -> Result<usize> {
        if symbol.fract() != 0.0 || symbol < 0.0 || symbol >= self.counts.len() as f64 {
            return Err(BayesNetError::InvalidSymbol { symbol, cardinality: self.counts.len() });
        }
        Ok(symbol as usize)
    }

}
