//! Defines the `BayesNetEstimator` trait and the `SimpleEstimator`, which fills the conditional
//! probability tables of a `BayesNet` with smoothed relative frequencies.

use crate::data::Instance;
use crate::model::BayesNet;
use crate::util::{BayesNetError, Result};

use serde::{Deserialize, Serialize};


/// The ability to fill, and incrementally update, the conditional probability tables of a
/// `BayesNet` whose structure is fixed.
pub trait BayesNetEstimator {

    /// Allocate empty tables for the current structure of `network`
    fn init_cpts(&self, network: &mut BayesNet) -> Result<()>;

    /// Allocate the tables, then count every training row of `network` into them
    fn estimate_cpts(&self, network: &mut BayesNet) -> Result<()> {
        self.init_cpts(network)?;

        for i in 0..network.instances().num_instances() {
            let instance = network.instances().instance(i)?.clone();
            self.update_classifier(network, &instance)?;
        }

        Ok(())
    }

    /// Count `instance` into the tables, with its weight. A negative weight withdraws it.
    fn update_classifier(&self, network: &mut BayesNet, instance: &Instance) -> Result<()>;

    /// The posterior distribution of the class of `network` given the other cells of
    /// `instance`
    fn distribution_for_instance(&self, network: &BayesNet, instance: &Instance) -> Result<Vec<f64>>;

}


/// Estimates every cell as `(count + alpha) / (total + K * alpha)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleEstimator {

    /// The pseudo-count each symbol of each cell starts from
    alpha: f64
}


impl Default for SimpleEstimator {

    fn default() -> Self {
        SimpleEstimator { alpha: 0.5 }
    }

}


impl SimpleEstimator {

    /// Construct a `SimpleEstimator` with the given pseudo-count
    ///
    /// # Errors
    /// `InvalidOption` if `alpha` is negative or not finite
    pub fn new(alpha: f64) -> Result<Self> {
        let estimator = SimpleEstimator { alpha };
        estimator.validate()?;
        Ok(estimator)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn validate(&self) -> Result<()> {
        if self.alpha.is_finite() && self.alpha >= 0.0 {
            Ok(())
        } else {
            Err(BayesNetError::InvalidOption(format!("alpha must be a non-negative number, got {}", self.alpha)))
        }
    }

}


impl BayesNetEstimator for SimpleEstimator {

    fn init_cpts(&self, network: &mut BayesNet) -> Result<()> {
        self.validate()?;
        network.allocate_cpts(self.alpha);
        Ok(())
    }

    fn update_classifier(&self, network: &mut BayesNet, instance: &Instance) -> Result<()> {
        network.check_fitted()?;
        network.check_width(instance)?;

        // resolve every cell first so that a bad row changes nothing
        let mut updates = Vec::with_capacity(network.num_nodes());
        for node in 0..network.num_nodes() {
            let config = network.parent_configuration(node, instance)?;
            let value = network.observed_value(node, instance)?;
            updates.push((node, config, value));
        }

        for (node, config, value) in updates {
            network.cpt_mut(node, config)?.add_value(value as f64, instance.weight())?;
        }

        Ok(())
    }

    fn distribution_for_instance(&self, network: &BayesNet, instance: &Instance) -> Result<Vec<f64>> {
        network.check_fitted()?;
        network.check_width(instance)?;
        let class = network.class_index().ok_or(BayesNetError::NoClass)?;
        let num_classes = network.cardinality(class);

        let mut labelled = instance.clone();
        let mut log_probs = Vec::with_capacity(num_classes);
        for c in 0..num_classes {
            labelled.set_value(class, c as f64)?;

            let mut log_prob = 0.0;
            for node in 0..network.num_nodes() {
                let config = network.parent_configuration(node, &labelled)?;
                let value = network.observed_value(node, &labelled)?;
                log_prob += network.cpt(node, config)?.probability(value as f64)?.ln();
            }
            log_probs.push(log_prob);
        }

        // normalize in log space to stay clear of underflow
        let max = log_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if ! max.is_finite() {
            return Ok(vec![1.0 / num_classes as f64; num_classes]);
        }

        let unnormalized: Vec<f64> = log_probs.iter().map(|&lp| (lp - max).exp()).collect();
        let total: f64 = unnormalized.iter().sum();
        Ok(unnormalized.into_iter().map(|p| p / total).collect())
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::{Attribute, Instances};

    const EPS: f64 = 1e-10;

    /// X (binary) -> Y (binary), 300 rows with x0 and 700 with x1:
    ///
    ///    | y0  | y1
    /// ---+-----+-----
    /// x0 | 240 | 60
    /// ---+-----+-----
    /// x1 | 350 | 350
    fn one_parent_model(alpha: f64) -> BayesNet {
        let mut data = Instances::new("xy", vec![
            Attribute::nominal("X", &["x0", "x1"]).unwrap(),
            Attribute::nominal("Y", &["y0", "y1"]).unwrap(),
        ]).unwrap();
        data.set_class_index(Some(0)).unwrap();

        for &(x, y, n) in [(0.0, 0.0, 240), (0.0, 1.0, 60), (1.0, 0.0, 350), (1.0, 1.0, 350)].iter() {
            data.add(Instance::with_weight(vec![x, y], n as f64)).unwrap();
        }

        let mut net = BayesNet::with_estimator(data, SimpleEstimator::new(alpha).unwrap()).unwrap();
        net.add_arc(0, 1).unwrap();
        net
    }

    #[test]
    /// Test maximum likelihood estimates (no smoothing) from weighted rows
    fn maximum_likelihood() {
        let mut net = one_parent_model(0.0);
        net.estimate_cpts().unwrap();

        assert!((net.probability(0, 0, 0).unwrap() - 0.3).abs() < EPS);
        assert!((net.probability(1, 0, 0).unwrap() - 0.8).abs() < EPS);
        assert!((net.probability(1, 0, 1).unwrap() - 0.2).abs() < EPS);
        assert!((net.probability(1, 1, 0).unwrap() - 0.5).abs() < EPS);
    }

    #[test]
    /// Test that the pseudo-count pulls the estimates toward uniform
    fn smoothing() {
        let mut net = one_parent_model(1.0);
        net.estimate_cpts().unwrap();

        assert!((net.probability(0, 0, 0).unwrap() - 301.0 / 1002.0).abs() < EPS);
        assert!((net.probability(1, 0, 1).unwrap() - 61.0 / 302.0).abs() < EPS);
    }

    #[test]
    /// Test the posterior of the class
    ///
    /// P(x0 | y1) = .3 * .2 / (.3 * .2 + .7 * .5) = .06 / .41
    fn posterior() {
        let mut net = one_parent_model(0.0);
        net.estimate_cpts().unwrap();

        let dist = net.distribution_for_instance(&Instance::new(vec![0.0, 1.0])).unwrap();
        assert!((dist[0] - 0.06 / 0.41).abs() < EPS);
        assert!((dist[1] - 0.35 / 0.41).abs() < EPS);
    }

    #[test]
    /// Test that a row that cannot be counted leaves the tables alone
    fn bad_rows() {
        let mut net = one_parent_model(0.5);
        assert_eq!(Err(BayesNetError::NotFitted), net.update_classifier(&Instance::new(vec![0.0, 0.0])));

        net.estimate_cpts().unwrap();
        let before = net.cpt(0, 0).unwrap().clone();

        assert!(net.update_classifier(&Instance::new(vec![0.0, f64::NAN])).is_err());
        assert!(net.update_classifier(&Instance::new(vec![0.0, 2.0])).is_err());
        assert_eq!(&before, net.cpt(0, 0).unwrap());

        assert!(SimpleEstimator::new(-1.0).is_err());
        assert!(SimpleEstimator::new(f64::INFINITY).is_err());
    }
}
