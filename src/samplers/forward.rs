//! Defines a simple forward sampler for a fitted `BayesNet`
//!
//! Implementation of Koller & Friedman Algorithm 12.1 (pp 489)

use crate::data::{Instance, Instances};
use crate::model::BayesNet;
use crate::util::Result;
use super::Sampler;

use rand::Rng;


/// Samples complete rows from a `BayesNet` by visiting the nodes in topological order
pub struct ForwardSampler<'a, R: Rng> {

    /// The network to sample
    network: &'a BayesNet,

    /// A topological order of the nodes of `network`
    order: Vec<usize>,

    rng: R
}


impl<'a, R: Rng> ForwardSampler<'a, R> {

    /// Construct a sampler for a fitted network.
    ///
    /// # Errors
    /// `NotFitted` if the network has no tables, `Cycle` if its graph is not acyclic
    pub fn new(network: &'a BayesNet, rng: R) -> Result<Self> {
        network.check_fitted()?;
        let order = network.topological_order()?;
        Ok(ForwardSampler { network, order, rng })
    }

    /// Sample `n` rows into a dataset with the network's header
    pub fn sample_dataset(&mut self, n: usize) -> Result<Instances> {
        let mut instances = self.network.instances().empty_copy();
        for _ in 0..n {
            let instance = self.sample()?;
            instances.add(instance)?;
        }
        Ok(instances)
    }

}


impl<'a, R: Rng> Sampler for ForwardSampler<'a, R> {

    fn sample(&mut self) -> Result<Instance> {
        let mut instance = Instance::missing(self.network.num_nodes());

        // the parents of each node are sampled before it, so its configuration is complete
        for &node in self.order.iter() {
            let config = self.network.parent_configuration(node, &instance)?;
            let cell = self.network.cpt(node, config)?;

            let u: f64 = self.rng.gen();
            let mut cumulative = 0.0;
            let mut value = cell.num_symbols() - 1;
            for symbol in 0..cell.num_symbols() {
                cumulative += cell.probability(symbol as f64)?;
                if u < cumulative {
                    value = symbol;
                    break;
                }
            }

            instance.set_value(node, value as f64)?;
        }

        Ok(instance)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::model::BayesNetGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample() {
        let net = BayesNetGenerator::new(4, 4, 3).with_seed(11).generate().unwrap();
        let mut sampler = ForwardSampler::new(&net, StdRng::seed_from_u64(5)).unwrap();

        for _ in 0..100 {
            let row = sampler.sample().unwrap();
            assert_eq!(4, row.num_values());
            assert!(! row.has_missing_value());
            assert!(row.values().iter().all(|&v| v < 3.0));
        }

        let data = sampler.sample_dataset(50).unwrap();
        assert_eq!(50, data.num_instances());
        assert_eq!(Some(3), data.class_index());
    }

    #[test]
    /// Test that the sample frequencies approach the tables
    fn frequencies() {
        let net = BayesNetGenerator::new(2, 1, 2).with_seed(8).generate().unwrap();
        let root = (0..2).find(|&n| net.num_parents(n) == 0).unwrap();
        let expected = net.probability(root, 0, 0).unwrap();

        let mut sampler = ForwardSampler::new(&net, StdRng::seed_from_u64(1)).unwrap();
        let data = sampler.sample_dataset(20000).unwrap();
        let observed = data.iter().filter(|r| r[root] == 0.0).count() as f64 / 20000.0;
        assert!((observed - expected).abs() < 0.02);
    }
}
