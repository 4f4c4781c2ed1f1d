//! Defines the `BayesNetGenerator`, which builds random networks with random tables. Paired with
//! a `ForwardSampler` it produces synthetic datasets with a known generating structure.

use super::network::BayesNet;
use crate::data::{Attribute, Instances};
use crate::estimators::SimpleEstimator;
use crate::util::{BayesNetError, Result};

use log::debug;
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use serde::{Deserialize, Serialize};


/// Generates a random connected network.
///
/// The nodes are called `Node1` to `NodeN`, each with the values `Value1` to `ValueK`, and the
/// last node is the class. Every arc points from a lower to a higher numbered node, so the graph
/// is acyclic by construction: a random spanning tree first, then extra arcs chosen uniformly
/// from the remaining pairs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesNetGenerator {

    num_nodes: usize,

    /// The total number of arcs, between `num_nodes - 1` and `num_nodes * (num_nodes - 1) / 2`
    num_arcs: usize,

    /// The number of values of every node
    cardinality: usize,

    /// Seed for reproducible networks; `None` seeds from the operating system
    seed: Option<u64>,

    /// Smooths the generated tables
    estimator: SimpleEstimator
}


impl Default for BayesNetGenerator {

    fn default() -> Self {
        BayesNetGenerator { num_nodes: 10, num_arcs: 10, cardinality: 2, seed: None, estimator: SimpleEstimator::default() }
    }

}


impl BayesNetGenerator {

    pub fn new(num_nodes: usize, num_arcs: usize, cardinality: usize) -> Self {
        BayesNetGenerator { num_nodes, num_arcs, cardinality, ..BayesNetGenerator::default() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_estimator(mut self, estimator: SimpleEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Check the node, arc and cardinality settings
    pub fn validate(&self) -> Result<()> {
        let n = self.num_nodes;
        if n == 0 {
            return Err(BayesNetError::InvalidOption(String::from("a network needs at least one node")));
        }
        if self.num_arcs < n - 1 || self.num_arcs > n * (n - 1) / 2 {
            return Err(BayesNetError::InvalidOption(
                format!("{} arcs cannot connect {} nodes without a cycle", self.num_arcs, n)
            ));
        }
        if self.cardinality < 2 {
            return Err(BayesNetError::InvalidOption(String::from("nodes need at least two values")));
        }
        self.estimator.validate()
    }

    /// Generate a network with random structure and tables. The network's dataset has the
    /// generated header and no rows.
    pub fn generate(&self) -> Result<BayesNet> {
        self.validate()?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy()
        };

        let mut network = BayesNet::with_estimator(self.header()?, self.estimator)?;
        self.generate_structure(&mut network, &mut rng)?;
        self.generate_distributions(&mut network, &mut rng)?;

        debug!("generated a random network with {} nodes and {} arcs", self.num_nodes, network.num_arcs());
        Ok(network)
    }

    fn header(&self) -> Result<Instances> {
        let values: Vec<String> = (1..=self.cardinality).map(|v| format!("Value{}", v)).collect();
        let attributes = (1..=self.num_nodes)
            .map(|i| Attribute::nominal(&format!("Node{}", i), &values))
            .collect::<Result<Vec<Attribute>>>()?;

        let mut instances = Instances::new("RandomNet", attributes)?;
        instances.set_class_index(Some(self.num_nodes - 1))?;
        Ok(instances)
    }

    fn generate_structure<R: Rng>(&self, network: &mut BayesNet, rng: &mut R) -> Result<()> {
        let n = self.num_nodes;
        if n < 2 {
            return Ok(());
        }

        // a random spanning tree: join a random connected node to a random unconnected one
        let mut connected = vec![rng.gen_range(0..n)];
        let mut unconnected: Vec<usize> = (0..n).filter(|&i| i != connected[0]).collect();
        while ! unconnected.is_empty() {
            let a = connected[rng.gen_range(0..connected.len())];
            let b = unconnected.swap_remove(rng.gen_range(0..unconnected.len()));
            network.add_parent(a.max(b), a.min(b))?;
            connected.push(b);
        }

        // the rest of the arcs, from the pairs the tree left free
        let mut free: Vec<(usize, usize)> = (0..n)
            .flat_map(|tail| (tail + 1..n).map(move |head| (tail, head)))
            .filter(|&(tail, head)| ! network.is_arc(tail, head))
            .collect();
        free.shuffle(rng);

        for &(tail, head) in free.iter().take(self.num_arcs - (n - 1)) {
            network.add_parent(head, tail)?;
        }

        Ok(())
    }

    fn generate_distributions<R: Rng>(&self, network: &mut BayesNet, rng: &mut R) -> Result<()> {
        network.init_cpts()?;
        let k = self.cardinality;

        for node in 0..network.num_nodes() {
            let configs = network.parent_cardinality(node);

            // k - 1 random cut points in [0, 1000) per configuration; the gaps are the weights
            let cuts = Array2::random_using((configs, k - 1), Uniform::new(0.0, 1000.0), rng);
            for (config, row) in cuts.outer_iter().enumerate() {
                let mut points: Vec<f64> = row.to_vec();
                points.sort_by(|a, b| a.total_cmp(b));
                points.insert(0, 0.0);
                points.push(1000.0);

                let cell = network.cpt_mut(node, config)?;
                for (value, gap) in points.windows(2).map(|w| w[1] - w[0]).enumerate() {
                    cell.add_value(value as f64, gap)?;
                }
            }
        }

        Ok(())
    }

}
