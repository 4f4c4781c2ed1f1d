//! The K2 search: greedy parent selection restricted by a node order.

use super::LocalScore;
use crate::model::BayesNet;
use crate::search::{add_arc_makes_sense, k2_order, SearchAlgorithm, SearchOptions};
use crate::util::Result;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};


/// Visits the nodes in order (the class first) and gives each node, one at a time, the
/// predecessor that raises its score the most, until none does or it has `max_parents`.
///
/// Since parents always come earlier in the order the result is acyclic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct K2 {

    options: SearchOptions,

    score: LocalScore,

    /// Shuffle the order before the search. The class stays first when the search starts from
    /// naive Bayes.
    random_order: bool,

    /// Seeds the shuffle
    seed: u64
}


impl Default for K2 {

    fn default() -> Self {
        K2 {
            options: SearchOptions::default(),
            score: LocalScore::default(),
            random_order: false,
            seed: 1
        }
    }

}


impl K2 {

    pub fn new(options: SearchOptions, score: LocalScore) -> Self {
        K2 { options, score, ..K2::default() }
    }

    pub fn with_random_order(mut self, seed: u64) -> Self {
        self.random_order = true;
        self.seed = seed;
        self
    }

    pub fn score(&self) -> &LocalScore {
        &self.score
    }

    /// The order the nodes of `network` are visited in
    pub fn order(&self, network: &BayesNet) -> Vec<usize> {
        let n = network.num_nodes();
        let pin_class = self.options.init_as_naive_bayes();

        if self.random_order {
            let mut rng = StdRng::seed_from_u64(self.seed);
            k2_order(n, network.class_index(), pin_class, Some(&mut rng))
        } else {
            k2_order::<StdRng>(n, network.class_index(), pin_class, None)
        }
    }

}


impl SearchAlgorithm for K2 {

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()?;
        self.score.validate()
    }

    fn search(&mut self, network: &mut BayesNet) -> Result<()> {
        let order = self.order(network);
        debug!("k2: order {:?}", order);

        for (i, &node) in order.iter().enumerate().skip(1) {
            let mut best_score = self.score.node_score(network, node)?;

            while network.num_parents(node) < self.options.max_parents() {
                let mut best = None;
                for &candidate in order[..i].iter() {
                    if ! add_arc_makes_sense(network, node, candidate) {
                        continue;
                    }

                    let score = self.score.score_with_extra_parent(network, node, candidate)?;
                    if score > best_score {
                        best_score = score;
                        best = Some(candidate);
                    }
                }

                match best {
                    Some(parent) => {
                        trace!("k2: {} -> {} (score {})", parent, node, best_score);
                        network.add_parent(node, parent)?;
                    },
                    None => break
                }
            }
        }

        Ok(())
    }

}
