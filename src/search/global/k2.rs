//! K2 driven by the cross-validated accuracy of the whole network.

use super::GlobalScore;
use crate::model::BayesNet;
use crate::search::{add_arc_makes_sense, k2_order, SearchAlgorithm, SearchOptions};
use crate::util::Result;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};


/// K2 driven by the cross-validated accuracy of the whole network: a node takes the predecessor
/// that raises the accuracy above the best seen so far, until none does or it has
/// `max_parents`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct K2 {
    options: SearchOptions,
    score: GlobalScore,
    random_order: bool,
    seed: u64
}


impl Default for K2 {

    fn default() -> Self {
        K2 {
            options: SearchOptions::default(),
            score: GlobalScore::default(),
            random_order: false,
            seed: 1
        }
    }

}


impl K2 {

    pub fn new(options: SearchOptions, score: GlobalScore) -> Self {
        K2 { options, score, ..K2::default() }
    }

    pub fn with_random_order(mut self, seed: u64) -> Self {
        self.random_order = true;
        self.seed = seed;
        self
    }

    pub fn score(&self) -> &GlobalScore {
        &self.score
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
        let n = network.num_nodes();
        let pin_class = self.options.init_as_naive_bayes();
        let order = if self.random_order {
            let mut rng = StdRng::seed_from_u64(self.seed);
            k2_order(n, network.class_index(), pin_class, Some(&mut rng))
        } else {
            k2_order::<StdRng>(n, network.class_index(), pin_class, None)
        };

        let mut base_score = self.score.score(network)?;
        debug!("global k2: order {:?}, base score {}", order, base_score);

        for (i, &node) in order.iter().enumerate().skip(1) {
            let mut best_score = base_score;

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
                        trace!("global k2: {} -> {} (accuracy {})", parent, node, best_score);
                        network.add_parent(node, parent)?;
                        base_score = best_score;
                    },
                    None => break
                }
            }
        }

        Ok(())
    }

}
