//! Tree augmented naive Bayes: the naive Bayes structure plus a maximum-score spanning tree
//! over the non-class nodes.

use super::LocalScore;
use crate::model::BayesNet;
use crate::search::{init_as_naive_bayes, markov_blanket_correction, SearchAlgorithm, SearchOptions};
use crate::util::{BayesNetError, Result};

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};


/// Builds a tree augmented naive Bayes structure.
///
/// Every non-class node gets the class as a parent, and at most one other non-class node. The
/// tree links are chosen greedily: first the pair whose link raises the score the most, then
/// repeatedly the best link between a node already in the tree and one outside it. The search
/// always starts from naive Bayes and allows two parents per node, whatever its options say.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tan {
    options: SearchOptions,
    score: LocalScore
}


impl Default for Tan {

    fn default() -> Self {
        Tan::new(LocalScore::default())
    }

}


impl Tan {

    pub fn new(score: LocalScore) -> Self {
        let options = SearchOptions::default().with_max_parents(2).with_init_as_naive_bayes(true);
        Tan { options, score }
    }

    pub fn with_markov_blanket_classifier(mut self, markov_blanket_classifier: bool) -> Self {
        self.options = self.options.with_markov_blanket_classifier(markov_blanket_classifier);
        self
    }

    pub fn score(&self) -> &LocalScore {
        &self.score
    }

    /// The tree links over `nodes`, as `(a, b)` pairs where the score of `b` with the extra
    /// parent `a` decided the link
    fn links(&self, network: &BayesNet, nodes: &[usize]) -> Result<Vec<(usize, usize)>> {
        let n = network.num_nodes();

        let mut base = vec![0.0; n];
        let mut score = Array2::from_elem((n, n), f64::NEG_INFINITY);
        for &head in nodes {
            base[head] = self.score.node_score(network, head)?;
            for &tail in nodes.iter().filter(|&&t| t != head) {
                score[[head, tail]] = self.score.score_with_extra_parent(network, head, tail)?;
            }
        }

        let mut linked = vec![false; n];
        let mut links = Vec::with_capacity(nodes.len() - 1);

        while links.len() + 1 < nodes.len() {
            // after the first link, only links crossing into the tree
            let crossing = ! links.is_empty();

            let mut best: Option<(usize, usize, f64)> = None;
            for &n1 in nodes {
                for &n2 in nodes.iter().filter(|&&n2| n2 != n1) {
                    if crossing && linked[n1] == linked[n2] {
                        continue;
                    }

                    let delta = score[[n1, n2]] - base[n1];
                    if best.map_or(true, |(_, _, d)| delta > d) {
                        best = Some((n2, n1, delta));
                    }
                }
            }

            let (a, b, delta) = best.ok_or_else(|| BayesNetError::General(String::from("no link joins the tree")))?;
            debug!("tan: link {} <-> {} ({})", a, b, delta);
            linked[a] = true;
            linked[b] = true;
            links.push((a, b));
        }

        Ok(links)
    }

}


impl SearchAlgorithm for Tan {

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()?;
        self.score.validate()
    }

    fn build_structure(&mut self, network: &mut BayesNet) -> Result<()> {
        self.validate()?;
        let class = network.class_index().ok_or(BayesNetError::NoClass)?;
        init_as_naive_bayes(network)?;

        let nodes: Vec<usize> = (0..network.num_nodes()).filter(|&i| i != class).collect();
        if nodes.len() < 2 {
            return Ok(());
        }

        let links = self.links(network, &nodes)?;

        // orient the tree so that every node gets at most one tree parent
        let mut has_parent = vec![false; network.num_nodes()];
        for &(a, b) in links.iter() {
            if ! has_parent[a] {
                network.add_parent(a, b)?;
                has_parent[a] = true;
            } else if ! has_parent[b] {
                network.add_parent(b, a)?;
                has_parent[b] = true;
            } else {
                return Err(BayesNetError::TooManyLinks(a));
            }
        }

        if self.options.markov_blanket_classifier() {
            markov_blanket_correction(network, self.options.max_class_cardinality())?;
        }

        Ok(())
    }

}
