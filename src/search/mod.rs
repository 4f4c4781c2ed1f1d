//! Structure learning: the `SearchAlgorithm` strategy trait, the options and legality checks
//! shared by all searches, and the local-score and global-score search algorithms.
//!
//! A search borrows a `BayesNet` and edits its parent sets in place. Whatever happens, the
//! network is left acyclic, and no speculative edit survives an error.

use crate::model::BayesNet;
use crate::util::{BayesNetError, Result};

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod global;
pub mod local;


/// Options shared by every search algorithm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {

    /// The largest number of parents a node may get from the search
    max_parents: usize,

    /// Start from the naive Bayes structure: the class is a parent of every other node
    init_as_naive_bayes: bool,

    /// After the search, connect every node to the Markov blanket of the class
    markov_blanket_classifier: bool,

    /// The Markov blanket correction stops giving the class new parents once its parent
    /// configurations number this many
    max_class_cardinality: usize
}


impl Default for SearchOptions {

    fn default() -> Self {
        SearchOptions {
            max_parents: 2,
            init_as_naive_bayes: true,
            markov_blanket_classifier: false,
            max_class_cardinality: 1024
        }
    }

}


impl SearchOptions {

    pub fn with_max_parents(mut self, max_parents: usize) -> Self {
        self.max_parents = max_parents;
        self
    }

    pub fn with_init_as_naive_bayes(mut self, init_as_naive_bayes: bool) -> Self {
        self.init_as_naive_bayes = init_as_naive_bayes;
        self
    }

    pub fn with_markov_blanket_classifier(mut self, markov_blanket_classifier: bool) -> Self {
        self.markov_blanket_classifier = markov_blanket_classifier;
        self
    }

    pub fn with_max_class_cardinality(mut self, max_class_cardinality: usize) -> Self {
        self.max_class_cardinality = max_class_cardinality;
        self
    }

    pub fn max_parents(&self) -> usize {
        self.max_parents
    }

    pub fn init_as_naive_bayes(&self) -> bool {
        self.init_as_naive_bayes
    }

    pub fn markov_blanket_classifier(&self) -> bool {
        self.markov_blanket_classifier
    }

    pub fn max_class_cardinality(&self) -> usize {
        self.max_class_cardinality
    }

    /// # Errors
    /// `InvalidOption` if `max_parents` is zero
    pub fn validate(&self) -> Result<()> {
        if self.max_parents == 0 {
            return Err(BayesNetError::InvalidOption(String::from("max_parents must be at least 1")));
        }
        Ok(())
    }

}


/// A structure learning strategy.
///
/// `search` is the extension point: it edits the structure of the network it is given, reading
/// the training data from the network itself. `build_structure` wraps it with the optional
/// naive Bayes initialization and Markov blanket correction.
pub trait SearchAlgorithm {

    /// The options shared by every search
    fn options(&self) -> &SearchOptions;

    /// Check the options of the search
    fn validate(&self) -> Result<()> {
        self.options().validate()
    }

    /// Improve the structure of `network`. The default does nothing.
    fn search(&mut self, _network: &mut BayesNet) -> Result<()> {
        Ok(())
    }

    /// Learn the structure of `network`: seed it with the naive Bayes arcs (if so configured),
    /// `search`, then apply the Markov blanket correction (if so configured).
    fn build_structure(&mut self, network: &mut BayesNet) -> Result<()> {
        self.validate()?;
        let options = self.options().clone();

        if options.init_as_naive_bayes() {
            init_as_naive_bayes(network)?;
        }

        self.search(network)?;

        if options.markov_blanket_classifier() {
            markov_blanket_correction(network, options.max_class_cardinality())?;
        }

        Ok(())
    }

}


/// The baseline search: the naive Bayes structure and nothing more
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayes {
    options: SearchOptions
}

impl NaiveBayes {

    pub fn new() -> Self {
        NaiveBayes::default()
    }

}

impl SearchAlgorithm for NaiveBayes {

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn build_structure(&mut self, network: &mut BayesNet) -> Result<()> {
        init_as_naive_bayes(network)
    }

}


/// Whether the arc `tail -> head` may be added: it joins two distinct nodes, is not already
/// present, and closes no cycle.
pub fn add_arc_makes_sense(network: &BayesNet, head: usize, tail: usize) -> bool {
    let n = network.num_nodes();
    head != tail
        && head < n
        && tail < n
        && ! network.is_arc(tail, head)
        && network.is_acyclic_with(Some((tail, head)), None)
}

/// Whether the existing arc `tail -> head` may be turned into `head -> tail` without closing a
/// cycle
pub fn reverse_arc_makes_sense(network: &BayesNet, head: usize, tail: usize) -> bool {
    head != tail
        && network.is_arc(tail, head)
        && network.is_acyclic_with(Some((head, tail)), Some((tail, head)))
}

/// Make the class a parent of every other node. Existing class arcs are kept, so this can be
/// applied more than once.
///
/// # Errors
/// `NoClass` if the network's data designates no class
pub fn init_as_naive_bayes(network: &mut BayesNet) -> Result<()> {
    let class = network.class_index().ok_or(BayesNetError::NoClass)?;
    for node in (0..network.num_nodes()).filter(|&n| n != class) {
        if ! network.is_arc(class, node) {
            network.add_parent(node, class)?;
        }
    }
    Ok(())
}

/// The nodes from which the class can be reached along arcs, the class included
fn class_ancestors(network: &BayesNet, class: usize) -> Vec<bool> {
    let mut ancestors = vec![false; network.num_nodes()];
    let mut frontier = vec![class];
    ancestors[class] = true;

    while let Some(node) = frontier.pop() {
        for &p in network.parent_sets()[node].parents() {
            if ! ancestors[p] {
                ancestors[p] = true;
                frontier.push(p);
            }
        }
    }

    ancestors
}

/// Connect every node outside the Markov blanket of the class to the class: an ancestor of the
/// class becomes a parent of it (unless the class already has `max_class_cardinality` parent
/// configurations), any other node becomes a child of it. Neither direction can close a cycle.
pub fn markov_blanket_correction(network: &mut BayesNet, max_class_cardinality: usize) -> Result<()> {
    let class = network.class_index().ok_or(BayesNetError::NoClass)?;
    let ancestors = class_ancestors(network, class);

    for node in 0..network.num_nodes() {
        let in_blanket = node == class
            || network.is_arc(class, node)
            || network.is_arc(node, class)
            || (0..network.num_nodes()).any(|k| network.is_arc(node, k) && network.is_arc(class, k));

        if in_blanket {
            continue;
        }

        if ancestors[node] {
            if network.parent_cardinality(class) < max_class_cardinality {
                debug!("markov blanket correction: {} -> class", node);
                network.add_parent(class, node)?;
            } else {
                trace!("markov blanket correction: class cardinality ceiling reached, {} left out", node);
            }
        } else {
            debug!("markov blanket correction: class -> {}", node);
            network.add_parent(node, class)?;
        }
    }

    Ok(())
}

/// The node order used by K2: the class first, then the others in index order. With an `rng`,
/// one pass of random swaps shuffles the order; when `pin_class` is set the class never moves.
pub(crate) fn k2_order<R: Rng + ?Sized>(num_nodes: usize, class: Option<usize>, pin_class: bool, rng: Option<&mut R>) -> Vec<usize> {
    let mut order: Vec<usize> = class.into_iter().collect();
    order.extend((0..num_nodes).filter(|&n| Some(n) != class));

    if let Some(rng) = rng {
        let pinned = if pin_class && class.is_some() { Some(0) } else { None };
        for i in 0..num_nodes {
            let j = rng.gen_range(0..num_nodes);
            if Some(i) != pinned && Some(j) != pinned {
                order.swap(i, j);
            }
        }
    }

    order
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::{Attribute, Instances};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// An empty network over `n` binary nodes, the last one the class
    fn network(n: usize) -> BayesNet {
        let attributes = (0..n).map(|i| Attribute::nominal(&format!("n{}", i), &["0", "1"]).unwrap()).collect();
        let mut data = Instances::new("empty", attributes).unwrap();
        data.set_class_index(Some(n - 1)).unwrap();
        BayesNet::new(data).unwrap()
    }

    #[test]
    /// Test the legality predicates on a chain 0 -> 1 -> 2
    fn legality() {
        let mut net = network(4);
        net.add_arc(0, 1).unwrap();
        net.add_arc(1, 2).unwrap();

        assert!(add_arc_makes_sense(&net, 2, 0));
        assert!(! add_arc_makes_sense(&net, 0, 2));
        assert!(! add_arc_makes_sense(&net, 1, 0));
        assert!(! add_arc_makes_sense(&net, 1, 1));
        assert!(! add_arc_makes_sense(&net, 7, 1));

        // once 0 -> 2 exists, reversing it closes 2 -> 0 -> 1 -> 2
        assert!(reverse_arc_makes_sense(&net, 1, 0));
        assert!(! reverse_arc_makes_sense(&net, 0, 1));
        net.add_arc(0, 2).unwrap();
        assert!(! reverse_arc_makes_sense(&net, 2, 0));
        assert!(reverse_arc_makes_sense(&net, 2, 1));

        // the checks leave the network untouched
        assert_eq!(3, net.num_arcs());
    }

    #[test]
    /// Test that naive Bayes initialization is idempotent
    fn naive_bayes() {
        let mut net = network(4);
        init_as_naive_bayes(&mut net).unwrap();
        init_as_naive_bayes(&mut net).unwrap();
        assert_eq!(3, net.num_arcs());
        assert!((0..3).all(|n| net.is_arc(3, n)));

        let mut search = NaiveBayes::new();
        let mut other = network(4);
        search.build_structure(&mut other).unwrap();
        assert_eq!(net.parent_sets(), other.parent_sets());
    }

    #[test]
    /// Test the Markov blanket correction on a graph where node 0 is an ancestor of the class
    /// and node 2 is disconnected
    fn markov_blanket() {
        let mut net = network(4);
        net.add_arc(0, 1).unwrap();
        net.add_arc(1, 3).unwrap();

        markov_blanket_correction(&mut net, 1024).unwrap();
        assert!(net.is_arc(0, 3));
        assert!(net.is_arc(3, 2));
        assert!(net.topological_order().is_ok());

        // with the ceiling already reached the ancestor is left out
        let mut capped = network(4);
        capped.add_arc(0, 1).unwrap();
        capped.add_arc(1, 3).unwrap();
        markov_blanket_correction(&mut capped, 2).unwrap();
        assert!(! capped.is_arc(0, 3));
        assert!(capped.is_arc(3, 2));
    }

    #[test]
    fn orders() {
        assert_eq!(vec![2, 0, 1, 3], k2_order::<StdRng>(4, Some(2), true, None));
        assert_eq!(vec![0, 1, 2], k2_order::<StdRng>(3, None, true, None));

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let order = k2_order(6, Some(4), true, Some(&mut rng));
            assert_eq!(4, order[0]);
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(vec![0, 1, 2, 3, 4, 5], sorted);
        }
    }

    #[test]
    fn options() {
        let options = SearchOptions::default().with_max_parents(0);
        assert!(options.validate().is_err());
        assert_eq!(1024, SearchOptions::default().max_class_cardinality());
    }
}
