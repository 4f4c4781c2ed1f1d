//! Defines a `BayesNet`, a Bayesian network over the discrete columns of a dataset.

use super::parent_set::ParentSet;
use crate::data::{is_missing, Instance, Instances};
use crate::estimators::{BayesNetEstimator, DiscreteEstimator, ScoreType, SimpleEstimator};
use crate::filters::{Discretize, Filter};
use crate::search::SearchAlgorithm;
use crate::util::{BayesNetError, Result};

use itertools::Itertools;
use log::debug;

use std::fmt::Write;


/// A Bayesian network learned from a dataset.
///
/// # Representation
/// Node `i` is column `i` of the dataset the network was built over. The graph is held as one
/// `ParentSet` per node; the arc `p -> i` exists when `p` is in the parent set of `i`.
///
/// The conditional probability tables are stored flat: the cells of node `i` occupy
/// `cpts[offsets[i]..offsets[i + 1]]`, one `DiscreteEstimator` per configuration of its parents.
/// The tables are only valid for the structure they were allocated for, so any structural edit
/// after `init_cpts` must be followed by another `init_cpts` (or `estimate_cpts`) before the
/// network can be queried.
#[derive(Clone, Debug)]
pub struct BayesNet {

    /// The name of the network, taken from the dataset's relation
    name: String,

    /// The training data. Every column is discrete.
    instances: Instances,

    /// The parents of each node
    parent_sets: Vec<ParentSet>,

    /// The CPT cells of all nodes, node by node
    cpts: Vec<DiscreteEstimator>,

    /// The index in `cpts` of the first cell of each node, plus one past the end
    offsets: Vec<usize>,

    /// The parent lists the current tables were allocated for
    fitted: Option<Vec<Vec<usize>>>,

    /// Fills the tables
    estimator: SimpleEstimator
}


impl BayesNet {

    /// Construct an empty network (no arcs, no tables) over `instances`.
    ///
    /// # Errors
    /// `NotNominal` if a column is numeric; discretize first (see `normalize_dataset`)
    pub fn new(instances: Instances) -> Result<Self> {
        BayesNet::with_estimator(instances, SimpleEstimator::default())
    }

    /// Construct an empty network that fills its tables with `estimator`
    pub fn with_estimator(instances: Instances, estimator: SimpleEstimator) -> Result<Self> {
        if let Some(attr) = instances.attributes().find(|a| a.is_numeric()) {
            return Err(BayesNetError::NotNominal(String::from(attr.name())));
        }

        let parent_sets = (0..instances.num_attributes()).map(ParentSet::new).collect();
        Ok(BayesNet {
            name: String::from(instances.relation_name()),
            instances,
            parent_sets,
            cpts: Vec::new(),
            offsets: Vec::new(),
            fitted: None,
            estimator
        })
    }

    /// Learn a network from raw data: normalize the data, build the structure with `search`, and
    /// estimate the tables with `estimator`.
    ///
    /// # Args
    /// * `instances`: the training data; must designate a class
    /// * `search`: the structure learning algorithm
    /// * `estimator`: fills the conditional probability tables
    pub fn learn<S>(instances: &Instances, search: &mut S, estimator: SimpleEstimator) -> Result<Self>
        where S: SearchAlgorithm + ?Sized
    {
        let data = BayesNet::normalize_dataset(instances.clone())?;
        let mut network = BayesNet::with_estimator(data, estimator)?;

        debug!("learning the structure of `{}` over {} nodes and {} instances",
               network.name, network.num_nodes(), network.instances.num_instances());

        search.build_structure(&mut network)?;
        network.estimate_cpts()?;

        debug!("learned `{}` with {} arcs", network.name, network.num_arcs());
        Ok(network)
    }

    /// Prepare a dataset for structure learning: drop the rows with a missing class, discretize
    /// every numeric column against the class, and reject any remaining missing value.
    ///
    /// # Errors
    /// * `NoClass` if `instances` has no class column
    /// * `NotNominal` if the class column is numeric
    /// * `MissingValue` if a non-class cell is missing
    pub fn normalize_dataset(mut instances: Instances) -> Result<Instances> {
        instances.delete_with_missing_class()?;
        let class = instances.class_attribute()?;
        if class.is_numeric() {
            return Err(BayesNetError::NotNominal(String::from(class.name())));
        }

        if instances.attributes().any(|a| a.is_numeric()) {
            let mut filter = Discretize::default();
            instances = filter.fit_transform(&instances)?;
        }

        for instance in instances.iter() {
            if let Some(att) = (0..instance.num_values()).find(|&i| instance.is_missing(i)) {
                let attr = instances.attribute(att)?;
                return Err(BayesNetError::MissingValue(String::from(attr.name())));
            }
        }

        Ok(instances)
    }

    /// Map a raw row onto this network's columns: the cell of every column whose labels describe
    /// numeric ranges is replaced by the index of the range containing it. Missing cells stay
    /// missing.
    ///
    /// # Errors
    /// `WidthMismatch` for a row of the wrong width, `NoMatchingBin` for a value no range covers
    pub fn normalize_instance(&self, instance: &Instance) -> Result<Instance> {
        self.check_width(instance)?;

        let mut normalized = instance.clone();
        for (i, attr) in self.instances.attributes().enumerate() {
            let value = instance[i];
            if ! attr.has_ranges() || is_missing(value) {
                continue;
            }

            let bin = attr.bin_of(value).ok_or_else(|| BayesNetError::NoMatchingBin {
                attribute: String::from(attr.name()),
                value
            })?;
            normalized.set_value(i, bin as f64)?;
        }

        Ok(normalized)
    }


    ///////////////////////////////////////////////////////////////////////////////////////////
    // Structure

    /// Make `parent` a parent of `node`, appended to its parent order. No cycle check is made;
    /// see `add_arc`.
    pub fn add_parent(&mut self, node: usize, parent: usize) -> Result<()> {
        let width = self.parent_sets.len();
        self.parent_sets
            .get_mut(node)
            .ok_or(BayesNetError::AttributeOutOfRange { index: node, width })?
            .add_parent(parent, &self.instances)
    }

    /// Make `parent` a parent of `node` at `position` in its parent order
    pub fn add_parent_at(&mut self, node: usize, parent: usize, position: usize) -> Result<()> {
        let width = self.parent_sets.len();
        self.parent_sets
            .get_mut(node)
            .ok_or(BayesNetError::AttributeOutOfRange { index: node, width })?
            .add_parent_at(parent, position, &self.instances)
    }

    /// Remove `parent` from the parents of `node`, returning the position it held
    pub fn delete_parent(&mut self, node: usize, parent: usize) -> Result<usize> {
        let width = self.parent_sets.len();
        self.parent_sets
            .get_mut(node)
            .ok_or(BayesNetError::AttributeOutOfRange { index: node, width })?
            .delete_parent(parent, &self.instances)
    }

    /// Remove the most recently added parent of `node`
    pub fn delete_last_parent(&mut self, node: usize) -> Option<usize> {
        let instances = &self.instances;
        self.parent_sets.get_mut(node).and_then(|s| s.delete_last_parent(instances))
    }

    /// Add the arc `tail -> head`.
    ///
    /// # Errors
    /// `Cycle` if the arc would close a directed cycle, along with every error of
    /// `ParentSet::add_parent`
    pub fn add_arc(&mut self, tail: usize, head: usize) -> Result<()> {
        if tail < self.num_nodes() && head < self.num_nodes() && ! self.is_acyclic_with(Some((tail, head)), None) {
            return Err(BayesNetError::Cycle { tail, head });
        }
        self.add_parent(head, tail)
    }

    /// Remove every arc
    pub fn clear_structure(&mut self) {
        self.parent_sets = (0..self.num_nodes()).map(ParentSet::new).collect();
    }

    pub fn parent_set(&self, node: usize) -> Option<&ParentSet> {
        self.parent_sets.get(node)
    }

    pub fn parent_sets(&self) -> &[ParentSet] {
        &self.parent_sets
    }

    /// Replace the whole structure, e.g. to restore a snapshot taken with `parent_sets`
    ///
    /// # Errors
    /// `WidthMismatch` if there is not one set per node, `General` if a set belongs to another
    /// node
    pub fn set_parent_sets(&mut self, parent_sets: Vec<ParentSet>) -> Result<()> {
        if parent_sets.len() != self.num_nodes() {
            return Err(BayesNetError::WidthMismatch { expected: self.num_nodes(), found: parent_sets.len() });
        }
        if let Some((i, s)) = parent_sets.iter().enumerate().find(|&(i, s)| s.node() != i) {
            return Err(BayesNetError::General(format!("parent set of node {} placed at node {}", s.node(), i)));
        }

        self.parent_sets = parent_sets;
        Ok(())
    }

    /// Whether the graph, with `extra` added and `ignore` removed (each given as
    /// `(tail, head)`), is acyclic.
    ///
    /// Peels off, one at a time, a node whose parents have all been peeled. The graph is acyclic
    /// exactly when every node gets peeled.
    pub(crate) fn is_acyclic_with(&self, extra: Option<(usize, usize)>, ignore: Option<(usize, usize)>) -> bool {
        self.peel_order(extra, ignore).len() == self.num_nodes()
    }

    fn peel_order(&self, extra: Option<(usize, usize)>, ignore: Option<(usize, usize)>) -> Vec<usize> {
        let n = self.num_nodes();
        let mut done = vec![false; n];
        let mut order = Vec::with_capacity(n);

        for _ in 0..n {
            let next = (0..n).find(|&node| {
                if done[node] {
                    return false;
                }

                let resolved = self.parent_sets[node]
                    .parents()
                    .iter()
                    .filter(|&&p| ignore != Some((p, node)))
                    .all(|&p| done[p]);

                let extra_resolved = match extra {
                    Some((tail, head)) if head == node => done[tail],
                    _ => true
                };

                resolved && extra_resolved
            });

            match next {
                Some(node) => {
                    done[node] = true;
                    order.push(node);
                },
                None => break
            }
        }

        order
    }

    /// An order of the nodes in which every node comes after its parents.
    ///
    /// # Errors
    /// `Cycle` naming one arc on a directed cycle
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let order = self.peel_order(None, None);
        if order.len() == self.num_nodes() {
            return Ok(order);
        }

        // every unpeeled node has an unpeeled parent
        let mut peeled = vec![false; self.num_nodes()];
        for &node in order.iter() {
            peeled[node] = true;
        }

        let (head, tail) = (0..self.num_nodes())
            .filter(|&node| ! peeled[node])
            .filter_map(|node| self.parent_sets[node].parents().iter().find(|&&p| ! peeled[p]).map(|&p| (node, p)))
            .next()
            .ok_or_else(|| BayesNetError::General(String::from("inconsistent topological peel")))?;
        Err(BayesNetError::Cycle { tail, head })
    }


    ///////////////////////////////////////////////////////////////////////////////////////////
    // Conditional probability tables

    /// Allocate empty tables for the current structure, one cell per (node, parent
    /// configuration), each seeded with `prior`
    pub(crate) fn allocate_cpts(&mut self, prior: f64) {
        let mut cpts = Vec::new();
        let mut offsets = Vec::with_capacity(self.num_nodes() + 1);

        for (node, set) in self.parent_sets.iter().enumerate() {
            offsets.push(cpts.len());
            let k = self.cardinality(node);
            cpts.extend((0..set.cardinality_of_parents()).map(|_| DiscreteEstimator::new(k, prior)));
        }
        offsets.push(cpts.len());

        self.cpts = cpts;
        self.offsets = offsets;
        self.fitted = Some(self.parent_sets.iter().map(|s| s.parents().to_vec()).collect());
    }

    /// Verify that the tables match the current structure.
    ///
    /// # Errors
    /// `NotFitted` if the tables were never allocated, or the structure changed since
    pub fn check_fitted(&self) -> Result<()> {
        match self.fitted {
            Some(ref fitted) if fitted.len() == self.parent_sets.len()
                && fitted.iter().zip(self.parent_sets.iter()).all(|(f, s)| f.as_slice() == s.parents()) => Ok(()),
            _ => Err(BayesNetError::NotFitted)
        }
    }

    fn cpt_index(&self, node: usize, config: usize) -> Result<usize> {
        self.check_fitted()?;
        let set = self.parent_sets
            .get(node)
            .ok_or(BayesNetError::AttributeOutOfRange { index: node, width: self.num_nodes() })?;

        if config >= set.cardinality_of_parents() {
            return Err(BayesNetError::InvalidSymbol {
                symbol: config as f64,
                cardinality: set.cardinality_of_parents()
            });
        }
        Ok(self.offsets[node] + config)
    }

    /// The table cell of `node` under parent configuration `config`
    pub fn cpt(&self, node: usize, config: usize) -> Result<&DiscreteEstimator> {
        let index = self.cpt_index(node, config)?;
        Ok(&self.cpts[index])
    }

    /// Mutable access to the table cell of `node` under parent configuration `config`
    pub fn cpt_mut(&mut self, node: usize, config: usize) -> Result<&mut DiscreteEstimator> {
        let index = self.cpt_index(node, config)?;
        Ok(&mut self.cpts[index])
    }

    /// The probability that `node` takes `symbol` under parent configuration `config`
    pub fn probability(&self, node: usize, config: usize, symbol: usize) -> Result<f64> {
        self.cpt(node, config)?.probability(symbol as f64)
    }

    /// The index of the configuration of the parents of `node` observed in `instance`:
    /// `sum_i v_i * prod_{j > i} card(p_j)` over the parents `p_i` in order.
    ///
    /// # Errors
    /// `MissingValue` if a parent's cell is missing, `InvalidSymbol` if it is out of range
    pub fn parent_configuration(&self, node: usize, instance: &Instance) -> Result<usize> {
        let set = self.parent_sets
            .get(node)
            .ok_or(BayesNetError::AttributeOutOfRange { index: node, width: self.num_nodes() })?;

        let mut config = 0;
        for &p in set.parents() {
            let value = self.observed_value(p, instance)?;
            config = config * self.cardinality(p) + value;
        }
        Ok(config)
    }

    /// The observed symbol of `node` in `instance`
    pub(crate) fn observed_value(&self, node: usize, instance: &Instance) -> Result<usize> {
        let attr = self.instances.attribute(node)?;
        let value = instance.get(node).ok_or(BayesNetError::WidthMismatch {
            expected: self.num_nodes(),
            found: instance.num_values()
        })?;

        if is_missing(value) {
            return Err(BayesNetError::MissingValue(String::from(attr.name())));
        }
        if value.fract() != 0.0 || value < 0.0 || value >= attr.num_values() as f64 {
            return Err(BayesNetError::InvalidSymbol { symbol: value, cardinality: attr.num_values() });
        }
        Ok(value as usize)
    }

    pub(crate) fn check_width(&self, instance: &Instance) -> Result<()> {
        if instance.num_values() == self.num_nodes() {
            Ok(())
        } else {
            Err(BayesNetError::WidthMismatch { expected: self.num_nodes(), found: instance.num_values() })
        }
    }

    pub fn estimator(&self) -> SimpleEstimator {
        self.estimator
    }

    pub fn set_estimator(&mut self, estimator: SimpleEstimator) {
        self.estimator = estimator;
    }

    /// Allocate empty tables for the current structure
    pub fn init_cpts(&mut self) -> Result<()> {
        let estimator = self.estimator;
        estimator.init_cpts(self)
    }

    /// Allocate the tables and count every training row into them
    pub fn estimate_cpts(&mut self) -> Result<()> {
        let estimator = self.estimator;
        estimator.estimate_cpts(self)
    }

    /// Count `instance` into the tables. A negative weight withdraws it.
    pub fn update_classifier(&mut self, instance: &Instance) -> Result<()> {
        let estimator = self.estimator;
        estimator.update_classifier(self, instance)
    }

    /// The posterior distribution of the class given the other cells of `instance`
    pub fn distribution_for_instance(&self, instance: &Instance) -> Result<Vec<f64>> {
        self.estimator.distribution_for_instance(self, instance)
    }

    /// The most probable class of `instance`. Ties go to the lowest symbol.
    pub fn classify_instance(&self, instance: &Instance) -> Result<f64> {
        let dist = self.distribution_for_instance(instance)?;
        let best = dist
            .iter()
            .enumerate()
            .fold(0, |best, (i, &p)| if p > dist[best] { i } else { best });
        Ok(best as f64)
    }

    /// For each class value, the product over all nodes of the count of the node's value in the
    /// cell selected by `instance` with that class value substituted
    pub fn counts_for_instance(&self, instance: &Instance) -> Result<Vec<f64>> {
        self.check_fitted()?;
        self.check_width(instance)?;
        let class = self.class_index().ok_or(BayesNetError::NoClass)?;

        let mut labelled = instance.clone();
        let mut counts = Vec::with_capacity(self.cardinality(class));
        for c in 0..self.cardinality(class) {
            labelled.set_value(class, c as f64)?;

            let mut product = 1.0;
            for node in 0..self.num_nodes() {
                let config = self.parent_configuration(node, &labelled)?;
                let value = self.observed_value(node, &labelled)?;
                product *= self.cpt(node, config)?.count(value as f64)?;
            }
            counts.push(product);
        }

        Ok(counts)
    }

    /// The score of the fitted network under `score_type`: the sum over all cells, less the
    /// complexity penalty of every node for `Mdl` and `Aic`.
    pub fn log_score(&self, score_type: ScoreType) -> Result<f64> {
        self.check_fitted()?;
        let n = self.instances.sum_of_weights();

        let mut score = 0.0;
        for (node, set) in self.parent_sets.iter().enumerate() {
            let card = set.cardinality_of_parents();
            for config in 0..card {
                score += self.cpt(node, config)?.log_score(score_type, card)?;
            }

            let free = (card * (self.cardinality(node).max(1) - 1)) as f64;
            match score_type {
                ScoreType::Mdl if n > 0.0 => score -= 0.5 * free * n.ln(),
                ScoreType::Aic => score -= free,
                _ => ()
            }
        }

        Ok(score)
    }


    ///////////////////////////////////////////////////////////////////////////////////////////
    // Read accessors

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instances(&self) -> &Instances {
        &self.instances
    }

    pub fn num_nodes(&self) -> usize {
        self.parent_sets.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.parent_sets.iter().map(|s| s.num_parents()).sum()
    }

    pub fn class_index(&self) -> Option<usize> {
        self.instances.class_index()
    }

    /// The name of `node`, if there is such a node
    pub fn node_name(&self, node: usize) -> Option<&str> {
        self.instances.attribute(node).ok().map(|a| a.name())
    }

    /// The index of the node called `name`
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.instances.attribute_by_name(name).map(|(i, _)| i)
    }

    /// The number of values of `node`, or 0 if there is no such node
    pub fn cardinality(&self, node: usize) -> usize {
        self.instances.attribute(node).map_or(0, |a| a.num_values())
    }

    /// The label of value `value` of `node`
    pub fn node_value(&self, node: usize, value: usize) -> Option<&str> {
        self.instances.attribute(node).ok().and_then(|a| a.value(value))
    }

    pub fn num_parents(&self, node: usize) -> usize {
        self.parent_sets.get(node).map_or(0, |s| s.num_parents())
    }

    /// The `k`-th parent of `node`
    pub fn parent(&self, node: usize, k: usize) -> Option<usize> {
        self.parent_sets.get(node).and_then(|s| s.parent(k))
    }

    pub fn parent_cardinality(&self, node: usize) -> usize {
        self.parent_sets.get(node).map_or(1, |s| s.cardinality_of_parents())
    }

    /// Whether the arc `tail -> head` is present
    pub fn is_arc(&self, tail: usize, head: usize) -> bool {
        self.parent_sets.get(head).map_or(false, |s| s.contains(tail))
    }

    /// Render the graph in Graphviz dot syntax
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let quote = |s: &str| format!("\"{}\"", s.replace('"', "\\\""));

        // writing to a String cannot fail
        let _ = writeln!(dot, "digraph {} {{", quote(&self.name));
        for attr in self.instances.attributes() {
            let _ = writeln!(dot, "  {};", quote(attr.name()));
        }
        for (node, set) in self.parent_sets.iter().enumerate() {
            let head = quote(self.node_name(node).unwrap_or_default());
            for &p in set.parents() {
                let _ = writeln!(dot, "  {} -> {};", quote(self.node_name(p).unwrap_or_default()), head);
            }
        }
        dot.push_str("}\n");
        dot
    }

}


impl std::fmt::Display for BayesNet {

    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Bayes network `{}`: {} nodes, {} arcs", self.name, self.num_nodes(), self.num_arcs())?;
        for (node, set) in self.parent_sets.iter().enumerate() {
            let parents = set.parents().iter().map(|&p| self.node_name(p).unwrap_or_default()).join(", ");
            writeln!(f, "  {} <- [{}]", self.node_name(node).unwrap_or_default(), parents)?;
        }
        Ok(())
    }

}
