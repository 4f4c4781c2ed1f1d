//! Greedy hill climbing over arc additions, deletions and reversals, with a cache of the score
//! change of every possible single-arc edit.

use super::LocalScore;
use crate::model::BayesNet;
use crate::search::{add_arc_makes_sense, reverse_arc_makes_sense, SearchAlgorithm, SearchOptions};
use crate::util::Result;

use log::{debug, trace};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use std::fmt;


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Add,
    Delete,
    Reverse
}


/// A single-arc edit of the structure, with the change of score it brings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub tail: usize,
    pub head: usize,
    pub kind: OperationKind,
    pub delta: f64
}


impl Operation {

    pub fn new(tail: usize, head: usize, kind: OperationKind, delta: f64) -> Self {
        Operation { tail, head, kind, delta }
    }

    /// Whether `other` edits the same arc in the same way
    pub fn same_move(&self, other: &Operation) -> bool {
        self.tail == other.tail && self.head == other.head && self.kind == other.kind
    }

    /// Whether performing `other` right after `self` would restore the structure
    pub fn undone_by(&self, other: &Operation) -> bool {
        use self::OperationKind::*;

        match (self.kind, other.kind) {
            (Add, Delete) | (Delete, Add) => self.tail == other.tail && self.head == other.head,
            (Reverse, Reverse) => self.tail == other.head && self.head == other.tail,
            _ => false
        }
    }

}


impl fmt::Display for Operation {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verb = match self.kind {
            OperationKind::Add => "add",
            OperationKind::Delete => "delete",
            OperationKind::Reverse => "reverse"
        };
        write!(f, "{} {} -> {}", verb, self.tail, self.head)
    }

}


/// The score change of every single-arc addition and deletion, indexed `[tail, head]`.
///
/// `add[[t, h]]` holds the change from making `t` a parent of `h`, and is meaningful whenever `t`
/// is not a parent of `h`. `del[[t, h]]` holds the change from removing `t` from the parents of
/// `h`, and is meaningful whenever it is one. A reversal of `t -> h` is the deletion plus the
/// addition of `h -> t`. Only the column of a node whose parents changed needs refreshing.
#[derive(Clone, Debug, PartialEq)]
pub struct Cache {
    add: Array2<f64>,
    del: Array2<f64>
}


impl Cache {

    /// Fill a cache for the current structure of `network`
    pub fn new(score: &LocalScore, network: &BayesNet) -> Result<Self> {
        let n = network.num_nodes();
        let mut cache = Cache { add: Array2::zeros((n, n)), del: Array2::zeros((n, n)) };
        for head in 0..n {
            cache.update(score, network, head)?;
        }
        Ok(cache)
    }

    /// Recompute the entries of `head` after its parents changed
    pub fn update(&mut self, score: &LocalScore, network: &BayesNet, head: usize) -> Result<()> {
        let base = score.node_score(network, head)?;
        for tail in (0..network.num_nodes()).filter(|&t| t != head) {
            if network.is_arc(tail, head) {
                self.del[[tail, head]] = score.score_with_missing_parent(network, head, tail)? - base;
            } else {
                self.add[[tail, head]] = score.score_with_extra_parent(network, head, tail)? - base;
            }
        }
        Ok(())
    }

    /// The cached score change of an edit of the arc `tail -> head`
    pub fn delta(&self, kind: OperationKind, tail: usize, head: usize) -> f64 {
        match kind {
            OperationKind::Add => self.add[[tail, head]],
            OperationKind::Delete => self.del[[tail, head]],
            OperationKind::Reverse => self.del[[tail, head]] + self.add[[head, tail]]
        }
    }

    /// Every legal edit of the current structure of `network`: additions that keep the graph
    /// acyclic and the head under `max_parents`, every deletion, and (if `reversals` is set)
    /// reversals that keep the graph acyclic and the new head under `max_parents`
    pub fn candidates(&self, network: &BayesNet, max_parents: usize, reversals: bool) -> Vec<Operation> {
        let n = network.num_nodes();
        let mut ops = Vec::new();

        for head in (0..n).filter(|&h| network.num_parents(h) < max_parents) {
            for tail in (0..n).filter(|&t| add_arc_makes_sense(network, head, t)) {
                ops.push(Operation::new(tail, head, OperationKind::Add, self.delta(OperationKind::Add, tail, head)));
            }
        }

        for set in network.parent_sets() {
            for &tail in set.parents() {
                let head = set.node();
                ops.push(Operation::new(tail, head, OperationKind::Delete, self.delta(OperationKind::Delete, tail, head)));
            }
        }

        if reversals {
            for set in network.parent_sets() {
                for &tail in set.parents() {
                    let head = set.node();
                    if network.num_parents(tail) < max_parents && reverse_arc_makes_sense(network, head, tail) {
                        let delta = self.delta(OperationKind::Reverse, tail, head);
                        ops.push(Operation::new(tail, head, OperationKind::Reverse, delta));
                    }
                }
            }
        }

        ops
    }

    /// The candidate with the largest score change among those `admissible` accepts. Ties go to
    /// the first found.
    pub fn optimal_operation<F>(&self, network: &BayesNet, max_parents: usize, reversals: bool, admissible: F) -> Option<Operation>
        where F: Fn(&Operation) -> bool
    {
        self.candidates(network, max_parents, reversals)
            .into_iter()
            .filter(|op| admissible(op))
            .fold(None, |best: Option<Operation>, op| match best {
                Some(b) if op.delta <= b.delta => Some(b),
                _ => Some(op)
            })
    }

    /// Apply `op` to `network` and refresh the entries it invalidates
    pub fn perform(&mut self, score: &LocalScore, network: &mut BayesNet, op: &Operation) -> Result<()> {
        trace!("performing {} (delta {})", op, op.delta);

        match op.kind {
            OperationKind::Add => {
                network.add_parent(op.head, op.tail)?;
                self.update(score, network, op.head)
            },
            OperationKind::Delete => {
                network.delete_parent(op.head, op.tail)?;
                self.update(score, network, op.head)
            },
            OperationKind::Reverse => {
                network.delete_parent(op.head, op.tail)?;
                self.update(score, network, op.head)?;
                network.add_parent(op.tail, op.head)?;
                self.update(score, network, op.tail)
            }
        }
    }

}


/// Repeatedly performs the single-arc edit with the largest score increase until none increases
/// the score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimber {

    options: SearchOptions,

    score: LocalScore,

    /// Consider reversing arcs as well as adding and deleting them
    use_arc_reversal: bool,

    #[serde(skip)]
    performed: Vec<Operation>
}


impl Default for HillClimber {

    fn default() -> Self {
        HillClimber {
            options: SearchOptions::default(),
            score: LocalScore::default(),
            use_arc_reversal: true,
            performed: Vec::new()
        }
    }

}


impl HillClimber {

    pub fn new(options: SearchOptions, score: LocalScore) -> Self {
        HillClimber { options, score, ..HillClimber::default() }
    }

    pub fn with_arc_reversal(mut self, use_arc_reversal: bool) -> Self {
        self.use_arc_reversal = use_arc_reversal;
        self
    }

    pub fn score(&self) -> &LocalScore {
        &self.score
    }

    pub fn use_arc_reversal(&self) -> bool {
        self.use_arc_reversal
    }

    /// The edits made by the last search, in order
    pub fn performed_operations(&self) -> &[Operation] {
        &self.performed
    }

}


impl SearchAlgorithm for HillClimber {

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()?;
        self.score.validate()
    }

    fn search(&mut self, network: &mut BayesNet) -> Result<()> {
        self.performed.clear();
        let mut cache = Cache::new(&self.score, network)?;
        let max_parents = self.options.max_parents();

        while let Some(op) = cache.optimal_operation(network, max_parents, self.use_arc_reversal, |_| true) {
            if op.delta <= 0.0 {
                break;
            }

            cache.perform(&self.score, network, &op)?;
            self.performed.push(op);
        }

        debug!("hill climber: {} operations, {} arcs", self.performed.len(), network.num_arcs());
        Ok(())
    }

}
