//! Tabu search: hill climbing that keeps moving past local optima, forbidding the moves that
//! would undo its recent steps.

use super::{Cache, LocalScore, Operation};
use crate::model::{BayesNet, ParentSet};
use crate::search::{SearchAlgorithm, SearchOptions};
use crate::util::{BayesNetError, Result};

use log::{debug, warn};
use serde::{Deserialize, Serialize};


/// Performs `runs` single-arc edits, each the best one not in the tabu list, and ends with the
/// best structure seen along the way.
///
/// The tabu list holds the last `tabu_length` edits. An edit is tabu when it repeats one of
/// them or undoes one of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabuSearch {

    options: SearchOptions,

    score: LocalScore,

    runs: usize,

    tabu_length: usize,

    use_arc_reversal: bool,

    #[serde(skip)]
    performed: Vec<Operation>
}


impl Default for TabuSearch {

    fn default() -> Self {
        TabuSearch {
            options: SearchOptions::default(),
            score: LocalScore::default(),
            runs: 100,
            tabu_length: 5,
            use_arc_reversal: true,
            performed: Vec::new()
        }
    }

}


impl TabuSearch {

    pub fn new(options: SearchOptions, score: LocalScore) -> Self {
        TabuSearch { options, score, ..TabuSearch::default() }
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_tabu_length(mut self, tabu_length: usize) -> Self {
        self.tabu_length = tabu_length;
        self
    }

    pub fn with_arc_reversal(mut self, use_arc_reversal: bool) -> Self {
        self.use_arc_reversal = use_arc_reversal;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn tabu_length(&self) -> usize {
        self.tabu_length
    }

    /// The edits made by the last search, in order. The structure it ended with may predate the
    /// last of them.
    pub fn performed_operations(&self) -> &[Operation] {
        &self.performed
    }

    /// Walk from the current structure, recording the best structure seen in `best`
    fn walk(&mut self, network: &mut BayesNet, best: &mut (f64, Vec<ParentSet>)) -> Result<()> {
        let mut cache = Cache::new(&self.score, network)?;
        let mut current = best.0;
        let mut tabu: Vec<Option<Operation>> = vec![None; self.tabu_length];
        let mut oldest = 0;

        for run in 0..self.runs {
            let is_not_tabu = |op: &Operation| {
                tabu.iter().flatten().all(|t| ! t.same_move(op) && ! t.undone_by(op))
            };

            let op = match cache.optimal_operation(network, self.options.max_parents(), self.use_arc_reversal, is_not_tabu) {
                Some(op) => op,
                None => {
                    warn!("tabu search: no admissible operation left after {} of {} runs", run, self.runs);
                    break;
                }
            };

            cache.perform(&self.score, network, &op)?;
            self.performed.push(op);
            current += op.delta;

            tabu[oldest] = Some(op);
            oldest = (oldest + 1) % self.tabu_length;

            if current > best.0 {
                *best = (current, network.parent_sets().to_vec());
            }
        }

        Ok(())
    }

}


impl SearchAlgorithm for TabuSearch {

    fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn validate(&self) -> Result<()> {
        self.options.validate()?;
        self.score.validate()?;
        if self.tabu_length == 0 {
            return Err(BayesNetError::InvalidOption(String::from("tabu_length must be at least 1")));
        }
        Ok(())
    }

    fn search(&mut self, network: &mut BayesNet) -> Result<()> {
        self.performed.clear();

        let mut best = (self.score.network_score(network)?, network.parent_sets().to_vec());
        let outcome = self.walk(network, &mut best);

        // the best structure is restored even when the walk failed
        debug!("tabu search: {} operations, best score {}", self.performed.len(), best.0);
        network.set_parent_sets(best.1)?;
        outcome
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::{Attribute, Instance, Instances};
    use crate::search::local::HillClimber;

    /// Four binary nodes where `b` copies `a` and `d` copies `c`, most of the time
    fn network() -> BayesNet {
        let mut data = Instances::new("pairs", vec![
            Attribute::nominal("a", &["0", "1"]).unwrap(),
            Attribute::nominal("b", &["0", "1"]).unwrap(),
            Attribute::nominal("c", &["0", "1"]).unwrap(),
            Attribute::nominal("d", &["0", "1"]).unwrap(),
        ]).unwrap();
        data.set_class_index(Some(0)).unwrap();

        for i in 0..60 {
            let a = (i % 2) as f64;
            let c = ((i / 3) % 2) as f64;
            let b = if i % 7 == 0 { 1.0 - a } else { a };
            let d = if i % 5 == 0 { 1.0 - c } else { c };
            data.add(Instance::new(vec![a, b, c, d])).unwrap();
        }
        BayesNet::new(data).unwrap()
    }

    fn options() -> SearchOptions {
        SearchOptions::default().with_init_as_naive_bayes(false)
    }

    #[test]
    /// Test that no edit repeats or undoes one of the edits in the tabu list before it
    fn non_repetition() {
        let mut net = network();
        let mut search = TabuSearch::new(options(), LocalScore::default()).with_runs(30).with_tabu_length(3);
        search.build_structure(&mut net).unwrap();

        let ops = search.performed_operations();
        assert!(! ops.is_empty());
        for (i, op) in ops.iter().enumerate() {
            for earlier in ops[i.saturating_sub(3)..i].iter() {
                assert!(! earlier.same_move(op), "{} repeats {}", op, earlier);
                assert!(! earlier.undone_by(op), "{} undoes {}", op, earlier);
            }
        }
        assert!(net.topological_order().is_ok());
    }

    #[test]
    /// Test that tabu search ends at least as good as hill climbing
    fn beats_hill_climbing() {
        let score = LocalScore::default();

        let mut climbed = network();
        HillClimber::new(options(), score).build_structure(&mut climbed).unwrap();

        let mut tabu = network();
        TabuSearch::new(options(), score).build_structure(&mut tabu).unwrap();

        let climbed = score.network_score(&climbed).unwrap();
        let tabu = score.network_score(&tabu).unwrap();
        assert!(tabu >= climbed - 1e-9);
    }

    #[test]
    /// Test that a search with no legal move stops and keeps the structure
    fn stuck() {
        let mut data = Instances::new("single", vec![Attribute::nominal("a", &["0", "1"]).unwrap()]).unwrap();
        data.add(Instance::new(vec![0.0])).unwrap();
        let mut net = BayesNet::new(data).unwrap();

        let mut search = TabuSearch::new(options(), LocalScore::default());
        search.build_structure(&mut net).unwrap();
        assert!(search.performed_operations().is_empty());
        assert_eq!(0, net.num_arcs());
    }

    #[test]
    fn invalid_options() {
        let mut net = network();
        let mut search = TabuSearch::default().with_tabu_length(0);
        assert!(search.build_structure(&mut net).is_err());
        assert_eq!(0, net.num_arcs());
    }
}
