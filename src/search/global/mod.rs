//! Search algorithms driven by a global score: the cross-validated classification accuracy of
//! the whole network.
//!
//! Unlike a local score, the global score of one candidate structure requires fitting the
//! network's tables, so candidates are evaluated by editing the network temporarily and
//! restoring it afterwards.

use crate::data::Instance;
use crate::model::BayesNet;
use crate::util::{BayesNetError, Result};

use serde::{Deserialize, Serialize};

mod k2;

pub use self::k2::K2;


/// How the accuracy of a network is cross-validated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CvType {

    /// Every row is classified by the tables fitted to all the other rows
    #[default]
    LeaveOneOut,

    /// The rows are split into contiguous folds; every fold is classified by the tables fitted
    /// to the other folds
    KFold,

    /// Every row is classified by the tables fitted to the rows before it
    Cumulative
}


/// Scores a network by its cross-validated accuracy at predicting the class: the weighted mean,
/// over the rows, of the probability given to the true class (with `use_prob`) or of whether
/// the predicted class is right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalScore {
    cv_type: CvType,
    folds: usize,
    use_prob: bool
}


impl Default for GlobalScore {

    fn default() -> Self {
        GlobalScore { cv_type: CvType::LeaveOneOut, folds: 10, use_prob: true }
    }

}


impl GlobalScore {

    pub fn new(cv_type: CvType) -> Self {
        GlobalScore { cv_type, ..GlobalScore::default() }
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_use_prob(mut self, use_prob: bool) -> Self {
        self.use_prob = use_prob;
        self
    }

    pub fn cv_type(&self) -> CvType {
        self.cv_type
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    pub fn use_prob(&self) -> bool {
        self.use_prob
    }

    /// # Errors
    /// `InvalidOption` if `folds` is zero
    pub fn validate(&self) -> Result<()> {
        if self.folds == 0 {
            return Err(BayesNetError::InvalidOption(String::from("folds must be at least 1")));
        }
        Ok(())
    }

    /// The cross-validated accuracy of the current structure of `network`. The tables are
    /// refitted along the way; for `Cumulative` they end fitted to all rows as well.
    pub fn score(&self, network: &mut BayesNet) -> Result<f64> {
        self.validate()?;
        match self.cv_type {
            CvType::LeaveOneOut => self.leave_one_out(network),
            CvType::KFold => self.k_fold(network),
            CvType::Cumulative => self.cumulative(network)
        }
    }

    /// The score with `candidate` appended to the parents of `node`, or negative infinity if it
    /// already is a parent. The structure is restored before returning.
    pub fn score_with_extra_parent(&self, network: &mut BayesNet, node: usize, candidate: usize) -> Result<f64> {
        if network.is_arc(candidate, node) {
            return Ok(f64::NEG_INFINITY);
        }

        network.add_parent(node, candidate)?;
        let score = self.score(network);
        network.delete_last_parent(node);
        score
    }

    /// The score with `candidate` removed from the parents of `node`, or negative infinity if it
    /// is not a parent. The structure is restored before returning.
    pub fn score_with_missing_parent(&self, network: &mut BayesNet, node: usize, candidate: usize) -> Result<f64> {
        if ! network.is_arc(candidate, node) {
            return Ok(f64::NEG_INFINITY);
        }

        let position = network.delete_parent(node, candidate)?;
        let score = self.score(network);
        network.add_parent_at(node, candidate, position)?;
        score
    }

    /// The score with the arc `candidate -> node` turned around, or negative infinity if there is
    /// no such arc. The structure is restored before returning.
    pub fn score_with_reversed_parent(&self, network: &mut BayesNet, node: usize, candidate: usize) -> Result<f64> {
        if ! network.is_arc(candidate, node) {
            return Ok(f64::NEG_INFINITY);
        }

        let position = network.delete_parent(node, candidate)?;
        if let Err(e) = network.add_parent(candidate, node) {
            network.add_parent_at(node, candidate, position)?;
            return Err(e);
        }

        let score = self.score(network);
        network.delete_last_parent(candidate);
        network.add_parent_at(node, candidate, position)?;
        score
    }

    /// The credit `network` gets for `instance`, scaled by its weight
    fn accuracy_increase(&self, network: &BayesNet, instance: &Instance) -> Result<f64> {
        let class = network.instances().class_value(instance)?;

        if self.use_prob {
            let dist = network.distribution_for_instance(instance)?;
            let p = dist.get(class as usize).cloned().unwrap_or(0.0);
            Ok(p * instance.weight())
        } else if network.classify_instance(instance)? == class {
            Ok(instance.weight())
        } else {
            Ok(0.0)
        }
    }

    fn leave_one_out(&self, network: &mut BayesNet) -> Result<f64> {
        network.estimate_cpts()?;
        let rows = network.instances().instances().to_vec();

        let mut accuracy = 0.0;
        let mut weight = 0.0;
        for row in rows.iter() {
            let mut withdrawn = row.clone();
            withdrawn.set_weight(-row.weight());

            network.update_classifier(&withdrawn)?;
            let credit = self.accuracy_increase(network, row);
            network.update_classifier(row)?;

            accuracy += credit?;
            weight += row.weight();
        }

        Ok(ratio(accuracy, weight))
    }

    fn cumulative(&self, network: &mut BayesNet) -> Result<f64> {
        network.init_cpts()?;
        let rows = network.instances().instances().to_vec();

        let mut accuracy = 0.0;
        let mut weight = 0.0;
        for row in rows.iter() {
            accuracy += self.accuracy_increase(network, row)?;
            network.update_classifier(row)?;
            weight += row.weight();
        }

        Ok(ratio(accuracy, weight))
    }

    fn k_fold(&self, network: &mut BayesNet) -> Result<f64> {
        network.estimate_cpts()?;
        let rows = network.instances().instances().to_vec();
        let n = rows.len();

        let mut accuracy = 0.0;
        let mut weight = 0.0;
        let mut start = 0;
        let mut fold = 1;
        while start < n {
            let end = (fold * n / self.folds).max(start + 1).min(n);
            let held_out = &rows[start..end];

            for row in held_out {
                let mut withdrawn = row.clone();
                withdrawn.set_weight(-row.weight());
                network.update_classifier(&withdrawn)?;
            }

            let mut credit: Result<f64> = Ok(0.0);
            for row in held_out {
                credit = credit.and_then(|c| Ok(c + self.accuracy_increase(network, row)?));
                weight += row.weight();
            }

            for row in held_out {
                network.update_classifier(row)?;
            }

            accuracy += credit?;
            start = end;
            fold += 1;
        }

        Ok(ratio(accuracy, weight))
    }

}


fn ratio(accuracy: f64, weight: f64) -> f64 {
    if weight == 0.0 { 0.0 } else { accuracy / weight }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::{Attribute, Instances};

    const EPS: f64 = 1e-9;

    /// The class `c` and a feature `x` equal to it in 18 of 20 rows
    fn network() -> BayesNet {
        let mut data = Instances::new("agree", vec![
            Attribute::nominal("c", &["0", "1"]).unwrap(),
            Attribute::nominal("x", &["0", "1"]).unwrap(),
        ]).unwrap();
        data.set_class_index(Some(0)).unwrap();

        for i in 0..20 {
            let c = (i % 2) as f64;
            let x = if i % 10 == 3 { 1.0 - c } else { c };
            data.add(Instance::new(vec![c, x])).unwrap();
        }
        BayesNet::new(data).unwrap()
    }

    #[test]
    /// Test that the class arc improves every kind of cross-validated accuracy
    fn arc_helps() {
        for &cv in &[CvType::LeaveOneOut, CvType::KFold, CvType::Cumulative] {
            for &use_prob in &[true, false] {
                let score = GlobalScore::new(cv).with_folds(4).with_use_prob(use_prob);
                let mut net = network();

                let empty = score.score(&mut net).unwrap();
                let linked = score.score_with_extra_parent(&mut net, 1, 0).unwrap();
                assert!(linked > empty, "{:?} {}: {} vs {}", cv, use_prob, linked, empty);
                assert!(linked <= 1.0 + EPS);
                assert_eq!(0, net.num_arcs());
            }
        }
    }

    #[test]
    /// Test that leave-one-out restores the tables it withdraws rows from
    fn leave_one_out_restores() {
        let mut net = network();
        net.add_arc(0, 1).unwrap();
        GlobalScore::default().score(&mut net).unwrap();
        let after = net.probability(1, 1, 1).unwrap();

        net.estimate_cpts().unwrap();
        assert!((net.probability(1, 1, 1).unwrap() - after).abs() < EPS);
    }

    #[test]
    /// Test the temporary edits of the candidate scores
    fn candidates() {
        let score = GlobalScore::default();
        let mut net = network();
        net.add_arc(0, 1).unwrap();

        let base = score.score(&mut net).unwrap();
        assert_eq!(f64::NEG_INFINITY, score.score_with_extra_parent(&mut net, 1, 0).unwrap());
        assert_eq!(f64::NEG_INFINITY, score.score_with_missing_parent(&mut net, 0, 1).unwrap());
        assert_eq!(f64::NEG_INFINITY, score.score_with_reversed_parent(&mut net, 0, 1).unwrap());

        let missing = score.score_with_missing_parent(&mut net, 1, 0).unwrap();
        assert!(missing < base);
        let reversed = score.score_with_reversed_parent(&mut net, 1, 0).unwrap();
        assert!(reversed > missing);

        assert!(net.is_arc(0, 1));
        assert_eq!(1, net.num_arcs());
        assert!((score.score(&mut net).unwrap() - base).abs() < EPS);
    }

    #[test]
    fn invalid_folds() {
        let mut net = network();
        let score = GlobalScore::new(CvType::KFold).with_folds(0);
        assert!(score.score(&mut net).is_err());
    }
}
