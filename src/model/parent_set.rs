//! Defines a `ParentSet`, the ordered parents of one node of a `BayesNet`.

use crate::data::Instances;
use crate::util::{BayesNetError, Result};


/// The parents of one node, in order, with the number of joint parent configurations.
///
/// The order of the parents fixes how a joint configuration is encoded as a single index: the
/// last parent varies fastest. `cardinality` is kept equal to the product of the number of values
/// of each parent on every edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentSet {

    /// The node these are the parents of
    node: usize,

    /// The parent nodes, in encoding order
    parents: Vec<usize>,

    /// The number of joint configurations of `parents`
    cardinality: usize
}


impl ParentSet {

    /// Construct an empty `ParentSet` for `node`
    pub fn new(node: usize) -> Self {
        ParentSet { node, parents: Vec::new(), cardinality: 1 }
    }

    pub fn node(&self) -> usize {
        self.node
    }

    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    pub fn num_parents(&self) -> usize {
        self.parents.len()
    }

    /// The `k`-th parent
    pub fn parent(&self, k: usize) -> Option<usize> {
        self.parents.get(k).cloned()
    }

    /// The number of joint configurations of the parents
    pub fn cardinality_of_parents(&self) -> usize {
        self.cardinality
    }

    pub fn contains(&self, parent: usize) -> bool {
        self.parents.contains(&parent)
    }

    /// Append `parent` to the set.
    ///
    /// # Errors
    /// * `SelfParent` if `parent` is the node itself
    /// * `DuplicateParent` if `parent` is already in the set
    /// * `AttributeOutOfRange` if `parent` is not a column of `instances`
    /// * `NotNominal` if `parent` is a numeric column
    pub fn add_parent(&mut self, parent: usize, instances: &Instances) -> Result<()> {
        let position = self.parents.len();
        self.add_parent_at(parent, position, instances)
    }

    /// Insert `parent` at `position` in the encoding order, shifting later parents back. Used to
    /// put a removed parent back exactly where it was.
    pub fn add_parent_at(&mut self, parent: usize, position: usize, instances: &Instances) -> Result<()> {
        let card = self.check_parent(parent, instances)?;
        if self.contains(parent) {
            return Err(BayesNetError::DuplicateParent { node: self.node, parent });
        }

        let position = position.min(self.parents.len());
        self.parents.insert(position, parent);
        self.cardinality *= card;
        Ok(())
    }

    /// Remove `parent` from the set.
    ///
    /// # Returns
    /// the position `parent` held, so that it can be restored with `add_parent_at`
    ///
    /// # Errors
    /// `MissingParent` if `parent` is not in the set
    pub fn delete_parent(&mut self, parent: usize, instances: &Instances) -> Result<usize> {
        let position = self.parents
            .iter()
            .position(|&p| p == parent)
            .ok_or(BayesNetError::MissingParent { node: self.node, parent })?;

        let card = instances.attribute(parent)?.num_values();
        self.parents.remove(position);
        self.cardinality /= card;
        Ok(position)
    }

    /// Remove the most recently appended parent, if there is one
    pub fn delete_last_parent(&mut self, instances: &Instances) -> Option<usize> {
        let parent = self.parents.pop()?;
        if let Ok(attr) = instances.attribute(parent) {
            self.cardinality /= attr.num_values();
        }
        Some(parent)
    }

    /// Validate a prospective parent, returning its number of values
    fn check_parent(&self, parent: usize, instances: &Instances) -> Result<usize> {
        if parent == self.node {
            return Err(BayesNetError::SelfParent(parent));
        }

        let attr = instances.attribute(parent)?;
        if ! attr.is_discrete() || attr.num_values() == 0 {
            return Err(BayesNetError::NotNominal(String::from(attr.name())));
        }

        Ok(attr.num_values())
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::Attribute;

    /// Four columns with 2, 3, 4 and 2 values, and a numeric one
    fn header() -> Instances {
        Instances::new("header", vec![
            Attribute::nominal("a", &["0", "1"]).unwrap(),
            Attribute::nominal("b", &["0", "1", "2"]).unwrap(),
            Attribute::nominal("c", &["0", "1", "2", "3"]).unwrap(),
            Attribute::nominal("d", &["0", "1"]).unwrap(),
            Attribute::numeric("x"),
        ]).unwrap()
    }

    fn product(set: &ParentSet, data: &Instances) -> usize {
        set.parents().iter().map(|&p| data.attribute(p).unwrap().num_values()).product()
    }

    #[test]
    /// Test that the cardinality tracks every edit
    fn cardinality() {
        let data = header();
        let mut set = ParentSet::new(3);
        assert_eq!(1, set.cardinality_of_parents());

        set.add_parent(0, &data).unwrap();
        set.add_parent(2, &data).unwrap();
        assert_eq!(8, set.cardinality_of_parents());

        set.add_parent_at(1, 1, &data).unwrap();
        assert_eq!(&[0, 1, 2], set.parents());
        assert_eq!(24, set.cardinality_of_parents());
        assert_eq!(product(&set, &data), set.cardinality_of_parents());

        let position = set.delete_parent(1, &data).unwrap();
        assert_eq!(1, position);
        assert_eq!(product(&set, &data), set.cardinality_of_parents());

        assert_eq!(Some(2), set.delete_last_parent(&data));
        assert_eq!(2, set.cardinality_of_parents());
        assert_eq!(Some(0), set.delete_last_parent(&data));
        assert_eq!(None, set.delete_last_parent(&data));
        assert_eq!(1, set.cardinality_of_parents());
    }

    #[test]
    /// Test that illegal parents are rejected and leave the set untouched
    fn illegal() {
        let data = header();
        let mut set = ParentSet::new(1);
        set.add_parent(0, &data).unwrap();

        assert_eq!(Err(BayesNetError::SelfParent(1)), set.add_parent(1, &data));
        assert_eq!(Err(BayesNetError::DuplicateParent { node: 1, parent: 0 }), set.add_parent(0, &data));
        assert!(set.add_parent(9, &data).is_err());
        assert!(set.add_parent(4, &data).is_err());
        assert_eq!(Err(BayesNetError::MissingParent { node: 1, parent: 3 }), set.delete_parent(3, &data));

        assert_eq!(&[0], set.parents());
        assert_eq!(2, set.cardinality_of_parents());
        assert!(set.contains(0));
        assert!(! set.contains(3));
        assert_eq!(Some(0), set.parent(0));
        assert_eq!(None, set.parent(1));
    }
}
