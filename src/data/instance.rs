//! Definition of an `Instance`, one row of a dataset.

use crate::util::{BayesNetError, Result};

use std::ops::Index;

/// The cell value that marks a missing observation
pub const MISSING: f64 = f64::NAN;

/// Test whether a cell value is the missing-value marker
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}


/// A weighted row of cell values.
///
/// The meaning of each cell is given by the `Attribute` at the same position of the owning
/// `Instances`: the value itself for numeric columns, a symbol index otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {

    values: Vec<f64>,

    weight: f64
}

impl Instance {

    /// Construct an `Instance` with unit weight
    pub fn new(values: Vec<f64>) -> Self {
        Instance { values, weight: 1.0 }
    }

    /// Construct an `Instance` with the given weight
    pub fn with_weight(values: Vec<f64>, weight: f64) -> Self {
        Instance { values, weight }
    }

    /// Construct an `Instance` in which every cell is missing
    pub fn missing(width: usize) -> Self {
        Instance::new(vec![MISSING; width])
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the value of cell `index`, if there is such a cell
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).cloned()
    }

    /// Set the value of cell `index`
    pub fn set_value(&mut self, index: usize, value: f64) -> Result<()> {
        let width = self.values.len();
        match self.values.get_mut(index) {
            Some(cell) => {
                *cell = value;
                Ok(())
            },
            None => Err(BayesNetError::AttributeOutOfRange { index, width })
        }
    }

    /// Whether cell `index` is missing. Cells past the end count as missing.
    pub fn is_missing(&self, index: usize) -> bool {
        self.get(index).map_or(true, is_missing)
    }

    pub fn has_missing_value(&self) -> bool {
        self.values.iter().any(|&v| is_missing(v))
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Set the weight. Negative weights are allowed here, and are how a row's contribution is
    /// withdrawn from an estimator.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Whether `self` and `other` hold the same cells, counting two missing cells as equal. The
    /// weights are not compared.
    pub fn same_values(&self, other: &Instance) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().zip(other.values.iter())
                .all(|(&a, &b)| a == b || (is_missing(a) && is_missing(b)))
    }

    /// Concatenate the cells of `self` and `other` into a new `Instance` with the weight of
    /// `self`.
    pub fn merge(&self, other: &Instance) -> Instance {
        let values = self.values.iter().chain(other.values.iter()).cloned().collect();
        Instance::with_weight(values, self.weight)
    }

}

impl Index<usize> for Instance {

    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn basics() {
        let mut i = Instance::new(vec![1.0, MISSING, 3.0]);
        assert_eq!(3, i.num_values());
        assert_eq!(1.0, i.weight());
        assert_eq!(Some(3.0), i.get(2));
        assert_eq!(None, i.get(3));
        assert_eq!(1.0, i[0]);

        assert!(i.is_missing(1));
        assert!(i.is_missing(5));
        assert!(! i.is_missing(0));
        assert!(i.has_missing_value());

        i.set_value(1, 2.0).unwrap();
        assert!(! i.has_missing_value());
        assert_eq!(
            Err(BayesNetError::AttributeOutOfRange { index: 3, width: 3 }),
            i.set_value(3, 0.0)
        );

        i.set_weight(-1.0);
        assert_eq!(-1.0, i.weight());
    }

    #[test]
    fn merge() {
        let a = Instance::with_weight(vec![0.0, 1.0], 2.0);
        let b = Instance::new(vec![5.0]);
        let m = a.merge(&b);
        assert_eq!(&[0.0, 1.0, 5.0], m.values());
        assert_eq!(2.0, m.weight());

        assert!(Instance::missing(4).values().iter().all(|&v| is_missing(v)));
    }

    #[test]
    fn same_values() {
        let a = Instance::new(vec![1.0, MISSING]);
        let b = Instance::with_weight(vec![1.0, MISSING], 3.0);
        assert!(a.same_values(&b));
        assert!(a.same_values(&a));
        assert_ne!(a, a.clone());

        assert!(! a.same_values(&Instance::new(vec![1.0, 2.0])));
        assert!(! a.same_values(&Instance::new(vec![1.0])));
    }
}
