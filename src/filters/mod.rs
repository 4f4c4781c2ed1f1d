//! Defines the `Filter` trait, a dataset-to-dataset transformation learned from data, and the
//! supervised `Discretize` filter.

use crate::data::Instances;
use crate::util::Result;

mod discretize;

pub use self::discretize::Discretize;

/// A transformation of `Instances` whose parameters are learned by `fit`
pub trait Filter {

    /// Learn the parameters of the transformation from `instances`
    ///
    /// # Errors
    /// if the filter cannot be applied to this kind of dataset
    fn fit(&mut self, instances: &Instances) -> Result<()>;

    /// Apply the learned transformation
    ///
    /// # Errors
    /// `NotFitted` if `fit` has not been called
    fn transform(&self, instances: &Instances) -> Result<Instances>;

    /// Fit to `instances`, then transform them
    fn fit_transform(&mut self, instances: &Instances) -> Result<Instances> {
        self.fit(instances)?;
        self.transform(instances)
    }

}
