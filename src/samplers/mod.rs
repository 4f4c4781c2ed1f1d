//! Defines the `Sampler` trait - an object that can randomly sample rows from a `BayesNet`.

use crate::data::Instance;
use crate::util::Result;

pub mod forward;

pub use self::forward::ForwardSampler;

pub trait Sampler {

    /// Sample one complete row from the associated network.
    fn sample(&mut self) -> Result<Instance>;

}
