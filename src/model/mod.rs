//! The network structure model: per-node `ParentSet`s gathered into a `BayesNet`, and a
//! generator of random networks.

mod generator;
mod network;
mod parent_set;

pub use self::generator::BayesNetGenerator;
pub use self::network::BayesNet;
pub use self::parent_set::ParentSet;
