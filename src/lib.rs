//! Learning Bayesian network classifiers from tabular data: a weighted dataset model, supervised
//! discretization, structure search (K2, hill climbing, tabu search, TAN and a cross-validated
//! global K2), conditional probability table estimation, and forward sampling.

pub mod data;
pub mod estimators;
pub mod filters;
pub mod math;
pub mod model;
pub mod samplers;
pub mod search;
pub mod util;

pub use crate::util::{BayesNetError, Result};
