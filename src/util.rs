//! Defines the `Error` type for the bayesnet library

use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, BayesNetError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BayesNetError {

    /// An attribute index past the width of the dataset
    #[error("attribute index {index} is out of range for a dataset with {width} attributes")]
    AttributeOutOfRange { index: usize, width: usize },

    /// An instance index past the end of the dataset
    #[error("instance index {index} is out of range for a dataset with {len} instances")]
    InstanceOutOfRange { index: usize, len: usize },

    /// Two attributes of one dataset share a name
    #[error("an attribute named `{0}` is already present")]
    DuplicateAttribute(String),

    /// A nominal attribute was required
    #[error("attribute `{0}` is not nominal")]
    NotNominal(String),

    /// A numeric attribute was required
    #[error("attribute `{0}` is not numeric")]
    NotNumeric(String),

    /// Attempt to make a node its own parent
    #[error("node {0} cannot be a parent of itself")]
    SelfParent(usize),

    /// Attempt to add a parent twice
    #[error("node {parent} is already a parent of node {node}")]
    DuplicateParent { node: usize, parent: usize },

    /// Attempt to remove a parent that is not there
    #[error("node {parent} is not a parent of node {node}")]
    MissingParent { node: usize, parent: usize },

    /// The arc `tail -> head` would close a directed cycle
    #[error("the arc {tail} -> {head} would introduce a cycle")]
    Cycle { tail: usize, head: usize },

    /// The dataset does not designate a class attribute
    #[error("the dataset has no class attribute")]
    NoClass,

    /// A missing value reached an operation that cannot handle one
    #[error("missing value for attribute `{0}`")]
    MissingValue(String),

    /// An instance whose width does not match its dataset
    #[error("instance has {found} values but the dataset has {expected} attributes")]
    WidthMismatch { expected: usize, found: usize },

    /// A label that is not declared on the attribute
    #[error("`{value}` is not a declared value of attribute `{attribute}`")]
    UnknownValue { attribute: String, value: String },

    /// A symbol index outside the domain of a discrete variable
    #[error("symbol {symbol} is out of range for a variable with {cardinality} values")]
    InvalidSymbol { symbol: f64, cardinality: usize },

    /// `ln_gamma` evaluated at a pole or past its overflow threshold
    #[error("ln_gamma overflows at {0}")]
    GammaOverflow(f64),

    /// A label that looks like a numeric range but cannot be parsed as one
    #[error("invalid range `{0}`")]
    InvalidRange(String),

    /// A raw numeric value that is not covered by any bin of a discretized attribute
    #[error("value {value} does not fall in any bin of attribute `{attribute}`")]
    NoMatchingBin { attribute: String, value: f64 },

    /// A negative or non-finite weight where a proper weight was required
    #[error("invalid weight {0}")]
    InvalidWeight(f64),

    /// The tree-augmented structure would give a node two non-class parents
    #[error("too many links at node {0}")]
    TooManyLinks(usize),

    /// A configuration value outside its legal domain
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The conditional probability tables do not match the current structure
    #[error("the network must be estimated before it can be queried")]
    NotFitted,

    /// A general error with the given description
    #[error("{0}")]
    General(String),

}
