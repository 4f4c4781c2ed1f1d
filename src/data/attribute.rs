//! Definition of the `Attribute`, the column metadata of a dataset.
//!
//! Every cell of a nominal or text column holds the index of one of the attribute's declared
//! values. Nominal attributes produced by discretizing a numeric column also carry one numeric
//! `Range` per value, which is how raw numbers are mapped back onto bins.

use crate::util::{BayesNetError, Result};

use std::fmt;

/// Characters allowed between the brackets of a range label
const RANGE_CHARS: &str = "+-.eEinf0123456789";


/// A numeric interval, each bound independently open or closed and possibly infinite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub lower: f64,
    pub lower_open: bool,
    pub upper: f64,
    pub upper_open: bool
}

impl Range {

    /// The interval covering the whole real line, labelled `All`
    pub fn all() -> Self {
        Range { lower: f64::NEG_INFINITY, lower_open: true, upper: f64::INFINITY, upper_open: true }
    }

    /// The empty interval, labelled `None`
    pub fn none() -> Self {
        Range { lower: f64::NAN, lower_open: true, upper: f64::NAN, upper_open: true }
    }

    /// Test whether `value` lies in the interval
    pub fn contains(&self, value: f64) -> bool {
        if self.lower.is_nan() || self.upper.is_nan() || value.is_nan() {
            return false;
        }

        let above = if self.lower_open { value > self.lower } else { value >= self.lower };
        let below = if self.upper_open { value < self.upper } else { value <= self.upper };

        above && below
    }

    /// Parse a range out of a value label such as `(-inf-2.5]`, `(2.5-4]`, `[1-2)` or `All`.
    ///
    /// # Returns
    /// `None` if the label does not describe a range at all
    ///
    /// # Errors
    /// `InvalidRange` if the label has the shape of a range but only one of its bounds can be read
    pub fn parse(label: &str) -> Result<Option<Range>> {
        let trimmed = label.trim().trim_matches('\'');
        if trimmed == "All" {
            return Ok(Some(Range::all()));
        }
        if trimmed == "None" {
            return Ok(Some(Range::none()));
        }

        let start = match trimmed.find(|c: char| c == '(' || c == '[') {
            Some(i) => i,
            None => return Ok(None)
        };

        let body = &trimmed[start + 1..];
        let end = match body.find(|c: char| c == ')' || c == ']') {
            Some(i) => i,
            None => return Ok(None)
        };

        let inner = &body[..end];
        if inner.is_empty() || ! inner.chars().all(|c| RANGE_CHARS.contains(c)) {
            return Ok(None);
        }

        // the first character of each bound may be its sign, so the separator is the first '-'
        // after it
        let split = match inner[1..].find('-') {
            Some(i) => i + 1,
            None => return Ok(None)
        };

        let lower = parse_bound(&inner[..split]);
        let upper = inner.get(split + 1..).filter(|s| ! s.is_empty()).and_then(parse_bound);
        match (lower, upper) {
            (Some(lower), Some(upper)) => Ok(Some(Range {
                lower,
                lower_open: trimmed[start..].starts_with('('),
                upper,
                upper_open: body[end..].starts_with(')')
            })),
            (None, None) => Ok(None),
            _ => Err(BayesNetError::InvalidRange(String::from(label)))
        }
    }
}

fn parse_bound(s: &str) -> Option<f64> {
    match s {
        "-inf" => Some(f64::NEG_INFINITY),
        "inf" | "+inf" => Some(f64::INFINITY),
        _ => s.parse::<f64>().ok()
    }
}

impl fmt::Display for Range {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.lower.is_nan() || self.upper.is_nan() {
            return write!(f, "None");
        }
        if self.lower == f64::NEG_INFINITY && self.upper == f64::INFINITY {
            return write!(f, "All");
        }

        let bound = |x: f64| if x.is_infinite() {
            String::from(if x < 0.0 { "-inf" } else { "inf" })
        } else {
            x.to_string()
        };

        write!(f, "{}{}-{}{}",
               if self.lower_open { '(' } else { '[' },
               bound(self.lower),
               bound(self.upper),
               if self.upper_open { ')' } else { ']' })
    }

}


/// The kind of an `Attribute`, along with the data only that kind carries.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeKind {

    /// A real-valued column. Cells hold the value itself.
    Numeric,

    /// A categorical column with an ordered list of labels. `ranges[k]` is the numeric interval
    /// described by label `k`, if that label describes one.
    Nominal { values: Vec<String>, ranges: Vec<Option<Range>> },

    /// A free-text column. Cells hold the index of a string in `values`.
    Text { values: Vec<String> }
}


/// One column of a dataset
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {

    /// The name of the column
    name: String,

    kind: AttributeKind
}

impl Attribute {

    /// Construct a numeric `Attribute`
    pub fn numeric(name: &str) -> Self {
        Attribute { name: String::from(name), kind: AttributeKind::Numeric }
    }

    /// Construct a nominal `Attribute` with the given labels.
    ///
    /// # Errors
    /// `General` if a label is repeated, `InvalidRange` if a label is a malformed range
    pub fn nominal<S: AsRef<str>>(name: &str, labels: &[S]) -> Result<Self> {
        let mut attr = Attribute {
            name: String::from(name),
            kind: AttributeKind::Nominal { values: Vec::new(), ranges: Vec::new() }
        };

        for label in labels {
            let label = label.as_ref();
            if attr.index_of_value(label).is_some() {
                return Err(BayesNetError::General(
                    format!("value `{}` is declared twice for attribute `{}`", label, name)
                ));
            }
            attr.add_value(label)?;
        }

        Ok(attr)
    }

    /// Construct a text `Attribute` with the given initial strings
    pub fn text<S: AsRef<str>>(name: &str, values: &[S]) -> Self {
        Attribute {
            name: String::from(name),
            kind: AttributeKind::Text { values: values.iter().map(|s| String::from(s.as_ref())).collect() }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == AttributeKind::Numeric
    }

    pub fn is_nominal(&self) -> bool {
        match self.kind {
            AttributeKind::Nominal { .. } => true,
            _ => false
        }
    }

    pub fn is_text(&self) -> bool {
        match self.kind {
            AttributeKind::Text { .. } => true,
            _ => false
        }
    }

    /// True for the attributes whose cells hold symbol indices
    pub fn is_discrete(&self) -> bool {
        ! self.is_numeric()
    }

    /// The number of declared values. Numeric attributes have none.
    pub fn num_values(&self) -> usize {
        self.values().len()
    }

    /// All declared labels, in symbol order
    pub fn values(&self) -> &[String] {
        match self.kind {
            AttributeKind::Numeric => &[],
            AttributeKind::Nominal { ref values, .. } | AttributeKind::Text { ref values } => values
        }
    }

    /// The label of symbol `index`
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values().get(index).map(|s| s.as_str())
    }

    /// The symbol index of `label`
    pub fn index_of_value(&self, label: &str) -> Option<usize> {
        self.values().iter().position(|v| v == label)
    }

    /// Declare a new label, returning its symbol index. An existing label keeps its index.
    ///
    /// Nominal labels that describe a numeric range have that range recorded.
    ///
    /// # Errors
    /// `NotNominal` on a numeric attribute, `InvalidRange` for malformed range labels
    pub fn add_value(&mut self, label: &str) -> Result<usize> {
        if let Some(idx) = self.index_of_value(label) {
            return Ok(idx);
        }

        match self.kind {
            AttributeKind::Numeric => Err(BayesNetError::NotNominal(self.name.clone())),
            AttributeKind::Nominal { ref mut values, ref mut ranges } => {
                let range = Range::parse(label)?;
                values.push(String::from(label));
                ranges.push(range);
                Ok(values.len() - 1)
            },
            AttributeKind::Text { ref mut values } => {
                values.push(String::from(label));
                Ok(values.len() - 1)
            }
        }
    }

    /// The numeric interval described by label `index`, if any
    pub fn range(&self, index: usize) -> Option<&Range> {
        match self.kind {
            AttributeKind::Nominal { ref ranges, .. } => ranges.get(index).and_then(|r| r.as_ref()),
            _ => None
        }
    }

    /// True if at least one label of this attribute describes a numeric range
    pub fn has_ranges(&self) -> bool {
        match self.kind {
            AttributeKind::Nominal { ref ranges, .. } => ranges.iter().any(|r| r.is_some()),
            _ => false
        }
    }

    /// The first symbol whose range contains `value`
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        (0..self.num_values()).find(|&k| self.range(k).map_or(false, |r| r.contains(value)))
    }

}


impl fmt::Display for Attribute {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            AttributeKind::Numeric => write!(f, "{} numeric", self.name),
            AttributeKind::Text { .. } => write!(f, "{} string", self.name),
            AttributeKind::Nominal { ref values, .. } => write!(f, "{} {{{}}}", self.name, values.join(","))
        }
    }

}
