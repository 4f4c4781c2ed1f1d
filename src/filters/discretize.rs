//! Supervised discretization of numeric columns by recursive minimum-entropy splitting, with the
//! Fayyad & Irani MDL stopping criterion.
//!
//! U. M. Fayyad and K. B. Irani, "Multi-interval discretization of continuous-valued attributes
//! for classification learning", IJCAI 1993.

use super::Filter;
use crate::data::{is_missing, Attribute, Instance, Instances, Range};
use crate::math::{entropy_conditioned_on_rows, entropy_for_row};
use crate::util::{BayesNetError, Result};

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};


/// Replaces every numeric column (other than the class) by a nominal column of bins, the bins
/// chosen to minimize the class entropy within each.
///
/// The labels of the new columns describe their ranges, `(-inf-c0]`, `(c0-c1]` up to
/// `(cN-inf)`, or `All` when no cut point was accepted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Discretize {

    /// Count only the boundaries between distinct values as candidate cut points in the MDL
    /// test, instead of every gap between rows
    use_better_encoding: bool,

    /// The cut points of each column, `None` for the columns left alone
    #[serde(skip)]
    cut_points: Vec<Option<Vec<f64>>>,

    /// The header of the transformed dataset
    #[serde(skip)]
    format: Option<Instances>
}


/// One observed (value, class, weight) triple of the column being discretized
#[derive(Clone, Copy, Debug)]
struct Observation {
    value: f64,
    class: usize,
    weight: f64
}


impl Discretize {

    pub fn new() -> Self {
        Discretize::default()
    }

    pub fn with_better_encoding(mut self, use_better_encoding: bool) -> Self {
        self.use_better_encoding = use_better_encoding;
        self
    }

    /// The cut points learned for column `att`, ascending. `None` if the column is not
    /// discretized (or the filter is not fitted).
    pub fn cut_points(&self, att: usize) -> Option<&[f64]> {
        self.cut_points.get(att).and_then(|c| c.as_ref()).map(|c| c.as_slice())
    }

    /// The header of the transformed dataset, once fitted
    pub fn output_format(&self) -> Option<&Instances> {
        self.format.as_ref()
    }

    /// Map one row of the input layout onto the output layout: each discretized cell becomes the
    /// index of the first cut point at or above it (or the last bin). Missing stays missing.
    pub fn convert_instance(&self, instance: &Instance) -> Result<Instance> {
        if self.format.is_none() {
            return Err(BayesNetError::NotFitted);
        }
        if instance.num_values() != self.cut_points.len() {
            return Err(BayesNetError::WidthMismatch { expected: self.cut_points.len(), found: instance.num_values() });
        }

        let mut converted = instance.clone();
        for (i, cuts) in self.cut_points.iter().enumerate() {
            let cuts = match cuts {
                Some(cuts) => cuts,
                None => continue
            };

            let value = instance[i];
            if is_missing(value) {
                continue;
            }

            let bin = cuts.iter().position(|&c| value <= c).unwrap_or(cuts.len());
            converted.set_value(i, bin as f64)?;
        }

        Ok(converted)
    }

    /// Sort the observed rows of column `att` and split them recursively
    fn cut_points_for_attribute(&self, instances: &Instances, att: usize, num_classes: usize) -> Result<Vec<f64>> {
        let class = instances.class_index().ok_or(BayesNetError::NoClass)?;

        let mut observations: Vec<Observation> = instances
            .iter()
            .filter(|r| ! r.is_missing(att) && ! r.is_missing(class))
            .map(|r| Observation { value: r[att], class: r[class] as usize, weight: r.weight() })
            .collect();

        if let Some(o) = observations.iter().find(|o| o.class >= num_classes) {
            return Err(BayesNetError::InvalidSymbol { symbol: o.class as f64, cardinality: num_classes });
        }

        // stable, so ties keep their dataset order
        observations.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(self.cut_points_for_subset(&observations, num_classes))
    }

    /// The accepted cut points within `observations`, which are sorted by value
    fn cut_points_for_subset(&self, observations: &[Observation], num_classes: usize) -> Vec<f64> {
        if observations.len() < 2 {
            return Vec::new();
        }

        // counts[0] is left of the candidate cut, counts[1] right of it
        let mut counts = vec![vec![0.0; num_classes]; 2];
        for o in observations {
            counts[1][o.class] += o.weight;
        }
        let prior_counts = counts[1].clone();
        let num_instances: f64 = prior_counts.iter().sum();

        let prior_entropy = entropy_for_row(&prior_counts);
        let mut best_entropy = prior_entropy;
        let mut best: Option<(usize, f64, Vec<Vec<f64>>)> = None;
        let mut num_cut_points = 0;

        for (i, (o, next)) in observations.iter().tuple_windows().enumerate() {
            counts[0][o.class] += o.weight;
            counts[1][o.class] -= o.weight;

            if o.value < next.value {
                let entropy = entropy_conditioned_on_rows(&counts);
                if entropy < best_entropy {
                    best_entropy = entropy;
                    best = Some((i, (o.value + next.value) / 2.0, counts.clone()));
                }
                num_cut_points += 1;
            }
        }

        if ! self.use_better_encoding {
            num_cut_points = observations.len() - 1;
        }

        let (index, cut_point, best_counts) = match best {
            Some(b) if prior_entropy - best_entropy > 0.0 => b,
            _ => return Vec::new()
        };

        if ! fayyad_irani_accepts(&prior_counts, &best_counts, num_instances, num_cut_points) {
            return Vec::new();
        }

        trace!("accepted cut point {} over {} rows", cut_point, observations.len());

        let mut cut_points = self.cut_points_for_subset(&observations[..index + 1], num_classes);
        cut_points.push(cut_point);
        cut_points.extend(self.cut_points_for_subset(&observations[index + 1..], num_classes));
        cut_points
    }

}


/// The Fayyad & Irani MDL test: accept the split when its information gain pays for encoding
/// the cut point and the class distributions of both halves.
fn fayyad_irani_accepts(prior_counts: &[f64], best_counts: &[Vec<f64>], num_instances: f64, num_cut_points: usize) -> bool {
    let prior_entropy = entropy_for_row(prior_counts);
    let entropy = entropy_conditioned_on_rows(best_counts);
    let gain = prior_entropy - entropy;

    let classes = |row: &[f64]| row.iter().filter(|&&c| c > 0.0).count() as f64;
    let k = classes(prior_counts);
    let k_left = classes(&best_counts[0]);
    let k_right = classes(&best_counts[1]);

    let entropy_left = entropy_for_row(&best_counts[0]);
    let entropy_right = entropy_for_row(&best_counts[1]);

    let delta = (3f64.powf(k) - 2.0).log2()
        - (k * prior_entropy - k_right * entropy_right - k_left * entropy_left);

    gain > ((num_cut_points as f64).log2() + delta) / num_instances
}


/// The labels of the bins delimited by `cut_points`
fn bin_labels(cut_points: &[f64]) -> Vec<String> {
    if cut_points.is_empty() {
        return vec![Range::all().to_string()];
    }

    let bounds: Vec<f64> = std::iter::once(f64::NEG_INFINITY)
        .chain(cut_points.iter().cloned())
        .chain(std::iter::once(f64::INFINITY))
        .collect();

    bounds
        .iter()
        .tuple_windows()
        .map(|(&lower, &upper)| Range {
            lower,
            lower_open: true,
            upper,
            upper_open: upper == f64::INFINITY
        }.to_string())
        .collect()
}


impl Filter for Discretize {

    fn fit(&mut self, instances: &Instances) -> Result<()> {
        let class = instances.class_attribute()?;
        if ! class.is_nominal() {
            return Err(BayesNetError::NotNominal(String::from(class.name())));
        }
        let num_classes = class.num_values();
        let class_index = instances.class_index().ok_or(BayesNetError::NoClass)?;

        let mut format = instances.empty_copy();
        let mut cut_points = vec![None; instances.num_attributes()];

        for att in 0..instances.num_attributes() {
            let attr = instances.attribute(att)?;
            if att == class_index || ! attr.is_numeric() {
                continue;
            }

            let cuts = self.cut_points_for_attribute(instances, att, num_classes)?;
            debug!("discretized `{}` with cut points [{}]", attr.name(), cuts.iter().join(", "));

            format.set_attribute(att, Attribute::nominal(attr.name(), &bin_labels(&cuts))?)?;
            cut_points[att] = Some(cuts);
        }

        self.cut_points = cut_points;
        self.format = Some(format);
        Ok(())
    }

    fn transform(&self, instances: &Instances) -> Result<Instances> {
        let mut output = self.format.as_ref().ok_or(BayesNetError::NotFitted)?.empty_copy();

        for instance in instances.iter() {
            output.add(self.convert_instance(instance)?)?;
        }

        Ok(output)
    }

}
