//! Definition of `Instances`, a dataset of weighted rows over a fixed set of attributes.

use super::attribute::Attribute;
use super::instance::{is_missing, Instance, MISSING};
use crate::util::{BayesNetError, Result};

use indexmap::IndexMap;
use rand::seq::index;
use rand::Rng;

use std::cmp::Ordering;


/// An ordered collection of `Instance`s sharing one ordered list of `Attribute`s.
///
/// The attributes are fixed once the dataset is constructed, apart from `set_attribute`, which
/// the discretization filter uses to swap a numeric column for its binned counterpart.
#[derive(Clone, Debug, PartialEq)]
pub struct Instances {

    /// The name of the relation the rows belong to
    relation: String,

    /// The attributes, keyed by name and held in column order
    attributes: IndexMap<String, Attribute>,

    rows: Vec<Instance>,

    /// The column designated as the class, if any
    class_index: Option<usize>
}

impl Instances {

    /// Construct an empty dataset over the given attributes.
    ///
    /// # Errors
    /// `DuplicateAttribute` if two attributes share a name
    pub fn new(relation: &str, attributes: Vec<Attribute>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(attributes.len());
        for attr in attributes {
            let name = String::from(attr.name());
            if map.insert(name.clone(), attr).is_some() {
                return Err(BayesNetError::DuplicateAttribute(name));
            }
        }

        Ok(Instances { relation: String::from(relation), attributes: map, rows: Vec::new(), class_index: None })
    }

    /// A dataset with the same header (relation, attributes and class) and no rows
    pub fn empty_copy(&self) -> Self {
        Instances {
            relation: self.relation.clone(),
            attributes: self.attributes.clone(),
            rows: Vec::new(),
            class_index: self.class_index
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_instances(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get attribute `index`
    pub fn attribute(&self, index: usize) -> Result<&Attribute> {
        self.attributes
            .get_index(index)
            .map(|(_, a)| a)
            .ok_or(BayesNetError::AttributeOutOfRange { index, width: self.attributes.len() })
    }

    /// Look up an attribute and its column index by name
    pub fn attribute_by_name(&self, name: &str) -> Option<(usize, &Attribute)> {
        self.attributes.get_full(name).map(|(i, _, a)| (i, a))
    }

    /// Iterate over the attributes in column order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Replace attribute `index`. The rows are left untouched, so the caller is responsible for
    /// keeping the cells consistent with the new attribute.
    pub fn set_attribute(&mut self, index: usize, attribute: Attribute) -> Result<()> {
        self.check_attribute_index(index)?;

        if let Some((other, _)) = self.attribute_by_name(attribute.name()) {
            if other != index {
                return Err(BayesNetError::DuplicateAttribute(String::from(attribute.name())));
            }
        }

        let attributes = std::mem::take(&mut self.attributes);
        self.attributes = attributes
            .into_iter()
            .enumerate()
            .map(|(i, (name, attr))| if i == index {
                (String::from(attribute.name()), attribute.clone())
            } else {
                (name, attr)
            })
            .collect();

        Ok(())
    }

    pub fn class_index(&self) -> Option<usize> {
        self.class_index
    }

    /// Designate column `index` as the class, or clear the class with `None`
    pub fn set_class_index(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(i) = index {
            self.check_attribute_index(i)?;
        }
        self.class_index = index;
        Ok(())
    }

    /// The class attribute.
    ///
    /// # Errors
    /// `NoClass` if no class is designated
    pub fn class_attribute(&self) -> Result<&Attribute> {
        self.attribute(self.class_index.ok_or(BayesNetError::NoClass)?)
    }

    /// The number of labels of the class attribute
    pub fn num_classes(&self) -> Result<usize> {
        self.class_attribute().map(|a| a.num_values())
    }

    /// Get row `index`
    pub fn instance(&self, index: usize) -> Result<&Instance> {
        self.rows.get(index).ok_or(BayesNetError::InstanceOutOfRange { index, len: self.rows.len() })
    }

    pub fn instances(&self) -> &[Instance] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<Instance> {
        self.rows.iter()
    }

    /// Get the value of attribute `att` in row `row`
    pub fn value(&self, row: usize, att: usize) -> Result<f64> {
        self.check_attribute_index(att)?;
        Ok(self.instance(row)?[att])
    }

    /// Set the value of attribute `att` in row `row`
    pub fn set_value(&mut self, row: usize, att: usize, value: f64) -> Result<()> {
        let len = self.rows.len();
        self.check_attribute_index(att)?;
        self.rows
            .get_mut(row)
            .ok_or(BayesNetError::InstanceOutOfRange { index: row, len })?
            .set_value(att, value)
    }

    /// The class value of `instance` under this dataset's header
    pub fn class_value(&self, instance: &Instance) -> Result<f64> {
        let index = self.class_index.ok_or(BayesNetError::NoClass)?;
        instance.get(index).ok_or(BayesNetError::WidthMismatch {
            expected: self.num_attributes(),
            found: instance.num_values()
        })
    }

    /// Verify that `instance` fits this dataset: its width matches, its weight is a finite
    /// non-negative number, and every non-missing discrete cell holds a declared symbol.
    pub fn check_instance(&self, instance: &Instance) -> Result<()> {
        if instance.num_values() != self.num_attributes() {
            return Err(BayesNetError::WidthMismatch {
                expected: self.num_attributes(),
                found: instance.num_values()
            });
        }

        if ! instance.weight().is_finite() || instance.weight() < 0.0 {
            return Err(BayesNetError::InvalidWeight(instance.weight()));
        }

        for (attr, &value) in self.attributes.values().zip(instance.values()) {
            if is_missing(value) || attr.is_numeric() {
                continue;
            }

            if value.fract() != 0.0 || value < 0.0 || value >= attr.num_values() as f64 {
                return Err(BayesNetError::InvalidSymbol { symbol: value, cardinality: attr.num_values() });
            }
        }

        Ok(())
    }

    /// Append a row
    pub fn add(&mut self, instance: Instance) -> Result<()> {
        self.check_instance(&instance)?;
        self.rows.push(instance);
        Ok(())
    }

    /// Append a row given by its labels: numbers for numeric columns, declared labels for nominal
    /// columns, and any string for text columns (new strings are declared on the fly). `?` marks
    /// a missing value.
    pub fn add_labels<S: AsRef<str>>(&mut self, labels: &[S], weight: f64) -> Result<()> {
        if labels.len() != self.num_attributes() {
            return Err(BayesNetError::WidthMismatch { expected: self.num_attributes(), found: labels.len() });
        }

        let mut values = Vec::with_capacity(labels.len());
        for (attr, label) in self.attributes.values_mut().zip(labels.iter()) {
            let label = label.as_ref().trim();
            if label == "?" {
                values.push(MISSING);
                continue;
            }

            if attr.is_text() {
                values.push(attr.add_value(label)? as f64);
                continue;
            }

            let unknown = || BayesNetError::UnknownValue {
                attribute: String::from(attr.name()),
                value: String::from(label)
            };

            let value = if attr.is_numeric() {
                label.parse::<f64>().map_err(|_| unknown())?
            } else {
                attr.index_of_value(label).ok_or_else(unknown)? as f64
            };
            values.push(value);
        }

        self.add(Instance::with_weight(values, weight))
    }

    /// Remove and return row `index`
    pub fn delete(&mut self, index: usize) -> Result<Instance> {
        if index >= self.rows.len() {
            return Err(BayesNetError::InstanceOutOfRange { index, len: self.rows.len() });
        }
        Ok(self.rows.remove(index))
    }

    /// Remove every row
    pub fn delete_all(&mut self) {
        self.rows.clear();
    }

    /// Remove every row in which attribute `att` is missing
    pub fn delete_with_missing(&mut self, att: usize) -> Result<()> {
        self.check_attribute_index(att)?;
        self.rows.retain(|r| ! r.is_missing(att));
        Ok(())
    }

    /// Remove every row whose class is missing
    pub fn delete_with_missing_class(&mut self) -> Result<()> {
        let class = self.class_index.ok_or(BayesNetError::NoClass)?;
        self.delete_with_missing(class)
    }

    /// Sort the rows by the values of attribute `att`, ascending, with missing values last.
    /// Ties keep their relative order.
    pub fn sort(&mut self, att: usize) -> Result<()> {
        self.check_attribute_index(att)?;
        self.rows.sort_by(|a, b| compare_values(a[att], b[att]));
        Ok(())
    }

    pub fn sum_of_weights(&self) -> f64 {
        self.rows.iter().map(|r| r.weight()).sum()
    }

    /// Weighted sample variance of numeric attribute `att`, ignoring missing values
    pub fn variance(&self, att: usize) -> Result<f64> {
        self.check_numeric(att)?;

        let (mut sum, mut sum_squared, mut sum_of_weights) = (0.0, 0.0, 0.0);
        for r in self.rows.iter().filter(|r| ! r.is_missing(att)) {
            sum += r.weight() * r[att];
            sum_squared += r.weight() * r[att] * r[att];
            sum_of_weights += r.weight();
        }

        if sum_of_weights <= 1.0 {
            return Ok(0.0);
        }

        let result = (sum_squared - sum * sum / sum_of_weights) / (sum_of_weights - 1.0);
        Ok(result.max(0.0))
    }

    /// The weighted mean of a numeric attribute, or the most frequent symbol of a discrete one
    pub fn mean_or_mode(&self, att: usize) -> Result<f64> {
        let attr = self.attribute(att)?;
        let observed = self.rows.iter().filter(|r| ! r.is_missing(att));

        if attr.is_numeric() {
            let (found, total) = observed.fold((0.0, 0.0), |(f, t), r| (f + r.weight(), t + r.weight() * r[att]));
            return Ok(if found <= 0.0 { 0.0 } else { total / found });
        }

        let mut counts = vec![0.0; attr.num_values()];
        for r in observed {
            if let Some(c) = counts.get_mut(r[att] as usize) {
                *c += r.weight();
            }
        }

        // first of the most frequent
        let mode = counts
            .iter()
            .enumerate()
            .fold(0, |best, (i, &c)| if c > counts[best] { i } else { best });
        Ok(mode as f64)
    }

    /// The number of distinct observed values of a numeric attribute, or the number of declared
    /// values of a discrete one
    pub fn num_distinct_values(&self, att: usize) -> Result<usize> {
        let attr = self.attribute(att)?;
        if ! attr.is_numeric() {
            return Ok(attr.num_values());
        }

        let mut values: Vec<f64> = self.rows.iter().map(|r| r[att]).filter(|&v| ! is_missing(v)).collect();
        values.sort_by(|&a, &b| compare_values(a, b));
        values.dedup();
        Ok(values.len())
    }

    /// The `k`-th smallest (zero based) non-missing value of a numeric attribute
    pub fn kth_smallest_value(&self, att: usize, k: usize) -> Result<f64> {
        self.check_numeric(att)?;

        let mut values: Vec<f64> = self.rows.iter().map(|r| r[att]).filter(|&v| ! is_missing(v)).collect();
        if k >= values.len() {
            return Err(BayesNetError::InstanceOutOfRange { index: k, len: values.len() });
        }

        let (_, kth, _) = values.select_nth_unstable_by(k, |&a, &b| compare_values(a, b));
        Ok(*kth)
    }

    /// Bootstrap sample: draw `num_instances` rows uniformly with replacement
    pub fn resample<R: Rng + ?Sized>(&self, rng: &mut R) -> Instances {
        let mut sample = self.empty_copy();
        if self.rows.is_empty() {
            return sample;
        }

        sample.rows = (0..self.rows.len())
            .map(|_| self.rows[rng.gen_range(0..self.rows.len())].clone())
            .collect();
        sample
    }

    /// Draw `size` distinct rows uniformly without replacement, keeping their weights and their
    /// order in the dataset. The sample holds every row when `size` is not smaller than
    /// `num_instances`.
    pub fn resample_without_replacement<R: Rng + ?Sized>(&self, rng: &mut R, size: usize) -> Instances {
        let n = self.rows.len();
        let mut indices = index::sample(rng, n, size.min(n)).into_vec();
        indices.sort_unstable();

        let mut sample = self.empty_copy();
        sample.rows = indices.into_iter().map(|i| self.rows[i].clone()).collect();
        sample
    }

    /// Draw `num_instances` rows with replacement, each row chosen with probability proportional
    /// to its weight. The sampled rows have unit weight.
    pub fn resample_with_weights<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Instances> {
        let weights: Vec<f64> = self.rows.iter().map(|r| r.weight()).collect();
        self.resample_with_given_weights(rng, &weights)
    }

    /// Draw `num_instances` rows with replacement, row `i` chosen with probability proportional
    /// to `weights[i]`. The sampled rows have unit weight.
    pub fn resample_with_given_weights<R: Rng + ?Sized>(&self, rng: &mut R, weights: &[f64]) -> Result<Instances> {
        if weights.len() != self.rows.len() {
            return Err(BayesNetError::WidthMismatch { expected: self.rows.len(), found: weights.len() });
        }
        if let Some(&w) = weights.iter().find(|&&w| ! w.is_finite() || w < 0.0) {
            return Err(BayesNetError::InvalidWeight(w));
        }

        let mut sample = self.empty_copy();
        let total: f64 = weights.iter().sum();
        let n = self.rows.len();
        if n == 0 || total <= 0.0 {
            return Ok(sample);
        }

        // sorted uniform draws over [0, total), merged against the cumulative weights
        let mut points: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() * total).collect();
        points.sort_by(|&a, &b| compare_values(a, b));

        let mut cumulative = 0.0;
        let mut k = 0;
        for (row, &w) in self.rows.iter().zip(weights) {
            cumulative += w;
            while k < n && points[k] < cumulative {
                sample.rows.push(Instance::new(row.values().to_vec()));
                k += 1;
            }
        }

        // rounding can leave the last few draws past the final cumulative weight
        if let Some(last) = self.rows.iter().zip(weights).filter(|&(_, &w)| w > 0.0).map(|(r, _)| r).last() {
            while sample.rows.len() < n {
                sample.rows.push(Instance::new(last.values().to_vec()));
            }
        }

        Ok(sample)
    }

    fn check_attribute_index(&self, index: usize) -> Result<()> {
        if index < self.attributes.len() {
            Ok(())
        } else {
            Err(BayesNetError::AttributeOutOfRange { index, width: self.attributes.len() })
        }
    }

    fn check_numeric(&self, att: usize) -> Result<()> {
        let attr = self.attribute(att)?;
        if attr.is_numeric() {
            Ok(())
        } else {
            Err(BayesNetError::NotNumeric(String::from(attr.name())))
        }
    }

}


/// Total order on cell values with missing values sorted last
fn compare_values(a: f64, b: f64) -> Ordering {
    match (is_missing(a), is_missing(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }
}
