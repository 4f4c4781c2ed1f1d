//! Dataset builders shared by the integration tests

#![allow(dead_code)]

use bayesnet::data::{Attribute, Instance, Instances};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Route the library's log records to the test output, e.g. with `RUST_LOG=debug`
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn flip<R: Rng>(rng: &mut R, value: f64, keep: f64) -> f64 {
    if rng.gen::<f64>() < keep { value } else { 1.0 - value }
}

/// Four binary variables drawn from the tree A -> B, A -> C, B -> D, with A as the class
pub fn tree_dataset(n: usize, seed: u64) -> Instances {
    let attributes = ["A", "B", "C", "D"]
        .iter()
        .map(|name| Attribute::nominal(name, &["f", "t"]).unwrap())
        .collect();
    let mut data = Instances::new("tree", attributes).unwrap();
    data.set_class_index(Some(0)).unwrap();

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..n {
        let a = if rng.gen::<f64>() < 0.5 { 1.0 } else { 0.0 };
        let b = flip(&mut rng, a, 0.85);
        let c = flip(&mut rng, a, 0.8);
        let d = flip(&mut rng, b, 0.9);
        data.add(Instance::new(vec![a, b, c, d])).unwrap();
    }

    data
}

/// A numeric column `v` and a nominal class `c` with the given labels
pub fn numeric_dataset(rows: &[(f64, &str)], classes: &[&str]) -> Instances {
    let mut data = Instances::new("numbers", vec![
        Attribute::numeric("v"),
        Attribute::nominal("c", classes).unwrap(),
    ]).unwrap();
    data.set_class_index(Some(1)).unwrap();

    for &(v, c) in rows {
        data.add_labels(&[v.to_string().as_str(), c], 1.0).unwrap();
    }
    data
}
