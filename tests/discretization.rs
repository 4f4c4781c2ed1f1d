mod common;

use bayesnet::data::{Attribute, Instance, Instances};
use bayesnet::estimators::SimpleEstimator;
use bayesnet::filters::{Discretize, Filter};
use bayesnet::model::BayesNet;
use bayesnet::search::local::K2;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
/// Test that a column perfectly correlated with the class gets exactly one cut, between 2 and 5
fn perfect_separation() {
    common::init_logging();
    let rows: Vec<(f64, &str)> = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 5.0, 5.0, 5.0]
        .iter()
        .zip(["0", "0", "0", "0", "0", "0", "1", "1", "1"].iter())
        .map(|(&v, &c)| (v, c))
        .collect();
    let data = common::numeric_dataset(&rows, &["0", "1"]);

    let mut filter = Discretize::new();
    let out = filter.fit_transform(&data).unwrap();

    let cuts = filter.cut_points(0).unwrap();
    assert_eq!(1, cuts.len());
    assert!(cuts[0] > 2.0 && cuts[0] < 5.0);
    assert_eq!(2, out.attribute(0).unwrap().num_values());

    let bins: Vec<f64> = out.iter().map(|r| r[0]).collect();
    assert_eq!(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0], bins);
}

/// A noisy threshold concept over a numeric column, three classes
fn noisy(seed: u64) -> Instances {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::new();
    for _ in 0..300 {
        let v = (rng.gen::<f64>() * 100.0).round();
        let mut c = if v < 30.0 { "low" } else if v < 70.0 { "mid" } else { "high" };
        if rng.gen::<f64>() < 0.1 {
            c = "mid";
        }
        rows.push((v, c));
    }
    common::numeric_dataset(&rows, &["low", "mid", "high"])
}

#[test]
/// Test that the bins are monotone in the value and never outnumber the distinct values
fn monotone_bins() {
    common::init_logging();
    for seed in 0..5 {
        let data = noisy(seed);
        for &better in &[false, true] {
            let mut filter = Discretize::new().with_better_encoding(better);
            let out = filter.fit_transform(&data).unwrap();

            let cuts = filter.cut_points(0).unwrap();
            assert!(cuts.windows(2).all(|w| w[0] < w[1]));

            let bins = out.attribute(0).unwrap().num_values();
            assert_eq!(cuts.len() + 1, bins);
            assert!(bins <= data.num_distinct_values(0).unwrap());

            let mut pairs: Vec<(f64, f64)> = data.iter().zip(out.iter()).map(|(r, o)| (r[0], o[0])).collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
            assert!(pairs.windows(2).all(|w| w[0].1 <= w[1].1));
        }
    }
}

#[test]
/// Test that a constant column collapses into a single bin
fn constant_column() {
    let rows = [(4.0, "a"), (4.0, "b"), (4.0, "a"), (4.0, "b")];
    let data = common::numeric_dataset(&rows, &["a", "b"]);

    let mut filter = Discretize::new();
    let out = filter.fit_transform(&data).unwrap();
    assert_eq!(Some(&[][..]), filter.cut_points(0));
    assert_eq!(&["All"], out.attribute(0).unwrap().values());
    assert!(out.iter().all(|r| r[0] == 0.0));
}

#[test]
/// Test that learning from raw numeric data discretizes it and maps new raw rows onto the bins
fn learn_from_numeric_data() {
    common::init_logging();
    let mut data = Instances::new("mixed", vec![
        Attribute::numeric("v"),
        Attribute::nominal("x", &["0", "1"]).unwrap(),
        Attribute::nominal("c", &["0", "1"]).unwrap(),
    ]).unwrap();
    data.set_class_index(Some(2)).unwrap();
    for i in 0..60 {
        let c = (i % 2) as f64;
        let v = if c == 0.0 { (i % 10) as f64 } else { 20.0 + (i % 10) as f64 };
        data.add(Instance::new(vec![v, c, c])).unwrap();
    }

    let net = BayesNet::learn(&data, &mut K2::default(), SimpleEstimator::default()).unwrap();
    assert!(net.instances().attribute(0).unwrap().is_nominal());
    assert_eq!(2, net.cardinality(0));

    let raw = Instance::new(vec![25.0, 1.0, 0.0]);
    let row = net.normalize_instance(&raw).unwrap();
    assert_eq!(1.0, row[0]);
    assert_eq!(1.0, net.classify_instance(&row).unwrap());
}
