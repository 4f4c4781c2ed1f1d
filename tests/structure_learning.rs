mod common;

use bayesnet::estimators::{ScoreType, SimpleEstimator};
use bayesnet::model::BayesNet;
use bayesnet::search::global::{self, CvType, GlobalScore};
use bayesnet::search::local::{HillClimber, LocalScore, TabuSearch, Tan, K2};
use bayesnet::search::{init_as_naive_bayes, NaiveBayes, SearchAlgorithm, SearchOptions};

const EPS: f64 = 1e-9;

fn network() -> BayesNet {
    BayesNet::new(common::tree_dataset(1000, 42)).unwrap()
}

#[test]
/// Test that TAN recovers the generating tree: the class A above every node, and B - D linked
fn tan_recovers_tree() {
    common::init_logging();
    let mut net = network();
    Tan::default().build_structure(&mut net).unwrap();

    assert_eq!(5, net.num_arcs());
    assert!(net.is_arc(0, 1));
    assert!(net.is_arc(0, 2));
    assert!(net.is_arc(0, 3));
    assert!(net.is_arc(1, 3) || net.is_arc(3, 1));
    assert!((0..4).all(|n| net.num_parents(n) <= 2));
    assert!(net.topological_order().is_ok());
}

#[test]
/// Test that K2 in the natural order scores at least as well as naive Bayes
fn k2_beats_naive_bayes() {
    common::init_logging();
    let score = LocalScore::new(ScoreType::Bayes);

    let mut naive = network();
    init_as_naive_bayes(&mut naive).unwrap();
    let baseline = score.network_score(&naive).unwrap();

    let mut net = network();
    let mut k2 = K2::new(SearchOptions::default().with_max_parents(2), score);
    k2.build_structure(&mut net).unwrap();

    assert!(score.network_score(&net).unwrap() >= baseline - EPS);
    assert!(net.is_arc(1, 3));
}

#[test]
/// Test that hill climbing run to convergence has nothing left to do on its own output
fn hill_climbing_is_idempotent() {
    common::init_logging();
    let mut net = network();
    let mut search = HillClimber::default();

    search.build_structure(&mut net).unwrap();
    assert!(! search.performed_operations().is_empty());
    let learned = net.parent_sets().to_vec();

    search.search(&mut net).unwrap();
    assert!(search.performed_operations().is_empty());
    assert_eq!(learned, net.parent_sets());
}

#[test]
/// Test that tabu search never revisits the moves in its tabu list
fn tabu_non_repetition() {
    common::init_logging();
    let mut net = network();
    let mut search = TabuSearch::default().with_runs(25).with_tabu_length(4);
    search.build_structure(&mut net).unwrap();

    let ops = search.performed_operations();
    assert_eq!(25, ops.len());
    for (i, op) in ops.iter().enumerate() {
        for earlier in ops[i.saturating_sub(4)..i].iter() {
            assert!(! earlier.same_move(op));
            assert!(! earlier.undone_by(op));
        }
    }
}

#[test]
/// Test that every search leaves an acyclic network with normalized tables
fn learned_networks_are_consistent() {
    common::init_logging();
    let data = common::tree_dataset(200, 7);

    let mut searches: Vec<Box<dyn SearchAlgorithm>> = vec![
        Box::new(NaiveBayes::new()),
        Box::new(K2::default().with_random_order(3)),
        Box::new(HillClimber::new(SearchOptions::default().with_max_parents(3), LocalScore::new(ScoreType::Mdl))),
        Box::new(TabuSearch::new(SearchOptions::default().with_markov_blanket_classifier(true), LocalScore::new(ScoreType::BDeu))),
        Box::new(Tan::new(LocalScore::new(ScoreType::Aic))),
        Box::new(global::K2::new(SearchOptions::default(), GlobalScore::new(CvType::KFold).with_folds(5))),
    ];

    for search in searches.iter_mut() {
        let net = BayesNet::learn(&data, search.as_mut(), SimpleEstimator::default()).unwrap();
        assert!(net.topological_order().is_ok());

        for node in 0..net.num_nodes() {
            for config in 0..net.parent_cardinality(node) {
                let total: f64 = (0..net.cardinality(node)).map(|s| net.probability(node, config, s).unwrap()).sum();
                assert!((total - 1.0).abs() < EPS);
            }
        }

        let row = data.instance(0).unwrap();
        let dist = net.distribution_for_instance(row).unwrap();
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < EPS);
    }
}

#[test]
/// Test that the options of every search survive a trip through JSON
fn options_round_trip() {
    let climber = HillClimber::new(SearchOptions::default().with_max_parents(4), LocalScore::new(ScoreType::Mdl))
        .with_arc_reversal(false);
    let json = serde_json::to_string(&climber).unwrap();
    assert_eq!(climber, serde_json::from_str::<HillClimber>(&json).unwrap());

    let tabu = TabuSearch::default().with_runs(7).with_tabu_length(2);
    let json = serde_json::to_string(&tabu).unwrap();
    assert_eq!(tabu, serde_json::from_str::<TabuSearch>(&json).unwrap());

    let score = GlobalScore::new(CvType::Cumulative).with_use_prob(false);
    let json = serde_json::to_string(&score).unwrap();
    assert_eq!(score, serde_json::from_str::<GlobalScore>(&json).unwrap());

    // missing fields take their defaults
    let k2: K2 = serde_json::from_str(r#"{"random_order": true}"#).unwrap();
    assert_eq!(2, k2.options().max_parents());
    assert_eq!(ScoreType::Bayes, k2.score().score_type());
    let options: SearchOptions = serde_json::from_str(r#"{"max_parents": 5}"#).unwrap();
    assert!(options.init_as_naive_bayes());
    assert_eq!(5, options.max_parents());
}
