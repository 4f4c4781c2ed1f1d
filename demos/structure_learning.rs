//! Learns the structure of a classifier with every search algorithm and compares the results.

use bayesnet as b;
use b::data::{Attribute, Instance, Instances};
use b::estimators::{ScoreType, SimpleEstimator};
use b::model::BayesNet;
use b::search::global::{self, CvType, GlobalScore};
use b::search::local::{HillClimber, LocalScore, TabuSearch, Tan, K2};
use b::search::{NaiveBayes, SearchAlgorithm, SearchOptions};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> b::Result<()> {
    env_logger::init();

    ////////////////////////////////////////////////////////////////////////////
    // Step 1:  Sample a dataset from a known tree
    //
    // Note:    Rain -> Wet, Rain -> Umbrella, Wet -> Slip; Rain is the class
    let data = dataset(2_000, 11)?;

    ////////////////////////////////////////////////////////////////////////////
    // Step 2:  Run every search over the same data
    let searches: Vec<(&str, Box<dyn SearchAlgorithm>)> = vec![
        ("naive bayes", Box::new(NaiveBayes::new())),
        ("k2", Box::new(K2::default())),
        ("hill climber", Box::new(HillClimber::default())),
        ("tabu search", Box::new(TabuSearch::default())),
        ("tan", Box::new(Tan::default())),
        ("global k2", Box::new(global::K2::new(SearchOptions::default(), GlobalScore::new(CvType::KFold)))),
    ];

    let score = LocalScore::new(ScoreType::Bayes);
    for (name, mut search) in searches {
        let net = BayesNet::learn(&data, search.as_mut(), SimpleEstimator::default())?;

        ////////////////////////////////////////////////////////////////////////
        // Step 3:  Report the structure and its scores
        let accuracy = GlobalScore::default().score(&mut net.clone())?;
        println!("== {} ==", name);
        print!("{}", net);
        println!("bayes score {:.2}, leave-one-out accuracy {:.4}\n", score.network_score(&net)?, accuracy);

        if name == "tan" {
            println!("{}", net.to_dot());
        }
    }

    Ok(())
}

fn dataset(n: usize, seed: u64) -> b::Result<Instances> {
    let attributes = ["Rain", "Wet", "Umbrella", "Slip"]
        .iter()
        .map(|name| Attribute::nominal(name, &["no", "yes"]))
        .collect::<b::Result<Vec<_>>>()?;
    let mut data = Instances::new("weather", attributes)?;
    data.set_class_index(Some(0))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut noisy = |value: f64, keep: f64| if rng.gen::<f64>() < keep { value } else { 1.0 - value };
    for _ in 0..n {
        let rain = noisy(1.0, 0.3);
        let wet = noisy(rain, 0.9);
        let umbrella = noisy(rain, 0.8);
        let slip = noisy(wet, 0.75);
        data.add(Instance::new(vec![rain, wet, umbrella, slip]))?;
    }

    Ok(data)
}
