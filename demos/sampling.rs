//! Generates a random Bayesian network, samples a dataset from it, and learns the structure back
//! from the samples.

use bayesnet as b;
use b::estimators::{ScoreType, SimpleEstimator};
use b::model::{BayesNet, BayesNetGenerator};
use b::samplers::ForwardSampler;
use b::search::local::{HillClimber, LocalScore};
use b::search::SearchOptions;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> b::Result<()> {
    env_logger::init();

    ////////////////////////////////////////////////////////////////////////////
    // Step 1:  Generate the truth
    //
    // Note:    6 ternary nodes joined by 8 arcs, the last node the class
    let truth = BayesNetGenerator::new(6, 8, 3).with_seed(2024).generate()?;
    println!("{}", truth);

    ////////////////////////////////////////////////////////////////////////////
    // Step 2:  Sample a dataset from the truth
    let mut sampler = ForwardSampler::new(&truth, StdRng::seed_from_u64(7))?;
    let data = sampler.sample_dataset(5_000)?;

    ////////////////////////////////////////////////////////////////////////////
    // Step 3:  Learn a network from the samples
    //
    // Note:    no naive Bayes seeding, so every arc is up to the search
    let options = SearchOptions::default()
        .with_init_as_naive_bayes(false)
        .with_max_parents(3);
    let mut search = HillClimber::new(options, LocalScore::new(ScoreType::Mdl));
    let learned = BayesNet::learn(&data, &mut search, SimpleEstimator::default())?;
    println!("{}", learned);

    ////////////////////////////////////////////////////////////////////////////
    // Step 4:  Compare the skeletons
    let n = truth.num_nodes();
    let mut found = 0;
    let mut reversed = 0;
    let mut extra = 0;
    for head in 0..n {
        for tail in 0..n {
            match (truth.is_arc(tail, head), learned.is_arc(tail, head), learned.is_arc(head, tail)) {
                (true, true, _) => found += 1,
                (true, false, true) => reversed += 1,
                (false, true, false) => extra += 1,
                _ => ()
            }
        }
    }

    println!("operations performed: {}", search.performed_operations().len());
    println!("arcs found: {} of {}, reversed: {}, extra: {}", found, truth.num_arcs(), reversed, extra);
    println!("MDL score of the truth:   {:.2}", score(&truth, &data)?);
    println!("MDL score of the learned: {:.2}", learned.log_score(ScoreType::Mdl)?);

    Ok(())
}

/// The MDL score of the structure of `network` refitted to `data`
fn score(network: &BayesNet, data: &b::data::Instances) -> b::Result<f64> {
    let mut refit = BayesNet::new(data.clone())?;
    refit.set_parent_sets(network.parent_sets().to_vec())?;
    refit.estimate_cpts()?;
    refit.log_score(ScoreType::Mdl)
}
