//! Discretizes the numeric columns of a small dataset against its class and shows the bins.

use bayesnet as b;
use b::data::{Attribute, Instances};
use b::filters::{Discretize, Filter};

fn main() -> b::Result<()> {
    env_logger::init();

    ////////////////////////////////////////////////////////////////////////////
    // Step 1:  Build a dataset with two numeric columns
    //
    // Note:    `petal` separates the classes, `noise` does not
    let mut data = Instances::new("flowers", vec![
        Attribute::numeric("petal"),
        Attribute::numeric("noise"),
        Attribute::nominal("species", &["setosa", "versicolor", "virginica"])?,
    ])?;
    data.set_class_index(Some(2))?;

    for i in 0..90 {
        let species = ["setosa", "versicolor", "virginica"][i / 30];
        let petal = 1.0 + (i / 30) as f64 * 2.5 + (i % 7) as f64 * 0.2;
        let noise = ((i * 37) % 11) as f64;
        data.add_labels(&[petal.to_string(), noise.to_string(), String::from(species)], 1.0)?;
    }

    ////////////////////////////////////////////////////////////////////////////
    // Step 2:  Fit the filter and transform the dataset
    let mut filter = Discretize::new();
    let discretized = filter.fit_transform(&data)?;

    ////////////////////////////////////////////////////////////////////////////
    // Step 3:  Show the bins of each column
    for att in 0..2 {
        let attr = discretized.attribute(att)?;
        println!("{}: cut points {:?}", attr.name(), filter.cut_points(att).unwrap_or(&[]));
        for bin in 0..attr.num_values() {
            let count = discretized.iter().filter(|r| r[att] == bin as f64).count();
            println!("    {:<16} {} rows", attr.value(bin).unwrap_or("?"), count);
        }
    }

    Ok(())
}
