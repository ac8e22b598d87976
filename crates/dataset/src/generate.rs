//! Synthetic house-price data generation
//!
//! Draws the six canonical features from fixed distributions and prices them
//! with a near-linear formula plus Gaussian noise, for bootstrapping when no
//! real dataset is available.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use crate::error::DatasetError;
use crate::table::{Cell, Table};

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub n_samples: usize,
    /// Standard deviation of the price noise term
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            noise_std: 5000.0,
            seed: 42,
        }
    }
}

/// Generate a synthetic labeled table in canonical column order
pub fn generate(config: &GeneratorConfig) -> Table {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut table = Table::new(vec![
        "area".to_string(),
        "bedrooms".to_string(),
        "bathrooms".to_string(),
        "floors".to_string(),
        "year_built".to_string(),
        "location_score".to_string(),
        "price".to_string(),
    ]);

    for _ in 0..config.n_samples {
        let area = rng.gen_range(50.0..300.0);
        let bedrooms = rng.gen_range(1..6) as f64;
        let bathrooms = rng.gen_range(1..4) as f64;
        let floors = rng.gen_range(1..4) as f64;
        let year_built = rng.gen_range(1990..2024) as f64;
        let location_score = rng.gen_range(3.0..10.0);

        let price = (area * 50.0
            + bedrooms * 5000.0
            + bathrooms * 3000.0
            + floors * 2000.0
            + year_built * 100.0
            + location_score * 10000.0
            + gaussian(&mut rng) * config.noise_std)
            .abs();

        table.rows.push(vec![
            Cell::Num(area),
            Cell::Num(bedrooms),
            Cell::Num(bathrooms),
            Cell::Num(floors),
            Cell::Num(year_built),
            Cell::Num(location_score),
            Cell::Num(price),
        ]);
    }

    tracing::info!("generated {} synthetic samples", config.n_samples);
    table
}

/// Generate and write straight to a CSV file
pub fn generate_to_csv<P: AsRef<Path>>(
    config: &GeneratorConfig,
    path: P,
) -> Result<Table, DatasetError> {
    let table = generate(config);
    table.write_csv(path)?;
    Ok(table)
}

/// Standard normal sample via Box-Muller, avoiding a rand_distr dependency
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
