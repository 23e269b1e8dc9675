//! Build the model for each run directory given on the command line.

use std::path::{Path, PathBuf};
use std::process;

use log::{error, info};
use lsqt_model::prelude::*;
use rand::rngs::StdRng;

fn run(dir: &Path, rng: &mut StdRng) -> Result<(), ModelError> {
    let input = ModelInput::read(dir)?;
    let model = Model::build(input, rng)?;

    let mut state = StateVector::zeros(model.number_of_atoms());
    model.random_state(&mut state, rng);

    let p = &model.parameters;
    info!(
        "{}: {} atoms, {} hops, {} energies in [-{}, {}], {} moments x {} random vectors",
        dir.display(),
        model.number_of_atoms(),
        model.total_hops(),
        model.energies.len(),
        p.energy_max,
        p.energy_max,
        p.number_of_moments,
        p.number_of_random_vectors
    );
    if !model.vacancies().is_empty() {
        info!("{} vacancies", model.vacancies().len());
    }
    if !model.impurities().is_empty() {
        info!("{} charged impurities", model.impurities().len());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut dirs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    let seed = SeedPolicy::from_build();
    info!("seed policy: {seed:?}");
    let mut rng = seed.into_rng();

    for dir in &dirs {
        if let Err(e) = run(dir, &mut rng) {
            error!("{}: {e}", dir.display());
            eprintln!("error: {}: {e}", dir.display());
            process::exit(1);
        }
    }
}
