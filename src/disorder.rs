//! On-site disorder: Anderson and Gaussian-screened charged impurities.
//!
//! Both engines only write the per-atom potential; they never touch the
//! neighbor table.

use log::info;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{ModelError, Result};
use crate::lattice::SimulationBox;
use crate::params::ChargedImpurityParams;
use crate::random::{sample_distinct, uniform_symmetric};
use crate::Real;

/// Overwrite every on-site energy with an independent draw from
/// `[-strength/2, +strength/2]`.
pub fn apply_anderson<R: Rng>(potential: &mut [Real], strength: Real, rng: &mut R) {
    for v in potential.iter_mut() {
        *v = uniform_symmetric(rng, strength);
    }
    info!(
        "Anderson disorder W = {strength} on {} atoms",
        potential.len()
    );
}

/// A point charge sitting on an atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargedImpurity {
    pub site: usize,
    pub charge: Real,
}

/// Choose distinct impurity sites, then draw one charge per impurity.
///
/// All sites are sampled before any charge, so the generator sequence is
/// the permutation followed by `number` uniform draws.
pub fn place_impurities<R: Rng>(
    number_of_atoms: usize,
    number: usize,
    strength: Real,
    rng: &mut R,
) -> Result<Vec<ChargedImpurity>> {
    if number == 0 || number > number_of_atoms {
        return Err(ModelError::config(format!(
            "number of charged impurities must be in [1, {number_of_atoms}], got {number}"
        )));
    }
    let sites = sample_distinct(rng, number_of_atoms, number);
    Ok(sites
        .into_iter()
        .map(|site| ChargedImpurity {
            site,
            charge: uniform_symmetric(rng, strength),
        })
        .collect())
}

/// Screened potential felt at `position` from every impurity.
#[inline]
fn screened_sum(
    position: [Real; 3],
    positions: &[[Real; 3]],
    impurities: &[ChargedImpurity],
    simulation_box: &SimulationBox,
    inv_two_xi_sq: Real,
) -> Real {
    impurities
        .iter()
        .map(|imp| {
            let r2 = simulation_box.distance_squared(position, positions[imp.site]);
            imp.charge * (-r2 * inv_two_xi_sq).exp()
        })
        .sum()
}

/// Reset and accumulate `Σ q exp(-r²/2ξ²)` at every atom.
///
/// Distances follow the minimum-image convention of `simulation_box`.
/// Each atom's sum is independent, so the loop runs in parallel when the
/// `parallel` feature is on; the result does not depend on it.
pub fn accumulate_screened_potential(
    potential: &mut [Real],
    positions: &[[Real; 3]],
    impurities: &[ChargedImpurity],
    range: Real,
    simulation_box: &SimulationBox,
) {
    assert_eq!(potential.len(), positions.len());
    let inv_two_xi_sq = 1.0 / (2.0 * range * range);

    #[cfg(feature = "parallel")]
    potential
        .par_iter_mut()
        .zip(positions.par_iter())
        .for_each(|(v, &r)| {
            *v = screened_sum(r, positions, impurities, simulation_box, inv_two_xi_sq);
        });

    #[cfg(not(feature = "parallel"))]
    for (v, &r) in potential.iter_mut().zip(positions) {
        *v = screened_sum(r, positions, impurities, simulation_box, inv_two_xi_sq);
    }
}

/// Place impurities and fill `potential` with their screened field.
pub fn apply_charged_impurities<R: Rng>(
    potential: &mut [Real],
    positions: &[[Real; 3]],
    simulation_box: &SimulationBox,
    params: &ChargedImpurityParams,
    rng: &mut R,
) -> Result<Vec<ChargedImpurity>> {
    let impurities = place_impurities(potential.len(), params.number, params.strength, rng)?;
    accumulate_screened_potential(
        potential,
        positions,
        &impurities,
        params.range,
        simulation_box,
    );
    info!(
        "placed {} charged impurities (W = {}, xi = {})",
        impurities.len(),
        params.strength,
        params.range
    );
    Ok(impurities)
}
