//! # lsqt-model
//!
//! Model construction for linear-scaling quantum transport (LSQT).
//!
//! Builds the sparse tight-binding Hamiltonian consumed by a Chebyshev-moment
//! propagation engine, together with the on-site disorder fields and the
//! random-phase states used for stochastic trace estimation.
//!
//! ## Pipeline
//!
//! 1. **Structure**: a unit cell expanded into a supercell ([`lattice`]) or an
//!    explicit neighbor list ([`general`]).
//! 2. **Vacancies**: atoms removed without replacement and the neighbor table
//!    recompacted ([`vacancy`]).
//! 3. **On-site disorder**: Anderson or Gaussian-screened charged impurities
//!    ([`disorder`]).
//! 4. **Random states**: one per stochastic sample ([`state`]).
//!
//! The random generator is owned by the caller and passed by `&mut` into every
//! sampling step, so a fixed seed reproduces a run exactly.
//!
//! ## Usage
//!
//! ```no_run
//! use lsqt_model::prelude::*;
//!
//! let input = ModelInput::read("runs/graphene").unwrap();
//! let mut rng = SeedPolicy::from_build().into_rng();
//! let model = Model::build(input, &mut rng).unwrap();
//! let mut state = StateVector::zeros(model.number_of_atoms());
//! model.random_state(&mut state, &mut rng);
//! ```

pub mod disorder;
pub mod error;
pub mod general;
pub mod input;
pub mod lattice;
pub mod model;
pub mod neighbor;
pub mod params;
pub mod random;
pub mod state;
pub mod vacancy;


/// Floating-point type used for every physical quantity.
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

/// Floating-point type used for every physical quantity.
#[cfg(feature = "single-precision")]
pub type Real = f32;

pub mod prelude {
    pub use crate::disorder::*;
    pub use crate::error::ModelError;
    pub use crate::general::*;
    pub use crate::lattice::*;
    pub use crate::model::*;
    pub use crate::neighbor::*;
    pub use crate::params::*;
    pub use crate::random::*;
    pub use crate::state::*;
    pub use crate::vacancy::*;
    pub use crate::Real;
}
