//! Run-directory input and model construction.

use std::path::Path;

use log::info;
use rand::Rng;

use crate::disorder::{apply_anderson, apply_charged_impurities, ChargedImpurity};
use crate::error::{ModelError, Result};
use crate::general::GeneralInput;
use crate::input::{parse_grid, read_file, read_optional_file};
use crate::lattice::{LatticeSpec, SimulationBox};
use crate::neighbor::{Hop, NeighborTable};
use crate::params::{ModelKind, Parameters};
use crate::state::{fill_random_state, StateVector};
use crate::vacancy::{apply_vacancies, compact_values};
use crate::Real;

pub const PARAMETER_FILE: &str = "para.in";
pub const ENERGY_FILE: &str = "energy.in";
pub const TIME_STEP_FILE: &str = "time_step.in";
pub const LATTICE_FILE: &str = "lattice.in";
pub const NEIGHBOR_FILE: &str = "neighbor.in";
pub const POSITION_FILE: &str = "position.in";
pub const HOPPING_FILE: &str = "hopping.in";
pub const POTENTIAL_FILE: &str = "potential.in";

/// Where the Hamiltonian structure comes from.
#[derive(Debug, Clone)]
pub enum Structure {
    Lattice(LatticeSpec),
    General(GeneralInput),
}

/// Everything read from a run directory, before any random sampling.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub parameters: Parameters,
    pub energies: Vec<Real>,
    /// Empty unless VAC or MSD is requested.
    pub time_steps: Vec<Real>,
    pub structure: Structure,
}

impl ModelInput {
    /// Load a run directory.
    ///
    /// `para.in` is read and validated first, so a bad key is reported
    /// before any other file is opened.
    pub fn read(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let parameters = Parameters::parse(&read_file(&dir.join(PARAMETER_FILE))?)?;
        let energies = parse_grid(ENERGY_FILE, &read_file(&dir.join(ENERGY_FILE))?, "energies")?;
        let time_steps = if parameters.requires_time() {
            parse_grid(
                TIME_STEP_FILE,
                &read_file(&dir.join(TIME_STEP_FILE))?,
                "time steps",
            )?
        } else {
            Vec::new()
        };
        let structure = match parameters.model {
            ModelKind::Lattice => Structure::Lattice(LatticeSpec::parse(
                LATTICE_FILE,
                &read_file(&dir.join(LATTICE_FILE))?,
            )?),
            ModelKind::General => Structure::General(GeneralInput {
                neighbor: read_file(&dir.join(NEIGHBOR_FILE))?,
                position: read_file(&dir.join(POSITION_FILE))?,
                hopping: read_optional_file(&dir.join(HOPPING_FILE))?,
                potential: read_optional_file(&dir.join(POTENTIAL_FILE))?,
            }),
        };
        info!(
            "read {}: {} energies, {} time steps",
            dir.display(),
            energies.len(),
            time_steps.len()
        );
        Ok(Self {
            parameters,
            energies,
            time_steps,
            structure,
        })
    }

    /// Assemble an input from file contents already in memory.
    ///
    /// `time_step` is only consulted when VAC or MSD is requested.
    pub fn from_texts(
        para: &str,
        energy: &str,
        time_step: Option<&str>,
        structure: Structure,
    ) -> Result<Self> {
        let parameters = Parameters::parse(para)?;
        let energies = parse_grid(ENERGY_FILE, energy, "energies")?;
        let time_steps = if parameters.requires_time() {
            let text = time_step.ok_or_else(|| {
                ModelError::config("calculate_vac/calculate_msd need a time-step grid")
            })?;
            parse_grid(TIME_STEP_FILE, text, "time steps")?
        } else {
            Vec::new()
        };
        let input = Self {
            parameters,
            energies,
            time_steps,
            structure,
        };
        input.check_structure()?;
        Ok(input)
    }

    fn check_structure(&self) -> Result<()> {
        match (&self.structure, self.parameters.model) {
            (Structure::Lattice(_), ModelKind::Lattice)
            | (Structure::General(_), ModelKind::General) => Ok(()),
            (Structure::Lattice(_), ModelKind::General) => Err(ModelError::config(
                "model 0 (general) given a lattice structure",
            )),
            (Structure::General(_), ModelKind::Lattice) => Err(ModelError::config(
                "model 1 (lattice) given a general structure",
            )),
        }
    }
}

/// A fully constructed Hamiltonian with its disorder fields.
#[derive(Debug, Clone)]
pub struct Model {
    pub parameters: Parameters,
    pub energies: Vec<Real>,
    pub time_steps: Vec<Real>,
    table: NeighborTable,
    potential: Vec<Real>,
    positions: Option<Vec<[Real; 3]>>,
    simulation_box: Option<SimulationBox>,
    volume: Real,
    vacancies: Vec<usize>,
    impurities: Vec<ChargedImpurity>,
}

impl Model {
    /// Build the model, drawing from `rng` in a fixed order: vacancies first,
    /// then on-site disorder.
    pub fn build<R: Rng>(input: ModelInput, rng: &mut R) -> Result<Self> {
        input.parameters.validate()?;
        input.check_structure()?;
        let ModelInput {
            parameters,
            energies,
            time_steps,
            structure,
        } = input;

        let model = match structure {
            Structure::General(general) => {
                let s = general.build()?;
                Self {
                    parameters,
                    energies,
                    time_steps,
                    table: s.table,
                    potential: s.potential,
                    positions: None,
                    simulation_box: None,
                    volume: s.volume,
                    vacancies: Vec::new(),
                    impurities: Vec::new(),
                }
            }
            Structure::Lattice(spec) => {
                Self::build_lattice(parameters, energies, time_steps, &spec, rng)?
            }
        };

        info!(
            "model ready: {} atoms, {} hops, volume {}",
            model.number_of_atoms(),
            model.table.total_hops(),
            model.volume
        );
        Ok(model)
    }

    fn build_lattice<R: Rng>(
        parameters: Parameters,
        energies: Vec<Real>,
        time_steps: Vec<Real>,
        spec: &LatticeSpec,
        rng: &mut R,
    ) -> Result<Self> {
        let supercell = spec.expand(parameters.charged_impurity.is_some())?;
        let simulation_box = supercell.simulation_box;
        let mut table = supercell.table;
        let mut positions = supercell.positions;
        let mut vacancies = Vec::new();

        if let Some(k) = parameters.vacancy_disorder {
            let removal = apply_vacancies(table, k, rng)?;
            positions = positions.map(|p| compact_values(&p, &removal.is_vacancy));
            table = removal.table;
            vacancies = removal.vacancies;
        }

        let mut potential = vec![0.0; table.number_of_atoms()];
        let mut impurities = Vec::new();
        if let Some(w) = parameters.anderson_disorder {
            apply_anderson(&mut potential, w, rng);
        } else if let Some(ci) = parameters.charged_impurity.as_ref() {
            let p = positions
                .as_deref()
                .ok_or_else(|| ModelError::config("charged impurities need atom positions"))?;
            impurities = apply_charged_impurities(&mut potential, p, &simulation_box, ci, rng)?;
        }

        Ok(Self {
            parameters,
            energies,
            time_steps,
            table,
            potential,
            positions,
            simulation_box: Some(simulation_box),
            volume: simulation_box.volume(),
            vacancies,
            impurities,
        })
    }

    pub fn number_of_atoms(&self) -> usize {
        self.table.number_of_atoms()
    }

    pub fn neighbor_table(&self) -> &NeighborTable {
        &self.table
    }

    pub fn hops(&self, atom: usize) -> impl Iterator<Item = Hop> + '_ {
        self.table.hops(atom)
    }

    pub fn total_hops(&self) -> usize {
        self.table.total_hops()
    }

    pub fn potential(&self) -> &[Real] {
        &self.potential
    }

    /// Atom positions, present only when charged impurities were requested.
    pub fn positions(&self) -> Option<&[[Real; 3]]> {
        self.positions.as_deref()
    }

    /// `None` for the general model.
    pub fn simulation_box(&self) -> Option<&SimulationBox> {
        self.simulation_box.as_ref()
    }

    pub fn volume(&self) -> Real {
        self.volume
    }

    /// Vacancy sites in the original (pre-removal) numbering.
    pub fn vacancies(&self) -> &[usize] {
        &self.vacancies
    }

    pub fn impurities(&self) -> &[ChargedImpurity] {
        &self.impurities
    }

    /// Overwrite `state` with a random-phase vector for one stochastic sample.
    pub fn random_state<R: Rng>(&self, state: &mut StateVector, rng: &mut R) {
        assert_eq!(state.len(), self.number_of_atoms(), "state size mismatch");
        fill_random_state(
            &mut state.real,
            &mut state.imag,
            self.parameters.calculate_spin,
            rng,
        );
    }
}
