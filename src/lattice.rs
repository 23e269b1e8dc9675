//! Unit cell, supercell geometry and expansion into a neighbor table.
//!
//! Atoms are numbered row-major over cells and then orbitals:
//! `atom = ((nx * Ny + ny) * Nz + nz) * N_orbital + m`.
//!
//! A hop that leaves the supercell through an open face is dropped, so atoms
//! on open boundaries simply end up with fewer neighbors than bulk atoms.
//! Periodic axes wrap the neighbor cell modulo the extent.

use log::{debug, info};
use num_complex::Complex;

use crate::error::{ModelError, Result};
use crate::input::Tokens;
use crate::neighbor::{Hop, NeighborTable};
use crate::Real;

/// One hop of the unit-cell template, relative to the source cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoppingTemplate {
    pub cell_offset: [i64; 3],
    /// Orbital index of the target inside its cell.
    pub orbital: usize,
    pub hopping: Complex<Real>,
}

/// Orthorhombic box with per-axis boundary conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    pub length: [Real; 3],
    pub periodic: [bool; 3],
}

impl SimulationBox {
    /// Separation along `axis` under the minimum-image convention.
    ///
    /// On a periodic axis a separation larger than half the box is replaced
    /// by `L - d`.
    #[inline]
    pub fn minimum_image(&self, axis: usize, separation: Real) -> Real {
        let d = separation.abs();
        let l = self.length[axis];
        if self.periodic[axis] && d > 0.5 * l {
            l - d
        } else {
            d
        }
    }

    /// Squared minimum-image distance between two points.
    #[inline]
    pub fn distance_squared(&self, a: [Real; 3], b: [Real; 3]) -> Real {
        (0..3)
            .map(|axis| {
                let d = self.minimum_image(axis, b[axis] - a[axis]);
                d * d
            })
            .sum()
    }

    pub fn volume(&self) -> Real {
        self.length.iter().product()
    }
}

/// Contents of `lattice.in`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeSpec {
    /// Supercell extent in unit cells.
    pub cells: [usize; 3],
    pub periodic: [bool; 3],
    /// Axis along which velocity and current are evaluated.
    pub transport_axis: usize,
    pub lattice_constant: [Real; 3],
    pub max_neighbor: usize,
    /// Cartesian offset of each orbital inside the cell.
    pub orbital_positions: Vec<[Real; 3]>,
    /// Hopping template per orbital.
    pub hoppings: Vec<Vec<HoppingTemplate>>,
}

/// Result of expanding a [`LatticeSpec`].
#[derive(Debug, Clone)]
pub struct Supercell {
    pub table: NeighborTable,
    /// Per-atom Cartesian positions, only when requested.
    pub positions: Option<Vec<[Real; 3]>>,
    pub simulation_box: SimulationBox,
    /// Hops dropped at open boundaries.
    pub truncated_hops: usize,
}

fn positive_extent(tokens: &mut Tokens, field: &'static str) -> Result<usize> {
    let v = tokens.next_i64(field)?;
    if v <= 0 {
        return Err(ModelError::config(format!("{field} must be positive, got {v}")));
    }
    Ok(v as usize)
}

fn boundary_flag(tokens: &mut Tokens, field: &'static str) -> Result<bool> {
    match tokens.next_i64(field)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ModelError::config(format!("{field} must be 0 or 1, got {other}"))),
    }
}

/// Raw neighbor cell `cell + offset`, before folding.
fn shifted_cell(cell: [usize; 3], offset: [i64; 3]) -> Result<[i64; 3]> {
    let mut raw = [0i64; 3];
    for axis in 0..3 {
        raw[axis] = i64::try_from(cell[axis])
            .ok()
            .and_then(|c| c.checked_add(offset[axis]))
            .ok_or_else(|| {
                ModelError::config(format!("hopping cell offset {offset:?} is out of range"))
            })?;
    }
    Ok(raw)
}

impl LatticeSpec {
    /// Parse `lattice.in`.
    ///
    /// Layout: `Nx Ny Nz`, `pbc_x pbc_y pbc_z transport_axis`, `ax ay az`,
    /// `N_orbital max_neighbor`, one `x y z` per orbital, then for each
    /// orbital a hop count followed by `dx dy dz orbital re im` per hop.
    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(source_name, text);

        let cells = [
            positive_extent(&mut tokens, "number of cells along x")?,
            positive_extent(&mut tokens, "number of cells along y")?,
            positive_extent(&mut tokens, "number of cells along z")?,
        ];
        let periodic = [
            boundary_flag(&mut tokens, "boundary flag along x")?,
            boundary_flag(&mut tokens, "boundary flag along y")?,
            boundary_flag(&mut tokens, "boundary flag along z")?,
        ];
        let axis = tokens.next_i64("transport direction")?;
        if !(0..3).contains(&axis) {
            return Err(ModelError::config(format!(
                "transport direction must be 0, 1 or 2, got {axis}"
            )));
        }
        let lattice_constant = [
            tokens.next_real("lattice constant along x")?,
            tokens.next_real("lattice constant along y")?,
            tokens.next_real("lattice constant along z")?,
        ];
        let number_of_orbitals = positive_extent(&mut tokens, "number of orbitals")?;
        let max_neighbor = positive_extent(&mut tokens, "max number of neighbors")?;

        let mut orbital_positions = Vec::new();
        for _ in 0..number_of_orbitals {
            orbital_positions.push([
                tokens.next_real("orbital position")?,
                tokens.next_real("orbital position")?,
                tokens.next_real("orbital position")?,
            ]);
        }

        let mut hoppings = Vec::new();
        for m in 0..number_of_orbitals {
            let count = tokens.next_usize("number of hoppings")?;
            if count > max_neighbor {
                return Err(ModelError::config(format!(
                    "orbital {m} lists {count} hoppings, more than max_neighbor = {max_neighbor}"
                )));
            }
            let mut template = Vec::new();
            for _ in 0..count {
                let cell_offset = [
                    tokens.next_i64("hopping cell offset")?,
                    tokens.next_i64("hopping cell offset")?,
                    tokens.next_i64("hopping cell offset")?,
                ];
                let orbital = tokens.next_usize("hopping target orbital")?;
                let re = tokens.next_real("hopping real part")?;
                let im = tokens.next_real("hopping imaginary part")?;
                template.push(HoppingTemplate {
                    cell_offset,
                    orbital,
                    hopping: Complex::new(re, im),
                });
            }
            hoppings.push(template);
        }

        let spec = Self {
            cells,
            periodic,
            transport_axis: axis as usize,
            lattice_constant,
            max_neighbor,
            orbital_positions,
            hoppings,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the structural constraints `parse` enforces, for specs built in
    /// code.
    pub fn validate(&self) -> Result<()> {
        if self.cells.iter().any(|&n| n == 0) {
            return Err(ModelError::config("cell extents must be positive"));
        }
        if self.transport_axis >= 3 {
            return Err(ModelError::config(format!(
                "transport direction must be 0, 1 or 2, got {}",
                self.transport_axis
            )));
        }
        if !self.periodic[self.transport_axis] {
            return Err(ModelError::config(format!(
                "transport direction {} must be periodic",
                self.transport_axis
            )));
        }
        if self.lattice_constant.iter().any(|&a| a <= 0.0) {
            return Err(ModelError::config("lattice constants must be positive"));
        }
        if self.orbital_positions.is_empty() || self.max_neighbor == 0 {
            return Err(ModelError::config(
                "number of orbitals and max_neighbor must be positive",
            ));
        }
        if self.hoppings.len() != self.orbital_positions.len() {
            return Err(ModelError::config(format!(
                "{} hopping lists for {} orbitals",
                self.hoppings.len(),
                self.orbital_positions.len()
            )));
        }
        let n_orb = self.number_of_orbitals();
        for (m, template) in self.hoppings.iter().enumerate() {
            if template.len() > self.max_neighbor {
                return Err(ModelError::config(format!(
                    "orbital {m} lists {} hoppings, more than max_neighbor = {}",
                    template.len(),
                    self.max_neighbor
                )));
            }
            if let Some(t) = template.iter().find(|t| t.orbital >= n_orb) {
                return Err(ModelError::config(format!(
                    "orbital {m} hops to orbital {} but the cell has {n_orb}",
                    t.orbital
                )));
            }
        }
        self.number_of_atoms()?;
        Ok(())
    }

    pub fn number_of_orbitals(&self) -> usize {
        self.orbital_positions.len()
    }

    /// `Nx * Ny * Nz`, or a config error when it overflows.
    pub fn number_of_cells(&self) -> Result<usize> {
        self.cells
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| {
                let [nx, ny, nz] = self.cells;
                ModelError::config(format!("{nx}x{ny}x{nz} cells overflow the atom index"))
            })
    }

    pub fn number_of_atoms(&self) -> Result<usize> {
        self.number_of_cells()?
            .checked_mul(self.number_of_orbitals())
            .ok_or_else(|| {
                ModelError::config(format!(
                    "{} orbitals per cell overflow the atom index",
                    self.number_of_orbitals()
                ))
            })
    }

    pub fn simulation_box(&self) -> SimulationBox {
        let mut length = [0.0; 3];
        for axis in 0..3 {
            length[axis] = self.cells[axis] as Real * self.lattice_constant[axis];
        }
        SimulationBox {
            length,
            periodic: self.periodic,
        }
    }

    /// Flat atom index of orbital `m` in `cell`.
    #[inline]
    pub fn atom_index(&self, cell: [usize; 3], m: usize) -> usize {
        let [_, ny, nz] = self.cells;
        ((cell[0] * ny + cell[1]) * nz + cell[2]) * self.number_of_orbitals() + m
    }

    /// Fold a raw cell coordinate into the supercell.
    ///
    /// Periodic axes wrap; `None` when an open axis is left.
    #[inline]
    pub fn fold(&self, raw: [i64; 3]) -> Option<[usize; 3]> {
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let n = self.cells[axis] as i64;
            let c = raw[axis];
            cell[axis] = if self.periodic[axis] {
                c.rem_euclid(n) as usize
            } else if (0..n).contains(&c) {
                c as usize
            } else {
                return None;
            };
        }
        Some(cell)
    }

    pub fn position(&self, cell: [usize; 3], m: usize) -> [Real; 3] {
        let offset = self.orbital_positions[m];
        [
            cell[0] as Real * self.lattice_constant[0] + offset[0],
            cell[1] as Real * self.lattice_constant[1] + offset[1],
            cell[2] as Real * self.lattice_constant[2] + offset[2],
        ]
    }

    /// Transport-axis displacement of a template hop from orbital `m`.
    fn displacement(&self, m: usize, t: &HoppingTemplate) -> Real {
        let axis = self.transport_axis;
        t.cell_offset[axis] as Real * self.lattice_constant[axis]
            + self.orbital_positions[t.orbital][axis]
            - self.orbital_positions[m][axis]
    }

    /// Expand the unit cell into the supercell neighbor table.
    ///
    /// Positions are materialized only when `with_positions` is set.
    pub fn expand(&self, with_positions: bool) -> Result<Supercell> {
        self.validate()?;
        let n_orb = self.number_of_orbitals();
        let n_atoms = self.number_of_atoms()?;
        let mut table = NeighborTable::new(n_atoms, self.max_neighbor)?;
        let mut positions = with_positions.then(Vec::new);
        let mut truncated_hops = 0;

        for nx in 0..self.cells[0] {
            for ny in 0..self.cells[1] {
                for nz in 0..self.cells[2] {
                    let cell = [nx, ny, nz];
                    for m in 0..n_orb {
                        let atom = self.atom_index(cell, m);
                        if let Some(p) = positions.as_mut() {
                            p.push(self.position(cell, m));
                        }
                        for t in &self.hoppings[m] {
                            let raw = shifted_cell(cell, t.cell_offset)?;
                            let Some(neighbor_cell) = self.fold(raw) else {
                                truncated_hops += 1;
                                continue;
                            };
                            table.push(
                                atom,
                                Hop {
                                    target: self.atom_index(neighbor_cell, t.orbital),
                                    hopping: t.hopping,
                                    displacement: self.displacement(m, t),
                                },
                            )?;
                        }
                    }
                }
            }
        }

        info!(
            "expanded {}x{}x{} cells of {} orbital(s) into {} atoms, {} hops",
            self.cells[0],
            self.cells[1],
            self.cells[2],
            n_orb,
            n_atoms,
            table.total_hops()
        );
        if truncated_hops > 0 {
            debug!("{truncated_hops} hops dropped at open boundaries");
        }

        Ok(Supercell {
            table,
            positions,
            simulation_box: self.simulation_box(),
            truncated_hops,
        })
    }
}
