//! Fixed-stride padded neighbor table.
//!
//! Atom `n` owns slots `[n * max_neighbor, (n + 1) * max_neighbor)`. The first
//! `neighbor_number[n]` of them are in use; the rest are zero and never read.
//! Each slot holds the target atom, the complex hopping split into real and
//! imaginary arrays, and the hop's displacement along the transport axis.

use num_complex::Complex;

use crate::error::{ModelError, Result};
use crate::Real;

/// One used slot of the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hop {
    pub target: usize,
    pub hopping: Complex<Real>,
    /// Displacement along the transport axis (velocity-operator input).
    pub displacement: Real,
}

/// Largest slot count whose widest per-slot array stays within `isize::MAX` bytes.
const MAX_SLOTS: usize = isize::MAX as usize / std::mem::size_of::<u64>();

#[derive(Debug, Clone)]
pub struct NeighborTable {
    number_of_atoms: usize,
    max_neighbor: usize,
    neighbor_number: Vec<usize>,
    neighbor_list: Vec<usize>,
    hopping_real: Vec<Real>,
    hopping_imag: Vec<Real>,
    displacement: Vec<Real>,
}

impl NeighborTable {
    /// Empty table with every slot allocated and no neighbors in use.
    ///
    /// Fails when `number_of_atoms * max_neighbor` slots cannot be addressed.
    pub fn new(number_of_atoms: usize, max_neighbor: usize) -> Result<Self> {
        let slots = number_of_atoms
            .checked_mul(max_neighbor)
            .filter(|&s| s <= MAX_SLOTS)
            .ok_or_else(|| {
                ModelError::config(format!(
                    "{number_of_atoms} atoms x {max_neighbor} neighbors does not fit in memory"
                ))
            })?;
        Ok(Self {
            number_of_atoms,
            max_neighbor,
            neighbor_number: vec![0; number_of_atoms],
            neighbor_list: vec![0; slots],
            hopping_real: vec![0.0; slots],
            hopping_imag: vec![0.0; slots],
            displacement: vec![0.0; slots],
        })
    }

    pub fn number_of_atoms(&self) -> usize {
        self.number_of_atoms
    }

    pub fn max_neighbor(&self) -> usize {
        self.max_neighbor
    }

    /// Append a hop to `atom`'s slot list.
    pub fn push(&mut self, atom: usize, hop: Hop) -> Result<()> {
        let count = self.neighbor_number[atom];
        if count >= self.max_neighbor {
            return Err(ModelError::config(format!(
                "atom {atom} has more than max_neighbor = {} neighbors",
                self.max_neighbor
            )));
        }
        if hop.target >= self.number_of_atoms {
            return Err(ModelError::config(format!(
                "atom {atom} has neighbor {} outside [0, {})",
                hop.target, self.number_of_atoms
            )));
        }
        let slot = atom * self.max_neighbor + count;
        self.neighbor_list[slot] = hop.target;
        self.hopping_real[slot] = hop.hopping.re;
        self.hopping_imag[slot] = hop.hopping.im;
        self.displacement[slot] = hop.displacement;
        self.neighbor_number[atom] = count + 1;
        Ok(())
    }

    /// The `k`-th used hop of `atom`.
    #[inline]
    pub fn hop(&self, atom: usize, k: usize) -> Hop {
        debug_assert!(k < self.neighbor_number[atom]);
        let slot = atom * self.max_neighbor + k;
        Hop {
            target: self.neighbor_list[slot],
            hopping: Complex::new(self.hopping_real[slot], self.hopping_imag[slot]),
            displacement: self.displacement[slot],
        }
    }

    /// Used hops of `atom`, in insertion order.
    pub fn hops(&self, atom: usize) -> impl Iterator<Item = Hop> + '_ {
        (0..self.neighbor_number[atom]).map(move |k| self.hop(atom, k))
    }

    /// Total number of used slots.
    pub fn total_hops(&self) -> usize {
        self.neighbor_number.iter().sum()
    }

    pub fn neighbor_number(&self) -> &[usize] {
        &self.neighbor_number
    }

    /// Raw padded target array, `number_of_atoms * max_neighbor` long.
    pub fn neighbor_list(&self) -> &[usize] {
        &self.neighbor_list
    }

    pub fn hopping_real(&self) -> &[Real] {
        &self.hopping_real
    }

    pub fn hopping_imag(&self) -> &[Real] {
        &self.hopping_imag
    }

    pub fn displacement(&self) -> &[Real] {
        &self.displacement
    }
}
