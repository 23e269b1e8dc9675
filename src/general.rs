//! General (non-lattice) model read from explicit input files.
//!
//! - `neighbor.in`: `N max_neighbor`, then per atom a count and that many
//!   neighbor indices.
//! - `position.in`: `box_length volume`, then `N` transport-axis coordinates.
//! - `hopping.in` (optional): `re im` per used neighbor slot, atom by atom.
//!   Every hop is `-1` when absent.
//! - `potential.in` (optional): `N` on-site energies, zero when absent.

use log::info;
use num_complex::Complex;

use crate::error::{ModelError, Result};
use crate::input::Tokens;
use crate::neighbor::{Hop, NeighborTable};
use crate::Real;

/// Hopping used for every neighbor pair when no `hopping.in` is given.
pub const DEFAULT_HOPPING: Complex<Real> = Complex::new(-1.0, 0.0);

/// Raw text of the general-model files.
#[derive(Debug, Clone, Default)]
pub struct GeneralInput {
    pub neighbor: String,
    pub position: String,
    pub hopping: Option<String>,
    pub potential: Option<String>,
}

/// Structure assembled from a [`GeneralInput`].
#[derive(Debug, Clone)]
pub struct GeneralStructure {
    pub table: NeighborTable,
    pub potential: Vec<Real>,
    pub volume: Real,
}

/// Neighbor lists as read, before hoppings and displacements are attached.
struct NeighborLists {
    max_neighbor: usize,
    lists: Vec<Vec<usize>>,
}

fn parse_neighbors(text: &str) -> Result<NeighborLists> {
    let mut tokens = Tokens::new("neighbor.in", text);
    let n = tokens.next_usize("number of atoms")?;
    let max_neighbor = tokens.next_usize("max number of neighbors")?;
    if n == 0 || max_neighbor == 0 {
        return Err(ModelError::config(
            "neighbor.in: number of atoms and max_neighbor must be positive",
        ));
    }
    let mut lists = Vec::new();
    for atom in 0..n {
        let count = tokens.next_usize("number of neighbors")?;
        if count > max_neighbor {
            return Err(ModelError::config(format!(
                "neighbor.in: atom {atom} has {count} neighbors, more than max_neighbor = {max_neighbor}"
            )));
        }
        let mut list = Vec::new();
        for _ in 0..count {
            let j = tokens.next_usize("neighbor index")?;
            if j >= n {
                return Err(ModelError::config(format!(
                    "neighbor.in: atom {atom} has neighbor {j} outside [0, {n})"
                )));
            }
            list.push(j);
        }
        lists.push(list);
    }
    Ok(NeighborLists {
        max_neighbor,
        lists,
    })
}

/// Transport-axis separation `x_j - x_i`, folded into `[-L/2, L/2]`.
#[inline]
pub fn periodic_displacement(xi: Real, xj: Real, box_length: Real) -> Real {
    let mut dx = xj - xi;
    if dx > 0.5 * box_length {
        dx -= box_length;
    } else if dx < -0.5 * box_length {
        dx += box_length;
    }
    dx
}

impl GeneralInput {
    /// Assemble the neighbor table, displacements, hoppings and potential.
    pub fn build(&self) -> Result<GeneralStructure> {
        let neighbors = parse_neighbors(&self.neighbor)?;
        let n = neighbors.lists.len();

        let mut pos = Tokens::new("position.in", &self.position);
        let box_length = pos.next_real("box length")?;
        let volume = pos.next_real("volume")?;
        if box_length <= 0.0 || volume <= 0.0 {
            return Err(ModelError::config(
                "position.in: box length and volume must be positive",
            ));
        }
        let x: Vec<Real> = (0..n)
            .map(|_| pos.next_real("position"))
            .collect::<Result<_>>()?;

        let mut hopping_tokens = self
            .hopping
            .as_deref()
            .map(|text| Tokens::new("hopping.in", text));

        let mut table = NeighborTable::new(n, neighbors.max_neighbor)?;
        for (atom, list) in neighbors.lists.iter().enumerate() {
            for &target in list {
                let hopping = match hopping_tokens.as_mut() {
                    Some(tokens) => Complex::new(
                        tokens.next_real("hopping real part")?,
                        tokens.next_real("hopping imaginary part")?,
                    ),
                    None => DEFAULT_HOPPING,
                };
                table.push(
                    atom,
                    Hop {
                        target,
                        hopping,
                        displacement: periodic_displacement(x[atom], x[target], box_length),
                    },
                )?;
            }
        }

        let potential = match self.potential.as_deref() {
            Some(text) => {
                let mut tokens = Tokens::new("potential.in", text);
                (0..n)
                    .map(|_| tokens.next_real("potential"))
                    .collect::<Result<Vec<_>>>()?
            }
            None => vec![0.0; n],
        };

        info!(
            "general model: {n} atoms, {} hops, box length {box_length}, volume {volume}",
            table.total_hops()
        );

        Ok(GeneralStructure {
            table,
            potential,
            volume,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_input() -> GeneralInput {
        GeneralInput {
            neighbor: "4 2\n2 1 3\n2 2 0\n2 3 1\n2 0 2\n".into(),
            position: "4.0 4.0\n0 1 2 3\n".into(),
            hopping: None,
            potential: None,
        }
    }

    #[test]
    fn test_periodic_displacement() {
        assert_eq!(periodic_displacement(0.0, 1.0, 4.0), 1.0);
        assert_eq!(periodic_displacement(0.0, 3.0, 4.0), -1.0);
        assert_eq!(periodic_displacement(3.0, 0.0, 4.0), 1.0);
        assert_eq!(periodic_displacement(0.0, 2.0, 4.0), 2.0);
    }

    #[test]
    fn test_ring_defaults() {
        let s = ring_input().build().unwrap();
        assert_eq!(s.table.number_of_atoms(), 4);
        assert_eq!(s.table.neighbor_number(), &[2, 2, 2, 2]);
        assert!(s.table.hops(0).all(|h| h.hopping == DEFAULT_HOPPING));
        let disp: Vec<Real> = s.table.hops(0).map(|h| h.displacement).collect();
        assert_eq!(disp, vec![1.0, -1.0]);
        assert_eq!(s.potential, vec![0.0; 4]);
        assert_eq!(s.volume, 4.0);
    }

    #[test]
    fn test_explicit_hopping_and_potential() {
        let mut input = ring_input();
        input.hopping = Some("1 0 2 0\n3 0.5 4 0\n5 0 6 0\n7 0 8 -1\n".into());
        input.potential = Some("0.1 0.2 0.3 0.4".into());
        let s = input.build().unwrap();
        assert_eq!(s.table.hop(1, 0).hopping, Complex::new(3.0, 0.5));
        assert_eq!(s.table.hop(3, 1).hopping, Complex::new(8.0, -1.0));
        assert_eq!(s.potential, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_short_hopping_file() {
        let mut input = ring_input();
        input.hopping = Some("1 0 2 0\n".into());
        let err = input.build().unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_neighbor_out_of_range() {
        let mut input = ring_input();
        input.neighbor = "2 1\n1 1\n1 2\n".into();
        input.position = "2 2\n0 1\n".into();
        assert!(input.build().is_err());
    }

    #[test]
    fn test_absurd_atom_count_is_an_error() {
        let input = GeneralInput {
            neighbor: "1000000000000000000 2\n".into(),
            position: "1 1\n".into(),
            ..Default::default()
        };
        let err = input.build().unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_too_many_neighbors() {
        let mut input = ring_input();
        input.neighbor = "2 1\n2 1 1\n1 0\n".into();
        assert!(input.build().is_err());
    }
}
