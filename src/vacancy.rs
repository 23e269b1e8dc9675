//! Vacancy disorder: remove a random subset of atoms and recompact.
//!
//! The vacancy set is the first `k` entries of a full Fisher–Yates
//! permutation. Surviving atoms are renumbered by a forward scan, and the
//! neighbor table is rebuilt into fresh arrays while the pristine table is
//! still alive; it is dropped only once the rebuild is complete.

use log::info;
use rand::Rng;

use crate::error::{ModelError, Result};
use crate::neighbor::{Hop, NeighborTable};
use crate::random::sample_distinct;

/// Pick `k` distinct vacancy sites out of `number_of_atoms`.
pub fn select_vacancies<R: Rng>(
    rng: &mut R,
    number_of_atoms: usize,
    k: usize,
) -> Result<Vec<usize>> {
    if k == 0 || k >= number_of_atoms {
        return Err(ModelError::config(format!(
            "number of vacancies must be in [1, {number_of_atoms}), got {k}"
        )));
    }
    Ok(sample_distinct(rng, number_of_atoms, k))
}

/// `true` at every vacant atom.
pub fn vacancy_mask(number_of_atoms: usize, vacancies: &[usize]) -> Vec<bool> {
    let mut is_vacancy = vec![false; number_of_atoms];
    for &n in vacancies {
        is_vacancy[n] = true;
    }
    is_vacancy
}

/// Old index → new compact index, `None` for removed atoms.
///
/// A single forward scan with a counter that only advances on present atoms,
/// so survivors keep their relative order.
pub fn compact_index(is_vacancy: &[bool]) -> Vec<Option<usize>> {
    let mut next = 0;
    is_vacancy
        .iter()
        .map(|&vacant| {
            if vacant {
                None
            } else {
                next += 1;
                Some(next - 1)
            }
        })
        .collect()
}

/// Rebuild `table` without the atoms marked in `is_vacancy`.
///
/// Hops pointing at a vacancy are dropped; survivors keep their original
/// order and are never re-padded.
pub fn remove_atoms(table: &NeighborTable, is_vacancy: &[bool]) -> Result<NeighborTable> {
    assert_eq!(table.number_of_atoms(), is_vacancy.len());
    let remap = compact_index(is_vacancy);
    let survivors = remap.iter().filter(|r| r.is_some()).count();
    let mut compact = NeighborTable::new(survivors, table.max_neighbor())?;

    for (old, new) in remap.iter().enumerate() {
        let Some(new) = *new else {
            continue;
        };
        for hop in table.hops(old) {
            if let Some(target) = remap[hop.target] {
                compact.push(new, Hop { target, ..hop })?;
            }
        }
    }
    Ok(compact)
}

/// Keep the per-atom values of surviving atoms, in order.
pub fn compact_values<T: Copy>(values: &[T], is_vacancy: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(is_vacancy)
        .filter(|(_, vacant)| !**vacant)
        .map(|(&v, _)| v)
        .collect()
}

/// Outcome of [`apply_vacancies`].
#[derive(Debug, Clone)]
pub struct VacancyRemoval {
    pub table: NeighborTable,
    /// Removed atoms, in original numbering and sampling order.
    pub vacancies: Vec<usize>,
    pub is_vacancy: Vec<bool>,
}

/// Sample `k` vacancies and rebuild the table without them.
///
/// Consumes the pristine table; it stays alive until the compact one is
/// complete.
pub fn apply_vacancies<R: Rng>(
    table: NeighborTable,
    k: usize,
    rng: &mut R,
) -> Result<VacancyRemoval> {
    let old_atoms = table.number_of_atoms();
    let vacancies = select_vacancies(rng, old_atoms, k)?;
    let is_vacancy = vacancy_mask(old_atoms, &vacancies);
    let compact = remove_atoms(&table, &is_vacancy)?;
    info!(
        "removed {k} vacancies: {old_atoms} -> {} atoms, {} -> {} hops",
        compact.number_of_atoms(),
        table.total_hops(),
        compact.total_hops()
    );
    drop(table);
    Ok(VacancyRemoval {
        table: compact,
        vacancies,
        is_vacancy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Periodic ring of `n` atoms, hops to n+1 then n-1.
    fn ring(n: usize) -> NeighborTable {
        let mut t = NeighborTable::new(n, 2).unwrap();
        for i in 0..n {
            for (target, dx) in [((i + 1) % n, 1.0), ((i + n - 1) % n, -1.0)] {
                t.push(
                    i,
                    Hop {
                        target,
                        hopping: Complex::new(-1.0, i as crate::Real),
                        displacement: dx,
                    },
                )
                .unwrap();
            }
        }
        t
    }

    #[test]
    fn test_compact_index() {
        let remap = compact_index(&[false, true, false, false, true]);
        assert_eq!(remap, vec![Some(0), None, Some(1), Some(2), None]);
    }

    #[test]
    fn test_remove_middle_atom_of_ring() {
        let t = ring(5);
        let mask = vacancy_mask(5, &[2]);
        let c = remove_atoms(&t, &mask).unwrap();
        assert_eq!(c.number_of_atoms(), 4);
        // Old atoms 1 and 3 each lose their hop to atom 2.
        assert_eq!(c.neighbor_number(), &[2, 1, 1, 2]);
        // Old atom 1 (new 1) keeps only its hop back to atom 0.
        assert_eq!(c.hop(1, 0).target, 0);
        assert_eq!(c.hop(1, 0).displacement, -1.0);
        // Old atom 3 (new 2) keeps only its hop to old 4 (new 3).
        assert_eq!(c.hop(2, 0).target, 3);
        // Payload travels with the hop.
        assert_eq!(c.hop(2, 0).hopping, Complex::new(-1.0, 3.0));
        // Old atom 4 (new 3) wraps to old 0 (new 0), then back to old 3 (new 2).
        let targets: Vec<usize> = c.hops(3).map(|h| h.target).collect();
        assert_eq!(targets, vec![0, 2]);
    }

    #[test]
    fn test_compact_values() {
        let mask = [true, false, false, true];
        assert_eq!(compact_values(&[10, 11, 12, 13], &mask), vec![11, 12]);
    }

    #[test]
    fn test_apply_vacancies_counts() {
        let mut rng = StdRng::seed_from_u64(11);
        let t = ring(40);
        let r = apply_vacancies(t, 7, &mut rng).unwrap();
        assert_eq!(r.table.number_of_atoms(), 33);
        assert_eq!(r.vacancies.len(), 7);
        assert_eq!(r.is_vacancy.iter().filter(|&&v| v).count(), 7);
        for n in 0..r.table.number_of_atoms() {
            assert!(r.table.neighbor_number()[n] <= 2);
            for hop in r.table.hops(n) {
                assert!(hop.target < 33);
            }
        }
    }

    #[test]
    fn test_lost_hops_match_vacant_neighbors() {
        let mut rng = StdRng::seed_from_u64(12);
        let t = ring(30);
        let r = apply_vacancies(t.clone(), 9, &mut rng).unwrap();
        let remap = compact_index(&r.is_vacancy);
        for (old, new) in remap.iter().enumerate() {
            if let Some(new) = *new {
                let vacant_neighbors = t.hops(old).filter(|h| r.is_vacancy[h.target]).count();
                assert_eq!(
                    r.table.neighbor_number()[new],
                    t.neighbor_number()[old] - vacant_neighbors
                );
            }
        }
    }

    #[test]
    fn test_vacancy_count_bounds() {
        let mut rng = StdRng::seed_from_u64(13);
        assert!(select_vacancies(&mut rng, 4, 4).is_err());
        assert!(select_vacancies(&mut rng, 4, 0).is_err());
        assert_eq!(select_vacancies(&mut rng, 4, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_vacancy_selection_is_uniform() {
        let mut rng = StdRng::seed_from_u64(14);
        let (n, k, trials) = (16, 4, 6_000);
        let mut hits = vec![0usize; n];
        for _ in 0..trials {
            for v in select_vacancies(&mut rng, n, k).unwrap() {
                hits[v] += 1;
            }
        }
        for h in hits {
            let freq = h as f64 / trials as f64;
            assert!((freq - 0.25).abs() < 0.035, "frequency {freq}");
        }
    }
}
