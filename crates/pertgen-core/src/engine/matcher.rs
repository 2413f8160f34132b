//! Structural term lookup across topologies.
//!
//! Every lookup takes a key of optional atom indices: `None` marks a morph
//! atom with no image in the searched topology, and never matches. This
//! lets the same functions serve both the initial-state search (all slots
//! populated) and the final-state search through the atom mapping.
//!
//! Lookups report the position of the first structural match, or `None`.
//! Classifying a miss as "dummy involved" versus "fatal mapping defect" is
//! the policy layer's job, not the matcher's.

use crate::core::models::ids::AtomIdx;
use crate::core::models::mapping::AtomMapping;
use crate::core::models::topology::{AngleTerm, BondTerm, DihedralTerm, ImproperTerm};

/// Translates a morph atom tuple into final-topology indices.
pub(crate) fn mapped_key<const N: usize>(
    atoms: [AtomIdx; N],
    mapping: &AtomMapping,
) -> [Option<AtomIdx>; N] {
    atoms.map(|a| mapping.forward(a))
}

/// Wraps a same-topology atom tuple into key form.
pub(crate) fn direct_key<const N: usize>(atoms: [AtomIdx; N]) -> [Option<AtomIdx>; N] {
    atoms.map(Some)
}

fn slot(key: &[Option<AtomIdx>], i: usize, atom: AtomIdx) -> bool {
    key[i] == Some(atom)
}

/// Bonds match forwards or reversed.
pub(crate) fn bond_index(terms: &[BondTerm], key: [Option<AtomIdx>; 2]) -> Option<usize> {
    terms.iter().position(|t| {
        let [a0, a1] = t.atoms;
        (slot(&key, 0, a0) && slot(&key, 1, a1)) || (slot(&key, 0, a1) && slot(&key, 1, a0))
    })
}

/// Angles match forwards or reversed around the vertex atom.
pub(crate) fn angle_index(terms: &[AngleTerm], key: [Option<AtomIdx>; 3]) -> Option<usize> {
    terms.iter().position(|t| {
        let [a0, a1, a2] = t.atoms;
        (slot(&key, 0, a0) && slot(&key, 1, a1) && slot(&key, 2, a2))
            || (slot(&key, 0, a2) && slot(&key, 1, a1) && slot(&key, 2, a0))
    })
}

/// Dihedrals match forwards or fully reversed.
pub(crate) fn dihedral_index(terms: &[DihedralTerm], key: [Option<AtomIdx>; 4]) -> Option<usize> {
    terms.iter().position(|t| {
        let [a0, a1, a2, a3] = t.atoms;
        (slot(&key, 0, a0) && slot(&key, 1, a1) && slot(&key, 2, a2) && slot(&key, 3, a3))
            || (slot(&key, 0, a3) && slot(&key, 1, a2) && slot(&key, 2, a1) && slot(&key, 3, a0))
    })
}

/// Impropers match under any ordering of the same four atoms.
///
/// An improper is a planar three-spoke arrangement around its central atom,
/// and parameter generators walk the spokes in whatever order they traverse
/// the ring, so all twelve structure-preserving permutations denote the
/// same term. Membership of each key atom in the candidate's atom set
/// covers them all.
pub(crate) fn improper_index(terms: &[ImproperTerm], key: [Option<AtomIdx>; 4]) -> Option<usize> {
    terms.iter().position(|t| {
        key.iter()
            .all(|k| t.atoms.iter().any(|a| *k == Some(*a)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::potentials::{BondAnglePotential, DihedralSeries};

    fn idx<const N: usize>(vals: [usize; N]) -> [AtomIdx; N] {
        vals.map(AtomIdx)
    }

    fn bond(a: usize, b: usize) -> BondTerm {
        BondTerm {
            atoms: idx([a, b]),
            potential: BondAnglePotential::new(300.0, 1.5),
        }
    }

    #[test]
    fn bond_matches_either_orientation() {
        let terms = vec![bond(0, 1), bond(1, 2)];
        assert_eq!(bond_index(&terms, direct_key(idx([1, 2]))), Some(1));
        assert_eq!(bond_index(&terms, direct_key(idx([2, 1]))), Some(1));
        assert_eq!(bond_index(&terms, direct_key(idx([0, 2]))), None);
    }

    #[test]
    fn unmapped_slot_never_matches() {
        let terms = vec![bond(0, 1)];
        assert_eq!(bond_index(&terms, [Some(AtomIdx(0)), None]), None);
        assert_eq!(bond_index(&terms, [None, None]), None);
    }

    #[test]
    fn angle_matches_only_with_fixed_vertex() {
        let terms = vec![AngleTerm {
            atoms: idx([0, 1, 2]),
            potential: BondAnglePotential::new(63.0, 110.0),
        }];
        assert_eq!(angle_index(&terms, direct_key(idx([0, 1, 2]))), Some(0));
        assert_eq!(angle_index(&terms, direct_key(idx([2, 1, 0]))), Some(0));
        assert_eq!(angle_index(&terms, direct_key(idx([1, 0, 2]))), None);
    }

    #[test]
    fn dihedral_matches_forward_and_reversed_but_not_scrambled() {
        let terms = vec![DihedralTerm {
            atoms: idx([0, 1, 2, 3]),
            potential: DihedralSeries::zero(),
        }];
        assert_eq!(dihedral_index(&terms, direct_key(idx([0, 1, 2, 3]))), Some(0));
        assert_eq!(dihedral_index(&terms, direct_key(idx([3, 2, 1, 0]))), Some(0));
        assert_eq!(dihedral_index(&terms, direct_key(idx([0, 2, 1, 3]))), None);
    }

    #[test]
    fn improper_matches_all_equivalent_orderings() {
        let terms = vec![ImproperTerm {
            atoms: idx([0, 1, 2, 3]),
            potential: DihedralSeries::zero(),
        }];
        // a sample of the twelve equivalent orderings
        for perm in [[0, 1, 2, 3], [2, 1, 3, 0], [3, 2, 1, 0], [0, 3, 1, 2]] {
            assert_eq!(improper_index(&terms, direct_key(idx(perm))), Some(0));
        }
        assert_eq!(improper_index(&terms, direct_key(idx([0, 1, 2, 4]))), None);
        assert_eq!(
            improper_index(&terms, [Some(AtomIdx(0)), Some(AtomIdx(1)), Some(AtomIdx(2)), None]),
            None
        );
    }

    #[test]
    fn mapped_key_translates_through_the_mapping() {
        let mut mapping = AtomMapping::new(3, 3);
        mapping.insert(AtomIdx(0), AtomIdx(2));
        mapping.insert(AtomIdx(2), AtomIdx(0));

        let key = mapped_key(idx([0, 1, 2]), &mapping);
        assert_eq!(key, [Some(AtomIdx(2)), None, Some(AtomIdx(0))]);
    }
}
