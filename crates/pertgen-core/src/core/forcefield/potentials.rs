//! Bonded-term potential representations and equality tests.
//!
//! The "undefined" sentinel of the matching algorithm is `None` at this
//! boundary: a term whose potential literally does not exist in a topology
//! is distinct from a term with zero-valued parameters.

/// Absolute tolerance for parameter equality. Deliberately at the floating
/// point resolution limit rather than a physically motivated value: two
/// potentials are "the same" only when the parameter generation produced
/// bitwise-indistinguishable numbers.
pub const POTENTIAL_EPS: f64 = f64::EPSILON;

/// Harmonic potential of a bond or angle: force constant plus equilibrium
/// value (length in Angstroms or angle in degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BondAnglePotential {
    pub k: f64,
    pub equil: f64,
}

impl BondAnglePotential {
    pub fn new(k: f64, equil: f64) -> Self {
        Self { k, equil }
    }

    /// The null potential substituted for fully synthetic terms.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// One cosine term of a torsion series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CosineTerm {
    pub k: f64,
    pub periodicity: f64,
    pub phase: f64,
}

impl CosineTerm {
    pub fn new(k: f64, periodicity: f64, phase: f64) -> Self {
        Self {
            k,
            periodicity,
            phase,
        }
    }
}

/// A dihedral or improper potential: one or more cosine terms. Term order
/// carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct DihedralSeries {
    pub terms: Vec<CosineTerm>,
}

impl DihedralSeries {
    pub fn new(terms: Vec<CosineTerm>) -> Self {
        Self { terms }
    }

    /// The single-term null series substituted for synthetic torsions.
    pub fn zero() -> Self {
        Self {
            terms: vec![CosineTerm::default()],
        }
    }

    /// True for a single term with a zero force constant. Upstream parameter
    /// generation is known to emit such spurious torsions.
    pub fn is_null(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].k == 0.0
    }

    /// The series as a flat k/periodicity/phase value list, the shape the
    /// perturbation file uses.
    pub fn flatten(&self) -> Vec<f64> {
        self.terms
            .iter()
            .flat_map(|t| [t.k, t.periodicity, t.phase])
            .collect()
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < POTENTIAL_EPS
}

/// Compares two bond/angle potentials, treating `None` as the undefined
/// sentinel. Two undefined potentials are equal; a defined and an undefined
/// one never are.
pub fn same_bond_angle_potential(
    ipot: Option<&BondAnglePotential>,
    fpot: Option<&BondAnglePotential>,
) -> bool {
    match (ipot, fpot) {
        (None, None) => true,
        (Some(i), Some(f)) => close(i.k, f.k) && close(i.equil, f.equil),
        _ => false,
    }
}

/// Compares two torsion series, treating `None` as the undefined sentinel.
///
/// Multi-term series may be stored in any order, so every term of the first
/// series must find an unordered counterpart in the second. The test is
/// asymmetric: a null cosine term present in only one series makes the two
/// compare as different even though their energies agree. Downstream
/// consumers rely on that classification boundary, so it is kept as is.
pub fn same_dihedral_potential(ipot: Option<&DihedralSeries>, fpot: Option<&DihedralSeries>) -> bool {
    let (ipot, fpot) = match (ipot, fpot) {
        (None, None) => return true,
        (Some(i), Some(f)) => (i, f),
        _ => return false,
    };

    for it in &ipot.terms {
        let matched = fpot.terms.iter().any(|ft| {
            close(it.k, ft.k) && close(it.periodicity, ft.periodicity) && close(it.phase, ft.phase)
        });

        if !matched {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_angle_potential_is_reflexive() {
        let pot = BondAnglePotential::new(340.0, 1.09);
        assert!(same_bond_angle_potential(Some(&pot), Some(&pot)));
    }

    #[test]
    fn undefined_sentinels_compare_equal_only_to_each_other() {
        let pot = BondAnglePotential::new(340.0, 1.09);
        assert!(same_bond_angle_potential(None, None));
        assert!(!same_bond_angle_potential(Some(&pot), None));
        assert!(!same_bond_angle_potential(None, Some(&pot)));
    }

    #[test]
    fn differing_equilibrium_values_compare_unequal() {
        let a = BondAnglePotential::new(340.0, 1.09);
        let b = BondAnglePotential::new(340.0, 1.10);
        assert!(!same_bond_angle_potential(Some(&a), Some(&b)));
    }

    #[test]
    fn dihedral_series_is_reflexive_under_reordering() {
        let a = DihedralSeries::new(vec![
            CosineTerm::new(1.4, 3.0, 0.0),
            CosineTerm::new(0.16, 2.0, 180.0),
        ]);
        let b = DihedralSeries::new(vec![
            CosineTerm::new(0.16, 2.0, 180.0),
            CosineTerm::new(1.4, 3.0, 0.0),
        ]);
        assert!(same_dihedral_potential(Some(&a), Some(&a)));
        assert!(same_dihedral_potential(Some(&a), Some(&b)));
        assert!(same_dihedral_potential(Some(&b), Some(&a)));
    }

    #[test]
    fn undefined_dihedral_sentinel_never_matches_defined_series() {
        let a = DihedralSeries::new(vec![CosineTerm::new(1.4, 3.0, 0.0)]);
        assert!(same_dihedral_potential(None, None));
        assert!(!same_dihedral_potential(Some(&a), None));
        assert!(!same_dihedral_potential(None, Some(&a)));
    }

    #[test]
    fn extra_null_term_on_one_side_compares_as_different() {
        // The documented approximation: a spare zero-force term flips the
        // classification even though the energies are identical.
        let with_null = DihedralSeries::new(vec![
            CosineTerm::new(1.4, 3.0, 0.0),
            CosineTerm::new(0.0, 2.0, 180.0),
        ]);
        let without = DihedralSeries::new(vec![CosineTerm::new(1.4, 3.0, 0.0)]);
        assert!(!same_dihedral_potential(Some(&with_null), Some(&without)));
        // ...but only when the spare term sits on the first side.
        assert!(same_dihedral_potential(Some(&without), Some(&with_null)));
    }

    #[test]
    fn null_series_detection() {
        assert!(DihedralSeries::zero().is_null());
        assert!(!DihedralSeries::new(vec![CosineTerm::new(1.4, 3.0, 0.0)]).is_null());
        assert!(
            !DihedralSeries::new(vec![CosineTerm::default(), CosineTerm::default()]).is_null()
        );
    }

    #[test]
    fn flatten_preserves_term_order() {
        let series = DihedralSeries::new(vec![
            CosineTerm::new(1.4, 3.0, 0.0),
            CosineTerm::new(0.16, 2.0, 180.0),
        ]);
        assert_eq!(series.flatten(), vec![1.4, 3.0, 0.0, 0.16, 2.0, 180.0]);
    }
}
