//! Dummy-atom policy decisions.
//!
//! Once the matcher has classified a morph term against both end states,
//! this module decides what potentials actually enter the perturbation
//! record: which side borrows from the other, which side collapses to a
//! null potential, and which combinations are outright rejected.

use super::error::{PertError, TermClass};
use crate::core::forcefield::potentials::{
    BondAnglePotential, DihedralSeries, same_bond_angle_potential, same_dihedral_potential,
};

/// Equilibrium length, in Angstroms, forced onto the dummy side of a bond
/// when shrinking is enabled.
pub(crate) const DUMMY_BOND_EQUIL: f64 = 0.2;

/// Dummy classification of one morph term.
///
/// `idummy`/`fdummy` are set when a term could not be matched in the
/// respective end state because a dummy atom is involved; the `all_*`
/// variants additionally record that every atom of the term is synthetic on
/// that side, which distinguishes a partially decorated but still real
/// torsion from a fully synthetic one.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DummyFlags {
    pub idummy: bool,
    pub fdummy: bool,
    pub all_idummy: bool,
    pub all_fdummy: bool,
}

impl DummyFlags {
    pub fn any(&self) -> bool {
        self.idummy || self.fdummy
    }
}

/// A term enters the perturbation record iff a dummy is involved on either
/// side or the end-state potentials differ. Terms identical across both end
/// states encode no change and are omitted.
pub(crate) fn needs_record(flags: &DummyFlags, same_potential: bool) -> bool {
    flags.any() || !same_potential
}

/// Both forms reduced to a single zero-force term. Upstream parameter
/// generation creates such spurious torsions; they are skipped entirely.
pub(crate) fn spurious_zero_torsion(ipot: &DihedralSeries, fpot: &DihedralSeries) -> bool {
    ipot.is_null() && fpot.is_null()
}

/// Rejects end-state potentials that diverge without any dummy involved.
///
/// A divergence is only legitimate when the initial potential is undefined
/// (a dummy will be substituted), when the morph itself computed the same
/// potential as the initial state (the divergence is the perturbation), or
/// when the term touches an atom on the "zz" exemption list.
pub(crate) fn confirm_bond_angle_divergence(
    same: bool,
    ipot: Option<&BondAnglePotential>,
    mpot: &BondAnglePotential,
    zz_exempt: bool,
    class: TermClass,
    atoms: &str,
) -> Result<(), PertError> {
    if !same
        && ipot.is_some()
        && !same_bond_angle_potential(ipot, Some(mpot))
        && !zz_exempt
    {
        return Err(PertError::PotentialMismatch {
            class,
            atoms: atoms.to_string(),
        });
    }
    Ok(())
}

/// Torsion twin of [`confirm_bond_angle_divergence`].
pub(crate) fn confirm_torsion_divergence(
    same: bool,
    ipot: Option<&DihedralSeries>,
    mpot: &DihedralSeries,
    zz_exempt: bool,
    class: TermClass,
    atoms: &str,
) -> Result<(), PertError> {
    if !same
        && ipot.is_some()
        && !same_dihedral_potential(ipot, Some(mpot))
        && !zz_exempt
    {
        return Err(PertError::PotentialMismatch {
            class,
            atoms: atoms.to_string(),
        });
    }
    Ok(())
}

fn defined<P>(pot: Option<P>, side: &str) -> Result<P, PertError> {
    pot.ok_or_else(|| {
        PertError::Inconsistency(format!(
            "undefined {side} potential for a term not classified as dummy"
        ))
    })
}

/// A bond with a dummy on one side keeps the real side's parameters across
/// the whole perturbation. A bond synthetic on both ends has no real
/// endpoint to borrow from and is rejected.
pub(crate) fn resolve_bond(
    ipot: Option<BondAnglePotential>,
    fpot: Option<BondAnglePotential>,
    flags: &DummyFlags,
    names: [&str; 2],
) -> Result<(BondAnglePotential, BondAnglePotential), PertError> {
    match (flags.idummy, flags.fdummy) {
        (true, true) => Err(PertError::DoubleDummyBond {
            atom0: names[0].to_string(),
            atom1: names[1].to_string(),
        }),
        (true, false) => {
            let f = defined(fpot, "final")?;
            Ok((f, f))
        }
        (false, true) => {
            let i = defined(ipot, "initial")?;
            Ok((i, i))
        }
        (false, false) => Ok((defined(ipot, "initial")?, defined(fpot, "final")?)),
    }
}

/// Angles follow the bond rule on a single dummy side. An angle synthetic on
/// both sides arises from 1-3 interactions across two dummy groups and gets
/// null parameters so the morph is not artificially restrained.
pub(crate) fn resolve_angle(
    ipot: Option<BondAnglePotential>,
    fpot: Option<BondAnglePotential>,
    flags: &DummyFlags,
) -> Result<(BondAnglePotential, BondAnglePotential), PertError> {
    match (flags.idummy, flags.fdummy) {
        (true, true) => Ok((BondAnglePotential::zero(), BondAnglePotential::zero())),
        (true, false) => {
            let f = defined(fpot, "final")?;
            Ok((f, f))
        }
        (false, true) => {
            let i = defined(ipot, "initial")?;
            Ok((i, i))
        }
        (false, false) => Ok((defined(ipot, "initial")?, defined(fpot, "final")?)),
    }
}

/// Unlike bonds and angles, a torsion touching dummies carries no energy on
/// the dummy side: the substitute is the null series. Only when every atom
/// of the torsion is synthetic on one side is the other side's potential
/// borrowed wholesale, since the whole term then exists purely to mirror
/// the real state.
pub(crate) fn resolve_torsion(
    ipot: Option<DihedralSeries>,
    fpot: Option<DihedralSeries>,
    flags: &DummyFlags,
) -> Result<(DihedralSeries, DihedralSeries), PertError> {
    match (flags.idummy, flags.fdummy) {
        (true, true) => Ok((DihedralSeries::zero(), DihedralSeries::zero())),
        (true, false) => {
            let f = defined(fpot, "final")?;
            let i = if flags.all_idummy {
                f.clone()
            } else {
                DihedralSeries::zero()
            };
            Ok((i, f))
        }
        (false, true) => {
            let i = defined(ipot, "initial")?;
            let f = if flags.all_fdummy {
                i.clone()
            } else {
                DihedralSeries::zero()
            };
            Ok((i, f))
        }
        (false, false) => Ok((defined(ipot, "initial")?, defined(fpot, "final")?)),
    }
}

/// Applies the shrink-dummy-bonds option: the vanishing side's equilibrium
/// length is forced to [`DUMMY_BOND_EQUIL`].
pub(crate) fn shrink_bond_ends(
    ipot: &mut BondAnglePotential,
    fpot: &mut BondAnglePotential,
    flags: &DummyFlags,
    enabled: bool,
) {
    if !enabled {
        return;
    }
    if flags.idummy {
        ipot.equil = DUMMY_BOND_EQUIL;
    }
    if flags.fdummy {
        fpot.equil = DUMMY_BOND_EQUIL;
    }
}

/// Applies the turn-off-dummy-angles option: the dummy side's force constant
/// is zeroed unless both outer atoms of the angle are themselves dummy, in
/// which case the whole angle is synthetic and keeps its restraint.
pub(crate) fn quench_dummy_angle(
    ipot: &mut BondAnglePotential,
    fpot: &mut BondAnglePotential,
    flags: &DummyFlags,
    outer_dummy: [bool; 2],
    enabled: bool,
) {
    if !enabled || (outer_dummy[0] && outer_dummy[1]) {
        return;
    }
    if flags.idummy {
        ipot.k = 0.0;
    }
    if flags.fdummy {
        fpot.k = 0.0;
    }
}
