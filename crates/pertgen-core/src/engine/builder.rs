//! The perturbation-record builder.
//!
//! One builder invocation walks every bonded term of the morph topology,
//! locates its structural counterparts in the initial and final states,
//! runs the dummy policy over the result and accumulates the emitted
//! records. Dihedral and improper terms that exist only in one end state
//! are picked up afterwards by the reconcilers.
//!
//! The three topologies and the mapping are read-only throughout; all
//! mutable state (the growing record and the unmatched-term sets) lives in
//! the builder invocation.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::config::PertConfig;
use super::error::{EndState, PertError, TermClass};
use super::matcher;
use super::policy::{self, DummyFlags};
use crate::core::forcefield::potentials::{
    DihedralSeries, same_bond_angle_potential, same_dihedral_potential,
};
use crate::core::io::pert::{AnglePert, AtomPert, BondPert, PertMolecule, TorsionPert};
use crate::core::models::atom::{Atom, LjParam};
use crate::core::models::ids::AtomIdx;
use crate::core::models::mapping::AtomMapping;
use crate::core::models::topology::Topology;

pub(crate) struct PertBuilder<'a> {
    initial: &'a Topology,
    final_state: &'a Topology,
    morph: &'a Topology,
    mapping: &'a AtomMapping,
    config: &'a PertConfig,
}

impl<'a> PertBuilder<'a> {
    pub fn new(
        initial: &'a Topology,
        final_state: &'a Topology,
        morph: &'a Topology,
        mapping: &'a AtomMapping,
        config: &'a PertConfig,
    ) -> Self {
        Self {
            initial,
            final_state,
            morph,
            mapping,
            config,
        }
    }

    pub fn build(&self) -> Result<PertMolecule, PertError> {
        let mut mol = PertMolecule::new(&self.config.molecule_name);

        self.build_atoms(&mut mol)?;
        self.build_bonds(&mut mol)?;
        self.build_angles(&mut mol)?;

        let unmatched_final_dihedrals = self.build_dihedrals(&mut mol)?;
        self.reconcile_final_torsions(
            unmatched_final_dihedrals,
            TermClass::Dihedral,
            &mut mol,
        )?;

        let (unmatched_final, unmatched_initial) = self.build_impropers(&mut mol)?;
        self.reconcile_final_torsions(unmatched_final, TermClass::Improper, &mut mol)?;
        self.reconcile_initial_impropers(unmatched_initial, &mut mol)?;

        Ok(mol)
    }

    fn morph_atom(&self, idx: AtomIdx) -> Result<&Atom, PertError> {
        self.morph.atom(idx).ok_or_else(|| {
            PertError::Inconsistency(format!("atom {idx} is not part of the morph topology"))
        })
    }

    fn final_atom(&self, idx: AtomIdx) -> Result<&Atom, PertError> {
        self.final_state.atom(idx).ok_or_else(|| {
            PertError::Inconsistency(format!("atom {idx} is not part of the final topology"))
        })
    }

    fn names<const N: usize>(&self, atoms: [AtomIdx; N]) -> Result<[String; N], PertError> {
        let mut out: [String; N] = std::array::from_fn(|_| String::new());
        for (slot, idx) in out.iter_mut().zip(atoms) {
            *slot = self.morph_atom(idx)?.name.clone();
        }
        Ok(out)
    }

    fn any_dummy<const N: usize>(&self, atoms: [AtomIdx; N]) -> Result<bool, PertError> {
        for idx in atoms {
            if self.morph_atom(idx)?.is_dummy {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn all_dummy<const N: usize>(&self, atoms: [AtomIdx; N]) -> Result<bool, PertError> {
        for idx in atoms {
            if !self.morph_atom(idx)?.is_dummy {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// A missed initial-state lookup is only legitimate when the term
    /// touches a dummy atom; anything else means the atom mapping
    /// implicitly breaks a ring, which cannot be resolved automatically.
    fn require_dummy<const N: usize>(
        &self,
        atoms: [AtomIdx; N],
        class: TermClass,
        label: &str,
    ) -> Result<(), PertError> {
        if self.any_dummy(atoms)? {
            Ok(())
        } else {
            Err(PertError::UnmatchedTerm {
                class,
                state: EndState::Initial,
                atoms: label.to_string(),
            })
        }
    }

    /// A missed final-state lookup is only legitimate when some atom of the
    /// term has no image in the final topology.
    fn require_unmapped<const N: usize>(
        key: &[Option<AtomIdx>; N],
        class: TermClass,
        label: &str,
    ) -> Result<(), PertError> {
        if key.iter().any(Option::is_none) {
            Ok(())
        } else {
            Err(PertError::UnmatchedTerm {
                class,
                state: EndState::Final,
                atoms: label.to_string(),
            })
        }
    }

    fn zz_exempt<const N: usize>(&self, names: &[String; N]) -> bool {
        self.config.is_zz_exempt(names.iter().map(String::as_str))
    }

    /// Per-atom records: the final-side type, charge and LJ are pulled
    /// through the forward mapping; atoms vanishing into the final state
    /// become chargeless "du" particles. An atom is recorded only when
    /// something about it actually changes.
    fn build_atoms(&self, mol: &mut PertMolecule) -> Result<(), PertError> {
        for atom in self.morph.atoms() {
            let (final_type, final_charge, final_lj) = match self.mapping.forward(atom.index) {
                Some(fidx) => {
                    let fatom = self.final_atom(fidx)?;
                    (fatom.amber_type.clone(), fatom.partial_charge, fatom.lj)
                }
                None => ("du".to_string(), 0.0, LjParam::default()),
            };

            if atom.amber_type != final_type
                || atom.partial_charge != final_charge
                || atom.lj != final_lj
            {
                mol.atoms.push(AtomPert {
                    name: atom.name.clone(),
                    initial_type: atom.amber_type.clone(),
                    final_type,
                    initial_charge: atom.partial_charge,
                    final_charge,
                    initial_lj: atom.lj,
                    final_lj,
                });
            }
        }
        Ok(())
    }

    fn build_bonds(&self, mol: &mut PertMolecule) -> Result<(), PertError> {
        for bond in self.morph.bonds() {
            let mpot = bond.potential;
            let names = self.names(bond.atoms)?;
            let label = names.join("-");

            let ipot = matcher::bond_index(self.initial.bonds(), matcher::direct_key(bond.atoms))
                .map(|i| self.initial.bonds()[i].potential);
            let idummy = ipot.is_none();
            if idummy {
                self.require_dummy(bond.atoms, TermClass::Bond, &label)?;
            }

            let fkey = matcher::mapped_key(bond.atoms, self.mapping);
            let fpot = matcher::bond_index(self.final_state.bonds(), fkey)
                .map(|i| self.final_state.bonds()[i].potential);
            let fdummy = fpot.is_none();
            if fdummy {
                Self::require_unmapped(&fkey, TermClass::Bond, &label)?;
            }

            let same = same_bond_angle_potential(ipot.as_ref(), fpot.as_ref());
            policy::confirm_bond_angle_divergence(
                same,
                ipot.as_ref(),
                &mpot,
                self.zz_exempt(&names),
                TermClass::Bond,
                &label,
            )?;

            let flags = DummyFlags {
                idummy,
                fdummy,
                ..DummyFlags::default()
            };
            let (mut ipot, mut fpot) = policy::resolve_bond(
                ipot,
                fpot,
                &flags,
                [names[0].as_str(), names[1].as_str()],
            )?;

            if !policy::needs_record(&flags, same) {
                continue;
            }
            policy::shrink_bond_ends(&mut ipot, &mut fpot, &flags, self.config.shrink_dummy_bonds);

            mol.bonds.push(BondPert {
                atoms: names,
                initial_force: ipot.k,
                initial_equil: ipot.equil,
                final_force: fpot.k,
                final_equil: fpot.equil,
            });
        }
        Ok(())
    }

    fn build_angles(&self, mol: &mut PertMolecule) -> Result<(), PertError> {
        for angle in self.morph.angles() {
            let mpot = angle.potential;
            let names = self.names(angle.atoms)?;
            let label = names.join("-");

            let ipot = matcher::angle_index(self.initial.angles(), matcher::direct_key(angle.atoms))
                .map(|i| self.initial.angles()[i].potential);
            let idummy = ipot.is_none();
            if idummy {
                self.require_dummy(angle.atoms, TermClass::Angle, &label)?;
            }

            let fkey = matcher::mapped_key(angle.atoms, self.mapping);
            let fpot = matcher::angle_index(self.final_state.angles(), fkey)
                .map(|i| self.final_state.angles()[i].potential);
            let fdummy = fpot.is_none();
            if fdummy {
                Self::require_unmapped(&fkey, TermClass::Angle, &label)?;
            }

            let same = same_bond_angle_potential(ipot.as_ref(), fpot.as_ref());
            policy::confirm_bond_angle_divergence(
                same,
                ipot.as_ref(),
                &mpot,
                self.zz_exempt(&names),
                TermClass::Angle,
                &label,
            )?;

            let flags = DummyFlags {
                idummy,
                fdummy,
                ..DummyFlags::default()
            };
            let (mut ipot, mut fpot) = policy::resolve_angle(ipot, fpot, &flags)?;

            if !policy::needs_record(&flags, same) {
                continue;
            }

            let outer_dummy = [
                self.morph_atom(angle.atoms[0])?.is_dummy,
                self.morph_atom(angle.atoms[2])?.is_dummy,
            ];
            policy::quench_dummy_angle(
                &mut ipot,
                &mut fpot,
                &flags,
                outer_dummy,
                self.config.turn_off_dummy_angles,
            );

            mol.angles.push(AnglePert {
                atoms: names,
                initial_force: ipot.k,
                initial_equil: ipot.equil,
                final_force: fpot.k,
                final_equil: fpot.equil,
            });
        }
        Ok(())
    }

    /// Returns the indices of final-topology dihedrals no morph dihedral
    /// matched; the reconciler accounts for them afterwards.
    fn build_dihedrals(&self, mol: &mut PertMolecule) -> Result<BTreeSet<usize>, PertError> {
        let mut unmatched: BTreeSet<usize> = (0..self.final_state.dihedrals().len()).collect();

        for dihedral in self.morph.dihedrals() {
            let mpot = &dihedral.potential;
            let names = self.names(dihedral.atoms)?;
            let label = names.join("-");

            let ipot = matcher::dihedral_index(
                self.initial.dihedrals(),
                matcher::direct_key(dihedral.atoms),
            )
            .map(|i| self.initial.dihedrals()[i].potential.clone());
            let (idummy, all_idummy) = match &ipot {
                Some(_) => (false, false),
                None => {
                    self.require_dummy(dihedral.atoms, TermClass::Dihedral, &label)?;
                    (true, self.all_dummy(dihedral.atoms)?)
                }
            };

            let fkey = matcher::mapped_key(dihedral.atoms, self.mapping);
            let fidx = matcher::dihedral_index(self.final_state.dihedrals(), fkey);
            if let Some(i) = fidx {
                unmatched.remove(&i);
            }
            let fpot = fidx.map(|i| self.final_state.dihedrals()[i].potential.clone());
            let (fdummy, all_fdummy) = match &fpot {
                Some(_) => (false, false),
                None => {
                    Self::require_unmapped(&fkey, TermClass::Dihedral, &label)?;
                    (true, fkey.iter().all(Option::is_none))
                }
            };

            let same = same_dihedral_potential(ipot.as_ref(), fpot.as_ref());
            policy::confirm_torsion_divergence(
                same,
                ipot.as_ref(),
                mpot,
                self.zz_exempt(&names),
                TermClass::Dihedral,
                &label,
            )?;

            let flags = DummyFlags {
                idummy,
                fdummy,
                all_idummy,
                all_fdummy,
            };
            let (ipot, fpot) = policy::resolve_torsion(ipot, fpot, &flags)?;

            if policy::spurious_zero_torsion(&ipot, &fpot) {
                debug!(dihedral = %label, "skipping zero-force torsion artifact");
                continue;
            }
            if !policy::needs_record(&flags, same) {
                continue;
            }

            mol.dihedrals.push(TorsionPert {
                atoms: names,
                initial_form: ipot.flatten(),
                final_form: fpot.flatten(),
            });
        }

        Ok(unmatched)
    }

    /// Returns the unmatched final and initial improper index sets, in that
    /// order.
    fn build_impropers(
        &self,
        mol: &mut PertMolecule,
    ) -> Result<(BTreeSet<usize>, BTreeSet<usize>), PertError> {
        let mut unmatched_final: BTreeSet<usize> =
            (0..self.final_state.impropers().len()).collect();
        let mut unmatched_initial: BTreeSet<usize> =
            (0..self.initial.impropers().len()).collect();

        for improper in self.morph.impropers() {
            let mpot = &improper.potential;
            let names = self.names(improper.atoms)?;
            let label = names.join("-");

            let iidx = matcher::improper_index(
                self.initial.impropers(),
                matcher::direct_key(improper.atoms),
            );
            if let Some(i) = iidx {
                unmatched_initial.remove(&i);
            }
            let ipot = iidx.map(|i| self.initial.impropers()[i].potential.clone());
            let (idummy, all_idummy) = match &ipot {
                Some(_) => (false, false),
                None => {
                    self.require_dummy(improper.atoms, TermClass::Improper, &label)?;
                    (true, self.all_dummy(improper.atoms)?)
                }
            };

            let fkey = matcher::mapped_key(improper.atoms, self.mapping);
            let fidx = matcher::improper_index(self.final_state.impropers(), fkey);
            if let Some(i) = fidx {
                unmatched_final.remove(&i);
            }
            let mut fpot = fidx.map(|i| self.final_state.impropers()[i].potential.clone());
            let mut fdummy = false;
            let mut all_fdummy = false;
            if fpot.is_none() {
                if fkey.iter().any(Option::is_none) {
                    fdummy = true;
                    all_fdummy = fkey.iter().all(Option::is_none);
                } else {
                    // Some force fields legitimately drop an improper in one
                    // end state (primary amine vs. the nitro analogue), so a
                    // fully mapped miss gets a null potential instead of the
                    // fatal treatment the other term classes receive.
                    debug!(improper = %label, "no final-state improper; assuming null potential");
                    fpot = Some(DihedralSeries::zero());
                }
            }

            let same = same_dihedral_potential(ipot.as_ref(), fpot.as_ref());
            policy::confirm_torsion_divergence(
                same,
                ipot.as_ref(),
                mpot,
                self.zz_exempt(&names),
                TermClass::Improper,
                &label,
            )?;

            let flags = DummyFlags {
                idummy,
                fdummy,
                all_idummy,
                all_fdummy,
            };
            let (ipot, fpot) = policy::resolve_torsion(ipot, fpot, &flags)?;

            if !policy::needs_record(&flags, same) {
                continue;
            }

            mol.impropers.push(TorsionPert {
                atoms: names,
                initial_form: ipot.flatten(),
                final_form: fpot.flatten(),
            });
        }

        Ok((unmatched_final, unmatched_initial))
    }

    /// Emits final-topology torsions that never matched a morph term.
    ///
    /// Atom names are recovered through the reverse mapping. The initial
    /// side is a null potential, except when every atom is synthetic on the
    /// initial side: then the final potential is reused, yielding a
    /// no-change record that is still written for completeness.
    fn reconcile_final_torsions(
        &self,
        unmatched: BTreeSet<usize>,
        class: TermClass,
        mol: &mut PertMolecule,
    ) -> Result<(), PertError> {
        if unmatched.is_empty() {
            return Ok(());
        }
        warn!(
            count = unmatched.len(),
            "{class}s in the final topology have no counterpart in the morph"
        );

        for idx in unmatched {
            let (atoms, fpot) = match class {
                TermClass::Dihedral => {
                    let term = &self.final_state.dihedrals()[idx];
                    (term.atoms, term.potential.clone())
                }
                TermClass::Improper => {
                    let term = &self.final_state.impropers()[idx];
                    (term.atoms, term.potential.clone())
                }
                _ => unreachable!("only torsion classes are reconciled"),
            };

            let mut names: [String; 4] = std::array::from_fn(|_| String::new());
            let mut all_initial_dummy = true;
            for (slot, fidx) in names.iter_mut().zip(atoms) {
                let midx = self.mapping.reverse(fidx).ok_or_else(|| {
                    PertError::Inconsistency(format!(
                        "final atom {fidx} has no morph counterpart"
                    ))
                })?;
                let matom = self.morph_atom(midx)?;
                *slot = matom.name.clone();
                all_initial_dummy &= matom.is_dummy;
            }

            debug!(term = %names.join("-"), "emitting unmatched final {class}");

            let ipot = if all_initial_dummy {
                fpot.clone()
            } else {
                DihedralSeries::zero()
            };
            let record = TorsionPert {
                atoms: names,
                initial_form: ipot.flatten(),
                final_form: fpot.flatten(),
            };
            match class {
                TermClass::Dihedral => mol.dihedrals.push(record),
                TermClass::Improper => mol.impropers.push(record),
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    /// Emits initial-topology impropers that never matched a morph term.
    ///
    /// Topology generation may treat the morph differently from the initial
    /// state when deciding which impropers to include, so the morph does not
    /// always carry every initial degree of freedom. The missing terms decay
    /// to a null potential in the final state.
    fn reconcile_initial_impropers(
        &self,
        unmatched: BTreeSet<usize>,
        mol: &mut PertMolecule,
    ) -> Result<(), PertError> {
        if unmatched.is_empty() {
            return Ok(());
        }
        warn!(
            count = unmatched.len(),
            "impropers in the initial topology have no counterpart in the morph"
        );

        for idx in unmatched {
            let term = &self.initial.impropers()[idx];

            let mut names: [String; 4] = std::array::from_fn(|_| String::new());
            for (slot, iidx) in names.iter_mut().zip(term.atoms) {
                let iatom = self.initial.atom(iidx).ok_or_else(|| {
                    PertError::Inconsistency(format!(
                        "atom {iidx} is not part of the initial topology"
                    ))
                })?;
                *slot = iatom.name.clone();
            }

            debug!(term = %names.join("-"), "emitting unmatched initial improper");

            mol.impropers.push(TorsionPert {
                atoms: names,
                initial_form: term.potential.flatten(),
                final_form: DihedralSeries::zero().flatten(),
            });
        }
        Ok(())
    }
}
