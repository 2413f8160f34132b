//! The perturbation-file build workflow.

use crate::core::io::pert::PertMolecule;
use crate::core::models::mapping::AtomMapping;
use crate::core::models::topology::Topology;
use crate::engine::builder::PertBuilder;
use crate::engine::config::{PertConfig, PertStrategy};
use crate::engine::error::PertError;
use std::path::Path;
use tracing::{info, instrument};

/// Builds the perturbation record for one morph.
///
/// Inputs are the fully materialized initial, final and morph topologies
/// plus the atom mapping between them; none of them are modified. The build
/// is deterministic: identical inputs produce an identical record.
#[instrument(skip_all, name = "pert_workflow")]
pub fn run(
    initial: &Topology,
    final_state: &Topology,
    morph: &Topology,
    mapping: &AtomMapping,
    config: &PertConfig,
) -> Result<PertMolecule, PertError> {
    if config.strategy != PertStrategy::SirePert {
        return Err(PertError::UnimplementedStrategy(config.strategy));
    }

    info!(molecule = %config.molecule_name, "building perturbation record");

    let mol = PertBuilder::new(initial, final_state, morph, mapping, config).build()?;

    info!(
        atoms = mol.atoms.len(),
        bonds = mol.bonds.len(),
        angles = mol.angles.len(),
        dihedrals = mol.dihedrals.len(),
        impropers = mol.impropers.len(),
        "perturbation record complete"
    );

    Ok(mol)
}

/// Builds the perturbation record and writes it to `path`.
///
/// A failed build produces no file; a failed write removes the partial file
/// so callers never see a truncated perturbation file as valid output.
pub fn write_pert_file(
    initial: &Topology,
    final_state: &Topology,
    morph: &Topology,
    mapping: &AtomMapping,
    config: &PertConfig,
    path: &Path,
) -> Result<PertMolecule, PertError> {
    let mol = run(initial, final_state, morph, mapping, config)?;

    info!(path = %path.display(), "writing perturbation file");
    mol.write_to_path(path)?;

    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::potentials::BondAnglePotential;
    use crate::core::models::atom::{Atom, LjParam};
    use crate::core::models::ids::AtomIdx;
    use tempfile::tempdir;

    /// A vanishing hydrogen next to a growing nitrogen.
    fn fixture() -> (Topology, Topology, Topology, AtomMapping) {
        let mut morph = Topology::new("morph");
        let c1 = morph.add_atom(Atom::new("C1", "C").with_params("c3", -0.1, LjParam::new(3.4, 0.1)));
        let h2 = morph.add_atom(Atom::new("H2", "H").with_params("hc", 0.05, LjParam::new(2.6, 0.02)));
        let du3 = morph.add_atom(Atom::new("DU3", "").with_params("du", 0.0, LjParam::default()));
        morph.add_bond(c1, h2, BondAnglePotential::new(340.0, 1.09));
        morph.add_bond(c1, du3, BondAnglePotential::new(320.0, 1.41));

        let mut initial = Topology::new("initial");
        let ic1 = initial.add_atom(Atom::new("C1", "C").with_params("c3", -0.1, LjParam::new(3.4, 0.1)));
        let ih2 = initial.add_atom(Atom::new("H2", "H").with_params("hc", 0.05, LjParam::new(2.6, 0.02)));
        initial.add_bond(ic1, ih2, BondAnglePotential::new(340.0, 1.09));

        let mut final_state = Topology::new("final");
        let fc1 = final_state.add_atom(Atom::new("C1", "C").with_params("ca", 0.2, LjParam::new(3.4, 0.09)));
        let fn3 = final_state.add_atom(Atom::new("N3", "N").with_params("n", -0.3, LjParam::new(3.25, 0.17)));
        final_state.add_bond(fc1, fn3, BondAnglePotential::new(320.0, 1.41));

        let mut mapping = AtomMapping::new(3, 2);
        mapping.insert(c1, fc1);
        mapping.insert(du3, fn3);

        (initial, final_state, morph, mapping)
    }

    #[test]
    fn identical_inputs_produce_byte_identical_output() {
        let (initial, final_state, morph, mapping) = fixture();
        let config = PertConfig::default();

        let mut first = Vec::new();
        run(&initial, &final_state, &morph, &mapping, &config)
            .unwrap()
            .write_to(&mut first)
            .unwrap();

        let mut second = Vec::new();
        run(&initial, &final_state, &morph, &mapping, &config)
            .unwrap()
            .write_to(&mut second)
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unsupported_strategies_are_rejected_up_front() {
        let (initial, final_state, morph, mapping) = fixture();
        for strategy in [PertStrategy::Softcore, PertStrategy::Dummy] {
            let config = PertConfig {
                strategy,
                ..PertConfig::default()
            };
            let err = run(&initial, &final_state, &morph, &mapping, &config);
            assert!(matches!(err, Err(PertError::UnimplementedStrategy(s)) if s == strategy));
        }
    }

    #[test]
    fn write_pert_file_produces_a_parseable_artifact() {
        let (initial, final_state, morph, mapping) = fixture();
        let dir = tempdir().unwrap();
        let path = dir.path().join("morph.pert");

        let mol =
            write_pert_file(&initial, &final_state, &morph, &mapping, &PertConfig::default(), &path)
                .unwrap();
        assert_eq!(mol.bonds.len(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("version 1\nmolecule LIG\n"));
        assert!(text.contains("\tbond\n\t\tatom0   C1\n\t\tatom1   H2\n"));
        assert!(text.ends_with("endmolecule\n"));
    }

    #[test]
    fn failed_builds_leave_no_file_behind() {
        let (initial, final_state, mut morph, mapping) = fixture();
        // a bond synthetic on both ends makes the build abort
        morph.add_bond(AtomIdx(1), AtomIdx(2), BondAnglePotential::new(100.0, 1.0));

        let dir = tempdir().unwrap();
        let path = dir.path().join("morph.pert");
        let err = write_pert_file(
            &initial,
            &final_state,
            &morph,
            &mapping,
            &PertConfig::default(),
            &path,
        );
        assert!(err.is_err());
        assert!(!path.exists());
    }
}
