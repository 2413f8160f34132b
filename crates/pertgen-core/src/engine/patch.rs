//! Mass and atomic-number substitutions for dummy atoms.
//!
//! Dummy atoms come out of topology generation with zero mass and no
//! element, but an MD integrator needs finite masses everywhere. Each
//! affected morph atom borrows its element from the state where the atom is
//! real; atoms real in both states take the heavier of the two masses so
//! the same patch serves either perturbation direction.

use super::error::PertError;
use crate::core::models::ids::AtomIdx;
use crate::core::models::mapping::AtomMapping;
use crate::core::models::topology::Topology;

/// One per-atom substitution to apply to the simulation topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassPatch {
    pub atom: AtomIdx,
    pub atomic_number: u8,
    pub mass: f64,
}

/// Computes substitutions for every morph atom without a real element.
pub fn mass_patches(
    morph: &Topology,
    initial: &Topology,
    final_state: &Topology,
    mapping: &AtomMapping,
) -> Result<Vec<MassPatch>, PertError> {
    let mut patches = Vec::new();

    for atom in morph.atoms() {
        if atom.atomic_number != 0 {
            continue;
        }

        let patch = if atom.is_dummy {
            let fidx = mapping.forward(atom.index).ok_or_else(|| {
                PertError::Inconsistency(format!(
                    "dummy atom {} has no final-state counterpart",
                    atom.name
                ))
            })?;
            let fatom = final_state.atom(fidx).ok_or_else(|| {
                PertError::Inconsistency(format!(
                    "atom {fidx} is not part of the final topology"
                ))
            })?;
            MassPatch {
                atom: atom.index,
                atomic_number: fatom.atomic_number,
                mass: fatom.mass,
            }
        } else {
            let iatom = initial.atom(atom.index).ok_or_else(|| {
                PertError::Inconsistency(format!(
                    "atom {} is not part of the initial topology",
                    atom.index
                ))
            })?;
            let mass = match mapping.forward(atom.index).and_then(|f| final_state.atom(f)) {
                Some(fatom) => iatom.mass.max(fatom.mass),
                None => iatom.mass,
            };
            MassPatch {
                atom: atom.index,
                atomic_number: iatom.atomic_number,
                mass,
            }
        };

        patches.push(patch);
    }

    Ok(patches)
}
