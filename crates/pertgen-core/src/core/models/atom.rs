use super::elements;
use super::ids::AtomIdx;

/// Name prefix identifying dummy atoms in incoming topologies.
///
/// Dummy atoms are model-only placeholders for atoms that exist in the final
/// chemical state but not in the initial one. The prefix convention comes
/// from the topology generation stage; the flag it implies is computed once
/// at construction and carried on the atom itself.
pub const DUMMY_PREFIX: &str = "DU";

/// Lennard-Jones parameters of a single atom.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LjParam {
    /// Collision diameter sigma in Angstroms.
    pub sigma: f64,
    /// Well depth epsilon in kcal/mol.
    pub epsilon: f64,
}

impl LjParam {
    pub fn new(sigma: f64, epsilon: f64) -> Self {
        Self { sigma, epsilon }
    }
}

/// An atom of one topology, with the per-atom force-field properties the
/// perturbation record needs.
///
/// An atom belongs to exactly one of the three topologies (initial, final,
/// morph). A morph atom may be a dummy; dummies carry no element, zero mass
/// and a zero atomic number.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Position of this atom within its topology. Assigned by the topology.
    pub index: AtomIdx,
    /// The atom name (e.g. "C1", "H41", "DU02").
    pub name: String,
    /// Element symbol; empty for dummy atoms.
    pub element: String,
    /// Number of protons; 0 for dummy atoms.
    pub atomic_number: u8,
    /// Atomic mass in amu; 0.0 for dummy atoms.
    pub mass: f64,
    /// Partial atomic charge in elementary charge units.
    pub partial_charge: f64,
    /// Lennard-Jones parameters.
    pub lj: LjParam,
    /// Force-field atom type label (e.g. "c3", "hc").
    pub amber_type: String,
    /// Whether this atom is a dummy placeholder. Computed once from the
    /// name prefix convention when the atom is built.
    pub is_dummy: bool,
}

impl Atom {
    /// Creates an atom with zeroed force-field parameters.
    ///
    /// Atomic number and mass are resolved from the element symbol; the
    /// dummy flag is derived from the name prefix. The index is a
    /// placeholder until the atom is added to a topology.
    pub fn new(name: &str, element: &str) -> Self {
        let (atomic_number, mass) = elements::element_data(element)
            .map(|e| (e.atomic_number, e.mass))
            .unwrap_or((0, 0.0));

        Self {
            index: AtomIdx(0),
            name: name.to_string(),
            element: element.to_string(),
            atomic_number,
            mass,
            partial_charge: 0.0,
            lj: LjParam::default(),
            amber_type: String::new(),
            is_dummy: name.starts_with(DUMMY_PREFIX),
        }
    }

    /// Sets the force-field parameters, consuming and returning the atom.
    pub fn with_params(mut self, amber_type: &str, partial_charge: f64, lj: LjParam) -> Self {
        self.amber_type = amber_type.to_string();
        self.partial_charge = partial_charge;
        self.lj = lj;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_resolves_element_data() {
        let atom = Atom::new("C1", "C");
        assert_eq!(atom.atomic_number, 6);
        assert!(atom.mass > 12.0);
        assert!(!atom.is_dummy);
    }

    #[test]
    fn dummy_flag_follows_name_prefix() {
        let dummy = Atom::new("DU01", "");
        assert!(dummy.is_dummy);
        assert_eq!(dummy.atomic_number, 0);
        assert_eq!(dummy.mass, 0.0);
    }

    #[test]
    fn with_params_sets_forcefield_properties() {
        let atom = Atom::new("O1", "O").with_params("oh", -0.6, LjParam::new(3.066, 0.21));
        assert_eq!(atom.amber_type, "oh");
        assert_eq!(atom.partial_charge, -0.6);
        assert_eq!(atom.lj, LjParam::new(3.066, 0.21));
    }
}
