use super::atom::Atom;
use super::ids::AtomIdx;
use crate::core::forcefield::potentials::{BondAnglePotential, DihedralSeries};

/// A two-atom harmonic bond term.
#[derive(Debug, Clone, PartialEq)]
pub struct BondTerm {
    pub atoms: [AtomIdx; 2],
    pub potential: BondAnglePotential,
}

/// A three-atom harmonic angle term. The middle atom is the vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTerm {
    pub atoms: [AtomIdx; 3],
    pub potential: BondAnglePotential,
}

/// A four-atom proper dihedral term.
#[derive(Debug, Clone, PartialEq)]
pub struct DihedralTerm {
    pub atoms: [AtomIdx; 4],
    pub potential: DihedralSeries,
}

/// A four-atom improper term: three spokes around a central atom. Any of the
/// twelve orderings that preserve that structure denote the same term.
#[derive(Debug, Clone, PartialEq)]
pub struct ImproperTerm {
    pub atoms: [AtomIdx; 4],
    pub potential: DihedralSeries,
}

/// One complete bonded-term description of a molecule: atoms plus per-class
/// term lists with their potentials.
///
/// A topology is fully built before the matching algorithm runs and is
/// treated as read-only from then on.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<BondTerm>,
    angles: Vec<AngleTerm>,
    dihedrals: Vec<DihedralTerm>,
    impropers: Vec<ImproperTerm>,
}

impl Topology {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an atom, assigning its index within this topology.
    pub fn add_atom(&mut self, mut atom: Atom) -> AtomIdx {
        let idx = AtomIdx(self.atoms.len());
        atom.index = idx;
        self.atoms.push(atom);
        idx
    }

    pub fn add_bond(&mut self, a0: AtomIdx, a1: AtomIdx, potential: BondAnglePotential) {
        self.bonds.push(BondTerm {
            atoms: [a0, a1],
            potential,
        });
    }

    pub fn add_angle(
        &mut self,
        a0: AtomIdx,
        a1: AtomIdx,
        a2: AtomIdx,
        potential: BondAnglePotential,
    ) {
        self.angles.push(AngleTerm {
            atoms: [a0, a1, a2],
            potential,
        });
    }

    pub fn add_dihedral(&mut self, atoms: [AtomIdx; 4], potential: DihedralSeries) {
        self.dihedrals.push(DihedralTerm { atoms, potential });
    }

    pub fn add_improper(&mut self, atoms: [AtomIdx; 4], potential: DihedralSeries) {
        self.impropers.push(ImproperTerm { atoms, potential });
    }

    pub fn atom(&self, idx: AtomIdx) -> Option<&Atom> {
        self.atoms.get(idx.0)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[BondTerm] {
        &self.bonds
    }

    pub fn angles(&self) -> &[AngleTerm] {
        &self.angles
    }

    pub fn dihedrals(&self) -> &[DihedralTerm] {
        &self.dihedrals
    }

    pub fn impropers(&self) -> &[ImproperTerm] {
        &self.impropers
    }
}
