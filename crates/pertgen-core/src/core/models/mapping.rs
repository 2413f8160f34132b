use super::ids::AtomIdx;

/// The partial correspondence between the morph and final atom index spaces.
///
/// A morph atom with no forward image exists only in the initial state; a
/// final atom is reached from its morph counterpart through `forward` and
/// back through `reverse`. Morph atoms that stand in for final-only atoms
/// are the dummy atoms of the morph.
///
/// The mapping is built once before a perturbation build starts and is never
/// mutated by the matching algorithm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomMapping {
    forward: Vec<Option<AtomIdx>>,
    reverse: Vec<Option<AtomIdx>>,
}

impl AtomMapping {
    /// Creates an empty mapping for the given topology sizes; every atom
    /// starts out unmapped.
    pub fn new(morph_natoms: usize, final_natoms: usize) -> Self {
        Self {
            forward: vec![None; morph_natoms],
            reverse: vec![None; final_natoms],
        }
    }

    /// Records a morph-to-final correspondence. The reverse direction is
    /// derived automatically.
    pub fn insert(&mut self, morph: AtomIdx, final_idx: AtomIdx) {
        if let Some(slot) = self.forward.get_mut(morph.0) {
            *slot = Some(final_idx);
        }
        if let Some(slot) = self.reverse.get_mut(final_idx.0) {
            *slot = Some(morph);
        }
    }

    /// The final-state image of a morph atom, if it has one.
    pub fn forward(&self, morph: AtomIdx) -> Option<AtomIdx> {
        self.forward.get(morph.0).copied().flatten()
    }

    /// The morph counterpart of a final-state atom, if it has one.
    pub fn reverse(&self, final_idx: AtomIdx) -> Option<AtomIdx> {
        self.reverse.get(final_idx.0).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_populates_both_directions() {
        let mut map = AtomMapping::new(3, 2);
        map.insert(AtomIdx(0), AtomIdx(1));
        assert_eq!(map.forward(AtomIdx(0)), Some(AtomIdx(1)));
        assert_eq!(map.reverse(AtomIdx(1)), Some(AtomIdx(0)));
    }

    #[test]
    fn unmapped_atoms_have_no_image() {
        let map = AtomMapping::new(2, 2);
        assert_eq!(map.forward(AtomIdx(1)), None);
        assert_eq!(map.reverse(AtomIdx(0)), None);
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let mut map = AtomMapping::new(1, 1);
        map.insert(AtomIdx(5), AtomIdx(7));
        assert_eq!(map.forward(AtomIdx(5)), None);
        assert_eq!(map.reverse(AtomIdx(7)), None);
    }
}
