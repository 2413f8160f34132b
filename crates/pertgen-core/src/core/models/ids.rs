use std::fmt;

/// Zero-based position of an atom within a single topology.
///
/// Indices are only meaningful relative to the topology that issued them.
/// The atom mapping is the sole bridge between the morph, initial and final
/// index spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomIdx(pub usize);

impl fmt::Display for AtomIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
