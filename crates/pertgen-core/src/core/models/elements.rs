use phf::phf_map;

/// Static per-element data used when constructing atoms and when patching
/// dummy-atom masses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    /// Number of protons.
    pub atomic_number: u8,
    /// Standard atomic weight in amu.
    pub mass: f64,
}

static ELEMENTS: phf::Map<&'static str, ElementData> = phf_map! {
    "H" => ElementData { atomic_number: 1, mass: 1.008 },
    "B" => ElementData { atomic_number: 5, mass: 10.811 },
    "C" => ElementData { atomic_number: 6, mass: 12.011 },
    "N" => ElementData { atomic_number: 7, mass: 14.007 },
    "O" => ElementData { atomic_number: 8, mass: 15.999 },
    "F" => ElementData { atomic_number: 9, mass: 18.998 },
    "Na" => ElementData { atomic_number: 11, mass: 22.990 },
    "Mg" => ElementData { atomic_number: 12, mass: 24.305 },
    "Si" => ElementData { atomic_number: 14, mass: 28.086 },
    "P" => ElementData { atomic_number: 15, mass: 30.974 },
    "S" => ElementData { atomic_number: 16, mass: 32.066 },
    "Cl" => ElementData { atomic_number: 17, mass: 35.453 },
    "K" => ElementData { atomic_number: 19, mass: 39.098 },
    "Ca" => ElementData { atomic_number: 20, mass: 40.078 },
    "Zn" => ElementData { atomic_number: 30, mass: 65.38 },
    "Br" => ElementData { atomic_number: 35, mass: 79.904 },
    "I" => ElementData { atomic_number: 53, mass: 126.904 },
};

/// Looks up element data by symbol. Returns `None` for unknown symbols and
/// for the empty symbol carried by dummy atoms.
pub fn element_data(symbol: &str) -> Option<&'static ElementData> {
    ELEMENTS.get(symbol)
}
