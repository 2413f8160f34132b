use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The alchemical variant a caller may request.
///
/// Only the Sire-style perturbation file build is implemented here; the
/// pmemd softcore and explicit-dummy topology builds are driven by a
/// different orchestration layer and are rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PertStrategy {
    #[default]
    SirePert,
    Softcore,
    Dummy,
}

impl fmt::Display for PertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SirePert => "sire-pert",
            Self::Softcore => "softcore",
            Self::Dummy => "dummy",
        };
        write!(f, "{}", name)
    }
}

/// Options controlling one perturbation build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PertConfig {
    /// Molecule name written to the perturbation file header.
    pub molecule_name: String,
    /// The requested alchemical variant.
    pub strategy: PertStrategy,
    /// Force the equilibrium length of dummy-side bonds to a fixed short
    /// value to numerically stabilize a vanishing bond.
    pub shrink_dummy_bonds: bool,
    /// Zero the force constant on the dummy side of an angle unless both
    /// outer atoms are themselves dummy.
    pub turn_off_dummy_angles: bool,
    /// Atom names exempted from the potential-divergence consistency check.
    /// These atoms were renamed upstream to bypass a valency check, so their
    /// potentials may legitimately disagree.
    pub zz_atoms: HashSet<String>,
}

impl Default for PertConfig {
    fn default() -> Self {
        Self {
            molecule_name: "LIG".to_string(),
            strategy: PertStrategy::default(),
            shrink_dummy_bonds: false,
            turn_off_dummy_angles: false,
            zz_atoms: HashSet::new(),
        }
    }
}

impl PertConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// True when any of the given atom names is on the exemption list.
    pub fn is_zz_exempt<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().any(|n| self.zz_atoms.contains(n))
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_select_the_sire_pert_strategy() {
        let config = PertConfig::default();
        assert_eq!(config.strategy, PertStrategy::SirePert);
        assert_eq!(config.molecule_name, "LIG");
        assert!(!config.shrink_dummy_bonds);
        assert!(!config.turn_off_dummy_angles);
        assert!(config.zz_atoms.is_empty());
    }

    #[test]
    fn load_parses_a_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
molecule_name = "MORPH"
strategy = "softcore"
shrink_dummy_bonds = true
zz_atoms = ["zzC1", "zzN2"]
"#
        )
        .unwrap();

        let config = PertConfig::load(file.path()).unwrap();
        assert_eq!(config.molecule_name, "MORPH");
        assert_eq!(config.strategy, PertStrategy::Softcore);
        assert!(config.shrink_dummy_bonds);
        assert!(!config.turn_off_dummy_angles);
        assert!(config.is_zz_exempt(["zzC1"]));
        assert!(!config.is_zz_exempt(["C1"]));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "no_such_option = true\n").unwrap();
        assert!(matches!(
            PertConfig::load(file.path()),
            Err(ConfigLoadError::Toml { .. })
        ));
    }
}
