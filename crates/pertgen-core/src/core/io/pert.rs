//! The perturbation record and its file writer.
//!
//! A [`PertMolecule`] is built once per morph and written to a single text
//! file. The format is line oriented and tab indented: a `version` header,
//! one `molecule` block holding `atom`, `bond`, `angle`, `dihedral` and
//! `improper` blocks in that order.

use crate::core::models::atom::LjParam;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const FORMAT_VERSION: u32 = 1;

/// A per-atom perturbation: type, charge and LJ parameters at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomPert {
    pub name: String,
    pub initial_type: String,
    pub final_type: String,
    pub initial_charge: f64,
    pub final_charge: f64,
    pub initial_lj: LjParam,
    pub final_lj: LjParam,
}

/// A perturbed harmonic bond, identified by its two atom names.
#[derive(Debug, Clone, PartialEq)]
pub struct BondPert {
    pub atoms: [String; 2],
    pub initial_force: f64,
    pub initial_equil: f64,
    pub final_force: f64,
    pub final_equil: f64,
}

/// A perturbed harmonic angle, identified by its three atom names.
#[derive(Debug, Clone, PartialEq)]
pub struct AnglePert {
    pub atoms: [String; 3],
    pub initial_force: f64,
    pub initial_equil: f64,
    pub final_force: f64,
    pub final_equil: f64,
}

/// A perturbed torsion (dihedral or improper). The forms are flat
/// k/periodicity/phase triples, one triple per cosine term.
#[derive(Debug, Clone, PartialEq)]
pub struct TorsionPert {
    pub atoms: [String; 4],
    pub initial_form: Vec<f64>,
    pub final_form: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum PertWriteError {
    #[error("I/O error writing '{path}': {source}")]
    Io { path: String, source: io::Error },
}

/// The complete perturbation record for one molecule.
///
/// Records appear in the order they were emitted; the writer preserves that
/// order, so identical inputs produce byte-identical files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PertMolecule {
    pub name: String,
    pub atoms: Vec<AtomPert>,
    pub bonds: Vec<BondPert>,
    pub angles: Vec<AnglePert>,
    pub dihedrals: Vec<TorsionPert>,
    pub impropers: Vec<TorsionPert>,
}

impl PertMolecule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Writes the record in the perturbation file grammar.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "version {}", FORMAT_VERSION)?;
        writeln!(w, "molecule {}", self.name)?;

        for atom in &self.atoms {
            writeln!(w, "\tatom")?;
            writeln!(w, "\t\tname {}", atom.name)?;
            writeln!(w, "\t\tinitial_type    {}", atom.initial_type)?;
            writeln!(w, "\t\tfinal_type      {}", atom.final_type)?;
            writeln!(w, "\t\tinitial_charge {:8.5}", atom.initial_charge)?;
            writeln!(w, "\t\tfinal_charge   {:8.5}", atom.final_charge)?;
            writeln!(
                w,
                "\t\tinitial_LJ     {:8.5} {:8.5}",
                atom.initial_lj.sigma, atom.initial_lj.epsilon
            )?;
            writeln!(
                w,
                "\t\tfinal_LJ       {:8.5} {:8.5}",
                atom.final_lj.sigma, atom.final_lj.epsilon
            )?;
            writeln!(w, "\tendatom")?;
        }

        for bond in &self.bonds {
            writeln!(w, "\tbond")?;
            writeln!(w, "\t\tatom0   {}", bond.atoms[0])?;
            writeln!(w, "\t\tatom1   {}", bond.atoms[1])?;
            writeln!(w, "\t\tinitial_force {}", bond.initial_force)?;
            writeln!(w, "\t\tinitial_equil {}", bond.initial_equil)?;
            writeln!(w, "\t\tfinal_force   {}", bond.final_force)?;
            writeln!(w, "\t\tfinal_equil   {}", bond.final_equil)?;
            writeln!(w, "\tendbond")?;
        }

        for angle in &self.angles {
            writeln!(w, "\tangle")?;
            writeln!(w, "\t\tatom0   {}", angle.atoms[0])?;
            writeln!(w, "\t\tatom1   {}", angle.atoms[1])?;
            writeln!(w, "\t\tatom2   {}", angle.atoms[2])?;
            writeln!(w, "\t\tinitial_force {}", angle.initial_force)?;
            writeln!(w, "\t\tinitial_equil {}", angle.initial_equil)?;
            writeln!(w, "\t\tfinal_force   {}", angle.final_force)?;
            writeln!(w, "\t\tfinal_equil   {}", angle.final_equil)?;
            writeln!(w, "\tendangle")?;
        }

        for torsion in &self.dihedrals {
            Self::write_torsion(w, "dihedral", torsion)?;
        }
        for torsion in &self.impropers {
            Self::write_torsion(w, "improper", torsion)?;
        }

        writeln!(w, "endmolecule")?;
        Ok(())
    }

    fn write_torsion(w: &mut impl Write, tag: &str, torsion: &TorsionPert) -> io::Result<()> {
        writeln!(w, "\t{}", tag)?;
        for (i, name) in torsion.atoms.iter().enumerate() {
            writeln!(w, "\t\tatom{}   {}", i, name)?;
        }
        writeln!(w, "\t\tinitial_form {}", join_values(&torsion.initial_form))?;
        writeln!(w, "\t\tfinal_form {}", join_values(&torsion.final_form))?;
        writeln!(w, "\tend{}", tag)?;
        Ok(())
    }

    /// Writes the record to a file. On any error the partially written file
    /// is removed, so a failed build never leaves an artifact a downstream
    /// consumer could mistake for a valid one.
    pub fn write_to_path(&self, path: &Path) -> Result<(), PertWriteError> {
        let result = File::create(path).and_then(|f| {
            let mut w = BufWriter::new(f);
            self.write_to(&mut w)?;
            w.flush()
        });

        if let Err(source) = result {
            let _ = fs::remove_file(path);
            return Err(PertWriteError::Io {
                path: path.to_string_lossy().to_string(),
                source,
            });
        }

        Ok(())
    }
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_molecule() -> PertMolecule {
        let mut mol = PertMolecule::new("LIG");
        mol.atoms.push(AtomPert {
            name: "C1".into(),
            initial_type: "c3".into(),
            final_type: "ca".into(),
            initial_charge: -0.1,
            final_charge: 0.15,
            initial_lj: LjParam::new(3.39967, 0.1094),
            final_lj: LjParam::new(3.39967, 0.086),
        });
        mol.bonds.push(BondPert {
            atoms: ["C1".into(), "H1".into()],
            initial_force: 340.0,
            initial_equil: 1.09,
            final_force: 340.0,
            final_equil: 0.2,
        });
        mol.dihedrals.push(TorsionPert {
            atoms: ["H1".into(), "C1".into(), "C2".into(), "O1".into()],
            initial_form: vec![0.0, 0.0, 0.0],
            final_form: vec![0.16, 3.0, 0.0],
        });
        mol
    }

    #[test]
    fn writes_expected_grammar() {
        let mut buf = Vec::new();
        sample_molecule().write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let expected = "version 1\n\
                        molecule LIG\n\
                        \tatom\n\
                        \t\tname C1\n\
                        \t\tinitial_type    c3\n\
                        \t\tfinal_type      ca\n\
                        \t\tinitial_charge -0.10000\n\
                        \t\tfinal_charge    0.15000\n\
                        \t\tinitial_LJ      3.39967  0.10940\n\
                        \t\tfinal_LJ        3.39967  0.08600\n\
                        \tendatom\n\
                        \tbond\n\
                        \t\tatom0   C1\n\
                        \t\tatom1   H1\n\
                        \t\tinitial_force 340\n\
                        \t\tinitial_equil 1.09\n\
                        \t\tfinal_force   340\n\
                        \t\tfinal_equil   0.2\n\
                        \tendbond\n\
                        \tdihedral\n\
                        \t\tatom0   H1\n\
                        \t\tatom1   C1\n\
                        \t\tatom2   C2\n\
                        \t\tatom3   O1\n\
                        \t\tinitial_form 0 0 0\n\
                        \t\tfinal_form 0.16 3 0\n\
                        \tenddihedral\n\
                        endmolecule\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_molecule_still_has_header_and_footer() {
        let mut buf = Vec::new();
        PertMolecule::new("LIG").write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "version 1\nmolecule LIG\nendmolecule\n"
        );
    }

    #[test]
    fn write_to_path_round_trips_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("morph.pert");
        sample_molecule().write_to_path(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("version 1\nmolecule LIG\n"));
        assert!(text.ends_with("endmolecule\n"));
    }

    #[test]
    fn write_to_path_fails_cleanly_for_unwritable_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("morph.pert");
        let err = sample_molecule().write_to_path(&path);
        assert!(err.is_err());
        assert!(!path.exists());
    }
}
