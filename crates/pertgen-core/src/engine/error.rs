use super::config::PertStrategy;
use crate::core::io::pert::PertWriteError;
use std::fmt;
use thiserror::Error;

/// The class of a bonded term, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermClass {
    Bond,
    Angle,
    Dihedral,
    Improper,
}

impl fmt::Display for TermClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bond => "bond",
            Self::Angle => "angle",
            Self::Dihedral => "dihedral",
            Self::Improper => "improper",
        };
        write!(f, "{}", name)
    }
}

/// Which end state a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndState {
    Initial,
    Final,
}

impl fmt::Display for EndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Final => "final",
        };
        write!(f, "{}", name)
    }
}

/// Fatal conditions of a perturbation build. Every variant aborts the whole
/// build; there is no local recovery, since correctness requires a corrected
/// atom mapping or force-field input.
#[derive(Debug, Error)]
pub enum PertError {
    #[error(
        "could not locate {class} parameters in the {state} state for atoms [{atoms}]; \
         the atom mapping most likely opens up a ring"
    )]
    UnmatchedTerm {
        class: TermClass,
        state: EndState,
        atoms: String,
    },

    #[error(
        "the initial and morph {class} potentials for atoms [{atoms}] differ, \
         but the term does not involve a dummy atom"
    )]
    PotentialMismatch { class: TermClass, atoms: String },

    #[error("both end states of bond {atom0}-{atom1} are made of dummy atoms")]
    DoubleDummyBond { atom0: String, atom1: String },

    #[error("perturbation strategy '{0}' is not implemented by this builder")]
    UnimplementedStrategy(PertStrategy),

    #[error("inconsistent input: {0}")]
    Inconsistency(String),

    #[error(transparent)]
    Write(#[from] PertWriteError),
}
