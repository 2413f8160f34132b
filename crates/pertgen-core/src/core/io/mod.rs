//! Output of perturbation records.
//!
//! The only file format this crate owns is the perturbation file itself;
//! parameter/topology and coordinate readers live with the tools that
//! produce those inputs.

pub mod pert;
