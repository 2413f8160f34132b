//! Pure mathematical representations of bonded-term potentials and the
//! equality tests the matching engine is built on.

pub mod potentials;
