//! Utilidades compartidas

pub mod errors;
pub mod geo;
pub mod validation;
