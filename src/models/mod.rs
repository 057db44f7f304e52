//! Modelos de dominio

pub mod delivery;
pub mod driver;
pub mod route;
