//! Repositorios de persistencia

pub mod driver_repository;
pub mod route_repository;
