//! Routers de la API

pub mod driver_routes;
