//! Controllers de la API

pub mod driver_controller;
