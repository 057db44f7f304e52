//! Servicios de dominio

pub mod scheduling_service;
