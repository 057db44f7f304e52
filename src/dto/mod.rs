//! DTOs de la API

pub mod driver_dto;
