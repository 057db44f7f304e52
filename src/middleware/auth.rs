//! Identidad del driver
//!
//! La autenticación real (sesiones, login) vive en el gateway upstream;
//! este servicio recibe la identidad ya resuelta en el header
//! `x-driver-id`. Sin header válido no hay acceso a ningún endpoint de
//! driver.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::utils::errors::AppError;

pub const DRIVER_ID_HEADER: &str = "x-driver-id";

/// Extractor de la identidad del driver autenticado
#[derive(Debug, Clone, Copy)]
pub struct DriverIdentity(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for DriverIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(DRIVER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing driver identity".to_string()))?;

        let driver_id = Uuid::parse_str(header)
            .map_err(|_| AppError::Unauthorized("Invalid driver identity".to_string()))?;

        Ok(DriverIdentity(driver_id))
    }
}
