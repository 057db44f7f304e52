//! Modelo de Driver
//!
//! Perfil mínimo del driver que necesita este servicio: ubicación base
//! y estado online. La autenticación y el alta de drivers viven en otro
//! servicio; aquí solo se lee y se actualiza el estado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Driver principal - mapea a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_online: bool,
    pub last_online_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
