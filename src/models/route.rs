//! Modelo de DeliveryRoute
//!
//! Este módulo contiene el struct DeliveryRoute y su ciclo de vida.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.
//!
//! Ciclo de vida: `available` (creada por el proceso de agregación de
//! pedidos) -> `accepted` (un driver la reclama) -> `in_progress` ->
//! `completed`. Una ruta rechazada vuelve a `available` con driver_id
//! en NULL y deja de contar en el snapshot de ese driver.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::services::scheduling_service::RouteWindow;

/// Estado de la ruta - mapea al ENUM route_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "route_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Available,
    Accepted,
    InProgress,
    Completed,
}

/// DeliveryRoute principal - mapea a la tabla delivery_routes
///
/// Invariante: start_time < end_time. Los earnings se calculan una sola
/// vez al crear la ruta (tarifas fijas por pickup/dropoff/milla) y no se
/// recalculan nunca, ni siquiera en disputas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryRoute {
    pub id: Uuid,
    pub driver_id: Option<Uuid>,
    pub status: RouteStatus,
    pub time_block: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pickups: i32,
    pub dropoffs: i32,
    pub mileage: f64,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub earnings: Decimal,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRoute {
    /// Vista plana de la ruta para el scheduler (sin dependencia de storage)
    pub fn to_window(&self) -> RouteWindow {
        RouteWindow {
            route_id: self.id,
            time_block: self.time_block.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            pickups: self.pickups,
            dropoffs: self.dropoffs,
            mileage: self.mileage,
        }
    }
}
