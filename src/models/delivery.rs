//! Modelo de Delivery
//!
//! Una parada individual (entrega a un cliente) dentro de una ruta.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la entrega - mapea al ENUM delivery_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Completed,
}

/// Delivery principal - mapea a la tabla deliveries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Delivery {
    pub id: Uuid,
    pub route_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub status: DeliveryStatus,
    pub driver_earnings: Decimal,
    pub is_late: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
