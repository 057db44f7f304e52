//! DTOs del API de drivers
//!
//! Requests y responses JSON. Los nombres de campo salen en camelCase
//! porque el cliente móvil ya consume ese formato.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::route::{DeliveryRoute, RouteStatus};

/// Query params de GET /routes/nearby
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyRoutesQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

/// Response de ruta para la API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub id: Uuid,
    pub driver_id: Option<Uuid>,
    pub status: RouteStatus,
    pub time_block: String,
    pub start_time: String,
    pub end_time: String,
    pub pickups: i32,
    pub dropoffs: i32,
    pub mileage: f64,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub earnings: Decimal,
}

impl From<DeliveryRoute> for RouteResponse {
    fn from(route: DeliveryRoute) -> Self {
        Self {
            id: route.id,
            driver_id: route.driver_id,
            status: route.status,
            time_block: route.time_block,
            start_time: route.start_time.to_rfc3339(),
            end_time: route.end_time.to_rfc3339(),
            pickups: route.pickups,
            dropoffs: route.dropoffs,
            mileage: route.mileage,
            pickup_lat: route.pickup_lat,
            pickup_lng: route.pickup_lng,
            earnings: route.earnings,
        }
    }
}

/// Ruta anotada con distancia desde la posición del driver (millas)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRouteResponse {
    #[serde(flatten)]
    pub route: RouteResponse,
    pub distance_from_driver: f64,
}

/// Response de GET /routes/nearby
#[derive(Debug, Serialize)]
pub struct NearbyRoutesResponse {
    pub routes: Vec<NearbyRouteResponse>,
}

/// Response de GET /routes/available
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableRoutesResponse {
    pub routes: Vec<RouteResponse>,
    pub current_route: Option<RouteResponse>,
    pub accepted_routes: Vec<RouteResponse>,
}

/// Response de POST /routes/:route_id/accept
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRouteResponse {
    pub message: String,
    pub route_id: Uuid,
}

/// Request de POST /deliveries/:delivery_id/complete
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDeliveryRequest {
    #[serde(default)]
    pub is_late: bool,
    /// RFC3339; si falta se usa la hora del servidor
    pub completed_at: Option<String>,
}

/// Response de POST /deliveries/:delivery_id/complete
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDeliveryResponse {
    pub message: String,
    pub is_late: bool,
}

/// Request de POST /status
#[derive(Debug, Deserialize)]
pub struct DriverStatusRequest {
    /// "online" u "offline"
    pub status: String,
}

/// Response de GET /stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatsResponse {
    pub today_earnings: Decimal,
    pub weekly_earnings: Decimal,
    pub completed_deliveries: i64,
    pub status: String,
}

/// Response de GET /location
#[derive(Debug, Serialize)]
pub struct DriverLocationResponse {
    pub location: DriverLocation,
}

#[derive(Debug, Serialize)]
pub struct DriverLocation {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}
