//! Rutas del API de drivers
//!
//! Handlers finos: extraen identidad y parámetros, validan el request y
//! delegan en el DriverController.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{
    AcceptRouteResponse, AvailableRoutesResponse, CompleteDeliveryRequest,
    CompleteDeliveryResponse, DriverLocationResponse, DriverStatsResponse, DriverStatusRequest,
    NearbyRoutesQuery, NearbyRoutesResponse,
};
use crate::middleware::auth::DriverIdentity;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/location", get(get_driver_location))
        .route("/routes/nearby", get(get_nearby_routes))
        .route("/routes/available", get(get_available_routes))
        .route("/routes/:route_id/accept", post(accept_route))
        .route("/deliveries/:delivery_id/complete", post(complete_delivery))
        .route("/stats", get(get_driver_stats))
        .route("/status", post(set_driver_status))
}

fn controller(state: &AppState) -> DriverController {
    DriverController::new(state.pool.clone(), state.policy.clone())
}

async fn get_driver_location(
    State(state): State<AppState>,
    DriverIdentity(driver_id): DriverIdentity,
) -> Result<Json<DriverLocationResponse>, AppError> {
    let response = controller(&state).driver_location(driver_id).await?;
    Ok(Json(response))
}

async fn get_nearby_routes(
    State(state): State<AppState>,
    DriverIdentity(_driver_id): DriverIdentity,
    Query(query): Query<NearbyRoutesQuery>,
) -> Result<Json<NearbyRoutesResponse>, AppError> {
    query.validate()?;
    let response = controller(&state).nearby_routes(&query, Utc::now()).await?;
    Ok(Json(response))
}

async fn get_available_routes(
    State(state): State<AppState>,
    DriverIdentity(driver_id): DriverIdentity,
) -> Result<Json<AvailableRoutesResponse>, AppError> {
    let response = controller(&state)
        .available_routes(driver_id, Utc::now())
        .await?;
    Ok(Json(response))
}

async fn accept_route(
    State(state): State<AppState>,
    DriverIdentity(driver_id): DriverIdentity,
    Path(route_id): Path<Uuid>,
) -> Result<Json<AcceptRouteResponse>, AppError> {
    let response = controller(&state)
        .accept_route(driver_id, route_id, Utc::now())
        .await?;
    Ok(Json(response))
}

async fn complete_delivery(
    State(state): State<AppState>,
    DriverIdentity(driver_id): DriverIdentity,
    Path(delivery_id): Path<Uuid>,
    request: Option<Json<CompleteDeliveryRequest>>,
) -> Result<Json<CompleteDeliveryResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let response = controller(&state)
        .complete_delivery(driver_id, delivery_id, request, Utc::now())
        .await?;
    Ok(Json(response))
}

async fn get_driver_stats(
    State(state): State<AppState>,
    DriverIdentity(driver_id): DriverIdentity,
) -> Result<Json<DriverStatsResponse>, AppError> {
    let response = controller(&state)
        .driver_stats(driver_id, Utc::now())
        .await?;
    Ok(Json(response))
}

async fn set_driver_status(
    State(state): State<AppState>,
    DriverIdentity(driver_id): DriverIdentity,
    Json(request): Json<DriverStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = controller(&state)
        .set_driver_status(driver_id, &request.status)
        .await?;
    Ok(Json(json!({
        "message": "Status updated successfully",
        "status": status,
    })))
}
