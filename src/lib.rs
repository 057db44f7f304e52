//! Driver dispatch backend
//!
//! Backend HTTP para el reparto de un marketplace comunitario. El núcleo
//! es el scheduler de disponibilidad (`services::scheduling_service`):
//! decide si un driver puede aceptar una ruta sin violar lead time,
//! solapes de horario ni el cap de minutos por time block. El resto es
//! glue de handlers sobre un Route Store en PostgreSQL.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Construir el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/driver", routes::driver_routes::create_driver_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(state)
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Driver dispatch API funcionando correctamente",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
