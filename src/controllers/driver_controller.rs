//! Controller del API de drivers
//!
//! Orquesta el flujo completo de aceptación: snapshot de rutas activas
//! -> decisión pura del scheduler -> claim atómico en el Route Store.
//! El controller no contiene lógica de conflictos propia; solo traduce
//! decisiones tipadas a respuestas HTTP.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::config::scheduling::SchedulingPolicy;
use crate::dto::driver_dto::{
    AcceptRouteResponse, AvailableRoutesResponse, CompleteDeliveryRequest,
    CompleteDeliveryResponse, DriverLocation, DriverLocationResponse, DriverStatsResponse,
    NearbyRouteResponse, NearbyRoutesQuery, NearbyRoutesResponse, RouteResponse,
};
use crate::models::route::RouteStatus;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::route_repository::RouteRepository;
use crate::services::scheduling_service::{can_accept_route, AcceptDecision};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::geo::haversine_distance_miles;
use crate::utils::validation::validate_datetime;

/// Máximo de rutas devueltas por el endpoint nearby
const NEARBY_ROUTES_LIMIT: usize = 10;

pub struct DriverController {
    routes: RouteRepository,
    drivers: DriverRepository,
    policy: SchedulingPolicy,
}

impl DriverController {
    pub fn new(pool: PgPool, policy: SchedulingPolicy) -> Self {
        Self {
            routes: RouteRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool),
            policy,
        }
    }

    /// Cutoff de lead time: solo son ofertables las rutas que empiezan
    /// estrictamente después de now + lead
    fn lead_time_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(self.policy.lead_time_minutes)
    }

    /// Rutas disponibles ordenadas por distancia al driver
    pub async fn nearby_routes(
        &self,
        query: &NearbyRoutesQuery,
        now: DateTime<Utc>,
    ) -> AppResult<NearbyRoutesResponse> {
        let available = self
            .routes
            .list_available_routes(self.lead_time_cutoff(now))
            .await?;

        let mut annotated: Vec<NearbyRouteResponse> = available
            .into_iter()
            .map(|route| {
                let distance = haversine_distance_miles(
                    query.lat,
                    query.lng,
                    route.pickup_lat,
                    route.pickup_lng,
                );
                NearbyRouteResponse {
                    route: RouteResponse::from(route),
                    distance_from_driver: distance,
                }
            })
            .collect();

        annotated.sort_by(|a, b| {
            a.distance_from_driver
                .partial_cmp(&b.distance_from_driver)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        annotated.truncate(NEARBY_ROUTES_LIMIT);

        Ok(NearbyRoutesResponse { routes: annotated })
    }

    /// Rutas disponibles más la carga actual del driver
    pub async fn available_routes(
        &self,
        driver_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<AvailableRoutesResponse> {
        let available = self
            .routes
            .list_available_routes(self.lead_time_cutoff(now))
            .await?;
        let current = self.routes.find_in_progress_route(driver_id).await?;
        let accepted = self.routes.list_accepted_routes_for_driver(driver_id).await?;

        Ok(AvailableRoutesResponse {
            routes: available.into_iter().map(RouteResponse::from).collect(),
            current_route: current.map(RouteResponse::from),
            accepted_routes: accepted.into_iter().map(RouteResponse::from).collect(),
        })
    }

    /// Aceptar una ruta: checks del scheduler y claim atómico
    pub async fn accept_route(
        &self,
        driver_id: Uuid,
        route_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<AcceptRouteResponse> {
        let candidate = self
            .routes
            .find_route_by_id(route_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Route '{}' not found", route_id)))?;

        if candidate.status != RouteStatus::Available {
            return Err(AppError::BadRequest("Route is no longer available".to_string()));
        }

        // Snapshot de disponibilidad del driver y decisión pura
        let active = self.routes.list_active_routes_for_driver(driver_id).await?;
        let active_windows: Vec<_> = active.iter().map(|r| r.to_window()).collect();

        let decision =
            can_accept_route(&self.policy, &active_windows, &candidate.to_window(), now);

        match decision {
            AcceptDecision::Accepted => {}
            AcceptDecision::TooSoon { earliest_start } => {
                return Err(AppError::BadRequest(format!(
                    "Route starts within the minimum lead time; earliest acceptable start is {}",
                    earliest_start.to_rfc3339()
                )));
            }
            AcceptDecision::OverlapConflict {
                conflicting_route_id,
            } => {
                return Err(AppError::BadRequest(format!(
                    "Route conflicts with existing route {}",
                    conflicting_route_id
                )));
            }
            AcceptDecision::CapacityExceeded {
                total_minutes,
                cap_minutes,
            } => {
                return Err(AppError::BadRequest(format!(
                    "Total driving time would exceed the block cap: {:.0} minutes, cap is {:.0}",
                    total_minutes, cap_minutes
                )));
            }
        }

        // El snapshot puede quedarse stale entre lectura y escritura: el
        // UPDATE condicional es la garantía real contra el doble claim.
        let claimed = self
            .routes
            .try_claim_route(route_id, driver_id, self.lead_time_cutoff(now))
            .await?;

        if !claimed {
            return Err(AppError::BadRequest("Route is no longer available".to_string()));
        }

        info!("✅ Ruta {} aceptada por driver {}", route_id, driver_id);

        Ok(AcceptRouteResponse {
            message: "Route accepted successfully".to_string(),
            route_id,
        })
    }

    /// Marcar una entrega como completada; las tardías dejan nota de auditoría
    pub async fn complete_delivery(
        &self,
        driver_id: Uuid,
        delivery_id: Uuid,
        request: CompleteDeliveryRequest,
        now: DateTime<Utc>,
    ) -> AppResult<CompleteDeliveryResponse> {
        let completed_at = match &request.completed_at {
            Some(raw) => validate_datetime(raw).map_err(|_| {
                AppError::BadRequest("completedAt must be an RFC3339 timestamp".to_string())
            })?,
            None => now,
        };

        let delivery = self
            .routes
            .complete_delivery(delivery_id, driver_id, completed_at, request.is_late)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Delivery '{}' not found for this driver", delivery_id))
            })?;

        if request.is_late {
            self.routes
                .insert_driver_note(
                    driver_id,
                    "late_delivery",
                    &format!("Late delivery for delivery {}", delivery.id),
                )
                .await?;
        }

        Ok(CompleteDeliveryResponse {
            message: "Delivery marked as complete".to_string(),
            is_late: request.is_late,
        })
    }

    /// Ubicación base del driver
    pub async fn driver_location(&self, driver_id: Uuid) -> AppResult<DriverLocationResponse> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

        Ok(DriverLocationResponse {
            location: DriverLocation {
                address: driver.address,
                lat: driver.lat,
                lng: driver.lng,
            },
        })
    }

    /// Estadísticas de earnings y entregas del driver
    pub async fn driver_stats(
        &self,
        driver_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<DriverStatsResponse> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

        let stats = self.drivers.stats(driver_id, now).await?;

        Ok(DriverStatsResponse {
            today_earnings: stats.today_earnings,
            weekly_earnings: stats.weekly_earnings,
            completed_deliveries: stats.completed_deliveries,
            status: if driver.is_online {
                "online".to_string()
            } else {
                "offline".to_string()
            },
        })
    }

    /// Cambiar el estado online/offline
    pub async fn set_driver_status(&self, driver_id: Uuid, status: &str) -> AppResult<String> {
        if status != "online" && status != "offline" {
            return Err(AppError::BadRequest("Invalid status".to_string()));
        }

        let updated = self.drivers.set_online(driver_id, status == "online").await?;
        if !updated {
            return Err(AppError::NotFound("Driver not found".to_string()));
        }

        Ok(status.to_string())
    }
}
