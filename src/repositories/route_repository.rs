//! Repositorio de rutas de delivery
//!
//! Implementa el contrato del Route Store sobre PostgreSQL. El claim de
//! una ruta es un único UPDATE condicional (compare-and-swap sobre
//! status): si la ruta dejó de estar disponible entre el snapshot y la
//! escritura, rows_affected es 0 y el caller lo traduce a
//! "Route is no longer available". No hay locks de aplicación.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::delivery::Delivery;
use crate::models::route::{DeliveryRoute, RouteStatus};
use crate::utils::errors::AppResult;

pub struct RouteRepository {
    pool: PgPool,
}

impl RouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rutas disponibles que empiezan después del cutoff de lead time
    pub async fn list_available_routes(
        &self,
        starting_after: DateTime<Utc>,
    ) -> AppResult<Vec<DeliveryRoute>> {
        let routes = sqlx::query_as::<_, DeliveryRoute>(
            r#"
            SELECT * FROM delivery_routes
            WHERE status = 'available' AND start_time > $1
            ORDER BY start_time
            "#,
        )
        .bind(starting_after)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    /// Snapshot de disponibilidad del driver: rutas accepted o in_progress
    pub async fn list_active_routes_for_driver(
        &self,
        driver_id: Uuid,
    ) -> AppResult<Vec<DeliveryRoute>> {
        let routes = sqlx::query_as::<_, DeliveryRoute>(
            r#"
            SELECT * FROM delivery_routes
            WHERE driver_id = $1 AND status IN ('accepted', 'in_progress')
            ORDER BY start_time
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    /// La ruta en curso del driver, si la hay
    pub async fn find_in_progress_route(
        &self,
        driver_id: Uuid,
    ) -> AppResult<Option<DeliveryRoute>> {
        let route = sqlx::query_as::<_, DeliveryRoute>(
            r#"
            SELECT * FROM delivery_routes
            WHERE driver_id = $1 AND status = 'in_progress'
            LIMIT 1
            "#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(route)
    }

    /// Rutas aceptadas (todavía no iniciadas) del driver
    pub async fn list_accepted_routes_for_driver(
        &self,
        driver_id: Uuid,
    ) -> AppResult<Vec<DeliveryRoute>> {
        let routes = sqlx::query_as::<_, DeliveryRoute>(
            r#"
            SELECT * FROM delivery_routes
            WHERE driver_id = $1 AND status = 'accepted'
            ORDER BY start_time
            "#,
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(routes)
    }

    pub async fn find_route_by_id(&self, route_id: Uuid) -> AppResult<Option<DeliveryRoute>> {
        let route =
            sqlx::query_as::<_, DeliveryRoute>("SELECT * FROM delivery_routes WHERE id = $1")
                .bind(route_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(route)
    }

    /// Claim atómico de una ruta disponible
    ///
    /// El WHERE exige `status = 'available'` y `start_time > cutoff` en el
    /// mismo statement que escribe el driver: si dos drivers compiten,
    /// exactamente uno ve rows_affected = 1. Devuelve false si se perdió
    /// la carrera o la ruta entró en lead time.
    pub async fn try_claim_route(
        &self,
        route_id: Uuid,
        driver_id: Uuid,
        starting_after: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE delivery_routes
            SET driver_id = $2, status = 'accepted', accepted_at = NOW()
            WHERE id = $1 AND status = 'available' AND start_time > $3
            "#,
        )
        .bind(route_id)
        .bind(driver_id)
        .bind(starting_after)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Transición de estado sin carrera (p.ej. in_progress -> completed)
    pub async fn mark_route_status(&self, route_id: Uuid, status: RouteStatus) -> AppResult<()> {
        sqlx::query("UPDATE delivery_routes SET status = $2 WHERE id = $1")
            .bind(route_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Devolver una ruta rechazada al pool de disponibles
    ///
    /// Limpia driver_id y accepted_at: la ruta deja de contar en el
    /// snapshot de disponibilidad de ese driver.
    pub async fn release_route(&self, route_id: Uuid, driver_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE delivery_routes
            SET driver_id = NULL, status = 'available', accepted_at = NULL
            WHERE id = $1 AND driver_id = $2 AND status = 'accepted'
            "#,
        )
        .bind(route_id)
        .bind(driver_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Marcar una entrega como completada
    pub async fn complete_delivery(
        &self,
        delivery_id: Uuid,
        driver_id: Uuid,
        completed_at: DateTime<Utc>,
        is_late: bool,
    ) -> AppResult<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, Delivery>(
            r#"
            UPDATE deliveries
            SET status = 'completed', completed_at = $3, is_late = $4
            WHERE id = $1 AND driver_id = $2
            RETURNING *
            "#,
        )
        .bind(delivery_id)
        .bind(driver_id)
        .bind(completed_at)
        .bind(is_late)
        .fetch_optional(&self.pool)
        .await?;

        Ok(delivery)
    }

    /// Nota de auditoría sobre el driver (p.ej. entrega tardía)
    pub async fn insert_driver_note(
        &self,
        driver_id: Uuid,
        note_type: &str,
        note: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO driver_notes (id, driver_id, note_type, note, created_by, created_at)
            VALUES ($1, $2, $3, $4, 'system', NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(driver_id)
        .bind(note_type)
        .bind(note)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
