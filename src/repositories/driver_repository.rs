//! Repositorio de drivers
//!
//! Lecturas de perfil/ubicación y estado online, más las agregaciones
//! de earnings para el dashboard del driver.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::utils::errors::AppResult;

/// Estadísticas agregadas del driver
#[derive(Debug, Clone)]
pub struct DriverStats {
    pub today_earnings: Decimal,
    pub weekly_earnings: Decimal,
    pub completed_deliveries: i64,
}

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, driver_id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(driver_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    /// Actualizar el estado online/offline del driver
    pub async fn set_online(&self, driver_id: Uuid, is_online: bool) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE drivers SET is_online = $2, last_online_at = NOW() WHERE id = $1",
        )
        .bind(driver_id)
        .bind(is_online)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Earnings de hoy, de la semana y total de entregas completadas
    pub async fn stats(&self, driver_id: Uuid, now: DateTime<Utc>) -> AppResult<DriverStats> {
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        let week_start = today_start - Duration::days(7);

        let (today_earnings,): (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(driver_earnings), 0) FROM deliveries
            WHERE driver_id = $1 AND status = 'completed' AND completed_at >= $2
            "#,
        )
        .bind(driver_id)
        .bind(today_start)
        .fetch_one(&self.pool)
        .await?;

        let (weekly_earnings,): (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(driver_earnings), 0) FROM deliveries
            WHERE driver_id = $1 AND status = 'completed' AND completed_at >= $2
            "#,
        )
        .bind(driver_id)
        .bind(week_start)
        .fetch_one(&self.pool)
        .await?;

        let (completed_deliveries,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM deliveries
            WHERE driver_id = $1 AND status = 'completed'
            "#,
        )
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(DriverStats {
            today_earnings,
            weekly_earnings,
            completed_deliveries,
        })
    }
}
