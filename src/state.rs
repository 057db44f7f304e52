//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::config::scheduling::SchedulingPolicy;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub policy: SchedulingPolicy,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig, policy: SchedulingPolicy) -> Self {
        Self {
            pool,
            config,
            policy,
        }
    }
}
