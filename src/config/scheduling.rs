//! Política de scheduling de rutas
//!
//! Las constantes de duración, capacidad y lead time son política operativa,
//! no física: se ajustan por variable de entorno sin tocar el algoritmo de
//! detección de conflictos en `services::scheduling_service`.

use std::env;

/// Valores por defecto de la política (provisionales, pendientes de tuning)
pub const DEFAULT_BUFFER_MINUTES_PER_STOP: f64 = 5.0;
pub const DEFAULT_DRIVING_MINUTES_PER_MILE: f64 = 2.0;
pub const DEFAULT_HANDLING_MINUTES_PER_STOP: f64 = 3.0;
pub const DEFAULT_BLOCK_CAPACITY_MINUTES: f64 = 120.0;
pub const DEFAULT_LEAD_TIME_MINUTES: i64 = 20;

/// Tarifas de earnings por unidad (fijadas al crear la ruta, nunca recalculadas)
pub const EARNINGS_PER_PICKUP: f64 = 4.0;
pub const EARNINGS_PER_DROPOFF: f64 = 2.0;
pub const EARNINGS_PER_MILE: f64 = 0.5;

/// Política de aceptación de rutas para un driver
#[derive(Debug, Clone)]
pub struct SchedulingPolicy {
    /// Minutos de buffer por parada (pickup o dropoff)
    pub buffer_minutes_per_stop: f64,
    /// Minutos de conducción por milla
    pub driving_minutes_per_mile: f64,
    /// Minutos de manipulación por parada
    pub handling_minutes_per_stop: f64,
    /// Cap de minutos estimados acumulados por time block
    pub block_capacity_minutes: f64,
    /// Minutos mínimos entre "ahora" y el inicio de una ruta ofertable
    pub lead_time_minutes: i64,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            buffer_minutes_per_stop: DEFAULT_BUFFER_MINUTES_PER_STOP,
            driving_minutes_per_mile: DEFAULT_DRIVING_MINUTES_PER_MILE,
            handling_minutes_per_stop: DEFAULT_HANDLING_MINUTES_PER_STOP,
            block_capacity_minutes: DEFAULT_BLOCK_CAPACITY_MINUTES,
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
        }
    }
}

impl SchedulingPolicy {
    /// Cargar la política desde el entorno, con fallback a los defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            buffer_minutes_per_stop: env_f64(
                "SCHED_BUFFER_MINUTES_PER_STOP",
                defaults.buffer_minutes_per_stop,
            ),
            driving_minutes_per_mile: env_f64(
                "SCHED_DRIVING_MINUTES_PER_MILE",
                defaults.driving_minutes_per_mile,
            ),
            handling_minutes_per_stop: env_f64(
                "SCHED_HANDLING_MINUTES_PER_STOP",
                defaults.handling_minutes_per_stop,
            ),
            block_capacity_minutes: env_f64(
                "SCHED_BLOCK_CAPACITY_MINUTES",
                defaults.block_capacity_minutes,
            ),
            lead_time_minutes: env_i64("SCHED_LEAD_TIME_MINUTES", defaults.lead_time_minutes),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let policy = SchedulingPolicy::default();
        assert_eq!(policy.buffer_minutes_per_stop, 5.0);
        assert_eq!(policy.driving_minutes_per_mile, 2.0);
        assert_eq!(policy.handling_minutes_per_stop, 3.0);
        assert_eq!(policy.block_capacity_minutes, 120.0);
        assert_eq!(policy.lead_time_minutes, 20);
    }
}
