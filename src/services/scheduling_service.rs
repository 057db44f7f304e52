//! Servicio de scheduling de rutas
//!
//! La única autoridad que decide si un driver puede añadir una ruta
//! candidata a su carga activa. Es una función de decisión pura sobre
//! el snapshot que se le pasa: no lee ni escribe storage, no lanza
//! errores, y por eso se puede testear (y fuzzear) sin base de datos.
//!
//! Los checks se ejecutan en orden y cortocircuitan en el primero que
//! falla:
//!
//! 1. Lead time: la candidata debe empezar estrictamente después de
//!    `now + lead_time_minutes`.
//! 2. Solape: intervalos semiabiertos `[start, end)`; tocarse en un
//!    extremo NO es conflicto (rutas back-to-back permitidas).
//! 3. Capacidad: la suma de duraciones estimadas del mismo time block,
//!    incluida la candidata, no puede superar el cap del block.
//!
//! El claim real de la ruta (UPDATE condicional sobre status) vive en
//! `repositories::route_repository`: el snapshot puede quedarse stale
//! entre lectura y escritura, y es ese UPDATE atómico el que protege la
//! ruta contra el doble booking. Estos checks protegen el *tiempo* del
//! driver.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::scheduling::{
    SchedulingPolicy, EARNINGS_PER_DROPOFF, EARNINGS_PER_MILE, EARNINGS_PER_PICKUP,
};

/// Vista plana de una ruta para el scheduler
///
/// Derivada del Route Store en el momento de la decisión; nunca se
/// persiste como entidad propia.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteWindow {
    pub route_id: Uuid,
    pub time_block: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub pickups: i32,
    pub dropoffs: i32,
    pub mileage: f64,
}

/// Resultado tipado de la decisión de aceptación
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptDecision {
    Accepted,
    /// La ruta empieza dentro del lead time mínimo
    TooSoon { earliest_start: DateTime<Utc> },
    /// La ventana choca con una ruta ya aceptada o en curso
    OverlapConflict { conflicting_route_id: Uuid },
    /// Aceptarla superaría el cap de minutos del time block
    CapacityExceeded { total_minutes: f64, cap_minutes: f64 },
}

/// Estimar los minutos totales para completar una ruta
///
/// `(paradas * buffer) + (millas * conducción) + (paradas * manipulación)`.
/// Función pura; cero paradas y cero millas dan cero minutos.
pub fn estimate_route_minutes(
    policy: &SchedulingPolicy,
    pickups: i32,
    dropoffs: i32,
    mileage: f64,
) -> f64 {
    let stops = f64::from(pickups + dropoffs);
    stops * policy.buffer_minutes_per_stop
        + mileage * policy.driving_minutes_per_mile
        + stops * policy.handling_minutes_per_stop
}

/// Earnings deterministas de una ruta: tarifa fija por pickup, dropoff
/// y milla. Se calculan al crear la ruta y no se recalculan después.
pub fn calculate_route_earnings(pickups: i32, dropoffs: i32, mileage: f64) -> Decimal {
    let amount = f64::from(pickups) * EARNINGS_PER_PICKUP
        + f64::from(dropoffs) * EARNINGS_PER_DROPOFF
        + mileage * EARNINGS_PER_MILE;
    Decimal::from_f64_retain(amount).unwrap_or(Decimal::ZERO)
}

/// Decidir si el driver puede aceptar la ruta candidata
pub fn can_accept_route(
    policy: &SchedulingPolicy,
    active_routes: &[RouteWindow],
    candidate: &RouteWindow,
    now: DateTime<Utc>,
) -> AcceptDecision {
    // 1. Lead time: estrictamente después de now + lead
    let earliest_start = now + Duration::minutes(policy.lead_time_minutes);
    if candidate.start_time <= earliest_start {
        return AcceptDecision::TooSoon { earliest_start };
    }

    // 2. Solape semiabierto contra todas las rutas activas
    for existing in active_routes {
        if candidate.start_time < existing.end_time && candidate.end_time > existing.start_time {
            return AcceptDecision::OverlapConflict {
                conflicting_route_id: existing.route_id,
            };
        }
    }

    // 3. Cap de capacidad por time block
    let block_minutes: f64 = active_routes
        .iter()
        .filter(|existing| existing.time_block == candidate.time_block)
        .map(|existing| {
            estimate_route_minutes(policy, existing.pickups, existing.dropoffs, existing.mileage)
        })
        .sum();

    let candidate_minutes =
        estimate_route_minutes(policy, candidate.pickups, candidate.dropoffs, candidate.mileage);
    let total_minutes = block_minutes + candidate_minutes;

    if total_minutes > policy.block_capacity_minutes {
        return AcceptDecision::CapacityExceeded {
            total_minutes,
            cap_minutes: policy.block_capacity_minutes,
        };
    }

    AcceptDecision::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn policy() -> SchedulingPolicy {
        SchedulingPolicy::default()
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 18, hour, min, 0).unwrap()
    }

    fn window(
        block: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        pickups: i32,
        dropoffs: i32,
        mileage: f64,
    ) -> RouteWindow {
        RouteWindow {
            route_id: Uuid::new_v4(),
            time_block: block.to_string(),
            start_time: start,
            end_time: end,
            pickups,
            dropoffs,
            mileage,
        }
    }

    #[test]
    fn test_estimator_is_pure_and_zero_on_empty_route() {
        let p = policy();
        assert_eq!(estimate_route_minutes(&p, 0, 0, 0.0), 0.0);
        let a = estimate_route_minutes(&p, 3, 2, 7.5);
        let b = estimate_route_minutes(&p, 3, 2, 7.5);
        assert_eq!(a, b);
        // 5 paradas * (5 + 3) + 7.5 millas * 2 = 55
        assert_eq!(a, 55.0);
    }

    #[test]
    fn test_earnings_fixed_rates() {
        // 2 pickups * $4 + 3 dropoffs * $2 + 6 millas * $0.50 = $17
        let earnings = calculate_route_earnings(2, 3, 6.0);
        assert_eq!(earnings, Decimal::from_f64_retain(17.0).unwrap());
        assert_eq!(calculate_route_earnings(0, 0, 0.0), Decimal::ZERO);
    }

    #[test]
    fn test_back_to_back_routes_are_accepted() {
        // Ruta existente [14:00,15:00) de 55 min; candidata [15:00,15:45)
        // de 40 min en el mismo block. Tocarse no es solape y 95 <= 120.
        let p = policy();
        let active = vec![window("Afternoon", at(14, 0), at(15, 0), 3, 2, 7.5)];
        let candidate = window("Afternoon", at(15, 0), at(15, 45), 2, 2, 4.0);
        let decision = can_accept_route(&p, &active, &candidate, at(13, 0));
        assert_eq!(decision, AcceptDecision::Accepted);
    }

    #[test]
    fn test_overlapping_candidate_is_rejected() {
        let p = policy();
        let active = vec![window("Afternoon", at(14, 0), at(15, 0), 3, 2, 7.5)];
        let candidate = window("Afternoon", at(14, 30), at(15, 15), 1, 1, 2.0);
        let decision = can_accept_route(&p, &active, &candidate, at(13, 0));
        assert_eq!(
            decision,
            AcceptDecision::OverlapConflict {
                conflicting_route_id: active[0].route_id
            }
        );
    }

    #[test]
    fn test_capacity_cap_is_enforced_per_block() {
        // Dos rutas en "Morning" sumando 70 min estimados; candidata de
        // 55 min en el mismo block: 125 > 120 -> rechazada.
        let p = policy();
        let active = vec![
            // 3 paradas * 8 + 8 millas * 2 = 40 min
            window("Morning", at(8, 0), at(9, 0), 2, 1, 8.0),
            // 2 paradas * 8 + 7 millas * 2 = 30 min
            window("Morning", at(9, 0), at(10, 0), 1, 1, 7.0),
        ];
        // 5 paradas * 8 + 7.5 millas * 2 = 55 min
        let candidate = window("Morning", at(10, 0), at(11, 0), 3, 2, 7.5);
        let decision = can_accept_route(&p, &active, &candidate, at(7, 0));
        assert_eq!(
            decision,
            AcceptDecision::CapacityExceeded {
                total_minutes: 125.0,
                cap_minutes: 120.0
            }
        );
    }

    #[test]
    fn test_capacity_ignores_other_blocks() {
        let p = policy();
        let active = vec![
            window("Morning", at(8, 0), at(9, 0), 5, 5, 10.0), // 100 min
        ];
        // 55 min en otro block: no cuenta contra "Morning"
        let candidate = window("Afternoon", at(14, 0), at(15, 0), 3, 2, 7.5);
        let decision = can_accept_route(&p, &active, &candidate, at(7, 0));
        assert_eq!(decision, AcceptDecision::Accepted);
    }

    #[test]
    fn test_total_exactly_at_cap_is_accepted() {
        let p = policy();
        // 65 min existentes + 55 min candidata = 120 justos
        let active = vec![window("Morning", at(8, 0), at(9, 0), 3, 2, 12.5)];
        let candidate = window("Morning", at(9, 0), at(10, 0), 3, 2, 7.5);
        let decision = can_accept_route(&p, &active, &candidate, at(7, 0));
        assert_eq!(decision, AcceptDecision::Accepted);
    }

    #[test]
    fn test_lead_time_boundary() {
        let p = policy();
        let now = Utc.with_ymd_and_hms(2025, 8, 18, 10, 0, 0).unwrap();

        // Empieza en now + 19:59 -> rechazada
        let too_soon = window(
            "Morning",
            now + Duration::minutes(19) + Duration::seconds(59),
            now + Duration::minutes(80),
            1,
            1,
            2.0,
        );
        assert!(matches!(
            can_accept_route(&p, &[], &too_soon, now),
            AcceptDecision::TooSoon { .. }
        ));

        // Empieza exactamente en now + 20:00 -> sigue rechazada (estrictamente después)
        let exact = window(
            "Morning",
            now + Duration::minutes(20),
            now + Duration::minutes(80),
            1,
            1,
            2.0,
        );
        assert_eq!(
            can_accept_route(&p, &[], &exact, now),
            AcceptDecision::TooSoon {
                earliest_start: now + Duration::minutes(20)
            }
        );

        // Empieza en now + 20:01 -> aceptada
        let ok = window(
            "Morning",
            now + Duration::minutes(20) + Duration::seconds(1),
            now + Duration::minutes(80),
            1,
            1,
            2.0,
        );
        assert_eq!(can_accept_route(&p, &[], &ok, now), AcceptDecision::Accepted);
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        // Una candidata que viola lead time Y solape reporta TooSoon
        let p = policy();
        let now = at(13, 55);
        let active = vec![window("Afternoon", at(14, 0), at(15, 0), 3, 2, 7.5)];
        let candidate = window("Afternoon", at(14, 10), at(14, 40), 1, 1, 2.0);
        assert!(matches!(
            can_accept_route(&p, &active, &candidate, now),
            AcceptDecision::TooSoon { .. }
        ));
    }

    // Estrategia: ventanas aleatorias dentro de un día, bien después del
    // lead time para que las propiedades de solape/capacidad dominen.
    fn arb_window() -> impl Strategy<Value = RouteWindow> {
        (
            0i64..1200,
            15i64..180,
            0i32..5,
            0i32..5,
            0.0f64..25.0,
            prop_oneof![Just("Morning"), Just("Afternoon"), Just("Evening")],
        )
            .prop_map(|(start_min, dur_min, pickups, dropoffs, mileage, block)| {
                let base = Utc.with_ymd_and_hms(2025, 8, 19, 0, 0, 0).unwrap();
                let start = base + Duration::minutes(start_min);
                RouteWindow {
                    route_id: Uuid::new_v4(),
                    time_block: block.to_string(),
                    start_time: start,
                    end_time: start + Duration::minutes(dur_min),
                    pickups,
                    dropoffs,
                    mileage,
                }
            })
    }

    proptest! {
        // P1: si el scheduler acepta, la candidata no solapa con ninguna
        // ruta activa y el total del block respeta el cap.
        #[test]
        fn prop_accepted_candidate_never_overlaps(
            active in prop::collection::vec(arb_window(), 0..6),
            candidate in arb_window(),
        ) {
            let p = policy();
            // "now" un día antes: el lead time nunca interfiere aquí
            let now = Utc.with_ymd_and_hms(2025, 8, 18, 0, 0, 0).unwrap();

            if can_accept_route(&p, &active, &candidate, now) == AcceptDecision::Accepted {
                for existing in &active {
                    let overlaps = candidate.start_time < existing.end_time
                        && candidate.end_time > existing.start_time;
                    prop_assert!(!overlaps, "candidata aceptada solapa con {}", existing.route_id);
                }

                let total: f64 = active
                    .iter()
                    .filter(|w| w.time_block == candidate.time_block)
                    .chain(std::iter::once(&candidate))
                    .map(|w| estimate_route_minutes(&p, w.pickups, w.dropoffs, w.mileage))
                    .sum();
                prop_assert!(total <= p.block_capacity_minutes + 1e-9);
            }
        }

        // P2: monotonía del cap. Si se rechaza por capacidad con cap C,
        // también se rechaza con cualquier cap menor, y se acepta con
        // cualquier cap >= total calculado.
        #[test]
        fn prop_capacity_rejection_is_monotone(
            active in prop::collection::vec(arb_window(), 1..6),
            candidate in arb_window(),
        ) {
            let p = policy();
            let now = Utc.with_ymd_and_hms(2025, 8, 18, 0, 0, 0).unwrap();

            if let AcceptDecision::CapacityExceeded { total_minutes, .. } =
                can_accept_route(&p, &active, &candidate, now)
            {
                let mut tighter = p.clone();
                tighter.block_capacity_minutes = p.block_capacity_minutes / 2.0;
                prop_assert!(
                    matches!(
                        can_accept_route(&tighter, &active, &candidate, now),
                        AcceptDecision::CapacityExceeded { .. }
                    ),
                    "se esperaba CapacityExceeded con cap reducido"
                );

                let mut looser = p.clone();
                looser.block_capacity_minutes = total_minutes;
                prop_assert_eq!(
                    can_accept_route(&looser, &active, &candidate, now),
                    AcceptDecision::Accepted
                );
            }
        }

        // P5: el estimador es puro y nunca negativo
        #[test]
        fn prop_estimator_deterministic_and_non_negative(
            pickups in 0i32..50,
            dropoffs in 0i32..50,
            mileage in 0.0f64..500.0,
        ) {
            let p = policy();
            let a = estimate_route_minutes(&p, pickups, dropoffs, mileage);
            let b = estimate_route_minutes(&p, pickups, dropoffs, mileage);
            prop_assert_eq!(a, b);
            prop_assert!(a >= 0.0);
        }
    }
}
