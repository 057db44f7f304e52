//! Utilidades geográficas
//!
//! Distancia de círculo máximo (haversine) entre dos puntos lat/lng.
//! Todo el sistema trabaja en millas: la misma unidad que usa el
//! estimador de duración (2 min por milla) y el campo mileage de las rutas.

/// Radio medio de la Tierra en millas
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Distancia haversine entre dos coordenadas, en millas.
///
/// Las coordenadas llegan en grados. Los rangos (±90 / ±180) se validan
/// en el caller con `utils::validation::validate_coordinates`; aquí solo
/// hay aritmética pura.
pub fn haversine_distance_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let d = haversine_distance_miles(30.3960, -86.4958, 30.3960, -86.4958);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = haversine_distance_miles(30.3960, -86.4958, 30.4213, -87.2169);
        let b = haversine_distance_miles(30.4213, -87.2169, 30.3960, -86.4958);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_fort_walton_to_pensacola() {
        // Fort Walton Beach -> Pensacola, aprox 36 millas en línea recta
        let d = haversine_distance_miles(30.4213, -86.6170, 30.4213, -87.2169);
        assert!(d > 30.0 && d < 45.0, "distancia inesperada: {}", d);
    }

    #[test]
    fn test_short_hop_within_metro() {
        // Dos puntos a ~1 km dentro de la misma ciudad
        let d = haversine_distance_miles(30.3960, -86.4958, 30.4050, -86.4958);
        assert!(d > 0.3 && d < 1.0, "distancia inesperada: {}", d);
    }
}
