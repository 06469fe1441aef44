//! Great-circle distance between WGS84 coordinates.

use geo::Coord;

/// Earth radius used by [`haversine_km`], in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two coordinates.
///
/// Coordinates are degrees with `x = longitude` and `y = latitude`. The
/// result is symmetric in its arguments and zero only for identical points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetroute_core::haversine_km;
///
/// let equator = Coord { x: 0.0, y: 0.0 };
/// let one_degree_north = Coord { x: 0.0, y: 1.0 };
/// let km = haversine_km(equator, one_degree_north);
/// assert!((km - 111.194_926_644_558_7).abs() < 1e-9);
/// ```
pub fn haversine_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let from_lat = from.y.to_radians();
    let to_lat = to.y.to_radians();
    // Absolute deltas keep the result bit-for-bit symmetric.
    let half_dlat = (to.y - from.y).abs().to_radians() / 2.0;
    let half_dlon = (to.x - from.x).abs().to_radians() / 2.0;
    let a = half_dlat.sin().powi(2) + from_lat.cos() * to_lat.cos() * half_dlon.sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}
