//! Coordinate transform collaborator
use skywatch_common::{EquatorialCoord, GeoLocation, HorizontalCoord, ObjectKind};

/// Sky position lookups and horizontal/equatorial transforms.
///
/// Implementations own the time base (sidereal time, planetary ephemerides);
/// the engine only asks "where is it now".
pub trait CoordinateOracle: Send + Sync {
    /// Current equatorial position of a catalog object, `None` if unknown
    fn resolve_coordinates(
        &self,
        kind: ObjectKind,
        name: &str,
        catalog_id: Option<&str>,
    ) -> Option<EquatorialCoord>;

    /// Equatorial to horizontal for `location`, now
    fn horizontal_position(&self, coord: &EquatorialCoord, location: &GeoLocation) -> HorizontalCoord;

    /// Horizontal to equatorial for `location`, now
    fn equatorial_position(&self, coord: &HorizontalCoord, location: &GeoLocation) -> EquatorialCoord;

    /// Separation in degrees; great-circle distance unless overridden
    fn angular_separation(&self, a: &EquatorialCoord, b: &EquatorialCoord) -> f64 {
        great_circle_distance_deg(a, b)
    }
}

/// Great-circle distance between two equatorial coordinates, in degrees.
///
/// Uses the haversine form, which stays accurate for small separations.
pub fn great_circle_distance_deg(a: &EquatorialCoord, b: &EquatorialCoord) -> f64 {
    let dec1 = a.dec_deg.to_radians();
    let dec2 = b.dec_deg.to_radians();
    let d_dec = dec2 - dec1;
    let d_ra = (b.ra_deg - a.ra_deg).to_radians();

    let h = (d_dec / 2.0).sin().powi(2) + dec1.cos() * dec2.cos() * (d_ra / 2.0).sin().powi(2);
    (2.0 * h.sqrt().clamp(0.0, 1.0).asin()).to_degrees()
}
