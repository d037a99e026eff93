use crate::models::{BoundingBox, Profile};

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers
///
/// Haversine over a spherical Earth. Against the WGS-84 geodesic the error is
/// typically within ±0.5%, which is plenty for "within N km" filtering but not
/// survey-grade.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two profiles, `None` unless both have coordinates
#[inline]
pub fn profile_distance(a: &Profile, b: &Profile) -> Option<f64> {
    let (lat1, lon1) = a.location()?;
    let (lat2, lon2) = b.location()?;
    Some(haversine_distance(lat1, lon1, lat2, lon2))
}

/// Calculate a bounding box around a center point
///
/// Used by the profile repository to pre-filter rows before the exact
/// haversine check. 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
///
/// Latitudes are clamped to [-90, 90]. Longitudes are wrapped into
/// [-180, 180], so a box crossing the antimeridian has `min_lon > max_lon`.
/// Near the poles, or when the radius spans the globe, every longitude is
/// covered.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let min_lat = (lat - lat_delta).max(-90.0);
    let max_lat = (lat + lat_delta).min(90.0);

    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());
    if min_lat <= -90.0 || max_lat >= 90.0 || !lon_delta.is_finite() || lon_delta >= 180.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lon: wrap_longitude(lon - lon_delta),
        max_lon: wrap_longitude(lon + lon_delta),
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    if lon < -180.0 {
        lon + 360.0
    } else if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Check if a point is within a bounding box, honoring antimeridian wrap
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    if lat < bbox.min_lat || lat > bbox.max_lat {
        return false;
    }
    if bbox.crosses_antimeridian() {
        lon >= bbox.min_lon || lon <= bbox.max_lon
    } else {
        lon >= bbox.min_lon && lon <= bbox.max_lon
    }
}
