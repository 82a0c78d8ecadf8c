use geo::Point;
use thiserror::Error;

use crate::models::Professional;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance score used when either side has no usable location
pub const NEUTRAL_DISTANCE_SCORE: f64 = 0.5;

/// Errors for coordinate pairs that are present but unusable
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A validated (latitude, longitude) pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates(Point<f64>);

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self(Point::new(longitude, latitude)))
    }

    /// Build coordinates from an optional pair.
    ///
    /// A partial pair counts as absent and yields `Ok(None)`.
    pub fn from_pair(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, CoordinateError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            _ => Ok(None),
        }
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.0.y()
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.0.x()
    }

    /// Great-circle distance to another point in kilometers
    #[inline]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_distance(
            self.latitude(),
            self.longitude(),
            other.latitude(),
            other.longitude(),
        )
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(value: Coordinates) -> Self {
        value.0
    }
}

/// Outcome of trying to relate a job and a candidate geographically
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proximity {
    Known { distance_km: f64 },
    Unknown,
}

impl Proximity {
    pub fn between(a: Option<&Coordinates>, b: Option<&Coordinates>) -> Self {
        match (a, b) {
            (Some(a), Some(b)) => Proximity::Known {
                distance_km: a.distance_km(b),
            },
            _ => Proximity::Unknown,
        }
    }

    pub fn distance_km(&self) -> Option<f64> {
        match self {
            Proximity::Known { distance_km } => Some(*distance_km),
            Proximity::Unknown => None,
        }
    }

    /// Normalized distance score (0-1) where 1 is closest.
    ///
    /// Known distances decay linearly to 0 at `max_distance_km`; anything
    /// farther scores 0. Unknown proximity scores [`NEUTRAL_DISTANCE_SCORE`].
    pub fn score(&self, max_distance_km: f64) -> f64 {
        match self {
            Proximity::Known { distance_km } => {
                if *distance_km > max_distance_km {
                    0.0
                } else {
                    1.0 - (distance_km / max_distance_km)
                }
            }
            Proximity::Unknown => NEUTRAL_DISTANCE_SCORE,
        }
    }
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
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

/// Haversine distance over possibly-missing inputs
///
/// Returns `None` ("distance unknown") when any of the four values is absent.
pub fn great_circle_distance(
    lat1: Option<f64>,
    lon1: Option<f64>,
    lat2: Option<f64>,
    lon2: Option<f64>,
) -> Option<f64> {
    Some(haversine_distance(lat1?, lon1?, lat2?, lon2?))
}

/// Professionals within `radius_km` of `origin`, nearest first
///
/// Professionals without a usable location are left out. Equal distances
/// keep input order.
pub fn nearest_within<'a>(
    origin: &Coordinates,
    professionals: &'a [Professional],
    radius_km: f64,
) -> Vec<(&'a Professional, f64)> {
    let mut nearby: Vec<(&Professional, f64)> = professionals
        .iter()
        .filter_map(|p| {
            let location = Coordinates::from_pair(p.latitude, p.longitude).ok()??;
            let distance_km = origin.distance_km(&location);
            (distance_km <= radius_km).then_some((p, distance_km))
        })
        .collect();

    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
    nearby
}
