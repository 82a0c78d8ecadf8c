use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::Coordinates;

/// Default search radius for the nearby endpoint, in kilometers
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 10.0;

/// Query string for the recommendations endpoint
///
/// `GET /api/v1/jobs/{job_id}/recommendations?max_distance=&min_rating=&limit=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_recommendation_query"))]
pub struct RecommendationQuery {
    /// Kilometers; defaults to `matching.max_distance_km`
    #[validate(range(exclusive_min = 0.0, max = 20_040.0))]
    pub max_distance: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub min_rating: Option<f64>,
    /// Defaults to `matching.default_limit`, capped at `matching.max_limit`
    pub limit: Option<u16>,
}

/// Query string for the nearby professionals endpoint
///
/// `GET /api/v1/professionals/nearby?lat=&lon=&radius_km=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_nearby_query"))]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Kilometers; defaults to [`DEFAULT_NEARBY_RADIUS_KM`]
    #[validate(range(exclusive_min = 0.0, max = 20_040.0))]
    pub radius_km: Option<f64>,
}

// range checks pass NaN through, so every float is also checked here
fn require_finite(values: &[(&'static str, Option<f64>)]) -> Result<(), ValidationError> {
    for (name, value) in values {
        if let Some(v) = value {
            if !v.is_finite() {
                let mut err = ValidationError::new("not_finite");
                err.message = Some(format!("{} must be a finite number", name).into());
                return Err(err);
            }
        }
    }
    Ok(())
}

fn validate_recommendation_query(query: &RecommendationQuery) -> Result<(), ValidationError> {
    require_finite(&[
        ("max_distance", query.max_distance),
        ("min_rating", query.min_rating),
    ])
}

fn validate_nearby_query(query: &NearbyQuery) -> Result<(), ValidationError> {
    require_finite(&[("radius_km", query.radius_km)])?;

    if let Err(e) = Coordinates::from_pair(query.lat, query.lon) {
        let mut err = ValidationError::new("coordinates");
        err.message = Some(e.to_string().into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_query_rejects_nan() {
        let query = RecommendationQuery {
            min_rating: Some(f64::NAN),
            ..RecommendationQuery::default()
        };
        assert!(query.validate().is_err());

        let query = RecommendationQuery {
            max_distance: Some(f64::NAN),
            ..RecommendationQuery::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_recommendation_query_defaults_are_valid() {
        assert!(RecommendationQuery::default().validate().is_ok());
        let query = RecommendationQuery {
            max_distance: Some(25.0),
            min_rating: Some(4.5),
            limit: Some(3),
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_nearby_query_ranges() {
        let ok = NearbyQuery {
            lat: Some(40.7),
            lon: Some(-74.0),
            radius_km: Some(5.0),
        };
        assert!(ok.validate().is_ok());

        let bad_lat = NearbyQuery {
            lat: Some(91.0),
            ..ok.clone()
        };
        assert!(bad_lat.validate().is_err());

        let nan_lon = NearbyQuery {
            lon: Some(f64::NAN),
            ..ok.clone()
        };
        assert!(nan_lon.validate().is_err());

        let zero_radius = NearbyQuery {
            radius_km: Some(0.0),
            ..ok
        };
        assert!(zero_radius.validate().is_err());
    }
}
