use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::{nearest_within, Coordinates};
use crate::models::{
    CandidateQuery, NearbyProfessional, NearbyProfessionalsResponse, NearbyQuery,
    DEFAULT_NEARBY_RADIUS_KM,
};
use crate::routes::error::ApiError;
use crate::routes::recommendations::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/professionals/nearby", web::get().to(get_nearby));
}

/// Available professionals around a point, nearest first
///
/// GET /api/v1/professionals/nearby?lat=40.71&lon=-74.0&radius_km=10
async fn get_nearby(
    state: web::Data<AppState>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for nearby query: {:?}", errors);
        return Err(ApiError::Validation(errors.to_string()));
    }

    let (lat, lon) = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(ApiError::InvalidQuery(
                "Latitude and longitude are required".to_string(),
            ))
        }
    };
    let origin = Coordinates::new(lat, lon).map_err(|e| ApiError::Validation(e.to_string()))?;
    let radius_km = query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);

    let candidates = state
        .repository
        .list_candidates(&CandidateQuery::default())
        .await
        .map_err(|e| {
            tracing::error!("Failed to query professionals near ({}, {}): {}", lat, lon, e);
            ApiError::Internal("Failed to search nearby professionals")
        })?;

    let professionals: Vec<NearbyProfessional> = nearest_within(&origin, &candidates, radius_km)
        .into_iter()
        .map(|(p, distance_km)| NearbyProfessional::new(p, distance_km))
        .collect();

    tracing::debug!(
        "{} of {} professionals within {}km of ({}, {})",
        professionals.len(),
        candidates.len(),
        radius_km,
        lat,
        lon
    );

    Ok(HttpResponse::Ok().json(NearbyProfessionalsResponse {
        latitude: lat,
        longitude: lon,
        radius_km,
        total: professionals.len(),
        professionals,
    }))
}
