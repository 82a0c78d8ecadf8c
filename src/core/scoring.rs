use crate::models::ScoringWeights;
use thiserror::Error;

/// Allowed drift of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Construction-time configuration errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineConfigError {
    #[error("weight '{name}' must be within [0, 1], got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },

    #[error("weights must sum to 1.0, got {0}")]
    WeightSum(f64),

    #[error("max distance must be a positive number of kilometers, got {0}")]
    InvalidMaxDistance(f64),
}

/// Check that every weight is in [0, 1] and that they sum to 1 ± 1e-6
pub fn validate_weights(weights: &ScoringWeights) -> Result<(), EngineConfigError> {
    const NAMES: [&str; 5] = ["similarity", "distance", "experience", "rating", "rate"];

    for (name, value) in NAMES.into_iter().zip(weights.as_array()) {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(EngineConfigError::WeightOutOfRange { name, value });
        }
    }

    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(EngineConfigError::WeightSum(sum));
    }

    Ok(())
}

pub fn validate_max_distance(max_distance_km: f64) -> Result<(), EngineConfigError> {
    if !max_distance_km.is_finite() || max_distance_km <= 0.0 {
        return Err(EngineConfigError::InvalidMaxDistance(max_distance_km));
    }
    Ok(())
}

/// Weighted blend of similarity and distance score
///
/// score = similarity * w_similarity + distance_score * w_distance
#[inline]
pub fn composite_score(similarity: f64, distance_score: f64, weights: &ScoringWeights) -> f64 {
    similarity * weights.similarity + distance_score * weights.distance
}

/// Round half away from zero to `places` decimal places
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(s: f64, d: f64, e: f64, r: f64, rt: f64) -> ScoringWeights {
        ScoringWeights {
            similarity: s,
            distance: d,
            experience: e,
            rating: r,
            rate: rt,
        }
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert!(validate_weights(&ScoringWeights::default()).is_ok());
    }

    #[test]
    fn test_two_term_weights_are_valid() {
        assert!(validate_weights(&weights(0.7, 0.3, 0.0, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_sum_within_tolerance() {
        assert!(validate_weights(&weights(0.5, 0.2, 0.1, 0.1, 0.1 + 5e-7)).is_ok());
        assert!(matches!(
            validate_weights(&weights(0.5, 0.2, 0.1, 0.1, 0.1 + 1e-5)),
            Err(EngineConfigError::WeightSum(_))
        ));
    }

    #[test]
    fn test_sum_over_one_rejected() {
        // 0.7 + 0.3 plus three default 0.1s
        assert!(matches!(
            validate_weights(&weights(0.7, 0.3, 0.1, 0.1, 0.1)),
            Err(EngineConfigError::WeightSum(_))
        ));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        assert_eq!(
            validate_weights(&weights(1.2, -0.2, 0.0, 0.0, 0.0)),
            Err(EngineConfigError::WeightOutOfRange {
                name: "similarity",
                value: 1.2
            })
        );
        assert!(validate_weights(&weights(f64::NAN, 1.0, 0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_max_distance_validation() {
        assert!(validate_max_distance(50.0).is_ok());
        assert!(validate_max_distance(0.0).is_err());
        assert!(validate_max_distance(-3.0).is_err());
        assert!(validate_max_distance(f64::INFINITY).is_err());
    }

    #[test]
    fn test_composite_score_ignores_unused_weights() {
        let w = ScoringWeights::default();
        let score = composite_score(0.8, 1.0, &w);
        assert!((score - (0.8 * 0.5 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(0.1236, 3), 0.124);
        assert_eq!(round_to(12.345678, 2), 12.35);
    }
}
