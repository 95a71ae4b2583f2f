//! Harvest readiness evaluation.
//!
//! This module compares a weather observation against a crop's optimal
//! thresholds, classifies the result into a [`HarvestTier`] and turns that
//! into the short recommendation strip shown on each crop card.

use std::fmt;

use thiserror::Error;

use crate::data::{CropProfile, WeatherObservation};

/// How suitable current conditions are for harvesting a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestTier {
    /// Every threshold is met
    Ready,
    /// Exactly one threshold is violated
    Acceptable,
    /// Two or more thresholds are violated
    Problematic,
}

impl HarvestTier {
    /// Maps a violation count to a tier: 0 → Ready, 1 → Acceptable, ≥2 → Problematic.
    pub fn from_issue_count(count: usize) -> Self {
        match count {
            0 => HarvestTier::Ready,
            1 => HarvestTier::Acceptable,
            _ => HarvestTier::Problematic,
        }
    }

    /// Returns a human-readable display label for the tier.
    pub fn label(&self) -> &'static str {
        match self {
            HarvestTier::Ready => "Ready",
            HarvestTier::Acceptable => "Acceptable",
            HarvestTier::Problematic => "Problematic",
        }
    }
}

/// A single threshold violation, carrying the observed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarvestIssue {
    /// Temperature below the crop's optimal minimum (°C)
    TooCold(f64),
    /// Temperature above the crop's optimal maximum (°C)
    TooHot(f64),
    /// Relative humidity above the optimal maximum (%)
    HumidityTooHigh(f64),
    /// Recent precipitation above the optimal maximum (mm)
    PrecipitationTooHigh(f64),
}

impl fmt::Display for HarvestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestIssue::TooCold(t) => write!(f, "too cold: {}°C", t),
            HarvestIssue::TooHot(t) => write!(f, "too hot: {}°C", t),
            HarvestIssue::HumidityTooHigh(h) => write!(f, "humidity too high: {}%", h),
            HarvestIssue::PrecipitationTooHigh(p) => write!(f, "precipitation too high: {}mm", p),
        }
    }
}

/// Outcome of evaluating one crop against one observation.
///
/// `issues` is ordered temperature, humidity, precipitation.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestStatus {
    pub tier: HarvestTier,
    pub issues: Vec<HarvestIssue>,
}

impl HarvestStatus {
    /// The issues rendered as reason strings, in evaluation order.
    pub fn reasons(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Classifies harvest readiness for a crop under the observed conditions.
///
/// Checks run in a fixed order: temperature (too cold or too hot), then
/// humidity, then precipitation. Each violated threshold adds one issue and
/// the issue count alone decides the tier. Comparisons are strict, so a
/// value exactly on a threshold is still optimal.
pub fn evaluate(observation: &WeatherObservation, profile: &CropProfile) -> HarvestStatus {
    let mut issues = Vec::with_capacity(3);

    if observation.temperature_c < profile.optimal_temp_min {
        issues.push(HarvestIssue::TooCold(observation.temperature_c));
    } else if observation.temperature_c > profile.optimal_temp_max {
        issues.push(HarvestIssue::TooHot(observation.temperature_c));
    }

    if observation.humidity_percent > profile.optimal_humidity_max {
        issues.push(HarvestIssue::HumidityTooHigh(observation.humidity_percent));
    }

    if observation.precipitation_mm > profile.optimal_precip_max {
        issues.push(HarvestIssue::PrecipitationTooHigh(observation.precipitation_mm));
    }

    HarvestStatus {
        tier: HarvestTier::from_issue_count(issues.len()),
        issues,
    }
}

/// Errors raised when a status breaks the evaluator's invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarvestError {
    /// The tier and the number of reasons disagree
    #[error("internal inconsistency: {tier:?} status with {reasons} reason(s)")]
    InternalInconsistency { tier: HarvestTier, reasons: usize },
}

/// Recommendation strip shown under a crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// When to harvest, e.g. "optimal today"
    pub when_label: String,
    /// Why, e.g. "all conditions met"
    pub reason_text: String,
}

/// Maps a harvest status to its recommendation.
///
/// # Returns
/// * `Ready` → "optimal today" / "all conditions met"
/// * `Acceptable` → "possible today" / the first reason
/// * `Problematic` → "waiting recommended" / the first two reasons joined with "; "
/// * `Err(HarvestError::InternalInconsistency)` if a non-ready status carries
///   fewer reasons than its tier requires
pub fn recommend(status: &HarvestStatus) -> Result<Recommendation, HarvestError> {
    let reasons = status.reasons();
    let inconsistent = || HarvestError::InternalInconsistency {
        tier: status.tier,
        reasons: reasons.len(),
    };

    let (when_label, reason_text) = match status.tier {
        HarvestTier::Ready => ("optimal today", "all conditions met".to_string()),
        HarvestTier::Acceptable => {
            let first = reasons.first().ok_or_else(inconsistent)?;
            ("possible today", first.clone())
        }
        HarvestTier::Problematic => {
            if reasons.len() < 2 {
                return Err(inconsistent());
            }
            ("waiting recommended", reasons[..2].join("; "))
        }
    };

    Ok(Recommendation {
        when_label: when_label.to_string(),
        reason_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::observation;
    use crate::data::get_crop_by_id;

    fn weizen() -> &'static CropProfile {
        get_crop_by_id("weizen").expect("weizen is in the crop table")
    }

    #[test]
    fn test_all_conditions_met_is_ready() {
        let status = evaluate(&observation(24.0, 55.0, 1.0), weizen());

        assert_eq!(status.tier, HarvestTier::Ready);
        assert!(status.reasons().is_empty());
    }

    #[test]
    fn test_single_violation_is_acceptable() {
        let status = evaluate(&observation(30.0, 55.0, 1.0), weizen());

        assert_eq!(status.tier, HarvestTier::Acceptable);
        assert_eq!(status.reasons(), vec!["too hot: 30°C".to_string()]);
    }

    #[test]
    fn test_three_violations_are_problematic() {
        let status = evaluate(&observation(30.0, 70.0, 10.0), weizen());

        assert_eq!(status.tier, HarvestTier::Problematic);
        assert_eq!(
            status.reasons(),
            vec![
                "too hot: 30°C".to_string(),
                "humidity too high: 70%".to_string(),
                "precipitation too high: 10mm".to_string(),
            ]
        );

        let recommendation = recommend(&status).unwrap();
        assert_eq!(recommendation.when_label, "waiting recommended");
        assert_eq!(
            recommendation.reason_text,
            "too hot: 30°C; humidity too high: 70%"
        );
    }

    #[test]
    fn test_too_cold_is_reported() {
        let status = evaluate(&observation(18.5, 55.0, 1.0), weizen());
        assert_eq!(status.issues, vec![HarvestIssue::TooCold(18.5)]);
        assert_eq!(status.reasons(), vec!["too cold: 18.5°C".to_string()]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let crop = weizen();
        let status = evaluate(
            &observation(crop.optimal_temp_max, crop.optimal_humidity_max, crop.optimal_precip_max),
            crop,
        );
        assert_eq!(status.tier, HarvestTier::Ready);

        let status = evaluate(&observation(crop.optimal_temp_min, 0.0, 0.0), crop);
        assert_eq!(status.tier, HarvestTier::Ready);
    }

    #[test]
    fn test_humidity_and_precipitation_order() {
        let status = evaluate(&observation(24.0, 61.0, 5.5), weizen());
        assert_eq!(
            status.issues,
            vec![
                HarvestIssue::HumidityTooHigh(61.0),
                HarvestIssue::PrecipitationTooHigh(5.5),
            ]
        );
        assert_eq!(status.tier, HarvestTier::Problematic);
    }

    #[test]
    fn test_tier_from_issue_count() {
        assert_eq!(HarvestTier::from_issue_count(0), HarvestTier::Ready);
        assert_eq!(HarvestTier::from_issue_count(1), HarvestTier::Acceptable);
        assert_eq!(HarvestTier::from_issue_count(2), HarvestTier::Problematic);
        assert_eq!(HarvestTier::from_issue_count(3), HarvestTier::Problematic);
    }

    #[test]
    fn test_recommend_ready() {
        let status = evaluate(&observation(24.0, 55.0, 1.0), weizen());
        let recommendation = recommend(&status).unwrap();

        assert_eq!(recommendation.when_label, "optimal today");
        assert_eq!(recommendation.reason_text, "all conditions met");
    }

    #[test]
    fn test_recommend_acceptable_uses_first_reason() {
        let status = evaluate(&observation(24.0, 75.0, 1.0), weizen());
        let recommendation = recommend(&status).unwrap();

        assert_eq!(recommendation.when_label, "possible today");
        assert_eq!(recommendation.reason_text, "humidity too high: 75%");
    }

    #[test]
    fn test_recommend_problematic_with_two_reasons() {
        let status = evaluate(&observation(10.0, 55.0, 7.0), weizen());
        let recommendation = recommend(&status).unwrap();

        assert_eq!(
            recommendation.reason_text,
            "too cold: 10°C; precipitation too high: 7mm"
        );
    }

    #[test]
    fn test_recommend_rejects_acceptable_without_reasons() {
        let status = HarvestStatus {
            tier: HarvestTier::Acceptable,
            issues: vec![],
        };

        assert_eq!(
            recommend(&status),
            Err(HarvestError::InternalInconsistency {
                tier: HarvestTier::Acceptable,
                reasons: 0,
            })
        );
    }

    #[test]
    fn test_recommend_rejects_problematic_with_one_reason() {
        let status = HarvestStatus {
            tier: HarvestTier::Problematic,
            issues: vec![HarvestIssue::TooHot(31.0)],
        };

        let err = recommend(&status).unwrap_err();
        assert!(err.to_string().contains("internal inconsistency"));
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(HarvestTier::Ready.label(), "Ready");
        assert_eq!(HarvestTier::Acceptable.label(), "Acceptable");
        assert_eq!(HarvestTier::Problematic.label(), "Problematic");
    }
}
