//! Probability classification for diabetes risk.
//!
//! Turns the model's predicted probability into a binary verdict against a
//! configurable threshold, and into a qualitative risk tier with fixed
//! bounds. Both operations reject out-of-range probabilities instead of
//! clamping, so a mis-scaled model output surfaces as an error.

use crate::types::assessment::{RiskAssessment, RiskTier};
use crate::types::patient::PatientRecord;
use thiserror::Error;

/// Default verdict threshold, tuned during model selection.
pub const DEFAULT_THRESHOLD: f64 = 0.532;

/// Classification failures. Both variants indicate a misuse of the model
/// boundary, never a property of the patient data.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ClassifyError {
    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
}

/// Binary verdict: `true` is the diabetes class.
///
/// The boundary is inclusive on the high side, so a probability exactly at
/// the threshold classifies as positive.
pub fn classify(probability: f64, threshold: f64) -> Result<bool, ClassifyError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifyError::InvalidProbability(probability));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ClassifyError::InvalidThreshold(threshold));
    }
    Ok(probability >= threshold)
}

/// Qualitative tier from the probability alone, independent of the verdict
/// threshold.
pub fn interpret(probability: f64) -> Result<RiskTier, ClassifyError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifyError::InvalidProbability(probability));
    }
    Ok(RiskTier::from_probability(probability))
}

/// Outcome of classifying one model probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted probability of the diabetes class (0.0 - 1.0)
    pub probability: f64,
    /// Binary verdict at the evaluated threshold
    pub diabetes: bool,
    /// Qualitative risk tier
    pub risk_tier: RiskTier,
}

impl Prediction {
    /// Classify a model probability against the verdict threshold.
    pub fn evaluate(probability: f64, threshold: f64) -> Result<Self, ClassifyError> {
        let diabetes = classify(probability, threshold)?;
        let risk_tier = interpret(probability)?;

        Ok(Self {
            probability,
            diabetes,
            risk_tier,
        })
    }

    /// Convert the prediction into a publishable assessment.
    pub fn to_assessment(&self, record: &PatientRecord, threshold: f64) -> RiskAssessment {
        RiskAssessment::new(
            record.record_id.clone(),
            self.probability,
            self.diabetes,
            self.risk_tier,
            threshold,
        )
        .with_recommendations(
            self.risk_tier
                .recommendations()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        assert_eq!(classify(0.532, 0.532), Ok(true));
        assert_eq!(classify(0.531999, 0.532), Ok(false));
    }

    #[test]
    fn test_classify_at_threshold_for_any_valid_threshold() {
        for t in [0.0, 0.1, 0.3, 0.5, 0.532, 0.9, 1.0] {
            assert_eq!(classify(t, t), Ok(true));
        }
    }

    #[test]
    fn test_classify_monotone() {
        // Non-decreasing in probability, non-increasing in threshold.
        assert_eq!(classify(0.4, 0.5), Ok(false));
        assert_eq!(classify(0.6, 0.5), Ok(true));
        assert_eq!(classify(0.6, 0.7), Ok(false));
        assert_eq!(classify(0.6, 0.3), Ok(true));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        assert_eq!(
            classify(1.5, 0.5),
            Err(ClassifyError::InvalidProbability(1.5))
        );
        assert_eq!(
            classify(-0.1, 0.5),
            Err(ClassifyError::InvalidProbability(-0.1))
        );
        assert!(matches!(
            classify(f64::NAN, 0.5),
            Err(ClassifyError::InvalidProbability(_))
        ));
        assert!(matches!(
            interpret(2.0),
            Err(ClassifyError::InvalidProbability(_))
        ));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert_eq!(
            classify(0.5, 1.1),
            Err(ClassifyError::InvalidThreshold(1.1))
        );
        assert_eq!(
            classify(0.5, -0.5),
            Err(ClassifyError::InvalidThreshold(-0.5))
        );
    }

    #[test]
    fn test_interpret_tier_boundaries() {
        assert_eq!(interpret(0.6), Ok(RiskTier::VeryHigh));
        assert_eq!(interpret(0.5999), Ok(RiskTier::High));
        assert_eq!(interpret(0.45), Ok(RiskTier::High));
        assert_eq!(interpret(0.3), Ok(RiskTier::Moderate));
        assert_eq!(interpret(0.2999), Ok(RiskTier::Low));
    }

    #[test]
    fn test_interpret_partitions_unit_interval() {
        // Every probability lands in exactly one tier, and tiers are
        // monotone in the probability.
        let mut previous = RiskTier::Low;
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let tier = interpret(p).unwrap();
            assert!(tier >= previous);
            previous = tier;
        }
        assert_eq!(previous, RiskTier::VeryHigh);
    }

    #[test]
    fn test_prediction_evaluate() {
        let prediction = Prediction::evaluate(0.55, DEFAULT_THRESHOLD).unwrap();
        assert!(prediction.diabetes);
        assert_eq!(prediction.risk_tier, RiskTier::High);

        let prediction = Prediction::evaluate(0.2, DEFAULT_THRESHOLD).unwrap();
        assert!(!prediction.diabetes);
        assert_eq!(prediction.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_prediction_to_assessment() {
        let record = PatientRecord::new("rec_42".to_string());
        let prediction = Prediction::evaluate(0.7, DEFAULT_THRESHOLD).unwrap();

        let assessment = prediction.to_assessment(&record, DEFAULT_THRESHOLD);

        assert_eq!(assessment.record_id, "rec_42");
        assert_eq!(assessment.probability, 0.7);
        assert_eq!(assessment.risk_tier, RiskTier::VeryHigh);
        assert_eq!(assessment.threshold, DEFAULT_THRESHOLD);
        assert!(assessment.diabetes);
        assert!(!assessment.recommendations.is_empty());
    }

    #[test]
    fn test_verdict_and_tier_are_independent() {
        // Above the tier bound for High but below a strict threshold.
        let prediction = Prediction::evaluate(0.5, 0.9).unwrap();
        assert!(!prediction.diabetes);
        assert_eq!(prediction.risk_tier, RiskTier::High);
    }
}
