//! Risk assessment data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative risk tier derived from the predicted probability alone.
///
/// Tiers are independent of the verdict threshold: a patient below the
/// classification cutoff can still land in the High tier for clinical
/// messaging purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskTier {
    /// Map a probability to its tier. Bounds are fixed by the model's
    /// clinical calibration and evaluated highest-first; each lower bound
    /// is inclusive.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.6 {
            RiskTier::VeryHigh
        } else if probability >= 0.45 {
            RiskTier::High
        } else if probability >= 0.3 {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    /// Recommended follow-up actions for display alongside the tier.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            RiskTier::VeryHigh => &[
                "Immediate referral to a diabetes specialist",
                "Order HbA1c and oral glucose tolerance testing",
                "Urgent lifestyle intervention required",
            ],
            RiskTier::High => &[
                "Consultation with a general practitioner advised",
                "Begin routine glucose monitoring",
                "Start dietary and physical activity changes",
            ],
            RiskTier::Moderate => &[
                "Preventive lifestyle changes recommended",
                "Annual health screening",
                "Monitor glucose levels periodically",
            ],
            RiskTier::Low => &[
                "Maintain a healthy lifestyle",
                "Keep up regular physical activity",
                "Routine annual check-up",
            ],
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Moderate => write!(f, "MODERATE"),
            RiskTier::High => write!(f, "HIGH"),
            RiskTier::VeryHigh => write!(f, "VERY HIGH"),
        }
    }
}

/// Assessment published for every scored patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Associated patient record ID
    pub record_id: String,

    /// Predicted probability of the diabetes class (0.0 - 1.0)
    pub probability: f64,

    /// Binary verdict at the configured threshold
    pub diabetes: bool,

    /// Qualitative tier, independent of the verdict threshold
    pub risk_tier: RiskTier,

    /// Threshold the verdict was evaluated against
    pub threshold: f64,

    /// Recommended follow-up actions for the presentation layer
    pub recommendations: Vec<String>,

    /// Assessment generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl RiskAssessment {
    /// Create a new risk assessment
    pub fn new(
        record_id: String,
        probability: f64,
        diabetes: bool,
        risk_tier: RiskTier,
        threshold: f64,
    ) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            record_id,
            probability,
            diabetes,
            risk_tier,
            threshold,
            recommendations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach the tier's recommended actions to the assessment
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }
}
