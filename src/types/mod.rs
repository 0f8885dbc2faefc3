//! Type definitions for the diabetes risk pipeline

pub mod assessment;
pub mod patient;

pub use assessment::{RiskAssessment, RiskTier};
pub use patient::PatientRecord;
