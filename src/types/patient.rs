//! Patient record data structures for diabetes risk assessment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A patient's raw clinical attributes, as submitted for risk assessment.
///
/// Every attribute is optional: intake forms may omit any measurement, and
/// an absent value degrades the affected derived feature instead of failing
/// the assessment. Range validation (e.g. age 0-120, BMI 10-60) is the
/// intake layer's responsibility, not this type's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Unique record identifier
    #[serde(alias = "ID")]
    pub record_id: String,

    /// Number of pregnancies
    #[serde(alias = "Pregnancies")]
    pub pregnancies: Option<u32>,

    /// Plasma glucose concentration (mg/dL)
    #[serde(alias = "Glucose")]
    pub glucose: Option<f64>,

    /// Diastolic blood pressure (mmHg)
    #[serde(alias = "BloodPressure")]
    pub blood_pressure: Option<f64>,

    /// Triceps skin fold thickness (mm)
    #[serde(alias = "SkinThickness")]
    pub skin_thickness: Option<f64>,

    /// Serum insulin (μU/mL)
    #[serde(alias = "Insulin")]
    pub insulin: Option<f64>,

    /// Body mass index (kg/m²)
    #[serde(alias = "BMI")]
    pub bmi: Option<f64>,

    /// Diabetes pedigree function, a family-history score
    #[serde(alias = "DiabetesPedigreeFunction")]
    pub diabetes_pedigree: Option<f64>,

    /// Age in years
    #[serde(alias = "Age")]
    pub age: Option<u32>,

    /// Timestamp (optional, for real-time processing)
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PatientRecord {
    /// Create an empty record with only an identifier
    pub fn new(record_id: String) -> Self {
        Self {
            record_id,
            pregnancies: None,
            glucose: None,
            blood_pressure: None,
            skin_thickness: None,
            insulin: None,
            bmi: None,
            diabetes_pedigree: None,
            age: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let mut record = PatientRecord::new("rec_123".to_string());
        record.glucose = Some(140.0);
        record.age = Some(50);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: PatientRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record.record_id, deserialized.record_id);
        assert_eq!(deserialized.glucose, Some(140.0));
        assert_eq!(deserialized.age, Some(50));
        assert_eq!(deserialized.insulin, None);
    }

    #[test]
    fn test_deserialize_clinical_column_names() {
        let json = r#"{
            "ID": "rec_7",
            "Pregnancies": 1,
            "Glucose": 140,
            "BloodPressure": 72,
            "SkinThickness": 35,
            "Insulin": 125,
            "BMI": 33.6,
            "DiabetesPedigreeFunction": 0.627,
            "Age": 50
        }"#;

        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.record_id, "rec_7");
        assert_eq!(record.pregnancies, Some(1));
        assert_eq!(record.glucose, Some(140.0));
        assert_eq!(record.bmi, Some(33.6));
        assert_eq!(record.diabetes_pedigree, Some(0.627));
    }

    #[test]
    fn test_missing_fields_deserialize_to_none() {
        let json = r#"{"record_id": "rec_8", "Glucose": 92}"#;

        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.glucose, Some(92.0));
        assert_eq!(record.bmi, None);
        assert_eq!(record.blood_pressure, None);
        assert_eq!(record.age, None);
    }

    #[test]
    fn test_null_fields_deserialize_to_none() {
        let json = r#"{"record_id": "rec_9", "Glucose": null, "Age": 28}"#;

        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.glucose, None);
        assert_eq!(record.age, Some(28));
    }
}
