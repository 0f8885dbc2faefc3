//! Engineered-feature derivation for diabetes risk model inference.
//!
//! This module derives the interaction and ratio features the diabetes
//! model was trained with, and assembles the full model input vector.

use crate::types::patient::PatientRecord;

/// The three engineered features appended to the raw attributes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineeredFeatures {
    /// Glucose x BMI interaction, scaled by 100
    pub glucose_bmi: f64,
    /// Age x insulin interaction, scaled by 100
    pub age_insulin: f64,
    /// Blood pressure over glucose, 0 when glucose is absent or zero
    pub bp_glucose_ratio: f64,
}

/// Derives engineered features from raw patient attributes.
///
/// Matches the preprocessing done in the Python training pipeline.
/// Features are assembled in the exact order expected by the ONNX model.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Create a new feature deriver.
    pub fn new() -> Self {
        Self
    }

    /// Derive the engineered features from a patient record.
    ///
    /// Never fails: an absent attribute degrades the affected feature to
    /// 0.0, while explicit zeros still participate in the products. The
    /// ratio additionally guards against a zero divisor, so a glucose of
    /// exactly 0 yields a zero ratio but a zero glucose_bmi product.
    pub fn derive(&self, record: &PatientRecord) -> EngineeredFeatures {
        let glucose_bmi = match (record.glucose, record.bmi) {
            (Some(glucose), Some(bmi)) => (glucose * bmi) / 100.0,
            _ => 0.0,
        };

        let age_insulin = match (record.age, record.insulin) {
            (Some(age), Some(insulin)) => (age as f64 * insulin) / 100.0,
            _ => 0.0,
        };

        // Glucose is the divisor here, not blood pressure.
        let bp_glucose_ratio = match (record.blood_pressure, record.glucose) {
            (Some(bp), Some(glucose)) if glucose > 0.0 => bp / glucose,
            _ => 0.0,
        };

        EngineeredFeatures {
            glucose_bmi,
            age_insulin,
            bp_glucose_ratio,
        }
    }

    /// Assemble the model input vector for a patient record.
    ///
    /// Returns the eight raw attributes followed by the three engineered
    /// features, in the fixed order the model was trained with. Absent raw
    /// attributes are encoded as 0.0, matching the training-time imputation.
    pub fn vector(&self, record: &PatientRecord) -> Vec<f32> {
        let derived = self.derive(record);
        let mut features = Vec::with_capacity(self.feature_count());

        // Raw attributes (8)
        features.push(record.pregnancies.map(|v| v as f32).unwrap_or(0.0));
        features.push(record.glucose.unwrap_or(0.0) as f32);
        features.push(record.blood_pressure.unwrap_or(0.0) as f32);
        features.push(record.skin_thickness.unwrap_or(0.0) as f32);
        features.push(record.insulin.unwrap_or(0.0) as f32);
        features.push(record.bmi.unwrap_or(0.0) as f32);
        features.push(record.diabetes_pedigree.unwrap_or(0.0) as f32);
        features.push(record.age.map(|v| v as f32).unwrap_or(0.0));

        // Engineered features (3)
        features.push(derived.glucose_bmi as f32);
        features.push(derived.age_insulin as f32);
        features.push(derived.bp_glucose_ratio as f32);

        features
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        11
    }

    /// Get feature names (matching the training column order).
    pub fn feature_names(&self) -> Vec<&'static str> {
        vec![
            // Raw attributes (8)
            "Pregnancies",
            "Glucose",
            "BloodPressure",
            "SkinThickness",
            "Insulin",
            "BMI",
            "DiabetesPedigreeFunction",
            "Age",
            // Engineered (3)
            "Glucose_BMI",
            "Age_Insulin",
            "BP_Glucose_Ratio",
        ]
    }
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        glucose: Option<f64>,
        bmi: Option<f64>,
        age: Option<u32>,
        insulin: Option<f64>,
        blood_pressure: Option<f64>,
    ) -> PatientRecord {
        let mut record = PatientRecord::new("rec_001".to_string());
        record.glucose = glucose;
        record.bmi = bmi;
        record.age = age;
        record.insulin = insulin;
        record.blood_pressure = blood_pressure;
        record
    }

    #[test]
    fn test_derive_all_present() {
        let deriver = FeatureDeriver::new();
        let record = record(Some(100.0), Some(20.0), Some(50), Some(100.0), Some(80.0));

        let features = deriver.derive(&record);

        assert_eq!(features.glucose_bmi, 20.0);
        assert_eq!(features.age_insulin, 50.0);
        assert_eq!(features.bp_glucose_ratio, 0.8);
    }

    #[test]
    fn test_derive_empty_record() {
        let deriver = FeatureDeriver::new();
        let record = PatientRecord::new("rec_002".to_string());

        let features = deriver.derive(&record);

        assert_eq!(features.glucose_bmi, 0.0);
        assert_eq!(features.age_insulin, 0.0);
        assert_eq!(features.bp_glucose_ratio, 0.0);
    }

    #[test]
    fn test_zero_glucose_guards_ratio_but_not_product() {
        let deriver = FeatureDeriver::new();
        let record = record(Some(0.0), Some(20.0), Some(50), Some(100.0), Some(80.0));

        let features = deriver.derive(&record);

        // Explicit zero multiplies through, but never divides.
        assert_eq!(features.glucose_bmi, 0.0);
        assert_eq!(features.bp_glucose_ratio, 0.0);
        assert_eq!(features.age_insulin, 50.0);
    }

    #[test]
    fn test_zero_bmi_still_multiplies() {
        let deriver = FeatureDeriver::new();
        let record = record(Some(100.0), Some(0.0), None, None, None);

        let features = deriver.derive(&record);
        assert_eq!(features.glucose_bmi, 0.0);
    }

    #[test]
    fn test_missing_fields_degrade_only_dependent_features() {
        let deriver = FeatureDeriver::new();

        // Missing BMI: only glucose_bmi degrades.
        let features = deriver.derive(&record(Some(100.0), None, Some(50), Some(100.0), Some(80.0)));
        assert_eq!(features.glucose_bmi, 0.0);
        assert_eq!(features.age_insulin, 50.0);
        assert_eq!(features.bp_glucose_ratio, 0.8);

        // Missing insulin: only age_insulin degrades.
        let features = deriver.derive(&record(Some(100.0), Some(20.0), Some(50), None, Some(80.0)));
        assert_eq!(features.glucose_bmi, 20.0);
        assert_eq!(features.age_insulin, 0.0);
        assert_eq!(features.bp_glucose_ratio, 0.8);

        // Missing blood pressure: only the ratio degrades.
        let features = deriver.derive(&record(Some(100.0), Some(20.0), Some(50), Some(100.0), None));
        assert_eq!(features.glucose_bmi, 20.0);
        assert_eq!(features.age_insulin, 50.0);
        assert_eq!(features.bp_glucose_ratio, 0.0);

        // Missing glucose: both the product and the ratio degrade.
        let features = deriver.derive(&record(None, Some(20.0), Some(50), Some(100.0), Some(80.0)));
        assert_eq!(features.glucose_bmi, 0.0);
        assert_eq!(features.age_insulin, 50.0);
        assert_eq!(features.bp_glucose_ratio, 0.0);
    }

    #[test]
    fn test_vector_order_and_length() {
        let deriver = FeatureDeriver::new();
        let mut record = record(Some(140.0), Some(33.6), Some(50), Some(125.0), Some(72.0));
        record.pregnancies = Some(1);
        record.skin_thickness = Some(35.0);
        record.diabetes_pedigree = Some(0.627);

        let features = deriver.vector(&record);

        assert_eq!(features.len(), deriver.feature_count());
        assert_eq!(features.len(), deriver.feature_names().len());
        assert_eq!(features[0], 1.0); // pregnancies
        assert_eq!(features[1], 140.0); // glucose
        assert_eq!(features[5], 33.6); // bmi
        assert_eq!(features[7], 50.0); // age
        assert_eq!(features[8], ((140.0 * 33.6) / 100.0) as f32); // glucose_bmi
        assert_eq!(features[9], ((50.0 * 125.0) / 100.0) as f32); // age_insulin
        assert_eq!(features[10], (72.0 / 140.0) as f32); // bp_glucose_ratio
    }

    #[test]
    fn test_vector_imputes_absent_as_zero() {
        let deriver = FeatureDeriver::new();
        let record = PatientRecord::new("rec_003".to_string());

        let features = deriver.vector(&record);

        assert_eq!(features.len(), 11);
        assert!(features.iter().all(|&v| v == 0.0));
    }
}
