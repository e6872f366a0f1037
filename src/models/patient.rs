use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::repo::{Child, Mergeable, Owner, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub has_insurance: bool,
    pub room: String,
    #[serde(default)]
    pub medical_history: MedicalHistory,
    #[serde(default)]
    pub health_parameters: HealthParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MedicalHistory {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub surgeries: Vec<Surgery>,
    #[serde(default)]
    pub medications: Vec<Medication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Surgery {
    pub date: String,
    pub procedure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthParameters {
    #[serde(default)]
    pub history: Vec<HealthCheck>,
    #[serde(default, deserialize_with = "optional_date")]
    pub last_check: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HealthCheck {
    pub date: NaiveDate,
    pub blood_pressure: BloodPressure,
    pub blood_sugar: f64,
    pub heart_rate: f64,
    pub oxygen_saturation: f64,
    pub temperature: f64,
}

/// Partial update of a health check. The date addresses the check and
/// cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HealthCheckPatch {
    pub blood_pressure: Option<BloodPressure>,
    pub blood_sugar: Option<f64>,
    pub heart_rate: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub temperature: Option<f64>,
}

/// Body of a patient creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPatient {
    #[validate(length(min = 1, message = "firstName must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName must not be empty"))]
    pub last_name: String,
    #[validate(range(max = 150))]
    pub age: u32,
    pub has_insurance: bool,
    pub room: String,
    #[serde(default)]
    pub medical_history: MedicalHistory,
}

impl NewPatient {
    pub fn into_patient(self, id: String) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            has_insurance: self.has_insurance,
            room: self.room,
            medical_history: self.medical_history,
            health_parameters: HealthParameters::default(),
        }
    }
}

// Older documents store an unset lastCheck as "".
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl Record for Patient {
    const KIND: &'static str = "Patient";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Child for HealthCheck {
    type Key = NaiveDate;

    const KIND: &'static str = "Health check";

    fn key(&self) -> &NaiveDate {
        &self.date
    }
}

impl Mergeable for HealthCheck {
    type Patch = HealthCheckPatch;

    fn merge(&mut self, patch: HealthCheckPatch) {
        let HealthCheckPatch {
            blood_pressure,
            blood_sugar,
            heart_rate,
            oxygen_saturation,
            temperature,
        } = patch;

        if let Some(value) = blood_pressure {
            self.blood_pressure = value;
        }
        if let Some(value) = blood_sugar {
            self.blood_sugar = value;
        }
        if let Some(value) = heart_rate {
            self.heart_rate = value;
        }
        if let Some(value) = oxygen_saturation {
            self.oxygen_saturation = value;
        }
        if let Some(value) = temperature {
            self.temperature = value;
        }
    }
}

impl Owner for Patient {
    type Child = HealthCheck;

    fn children(&self) -> &[HealthCheck] {
        &self.health_parameters.history
    }

    fn children_mut(&mut self) -> &mut Vec<HealthCheck> {
        &mut self.health_parameters.history
    }

    fn child_upserted(&mut self, date: &NaiveDate) {
        self.health_parameters.last_check = Some(*date);
    }

    fn child_removed(&mut self, date: &NaiveDate) {
        let params = &mut self.health_parameters;
        if params.last_check.as_ref() == Some(date) {
            params.last_check = params.history.iter().map(|check| check.date).max();
        }
    }
}
