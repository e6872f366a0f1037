#![allow(dead_code)]

use carebase::db::DocumentStore;
use carebase::models::{BloodPressure, Caregiver, HealthCheck, MedicalHistory, NewPatient, Patient};
use tempfile::TempDir;

pub async fn temp_store() -> (TempDir, DocumentStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = DocumentStore::open(dir.path(), None).await.expect("open store");
    (dir, store)
}

pub fn health_check(date: &str) -> HealthCheck {
    HealthCheck {
        date: date.parse().expect("valid date"),
        blood_pressure: BloodPressure { systolic: 118.0, diastolic: 76.0 },
        blood_sugar: 92.0,
        heart_rate: 70.0,
        oxygen_saturation: 97.0,
        temperature: 36.6,
    }
}

pub fn patient(id: &str) -> Patient {
    NewPatient {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        age: 85,
        has_insurance: true,
        room: "3A".into(),
        medical_history: MedicalHistory {
            conditions: vec!["hypertension".into()],
            allergies: vec!["penicillin".into()],
            ..Default::default()
        },
    }
    .into_patient(id.into())
}

pub fn caregiver(id: &str) -> Caregiver {
    Caregiver { id: id.into(), name: format!("Caregiver {id}"), duties: Vec::new() }
}
