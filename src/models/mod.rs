//! Domain records persisted by the store.

pub mod audit;
pub mod duty;
pub mod patient;
pub mod user;

pub use audit::{AuditAction, AuditLog, NewAuditLog};
pub use duty::{Caregiver, Duty, DutyInput, Shift};
pub use patient::{
    BloodPressure, HealthCheck, HealthCheckPatch, HealthParameters, MedicalHistory, Medication,
    NewPatient, Patient, Surgery,
};
pub use user::{Role, User, UserProfile};

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
