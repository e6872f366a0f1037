use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::api::extractors::AuthenticatedUser;
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AuditAction, HealthCheck, HealthCheckPatch};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBody {
    /// Optional echo of the path parameter; must match when present.
    #[serde(default)]
    pub patient_id: Option<String>,
    pub check: HealthCheck,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBody {
    pub updates: HealthCheckPatch,
}

pub async fn list(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let patient = state.patients.find_by_id(&path).await?;
    let params = patient.health_parameters;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": params.history.len(),
        "lastCheck": params.last_check,
        "healthChecks": params.history,
    })))
}

pub async fn get(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<(String, NaiveDate)>,
) -> AppResult<HttpResponse> {
    let (patient_id, date) = path.into_inner();
    let check = state.patients.find_child(&patient_id, &date).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "healthCheck": check })))
}

/// Record a check; a check already stored for the same date is replaced.
pub async fn create(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CreateBody>,
) -> AppResult<HttpResponse> {
    let patient_id = path.into_inner();
    let body = body.into_inner();
    if body.patient_id.as_deref().is_some_and(|id| id != patient_id) {
        return Err(AppError::validation("patientId in body does not match the path"));
    }

    let check = body.check;
    state.patients.upsert_by_secondary_key(&patient_id, check.clone()).await?;

    state
        .audit
        .record_best_effort(
            user.audit(AuditAction::UpdatePatient, &req)
                .detail("patientId", patient_id)
                .detail("healthCheck", check.date.to_string()),
        )
        .await;

    Ok(HttpResponse::Created().json(json!({ "success": true, "healthCheck": check })))
}

pub async fn update(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    path: web::Path<(String, NaiveDate)>,
    body: web::Json<UpdateBody>,
) -> AppResult<HttpResponse> {
    let (patient_id, date) = path.into_inner();
    let check = state.patients.update(&patient_id, &date, body.into_inner().updates).await?;

    state
        .audit
        .record_best_effort(
            user.audit(AuditAction::UpdatePatient, &req)
                .detail("patientId", patient_id)
                .detail("healthCheck", date.to_string()),
        )
        .await;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "healthCheck": check })))
}

pub async fn remove(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    path: web::Path<(String, NaiveDate)>,
) -> AppResult<HttpResponse> {
    let (patient_id, date) = path.into_inner();
    state.patients.remove(&patient_id, &date).await?;

    state
        .audit
        .record_best_effort(
            user.audit(AuditAction::UpdatePatient, &req)
                .detail("patientId", patient_id)
                .detail("removedHealthCheck", date.to_string()),
        )
        .await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Health check deleted successfully",
    })))
}
