use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::api::extractors::AuthenticatedUser;
use crate::api::AppState;
use crate::error::AppResult;
use crate::models::{new_id, AuditAction, NewPatient};

pub async fn list(state: web::Data<AppState>, _user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let patients = state.patients.list().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": patients.len(),
        "patients": patients,
    })))
}

pub async fn get(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let patient = state.patients.find_by_id(&path).await?;

    state
        .audit
        .record_best_effort(
            user.audit(AuditAction::ViewPatient, &req)
                .detail("patientId", patient.id.clone()),
        )
        .await;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "patient": patient })))
}

pub async fn create(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    body: web::Json<NewPatient>,
) -> AppResult<HttpResponse> {
    let new_patient = body.into_inner();
    new_patient.validate()?;

    let patient = state.patients.insert(new_patient.into_patient(new_id())).await?;

    state
        .audit
        .record_best_effort(
            user.audit(AuditAction::CreatePatient, &req)
                .detail("patientId", patient.id.clone()),
        )
        .await;

    Ok(HttpResponse::Created().json(json!({ "success": true, "patient": patient })))
}

pub async fn delete(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let patient = state.patients.delete(&path).await?;

    state
        .audit
        .record_best_effort(
            user.audit(AuditAction::DeletePatient, &req)
                .detail("patientId", patient.id.clone()),
        )
        .await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Patient deleted successfully",
    })))
}
