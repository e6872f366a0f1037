use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::api::extractors::AuthenticatedUser;
use crate::api::AppState;
use crate::error::AppResult;
use crate::models::{Duty, DutyInput};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DutyBody {
    pub duty: DutyInput,
}

pub async fn list(state: web::Data<AppState>, _user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let caregivers = state.caregivers.list().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": caregivers.len(),
        "caregivers": caregivers,
    })))
}

pub async fn get(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let caregiver = state.caregivers.find_by_id(&path).await?;
    Ok(HttpResponse::Ok().json(caregiver))
}

/// Create the duty for its date, or replace the one already scheduled.
pub async fn upsert(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<DutyBody>,
) -> AppResult<HttpResponse> {
    let duty = Duty::from(body.into_inner().duty);
    let caregiver = state.caregivers.upsert_by_secondary_key(&path, duty).await?;
    Ok(HttpResponse::Ok().json(caregiver))
}

pub async fn remove(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<(String, NaiveDate)>,
) -> AppResult<HttpResponse> {
    let (caregiver_id, date) = path.into_inner();
    let caregiver = state.caregivers.remove(&caregiver_id, &date).await?;
    Ok(HttpResponse::Ok().json(caregiver))
}
