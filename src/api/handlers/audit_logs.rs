use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::api::extractors::{client_ip, AuthenticatedUser};
use crate::api::AppState;
use crate::error::AppResult;
use crate::models::NewAuditLog;

pub async fn list(state: web::Data<AppState>, _user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let logs = state.audit.list().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": logs })))
}

/// Client-reported event. Unlike server-side events, a failed append is
/// returned to the caller since the append is the whole request.
pub async fn create(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    req: HttpRequest,
    body: web::Json<NewAuditLog>,
) -> AppResult<HttpResponse> {
    let mut event = body.into_inner();
    event.validate()?;
    if event.ip_address.is_none() {
        event.ip_address = client_ip(&req);
    }

    let entry = state.audit.record(event).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "data": entry })))
}
