use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::api::extractors::{client_ip, AuthenticatedUser};
use crate::api::AppState;
use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::AppResult;
use crate::models::{AuditAction, NewAuditLog};

pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let session = state.auth.register(body.into_inner()).await?;

    state
        .audit
        .record_best_effort(
            NewAuditLog::new(&session.user.id, &session.user.name, AuditAction::CreateUser)
                .detail("email", session.user.email.clone())
                .ip_address(client_ip(&req)),
        )
        .await;

    Ok(HttpResponse::Ok().json(session))
}

pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let session = state.auth.login(body.into_inner()).await?;

    state
        .audit
        .record_best_effort(
            NewAuditLog::new(&session.user.id, &session.user.name, AuditAction::Login)
                .ip_address(client_ip(&req)),
        )
        .await;

    Ok(HttpResponse::Ok().json(session))
}

pub async fn me(state: web::Data<AppState>, user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let profile = state.auth.me(&user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
}
