//! Request guards.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use super::AppState;
use crate::auth::Claims;
use crate::error::{AppError, AuthError};
use crate::models::{AuditAction, NewAuditLog};

/// Claims of a caller that presented a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    /// Start an audit event attributed to this caller.
    pub fn audit(&self, action: AuditAction, req: &HttpRequest) -> NewAuditLog {
        NewAuditLog::new(&self.0.id, &self.0.email, action).ip_address(client_ip(req))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("application state is not registered"))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::malformed("missing bearer token"))?;

    Ok(AuthenticatedUser(state.auth.verify_token(token)?))
}

pub fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info().realip_remote_addr().map(str::to_owned)
}
