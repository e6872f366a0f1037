//! Route table.

use actix_web::web;

use super::handlers::{audit_logs, auth, duties, health_checks, patients};
use crate::error::AppError;

/// Register every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/duties")
                    .route("", web::get().to(duties::list))
                    .route("/{caregiver_id}", web::get().to(duties::get))
                    .route("/{caregiver_id}", web::post().to(duties::upsert))
                    .route("/{caregiver_id}/{date}", web::delete().to(duties::remove)),
            )
            .service(
                web::scope("/patients")
                    .route("", web::get().to(patients::list))
                    .route("", web::post().to(patients::create))
                    .route("/{patient_id}", web::get().to(patients::get))
                    .route("/{patient_id}", web::delete().to(patients::delete)),
            )
            .service(
                web::scope("/health-checks")
                    .route("/{patient_id}", web::get().to(health_checks::list))
                    .route("/{patient_id}", web::post().to(health_checks::create))
                    .route("/{patient_id}/{date}", web::get().to(health_checks::get))
                    .route("/{patient_id}/{date}", web::put().to(health_checks::update))
                    .route("/{patient_id}/{date}", web::delete().to(health_checks::remove)),
            )
            .service(
                web::scope("/audit-logs")
                    .route("", web::get().to(audit_logs::list))
                    .route("", web::post().to(audit_logs::create)),
            ),
    );
}
