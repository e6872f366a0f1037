//! HTTP surface: shared application state, routing and handlers.

use std::time::Duration;

use crate::audit::AuditSink;
use crate::auth::AuthService;
use crate::config::Config;
use crate::db::DocumentStore;
use crate::error::StorageError;
use crate::repo::{Caregivers, Patients, Repository};

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use routes::configure;

/// Everything a request handler may touch. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub caregivers: Repository<Caregivers>,
    pub patients: Repository<Patients>,
    pub audit: AuditSink,
}

impl AppState {
    pub fn new(store: DocumentStore, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self {
            auth: AuthService::new(Repository::new(store.clone()), jwt_secret, token_ttl),
            caregivers: Repository::new(store.clone()),
            patients: Repository::new(store.clone()),
            audit: AuditSink::new(store),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, StorageError> {
        let store =
            DocumentStore::open(&config.storage.data_dir, config.storage.seed_dir.clone()).await?;
        Ok(Self::new(
            store,
            &config.auth.jwt_secret,
            Duration::from_secs(config.auth.token_ttl_secs),
        ))
    }
}
