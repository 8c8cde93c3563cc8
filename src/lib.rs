pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::{DynStore, PgStore};
use crate::error::Result;
use crate::services::{
    application_service::ApplicationService,
    email_service::{sender_from_config, DynEmailSender},
    job_service::JobService,
    notification_service::{NotificationHub, NotificationService},
    profile_service::ProfileService,
    review_service::ReviewService,
};
use crate::storage::{DynStorage, LocalObjectStorage, UrlSigner};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<str>,
    pub storage: DynStorage,
    pub signer: UrlSigner,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub review_service: ReviewService,
    pub notification_service: NotificationService,
    pub profile_service: ProfileService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let store: DynStore = Arc::new(PgStore::new(pool));
        let storage: DynStorage = Arc::new(LocalObjectStorage::new(&config.storage_dir));
        let email = sender_from_config(config)?;
        let signer = UrlSigner::new(&config.storage_signing_secret, &config.public_base_url);

        Ok(Self::build(store, storage, email, signer, &config.jwt_secret))
    }

    /// Wires the services over the given collaborators; tests pass in-memory ones.
    pub fn build(
        store: DynStore,
        storage: DynStorage,
        email: DynEmailSender,
        signer: UrlSigner,
        jwt_secret: &str,
    ) -> Self {
        let hub = NotificationHub::default();
        let notification_service = NotificationService::new(store.clone(), hub);
        let job_service = JobService::new(store.clone());
        let application_service =
            ApplicationService::new(store.clone(), storage.clone(), signer.clone());
        let review_service =
            ReviewService::new(store.clone(), notification_service.clone(), email.clone());
        let profile_service = ProfileService::new(store, email);

        Self {
            jwt_secret: Arc::from(jwt_secret),
            storage,
            signer,
            job_service,
            application_service,
            review_service,
            notification_service,
            profile_service,
        }
    }
}
