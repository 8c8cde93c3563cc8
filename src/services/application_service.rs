use std::path::Path;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::database::DynStore;
use crate::dto::application_dto::{ResumeUpload, SubmitApplicationPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthContext;
use crate::models::application::{
    Application, ApplicationFilter, EmployerApplicationRow, FreelancerApplicationRow, NewApplication,
};
use crate::models::job::JobStatus;
use crate::models::profile::UserRole;
use crate::services::profile_service::ensure_caller;
use crate::storage::{DynStorage, SignedUrl, UrlSigner, RESUME_LINK_TTL};

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_RESUME_EXTS: [&str; 5] = ["pdf", "doc", "docx", "txt", "rtf"];

/// Checks a resume upload and returns its normalized extension.
pub fn validate_resume(upload: &ResumeUpload) -> Result<String> {
    if upload.data.is_empty() {
        return Err(Error::BadRequest("Resume file is empty".into()));
    }
    if upload.data.len() > MAX_RESUME_BYTES {
        return Err(Error::BadRequest("Resume must be 10MB or smaller".into()));
    }

    let ext = Path::new(&upload.filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_RESUME_EXTS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed; use PDF, DOC, DOCX, TXT or RTF",
            ext
        )));
    }

    if ext == "pdf" && !upload.data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }

    Ok(ext)
}

pub fn resume_key(freelancer_id: Uuid, job_id: Uuid, ext: &str) -> String {
    format!("{}/{}/{}.{}", freelancer_id, job_id, Uuid::new_v4(), ext)
}

#[derive(Clone)]
pub struct ApplicationService {
    store: DynStore,
    storage: DynStorage,
    signer: UrlSigner,
}

impl ApplicationService {
    pub fn new(store: DynStore, storage: DynStorage, signer: UrlSigner) -> Self {
        Self { store, storage, signer }
    }

    pub async fn submit_application(
        &self,
        ctx: &AuthContext,
        job_id: Uuid,
        payload: SubmitApplicationPayload,
        resume: Option<ResumeUpload>,
    ) -> Result<Application> {
        ctx.require_role(UserRole::Freelancer)?;
        payload.validate()?;

        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))?;
        if job.status != JobStatus::Open {
            return Err(Error::BadRequest("This job is no longer accepting applications".into()));
        }
        if self.store.find_application(job_id, ctx.user_id).await?.is_some() {
            return Err(Error::Conflict("You have already applied to this job".into()));
        }

        ensure_caller(&self.store, ctx).await?;

        let resume_key = match resume {
            Some(upload) => {
                let ext = validate_resume(&upload)?;
                let key = resume_key(ctx.user_id, job_id, &ext);
                self.storage.put(&key, upload.data).await?;
                Some(key)
            }
            None => None,
        };

        let inserted = self
            .store
            .insert_application(NewApplication {
                job_id,
                freelancer_id: ctx.user_id,
                cover_letter: payload.cover_letter.trim().to_string(),
                proposed_rate: payload.proposed_rate,
                phone_number: payload.phone.trim().to_string(),
                resume_key: resume_key.clone(),
            })
            .await;

        match inserted {
            Ok(application) => {
                info!(
                    application_id = %application.id,
                    job_id = %job_id,
                    freelancer_id = %ctx.user_id,
                    has_resume = resume_key.is_some(),
                    "application submitted"
                );
                Ok(application)
            }
            Err(e) => {
                if let Some(key) = resume_key {
                    warn!(key = %key, error = %e, "application insert failed, removing uploaded resume");
                    if let Err(cleanup) = self.storage.delete(&key).await {
                        error!(key = %key, error = %cleanup, "failed to remove orphaned resume");
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn list_my_applications(&self, ctx: &AuthContext) -> Result<Vec<FreelancerApplicationRow>> {
        ctx.require_role(UserRole::Freelancer)?;
        self.store.list_for_freelancer(ctx.user_id).await
    }

    pub async fn list_employer_applications(
        &self,
        ctx: &AuthContext,
        filter: ApplicationFilter,
    ) -> Result<Vec<EmployerApplicationRow>> {
        ctx.require_role(UserRole::Employer)?;
        self.store.list_for_employer(ctx.user_id, &filter).await
    }

    /// Short-lived download link for the application's resume. Only the
    /// applicant and the owner of the job may ask for one.
    pub async fn resume_link(&self, ctx: &AuthContext, application_id: Uuid) -> Result<SignedUrl> {
        let application = self.load(application_id).await?;
        if application.freelancer_id != ctx.user_id {
            let job = self
                .store
                .get_job(application.job_id)
                .await?
                .ok_or_else(|| Error::NotFound("Job not found".into()))?;
            if job.employer_id != ctx.user_id {
                return Err(Error::Forbidden("You cannot view this resume".into()));
            }
        }
        let key = application
            .resume_key
            .as_deref()
            .ok_or_else(|| Error::NotFound("No resume attached".into()))?;
        self.signer.sign(key, RESUME_LINK_TTL, Utc::now())
    }

    async fn load(&self, id: Uuid) -> Result<Application> {
        self.store
            .get_application(id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use rust_decimal::Decimal;

    use super::*;
    use crate::database::InMemoryStore;
    use crate::models::job::NewJob;
    use crate::storage::{InMemoryObjectStorage, ObjectBody, ObjectStorage};

    struct Fixture {
        svc: ApplicationService,
        store: DynStore,
        storage: Arc<InMemoryObjectStorage>,
        employer: AuthContext,
        freelancer: AuthContext,
        job_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store: DynStore = Arc::new(InMemoryStore::new());
        let storage = Arc::new(InMemoryObjectStorage::new());
        let employer = AuthContext::new(Uuid::new_v4(), UserRole::Employer, Some("boss@example.com".into()));
        let freelancer = AuthContext::new(Uuid::new_v4(), UserRole::Freelancer, Some("ana@example.com".into()));
        ensure_caller(&store, &employer).await.unwrap();
        let job = store
            .insert_job(NewJob {
                employer_id: employer.user_id,
                title: "Build API".into(),
                description: "Axum service".into(),
                budget_min: None,
                budget_max: None,
                location: None,
                job_type: None,
                experience_level: None,
                skills_required: vec![],
            })
            .await
            .unwrap();
        let svc = ApplicationService::new(
            store.clone(),
            storage.clone(),
            UrlSigner::new("secret", "http://localhost:8080"),
        );
        Fixture { svc, store, storage, employer, freelancer, job_id: job.id }
    }

    fn form() -> SubmitApplicationPayload {
        SubmitApplicationPayload {
            name: "Ana Lima".into(),
            email: "ana@example.com".into(),
            phone: "555-123-4567".into(),
            cover_letter: "I have built several Axum services.".into(),
            proposed_rate: Some(Decimal::new(40, 0)),
        }
    }

    fn pdf() -> ResumeUpload {
        ResumeUpload {
            filename: "CV.PDF".into(),
            data: Bytes::from_static(b"%PDF-1.7 resume"),
        }
    }

    #[test]
    fn resume_rules() {
        assert_eq!(validate_resume(&pdf()).unwrap(), "pdf");

        let fake_pdf = ResumeUpload { filename: "cv.pdf".into(), data: Bytes::from_static(b"hello") };
        assert!(matches!(validate_resume(&fake_pdf), Err(Error::BadRequest(_))));

        let exe = ResumeUpload { filename: "cv.exe".into(), data: Bytes::from_static(b"MZ") };
        assert!(matches!(validate_resume(&exe), Err(Error::BadRequest(_))));

        let big = ResumeUpload {
            filename: "cv.txt".into(),
            data: Bytes::from(vec![b'a'; MAX_RESUME_BYTES + 1]),
        };
        assert!(matches!(validate_resume(&big), Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn submit_stores_resume_under_owner_key() {
        let f = fixture().await;
        let app = f
            .svc
            .submit_application(&f.freelancer, f.job_id, form(), Some(pdf()))
            .await
            .unwrap();

        let key = app.resume_key.clone().unwrap();
        assert!(key.starts_with(&format!("{}/{}/", f.freelancer.user_id, f.job_id)));
        assert!(key.ends_with(".pdf"));
        assert_eq!(f.storage.keys().await, vec![key]);
    }

    #[tokio::test]
    async fn duplicate_and_closed_job_are_rejected() {
        let f = fixture().await;
        f.svc
            .submit_application(&f.freelancer, f.job_id, form(), None)
            .await
            .unwrap();
        assert!(matches!(
            f.svc.submit_application(&f.freelancer, f.job_id, form(), None).await,
            Err(Error::Conflict(_))
        ));

        f.store.set_job_status(f.job_id, JobStatus::Closed).await.unwrap();
        let other = AuthContext::new(Uuid::new_v4(), UserRole::Freelancer, Some("bo@example.com".into()));
        assert!(matches!(
            f.svc.submit_application(&other, f.job_id, form(), None).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn employers_cannot_apply() {
        let f = fixture().await;
        assert!(matches!(
            f.svc.submit_application(&f.employer, f.job_id, form(), None).await,
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn resume_link_is_limited_to_the_two_parties() {
        let f = fixture().await;
        let app = f
            .svc
            .submit_application(&f.freelancer, f.job_id, form(), Some(pdf()))
            .await
            .unwrap();

        assert!(f.svc.resume_link(&f.employer, app.id).await.is_ok());
        assert!(f.svc.resume_link(&f.freelancer, app.id).await.is_ok());

        let stranger = AuthContext::new(Uuid::new_v4(), UserRole::Employer, None);
        assert!(matches!(
            f.svc.resume_link(&stranger, app.id).await,
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn resume_link_without_resume_is_not_found() {
        let f = fixture().await;
        let app = f
            .svc
            .submit_application(&f.freelancer, f.job_id, form(), None)
            .await
            .unwrap();
        assert!(matches!(
            f.svc.resume_link(&f.employer, app.id).await,
            Err(Error::NotFound(_))
        ));
    }

    /// Storage that lets a competing submission land while the resume uploads.
    struct RacingStorage {
        inner: Arc<InMemoryObjectStorage>,
        store: DynStore,
        job_id: Uuid,
        freelancer_id: Uuid,
    }

    #[async_trait::async_trait]
    impl ObjectStorage for RacingStorage {
        async fn put(&self, key: &str, data: Bytes) -> Result<()> {
            self.store
                .insert_application(NewApplication {
                    job_id: self.job_id,
                    freelancer_id: self.freelancer_id,
                    cover_letter: "Submitted from another tab first.".into(),
                    proposed_rate: None,
                    phone_number: "555-123-4567".into(),
                    resume_key: None,
                })
                .await?;
            self.inner.put(key, data).await
        }

        async fn open(&self, key: &str) -> Result<ObjectBody> {
            self.inner.open(key).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn failed_insert_removes_the_uploaded_resume() {
        let f = fixture().await;
        let racing = RacingStorage {
            inner: f.storage.clone(),
            store: f.store.clone(),
            job_id: f.job_id,
            freelancer_id: f.freelancer.user_id,
        };
        let svc = ApplicationService::new(
            f.store.clone(),
            Arc::new(racing),
            UrlSigner::new("secret", "http://localhost:8080"),
        );

        let result = svc
            .submit_application(&f.freelancer, f.job_id, form(), Some(pdf()))
            .await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert!(f.storage.keys().await.is_empty());
    }
}
