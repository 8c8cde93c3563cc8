use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ApplicationStore, JobStore, NotificationStore, ProfileStore};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationFilter, EmployerApplicationRow, FreelancerApplicationRow,
    NewApplication, ReviewUpdate,
};
use crate::models::job::{ApplicationCounts, Job, JobFilter, JobStatus, JobWithEmployer, NewJob, Page};
use crate::models::notification::{NewNotification, Notification};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate};

const JOB_COLUMNS: &str = "j.id, j.employer_id, j.title, j.description, j.budget_min, j.budget_max, \
     j.location, j.job_type, j.experience_level, j.skills_required, j.status, j.created_at";

const APPLICATION_COLUMNS: &str = "a.id, a.job_id, a.freelancer_id, a.status, a.cover_letter, \
     a.proposed_rate, a.phone_number, a.resume_key, a.interview_date, a.interview_time, \
     a.interview_notes, a.created_at, a.updated_at";

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, type, read, related_application_id, created_at";

const PROFILE_COLUMNS: &str =
    "id, role, full_name, email, bio, location, hourly_rate, skills, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ILIKE` pattern matching `term` as a literal substring.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_job_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    qb.push(" WHERE j.status = 'open'");
    if let Some(search) = filter.search.as_deref() {
        let pattern = contains_pattern(search);
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(j.skills_required) AS skill WHERE skill ILIKE ")
            .push_bind(pattern)
            .push("))");
    }
    if let Some(job_type) = filter.job_type.clone() {
        qb.push(" AND j.job_type = ").push_bind(job_type);
    }
    if let Some(level) = filter.experience_level.clone() {
        qb.push(" AND j.experience_level = ").push_bind(level);
    }
    if let Some(min) = filter.budget_min {
        qb.push(" AND j.budget_min >= ").push_bind(min);
    }
    if let Some(max) = filter.budget_max {
        qb.push(" AND j.budget_max <= ").push_bind(max);
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let sql = format!(
            r#"
            INSERT INTO jobs AS j (
                employer_id, title, description, budget_min, budget_max,
                location, job_type, experience_level, skills_required, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'open')
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(job.employer_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.budget_min)
            .bind(job.budget_max)
            .bind(&job.location)
            .bind(&job.job_type)
            .bind(&job.experience_level)
            .bind(&job.skills_required)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = $1");
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_open_jobs(&self, filter: &JobFilter, page: Page) -> Result<(Vec<JobWithEmployer>, i64)> {
        let mut items_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {JOB_COLUMNS}, p.full_name AS employer_name \
             FROM jobs j LEFT JOIN profiles p ON p.id = j.employer_id"
        ));
        push_job_filters(&mut items_query, filter);
        items_query
            .push(" ORDER BY j.created_at DESC LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let items = items_query
            .build_query_as::<JobWithEmployer>()
            .fetch_all(&self.pool)
            .await?;

        let mut total_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs j");
        push_job_filters(&mut total_query, filter);
        let total = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn list_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs j WHERE j.employer_id = $1 ORDER BY j.created_at DESC"
        );
        let rows = sqlx::query_as::<_, Job>(&sql)
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn application_counts(&self, job_ids: &[Uuid]) -> Result<Vec<ApplicationCounts>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ApplicationCounts>(
            r#"
            SELECT
                job_id,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'shortlisted') AS shortlisted,
                COUNT(*) FILTER (WHERE status = 'accepted') AS accepted,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM job_applications
            WHERE job_id = ANY($1)
            GROUP BY job_id
            "#,
        )
        .bind(job_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_job_status(&self, id: Uuid, status: JobStatus) -> Result<Job> {
        let sql = format!("UPDATE jobs AS j SET status = $1 WHERE j.id = $2 RETURNING {JOB_COLUMNS}");
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(status)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let sql = format!(
            r#"
            INSERT INTO job_applications AS a (
                job_id, freelancer_id, status, cover_letter, proposed_rate, phone_number, resume_key
            ) VALUES ($1, $2, 'pending', $3, $4, $5, $6)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(application.job_id)
            .bind(application.freelancer_id)
            .bind(&application.cover_letter)
            .bind(application.proposed_rate)
            .bind(&application.phone_number)
            .bind(&application.resume_key)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM job_applications a WHERE a.id = $1");
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_application(&self, job_id: Uuid, freelancer_id: Uuid) -> Result<Option<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications a \
             WHERE a.job_id = $1 AND a.freelancer_id = $2"
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(job_id)
            .bind(freelancer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_review(&self, id: Uuid, update: &ReviewUpdate) -> Result<Application> {
        let interview = update.interview.as_ref();
        let sql = format!(
            r#"
            UPDATE job_applications AS a
            SET status = $2,
                interview_date = $3,
                interview_time = $4,
                interview_notes = $5,
                updated_at = NOW()
            WHERE a.id = $1 AND a.status = $6
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .bind(update.status)
            .bind(interview.map(|i| i.date))
            .bind(interview.map(|i| i.time))
            .bind(interview.and_then(|i| i.notes.clone()))
            .bind(update.expected)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| Error::Conflict("Application status changed concurrently; reload and retry".into()))
    }

    async fn list_for_employer(
        &self,
        employer_id: Uuid,
        filter: &ApplicationFilter,
    ) -> Result<Vec<EmployerApplicationRow>> {
        let sql = format!(
            r#"
            SELECT {APPLICATION_COLUMNS},
                   p.full_name AS freelancer_name,
                   p.email AS freelancer_email,
                   j.title AS job_title
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN profiles p ON p.id = a.freelancer_id
            WHERE j.employer_id = $1
              AND ($2::uuid IS NULL OR a.job_id = $2)
              AND ($3::application_status IS NULL OR a.status = $3)
            ORDER BY a.created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, EmployerApplicationRow>(&sql)
            .bind(employer_id)
            .bind(filter.job_id)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_for_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<FreelancerApplicationRow>> {
        let sql = format!(
            r#"
            SELECT {APPLICATION_COLUMNS},
                   j.title AS job_title,
                   j.status AS job_status,
                   j.budget_min AS job_budget_min,
                   j.budget_max AS job_budget_max
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.freelancer_id = $1
            ORDER BY a.created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, FreelancerApplicationRow>(&sql)
            .bind(freelancer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let sql = format!(
            r#"
            INSERT INTO notifications (user_id, title, message, type, related_application_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(notification.user_id)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.kind)
            .bind(notification.related_application_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_recent_notifications(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let sql = format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ensure_profile(&self, profile: NewProfile) -> Result<Profile> {
        sqlx::query(
            "INSERT INTO profiles (id, role, email) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(profile.id)
        .bind(profile.role)
        .bind(&profile.email)
        .execute(&self.pool)
        .await?;

        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(profile.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Profile> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET full_name = $2,
                bio = $3,
                location = $4,
                hourly_rate = $5,
                skills = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(&update.full_name)
            .bind(&update.bio)
            .bind(&update.location)
            .bind(update.hourly_rate)
            .bind(&update.skills)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_freelancers(&self, search: Option<&str>) -> Result<Vec<Profile>> {
        let pattern = search.map(contains_pattern);
        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles
            WHERE role = 'freelancer'
              AND ($1::text IS NULL
                   OR full_name ILIKE $1
                   OR location ILIKE $1
                   OR bio ILIKE $1
                   OR EXISTS (SELECT 1 FROM unnest(skills) AS skill WHERE skill ILIKE $1))
            ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_escapes_like_wildcards() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("c:\\dir"), "%c:\\\\dir%");
    }
}
