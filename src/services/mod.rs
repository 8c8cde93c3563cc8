pub mod application_service;
pub mod email_service;
pub mod job_service;
pub mod notification_service;
pub mod profile_service;
pub mod review_service;
