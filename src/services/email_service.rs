//! Transactional email: the `EmailSender` seam, the Resend-backed sender and
//! the message templates used by the review and contact flows.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatus, Interview};
use crate::utils::html::{escape_html, escape_multiline};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    fn name(&self) -> &'static str;
}

pub type DynEmailSender = Arc<dyn EmailSender>;

#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Clone)]
pub struct ResendEmailSender {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: String, api_url: &str, from: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client for email: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            from,
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let payload = ResendPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            reply_to: message.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Resend API error");
            return Err(Error::Email(format!("Failed to send email: {}", body)));
        }

        info!(to = ?message.to, subject = %message.subject, "email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

/// Stand-in used when no API key is configured; writes the message to the log.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = ?message.to,
            subject = %message.subject,
            reply_to = ?message.reply_to,
            "email delivery disabled, message logged only"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

const FOOTER: &str = r#"<hr style="border: none; border-top: 1px solid #e5e7eb; margin: 20px 0;" />
  <p style="color: #6b7280; font-size: 14px;">Best regards,<br>FreelancerWorks Team</p>"#;

fn wrap(body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  {}
  {}
</div>"#,
        body, FOOTER
    )
}

pub fn status_email(
    to: &str,
    job_title: &str,
    status: ApplicationStatus,
    employer_name: Option<&str>,
) -> EmailMessage {
    let title = escape_html(job_title);
    let employer = employer_name
        .map(escape_html)
        .unwrap_or_else(|| "The employer".to_string());

    let (subject, body) = match status {
        ApplicationStatus::Accepted => (
            format!("🎉 Congratulations! Your application for \"{}\" has been accepted", job_title),
            format!(
                r#"<h1 style="color: #10b981;">Great News! 🎉</h1>
  <p>Your application for <strong>"{title}"</strong> has been <strong style="color: #10b981;">accepted</strong>!</p>
  <p>{employer} was impressed with your profile and would like to work with you.</p>
  <p>Log in to your dashboard to view the details and get started.</p>"#
            ),
        ),
        ApplicationStatus::Rejected => (
            format!("Application Update for \"{}\"", job_title),
            format!(
                r#"<h1 style="color: #6b7280;">Application Update</h1>
  <p>We wanted to let you know that your application for <strong>"{title}"</strong> was not selected this time.</p>
  <p>Don't be discouraged! There are many other opportunities waiting for you on FreelancerWorks.</p>"#
            ),
        ),
        other => (
            format!("Application Status Update for \"{}\"", job_title),
            format!(
                r#"<h1>Application Update</h1>
  <p>Your application status for <strong>"{title}"</strong> has been updated to: <strong>{}</strong></p>
  <p>Log in to your dashboard for more details.</p>"#,
                other.as_str()
            ),
        ),
    };

    EmailMessage {
        to: vec![to.to_string()],
        subject,
        html: wrap(&body),
        reply_to: None,
    }
}

pub fn interview_email(
    to: &str,
    freelancer_name: &str,
    job_title: &str,
    employer_name: Option<&str>,
    interview: &Interview,
) -> EmailMessage {
    let employer = employer_name
        .map(escape_html)
        .unwrap_or_else(|| "The employer".to_string());
    let notes = interview
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| {
            format!(
                r#"<p style="margin: 16px 0 0 0;"><strong>Notes:</strong><br><span style="color: #6b7280;">{}</span></p>"#,
                escape_multiline(n)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h1 style="color: #10b981;">Interview Scheduled!</h1>
  <p>Hi {name},</p>
  <p>Great news! {employer} has scheduled an interview with you for the position of <strong>{title}</strong>.</p>
  <div style="background: #f0fdf4; border: 1px solid #bbf7d0; border-radius: 8px; padding: 24px;">
    <h2 style="color: #166534; margin: 0 0 16px 0; font-size: 18px;">Interview Details</h2>
    <p><strong>Date:</strong> {date}</p>
    <p><strong>Time:</strong> {time}</p>
    {notes}
  </div>
  <p style="font-size: 14px; color: #6b7280;">Please make sure to be available at the scheduled time. If you need to reschedule, please contact the employer directly.</p>
  <p>Good luck with your interview!</p>"#,
        name = escape_html(freelancer_name),
        employer = employer,
        title = escape_html(job_title),
        date = interview.date.format("%A, %B %-d, %Y"),
        time = interview.time.format("%H:%M"),
        notes = notes,
    );

    EmailMessage {
        to: vec![to.to_string()],
        subject: format!("Interview Scheduled for {}", job_title),
        html: wrap(&body),
        reply_to: None,
    }
}

pub fn contact_email(to: &str, sender_name: &str, sender_email: &str, message: &str) -> EmailMessage {
    let sender = escape_html(sender_name);
    let sender_email_html = escape_html(sender_email);
    let body = format!(
        r#"<h1 style="color: #333; border-bottom: 2px solid #10b981; padding-bottom: 10px;">New Message from FreelancerWorks</h1>
  <div style="background-color: #f9fafb; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <p style="margin: 0 0 10px 0;"><strong>From:</strong> {sender}</p>
    <p style="margin: 0;"><strong>Email:</strong> {sender_email_html}</p>
  </div>
  <h2 style="color: #374151; font-size: 16px;">Message:</h2>
  <div style="padding: 20px; border: 1px solid #e5e7eb; border-radius: 8px; line-height: 1.6;">{message}</div>
  <p style="color: #6b7280; font-size: 14px;">This message was sent via FreelancerWorks. To reply, respond directly to this email or contact the sender at {sender_email_html}.</p>"#,
        message = escape_multiline(message),
    );

    EmailMessage {
        to: vec![to.to_string()],
        subject: format!("New message from {} via FreelancerWorks", sender_name),
        html: wrap(&body),
        reply_to: Some(sender_email.to_string()),
    }
}

/// Picks the Resend sender when an API key is configured, the logging one otherwise.
pub fn sender_from_config(config: &crate::config::Config) -> Result<DynEmailSender> {
    match config.resend_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            info!("email delivery enabled via Resend");
            Ok(Arc::new(ResendEmailSender::new(
                key.to_string(),
                &config.resend_api_url,
                config.email_from.clone(),
            )?))
        }
        None => {
            info!("email delivery disabled (RESEND_API_KEY not set)");
            Ok(Arc::new(LogEmailSender))
        }
    }
}
