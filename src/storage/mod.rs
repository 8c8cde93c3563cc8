//! Resume object storage and time-limited signed download links.

pub mod local;
pub mod memory;

pub use local::LocalObjectStorage;
pub use memory::InMemoryObjectStorage;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use futures::Stream;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Route prefix under which signed resume downloads are served.
pub const RESUME_ROUTE_PREFIX: &str = "/files/resumes";

/// How long a resume link stays valid.
pub const RESUME_LINK_TTL: Duration = Duration::from_secs(60);

pub type ObjectBody = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Streams the object back; `Error::NotFound` when the key is unknown.
    async fn open(&self, key: &str) -> Result<ObjectBody>;

    /// Removes the object; deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

pub type DynStorage = Arc<dyn ObjectStorage>;

/// Rejects keys that could escape the storage root.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(Error::BadRequest("Invalid storage key".into()));
    }
    Ok(())
}

pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain; charset=utf-8",
        "rtf" => "application/rtf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Produces and checks HMAC-SHA256 signatures over `"{key}:{expires}"`.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Arc<[u8]>,
    base_url: String,
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn signature(&self, key: &str, expires: i64) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Internal(format!("Invalid signing key: {}", e)))?;
        mac.update(key.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    pub fn sign(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<SignedUrl> {
        validate_key(key)?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Internal(format!("Invalid link lifetime: {}", e)))?;
        let expires_at = now + ttl;
        let expires = expires_at.timestamp();
        let signature = hex::encode(self.signature(key, expires)?);

        let mut url = url::Url::parse(&format!("{}{}/{}", self.base_url, RESUME_ROUTE_PREFIX, key))
            .map_err(|e| Error::Internal(format!("Invalid public base URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);

        let expires_at = Utc
            .timestamp_opt(expires, 0)
            .single()
            .unwrap_or(expires_at);
        Ok(SignedUrl {
            url: url.to_string(),
            expires_at,
        })
    }

    pub fn verify(&self, key: &str, expires: i64, signature: &str, now: DateTime<Utc>) -> Result<()> {
        validate_key(key)?;
        if now.timestamp() > expires {
            return Err(Error::Forbidden("Link has expired".into()));
        }
        let provided = hex::decode(signature)
            .map_err(|_| Error::Forbidden("Invalid signature".into()))?;
        let expected = self.signature(key, expires)?;
        if expected.ct_eq(&provided).into() {
            Ok(())
        } else {
            Err(Error::Forbidden("Invalid signature".into()))
        }
    }
}
