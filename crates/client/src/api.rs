// crates/client/src/api.rs
//! Thin REST client for the backend surface: presigned-URL acquisition,
//! the direct storage PUT, job registration, and status lookup.

use std::time::Duration;

use reqwest::{header, StatusCode};
use tracing::debug;

use podsum_types::{JobRecord, JobRegistration, PresignedUrlRequest, PresignedUrlResponse};

use crate::config::ClientConfig;
use crate::error::ApiError;

/// HTTP client for the summarization backend. Cheap to clone; clones share
/// the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ApiError::Client { source })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Step 1: swap a candidate object key for a time-limited write URL.
    /// The key in the response is authoritative; the backend may have
    /// normalized the one we sent.
    pub async fn presigned_url(
        &self,
        request: &PresignedUrlRequest,
    ) -> Result<PresignedUrlResponse, ApiError> {
        let url = format!("{}/get-presigned-url", self.base_url);
        debug!(key = %request.key_name, "requesting presigned url");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| ApiError::request(&url, err))?;
        let response = check_status(&url, response)?;
        response
            .json()
            .await
            .map_err(|err| ApiError::body(&url, err))
    }

    /// Step 2: direct PUT of the file bytes to storage. Success is any 2xx.
    pub async fn upload_bytes(
        &self,
        url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiError> {
        debug!(bytes = bytes.len(), "uploading artifact");
        let response = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, content_type)
            .timeout(self.upload_timeout)
            .body(bytes)
            .send()
            .await
            .map_err(|err| ApiError::request(url, err))?;
        check_status(url, response).map(|_| ())
    }

    /// Step 3: register the uploaded object for processing, referencing the
    /// normalized key from step 1.
    pub async fn register_job(&self, key_name: &str) -> Result<JobRegistration, ApiError> {
        let url = format!(
            "{}/send-summary-request?file={}",
            self.base_url,
            urlencoding::encode(key_name)
        );
        debug!(key = %key_name, "registering job");
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|err| ApiError::request(&url, err))?;
        let response = check_status(&url, response)?;
        response
            .json()
            .await
            .map_err(|err| ApiError::body(&url, err))
    }

    /// One status check. `Ok(None)` means the backend has no row for this
    /// job id yet, an expected race right after registration.
    pub async fn job_result(&self, job_id: &str) -> Result<Option<JobRecord>, ApiError> {
        let url = format!(
            "{}/result?jobId={}",
            self.base_url,
            urlencoding::encode(job_id)
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ApiError::request(&url, err))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(&url, response)?;
        response
            .json()
            .await
            .map(Some)
            .map_err(|err| ApiError::body(&url, err))
    }
}

fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            url: url.to_string(),
            status,
        })
    }
}
