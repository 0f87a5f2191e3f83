// crates/types/src/job.rs
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend lifecycle state for a summarization job.
///
/// The backend is the only authority on this value; the client never infers
/// it locally. Distinct from the client-side session phase, which tracks what
/// the *client* is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states end polling; no further backend transitions expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /get-presigned-url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRequest {
    pub key_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<BTreeMap<String, serde_json::Value>>,
}

impl PresignedUrlRequest {
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            meta_data: None,
        }
    }

    pub fn with_metadata(mut self, meta: BTreeMap<String, serde_json::Value>) -> Self {
        self.meta_data = Some(meta);
        self
    }
}

/// Response from `POST /get-presigned-url`.
///
/// `key_name` is the authoritative object key: the backend may normalize the
/// requested name (observed form `<uuid>_<original>`), and every later call
/// must reference the normalized value, not the one the client sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlResponse {
    pub url: String,
    pub key_name: String,
}

/// Response from `POST /send-summary-request`.
///
/// The backend emits `job_id` in snake case, unlike the rest of its surface,
/// so this struct carries no blanket rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRegistration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub job_id: String,
    pub status: JobStatus,
}

/// One row from `GET /result?jobId=<id>`.
///
/// Everything but `status` is tolerated as absent: the row is assembled from
/// a loose backend hash and fields appear as the job progresses. The status
/// writer fills `summary_result` and `error_message` with `""` until it has
/// real values; deserialization folds empty strings to `None`.
/// `summary_result`, when present, is the double-encoded payload the decoder
/// unwraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub status: JobStatus,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary_result: Option<String>,
}

impl JobRecord {
    /// `created_at` arrives as epoch milliseconds rendered as a string.
    pub fn created_at_millis(&self) -> Option<i64> {
        self.created_at.as_deref()?.trim().parse().ok()
    }
}

/// Accepts a missing key, a JSON null, `""`, or a value; only a non-empty
/// value survives as `Some`.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
