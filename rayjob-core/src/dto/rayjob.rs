//! RayJob custom resource DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::JobStatus;

/// Response body of a `rayjobs` list call
///
/// Items are kept as raw JSON so a single malformed resource can be skipped
/// without failing the whole list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RayJobList {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

/// A RayJob resource as returned by the KubeRay API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayJob {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: RayJobStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Status block of a RayJob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayJobStatus {
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: Option<String>,
    /// Address (`host:port`) of the Ray dashboard serving this job
    #[serde(default, rename = "dashboardURL", deserialize_with = "lenient_string")]
    pub dashboard_url: Option<String>,
    /// Ray-side submission id of the job
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_id: Option<String>,
}

/// Reads a string field, treating a value of any other JSON type as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl RayJob {
    /// Builds a RayJob from one raw list item
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Resource name, if present and non-blank
    pub fn name(&self) -> Option<&str> {
        self.metadata
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn job_status(&self) -> JobStatus {
        JobStatus::from_source(self.status.job_status.as_deref())
    }
}

impl RayJobStatus {
    /// Routing data needed to fetch logs: `(dashboard_url, job_id)`
    pub fn log_route(&self) -> Option<(&str, &str)> {
        let dashboard_url = self.dashboard_url.as_deref().filter(|s| !s.trim().is_empty())?;
        let job_id = self.job_id.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((dashboard_url, job_id))
    }
}

/// Parses a Kubernetes timestamp (RFC 3339) into UTC
///
/// Returns `None` for values that do not parse.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
