//! Job status domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a RayJob as reported by the KubeRay operator
///
/// The vocabulary is open: any status string the operator reports that is not
/// one of the known values is kept verbatim in `Other`. Only `Succeeded`,
/// `Failed` and `Stopped` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Stopped,
    Unknown,
    Other(String),
}

impl JobStatus {
    /// Statuses from which a job never transitions again
    pub const TERMINAL: [JobStatus; 3] = [JobStatus::Succeeded, JobStatus::Failed, JobStatus::Stopped];

    /// Classifies the status field of a source entry, defaulting to `Unknown`
    /// when the field is absent or blank.
    pub fn from_source(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if !s.trim().is_empty() => Self::parse(s),
            _ => Self::Unknown,
        }
    }

    /// Parses a status string
    ///
    /// Only the exact operator spellings map to known variants; anything else,
    /// including other casings or padded values, is kept as written.
    pub fn parse(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "STOPPED" => Self::Stopped,
            "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Stopped)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_set() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Stopped.is_terminal());

        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_unrecognised_status_is_not_terminal() {
        let status = JobStatus::parse("COMPLETED");
        assert_eq!(status, JobStatus::Other("COMPLETED".to_string()));
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_from_source_defaults_to_unknown() {
        assert_eq!(JobStatus::from_source(None), JobStatus::Unknown);
        assert_eq!(JobStatus::from_source(Some("  ")), JobStatus::Unknown);
        assert_eq!(JobStatus::from_source(Some("RUNNING")), JobStatus::Running);
    }

    #[test]
    fn test_only_exact_spellings_are_terminal() {
        for raw in ["succeeded", "Failed", " FAILED ", "STOPPED\n"] {
            let status = JobStatus::from_source(Some(raw));
            assert_eq!(status, JobStatus::Other(raw.to_string()));
            assert!(!status.is_terminal(), "{:?} must not be terminal", raw);
        }
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&JobStatus::Stopped).unwrap();
        assert_eq!(json, "\"STOPPED\"");

        let parsed: JobStatus = serde_json::from_str("\"Initializing\"").unwrap();
        assert_eq!(parsed.as_str(), "Initializing");
    }
}
