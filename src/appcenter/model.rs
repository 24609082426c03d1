use crate::domain::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an AppCenter build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStatus {
    NotStarted,
    InProgress,
    Cancelling,
    Completed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildStatus::NotStarted => "not started",
            BuildStatus::InProgress => "in progress",
            BuildStatus::Cancelling => "cancelling",
            BuildStatus::Completed => "completed",
            BuildStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Build resource as returned by the API; unknown fields are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u64,
    pub status: BuildStatus,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub source_branch: Option<String>,
}

/// A build queued for one platform
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredBuild {
    pub platform: Platform,
    pub app: String,
    pub build: Build,
    /// Web page of the build
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    /// No build status could be read; builds keep running remotely
    StatusUnavailable,
}

#[derive(Debug, Serialize)]
pub(crate) struct DistributionGroupRequest<'a> {
    pub name: &'a str,
    pub is_public: bool,
}
