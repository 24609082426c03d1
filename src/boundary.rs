use std::fmt;

/// Non-fatal conditions met while releasing.
/// These are reported to the user and the release carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No tag yet, the configured starting version is used
    NoTagFound { starting_version: String },
    /// No prefixed commit since the latest tag
    NoReleaseNotes { since: String },
    /// A native project folder or file is absent, its version is left alone
    NativeProjectMissing { platform: String, path: String },
    /// HEAD already is the publish commit of this environment
    PublishCommitExists { environment: String },
    /// The release tag is already present
    TagExists { tag: String },
    /// The AppCenter distribution group is already present
    DistributionGroupExists { app: String, group: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoTagFound { starting_version } => {
                write!(f, "No tag found, defaulting to {}", starting_version)
            }
            BoundaryWarning::NoReleaseNotes { since } => {
                write!(f, "No feature or fix commit since {}", since)
            }
            BoundaryWarning::NativeProjectMissing { platform, path } => {
                write!(
                    f,
                    "{} project not found at '{}', version not updated",
                    platform, path
                )
            }
            BoundaryWarning::PublishCommitExists { environment } => {
                write!(
                    f,
                    "Publish commit for {} already exists, skipping step",
                    environment
                )
            }
            BoundaryWarning::TagExists { tag } => {
                write!(f, "Tag {} already exists, skipping step", tag)
            }
            BoundaryWarning::DistributionGroupExists { app, group } => {
                write!(
                    f,
                    "Distribution group {} already exists for {}, skipping",
                    group, app
                )
            }
        }
    }
}
