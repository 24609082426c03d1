use crate::error::{ReleaseError, Result};
use std::fmt;

/// Release version as `major.minor.patch`.
///
/// `major` keeps the exact text of the previous tag (a `v` prefix survives),
/// while `minor` and `patch` are numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub major: String,
    pub minor: u64,
    pub patch: u64,
}

impl ReleaseVersion {
    /// Parse the major and minor components of a tag.
    ///
    /// The patch component, if any, is not read: every release recomputes it.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parts = tag.trim().split('.');
        let major = parts.next().unwrap_or_default();
        let minor = parts.next().ok_or_else(|| {
            ReleaseError::malformed_version(tag, "expected at least major.minor")
        })?;

        let minor = minor.parse::<u64>().map_err(|_| {
            ReleaseError::malformed_version(tag, format!("minor '{}' is not a number", minor))
        })?;

        Ok(ReleaseVersion {
            major: major.to_string(),
            minor,
            patch: 0,
        })
    }

    /// Next release: one more minor, patch set to the number of changes shipped.
    pub fn next(&self, fixes_count: usize, features_count: usize) -> Result<Self> {
        let minor = self
            .minor
            .checked_add(1)
            .ok_or_else(|| ReleaseError::malformed_version(self.to_string(), "minor overflows"))?;

        Ok(ReleaseVersion {
            major: self.major.clone(),
            minor,
            patch: (fixes_count + features_count) as u64,
        })
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Derive the version following `current_version`.
///
/// ```
/// use rn_publish::domain::version::derive_next_version;
///
/// assert_eq!(derive_next_version("1.2.3", 2, 3).unwrap(), "1.3.5");
/// assert_eq!(derive_next_version("1.9.0", 0, 0).unwrap(), "1.10.0");
/// ```
pub fn derive_next_version(
    current_version: &str,
    fixes_count: usize,
    features_count: usize,
) -> Result<String> {
    let current = ReleaseVersion::parse(current_version)?;
    Ok(current.next(fixes_count, features_count)?.to_string())
}
