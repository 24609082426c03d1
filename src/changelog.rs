//! Markdown changelog rendering and the `CHANGELOG.md` file.

use crate::error::Result;
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::Path;

/// Default changelog location, relative to the project root
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Longest changelog accepted as a publish commit body
pub const MAX_PUBLISH_MESSAGE_LEN: usize = 3000;

/// Render the changelog section of one release.
///
/// Lines are emitted exactly as produced by [`crate::domain::classify`];
/// an empty bucket produces no heading.
pub fn render(features: &[String], fixes: &[String], new_version: &str, date: NaiveDate) -> String {
    let mut changelog = format!("# Version {} ({})\n\n", new_version, date.format("%Y-%m-%d"));

    if !features.is_empty() {
        changelog.push_str("## Features\n");
        features.iter().for_each(|line| changelog.push_str(line));
        changelog.push('\n');
    }

    if !fixes.is_empty() {
        changelog.push_str("## Fixes\n");
        fixes.iter().for_each(|line| changelog.push_str(line));
        changelog.push('\n');
    }

    changelog
}

/// [`render`] dated with the current UTC day
pub fn render_today(features: &[String], fixes: &[String], new_version: &str) -> String {
    render(features, fixes, new_version, Utc::now().date_naive())
}

/// Put `section` on top of the changelog file, creating it if needed.
pub fn prepend_to_file(path: &Path, section: &str) -> Result<()> {
    let current = if path.exists() {
        fs::read_to_string(path)?
    } else {
        tracing::info!(path = %path.display(), "no changelog file found, creating one");
        String::new()
    };

    fs::write(path, format!("{}{}", section, current))?;
    Ok(())
}

/// Pick the body of the publish commit.
///
/// Changelogs longer than [`MAX_PUBLISH_MESSAGE_LEN`] are replaced by the
/// one `shorter` builds, typically covering only the commits since the
/// previous publish.
pub fn publish_message_body<F>(changelog: &str, shorter: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    if changelog.len() > MAX_PUBLISH_MESSAGE_LEN {
        tracing::debug!(
            len = changelog.len(),
            "changelog too long for a commit message, using changes since last publish"
        );
        return shorter();
    }

    Ok(changelog.to_string())
}
