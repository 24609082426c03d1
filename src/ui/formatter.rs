//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::appcenter::{BuildStatus, TriggeredBuild};
use crate::boundary::BoundaryWarning;
use crate::domain::Platform;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("X ERROR -").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a step of the release in bold.
pub fn display_status(message: &str) {
    println!("{}", style(format!("▸ {}", message)).bold());
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Show the version about to be released and its changelog section.
pub fn display_release_preview(previous: &str, next: &str, changelog: &str) {
    println!("\n{}", style("Next release:").bold());
    println!("  From: {}", style(previous).red());
    println!("  To:   {}", style(next).green());
    println!("\n{}", changelog.trim_end());
}

/// Display the web link of a freshly triggered build.
pub fn display_triggered_build(build: &TriggeredBuild) {
    display_success(&format!(
        "The {} branch is building: {}",
        build.platform.label(),
        style(&build.url).cyan()
    ));
}

/// Format one round of build statuses.
///
/// A `None` status means the poll for that platform failed.
pub fn format_build_statuses(statuses: &[(Platform, Option<BuildStatus>)]) -> String {
    statuses
        .iter()
        .map(|(platform, status)| match status {
            Some(status) => format!("▸ Build {} : {}", platform.label(), status),
            None => format!("▸ Build {} : status unavailable", platform.label()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn display_build_statuses(statuses: &[(Platform, Option<BuildStatus>)]) {
    println!("{}", style("AppCenter is building your app...").bold());
    println!("{}", format_build_statuses(statuses));
    println!("You can terminate this process, this will not affect the build process.");
}
