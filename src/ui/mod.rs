//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, Write};

use anyhow::Result;

use crate::domain::{Environment, Platform};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_build_statuses, display_error, display_release_preview,
    display_status, display_success, display_triggered_build,
};

fn read_line() -> Result<String> {
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Parse a 1-based menu selection; empty input selects the first entry.
pub fn parse_selection(input: &str, len: usize) -> Option<usize> {
    let index = if input.is_empty() {
        1
    } else {
        input.parse::<usize>().ok()?
    };

    (index > 0 && index <= len).then(|| index - 1)
}

/// Parse a comma separated list of 1-based selections; empty selects all.
pub fn parse_multi_selection(input: &str, len: usize) -> Option<Vec<usize>> {
    if input.is_empty() {
        return Some((0..len).collect());
    }

    let mut selected = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index = part.parse::<usize>().ok()?;
        if index == 0 || index > len {
            return None;
        }
        if !selected.contains(&(index - 1)) {
            selected.push(index - 1);
        }
    }

    (!selected.is_empty()).then_some(selected)
}

/// Prompts user to pick the environment to release.
///
/// Default selection is staging if user presses Enter.
pub fn select_environment() -> Result<Environment> {
    println!("\n{}", console::style("Which environment?").bold());
    for (i, env) in Environment::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, env);
    }
    print!("\nSelect an environment (1-{}) [default: 1]: ", Environment::ALL.len());

    let input = read_line()?;
    parse_selection(&input, Environment::ALL.len())
        .map(|index| Environment::ALL[index])
        .ok_or_else(|| anyhow::anyhow!("Invalid selection"))
}

/// Prompts user to pick the platforms to build.
///
/// Accepts a comma separated list; Enter selects every platform.
pub fn select_platforms() -> Result<Vec<Platform>> {
    println!("\n{}", console::style("Which platform(s) to build?").bold());
    for (i, platform) in Platform::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, platform.label());
    }
    print!("\nSelect platforms (e.g. 1,2) [default: all]: ");

    let input = read_line()?;
    parse_multi_selection(&input, Platform::ALL.len())
        .map(|indexes| indexes.into_iter().map(|i| Platform::ALL[i]).collect())
        .ok_or_else(|| anyhow::anyhow!("Invalid platform selection"))
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive). Default is "no".
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);

    let response = read_line()?.to_lowercase();
    Ok(response == "y" || response == "yes")
}
