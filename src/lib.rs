pub mod appcenter;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod env_file;
pub mod error;
pub mod git;
pub mod native;
pub mod ui;

pub use error::{ReleaseError, Result};
