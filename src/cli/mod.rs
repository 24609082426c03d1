//! Workflow layer between the command line and the library

pub mod orchestration;

pub use orchestration::{
    manage_git_branches, manage_git_flow, plan_release, ReleaseOptions, ReleaseOutcome, ReleasePlan,
};
