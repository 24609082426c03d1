//! Git operations abstraction layer
//!
//! The release flows only talk to version control through the [Repository]
//! trait, so they can run against a real checkout or an in-memory double.
//!
//! - [repository::Git2Repository]: real implementation. History queries go
//!   through `git2`; working tree and network operations (checkout, pull,
//!   push, commit) go through the system `git` binary so the user's
//!   credentials and hooks apply.
//! - [mock::MockRepository]: records every mutating call, for tests.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Remote every branch and tag is pushed to
pub const DEFAULT_REMOTE: &str = "origin";

/// Version control operations needed by the release flows.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// `git2` failures to [crate::error::ReleaseError::Git] and failed `git`
/// invocations to [crate::error::ReleaseError::Command].
pub trait Repository: Send {
    /// Switch the working tree to an existing local or remote-tracking branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create `branch` from the current HEAD and switch to it
    fn create_branch(&self, branch: &str) -> Result<()>;

    /// Pull the upstream of the current branch
    fn pull(&self) -> Result<()>;

    /// Merge `remote`/`branch` into the current branch
    fn pull_from(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push the current branch to its upstream
    fn push(&self) -> Result<()>;

    /// Push `branch` to `remote` and set it as upstream
    fn push_upstream(&self, remote: &str, branch: &str) -> Result<()>;

    /// Whether `branch` exists on `remote`
    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool>;

    /// Most recent tag reachable from HEAD, `None` when there is none
    fn latest_tag(&self) -> Result<Option<String>>;

    /// History of HEAD, newest first, in the classifier's input format.
    ///
    /// Each commit is written as `"{message}\n{hash}{delimiter}\n"`. When
    /// `since` is given, commits reachable from it are excluded.
    fn commit_log(&self, since: Option<&str>, delimiter: &str) -> Result<String>;

    /// Hash of the newest commit whose message contains `needle`
    fn last_commit_matching(&self, needle: &str) -> Result<Option<String>>;

    /// Full message of the HEAD commit
    fn last_commit_message(&self) -> Result<String>;

    /// Stage every change and commit it
    fn commit_all(&self, subject: &str, body: Option<&str>, allow_empty: bool) -> Result<()>;

    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create an annotated tag on HEAD
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;
}
