//! Domain logic - pure release rules independent of git and the build service

pub mod commit;
pub mod environment;
pub mod version;

pub use commit::{classify, ClassifiedCommits, CommitKind, CommitPrefixes, CommitRecord, COMMIT_DELIMITER};
pub use environment::{Environment, Platform};
pub use version::{derive_next_version, ReleaseVersion};
