use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Mock repository for testing without actual git operations.
///
/// Queries answer from canned data; every mutating call is appended to an
/// operation journal readable through [`MockRepository::operations`].
pub struct MockRepository {
    latest_tag: Option<String>,
    logs: HashMap<Option<String>, String>,
    publish_commit: Option<String>,
    remote_branches: HashSet<String>,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    operations: Vec<String>,
    last_message: String,
    tags: HashSet<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            latest_tag: None,
            logs: HashMap::new(),
            publish_commit: None,
            remote_branches: HashSet::new(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Latest tag reported by [`Repository::latest_tag`]; also marks it as existing
    pub fn with_latest_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.lock().tags.insert(tag.clone());
        self.latest_tag = Some(tag);
        self
    }

    /// Log text returned for `commit_log(since, _)`
    pub fn with_log(mut self, since: Option<&str>, log: impl Into<String>) -> Self {
        self.logs.insert(since.map(str::to_string), log.into());
        self
    }

    /// Hash returned when looking up the last publish commit
    pub fn with_publish_commit(mut self, hash: impl Into<String>) -> Self {
        self.publish_commit = Some(hash.into());
        self
    }

    pub fn with_last_message(self, message: impl Into<String>) -> Self {
        self.lock().last_message = message.into();
        self
    }

    pub fn with_remote_branch(mut self, branch: impl Into<String>) -> Self {
        self.remote_branches.insert(branch.into());
        self
    }

    /// Mutating calls made so far, in order
    pub fn operations(&self) -> Vec<String> {
        self.lock().operations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, operation: String) -> Result<()> {
        self.lock().operations.push(operation);
        Ok(())
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {}", branch))
    }

    fn create_branch(&self, branch: &str) -> Result<()> {
        self.record(format!("create-branch {}", branch))
    }

    fn pull(&self) -> Result<()> {
        self.record("pull".to_string())
    }

    fn pull_from(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("pull {} {}", remote, branch))
    }

    fn push(&self) -> Result<()> {
        self.record("push".to_string())
    }

    fn push_upstream(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push -u {} {}", remote, branch))
    }

    fn remote_branch_exists(&self, _remote: &str, branch: &str) -> Result<bool> {
        Ok(self.remote_branches.contains(branch))
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        Ok(self.latest_tag.clone())
    }

    fn commit_log(&self, since: Option<&str>, _delimiter: &str) -> Result<String> {
        Ok(self
            .logs
            .get(&since.map(str::to_string))
            .cloned()
            .unwrap_or_default())
    }

    fn last_commit_matching(&self, _needle: &str) -> Result<Option<String>> {
        Ok(self.publish_commit.clone())
    }

    fn last_commit_message(&self) -> Result<String> {
        Ok(self.lock().last_message.clone())
    }

    fn commit_all(&self, subject: &str, body: Option<&str>, allow_empty: bool) -> Result<()> {
        let mut state = self.lock();
        state.last_message = match body {
            Some(body) => format!("{}\n\n{}", subject, body),
            None => subject.to_string(),
        };
        let flag = if allow_empty { " --allow-empty" } else { "" };
        state.operations.push(format!("commit{} {}", flag, subject));
        Ok(())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.lock().tags.contains(name))
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.tags.insert(name.to_string()) {
            return Err(ReleaseError::command(
                format!("git tag -a {}", name),
                "tag already exists",
            ));
        }
        state.operations.push(format!("tag {} '{}'", name, message));
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        self.record(format!("push {} {}", remote, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_operations_in_order() {
        let repo = MockRepository::new();
        repo.checkout("develop").unwrap();
        repo.pull().unwrap();
        repo.push().unwrap();

        assert_eq!(repo.operations(), vec!["checkout develop", "pull", "push"]);
    }

    #[test]
    fn test_mock_commit_updates_last_message() {
        let repo = MockRepository::new().with_last_message("init");
        repo.commit_all("Publish new staging version 1.1.0", Some("body"), true)
            .unwrap();

        assert_eq!(
            repo.last_commit_message().unwrap(),
            "Publish new staging version 1.1.0\n\nbody"
        );
        assert_eq!(
            repo.operations(),
            vec!["commit --allow-empty Publish new staging version 1.1.0"]
        );
    }

    #[test]
    fn test_mock_tags() {
        let repo = MockRepository::new().with_latest_tag("1.0.0");
        assert!(repo.tag_exists("1.0.0").unwrap());
        assert!(repo.create_annotated_tag("1.0.0", "version 1.0.0").is_err());
        repo.create_annotated_tag("1.1.0", "version 1.1.0").unwrap();
        assert!(repo.tag_exists("1.1.0").unwrap());
    }

    #[test]
    fn test_mock_logs_by_boundary() {
        let repo = MockRepository::new()
            .with_log(Some("1.0.0"), "since tag")
            .with_log(None, "everything");

        assert_eq!(repo.commit_log(Some("1.0.0"), "").unwrap(), "since tag");
        assert_eq!(repo.commit_log(None, "").unwrap(), "everything");
        assert_eq!(repo.commit_log(Some("abc"), "").unwrap(), "");
    }
}
