use crate::error::{ReleaseError, Result};
use git2::{DescribeFormatOptions, DescribeOptions, ErrorClass, ErrorCode, Sort};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Repository backed by `git2` for history and the `git` binary for the rest
pub struct Git2Repository {
    repo: git2::Repository,
    work_tree: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository with a working tree
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        let work_tree = repo
            .workdir()
            .ok_or_else(|| ReleaseError::config("bare repositories are not supported"))?
            .to_path_buf();

        Ok(Git2Repository { repo, work_tree })
    }

    /// Root of the working tree
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Run `git` in the working tree and return its stdout
    fn git(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!(%command, "running git");

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.work_tree)
            .args(args)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::command(command, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn head_walk(&self) -> Result<git2::Revwalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;
        Ok(revwalk)
    }
}

impl super::Repository for Git2Repository {
    fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch]).map(|_| ())
    }

    fn create_branch(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "-b", branch]).map(|_| ())
    }

    fn pull(&self) -> Result<()> {
        self.git(&["pull"]).map(|_| ())
    }

    fn pull_from(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["pull", remote, branch]).map(|_| ())
    }

    fn push(&self) -> Result<()> {
        self.git(&["push"]).map(|_| ())
    }

    fn push_upstream(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["push", "-u", remote, branch]).map(|_| ())
    }

    fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        let heads = self.git(&["ls-remote", "--heads", remote, branch])?;
        Ok(!heads.trim().is_empty())
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        let mut options = DescribeOptions::new();
        options.describe_tags();

        let describe = match self.repo.describe(&options) {
            Ok(describe) => describe,
            Err(e) if e.code() == ErrorCode::NotFound || e.class() == ErrorClass::Describe => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        Ok(Some(describe.format(Some(&format))?))
    }

    fn commit_log(&self, since: Option<&str>, delimiter: &str) -> Result<String> {
        let mut revwalk = self.head_walk()?;

        if let Some(since) = since {
            let boundary = self.repo.revparse_single(since)?.peel_to_commit()?;
            revwalk.hide(boundary.id())?;
        }

        let mut log = String::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let message = commit.message().unwrap_or_default().trim_end();
            log.push_str(&format!("{}\n{}{}\n", message, commit.id(), delimiter));
        }

        Ok(log)
    }

    fn last_commit_matching(&self, needle: &str) -> Result<Option<String>> {
        for oid in self.head_walk()? {
            let commit = self.repo.find_commit(oid?)?;
            if commit.message().is_some_and(|m| m.contains(needle)) {
                return Ok(Some(commit.id().to_string()));
            }
        }

        Ok(None)
    }

    fn last_commit_message(&self) -> Result<String> {
        let head = self.repo.head()?.peel_to_commit()?;
        Ok(head.message().unwrap_or_default().to_string())
    }

    fn commit_all(&self, subject: &str, body: Option<&str>, allow_empty: bool) -> Result<()> {
        self.git(&["add", "."])?;

        let mut args = vec!["commit"];
        if allow_empty {
            args.push("--allow-empty");
        }
        args.extend(["-m", subject]);
        if let Some(body) = body {
            args.extend(["-m", body]);
        }

        self.git(&args).map(|_| ())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .repo
            .find_reference(&format!("refs/tags/{}", name))
            .is_ok())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let tagger = self.repo.signature()?;
        self.repo
            .tag(name, head.as_object(), &tagger, message, false)?;
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        self.git(&["push", remote, name]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::COMMIT_DELIMITER;
    use crate::git::Repository;
    use tempfile::TempDir;

    fn commit(repo: &git2::Repository, message: &str) -> git2::Oid {
        let sig = git2::Signature::now("Release Bot", "bot@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parents: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn fixture() -> (TempDir, git2::Repository) {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_latest_tag_none_without_tags() {
        let (dir, repo) = fixture();
        commit(&repo, "[+] initial\n");

        let git = Git2Repository::open(dir.path()).unwrap();
        assert_eq!(git.latest_tag().unwrap(), None);
    }

    #[test]
    fn test_commit_log_since_tag() {
        let (dir, repo) = fixture();
        let first = commit(&repo, "[+] first\n");
        let target = repo.find_object(first, None).unwrap();
        repo.tag_lightweight("1.0.0", &target, false).unwrap();
        let second = commit(&repo, "[#] second\n");

        let git = Git2Repository::open(dir.path()).unwrap();
        assert_eq!(git.latest_tag().unwrap(), Some("1.0.0".to_string()));

        let log = git.commit_log(Some("1.0.0"), COMMIT_DELIMITER).unwrap();
        assert_eq!(log, format!("[#] second\n{}{}\n", second, COMMIT_DELIMITER));
    }

    #[test]
    fn test_commit_log_without_boundary_is_newest_first() {
        let (dir, repo) = fixture();
        let first = commit(&repo, "one\n");
        let second = commit(&repo, "two\n");

        let git = Git2Repository::open(dir.path()).unwrap();
        let log = git.commit_log(None, COMMIT_DELIMITER).unwrap();
        let second_at = log.find(&second.to_string()).unwrap();
        let first_at = log.find(&first.to_string()).unwrap();
        assert!(second_at < first_at);
    }

    #[test]
    fn test_commit_with_body_classifies_to_one_line() {
        let (dir, repo) = fixture();
        let oid = commit(&repo, "[+] add login\n\nUses OAuth.\nCloses #12\n");

        let git = Git2Repository::open(dir.path()).unwrap();
        let log = git.commit_log(None, COMMIT_DELIMITER).unwrap();
        let classified = crate::domain::classify(
            &log,
            COMMIT_DELIMITER,
            &crate::domain::CommitPrefixes::default(),
            "https://x/commit/",
        );

        let hash = oid.to_string();
        assert_eq!(
            classified.features,
            vec![format!("* add login ([{}](https://x/commit/{}))\n", &hash[..6], hash)]
        );
    }

    #[test]
    fn test_last_commit_matching() {
        let (dir, repo) = fixture();
        let publish = commit(&repo, "Publish new staging version 1.1.0\n");
        commit(&repo, "[+] after publish\n");

        let git = Git2Repository::open(dir.path()).unwrap();
        assert_eq!(
            git.last_commit_matching("Publish").unwrap(),
            Some(publish.to_string())
        );
        assert_eq!(git.last_commit_matching("Nope").unwrap(), None);
        assert_eq!(git.last_commit_message().unwrap(), "[+] after publish\n");
    }

    #[test]
    fn test_annotated_tag() {
        let (dir, repo) = fixture();
        commit(&repo, "init\n");
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Release Bot").unwrap();
        config.set_str("user.email", "bot@example.com").unwrap();

        let git = Git2Repository::open(dir.path()).unwrap();
        assert!(!git.tag_exists("1.1.0").unwrap());
        git.create_annotated_tag("1.1.0", "version 1.1.0").unwrap();
        assert!(git.tag_exists("1.1.0").unwrap());
        assert_eq!(git.latest_tag().unwrap(), Some("1.1.0".to_string()));
    }
}
