use serde::{Deserialize, Serialize};

/// Marker appended after every commit hash in the log fed to [`classify`].
pub const COMMIT_DELIMITER: &str = "----DELIMITER----";

/// Number of hash characters shown in a changelog link label
const SHORT_HASH_LEN: usize = 6;

/// One commit block of the raw log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub message: String,
}

impl CommitRecord {
    /// Parse a single block: the last line is the hash, everything before it
    /// is the message.
    ///
    /// Returns `None` when the block carries no hash, which is what the
    /// trailing segment after the final delimiter looks like.
    pub fn parse(block: &str) -> Option<Self> {
        let block = block.trim_end();
        let (message, hash) = match block.rsplit_once('\n') {
            Some((message, hash)) => (message, hash),
            None => ("", block),
        };

        let hash = hash.trim();
        if hash.is_empty() {
            return None;
        }

        Some(CommitRecord {
            hash: hash.to_string(),
            message: message.trim().to_string(),
        })
    }

    /// First characters of the hash, clamped for short hashes
    pub fn short_hash(&self) -> String {
        self.hash.chars().take(SHORT_HASH_LEN).collect()
    }
}

/// Commit message prefixes marking release-note-worthy commits
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CommitPrefixes {
    #[serde(default = "default_feature_prefix")]
    pub feature: String,

    #[serde(default = "default_bug_fix_prefix")]
    pub bug_fix: String,
}

fn default_feature_prefix() -> String {
    "[+]".to_string()
}

fn default_bug_fix_prefix() -> String {
    "[#]".to_string()
}

impl Default for CommitPrefixes {
    fn default() -> Self {
        CommitPrefixes {
            feature: default_feature_prefix(),
            bug_fix: default_bug_fix_prefix(),
        }
    }
}

/// Changelog bucket a commit falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    Feature,
    Fix,
}

impl CommitPrefixes {
    /// Match a message against the prefixes, feature first.
    ///
    /// Returns the bucket and the message with the prefix removed.
    pub fn match_message<'a>(&self, message: &'a str) -> Option<(CommitKind, &'a str)> {
        let candidates = [
            (CommitKind::Feature, self.feature.as_str()),
            (CommitKind::Fix, self.bug_fix.as_str()),
        ];

        candidates.into_iter().find_map(|(kind, prefix)| {
            message
                .strip_prefix(prefix)
                .map(|rest| (kind, rest.trim_start()))
        })
    }
}

/// Pre-formatted changelog lines, in log order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedCommits {
    pub features: Vec<String>,
    pub fixes: Vec<String>,
}

impl ClassifiedCommits {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.fixes.is_empty()
    }

    /// Total number of changelog entries
    pub fn len(&self) -> usize {
        self.features.len() + self.fixes.len()
    }
}

/// Split a raw commit log into records.
///
/// The log is a sequence of `"{message}\n{hash}{delimiter}\n"` blocks.
pub fn parse_log(raw_log: &str, delimiter: &str) -> Vec<CommitRecord> {
    let separator = format!("{}\n", delimiter);
    raw_log
        .split(separator.as_str())
        .filter_map(CommitRecord::parse)
        .collect()
}

/// Format one changelog line linking to the commit.
///
/// Only the first line of `description` is kept; commit bodies stay out of
/// the changelog.
pub fn changelog_line(description: &str, record: &CommitRecord, commit_url_base: &str) -> String {
    let subject = description.lines().next().unwrap_or_default().trim_end();
    format!(
        "* {} ([{}]({}{}))\n",
        subject,
        record.short_hash(),
        commit_url_base,
        record.hash
    )
}

/// Sort a raw commit log into feature and fix changelog lines.
///
/// Commits matching neither prefix are left out. A message matching both
/// prefixes counts as a feature.
pub fn classify(
    raw_log: &str,
    delimiter: &str,
    prefixes: &CommitPrefixes,
    commit_url_base: &str,
) -> ClassifiedCommits {
    let mut classified = ClassifiedCommits::default();

    for record in parse_log(raw_log, delimiter) {
        let Some((kind, description)) = prefixes.match_message(&record.message) else {
            continue;
        };

        let line = changelog_line(description, &record, commit_url_base);
        match kind {
            CommitKind::Feature => classified.features.push(line),
            CommitKind::Fix => classified.fixes.push(line),
        }
    }

    classified
}
