//! Release workflows
//!
//! Sequences the git, changelog, native project and build service steps.
//! Kept separate from the clap definitions in `main.rs` so the workflows
//! can run against [`crate::git::MockRepository`] in tests.

use chrono::NaiveDate;

use crate::appcenter::{AppCenterClient, GroupOutcome};
use crate::boundary::BoundaryWarning;
use crate::changelog::{self, CHANGELOG_FILE};
use crate::config::Config;
use crate::domain::{classify, derive_next_version, ClassifiedCommits, Environment, Platform, COMMIT_DELIMITER};
use crate::error::Result;
use crate::git::{Repository, DEFAULT_REMOTE};
use crate::native::NativeProject;
use crate::ui;

/// Message of the commit adding the new changelog section
pub const CHANGELOG_COMMIT_MESSAGE: &str = "[*] update changelogs";

/// Word identifying publish commits in the history
pub const PUBLISH_MARKER: &str = "Publish";

/// Options of one release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    pub environment: Environment,

    /// Skip merging the upstream environment branch
    pub hotfix: bool,

    /// Tag the version (production only)
    pub tag_release: bool,

    /// Day written in the changelog header
    pub date: NaiveDate,
}

/// Next version and its changelog, computed from the history
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    /// Latest tag, or the starting version when there is none
    pub previous_version: String,
    pub version: String,
    pub commits: ClassifiedCommits,
    pub changelog: String,
    pub warnings: Vec<BoundaryWarning>,
}

/// Result of a successful release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub environment: Environment,

    /// The branch that was released
    pub branch: String,

    pub version: String,

    /// Whether `CHANGELOG.md` received the new section
    pub changelog_written: bool,

    pub tagged: bool,

    pub warnings: Vec<BoundaryWarning>,
}

/// Subject of the publish commit, without the version
pub fn publish_commit_subject(environment: Environment) -> String {
    format!("{} new {} version", PUBLISH_MARKER, environment)
}

fn classify_log(log: &str, config: &Config) -> ClassifiedCommits {
    classify(
        log,
        COMMIT_DELIMITER,
        &config.git.commit_prefixes,
        &config.git.commit_url_base(),
    )
}

/// Compute the next version and its changelog from the checked out branch.
///
/// Reads only; nothing is written to the repository.
pub fn plan_release<R: Repository + ?Sized>(
    repo: &R,
    config: &Config,
    date: NaiveDate,
) -> Result<ReleasePlan> {
    let mut warnings = Vec::new();

    let latest_tag = repo.latest_tag()?;
    let previous_version = match &latest_tag {
        Some(tag) => tag.clone(),
        None => {
            warnings.push(BoundaryWarning::NoTagFound {
                starting_version: config.starting_version.clone(),
            });
            config.starting_version.clone()
        }
    };

    let log = repo.commit_log(latest_tag.as_deref(), COMMIT_DELIMITER)?;
    let commits = classify_log(&log, config);
    if commits.is_empty() {
        warnings.push(BoundaryWarning::NoReleaseNotes {
            since: previous_version.clone(),
        });
    }

    let version = derive_next_version(
        &previous_version,
        commits.fixes.len(),
        commits.features.len(),
    )?;
    let changelog = changelog::render(&commits.features, &commits.fixes, &version, date);

    tracing::debug!(
        previous = %previous_version,
        next = %version,
        features = commits.features.len(),
        fixes = commits.fixes.len(),
        "release planned"
    );

    Ok(ReleasePlan {
        previous_version,
        version,
        commits,
        changelog,
        warnings,
    })
}

/// Changelog covering only the commits since the last publish commit
pub fn changes_since_last_publish<R: Repository + ?Sized>(
    repo: &R,
    config: &Config,
    version: &str,
    date: NaiveDate,
) -> Result<String> {
    let last_publish = repo.last_commit_matching(PUBLISH_MARKER)?;
    let log = repo.commit_log(last_publish.as_deref(), COMMIT_DELIMITER)?;
    let commits = classify_log(&log, config);
    Ok(changelog::render(&commits.features, &commits.fixes, version, date))
}

/// Release the environment branch.
///
/// 1. Checkout and pull the environment branch
/// 2. Merge the upstream environment branch, unless hotfix
/// 3. Plan the release and write the version into the native projects
/// 4. Production: prepend the changelog to `CHANGELOG.md` and commit it
/// 5. Create and push the publish commit, unless HEAD already is one
/// 6. Production: tag the version when requested
/// 7. Checkout the staging branch again
pub fn manage_git_flow<R: Repository + ?Sized>(
    repo: &R,
    config: &Config,
    project: &NativeProject,
    options: &ReleaseOptions,
) -> Result<ReleaseOutcome> {
    let environment = options.environment;
    let branch = config.branch(environment).to_string();

    ui::display_status(&format!("Checkout on {} branch", branch));
    repo.checkout(&branch)?;
    repo.pull()?;

    if !options.hotfix {
        if let Some(upstream) = environment.upstream() {
            let upstream_branch = config.branch(upstream);
            ui::display_status(&format!("Pulling changes from {}", upstream_branch));
            repo.pull_from(DEFAULT_REMOTE, upstream_branch)?;
            repo.push()?;
        }
    }

    let plan = plan_release(repo, config, options.date)?;
    let mut warnings = plan.warnings.clone();

    ui::display_status(&format!(
        "Update native projects with new version {}",
        plan.version
    ));
    warnings.extend(project.update_versions(&plan.version)?);

    let changelog_written = environment.is_prod();
    if changelog_written {
        ui::display_status(&format!(
            "Generate Change Log for version {}",
            plan.version
        ));
        changelog::prepend_to_file(&project.root().join(CHANGELOG_FILE), &plan.changelog)?;
        repo.commit_all(CHANGELOG_COMMIT_MESSAGE, None, false)?;
    }

    let subject = publish_commit_subject(environment);
    if repo.last_commit_message()?.contains(&subject) {
        warnings.push(BoundaryWarning::PublishCommitExists {
            environment: environment.to_string(),
        });
    } else {
        ui::display_status(&format!(
            "Create publishing commit for version {}",
            plan.version
        ));
        let body = changelog::publish_message_body(&plan.changelog, || {
            changes_since_last_publish(repo, config, &plan.version, options.date)
        })?;
        repo.commit_all(&format!("{} {}", subject, plan.version), Some(&body), true)?;
        repo.push()?;
    }

    let mut tagged = false;
    if environment.is_prod() && options.tag_release {
        if repo.tag_exists(&plan.version)? {
            warnings.push(BoundaryWarning::TagExists {
                tag: plan.version.clone(),
            });
        } else {
            ui::display_status(&format!("Tag new version {}", plan.version));
            repo.create_annotated_tag(&plan.version, &format!("version {}", plan.version))?;
            repo.push_tag(DEFAULT_REMOTE, &plan.version)?;
            tagged = true;
        }
    }

    let staging = config.branch(Environment::Staging);
    ui::display_status(&format!("Going back to {} branch", staging));
    repo.checkout(staging)?;

    Ok(ReleaseOutcome {
        environment,
        branch,
        version: plan.version,
        changelog_written,
        tagged,
        warnings,
    })
}

/// Make sure every environment branch exists on the remote.
///
/// Returns the branches that had to be created.
pub fn manage_git_branches<R: Repository + ?Sized>(repo: &R, config: &Config) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for environment in Environment::ALL {
        let branch = config.branch(environment);
        if repo.remote_branch_exists(DEFAULT_REMOTE, branch)? {
            tracing::debug!(branch, "branch already exists on remote");
            continue;
        }

        ui::display_status(&format!("Create branch {} on {}", branch, DEFAULT_REMOTE));
        repo.create_branch(branch)?;
        repo.push_upstream(DEFAULT_REMOTE, branch)?;
        created.push(branch.to_string());
    }

    repo.checkout(config.branch(Environment::Staging))?;
    Ok(created)
}

/// Create the tester distribution groups of every app.
///
/// Existing groups are reported as warnings. Returns the groups created.
pub fn create_distribution_groups(
    client: &AppCenterClient,
    config: &Config,
) -> Result<(Vec<String>, Vec<BoundaryWarning>)> {
    let appcenter = config.appcenter()?;
    let mut created = Vec::new();
    let mut warnings = Vec::new();

    for platform in Platform::ALL {
        let app = appcenter.app_name.get(platform);
        for group in Environment::ALL.iter().filter_map(|env| env.distribution_group()) {
            match client.create_distribution_group(app, group)? {
                GroupOutcome::Created => created.push(format!("{}/{}", app, group)),
                GroupOutcome::AlreadyExists => warnings.push(BoundaryWarning::DistributionGroupExists {
                    app: app.to_string(),
                    group: group.to_string(),
                }),
            }
        }
    }

    Ok((created, warnings))
}
