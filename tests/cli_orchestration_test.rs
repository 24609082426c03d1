use chrono::NaiveDate;
use rn_publish::boundary::BoundaryWarning;
use rn_publish::cli::orchestration::{
    changes_since_last_publish, manage_git_branches, manage_git_flow, plan_release,
    publish_commit_subject, ReleaseOptions, CHANGELOG_COMMIT_MESSAGE,
};
use rn_publish::config::Config;
use rn_publish::domain::Environment;
use rn_publish::git::{MockRepository, Repository};
use rn_publish::native::NativeProject;
use std::fs;
use tempfile::TempDir;

const LOG: &str = "[+] add login\nabcdef123456----DELIMITER----\n[#] fix crash\n0123456789ab----DELIMITER----\n";

fn config() -> Config {
    let mut config = Config::default();
    config.git.repo_url = "https://github.com/acme/app/".to_string();
    config
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
}

fn options(environment: Environment) -> ReleaseOptions {
    ReleaseOptions {
        environment,
        hotfix: false,
        tag_release: false,
        date: date(),
    }
}

fn android_project(dir: &TempDir) {
    let app = dir.path().join("android/app");
    fs::create_dir_all(&app).unwrap();
    fs::write(
        app.join("build.gradle"),
        "android {\n    defaultConfig {\n        versionName \"1.2.3\"\n    }\n}\n",
    )
    .unwrap();
}

#[test]
fn test_plan_release_from_latest_tag() {
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_log(Some("1.2.3"), LOG);

    let plan = plan_release(&repo, &config(), date()).unwrap();

    assert_eq!(plan.previous_version, "1.2.3");
    assert_eq!(plan.version, "1.3.2");
    assert!(plan.warnings.is_empty());
    assert_eq!(
        plan.changelog,
        "# Version 1.3.2 (2024-03-07)\n\n\
         ## Features\n\
         * add login ([abcdef](https://github.com/acme/app/commit/abcdef123456))\n\n\
         ## Fixes\n\
         * fix crash ([012345](https://github.com/acme/app/commit/0123456789ab))\n\n"
    );
    assert!(repo.operations().is_empty());
}

#[test]
fn test_plan_release_without_tag_uses_starting_version() {
    let repo = MockRepository::new().with_log(None, LOG);

    let plan = plan_release(&repo, &config(), date()).unwrap();

    assert_eq!(plan.previous_version, "1.0.0");
    assert_eq!(plan.version, "1.1.2");
    assert_eq!(
        plan.warnings,
        vec![BoundaryWarning::NoTagFound {
            starting_version: "1.0.0".to_string()
        }]
    );
}

#[test]
fn test_plan_release_without_notes_warns() {
    let repo = MockRepository::new().with_latest_tag("2.4.1");

    let plan = plan_release(&repo, &config(), date()).unwrap();

    assert_eq!(plan.version, "2.5.0");
    assert_eq!(plan.changelog, "# Version 2.5.0 (2024-03-07)\n\n");
    assert_eq!(
        plan.warnings,
        vec![BoundaryWarning::NoReleaseNotes {
            since: "2.4.1".to_string()
        }]
    );
}

#[test]
fn test_plan_release_rejects_malformed_tag() {
    let repo = MockRepository::new().with_latest_tag("release");
    assert!(plan_release(&repo, &config(), date()).is_err());
}

#[test]
fn test_staging_release_flow() {
    let dir = TempDir::new().unwrap();
    android_project(&dir);
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_log(Some("1.2.3"), LOG);

    let outcome = manage_git_flow(
        &repo,
        &config(),
        &NativeProject::new(dir.path()),
        &options(Environment::Staging),
    )
    .unwrap();

    assert_eq!(outcome.branch, "develop");
    assert_eq!(outcome.version, "1.3.2");
    assert!(!outcome.changelog_written);
    assert!(!outcome.tagged);
    assert_eq!(
        repo.operations(),
        vec![
            "checkout develop",
            "pull",
            "commit --allow-empty Publish new staging version 1.3.2",
            "push",
            "checkout develop",
        ]
    );

    let gradle = fs::read_to_string(dir.path().join("android/app/build.gradle")).unwrap();
    assert!(gradle.contains("versionName \"1.3.2\""));
    assert!(!dir.path().join("CHANGELOG.md").exists());

    // Only the iOS project is missing
    assert_eq!(outcome.warnings.len(), 1);
    assert!(matches!(
        &outcome.warnings[0],
        BoundaryWarning::NativeProjectMissing { platform, .. } if platform == "iOS"
    ));
}

#[test]
fn test_publish_commit_carries_changelog() {
    let dir = TempDir::new().unwrap();
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_log(Some("1.2.3"), LOG);

    manage_git_flow(
        &repo,
        &config(),
        &NativeProject::new(dir.path()),
        &options(Environment::Staging),
    )
    .unwrap();

    let message = repo.last_commit_message().unwrap();
    assert!(message.starts_with("Publish new staging version 1.3.2\n\n# Version 1.3.2"));
    assert!(message.contains("* add login"));
}

#[test]
fn test_pre_prod_release_merges_staging() {
    let dir = TempDir::new().unwrap();
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_log(Some("1.2.3"), LOG);

    manage_git_flow(
        &repo,
        &config(),
        &NativeProject::new(dir.path()),
        &options(Environment::PreProd),
    )
    .unwrap();

    let operations = repo.operations();
    assert_eq!(
        &operations[..4],
        &["checkout pre-prod", "pull", "pull origin develop", "push"]
    );
    assert_eq!(operations.last().unwrap(), "checkout develop");
}

#[test]
fn test_hotfix_skips_upstream_merge() {
    let dir = TempDir::new().unwrap();
    let repo = MockRepository::new().with_latest_tag("1.2.3");
    let mut options = options(Environment::Prod);
    options.hotfix = true;

    manage_git_flow(&repo, &config(), &NativeProject::new(dir.path()), &options).unwrap();

    assert!(!repo
        .operations()
        .iter()
        .any(|op| op.starts_with("pull origin")));
}

#[test]
fn test_prod_release_writes_changelog_and_tags() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("CHANGELOG.md"), "# Version 1.2.3 (2024-01-01)\n\n").unwrap();
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_log(Some("1.2.3"), LOG);
    let mut options = options(Environment::Prod);
    options.tag_release = true;

    let outcome =
        manage_git_flow(&repo, &config(), &NativeProject::new(dir.path()), &options).unwrap();

    assert!(outcome.changelog_written);
    assert!(outcome.tagged);
    assert_eq!(
        repo.operations(),
        vec![
            "checkout main",
            "pull",
            "pull origin pre-prod",
            "push",
            format!("commit {}", CHANGELOG_COMMIT_MESSAGE).as_str(),
            "commit --allow-empty Publish new prod version 1.3.2",
            "push",
            "tag 1.3.2 'version 1.3.2'",
            "push origin 1.3.2",
            "checkout develop",
        ]
    );

    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.starts_with("# Version 1.3.2 (2024-03-07)\n\n## Features\n"));
    assert!(changelog.ends_with("# Version 1.2.3 (2024-01-01)\n\n"));
}

#[test]
fn test_existing_publish_commit_is_not_repeated() {
    let dir = TempDir::new().unwrap();
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_last_message("Publish new staging version 1.3.0");

    let outcome = manage_git_flow(
        &repo,
        &config(),
        &NativeProject::new(dir.path()),
        &options(Environment::Staging),
    )
    .unwrap();

    assert!(outcome.warnings.contains(&BoundaryWarning::PublishCommitExists {
        environment: "staging".to_string()
    }));
    assert!(!repo.operations().iter().any(|op| op.starts_with("commit")));
}

#[test]
fn test_existing_tag_is_skipped() {
    let dir = TempDir::new().unwrap();
    // No notes since 1.2.3 -> next version is 1.3.0, already tagged
    let repo = MockRepository::new().with_latest_tag("1.2.3");
    repo.create_annotated_tag("1.3.0", "version 1.3.0").unwrap();
    let mut options = options(Environment::Prod);
    options.tag_release = true;

    let outcome =
        manage_git_flow(&repo, &config(), &NativeProject::new(dir.path()), &options).unwrap();

    assert!(!outcome.tagged);
    assert!(outcome.warnings.contains(&BoundaryWarning::TagExists {
        tag: "1.3.0".to_string()
    }));
    assert!(!repo.operations().contains(&"push origin 1.3.0".to_string()));
}

#[test]
fn test_long_changelog_falls_back_to_changes_since_publish() {
    let dir = TempDir::new().unwrap();
    let long_log: String = (0..200)
        .map(|i| format!("[+] feature number {}\n{:012x}----DELIMITER----\n", i, i))
        .collect();
    let repo = MockRepository::new()
        .with_latest_tag("1.2.3")
        .with_log(Some("1.2.3"), long_log)
        .with_publish_commit("fedcba987654")
        .with_log(Some("fedcba987654"), LOG);

    manage_git_flow(
        &repo,
        &config(),
        &NativeProject::new(dir.path()),
        &options(Environment::Staging),
    )
    .unwrap();

    let message = repo.last_commit_message().unwrap();
    assert!(message.starts_with("Publish new staging version 1.3.200\n\n# Version 1.3.200"));
    assert!(message.contains("* add login"));
    assert!(!message.contains("feature number"));
}

#[test]
fn test_changes_since_last_publish_without_publish_commit() {
    let repo = MockRepository::new().with_log(None, LOG);

    let changelog = changes_since_last_publish(&repo, &config(), "1.1.2", date()).unwrap();

    assert!(changelog.contains("* add login"));
    assert!(changelog.contains("* fix crash"));
}

#[test]
fn test_manage_git_branches_creates_missing() {
    let repo = MockRepository::new()
        .with_remote_branch("develop")
        .with_remote_branch("main");

    let created = manage_git_branches(&repo, &config()).unwrap();

    assert_eq!(created, vec!["pre-prod".to_string()]);
    assert_eq!(
        repo.operations(),
        vec![
            "create-branch pre-prod",
            "push -u origin pre-prod",
            "checkout develop",
        ]
    );
}

#[test]
fn test_publish_commit_subject() {
    assert_eq!(
        publish_commit_subject(Environment::PreProd),
        "Publish new pre-prod version"
    );
}
