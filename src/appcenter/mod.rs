//! AppCenter build service client
//!
//! Thin blocking wrapper over the AppCenter REST API: trigger a branch
//! build, read its status, create tester distribution groups.

pub mod model;

pub use model::{Build, BuildStatus, GroupOutcome, TriggeredBuild, WaitOutcome};

use crate::config::AppCenterConfig;
use crate::domain::Platform;
use crate::error::{ReleaseError, Result};
use model::DistributionGroupRequest;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use std::thread;
use std::time::Duration;

/// Public AppCenter host, used for the API and the web links
pub const APP_CENTER_HOST: &str = "https://appcenter.ms";

/// Delay between two build status polls
pub const BUILD_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Consecutive failed status polls after which a build is no longer awaited
pub const MAX_FAILED_POLLS: u32 = 3;

const API_TOKEN_HEADER: &str = "X-API-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AppCenterClient {
    client: Client,
    base_url: String,
    user_name: String,
}

impl AppCenterClient {
    /// Build a client authenticated with the configured API token
    pub fn new(config: &AppCenterConfig) -> Result<Self> {
        let token = HeaderValue::from_str(config.token.trim())
            .map_err(|_| ReleaseError::config("appcenter.token is not a valid header value"))?;

        let mut headers = HeaderMap::new();
        headers.insert(API_TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(AppCenterClient {
            client,
            base_url: APP_CENTER_HOST.to_string(),
            user_name: config.user_name.clone(),
        })
    }

    /// Point the client at another host (a proxy or a local test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// API URL of `path` under the given app
    pub fn app_url(&self, app: &str, path: &str) -> String {
        format!(
            "{}/api/v0.1/apps/{}/{}/{}",
            self.base_url, self.user_name, app, path
        )
    }

    /// Web page of a build, for humans
    pub fn build_url(&self, app: &str, branch: &str, build_id: u64) -> String {
        format!(
            "{}/users/{}/apps/{}/build/branches/{}/builds/{}",
            APP_CENTER_HOST, self.user_name, app, branch, build_id
        )
    }

    /// Queue a build of `branch`
    pub fn trigger_build(&self, app: &str, branch: &str) -> Result<Build> {
        let url = self.app_url(app, &format!("branches/{}/builds", branch));
        tracing::debug!(%url, "triggering build");

        let response = self.client.post(&url).send()?;
        Ok(check(response)?.json()?)
    }

    pub fn build_info(&self, app: &str, build_id: u64) -> Result<Build> {
        let url = self.app_url(app, &format!("builds/{}", build_id));
        let response = self.client.get(&url).send()?;
        Ok(check(response)?.json()?)
    }

    /// Create a public distribution group; a conflict means it already exists.
    pub fn create_distribution_group(&self, app: &str, name: &str) -> Result<GroupOutcome> {
        let url = self.app_url(app, "distribution_groups");
        let response = self
            .client
            .post(&url)
            .json(&DistributionGroupRequest {
                name,
                is_public: true,
            })
            .send()?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(GroupOutcome::AlreadyExists);
        }
        check(response)?;
        Ok(GroupOutcome::Created)
    }

    /// Trigger one build per platform on `branch`.
    ///
    /// A platform whose build cannot be triggered is reported in the error
    /// list and does not stop the others.
    pub fn trigger_builds(
        &self,
        config: &AppCenterConfig,
        platforms: &[Platform],
        branch: &str,
    ) -> (Vec<TriggeredBuild>, Vec<(Platform, ReleaseError)>) {
        let mut triggered = Vec::new();
        let mut failed = Vec::new();

        for &platform in platforms {
            let app = config.app_name.get(platform);
            match self.trigger_build(app, branch) {
                Ok(build) => triggered.push(TriggeredBuild {
                    platform,
                    app: app.to_string(),
                    url: self.build_url(app, branch, build.id),
                    build,
                }),
                Err(e) => {
                    tracing::warn!(%platform, error = %e, "build not triggered");
                    failed.push((platform, e));
                }
            }
        }

        (triggered, failed)
    }

    /// Poll `builds` every `interval` until all are completed.
    ///
    /// `on_poll` receives the statuses of each round that is not final; a
    /// `None` status means that poll failed. Gives up when every poll of a
    /// round fails, or when the builds still unread have failed
    /// [`MAX_FAILED_POLLS`] times in a row while the others completed.
    pub fn wait_for_builds<F>(
        &self,
        builds: &[TriggeredBuild],
        interval: Duration,
        mut on_poll: F,
    ) -> Result<WaitOutcome>
    where
        F: FnMut(&[(Platform, Option<BuildStatus>)]),
    {
        if builds.is_empty() {
            return Ok(WaitOutcome::Completed);
        }

        let mut failed_polls = vec![0u32; builds.len()];

        loop {
            thread::sleep(interval);

            let statuses: Vec<(Platform, Option<BuildStatus>)> = builds
                .iter()
                .map(|triggered| {
                    let status = self
                        .build_info(&triggered.app, triggered.build.id)
                        .map(|build| build.status)
                        .map_err(|e| tracing::warn!(error = %e, "build status unavailable"))
                        .ok();
                    (triggered.platform, status)
                })
                .collect();

            for (failures, (_, status)) in failed_polls.iter_mut().zip(&statuses) {
                *failures = if status.is_some() { 0 } else { *failures + 1 };
            }

            if statuses.iter().all(|(_, status)| status.is_none()) {
                return Ok(WaitOutcome::StatusUnavailable);
            }

            let completed = |status: &Option<BuildStatus>| *status == Some(BuildStatus::Completed);
            if statuses.iter().all(|(_, status)| completed(status)) {
                return Ok(WaitOutcome::Completed);
            }

            let settled = statuses
                .iter()
                .zip(&failed_polls)
                .all(|((_, status), failures)| completed(status) || *failures >= MAX_FAILED_POLLS);
            if settled {
                return Ok(WaitOutcome::StatusUnavailable);
            }

            on_poll(&statuses);
        }
    }
}

/// Turn a non-success response into [`ReleaseError::AppCenter`]
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().unwrap_or_default();
    Err(ReleaseError::AppCenter {
        status: status.as_u16(),
        message,
    })
}
