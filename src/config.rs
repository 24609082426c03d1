use crate::domain::{CommitPrefixes, Environment, Platform};
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Project configuration file looked up in the current directory
pub const PROJECT_CONFIG_FILE: &str = ".publishrc.toml";

/// Per-user fallback configuration, inside the platform config directory
pub const USER_CONFIG_FILE: &str = "rn-publish.toml";

/// Represents the complete configuration for rn-publish.
///
/// Loaded once at startup and passed by reference to every operation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Version used when the repository carries no tag yet
    #[serde(default = "default_starting_version")]
    pub starting_version: String,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub appcenter: Option<AppCenterConfig>,

    /// Variables written to `env.js`, keyed by variable name
    #[serde(default)]
    pub environment_variables: BTreeMap<String, EnvironmentValues>,
}

fn default_starting_version() -> String {
    "1.0.0".to_string()
}

/// Git settings: repository URL, environment branches and commit prefixes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct GitConfig {
    /// Web URL of the repository, e.g. `https://github.com/org/app/`
    #[serde(default)]
    pub repo_url: String,

    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub commit_prefixes: CommitPrefixes,
}

impl GitConfig {
    /// Base URL a commit hash is appended to in changelog links
    pub fn commit_url_base(&self) -> String {
        let mut base = self.repo_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        base.push_str("commit/");
        base
    }
}

/// Git branch backing each environment
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_staging_branch")]
    pub staging: String,

    #[serde(rename = "pre-prod", default = "default_pre_prod_branch")]
    pub pre_prod: String,

    #[serde(default = "default_prod_branch")]
    pub prod: String,
}

fn default_staging_branch() -> String {
    "develop".to_string()
}

fn default_pre_prod_branch() -> String {
    "pre-prod".to_string()
}

fn default_prod_branch() -> String {
    "main".to_string()
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            staging: default_staging_branch(),
            pre_prod: default_pre_prod_branch(),
            prod: default_prod_branch(),
        }
    }
}

impl BranchesConfig {
    pub fn branch(&self, env: Environment) -> &str {
        match env {
            Environment::Staging => &self.staging,
            Environment::PreProd => &self.pre_prod,
            Environment::Prod => &self.prod,
        }
    }
}

/// AppCenter account settings.
///
/// Only required by the commands that talk to AppCenter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppCenterConfig {
    pub user_name: String,

    pub token: String,

    pub app_name: AppNames,

    /// Accepted so existing project files keep parsing. Build numbering
    /// belongs to the AppCenter branch configuration, which is not managed here.
    #[serde(default)]
    pub auto_increment_build_number: bool,

    /// Accepted so existing project files keep parsing, like
    /// `auto_increment_build_number`.
    #[serde(default)]
    pub build_android_app_bundle: bool,
}

/// AppCenter application name of each platform
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppNames {
    pub ios: String,
    pub android: String,
}

impl AppNames {
    pub fn get(&self, platform: Platform) -> &str {
        match platform {
            Platform::Ios => &self.ios,
            Platform::Android => &self.android,
        }
    }
}

/// Values of one `env.js` variable across environments
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct EnvironmentValues {
    #[serde(default)]
    pub staging: Option<String>,

    #[serde(rename = "pre-prod", default)]
    pub pre_prod: Option<String>,

    #[serde(default)]
    pub prod: Option<String>,
}

impl EnvironmentValues {
    pub fn get(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Staging => self.staging.as_deref(),
            Environment::PreProd => self.pre_prod.as_deref(),
            Environment::Prod => self.prod.as_deref(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            starting_version: default_starting_version(),
            git: GitConfig::default(),
            appcenter: None,
            environment_variables: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Branch backing `env`
    pub fn branch(&self, env: Environment) -> &str {
        self.git.branches.branch(env)
    }

    /// Check the values every release needs.
    pub fn validate(&self) -> Result<()> {
        if self.git.repo_url.trim().is_empty() {
            return Err(ReleaseError::config("git.repo_url is mandatory"));
        }

        let starting = self.starting_version.trim_start_matches('v');
        semver::Version::parse(starting).map_err(|e| {
            ReleaseError::config(format!(
                "starting_version '{}' is not a semantic version: {}",
                self.starting_version, e
            ))
        })?;

        let prefixes = &self.git.commit_prefixes;
        if prefixes.feature.is_empty() || prefixes.bug_fix.is_empty() {
            return Err(ReleaseError::config("commit prefixes cannot be empty"));
        }

        for env in Environment::ALL {
            if self.branch(env).trim().is_empty() {
                return Err(ReleaseError::config(format!(
                    "git.branches.{} cannot be empty",
                    env
                )));
            }
        }

        Ok(())
    }

    /// AppCenter settings, checked for the values build commands need.
    pub fn appcenter(&self) -> Result<&AppCenterConfig> {
        let appcenter = self
            .appcenter
            .as_ref()
            .ok_or_else(|| ReleaseError::config("missing [appcenter] section"))?;

        let mandatory = [
            ("appcenter.user_name", appcenter.user_name.as_str()),
            ("appcenter.token", appcenter.token.as_str()),
            ("appcenter.app_name.ios", appcenter.app_name.ios.as_str()),
            ("appcenter.app_name.android", appcenter.app_name.android.as_str()),
        ];

        if let Some((key, _)) = mandatory.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ReleaseError::config(format!("{} is mandatory", key)));
        }

        Ok(appcenter)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.publishrc.toml` in current directory
/// 3. `rn-publish.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(PROJECT_CONFIG_FILE).exists() {
        fs::read_to_string(PROJECT_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(USER_CONFIG_FILE);
        if user_config.exists() {
            fs::read_to_string(user_config)?
        } else {
            tracing::debug!("no configuration file found, using defaults");
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(config_str: &str) -> Result<Config> {
    toml::from_str(config_str).map_err(|e| ReleaseError::config(e.to_string()))
}
