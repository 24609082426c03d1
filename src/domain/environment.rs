use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release environment a build is published to.
///
/// Each environment is backed by one long-lived git branch; the mapping
/// lives in [`crate::config::BranchesConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    Staging,
    PreProd,
    Prod,
}

impl Environment {
    /// Every environment, in promotion order.
    pub const ALL: [Environment; 3] = [Environment::Staging, Environment::PreProd, Environment::Prod];

    /// Configuration key and CLI spelling of the environment
    pub fn key(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::PreProd => "pre-prod",
            Environment::Prod => "prod",
        }
    }

    /// Environment whose branch is merged in before releasing this one.
    pub fn upstream(&self) -> Option<Environment> {
        match self {
            Environment::Staging => None,
            Environment::PreProd => Some(Environment::Staging),
            Environment::Prod => Some(Environment::PreProd),
        }
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Environment::Prod)
    }

    /// AppCenter distribution group testers of this environment belong to.
    ///
    /// Production builds go through the stores, not a tester group.
    pub fn distribution_group(&self) -> Option<&'static str> {
        match self {
            Environment::Staging => Some("Staging"),
            Environment::PreProd => Some("Preprod"),
            Environment::Prod => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staging" => Ok(Environment::Staging),
            "pre-prod" | "preprod" => Ok(Environment::PreProd),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(format!(
                "unknown environment '{}' (expected staging, pre-prod or prod)",
                other
            )),
        }
    }
}

/// Mobile platform built by AppCenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Ios, Platform::Android];

    pub fn key(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// Human readable platform name
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Ios => "iOS",
            Platform::Android => "Android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(format!(
                "unknown platform '{}' (expected ios or android)",
                other
            )),
        }
    }
}
