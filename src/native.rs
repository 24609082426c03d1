//! Version numbers in the native Android and iOS projects.

use crate::boundary::BoundaryWarning;
use crate::domain::Platform;
use crate::error::{ReleaseError, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

pub const ANDROID_BUILD_GRADLE: &str = "android/app/build.gradle";
pub const IOS_PODFILE: &str = "ios/Podfile";

const GRADLE_VERSION_NAME: &str = r#"(?m)^([ \t]*)versionName\s+.*$"#;
const GRADLE_VERSION_VALUE: &str = r#"(?m)^[ \t]*versionName\s+"([^"]*)""#;
const PLIST_SHORT_VERSION: &str =
    r"(<key>CFBundleShortVersionString</key>\s*<string>)[^<]*(</string>)";
const PODFILE_TARGET: &str = r"(?m)^[ \t]*target\s+'([^'\n]+)'";

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| ReleaseError::native_file(format!("invalid pattern: {}", e)))
}

/// Replace the `versionName` line of a `build.gradle`.
///
/// Returns `None` when the file declares no `versionName`.
pub fn set_gradle_version_name(content: &str, version: &str) -> Result<Option<String>> {
    let re = pattern(GRADLE_VERSION_NAME)?;
    if !re.is_match(content) {
        return Ok(None);
    }

    let updated = re.replace_all(content, |caps: &Captures| {
        format!("{}versionName \"{}\"", &caps[1], version)
    });
    Ok(Some(updated.into_owned()))
}

/// Read the quoted `versionName` of a `build.gradle`
pub fn gradle_version_name(content: &str) -> Result<Option<String>> {
    let re = pattern(GRADLE_VERSION_VALUE)?;
    Ok(re.captures(content).map(|caps| caps[1].to_string()))
}

/// Set `CFBundleShortVersionString` in an `Info.plist`.
///
/// Returns `None` when the key is absent.
pub fn set_plist_short_version(content: &str, version: &str) -> Result<Option<String>> {
    let re = pattern(PLIST_SHORT_VERSION)?;
    if !re.is_match(content) {
        return Ok(None);
    }

    let updated = re.replace(content, |caps: &Captures| {
        format!("{}{}{}", &caps[1], version, &caps[2])
    });
    Ok(Some(updated.into_owned()))
}

/// First `target 'Name'` of a Podfile, which names the Xcode project folder
pub fn podfile_target(content: &str) -> Result<Option<String>> {
    let re = pattern(PODFILE_TARGET)?;
    Ok(re.captures(content).map(|caps| caps[1].to_string()))
}

/// Native folders of a mobile project
#[derive(Debug, Clone)]
pub struct NativeProject {
    root: PathBuf,
}

impl NativeProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        NativeProject { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn android_build_gradle(&self) -> PathBuf {
        self.root.join(ANDROID_BUILD_GRADLE)
    }

    /// Location of the iOS `Info.plist`, derived from the Podfile target.
    pub fn ios_info_plist(&self) -> Result<Option<PathBuf>> {
        let podfile = self.root.join(IOS_PODFILE);
        if !podfile.exists() {
            return Ok(None);
        }

        let target = podfile_target(&fs::read_to_string(&podfile)?)?;
        Ok(target.map(|name| self.root.join("ios").join(name).join("Info.plist")))
    }

    /// Version currently declared by the Android project
    pub fn current_version(&self) -> Result<Option<String>> {
        let gradle = self.android_build_gradle();
        if !gradle.exists() {
            return Ok(None);
        }
        gradle_version_name(&fs::read_to_string(gradle)?)
    }

    /// New `build.gradle` content for `version`. `None` when the project is absent.
    fn prepare_android(&self, version: &str) -> Result<Option<(PathBuf, String)>> {
        let gradle = self.android_build_gradle();
        if !gradle.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&gradle)?;
        let updated = set_gradle_version_name(&content, version)?.ok_or_else(|| {
            ReleaseError::native_file(format!("no versionName in {}", gradle.display()))
        })?;
        Ok(Some((gradle, updated)))
    }

    /// New `Info.plist` content for `version`. `None` when the project is absent.
    fn prepare_ios(&self, version: &str) -> Result<Option<(PathBuf, String)>> {
        let Some(plist) = self.ios_info_plist()? else {
            return Ok(None);
        };
        if !plist.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&plist)?;
        let updated = set_plist_short_version(&content, version)?.ok_or_else(|| {
            ReleaseError::native_file(format!(
                "no CFBundleShortVersionString in {}",
                plist.display()
            ))
        })?;
        Ok(Some((plist, updated)))
    }

    fn prepare(&self, platform: Platform, version: &str) -> Result<Option<(PathBuf, String)>> {
        match platform {
            Platform::Android => self.prepare_android(version),
            Platform::Ios => self.prepare_ios(version),
        }
    }

    /// Write `version` into `build.gradle`. `false` when the project is absent.
    pub fn update_android_version(&self, version: &str) -> Result<bool> {
        write_prepared(self.prepare_android(version)?)
    }

    /// Write `version` into the iOS `Info.plist`. `false` when the project is absent.
    pub fn update_ios_version(&self, version: &str) -> Result<bool> {
        write_prepared(self.prepare_ios(version)?)
    }

    /// Update both platforms, reporting the ones that are missing.
    ///
    /// Every file is checked before any is written, so a malformed project
    /// leaves the other one untouched.
    pub fn update_versions(&self, version: &str) -> Result<Vec<BoundaryWarning>> {
        let mut prepared = Vec::new();
        for platform in Platform::ALL {
            prepared.push((platform, self.prepare(platform, version)?));
        }

        let mut warnings = Vec::new();
        for (platform, update) in prepared {
            if write_prepared(update)? {
                tracing::info!(%platform, version, "native version updated");
            } else {
                let path = match platform {
                    Platform::Android => ANDROID_BUILD_GRADLE,
                    Platform::Ios => "ios/",
                };
                warnings.push(BoundaryWarning::NativeProjectMissing {
                    platform: platform.label().to_string(),
                    path: path.to_string(),
                });
            }
        }

        Ok(warnings)
    }
}

fn write_prepared(update: Option<(PathBuf, String)>) -> Result<bool> {
    match update {
        Some((path, content)) => {
            fs::write(path, content)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
