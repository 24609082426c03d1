//! `env.js` module exposing per-environment variables to the JavaScript app.

use crate::config::EnvironmentValues;
use crate::domain::Environment;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const ENV_JS_FILE: &str = "env.js";

/// Render the `env.js` module for `env`.
///
/// Variables without a value for `env` are exported as empty strings.
pub fn render_env_js(variables: &BTreeMap<String, EnvironmentValues>, env: Environment) -> String {
    let declarations: Vec<String> = variables
        .iter()
        .map(|(name, values)| {
            let value = js_string_escape(values.get(env).unwrap_or_default());
            format!("const {} = '{}';", name, value)
        })
        .collect();

    let exports: Vec<String> = variables.keys().map(|name| format!("  {},", name)).collect();

    format!(
        "{}\n\nexport default {{\n{}\n}};\n",
        declarations.join("\n"),
        exports.join("\n")
    )
}

/// Escape text for a single-quoted JavaScript string literal
fn js_string_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Write `env.js` under `root`. Returns `false` when there is nothing to write.
pub fn write_env_js(
    root: &Path,
    variables: &BTreeMap<String, EnvironmentValues>,
    env: Environment,
) -> Result<bool> {
    if variables.is_empty() {
        return Ok(false);
    }

    fs::write(root.join(ENV_JS_FILE), render_env_js(variables, env))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn variables() -> BTreeMap<String, EnvironmentValues> {
        let mut variables = BTreeMap::new();
        variables.insert(
            "API_URL".to_string(),
            EnvironmentValues {
                staging: Some("https://staging.acme.dev".to_string()),
                pre_prod: Some("https://preprod.acme.dev".to_string()),
                prod: Some("https://acme.dev".to_string()),
            },
        );
        variables.insert(
            "BUILD_ENV".to_string(),
            EnvironmentValues {
                staging: Some("staging".to_string()),
                ..Default::default()
            },
        );
        variables
    }

    #[test]
    fn test_render_staging_values() {
        let js = render_env_js(&variables(), Environment::Staging);
        assert_eq!(
            js,
            "const API_URL = 'https://staging.acme.dev';\nconst BUILD_ENV = 'staging';\n\nexport default {\n  API_URL,\n  BUILD_ENV,\n};\n"
        );
    }

    #[test]
    fn test_missing_value_is_empty() {
        let js = render_env_js(&variables(), Environment::Prod);
        assert!(js.contains("const BUILD_ENV = '';"));
    }

    #[test]
    fn test_write_skips_without_variables() {
        let dir = TempDir::new().unwrap();
        assert!(!write_env_js(dir.path(), &BTreeMap::new(), Environment::Staging).unwrap());
        assert!(!dir.path().join(ENV_JS_FILE).exists());

        assert!(write_env_js(dir.path(), &variables(), Environment::Staging).unwrap());
        assert!(dir.path().join(ENV_JS_FILE).exists());
    }

    #[test]
    fn test_values_are_escaped() {
        let mut vars = BTreeMap::new();
        vars.insert(
            "WIN_PATH".to_string(),
            EnvironmentValues {
                staging: Some(r"C:\app\".to_string()),
                ..EnvironmentValues::default()
            },
        );
        vars.insert(
            "GREETING".to_string(),
            EnvironmentValues {
                staging: Some("it's\nok".to_string()),
                ..EnvironmentValues::default()
            },
        );

        let js = render_env_js(&vars, Environment::Staging);
        assert!(js.contains(r"const WIN_PATH = 'C:\\app\\';"));
        assert!(js.contains(r"const GREETING = 'it\'s\nok';"));
    }
}
