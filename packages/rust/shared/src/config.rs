//! Application configuration for ansible-data.
//!
//! User config lives at `~/.ansible-data/ansible-data.toml`.
//! A `--config` path overrides the location; missing files fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnsibleDataError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "ansible-data.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".ansible-data";

/// Modules the generator never documents (unsupported or internal built-ins).
pub const DEFAULT_EXCLUDED_MODULES: [&str; 3] = ["async_wrapper", "accelerate", "fireball"];

// ---------------------------------------------------------------------------
// Config structs (matching ansible-data.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where plugins are installed.
    #[serde(default)]
    pub ecosystem: EcosystemConfig,

    /// Module filtering.
    #[serde(default)]
    pub modules: ModulesConfig,

    /// Dataset destination.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[ecosystem]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemConfig {
    /// Module roots, searched in order. Sub-directories are included automatically.
    #[serde(default = "default_module_paths")]
    pub module_paths: Vec<String>,

    /// Lookup plugin roots, searched in order.
    #[serde(default = "default_lookup_paths")]
    pub lookup_paths: Vec<String>,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            module_paths: default_module_paths(),
            lookup_paths: default_lookup_paths(),
        }
    }
}

fn default_module_paths() -> Vec<String> {
    vec![
        "~/.ansible/plugins/modules".into(),
        "/usr/share/ansible/plugins/modules".into(),
    ]
}
fn default_lookup_paths() -> Vec<String> {
    vec![
        "~/.ansible/plugins/lookup".into(),
        "/usr/share/ansible/plugins/lookup".into(),
    ]
}

/// `[modules]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Module names skipped before resolution.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDED_MODULES.iter().map(|m| m.to_string()).collect()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination of the dataset file.
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "data/ansible-data.json".into()
}

// ---------------------------------------------------------------------------
// Build config (runtime, resolved from the config file)
// ---------------------------------------------------------------------------

/// Runtime build configuration with `~` expanded.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Module roots in search order.
    pub module_paths: Vec<PathBuf>,
    /// Lookup plugin roots in search order.
    pub lookup_paths: Vec<PathBuf>,
    /// Module names never documented.
    pub exclude_modules: Vec<String>,
    /// Dataset destination.
    pub output_path: PathBuf,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        let expand_all =
            |paths: &[String]| -> Vec<PathBuf> { paths.iter().map(|p| expand_home(p)).collect() };

        Self {
            module_paths: expand_all(&config.ecosystem.module_paths),
            lookup_paths: expand_all(&config.ecosystem.lookup_paths),
            exclude_modules: config.modules.exclude.clone(),
            output_path: expand_home(&config.output.path),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths are returned unchanged when no home directory can be determined.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.ansible-data/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AnsibleDataError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.ansible-data/ansible-data.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AnsibleDataError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        AnsibleDataError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AnsibleDataError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AnsibleDataError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AnsibleDataError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("module_paths"));
        assert!(toml_str.contains("async_wrapper"));
        assert!(toml_str.contains("data/ansible-data.json"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.modules.exclude.len(), 3);
        assert_eq!(parsed.output.path, "data/ansible-data.json");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[ecosystem]
module_paths = ["/opt/ansible/lib/ansible/modules"]

[modules]
exclude = ["debug"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.ecosystem.module_paths, vec!["/opt/ansible/lib/ansible/modules"]);
        assert_eq!(config.ecosystem.lookup_paths, default_lookup_paths());
        assert_eq!(config.modules.exclude, vec!["debug"]);
        assert_eq!(config.output.path, "data/ansible-data.json");
    }

    #[test]
    fn build_config_from_app_config() {
        let mut app = AppConfig::default();
        app.ecosystem.module_paths = vec!["/srv/modules".into()];
        app.output.path = "/tmp/out.json".into();

        let build = BuildConfig::from(&app);
        assert_eq!(build.module_paths, vec![PathBuf::from("/srv/modules")]);
        assert_eq!(build.output_path, PathBuf::from("/tmp/out.json"));
        assert_eq!(build.exclude_modules, default_exclude());
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("rel/~path"), PathBuf::from("rel/~path"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/.ansible"), home.join(".ansible"));
        }
    }

    #[test]
    fn load_config_from_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[modules\nexclude = 3").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
