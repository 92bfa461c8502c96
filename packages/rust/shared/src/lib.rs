//! Shared types, error model, and configuration for ansible-data.
//!
//! This crate is the foundation depended on by all other ansible-data crates.
//! It provides:
//! - [`AnsibleDataError`] — the unified error type
//! - Dataset types ([`Dataset`], [`ModuleDescriptor`], [`DirectiveIndex`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, DEFAULT_EXCLUDED_MODULES, EcosystemConfig, ModulesConfig,
    OutputConfig, config_dir, config_file_path, expand_home, init_config, load_config,
    load_config_from,
};
pub use error::{AnsibleDataError, Result};
pub use types::{
    DATASET_KEYS, Dataset, DirectiveIndex, LookupPluginIndex, MODULE_KEYS, ModuleDescriptor,
};
