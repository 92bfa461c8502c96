//! Plugin discovery for ansible-data.
//!
//! The generator never touches the filesystem directly: every question about
//! installed plugins goes through a [`PluginEcosystem`], and every module's
//! documentation goes through a [`DocParser`]. [`FsEcosystem`] and
//! [`YamlDocParser`] are the implementations used against a real install;
//! tests substitute in-memory fakes.

mod ecosystem;
mod parser;

use std::path::{Path, PathBuf};

use ansible_data_shared::Result;

pub use ecosystem::FsEcosystem;
pub use parser::{ParsedDoc, YamlDocParser, parse_docstring};

// ---------------------------------------------------------------------------
// LookupPlugin
// ---------------------------------------------------------------------------

/// A lookup plugin as yielded by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPlugin {
    /// Source file the plugin was loaded from.
    pub original_path: PathBuf,
}

impl LookupPlugin {
    pub fn new(original_path: impl Into<PathBuf>) -> Self {
        Self {
            original_path: original_path.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read-only view of an installed plugin tree.
pub trait PluginEcosystem {
    /// Ordered directories that may contain module implementations.
    fn module_paths(&self) -> Result<Vec<PathBuf>>;

    /// Candidate module names found directly inside `path`.
    ///
    /// Unreadable or missing directories yield nothing.
    fn module_names(&self, path: &Path) -> Vec<String>;

    /// Locate the implementation of `name` within `paths`.
    fn resolve_module(&self, name: &str, paths: &[PathBuf]) -> Option<PathBuf>;

    /// Every lookup plugin, in loader order.
    fn lookup_plugins(&self) -> Result<Vec<LookupPlugin>>;
}

/// Parser for the structured documentation embedded in a module file.
pub trait DocParser {
    fn parse(&self, path: &Path) -> Result<ParsedDoc>;
}
