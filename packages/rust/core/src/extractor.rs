//! Per-module documentation extraction.
//!
//! Every catalogued name ends in an [`ExtractOutcome`]. A module that cannot be
//! documented is skipped with a reason; nothing in here fails the run.

use std::fmt;
use std::path::{Path, PathBuf};

use ansible_data_discovery::{DocParser, PluginEcosystem};
use ansible_data_shared::ModuleDescriptor;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

/// Implementation languages the generator does not document.
const NON_PRIMARY_EXTENSIONS: [&str; 1] = ["ps1"];

/// Why a module was left out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// On the exclusion list.
    Excluded,
    /// No implementation file found.
    Unresolved,
    /// Resolved to a package directory.
    Directory,
    /// Implemented in a non-primary language.
    NonPrimaryLanguage,
    /// Documentation block missing, unreadable or malformed.
    InvalidDoc(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded => f.write_str("excluded"),
            Self::Unresolved => f.write_str("unresolved"),
            Self::Directory => f.write_str("directory"),
            Self::NonPrimaryLanguage => f.write_str("non-primary language"),
            Self::InvalidDoc(message) => write!(f, "invalid doc: {message}"),
        }
    }
}

/// A module that did not make it into the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedModule {
    pub name: String,
    pub reason: SkipReason,
}

/// Result of extracting one module.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    Extracted(ModuleDescriptor),
    Skipped(SkippedModule),
}

/// Descriptors and skips for a whole catalog.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Sorted by module name, one entry per name.
    pub modules: Vec<ModuleDescriptor>,
    pub skipped: Vec<SkippedModule>,
}

/// Turns catalogued module names into [`ModuleDescriptor`]s.
pub struct DocstringExtractor<'a> {
    ecosystem: &'a dyn PluginEcosystem,
    parser: &'a dyn DocParser,
    paths: &'a [PathBuf],
    exclude: &'a [String],
}

impl<'a> DocstringExtractor<'a> {
    pub fn new(
        ecosystem: &'a dyn PluginEcosystem,
        parser: &'a dyn DocParser,
        paths: &'a [PathBuf],
        exclude: &'a [String],
    ) -> Self {
        Self {
            ecosystem,
            parser,
            paths,
            exclude,
        }
    }

    /// Extract a single module.
    pub fn extract(&self, name: &str) -> ExtractOutcome {
        let skip = |reason| {
            ExtractOutcome::Skipped(SkippedModule {
                name: name.to_string(),
                reason,
            })
        };

        if self.exclude.iter().any(|excluded| excluded == name) {
            return skip(SkipReason::Excluded);
        }

        let Some(path) = self.ecosystem.resolve_module(name, self.paths) else {
            return skip(SkipReason::Unresolved);
        };
        if path.is_dir() {
            return skip(SkipReason::Directory);
        }
        if is_non_primary(&path) {
            return skip(SkipReason::NonPrimaryLanguage);
        }

        match self.parser.parse(&path) {
            Ok(doc) => ExtractOutcome::Extracted(project(name, doc.fields)),
            Err(e) => {
                warn!(module = name, path = %path.display(), error = %e, "skipping undocumented module");
                skip(SkipReason::InvalidDoc(e.to_string()))
            }
        }
    }

    /// Extract every name in order, calling `on_module` after each one.
    #[instrument(skip_all, fields(candidates = names.len()))]
    pub fn extract_all(
        &self,
        names: &[String],
        mut on_module: impl FnMut(&str, usize, usize),
    ) -> Extraction {
        let mut extraction = Extraction::default();
        let total = names.len();

        for (i, name) in names.iter().enumerate() {
            match self.extract(name) {
                ExtractOutcome::Extracted(descriptor) => extraction.modules.push(descriptor),
                ExtractOutcome::Skipped(skipped) => {
                    debug!(module = %skipped.name, reason = %skipped.reason, "module skipped");
                    extraction.skipped.push(skipped);
                }
            }
            on_module(name, i + 1, total);
        }

        // A doc block may declare a different name than its file.
        extraction
            .modules
            .sort_by(|a, b| a.module.cmp(&b.module));
        extraction.modules.dedup_by(|later, earlier| {
            let duplicate = later.module == earlier.module;
            if duplicate {
                debug!(module = %later.module, "duplicate module identity dropped");
            }
            duplicate
        });

        info!(
            extracted = extraction.modules.len(),
            skipped = extraction.skipped.len(),
            "module documentation extracted"
        );
        extraction
    }
}

/// Project parsed documentation down to the four dataset fields.
pub fn project(name: &str, mut fields: Map<String, Value>) -> ModuleDescriptor {
    let module = match fields.remove("module") {
        Some(Value::String(declared)) if !declared.is_empty() => declared,
        _ => name.to_string(),
    };

    let short_description = match fields.remove("short_description") {
        Some(Value::String(text)) => Some(text),
        None | Some(Value::Null) => None,
        Some(other) => {
            debug!(module = %module, value = %other, "non-text short_description dropped");
            None
        }
    };

    ModuleDescriptor {
        module,
        short_description,
        options: fields.remove("options").filter(|v| !v.is_null()),
        deprecated: fields.remove("deprecated").filter(|v| !v.is_null()),
    }
}

fn is_non_primary(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| NON_PRIMARY_EXTENSIONS.contains(&ext))
}
