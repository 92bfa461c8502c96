//! Dataset assembler.
//!
//! Merges the module, directive and lookup sections into one [`Dataset`],
//! writes it as pretty-printed UTF-8 JSON, and validates persisted datasets.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use ansible_data_shared::{
    AnsibleDataError, DATASET_KEYS, Dataset, DirectiveIndex, LookupPluginIndex, MODULE_KEYS,
    ModuleDescriptor, Result,
};

use crate::directives::DIRECTIVE_OVERRIDES;

/// Output from a successful dataset write.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Where the dataset was written.
    pub output_path: PathBuf,
    /// SHA-256 of the written bytes.
    pub sha256: String,
    pub size_bytes: usize,
}

/// Counts read back from a validated dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub module_count: usize,
    pub directive_count: usize,
    pub lookup_plugin_count: usize,
}

/// Combine the three sections.
pub fn assemble(
    modules: Vec<ModuleDescriptor>,
    directives: DirectiveIndex,
    lookup_plugins: LookupPluginIndex,
) -> Dataset {
    Dataset {
        modules,
        directives,
        lookup_plugins,
    }
}

/// Render a dataset exactly as it is persisted (two-space indent, non-ASCII kept).
pub fn render_dataset(dataset: &Dataset) -> Result<String> {
    serde_json::to_string_pretty(dataset)
        .map_err(|e| AnsibleDataError::validation(format!("JSON serialization failed: {e}")))
}

/// Write `dataset` to `path`, replacing any previous file.
///
/// Missing parent directories are created. Nothing is written if rendering fails.
#[instrument(skip_all, fields(path = %path.display(), modules = dataset.modules.len()))]
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<AssembleResult> {
    let json = render_dataset(dataset)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AnsibleDataError::io(parent, e))?;
    }

    std::fs::write(path, &json).map_err(|e| AnsibleDataError::io(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    info!(size = json.len(), %sha256, "dataset written");

    Ok(AssembleResult {
        output_path: path.to_path_buf(),
        sha256,
        size_bytes: json.len(),
    })
}

/// Verify that a persisted dataset is well-formed.
pub fn validate_dataset(path: &Path) -> Result<DatasetSummary> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => {
            AnsibleDataError::validation(format!("{} is not valid UTF-8", path.display()))
        }
        _ => AnsibleDataError::io(path, e),
    })?;

    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| AnsibleDataError::validation(format!("invalid dataset JSON: {e}")))?;

    let root = value
        .as_object()
        .ok_or_else(|| AnsibleDataError::validation("dataset root is not an object"))?;
    check_keys(root, &DATASET_KEYS, "dataset")?;

    validate_modules(&root["modules"])?;

    let dataset: Dataset = serde_json::from_value(value)
        .map_err(|e| AnsibleDataError::validation(format!("dataset schema mismatch: {e}")))?;

    validate_overrides(&dataset.directives)?;

    debug!(path = %path.display(), "dataset validated");

    Ok(DatasetSummary {
        module_count: dataset.modules.len(),
        directive_count: dataset.directives.len(),
        lookup_plugin_count: dataset.lookup_plugins.len(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Require `object` to have exactly `expected` as keys.
fn check_keys(
    object: &serde_json::Map<String, serde_json::Value>,
    expected: &[&str],
    what: &str,
) -> Result<()> {
    let found: HashSet<&str> = object.keys().map(String::as_str).collect();
    let wanted: HashSet<&str> = expected.iter().copied().collect();

    if found != wanted {
        let mut found: Vec<_> = found.into_iter().collect();
        found.sort();
        return Err(AnsibleDataError::validation(format!(
            "{what} keys are {found:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

/// Module entries carry exactly the four fields, with unique ascending names.
fn validate_modules(modules: &serde_json::Value) -> Result<()> {
    let entries = modules
        .as_array()
        .ok_or_else(|| AnsibleDataError::validation("modules is not a list"))?;

    let mut previous: Option<&str> = None;
    for entry in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| AnsibleDataError::validation("module entry is not an object"))?;
        check_keys(object, &MODULE_KEYS, "module entry")?;

        let name = object["module"]
            .as_str()
            .ok_or_else(|| AnsibleDataError::validation("module name is not a string"))?;

        if let Some(prev) = previous {
            if name <= prev {
                return Err(AnsibleDataError::validation(format!(
                    "module {name:?} is out of order or duplicated (after {prev:?})"
                )));
            }
        }
        previous = Some(name);
    }
    Ok(())
}

fn validate_overrides(directives: &DirectiveIndex) -> Result<()> {
    for rule in &DIRECTIVE_OVERRIDES {
        let expected: Vec<String> = rule.kinds.iter().map(|k| k.to_string()).collect();
        if directives.get(rule.key) != Some(&expected) {
            return Err(AnsibleDataError::validation(format!(
                "directive {:?} must be {expected:?}",
                rule.key
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
