//! Filesystem-backed plugin ecosystem.
//!
//! Mirrors the plugin loader's view of an install: every configured root plus
//! all of its sub-directories is a search path, module candidates are the
//! plain files directly inside a search path, and lookup plugins are the
//! `*.py` files of the lookup roots.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ansible_data_shared::{AnsibleDataError, BuildConfig, Result};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::{LookupPlugin, PluginEcosystem};

/// File suffixes that never name a module.
const BLACKLIST_EXTS: [&str; 8] = [".pyc", ".pyo", ".swp", ".bak", "~", ".rpm", ".md", ".txt"];

/// Repository housekeeping files that live next to modules.
const IGNORE_FILES: [&str; 6] = [
    "COPYING",
    "CONTRIBUTING",
    "LICENSE",
    "README",
    "VERSION",
    "GUIDELINES",
];

/// Extension of the primary module language.
const MODULE_SUFFIX: &str = ".py";

/// An installed plugin tree rooted at configured directories.
#[derive(Debug, Clone)]
pub struct FsEcosystem {
    module_roots: Vec<PathBuf>,
    lookup_roots: Vec<PathBuf>,
}

impl FsEcosystem {
    pub fn new(module_roots: Vec<PathBuf>, lookup_roots: Vec<PathBuf>) -> Self {
        Self {
            module_roots,
            lookup_roots,
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.module_paths.clone(), config.lookup_paths.clone())
    }
}

impl PluginEcosystem for FsEcosystem {
    #[instrument(skip_all, fields(roots = self.module_roots.len()))]
    fn module_paths(&self) -> Result<Vec<PathBuf>> {
        search_dirs(&self.module_roots)
    }

    fn module_names(&self, path: &Path) -> Vec<String> {
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "module path not readable");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let file_name = entry.file_name();
                module_candidate(file_name.to_str()?, &entry.path())
            })
            .collect();
        names.sort();
        names
    }

    fn resolve_module(&self, name: &str, paths: &[PathBuf]) -> Option<PathBuf> {
        let exact = format!("{name}{MODULE_SUFFIX}");
        let deprecated = format!("_{name}{MODULE_SUFFIX}");

        for file_name in [&exact, &deprecated] {
            if let Some(found) = paths
                .iter()
                .map(|dir| dir.join(file_name))
                .find(|candidate| candidate.is_file())
            {
                return Some(found);
            }
        }

        paths.iter().find_map(|dir| find_by_stem(dir, name))
    }

    #[instrument(skip_all, fields(roots = self.lookup_roots.len()))]
    fn lookup_plugins(&self) -> Result<Vec<LookupPlugin>> {
        let mut plugins = Vec::new();

        for dir in search_dirs(&self.lookup_roots)? {
            let entries = std::fs::read_dir(&dir).map_err(|e| AnsibleDataError::io(&dir, e))?;

            let mut matches: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "py"))
                .collect();
            matches.sort();

            for path in matches {
                let is_init = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.contains("__init__"));
                if !is_init {
                    plugins.push(LookupPlugin::new(path));
                }
            }
        }

        debug!(count = plugins.len(), "lookup plugins listed");
        Ok(plugins)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Expand roots into search directories: each existing root followed by its
/// sub-directories in depth-first, name-sorted order.
fn search_dirs(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for root in roots {
        if !root.is_dir() {
            debug!(root = %root.display(), "plugin root missing, skipping");
            continue;
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                AnsibleDataError::Discovery(format!("walking {}: {e}", root.display()))
            })?;
            if entry.file_type().is_dir() && seen.insert(entry.path().to_path_buf()) {
                dirs.push(entry.into_path());
            }
        }
    }

    Ok(dirs)
}

fn is_skipped_dir(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .is_some_and(|n| n.starts_with('.') || n == "__pycache__")
}

/// Apply the loader's candidate rules to one directory entry.
fn module_candidate(file_name: &str, full_path: &Path) -> Option<String> {
    if file_name.starts_with('.') || full_path.is_dir() {
        return None;
    }
    if BLACKLIST_EXTS.iter().any(|ext| file_name.ends_with(ext)) {
        return None;
    }
    if file_name.starts_with("__") || IGNORE_FILES.contains(&file_name) {
        return None;
    }
    // `_foo` symlinks are aliases of live modules.
    if file_name.starts_with('_')
        && full_path
            .symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink())
    {
        return None;
    }

    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let name = stem.trim_start_matches('_');
    (!name.is_empty()).then(|| name.to_string())
}

/// Any entry in `dir` named `name` or `_name`, with whatever extension.
fn find_by_stem(dir: &Path, name: &str) -> Option<PathBuf> {
    let deprecated = format!("_{name}");
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem == name || stem == deprecated)
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_ROOT: &str = "../../../fixtures/ecosystem";

    fn fixture_ecosystem() -> FsEcosystem {
        let root = PathBuf::from(FIXTURE_ROOT);
        FsEcosystem::new(vec![root.join("modules")], vec![root.join("lookup")])
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn module_paths_include_subdirectories_in_order() {
        let eco = fixture_ecosystem();
        let paths = eco.module_paths().unwrap();

        let root = PathBuf::from(FIXTURE_ROOT).join("modules");
        assert_eq!(paths[0], root);
        assert!(paths.contains(&root.join("system")));
        assert!(paths.contains(&root.join("windows")));

        let mut sorted = paths[1..].to_vec();
        sorted.sort();
        assert_eq!(sorted, paths[1..].to_vec());
    }

    #[test]
    fn missing_roots_are_ignored() {
        let eco = FsEcosystem::new(vec![PathBuf::from("/definitely/not/here")], vec![]);
        assert!(eco.module_paths().unwrap().is_empty());
        assert!(eco.lookup_plugins().unwrap().is_empty());
    }

    #[test]
    fn overlapping_roots_are_listed_once() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("a/b")).unwrap();

        let eco = FsEcosystem::new(vec![tmp.path().into(), tmp.path().join("a")], vec![]);
        let paths = eco.module_paths().unwrap();
        assert_eq!(
            paths,
            vec![tmp.path().to_path_buf(), tmp.path().join("a"), tmp.path().join("a/b")]
        );
    }

    #[test]
    fn hidden_and_cache_dirs_are_not_searched() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(tmp.path().join("__pycache__")).unwrap();
        std::fs::create_dir_all(tmp.path().join("system")).unwrap();

        let eco = FsEcosystem::new(vec![tmp.path().into()], vec![]);
        let paths = eco.module_paths().unwrap();
        assert_eq!(paths, vec![tmp.path().to_path_buf(), tmp.path().join("system")]);
    }

    #[test]
    fn module_names_apply_candidate_rules() {
        let tmp = tempfile::tempdir().unwrap();
        for name in [
            "ping.py",
            "_old_module.py",
            "win_ping.ps1",
            "ping.pyc",
            "notes.txt",
            "README",
            "__init__.py",
            ".hidden.py",
            "backup~",
        ] {
            touch(&tmp.path().join(name));
        }
        std::fs::create_dir_all(tmp.path().join("package")).unwrap();

        let eco = FsEcosystem::new(vec![], vec![]);
        let names = eco.module_names(tmp.path());
        assert_eq!(names, vec!["old_module", "ping", "win_ping"]);
    }

    #[cfg(unix)]
    #[test]
    fn underscore_symlinks_are_aliases() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("package.py"));
        std::os::unix::fs::symlink(tmp.path().join("package.py"), tmp.path().join("_pkg.py"))
            .unwrap();

        let eco = FsEcosystem::new(vec![], vec![]);
        assert_eq!(eco.module_names(tmp.path()), vec!["package"]);
    }

    #[test]
    fn unreadable_path_yields_nothing() {
        let eco = FsEcosystem::new(vec![], vec![]);
        assert!(eco.module_names(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn resolve_prefers_primary_then_deprecated_then_any() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        touch(&first.join("copy.ps1"));
        touch(&second.join("copy.py"));
        touch(&first.join("_legacy.py"));
        touch(&second.join("win_only.ps1"));
        std::fs::create_dir_all(second.join("pkg")).unwrap();

        let eco = FsEcosystem::new(vec![], vec![]);
        let paths = vec![first.clone(), second.clone()];

        assert_eq!(eco.resolve_module("copy", &paths), Some(second.join("copy.py")));
        assert_eq!(eco.resolve_module("legacy", &paths), Some(first.join("_legacy.py")));
        assert_eq!(eco.resolve_module("win_only", &paths), Some(second.join("win_only.ps1")));
        assert_eq!(eco.resolve_module("pkg", &paths), Some(second.join("pkg")));
        assert_eq!(eco.resolve_module("missing", &paths), None);
    }

    #[test]
    fn lookup_plugins_sorted_per_directory() {
        let eco = fixture_ecosystem();
        let plugins = eco.lookup_plugins().unwrap();
        let names: Vec<_> = plugins
            .iter()
            .map(|p| p.original_path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["env.py", "file.py"]);
    }

    #[test]
    fn lookup_plugins_keep_duplicates_across_roots() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a/items.py"));
        touch(&tmp.path().join("b/items.py"));
        touch(&tmp.path().join("b/__init__.py"));

        let eco = FsEcosystem::new(vec![], vec![tmp.path().join("a"), tmp.path().join("b")]);
        let plugins = eco.lookup_plugins().unwrap();
        assert_eq!(
            plugins,
            vec![
                LookupPlugin::new(tmp.path().join("a/items.py")),
                LookupPlugin::new(tmp.path().join("b/items.py")),
            ]
        );
    }
}
