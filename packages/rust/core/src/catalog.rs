//! Module path resolution and candidate cataloguing.

use std::collections::BTreeSet;
use std::path::PathBuf;

use ansible_data_discovery::PluginEcosystem;
use ansible_data_shared::Result;
use tracing::{debug, info, instrument};

/// Ordered directories that may hold module implementations.
///
/// Failures here are fatal for the run.
#[instrument(skip_all)]
pub fn resolve_plugin_paths(ecosystem: &dyn PluginEcosystem) -> Result<Vec<PathBuf>> {
    let paths = ecosystem.module_paths()?;
    debug!(count = paths.len(), "module search paths resolved");
    Ok(paths)
}

/// Collect candidate module names across `paths`.
///
/// A name found under several paths is listed once; the result is sorted
/// ascending so downstream iteration is deterministic.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn catalog_modules(ecosystem: &dyn PluginEcosystem, paths: &[PathBuf]) -> Vec<String> {
    let names: BTreeSet<String> = paths
        .iter()
        .flat_map(|path| ecosystem.module_names(path))
        .collect();

    info!(candidates = names.len(), "module catalog built");
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEcosystem;

    #[test]
    fn names_are_deduplicated_and_sorted() {
        let mut eco = FakeEcosystem::default();
        eco.paths = vec!["/a".into(), "/b".into(), "/empty".into()];
        eco.names.insert("/a".into(), vec!["yum".into(), "copy".into()]);
        eco.names.insert("/b".into(), vec!["copy".into(), "apt".into()]);

        let paths = resolve_plugin_paths(&eco).unwrap();
        assert_eq!(catalog_modules(&eco, &paths), vec!["apt", "copy", "yum"]);
    }

    #[test]
    fn no_paths_no_names() {
        let eco = FakeEcosystem::default();
        assert!(catalog_modules(&eco, &[]).is_empty());
    }

    #[test]
    fn path_failure_propagates() {
        let eco = FakeEcosystem {
            fail_paths: true,
            ..FakeEcosystem::default()
        };
        assert!(resolve_plugin_paths(&eco).is_err());
    }
}
