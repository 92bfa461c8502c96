//! Lookup plugin enumeration.

use std::path::Path;

use ansible_data_discovery::PluginEcosystem;
use ansible_data_shared::{LookupPluginIndex, Result};
use tracing::{info, instrument};

/// List every lookup plugin by display name, in loader order.
///
/// Duplicates yielded by the loader are kept.
#[instrument(skip_all)]
pub fn enumerate_lookup_plugins(ecosystem: &dyn PluginEcosystem) -> Result<LookupPluginIndex> {
    let names: LookupPluginIndex = ecosystem
        .lookup_plugins()?
        .iter()
        .map(|plugin| display_name(&plugin.original_path))
        .collect();

    info!(count = names.len(), "lookup plugins enumerated");
    Ok(names)
}

/// Final path segment without its extension.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use ansible_data_discovery::LookupPlugin;

    use super::*;
    use crate::testing::FakeEcosystem;

    #[test]
    fn names_keep_discovery_order() {
        let eco = FakeEcosystem {
            lookups: vec![
                LookupPlugin::new("/usr/lib/ansible/plugins/lookup/file.py"),
                LookupPlugin::new("/usr/lib/ansible/plugins/lookup/env.py"),
            ],
            ..FakeEcosystem::default()
        };

        assert_eq!(enumerate_lookup_plugins(&eco).unwrap(), vec!["file", "env"]);
    }

    #[test]
    fn duplicates_are_not_collapsed() {
        let eco = FakeEcosystem {
            lookups: vec![
                LookupPlugin::new("/a/lookup/items.py"),
                LookupPlugin::new("/b/lookup/items.py"),
            ],
            ..FakeEcosystem::default()
        };

        assert_eq!(enumerate_lookup_plugins(&eco).unwrap(), vec!["items", "items"]);
    }

    #[test]
    fn display_name_strips_only_last_extension() {
        assert_eq!(display_name(Path::new("/x/lookup/dig.py")), "dig");
        assert_eq!(display_name(Path::new("/x/lookup/cartesian.plugin.py")), "cartesian.plugin");
        assert_eq!(display_name(Path::new("/x/lookup/noext")), "noext");
    }
}
