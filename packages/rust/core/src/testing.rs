//! In-memory plugin ecosystem and doc parser for unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ansible_data_discovery::{DocParser, LookupPlugin, ParsedDoc, PluginEcosystem};
use ansible_data_shared::{AnsibleDataError, Result};

#[derive(Debug, Default)]
pub(crate) struct FakeEcosystem {
    pub paths: Vec<PathBuf>,
    pub names: HashMap<PathBuf, Vec<String>>,
    pub files: HashMap<String, PathBuf>,
    pub lookups: Vec<LookupPlugin>,
    pub fail_paths: bool,
}

impl FakeEcosystem {
    /// A single search path holding `modules`, each resolving to `<dir>/<name>.py`.
    pub fn with_modules(dir: &str, modules: &[&str]) -> Self {
        let dir = PathBuf::from(dir);
        let mut eco = Self {
            paths: vec![dir.clone()],
            ..Self::default()
        };
        eco.names
            .insert(dir.clone(), modules.iter().map(|m| m.to_string()).collect());
        for module in modules {
            eco.files
                .insert(module.to_string(), dir.join(format!("{module}.py")));
        }
        eco
    }
}

impl PluginEcosystem for FakeEcosystem {
    fn module_paths(&self) -> Result<Vec<PathBuf>> {
        if self.fail_paths {
            return Err(AnsibleDataError::Discovery("module paths unavailable".into()));
        }
        Ok(self.paths.clone())
    }

    fn module_names(&self, path: &Path) -> Vec<String> {
        self.names.get(path).cloned().unwrap_or_default()
    }

    fn resolve_module(&self, name: &str, _paths: &[PathBuf]) -> Option<PathBuf> {
        self.files.get(name).cloned()
    }

    fn lookup_plugins(&self) -> Result<Vec<LookupPlugin>> {
        Ok(self.lookups.clone())
    }
}

/// Doc parser answering from a table keyed by file path.
#[derive(Debug, Default)]
pub(crate) struct FakeParser {
    pub docs: HashMap<PathBuf, std::result::Result<serde_json::Value, String>>,
}

impl FakeParser {
    pub fn doc(mut self, path: impl Into<PathBuf>, fields: serde_json::Value) -> Self {
        self.docs.insert(path.into(), Ok(fields));
        self
    }

    pub fn failing(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.docs.insert(path.into(), Err(message.to_string()));
        self
    }
}

impl DocParser for FakeParser {
    fn parse(&self, path: &Path) -> Result<ParsedDoc> {
        match self.docs.get(path) {
            Some(Ok(serde_json::Value::Object(fields))) => Ok(ParsedDoc {
                fields: fields.clone(),
                examples: Some("- ping:".into()),
                returns: None,
            }),
            Some(Ok(_)) => Err(AnsibleDataError::parse("not a mapping")),
            Some(Err(message)) => Err(AnsibleDataError::parse(message.clone())),
            None => Err(AnsibleDataError::parse("no DOCUMENTATION block")),
        }
    }
}
