//! End-to-end build: plugin paths → catalog → docs → directives → lookups → dataset file.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use ansible_data_discovery::{DocParser, PluginEcosystem};
use ansible_data_shared::{BuildConfig, Dataset, Result};

use crate::assembler::{self, AssembleResult};
use crate::catalog;
use crate::directives::{self, DIRECTIVE_OVERRIDES, ENTITY_KINDS};
use crate::extractor::{DocstringExtractor, SkippedModule};
use crate::lookups;

/// Result of a full build.
#[derive(Debug)]
pub struct BuildResult {
    /// Where the dataset was written.
    pub output_path: PathBuf,
    /// Modules documented in the dataset.
    pub module_count: usize,
    /// Modules left out, with reasons.
    pub skipped: Vec<SkippedModule>,
    pub directive_count: usize,
    pub lookup_plugin_count: usize,
    /// SHA-256 of the written file.
    pub sha256: String,
    pub size_bytes: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// An in-memory dataset plus the modules that did not make it.
#[derive(Debug)]
pub struct Collected {
    pub dataset: Dataset,
    pub skipped: Vec<SkippedModule>,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each catalogued module is processed.
    fn module_extracted(&self, name: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn module_extracted(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Build the dataset in memory without writing it.
///
/// 1. Resolve module paths and catalog module names
/// 2. Extract module documentation (per-module failures are skipped)
/// 3. Aggregate directives from the entity schemas
/// 4. Enumerate lookup plugins
#[instrument(skip_all, fields(excluded = exclude.len()))]
pub fn collect_dataset(
    ecosystem: &dyn PluginEcosystem,
    parser: &dyn DocParser,
    exclude: &[String],
    progress: &dyn ProgressReporter,
) -> Result<Collected> {
    // --- Phase 1: Catalog ---
    progress.phase("Resolving module paths");
    let paths = catalog::resolve_plugin_paths(ecosystem)?;
    let names = catalog::catalog_modules(ecosystem, &paths);

    // --- Phase 2: Module docs ---
    progress.phase("Extracting module documentation");
    let extractor = DocstringExtractor::new(ecosystem, parser, &paths, exclude);
    let extraction = extractor.extract_all(&names, |name, current, total| {
        progress.module_extracted(name, current, total);
    });

    // --- Phase 3: Directives ---
    progress.phase("Aggregating directives");
    let directives = directives::aggregate_directives(&ENTITY_KINDS, &DIRECTIVE_OVERRIDES);

    // --- Phase 4: Lookups ---
    progress.phase("Enumerating lookup plugins");
    let lookup_plugins = lookups::enumerate_lookup_plugins(ecosystem)?;

    Ok(Collected {
        dataset: assembler::assemble(extraction.modules, directives, lookup_plugins),
        skipped: extraction.skipped,
    })
}

/// Run the full build and write the dataset to `config.output_path`.
#[instrument(skip_all, fields(output = %config.output_path.display()))]
pub fn build_dataset(
    ecosystem: &dyn PluginEcosystem,
    parser: &dyn DocParser,
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!("starting dataset build");

    let Collected { dataset, skipped } =
        collect_dataset(ecosystem, parser, &config.exclude_modules, progress)?;

    // --- Phase 5: Assemble ---
    progress.phase("Writing dataset");
    let AssembleResult {
        output_path,
        sha256,
        size_bytes,
    } = assembler::write_dataset(&config.output_path, &dataset)?;

    let result = BuildResult {
        output_path,
        module_count: dataset.modules.len(),
        skipped,
        directive_count: dataset.directives.len(),
        lookup_plugin_count: dataset.lookup_plugins.len(),
        sha256,
        size_bytes,
        elapsed: start.elapsed(),
    };

    info!(
        modules = result.module_count,
        skipped = result.skipped.len(),
        directives = result.directive_count,
        lookups = result.lookup_plugin_count,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "dataset build complete"
    );

    progress.done(&result);
    Ok(result)
}
