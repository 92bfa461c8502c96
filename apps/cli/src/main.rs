//! ansible-data CLI — generates the Ansible completion dataset.
//!
//! Scans installed modules and lookup plugins, merges entity directive
//! schemas, and writes `ansible-data.json` for editor tooling.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
