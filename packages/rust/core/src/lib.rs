//! Dataset generation for ansible-data.
//!
//! This crate ties together module cataloguing, documentation extraction,
//! directive aggregation and lookup enumeration into one build
//! ([`pipeline::build_dataset`]).

pub mod assembler;
pub mod catalog;
pub mod directives;
pub mod extractor;
pub mod lookups;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;
