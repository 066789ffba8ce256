//! Genome — the genetic data model of a prompt
//!
//! A prompt is an organism whose DNA is an ordered strand of typed genes.
//! Everything here is plain owned data: copying a prompt copies its strand.

mod dna;
mod gene;
mod prompt;

pub use dna::{PromptDna, EXPRESSION_ORDER, GENOME_HASH_LEN};
pub use gene::Gene;
pub use prompt::{Category, Prompt, Tier, DEFAULT_AUTHOR, DEFAULT_VERSION};
