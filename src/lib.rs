//! PromptLab — genetic prompt engineering
//!
//! Prompts are treated as organisms: a DNA strand of typed genes that can be
//! bred, mutated, spliced and crossed over, with lineage tracked by content
//! hash from one generation to the next.

pub mod config;
pub mod error;
pub mod genome;
pub mod lab;
pub mod storage;

pub use config::{LabConfig, LibraryConfig};
pub use error::{LabError, Result};
pub use genome::{Category, Gene, Prompt, PromptDna, Tier};
pub use lab::{BreedingResult, CompatibilityReport, GeneticLab};
pub use storage::{PromptLibrary, SearchQuery};
