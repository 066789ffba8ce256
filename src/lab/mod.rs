//! GeneticLab — breeding, mutation, splicing and crossover of prompts
//!
//! The lab never touches the filesystem. It takes prompts by reference,
//! clones whatever it transforms, and hands back new values. The only state
//! it keeps is its random source and an append-only breeding log.
//!
//! Randomness is injected: `GeneticLab::new` seeds a `StdRng` from
//! [`LabConfig::seed`], and `GeneticLab::with_rng` accepts any `Rng` so tests
//! can replay a run exactly.

mod analysis;
mod breeding;
mod operators;

pub use analysis::CompatibilityReport;
pub use breeding::BreedingResult;

use crate::config::LabConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Author recorded on every prompt the lab creates
pub const LAB_AUTHOR: &str = "PromptLab Genetics";

/// Compatibility score above which breeding is recommended
pub const BREEDING_THRESHOLD: f64 = 0.4;

pub struct GeneticLab<R: Rng = StdRng> {
    config: LabConfig,
    rng: R,
    history: Vec<BreedingResult>,
}

impl GeneticLab<StdRng> {
    pub fn new(config: LabConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Lab with the given breeding mutation rate and default everything else
    pub fn with_mutation_rate(mutation_rate: f64) -> Self {
        Self::new(LabConfig {
            mutation_rate,
            ..LabConfig::default()
        })
    }
}

impl Default for GeneticLab<StdRng> {
    fn default() -> Self {
        Self::new(LabConfig::default())
    }
}

impl<R: Rng> GeneticLab<R> {
    pub fn with_rng(config: LabConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn mutation_rate(&self) -> f64 {
        self.config.mutation_rate
    }

    /// Every breeding result produced by this lab, oldest first
    pub fn history(&self) -> &[BreedingResult] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Fair coin: `true` picks the first option
    fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Union of two lists, first-seen order, no duplicates
fn merge_unique(a: &[String], b: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(a.len() + b.len());
    for item in a.iter().chain(b) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::genome::{Category, Gene, Prompt, PromptDna, Tier};

    pub fn prompt_one() -> Prompt {
        let mut dna = PromptDna::new();
        dna.add_gene(Gene::dominant("sys1", "You are helpful", "system"));
        dna.add_gene(Gene::dominant("ctx1", "Context A", "context"));
        dna.add_gene(Gene::dominant("inst1", "Do task A", "instructions"));
        Prompt::new("prompt1", "Prompt 1", "Test prompt 1", Category::Simple, Tier::Free, dna)
            .with_models(["gpt-4"])
    }

    pub fn prompt_two() -> Prompt {
        let mut dna = PromptDna::new();
        dna.add_gene(Gene::dominant("sys2", "You are an expert", "system"));
        dna.add_gene(Gene::recessive("ctx2", "Context B", "context"));
        dna.add_gene(Gene::dominant("inst2", "Do task B", "instructions"));
        Prompt::new("prompt2", "Prompt 2", "Test prompt 2", Category::Simple, Tier::Free, dna)
            .with_models(["claude-3"])
    }
}
