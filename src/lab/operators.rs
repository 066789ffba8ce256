//! Single-prompt and pairwise operators: mutate, splice, crossover

use super::{merge_unique, GeneticLab, LAB_AUTHOR};
use crate::error::{LabError, Result};
use crate::genome::{Gene, Prompt, PromptDna};
use chrono::Utc;
use log::{debug, info};
use rand::Rng;
use std::collections::BTreeSet;

impl<R: Rng> GeneticLab<R> {
    /// Create a mutated copy of `prompt`.
    ///
    /// `max(1, floor(genes × strength))` slots are drawn uniformly *with*
    /// replacement, so one slot can mutate several times in a single call.
    /// The generation advances by exactly one. `strength` must lie in
    /// `[0.0, 1.0]`; NaN and infinities are rejected.
    pub fn mutate(&mut self, prompt: &Prompt, strength: f64) -> Result<Prompt> {
        if prompt.dna.is_empty() {
            return Err(LabError::EmptyGenome);
        }
        if !(0.0..=1.0).contains(&strength) {
            return Err(LabError::InvalidArgument(format!(
                "mutation strength must be between 0.0 and 1.0 (got {strength})"
            )));
        }

        let mut mutant = prompt.clone();
        mutant.id = format!("{}_mutant", prompt.id);
        mutant.name = format!("{} (Mutant)", prompt.name);

        let gene_count = mutant.dna.len();
        let count = ((gene_count as f64 * strength).floor() as usize).max(1);
        for _ in 0..count {
            let idx = self.rng.gen_range(0..gene_count);
            let mutated = mutant.dna.genes[idx].mutate(strength);
            mutant.dna.genes[idx] = mutated;
        }

        mutant.dna.generation = mutant.dna.generation.saturating_add(1);
        mutant.updated = Utc::now();

        info!(
            "Mutated '{}' -> '{}' ({} mutation(s) across {} genes, generation {})",
            prompt.id, mutant.id, count, gene_count, mutant.dna.generation
        );
        Ok(mutant)
    }

    /// Replace `target`'s genes of the given types with every gene of those
    /// types from `donor`.
    ///
    /// The donor is recorded as an extra parent but the generation is left
    /// alone. Types the donor lacks simply drop out of the target.
    pub fn splice<S: AsRef<str>>(&self, target: &Prompt, donor: &Prompt, gene_types: &[S]) -> Prompt {
        let mut requested: Vec<&str> = Vec::with_capacity(gene_types.len());
        for t in gene_types {
            if !requested.contains(&t.as_ref()) {
                requested.push(t.as_ref());
            }
        }

        let mut spliced = target.clone();
        spliced.id = format!("{}_spliced", target.id);
        spliced.name = format!("{} (Enhanced)", target.name);
        spliced.description = format!("Spliced {} with genes from {}", target.name, donor.name);

        spliced.dna.genes.retain(|g| !requested.contains(&g.gene_type.as_str()));
        for gene_type in &requested {
            let imported: Vec<Gene> = donor.dna.genes_by_type(gene_type).cloned().collect();
            debug!("Splicing {} '{}' gene(s) from '{}'", imported.len(), gene_type, donor.id);
            spliced.dna.genes.extend(imported);
        }

        spliced.dna.parents.push(donor.genome_id());
        spliced.updated = Utc::now();

        info!(
            "Spliced [{}] from '{}' into '{}' -> '{}'",
            requested.join(", "),
            donor.id,
            target.id,
            spliced.id
        );
        spliced
    }

    /// Single-point crossover producing two complementary offspring.
    ///
    /// The split point is taken from `parent1`'s length; when the parents
    /// differ in size the exchange is not symmetric.
    pub fn crossover(&self, parent1: &Prompt, parent2: &Prompt, split_ratio: f64) -> (Prompt, Prompt) {
        let ratio = split_ratio.clamp(0.0, 1.0);
        let split = (parent1.dna.len() as f64 * ratio).floor() as usize;

        let (p1_head, p1_tail) = split_strand(&parent1.dna, split);
        let (p2_head, p2_tail) = split_strand(&parent2.dna, split);

        let generation = parent1.dna.generation.max(parent2.dna.generation).saturating_add(1);
        let parents = vec![parent1.genome_id(), parent2.genome_id()];
        let tags: BTreeSet<String> = parent1.tags.union(&parent2.tags).cloned().collect();
        let models = merge_unique(&parent1.model_compatibility, &parent2.model_compatibility);

        let build = |suffix: &str, head: &[Gene], tail: &[Gene], primary: &Prompt| {
            let dna = PromptDna {
                genes: head.iter().chain(tail).cloned().collect(),
                generation,
                parents: parents.clone(),
            };
            let mut child = Prompt::new(
                format!("{}_x{}_{}", parent1.id, parent2.id, suffix.to_lowercase()),
                format!("{}↔{} {}", parent1.name, parent2.name, suffix),
                format!("Crossover variant {}", suffix),
                primary.category,
                primary.tier,
                dna,
            )
            .with_author(LAB_AUTHOR);
            child.tags = tags.clone();
            child.model_compatibility = models.clone();
            child
        };

        let offspring_a = build("A", p1_head, p2_tail, parent1);
        let offspring_b = build("B", p2_head, p1_tail, parent2);

        info!(
            "Crossover '{}' x '{}' at {} -> '{}', '{}'",
            parent1.id, parent2.id, split, offspring_a.id, offspring_b.id
        );
        (offspring_a, offspring_b)
    }
}

/// Split a strand at `at`, clamping to its length
fn split_strand(dna: &PromptDna, at: usize) -> (&[Gene], &[Gene]) {
    dna.genes.split_at(at.min(dna.len()))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{prompt_one, prompt_two};
    use super::*;
    use crate::config::LabConfig;
    use crate::genome::{Category, Tier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lab() -> GeneticLab<StdRng> {
        GeneticLab::with_rng(LabConfig::default(), StdRng::seed_from_u64(42))
    }

    fn names(prompt: &Prompt) -> Vec<&str> {
        prompt.dna.genes.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_mutate_prompt() {
        let prompt = prompt_one();
        let mutant = lab().mutate(&prompt, 0.5).unwrap();

        assert_eq!(mutant.id, "prompt1_mutant");
        assert_eq!(mutant.name, "Prompt 1 (Mutant)");
        assert_eq!(mutant.dna.len(), prompt.dna.len());
        assert_eq!(mutant.dna.generation, 2);
        assert_eq!(prompt.dna.generation, 1);
    }

    #[test]
    fn test_mutate_changes_genes() {
        let prompt = prompt_one();
        let mutant = lab().mutate(&prompt, 0.3).unwrap();

        // floor(3 * 0.3) = 0, so exactly one mutation step happens
        let steps: u32 = mutant.dna.genes.iter().map(|g| g.mutation_count).sum();
        assert_eq!(steps, 1);
        assert_ne!(mutant.genome_id(), prompt.genome_id());
        assert!(prompt.dna.genes.iter().all(|g| g.mutation_count == 0));
    }

    #[test]
    fn test_mutate_budget_counts_with_replacement() {
        let prompt = prompt_one();
        let mut lab = lab();
        for strength in [0.1, 0.34, 0.67, 1.0] {
            let mutant = lab.mutate(&prompt, strength).unwrap();
            let expected = ((3.0 * strength).floor() as u32).max(1);
            let steps: u32 = mutant.dna.genes.iter().map(|g| g.mutation_count).sum();
            assert_eq!(steps, expected, "strength {strength}");
            assert_eq!(mutant.dna.generation, prompt.dna.generation + 1);
            assert_eq!(mutant.dna.len(), prompt.dna.len());
        }
    }

    #[test]
    fn test_mutate_preserves_types_and_dominance() {
        let prompt = prompt_two();
        let mutant = lab().mutate(&prompt, 1.0).unwrap();
        for (before, after) in prompt.dna.genes.iter().zip(&mutant.dna.genes) {
            assert_eq!(before.gene_type, after.gene_type);
            assert_eq!(before.dominant, after.dominant);
            assert!(after.sequence.starts_with(&before.sequence));
        }
    }

    #[test]
    fn test_mutate_empty_genome_fails() {
        let mut prompt = prompt_one();
        prompt.dna.genes.clear();
        let err = lab().mutate(&prompt, 0.5).unwrap_err();
        assert!(matches!(err, LabError::EmptyGenome));
        assert_eq!(err.to_string(), "cannot mutate empty genome");
    }

    #[test]
    fn test_mutate_rejects_out_of_range_strength() {
        let prompt = prompt_one();
        let mut lab = lab();
        for strength in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, -0.5, 1.5, 1.0e12] {
            let err = lab.mutate(&prompt, strength).unwrap_err();
            assert!(matches!(err, LabError::InvalidArgument(_)), "strength {strength}");
        }
    }

    #[test]
    fn test_mutate_zero_strength_still_mutates_once() {
        let mutant = lab().mutate(&prompt_one(), 0.0).unwrap();
        let steps: u32 = mutant.dna.genes.iter().map(|g| g.mutation_count).sum();
        assert_eq!(steps, 1);
    }

    #[test]
    fn test_generation_saturates_at_max() {
        let mut p1 = prompt_one();
        p1.dna.generation = u32::MAX;
        let mut lab = lab();
        assert_eq!(lab.mutate(&p1, 0.5).unwrap().dna.generation, u32::MAX);
        let (a, b) = lab.crossover(&p1, &prompt_two(), 0.5);
        assert_eq!((a.dna.generation, b.dna.generation), (u32::MAX, u32::MAX));
    }

    #[test]
    fn test_splice_genes() {
        let target = prompt_one();
        let donor = prompt_two();
        let spliced = lab().splice(&target, &donor, &["system"]);

        assert_eq!(spliced.id, "prompt1_spliced");
        assert_eq!(spliced.name, "Prompt 1 (Enhanced)");
        assert_eq!(names(&spliced), vec!["ctx1", "inst1", "sys2"]);
        assert_eq!(spliced.dna.generation, target.dna.generation);
        assert_eq!(spliced.dna.parents, vec![donor.genome_id()]);
        assert_eq!(spliced.description, "Spliced Prompt 1 with genes from Prompt 2");
    }

    #[test]
    fn test_splice_imports_recessive_donor_genes() {
        let mut donor = prompt_two();
        donor.dna.add_gene(Gene::dominant("ctx3", "Context C", "context"));
        let spliced = lab().splice(&prompt_one(), &donor, &["context".to_string()]);

        let contexts: Vec<&Gene> = spliced.dna.genes_by_type("context").collect();
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].name, "ctx2");
        assert!(!contexts[0].dominant);
        assert_eq!(contexts[1].name, "ctx3");
        assert!(spliced.dna.genes.iter().all(|g| g.name != "ctx1"));
    }

    #[test]
    fn test_splice_missing_type_is_noop_for_donor() {
        let target = prompt_one();
        let mut donor = prompt_two();
        donor.dna.genes.retain(|g| g.gene_type != "instructions");

        let spliced = lab().splice(&target, &donor, &["instructions", "examples"]);
        assert!(!spliced.dna.has_type("instructions"));
        assert_eq!(names(&spliced), vec!["sys1", "ctx1"]);
        assert_eq!(spliced.dna.parents.len(), target.dna.parents.len() + 1);
    }

    #[test]
    fn test_splice_duplicate_requests_import_once() {
        let spliced = lab().splice(&prompt_one(), &prompt_two(), &["system", "system"]);
        assert_eq!(spliced.dna.genes_by_type("system").count(), 1);
    }

    #[test]
    fn test_crossover_complementary_split() {
        let p1 = prompt_one();
        let mut p2 = prompt_two();
        p2.category = Category::Agentic;
        p2.tier = Tier::Premium;
        p2.dna.generation = 4;

        let (a, b) = lab().crossover(&p1, &p2, 0.5);

        // split = floor(3 * 0.5) = 1
        assert_eq!(names(&a), vec!["sys1", "ctx2", "inst2"]);
        assert_eq!(names(&b), vec!["sys2", "ctx1", "inst1"]);
        assert_eq!(a.id, "prompt1_xprompt2_a");
        assert_eq!(b.id, "prompt1_xprompt2_b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.dna.generation, 5);
        assert_eq!(b.dna.generation, 5);
        assert_eq!((a.category, a.tier), (Category::Simple, Tier::Free));
        assert_eq!((b.category, b.tier), (Category::Agentic, Tier::Premium));
        assert_eq!(a.model_compatibility, vec!["gpt-4", "claude-3"]);
        assert_eq!(a.dna.parents, vec![p1.genome_id(), p2.genome_id()]);
    }

    #[test]
    fn test_crossover_uneven_parents() {
        let mut p1 = prompt_one();
        p1.dna.add_gene(Gene::dominant("ex1", "Example", "examples"));
        p1.dna.add_gene(Gene::dominant("r1", "Think", "reasoning"));
        let p2 = prompt_two();

        // split = floor(5 * 0.8) = 4, beyond p2's three genes
        let (a, b) = lab().crossover(&p1, &p2, 0.8);
        assert_eq!(names(&a), vec!["sys1", "ctx1", "inst1", "ex1"]);
        assert_eq!(names(&b), vec!["sys2", "ctx2", "inst2", "r1"]);
        assert_eq!(a.dna.len() + b.dna.len(), p1.dna.len() + p2.dna.len());
    }

    #[test]
    fn test_crossover_does_not_touch_history() {
        let lab = lab();
        let _ = lab.crossover(&prompt_one(), &prompt_two(), 0.5);
        assert_eq!(lab.history_len(), 0);
    }
}
