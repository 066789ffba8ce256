//! Breeding — Mendelian-style merge of two prompts into one offspring
//!
//! Each gene type is inherited whole from one parent. Dominant genes beat
//! recessive ones; when both parents are equally strong for a type, a fair
//! coin decides.

use super::{merge_unique, GeneticLab, LAB_AUTHOR};
use crate::genome::{Gene, Prompt, PromptDna};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters of each parent name used for a default offspring name
const NAME_PREFIX_CHARS: usize = 10;

/// Outcome of a single breeding event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingResult {
    pub offspring: Prompt,
    pub parent1_id: String,
    pub parent2_id: String,
    pub generation: u32,
    /// gene_type -> id of the parent that supplied it
    pub inherited_traits: BTreeMap<String, String>,
    /// Descriptions of emergent mutations
    pub novel_traits: Vec<String>,
}

impl BreedingResult {
    pub fn describe(&self) -> String {
        format!(
            "New Prompt Generated!\n\n\
             Name: {}\n\
             Generation: {}\n\
             Genome ID: {}\n\n\
             Parents:\n  - {}\n  - {}\n\n\
             Inherited Traits: {}\n\
             Novel Traits: {}\n\n\
             DNA Composition: {} genes",
            self.offspring.name,
            self.generation,
            self.offspring.genome_id(),
            self.parent1_id,
            self.parent2_id,
            self.inherited_traits.len(),
            self.novel_traits.len(),
            self.offspring.dna.len(),
        )
    }
}

impl<R: Rng> GeneticLab<R> {
    /// Breed two prompts into one offspring and record the event.
    ///
    /// `crossover_points` is accepted for interface stability; inheritance is
    /// decided per gene type, not by strand position.
    pub fn breed(
        &mut self,
        parent1: &Prompt,
        parent2: &Prompt,
        name: Option<&str>,
        crossover_points: usize,
    ) -> BreedingResult {
        let name = match name {
            Some(n) => n.to_string(),
            None => format!(
                "{}×{}",
                parent1.name.chars().take(NAME_PREFIX_CHARS).collect::<String>(),
                parent2.name.chars().take(NAME_PREFIX_CHARS).collect::<String>()
            ),
        };
        debug!(
            "Breeding '{}' x '{}' (crossover_points={})",
            parent1.id, parent2.id, crossover_points
        );

        let mut dna = PromptDna {
            genes: Vec::new(),
            generation: parent1.dna.generation.max(parent2.dna.generation).saturating_add(1),
            parents: vec![parent1.genome_id(), parent2.genome_id()],
        };
        let mut inherited_traits = BTreeMap::new();
        let mut novel_traits = Vec::new();

        // parent1's types first so a seeded rng replays identically
        let mut gene_types = parent1.dna.gene_types();
        for t in parent2.dna.gene_types() {
            if !gene_types.contains(&t) {
                gene_types.push(t);
            }
        }

        for gene_type in gene_types {
            let (chosen, source) = self.select_genes(parent1, parent2, gene_type);
            inherited_traits.insert(gene_type.to_string(), source.id.clone());
            dna.genes.extend(chosen.into_iter().cloned());
        }

        if !dna.is_empty() && self.rng.gen::<f64>() < self.config.mutation_rate {
            let idx = self.rng.gen_range(0..dna.len());
            let mutant = dna.genes[idx].mutate(self.config.mutation_rate);
            novel_traits.push(format!("Mutation: {}", mutant.name));
            dna.add_gene(mutant);
        }

        let generation = dna.generation;
        let mut offspring = Prompt::new(
            format!("{}_{}_f{}", parent1.id, parent2.id, generation),
            name,
            format!("Hybrid of {} and {}", parent1.name, parent2.name),
            parent1.category,
            parent1.tier.max(parent2.tier),
            dna,
        )
        .with_author(LAB_AUTHOR);
        offspring.tags = parent1.tags.union(&parent2.tags).cloned().collect();
        offspring.model_compatibility =
            merge_unique(&parent1.model_compatibility, &parent2.model_compatibility);

        info!(
            "Bred '{}' -> '{}' (generation {}, {} genes, {} novel)",
            parent1.id,
            offspring.id,
            generation,
            offspring.dna.len(),
            novel_traits.len()
        );

        let result = BreedingResult {
            offspring,
            parent1_id: parent1.id.clone(),
            parent2_id: parent2.id.clone(),
            generation,
            inherited_traits,
            novel_traits,
        };
        self.history.push(result.clone());
        result
    }

    /// Pick the genes of `gene_type` the offspring inherits, and from whom.
    fn select_genes<'p>(
        &mut self,
        parent1: &'p Prompt,
        parent2: &'p Prompt,
        gene_type: &'p str,
    ) -> (Vec<&'p Gene>, &'p Prompt) {
        let p1_genes: Vec<&Gene> = parent1.dna.genes_by_type(gene_type).collect();
        let p2_genes: Vec<&Gene> = parent2.dna.genes_by_type(gene_type).collect();
        let p1_dominant: Vec<&Gene> = p1_genes.iter().copied().filter(|g| g.dominant).collect();
        let p2_dominant: Vec<&Gene> = p2_genes.iter().copied().filter(|g| g.dominant).collect();

        match (p1_dominant.is_empty(), p2_dominant.is_empty()) {
            (false, false) => {
                if self.coin_flip() {
                    (p1_dominant, parent1)
                } else {
                    (p2_dominant, parent2)
                }
            }
            (false, true) => (p1_dominant, parent1),
            (true, false) => (p2_dominant, parent2),
            // no dominant genes on either side: fall back to recessive ones
            (true, true) => match (p1_genes.is_empty(), p2_genes.is_empty()) {
                (false, false) => {
                    if self.coin_flip() {
                        (p1_genes, parent1)
                    } else {
                        (p2_genes, parent2)
                    }
                }
                (false, true) => (p1_genes, parent1),
                _ => (p2_genes, parent2),
            },
        }
    }
}
