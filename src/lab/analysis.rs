//! Read-only analyses: compatibility scoring and lineage rendering

use super::{GeneticLab, BREEDING_THRESHOLD};
use crate::genome::Prompt;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const SHARED_WEIGHT: f64 = 0.5;
const CATEGORY_WEIGHT: f64 = 0.3;
const TIER_WEIGHT: f64 = 0.2;

/// Genetic compatibility of two prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// Weighted score in [0, 1]
    pub score: f64,
    pub shared_gene_types: BTreeSet<String>,
    pub unique_to_first: BTreeSet<String>,
    pub unique_to_second: BTreeSet<String>,
    pub category_match: bool,
    /// Tiers are at most one step apart
    pub tier_compatible: bool,
    pub breeding_recommended: bool,
}

impl CompatibilityReport {
    pub fn between(first: &Prompt, second: &Prompt) -> Self {
        let first_types: BTreeSet<String> =
            first.dna.gene_types().into_iter().map(String::from).collect();
        let second_types: BTreeSet<String> =
            second.dna.gene_types().into_iter().map(String::from).collect();

        let shared: BTreeSet<String> = first_types.intersection(&second_types).cloned().collect();
        let total = first_types.union(&second_types).count();
        let shared_ratio = if total > 0 {
            shared.len() as f64 / total as f64
        } else {
            0.0
        };

        let category_match = first.category == second.category;
        let tier_compatible = first.tier.distance(second.tier) <= 1;

        let mut score = SHARED_WEIGHT * shared_ratio;
        if category_match {
            score += CATEGORY_WEIGHT;
        }
        if tier_compatible {
            score += TIER_WEIGHT;
        }

        Self {
            score,
            unique_to_first: first_types.difference(&second_types).cloned().collect(),
            unique_to_second: second_types.difference(&first_types).cloned().collect(),
            shared_gene_types: shared,
            category_match,
            tier_compatible,
            breeding_recommended: score > BREEDING_THRESHOLD,
        }
    }
}

impl<R: Rng> GeneticLab<R> {
    pub fn analyze_compatibility(&self, first: &Prompt, second: &Prompt) -> CompatibilityReport {
        let report = CompatibilityReport::between(first, second);
        debug!(
            "Compatibility '{}' ~ '{}' = {:.3} (recommended={})",
            first.id, second.id, report.score, report.breeding_recommended
        );
        report
    }

    /// ASCII rendering of a prompt's immediate ancestry and gene makeup.
    ///
    /// Only direct parents are shown whatever `depth` is: parents are stored
    /// as genome ids, and the lab holds no collection to resolve them further.
    pub fn visualize_lineage(&self, prompt: &Prompt, depth: usize) -> String {
        debug!("Rendering lineage of '{}' (requested depth {})", prompt.id, depth);

        let mut lines = vec![
            format!("Lineage of: {}", prompt.name),
            format!("   Genome: {}", prompt.genome_id()),
            format!("   Generation: {}", prompt.dna.generation),
            String::new(),
        ];

        let parents = prompt.lineage();
        if !parents.is_empty() {
            lines.push("   Parents:".to_string());
            for (i, parent_id) in parents.iter().enumerate() {
                let glyph = if i + 1 < parents.len() { '├' } else { '└' };
                lines.push(format!("   {}── {}", glyph, parent_id));
            }
        }

        lines.push(String::new());
        lines.push(format!("   Genes: {}", prompt.dna.len()));
        for gene_type in prompt.dna.gene_types() {
            let count = prompt.dna.genes_by_type(gene_type).count();
            lines.push(format!("   • {}: {}", gene_type, count));
        }

        lines.join("\n")
    }
}
