//! PromptDna — the ordered gene strand of a prompt
//!
//! Gene order matters: it drives both the expressed text and the genome hash.
//! The strand also carries the lineage bookkeeping (generation + parent ids).

use super::Gene;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Order in which gene categories are assembled into the expressed prompt.
/// Types outside this table are kept in the strand but never expressed.
pub const EXPRESSION_ORDER: [&str; 7] = [
    "system",
    "context",
    "instructions",
    "constraints",
    "output_format",
    "reasoning",
    "examples",
];

/// Hex characters kept from the strand digest
pub const GENOME_HASH_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDna {
    #[serde(default)]
    pub genes: Vec<Gene>,
    #[serde(default = "first_generation")]
    pub generation: u32,
    /// Genome ids of the strands this one was derived from
    #[serde(default)]
    pub parents: Vec<String>,
}

fn first_generation() -> u32 {
    1
}

impl Default for PromptDna {
    fn default() -> Self {
        Self {
            genes: Vec::new(),
            generation: first_generation(),
            parents: Vec::new(),
        }
    }
}

impl PromptDna {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an original (ancestor-free) strand
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            ..Self::default()
        }
    }

    pub fn add_gene(&mut self, gene: Gene) {
        self.genes.push(gene);
    }

    pub fn genes_by_type<'a>(&'a self, gene_type: &'a str) -> impl Iterator<Item = &'a Gene> + 'a {
        self.genes.iter().filter(move |g| g.gene_type == gene_type)
    }

    pub fn has_type(&self, gene_type: &str) -> bool {
        self.genes.iter().any(|g| g.gene_type == gene_type)
    }

    /// Distinct gene types in order of first appearance
    pub fn gene_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for gene in &self.genes {
            if !types.contains(&gene.gene_type.as_str()) {
                types.push(&gene.gene_type);
            }
        }
        types
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Express the strand as prompt text (genotype -> phenotype).
    ///
    /// Categories are emitted in [`EXPRESSION_ORDER`]. Within a category the
    /// dominant genes are used when there are any, otherwise every gene of
    /// that type.
    pub fn express(&self) -> String {
        let mut expressed: Vec<&str> = Vec::new();
        for gene_type in EXPRESSION_ORDER {
            let genes: Vec<&Gene> = self.genes_by_type(gene_type).collect();
            if genes.is_empty() {
                continue;
            }
            let any_dominant = genes.iter().any(|g| g.dominant);
            expressed.extend(
                genes
                    .iter()
                    .filter(|g| !any_dominant || g.dominant)
                    .map(|g| g.sequence.as_str()),
            );
        }
        expressed.join("\n\n")
    }

    /// Content fingerprint over every gene sequence in strand order.
    /// Not a security primitive; short-width collisions are tolerated.
    pub fn genome_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for gene in &self.genes {
            hasher.update(gene.sequence.as_bytes());
        }
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(GENOME_HASH_LEN);
        digest
    }
}
