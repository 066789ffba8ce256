//! Gene — the atomic, typed text fragment of a prompt
//!
//! A gene is one component of a prompt: a system instruction, a context block,
//! a constraint, an output format. Genes are never edited in place; mutation
//! produces a new gene one step further down the variation chain.

use log::trace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    /// The text payload
    pub sequence: String,
    /// Open category tag (system, context, instructions, ...)
    pub gene_type: String,
    /// Dominant genes win over recessive ones during expression and breeding
    pub dominant: bool,
    /// Number of mutation steps between this gene and its unmutated ancestor
    #[serde(rename = "mutations", default)]
    pub mutation_count: u32,
}

impl Gene {
    pub fn new(
        name: impl Into<String>,
        sequence: impl Into<String>,
        gene_type: impl Into<String>,
        dominant: bool,
    ) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            gene_type: gene_type.into(),
            dominant,
            mutation_count: 0,
        }
    }

    pub fn dominant(
        name: impl Into<String>,
        sequence: impl Into<String>,
        gene_type: impl Into<String>,
    ) -> Self {
        Self::new(name, sequence, gene_type, true)
    }

    pub fn recessive(
        name: impl Into<String>,
        sequence: impl Into<String>,
        gene_type: impl Into<String>,
    ) -> Self {
        Self::new(name, sequence, gene_type, false)
    }

    /// Produce the next variation of this gene.
    ///
    /// The sequence only ever grows: a numbered variation marker is appended.
    /// `strength` does not influence the result.
    pub fn mutate(&self, strength: f64) -> Gene {
        let n = self.mutation_count.saturating_add(1);
        trace!("Mutating gene '{}' -> variation {} (strength={:.2})", self.name, n, strength);
        Gene {
            name: format!("{}_m{}", self.name, n),
            sequence: format!("{}\n\n[VARIATION {}]", self.sequence, n),
            gene_type: self.gene_type.clone(),
            dominant: self.dominant,
            mutation_count: n,
        }
    }
}

impl std::fmt::Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Gene({}, type={}, dominant={})",
            self.name, self.gene_type, self.dominant
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gene_starts_unmutated() {
        let gene = Gene::dominant("sys", "You are helpful", "system");
        assert_eq!(gene.mutation_count, 0);
        assert!(gene.dominant);
        assert!(!Gene::recessive("ctx", "Context", "context").dominant);
    }

    #[test]
    fn test_mutate_produces_new_gene() {
        let gene = Gene::recessive("ctx", "Context A", "context");
        let mutant = gene.mutate(0.5);

        assert_eq!(mutant.name, "ctx_m1");
        assert_eq!(mutant.sequence, "Context A\n\n[VARIATION 1]");
        assert_eq!(mutant.mutation_count, 1);
        assert_eq!(mutant.gene_type, "context");
        assert!(!mutant.dominant);
        // original untouched
        assert_eq!(gene.mutation_count, 0);
        assert_eq!(gene.sequence, "Context A");
    }

    #[test]
    fn test_mutation_chain_counts_steps() {
        let mut gene = Gene::dominant("inst", "Do the task", "instructions");
        for _ in 0..3 {
            gene = gene.mutate(0.1);
        }
        assert_eq!(gene.mutation_count, 3);
        assert_eq!(gene.name, "inst_m1_m2_m3");
        assert!(gene.sequence.starts_with("Do the task"));
        assert!(gene.sequence.ends_with("[VARIATION 3]"));
    }

    #[test]
    fn test_mutation_count_serialized_as_mutations() {
        let gene = Gene::dominant("sys", "text", "system").mutate(0.2);
        let json = serde_json::to_string(&gene).unwrap();
        assert!(json.contains("\"mutations\":1"));

        let legacy = r#"{"name":"a","sequence":"b","gene_type":"system","dominant":true}"#;
        let parsed: Gene = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.mutation_count, 0);
    }
}
