//! Markdown export of a single prompt

use crate::genome::Prompt;

/// Render a prompt as a standalone markdown document with frontmatter,
/// genetic metadata and the expressed prompt text.
pub fn render_markdown(prompt: &Prompt) -> String {
    let genome_id = prompt.genome_id();
    let tags: Vec<&str> = prompt.tags.iter().map(String::as_str).collect();
    let parents = if prompt.dna.parents.is_empty() {
        "Original".to_string()
    } else {
        prompt.dna.parents.join(", ")
    };

    format!(
        "---
version: {version}
created: {created}
updated: {updated}
category: {category}
tier: {tier}
author: {author}
tags: [{tags}]
model_compatibility: [{models}]
genome_id: {genome_id}
generation: {generation}
---

# {name}

## Description
{description}

## Genetic Information
- Genome ID: {genome_id}
- Generation: {generation}
- Genes: {genes}
- Parents: {parents}

## Prompt Content

{expressed}

---
Generated by PromptLab
",
        version = prompt.version,
        created = prompt.created.to_rfc3339(),
        updated = prompt.updated.to_rfc3339(),
        category = prompt.category,
        tier = prompt.tier,
        author = prompt.author,
        tags = tags.join(", "),
        models = prompt.model_compatibility.join(", "),
        genome_id = genome_id,
        generation = prompt.dna.generation,
        name = prompt.name,
        description = prompt.description,
        genes = prompt.dna.len(),
        parents = parents,
        expressed = prompt.dna.express(),
    )
}
