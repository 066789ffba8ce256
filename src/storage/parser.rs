//! Prompt source parser
//!
//! Turns a markdown / tagged prompt file into a [`Prompt`]. Files may open
//! with a `---` frontmatter block of `key: value` lines; the body is split
//! into sections at `## Heading` lines or `<Tag>` lines, and every section
//! becomes one gene.

use crate::error::{LabError, Result};
use crate::genome::{Category, Gene, Prompt, PromptDna, Tier};
use std::collections::HashMap;
use std::path::Path;

const FRONTMATTER_DELIMITER: &str = "---";
const FALLBACK_SECTION: &str = "Instructions";

/// A frontmatter value: scalar or `[a, b, c]` list
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

impl MetaValue {
    fn as_scalar(&self) -> Option<&str> {
        match self {
            MetaValue::Scalar(s) => Some(s),
            MetaValue::List(_) => None,
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            MetaValue::Scalar(s) if s.is_empty() => Vec::new(),
            MetaValue::Scalar(s) => vec![s],
            MetaValue::List(items) => items,
        }
    }
}

/// Map a section heading to a gene type
pub fn gene_type_for_section(section: &str) -> &'static str {
    match section.to_lowercase().as_str() {
        "system" | "role" => "system",
        "context" | "description" | "use case" => "context",
        "instructions" => "instructions",
        "constraints" | "tips" => "constraints",
        "output format" | "output_format" => "output_format",
        "reasoning" => "reasoning",
        "example" => "examples",
        _ => "instructions",
    }
}

/// Split off a leading `---` frontmatter block. Returns the parsed metadata
/// and the remaining body.
pub fn split_frontmatter(content: &str) -> (HashMap<String, MetaValue>, &str) {
    let mut metadata = HashMap::new();
    let Some(rest) = content.strip_prefix(FRONTMATTER_DELIMITER) else {
        return (metadata, content);
    };
    let Some((header, body)) = rest.split_once(&format!("\n{FRONTMATTER_DELIMITER}")) else {
        return (metadata, content);
    };

    for line in header.trim().lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let parsed = match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            Some(inner) => MetaValue::List(
                inner
                    .split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect(),
            ),
            None => MetaValue::Scalar(value.to_string()),
        };
        metadata.insert(key.trim().to_string(), parsed);
    }
    (metadata, body)
}

/// `<Tag>` at the start of a line -> `Tag`
fn tag_section(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('<')?;
    let end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_'))?;
    if end == 0 || !rest[end..].starts_with('>') {
        return None;
    }
    Some(&rest[..end])
}

/// Split a body into `(section name, content)` pairs in order of first
/// appearance. A repeated heading replaces the earlier content in place.
pub fn parse_sections(content: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();

    fn flush(sections: &mut Vec<(String, String)>, name: String, body: String) {
        match sections.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = body,
            None => sections.push((name, body)),
        }
    }

    for line in content.lines() {
        let heading = if line.starts_with("##") {
            Some(line.trim_matches('#').trim())
        } else {
            tag_section(line)
        };

        match heading {
            Some(name) => {
                if let Some(prev) = current.take() {
                    flush(&mut sections, prev, buffer.join("\n"));
                }
                current = Some(name.to_string());
                buffer.clear();
            }
            None if current.is_some() => buffer.push(line),
            None => {}
        }
    }
    if let Some(prev) = current {
        flush(&mut sections, prev, buffer.join("\n"));
    }

    if sections.is_empty() {
        sections.push((FALLBACK_SECTION.to_string(), content.to_string()));
    }
    sections
}

/// `code-review-helper` -> `Code Review Helper`
fn title_case(stem: &str) -> String {
    stem.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Build a prompt from the text of a source file. `stem` becomes the id.
pub fn parse_prompt(stem: &str, content: &str, category: Category) -> Result<Prompt> {
    let (mut metadata, body) = split_frontmatter(content);
    let sections = parse_sections(body);

    let mut dna = PromptDna::new();
    if body.trim().is_empty() {
        dna.add_gene(Gene::dominant(format!("{stem}_main"), "", "instructions"));
    } else {
        for (section, text) in &sections {
            let gene_type = gene_type_for_section(section);
            dna.add_gene(Gene::new(
                format!("{}_{}", stem, section.replace(' ', "_")),
                text.trim(),
                gene_type,
                matches!(gene_type, "system" | "instructions"),
            ));
        }
    }

    let tier = match metadata.get("tier").and_then(MetaValue::as_scalar) {
        Some(value) => value.parse::<Tier>()?,
        None => Tier::Free,
    };
    let scalar = |metadata: &HashMap<String, MetaValue>, key: &str| {
        metadata.get(key).and_then(MetaValue::as_scalar).map(str::to_string)
    };

    let description = sections
        .iter()
        .find(|(name, _)| name == "Description")
        .map(|(_, text)| text.trim().to_string())
        .or_else(|| scalar(&metadata, "description"))
        .unwrap_or_else(|| "No description".to_string());

    let mut prompt = Prompt::new(
        stem,
        scalar(&metadata, "name").unwrap_or_else(|| title_case(stem)),
        description,
        category,
        tier,
        dna,
    );
    if let Some(version) = scalar(&metadata, "version") {
        prompt.version = version;
    }
    if let Some(author) = scalar(&metadata, "author") {
        prompt.author = author;
    }
    prompt.tags = metadata
        .remove("tags")
        .map(MetaValue::into_list)
        .unwrap_or_default()
        .into_iter()
        .collect();
    prompt.model_compatibility = metadata
        .remove("model_compatibility")
        .map(MetaValue::into_list)
        .unwrap_or_else(|| vec!["all".to_string()]);

    Ok(prompt)
}

/// Read and parse a prompt file; the file stem becomes the prompt id.
pub fn parse_prompt_file(path: &Path, category: Category) -> Result<Prompt> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LabError::Parse {
            path: path.to_path_buf(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;
    let content = std::fs::read_to_string(path)?;
    parse_prompt(stem, &content, category)
}
