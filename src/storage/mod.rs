//! Prompt library — repository prompts plus the personal genome
//!
//! Repository prompts are parsed from category folders on disk. Anything the
//! user keeps (bred offspring, mutants, spliced prompts) goes into the
//! personal genome: a pretty-printed JSON array under the lab directory.

pub mod export;
pub mod parser;

use crate::config::LibraryConfig;
use crate::error::{LabError, Result};
use crate::genome::{Category, Prompt, Tier};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const PERSONAL_GENOME_FILE: &str = "personal_genome.json";

/// Repository folder -> category of the prompts inside it
pub const CATEGORY_DIRS: [(&str, Category); 5] = [
    ("simple", Category::Simple),
    ("work-prompts", Category::Work),
    ("agentic", Category::Agentic),
    ("stocks", Category::Stocks),
    ("fun", Category::Fun),
];

const SOURCE_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Filters for [`PromptLibrary::search`]. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Case-insensitive substring of name, description or any tag
    pub text: String,
    pub category: Option<Category>,
    pub tier: Option<Tier>,
    /// Match prompts carrying at least one of these tags
    pub tags: Vec<String>,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn matches(&self, prompt: &Prompt) -> bool {
        if !self.text.is_empty() {
            let needle = self.text.to_lowercase();
            let hit = prompt.name.to_lowercase().contains(&needle)
                || prompt.description.to_lowercase().contains(&needle)
                || prompt.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.category.is_some_and(|c| c != prompt.category) {
            return false;
        }
        if self.tier.is_some_and(|t| t != prompt.tier) {
            return false;
        }
        self.tags.is_empty() || self.tags.iter().any(|t| prompt.tags.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_prompts: usize,
    pub categories: BTreeMap<String, usize>,
    pub tiers: BTreeMap<String, usize>,
    pub total_genes: usize,
    pub avg_genes_per_prompt: f64,
}

pub struct PromptLibrary {
    prompts: HashMap<String, Prompt>,
    repo_path: PathBuf,
    lab_path: PathBuf,
}

impl PromptLibrary {
    /// Open a library, creating the lab directory if needed
    pub fn open(config: &LibraryConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.lab_path)?;
        Ok(Self {
            prompts: HashMap::new(),
            repo_path: config.repo_path.clone(),
            lab_path: config.lab_path.clone(),
        })
    }

    pub fn lab_path(&self) -> &Path {
        &self.lab_path
    }

    pub fn personal_genome_path(&self) -> PathBuf {
        self.lab_path.join(PERSONAL_GENOME_FILE)
    }

    /// Parse every prompt file in the repository's category folders.
    /// Files that fail to parse are logged and skipped.
    pub fn load_repository_prompts(&mut self) -> Result<usize> {
        let mut loaded = 0;
        for (dir_name, category) in CATEGORY_DIRS {
            let dir = self.repo_path.join(dir_name);
            if !dir.is_dir() {
                continue;
            }
            let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_prompt_source(p))
                .collect();
            paths.sort();

            for path in paths {
                match parser::parse_prompt_file(&path, category) {
                    Ok(prompt) => {
                        debug!("Loaded '{}' from {}", prompt.id, path.display());
                        self.prompts.insert(prompt.id.clone(), prompt);
                        loaded += 1;
                    }
                    Err(e) => warn!("Failed to load {}: {}", path.display(), e),
                }
            }
        }
        info!("Loaded {} repository prompts from {}", loaded, self.repo_path.display());
        Ok(loaded)
    }

    fn read_personal_genome(&self) -> Result<Vec<Prompt>> {
        let path = self.personal_genome_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Merge the saved personal genome into the library
    pub fn load_personal_genome(&mut self) -> Result<usize> {
        let saved = self.read_personal_genome()?;
        let count = saved.len();
        for prompt in saved {
            self.prompts.insert(prompt.id.clone(), prompt);
        }
        if count > 0 {
            info!("Loaded {} prompts from personal genome", count);
        }
        Ok(count)
    }

    /// Keep a prompt in memory and upsert it (by id) into the personal genome
    pub fn save_prompt(&mut self, prompt: &Prompt) -> Result<()> {
        let mut genome = self.read_personal_genome()?;
        match genome.iter_mut().find(|p| p.id == prompt.id) {
            Some(existing) => *existing = prompt.clone(),
            None => genome.push(prompt.clone()),
        }
        let path = self.personal_genome_path();
        std::fs::write(&path, serde_json::to_string_pretty(&genome)?)?;
        self.prompts.insert(prompt.id.clone(), prompt.clone());
        info!("Saved '{}' to {}", prompt.id, path.display());
        Ok(())
    }

    pub fn insert(&mut self, prompt: Prompt) {
        self.prompts.insert(prompt.id.clone(), prompt);
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.prompts.get(id)
    }

    /// Like [`get`](Self::get) but a missing id is an error
    pub fn require(&self, id: &str) -> Result<&Prompt> {
        self.get(id).ok_or_else(|| LabError::PromptNotFound(id.to_string()))
    }

    /// Matching prompts, sorted by name
    pub fn search(&self, query: &SearchQuery) -> Vec<&Prompt> {
        let mut results: Vec<&Prompt> = self.prompts.values().filter(|p| query.matches(p)).collect();
        results.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        results
    }

    pub fn list_all(&self) -> Vec<&Prompt> {
        self.search(&SearchQuery::default())
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn stats(&self) -> LibraryStats {
        let mut categories = BTreeMap::new();
        let mut tiers = BTreeMap::new();
        let mut total_genes = 0;
        for prompt in self.prompts.values() {
            *categories.entry(prompt.category.to_string()).or_insert(0) += 1;
            *tiers.entry(prompt.tier.to_string()).or_insert(0) += 1;
            total_genes += prompt.dna.len();
        }
        let total = self.prompts.len();
        LibraryStats {
            total_prompts: total,
            categories,
            tiers,
            total_genes,
            avg_genes_per_prompt: if total > 0 {
                total_genes as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Write a prompt's markdown export to `output`
    pub fn export_prompt(&self, id: &str, output: impl AsRef<Path>) -> Result<()> {
        let prompt = self.require(id)?;
        std::fs::write(output.as_ref(), export::render_markdown(prompt))?;
        info!("Exported '{}' to {}", id, output.as_ref().display());
        Ok(())
    }

    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "PromptLibrary '{}' | {} prompts | {} genes | avg {:.1} genes/prompt",
            self.repo_path.display(),
            stats.total_prompts,
            stats.total_genes,
            stats.avg_genes_per_prompt
        )
    }
}

fn is_prompt_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Gene, PromptDna};
    use tempfile::TempDir;

    fn setup() -> (TempDir, PromptLibrary) {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(repo.join("simple")).unwrap();
        std::fs::create_dir_all(repo.join("work-prompts")).unwrap();
        std::fs::write(
            repo.join("simple").join("explain-like-five.md"),
            "---\ntags: [teaching]\n---\n## System\nYou explain simply.\n## Instructions\nExplain the topic.\n",
        )
        .unwrap();
        std::fs::write(
            repo.join("work-prompts").join("standup.txt"),
            "---\ntier: premium\n---\nWrite my standup update.",
        )
        .unwrap();
        std::fs::write(repo.join("work-prompts").join("broken.md"), "---\ntier: gold\n---\nx").unwrap();
        std::fs::write(repo.join("work-prompts").join("notes.json"), "{}").unwrap();

        let config = LibraryConfig::new(&repo, dir.path().join("lab"));
        let library = PromptLibrary::open(&config).unwrap();
        (dir, library)
    }

    fn custom_prompt(id: &str) -> Prompt {
        let dna = PromptDna::from_genes(vec![
            Gene::dominant("sys", "You are a trader", "system"),
            Gene::recessive("ctx", "Markets", "context").mutate(0.2),
        ]);
        Prompt::new(id, "Trader", "Trading helper", Category::Stocks, Tier::Enterprise, dna)
            .with_tags(["finance"])
    }

    #[test]
    fn test_open_creates_lab_dir() {
        let (_dir, library) = setup();
        assert!(library.lab_path().is_dir());
        assert!(library.is_empty());
    }

    #[test]
    fn test_load_repository_prompts_skips_bad_files() {
        let (_dir, mut library) = setup();
        let loaded = library.load_repository_prompts().unwrap();
        assert_eq!(loaded, 2);
        assert!(library.get("broken").is_none());
        assert!(library.get("notes").is_none());

        let eli5 = library.require("explain-like-five").unwrap();
        assert_eq!(eli5.category, Category::Simple);
        assert_eq!(eli5.dna.len(), 2);
        let standup = library.require("standup").unwrap();
        assert_eq!(standup.category, Category::Work);
        assert_eq!(standup.tier, Tier::Premium);
    }

    #[test]
    fn test_require_missing_prompt() {
        let (_dir, library) = setup();
        let err = library.require("ghost").unwrap_err();
        assert!(matches!(err, LabError::PromptNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_personal_genome_roundtrip() {
        let (dir, mut library) = setup();
        let prompt = custom_prompt("trader");
        library.save_prompt(&prompt).unwrap();

        let config = LibraryConfig::new(dir.path().join("repo"), dir.path().join("lab"));
        let mut reopened = PromptLibrary::open(&config).unwrap();
        assert_eq!(reopened.load_personal_genome().unwrap(), 1);

        let restored = reopened.require("trader").unwrap();
        assert_eq!(restored, &prompt);
        assert_eq!(restored.genome_id(), prompt.genome_id());
        assert_eq!(restored.dna.genes[1].mutation_count, 1);
    }

    #[test]
    fn test_save_prompt_upserts_by_id() {
        let (_dir, mut library) = setup();
        let mut prompt = custom_prompt("trader");
        library.save_prompt(&prompt).unwrap();
        prompt.description = "Updated".into();
        library.save_prompt(&prompt).unwrap();
        library.save_prompt(&custom_prompt("other")).unwrap();

        let json = std::fs::read_to_string(library.personal_genome_path()).unwrap();
        let saved: Vec<Prompt> = serde_json::from_str(&json).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].description, "Updated");
    }

    #[test]
    fn test_personal_genome_with_naive_timestamps_loads() {
        let (_dir, mut library) = setup();
        let legacy = r#"[{
            "id": "old", "name": "Old", "description": "", "category": "fun", "tier": "free",
            "dna": {"genes": [{"name": "g", "sequence": "s", "gene_type": "system", "dominant": true, "mutations": 0}],
                    "generation": 1, "parents": []},
            "tags": [], "model_compatibility": ["all"], "version": "1.0.0",
            "created": "2024-05-01T10:00:00.123456", "updated": "2024-05-01T10:00:00.123456",
            "author": "PromptLab", "usage_count": 0, "effectiveness_score": 0.0
        }]"#;
        std::fs::write(library.personal_genome_path(), legacy).unwrap();
        assert_eq!(library.load_personal_genome().unwrap(), 1);
        assert_eq!(library.require("old").unwrap().category, Category::Fun);
    }

    #[test]
    fn test_corrupt_personal_genome_is_an_error() {
        let (_dir, mut library) = setup();
        std::fs::write(library.personal_genome_path(), "[{\"id\": 1}]").unwrap();
        assert!(matches!(library.load_personal_genome(), Err(LabError::Json(_))));
    }

    #[test]
    fn test_search_filters() {
        let (_dir, mut library) = setup();
        library.load_repository_prompts().unwrap();
        library.insert(custom_prompt("trader"));

        assert_eq!(library.list_all().len(), 3);
        assert_eq!(library.search(&SearchQuery::text("TEACH")).len(), 1);
        assert_eq!(library.search(&SearchQuery::text("trading")).len(), 1);

        let by_tier = SearchQuery {
            tier: Some(Tier::Premium),
            ..SearchQuery::default()
        };
        let hits = library.search(&by_tier);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "standup");

        let by_tags = SearchQuery {
            tags: vec!["finance".into(), "teaching".into()],
            ..SearchQuery::default()
        };
        assert_eq!(library.search(&by_tags).len(), 2);

        let by_category = SearchQuery {
            category: Some(Category::Fun),
            ..SearchQuery::default()
        };
        assert!(library.search(&by_category).is_empty());
    }

    #[test]
    fn test_stats() {
        let (_dir, mut library) = setup();
        library.load_repository_prompts().unwrap();
        let stats = library.stats();
        assert_eq!(stats.total_prompts, 2);
        assert_eq!(stats.total_genes, 3);
        assert!((stats.avg_genes_per_prompt - 1.5).abs() < 1e-12);
        assert_eq!(stats.categories["simple"], 1);
        assert_eq!(stats.tiers["premium"], 1);
        assert!(library.summary().contains("2 prompts | 3 genes | avg 1.5 genes/prompt"));
    }

    #[test]
    fn test_export_prompt() {
        let (dir, mut library) = setup();
        library.load_repository_prompts().unwrap();
        let out = dir.path().join("eli5.md");
        library.export_prompt("explain-like-five", &out).unwrap();
        let md = std::fs::read_to_string(&out).unwrap();
        assert!(md.contains("You explain simply.\n\nExplain the topic."));

        let missing = library.export_prompt("nope", dir.path().join("x.md"));
        assert!(matches!(missing, Err(LabError::PromptNotFound(_))));
    }
}
