//! Prompt — the full organism: metadata wrapped around a DNA strand

use super::PromptDna;
use crate::error::{LabError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_AUTHOR: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Simple,
    Work,
    Agentic,
    Stocks,
    Fun,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Simple,
        Category::Work,
        Category::Agentic,
        Category::Stocks,
        Category::Fun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Simple => "simple",
            Category::Work => "work",
            Category::Agentic => "agentic",
            Category::Stocks => "stocks",
            Category::Fun => "fun",
        }
    }
}

impl FromStr for Category {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LabError::InvalidCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = LabError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access tier. Ordered free < premium < enterprise via [`Tier::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tier {
    Free,
    Premium,
    Enterprise,
}

impl Tier {
    /// Tiers in ascending order
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Premium, Tier::Enterprise];

    pub fn rank(&self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::Premium => 1,
            Tier::Enterprise => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Number of steps between two tiers on the ordered scale
    pub fn distance(&self, other: Tier) -> u8 {
        self.rank().abs_diff(other.rank())
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl FromStr for Tier {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LabError::InvalidTier(s.to_string()))
    }
}

impl TryFrom<String> for Tier {
    type Error = LabError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Tier> for String {
    fn from(t: Tier) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prompt and its genetic code. Owns its strand outright, so `clone()`
/// yields a fully independent gene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub tier: Tier,
    pub dna: PromptDna,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub model_compatibility: Vec<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated: DateTime<Utc>,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub effectiveness_score: f64,
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` stamp read as UTC
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(stamp) => Ok(stamp.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc()),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

impl Prompt {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        tier: Tier,
        dna: PromptDna,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            tier,
            dna,
            tags: BTreeSet::new(),
            model_compatibility: Vec::new(),
            version: default_version(),
            created: now,
            updated: now,
            author: default_author(),
            usage_count: 0,
            effectiveness_score: 0.0,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_compatibility.extend(models.into_iter().map(Into::into));
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// `{id}_{genome_hash}`
    pub fn genome_id(&self) -> String {
        format!("{}_{}", self.id, self.dna.genome_hash())
    }

    /// Immediate ancestry recorded on the strand
    pub fn lineage(&self) -> &[String] {
        &self.dna.parents
    }

    /// Structural copy under a derived identity (`{id}_clone`, fresh `created`)
    pub fn duplicate(&self) -> Prompt {
        let mut copy = self.clone();
        copy.id = format!("{}_clone", self.id);
        copy.name = format!("{} (Clone)", self.name);
        copy.created = Utc::now();
        copy
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "Prompt '{}' | id={} | {} / {} | genes={} | gen={} | genome={}",
            self.name,
            self.id,
            self.category,
            self.tier,
            self.dna.len(),
            self.dna.generation,
            self.genome_id()
        )
    }
}
