//! PromptLab CLI — genetic prompt engineering from the terminal
//!
//! Commands:
//!   promptlab init       — load repository prompts and report
//!   promptlab list       — list prompts (filter by category/tier/text)
//!   promptlab inspect    — show a prompt's genetic structure
//!   promptlab express    — print or write the expressed prompt text
//!   promptlab breed      — breed two prompts
//!   promptlab mutate     — create a mutant
//!   promptlab splice     — splice gene types from a donor into a target
//!   promptlab crossover  — single-point crossover of two prompts
//!   promptlab compat     — compatibility report for two prompts
//!   promptlab stats      — library statistics
//!   promptlab lineage    — show a prompt's lineage
//!   promptlab export     — export a prompt to markdown

use clap::{ArgAction, Args, Parser, Subcommand};
use promptlab::storage::LibraryStats;
use promptlab::{
    Category, GeneticLab, LabConfig, LibraryConfig, Prompt, PromptLibrary, Result, SearchQuery,
    Tier,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn print_usage() {
    println!(
        r#"
PromptLab v{} — Genetic Prompt Engineering
Treat prompts like DNA: breed, mutate, splice, and evolve them.

Usage: promptlab <command> [options]

Commands:
  init                                               Load repository prompts
  list      [-c C] [-t T] [-s Q]                     List prompts
  inspect   <id>                                     Show genetic structure
  express   <id> [-o FILE]                           Express DNA as prompt text
  breed     <p1> <p2> [-n N] [--save] [--force]      Breed two prompts
  mutate    <id> [-s S] [--save]                     Create a mutant
  splice    <target> <donor> -g T [T...] [--save]    Splice genes from donor
  crossover <p1> <p2> [-r R] [--save]                Single-point crossover
  compat    <p1> <p2>                                Compatibility report
  stats                                              Library statistics
  lineage   <id> [-d D]                              Show lineage
  export    <id> <path>                              Export to markdown

Environment:
  PROMPTLAB_REPO   prompt repository root (default .)
  PROMPTLAB_HOME   lab directory (default .promptlab)
  RUST_LOG         log filter (default info)
"#,
        env!("CARGO_PKG_VERSION")
    );
}

#[derive(Parser, Debug)]
#[command(name = "promptlab", version, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load repository prompts
    Init,
    /// List prompts
    List {
        #[arg(short, long)]
        category: Option<Category>,
        #[arg(short, long)]
        tier: Option<Tier>,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a prompt's genetic structure
    Inspect { id: String },
    /// Express DNA as prompt text
    Express {
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Breed two prompts
    Breed {
        parent1: String,
        parent2: String,
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        save: SaveArgs,
        /// Breed even when compatibility is low
        #[arg(long)]
        force: bool,
    },
    /// Create a mutant
    Mutate {
        id: String,
        #[arg(short, long)]
        strength: Option<f64>,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Splice gene types from a donor into a target
    Splice {
        target: String,
        donor: String,
        #[arg(short, long, num_args = 1.., action = ArgAction::Append)]
        genes: Vec<String>,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Single-point crossover of two prompts
    Crossover {
        parent1: String,
        parent2: String,
        #[arg(short, long)]
        ratio: Option<f64>,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Compatibility report for two prompts
    Compat { first: String, second: String },
    /// Library statistics
    Stats,
    /// Show a prompt's lineage
    Lineage {
        id: String,
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Export a prompt to markdown
    Export { id: String, path: PathBuf },
    /// Show usage
    Help,
}

#[derive(Args, Debug, Clone, Copy)]
struct SaveArgs {
    /// Keep the result in the personal genome
    #[arg(long)]
    save: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        None | Some(Command::Help) => {
            print_usage();
            Ok(())
        }
        Some(Command::Init) => cmd_init(),
        Some(Command::List { category, tier, search }) => cmd_list(category, tier, search),
        Some(Command::Inspect { id }) => cmd_inspect(&id),
        Some(Command::Express { id, output }) => cmd_express(&id, output),
        Some(Command::Breed { parent1, parent2, name, save, force }) => {
            cmd_breed(&parent1, &parent2, name.as_deref(), save, force)
        }
        Some(Command::Mutate { id, strength, save }) => cmd_mutate(&id, strength, save),
        Some(Command::Splice { target, donor, genes, save }) => cmd_splice(&target, &donor, &genes, save),
        Some(Command::Crossover { parent1, parent2, ratio, save }) => {
            cmd_crossover(&parent1, &parent2, ratio, save)
        }
        Some(Command::Compat { first, second }) => cmd_compat(&first, &second),
        Some(Command::Stats) => cmd_stats(),
        Some(Command::Lineage { id, depth }) => cmd_lineage(&id, depth),
        Some(Command::Export { id, path }) => cmd_export(&id, &path),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("  Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Library with repository prompts and the personal genome loaded
fn load_library() -> Result<PromptLibrary> {
    let mut library = PromptLibrary::open(&LibraryConfig::from_env())?;
    library.load_repository_prompts()?;
    library.load_personal_genome()?;
    Ok(library)
}

fn new_lab(library: &PromptLibrary) -> GeneticLab {
    GeneticLab::new(LabConfig::load_or_default(library.lab_path()))
}

fn save_if_requested(library: &mut PromptLibrary, save: SaveArgs, prompt: &Prompt) -> Result<()> {
    if save.save {
        library.save_prompt(prompt)?;
        println!("\n  Saved to personal genome as: {}", prompt.id);
    }
    Ok(())
}

fn cmd_init() -> Result<()> {
    let mut library = PromptLibrary::open(&LibraryConfig::from_env())?;
    let loaded = library.load_repository_prompts()?;
    println!("  Loaded {} prompts", loaded);
    println!("  {}", library.summary());
    println!("  Lab directory: {}", library.lab_path().display());
    println!("\n  PromptLab initialized! Try: promptlab list");
    Ok(())
}

fn cmd_list(category: Option<Category>, tier: Option<Tier>, search: Option<String>) -> Result<()> {
    let query = SearchQuery {
        text: search.unwrap_or_default(),
        category,
        tier,
        tags: Vec::new(),
    };

    let library = load_library()?;
    let prompts = library.search(&query);
    if prompts.is_empty() {
        println!("\n  No prompts found matching criteria");
        return Ok(());
    }

    println!("\n  Prompt Library ({} prompts)", prompts.len());
    println!("  {}", "-".repeat(96));
    println!(
        "  {:<24} {:<32} {:<10} {:<12} {:>6} {:>5}",
        "ID", "Name", "Category", "Tier", "Genes", "Gen"
    );
    println!("  {}", "-".repeat(96));
    for p in prompts {
        println!(
            "  {:<24} {:<32} {:<10} {:<12} {:>6} {:>5}",
            truncate(&p.id, 24),
            truncate(&p.name, 32),
            p.category,
            p.tier,
            p.dna.len(),
            p.dna.generation
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn cmd_inspect(id: &str) -> Result<()> {
    let library = load_library()?;
    let prompt = library.require(id)?;

    let tags: Vec<&str> = prompt.tags.iter().map(String::as_str).collect();
    println!("\n  {}", prompt.name);
    println!("  {}", "=".repeat(60));
    println!("  Category:    {}", prompt.category);
    println!("  Tier:        {}", prompt.tier);
    println!("  Version:     {}", prompt.version);
    println!("  Author:      {}", prompt.author);
    println!("  Description: {}", prompt.description);
    println!("  Genome ID:   {}", prompt.genome_id());
    println!("  Generation:  {}", prompt.dna.generation);
    println!(
        "  Parents:     {}",
        if prompt.dna.parents.is_empty() { "Original".to_string() } else { prompt.dna.parents.join(", ") }
    );
    println!("  Tags:        {}", if tags.is_empty() { "None".to_string() } else { tags.join(", ") });
    println!("  Models:      {}", prompt.model_compatibility.join(", "));

    println!("\n  Genetic Structure");
    println!("  {}", "-".repeat(76));
    println!("  {:<16} {:<32} {:^8} {:>9} {:>7}", "Gene Type", "Name", "Dominant", "Mutations", "Length");
    for gene in &prompt.dna.genes {
        println!(
            "  {:<16} {:<32} {:^8} {:>9} {:>7}",
            gene.gene_type,
            truncate(&gene.name, 32),
            if gene.dominant { "yes" } else { "no" },
            gene.mutation_count,
            gene.sequence.chars().count()
        );
    }
    Ok(())
}

fn cmd_express(id: &str, output: Option<PathBuf>) -> Result<()> {
    let library = load_library()?;
    let prompt = library.require(id)?;
    let expressed = prompt.dna.express();

    match output {
        Some(path) => {
            std::fs::write(&path, &expressed)?;
            println!("  Prompt expressed to {}", path.display());
        }
        None => println!("{}", expressed),
    }
    Ok(())
}

fn print_compatibility(report: &promptlab::CompatibilityReport) {
    let mark = |b: bool| if b { "yes" } else { "no" };
    println!("  Compatibility Score:  {:.2}%", report.score * 100.0);
    println!("  Shared Gene Types:    {}", report.shared_gene_types.len());
    println!("  Category Match:       {}", mark(report.category_match));
    println!("  Tier Compatible:      {}", mark(report.tier_compatible));
    println!("  Breeding Recommended: {}", mark(report.breeding_recommended));
}

fn cmd_breed(id1: &str, id2: &str, name: Option<&str>, save: SaveArgs, force: bool) -> Result<()> {
    let mut library = load_library()?;
    let parent1 = library.require(id1)?.clone();
    let parent2 = library.require(id2)?.clone();

    let mut lab = new_lab(&library);
    let report = lab.analyze_compatibility(&parent1, &parent2);
    println!("\n  Analyzing genetic compatibility...\n");
    print_compatibility(&report);

    if !report.breeding_recommended && !force {
        println!("\n  Low compatibility; pass --force to breed anyway.");
        return Ok(());
    }

    let result = lab.breed(&parent1, &parent2, name, 1);
    println!("\n{}\n", result.describe());
    println!("{}", lab.visualize_lineage(&result.offspring, lab.config().lineage_depth));
    save_if_requested(&mut library, save, &result.offspring)
}

fn cmd_mutate(id: &str, strength: Option<f64>, save: SaveArgs) -> Result<()> {
    let mut library = load_library()?;
    let prompt = library.require(id)?.clone();

    let mut lab = new_lab(&library);
    let strength = strength.unwrap_or(lab.config().mutation_strength);
    let mutant = lab.mutate(&prompt, strength)?;

    println!("\n  Mutation complete!\n");
    println!("  Original: {}", prompt.name);
    println!("  Mutant:   {}", mutant.name);
    println!("  Mutation strength: {:.1}%", strength * 100.0);
    println!("  Genome:   {} -> {}", prompt.genome_id(), mutant.genome_id());
    save_if_requested(&mut library, save, &mutant)
}

fn cmd_splice(target_id: &str, donor_id: &str, genes: &[String], save: SaveArgs) -> Result<()> {
    let mut library = load_library()?;
    let target = library.require(target_id)?.clone();
    let donor = library.require(donor_id)?.clone();

    if genes.is_empty() {
        println!("  No gene types specified. Available types in donor:");
        for gene_type in donor.dna.gene_types() {
            println!("    - {}", gene_type);
        }
        return Ok(());
    }

    let lab = new_lab(&library);
    let spliced = lab.splice(&target, &donor, genes);

    println!("\n  Splice complete!\n");
    println!("  Target: {}", target.name);
    println!("  Donor:  {}", donor.name);
    println!("  Spliced genes: {}", genes.join(", "));
    save_if_requested(&mut library, save, &spliced)
}

fn cmd_crossover(id1: &str, id2: &str, ratio: Option<f64>, save: SaveArgs) -> Result<()> {
    let mut library = load_library()?;
    let parent1 = library.require(id1)?.clone();
    let parent2 = library.require(id2)?.clone();

    let lab = new_lab(&library);
    let ratio = ratio.unwrap_or(lab.config().split_ratio);
    let (a, b) = lab.crossover(&parent1, &parent2, ratio);

    println!("\n  Crossover complete!\n");
    println!("  {}", a.summary());
    println!("  {}", b.summary());
    save_if_requested(&mut library, save, &a)?;
    save_if_requested(&mut library, save, &b)
}

fn cmd_compat(id1: &str, id2: &str) -> Result<()> {
    let library = load_library()?;
    let first = library.require(id1)?;
    let second = library.require(id2)?;

    let report = new_lab(&library).analyze_compatibility(first, second);
    println!();
    print_compatibility(&report);
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    println!("  Shared:               {}", join(&report.shared_gene_types));
    println!("  Only in {}: {}", first.id, join(&report.unique_to_first));
    println!("  Only in {}: {}", second.id, join(&report.unique_to_second));
    Ok(())
}

fn print_stats(stats: &LibraryStats) {
    println!("\n  Library Statistics");
    println!("  {}", "=".repeat(40));
    println!("  Total Prompts:    {}", stats.total_prompts);
    println!("  Total Genes:      {}", stats.total_genes);
    println!("  Avg Genes/Prompt: {:.1}", stats.avg_genes_per_prompt);
    println!("\n  Categories:");
    for (category, count) in &stats.categories {
        println!("    • {}: {}", category, count);
    }
    println!("\n  Tiers:");
    for (tier, count) in &stats.tiers {
        println!("    • {}: {}", tier, count);
    }
}

fn cmd_stats() -> Result<()> {
    let library = load_library()?;
    print_stats(&library.stats());
    Ok(())
}

fn cmd_lineage(id: &str, depth: Option<usize>) -> Result<()> {
    let library = load_library()?;
    let prompt = library.require(id)?;

    let lab = new_lab(&library);
    let depth = depth.unwrap_or(lab.config().lineage_depth);
    println!("\n{}", lab.visualize_lineage(prompt, depth));
    Ok(())
}

fn cmd_export(id: &str, path: &Path) -> Result<()> {
    let library = load_library()?;
    library.export_prompt(id, path)?;
    println!("  Exported to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        let argv = std::iter::once("promptlab").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command.unwrap()
    }

    #[test]
    fn test_splice_genes_repeated_and_multi_value() {
        let repeated = parse(&["splice", "t", "d", "--genes", "system", "--genes", "context"]);
        let Command::Splice { target, donor, genes, save } = repeated else {
            panic!("expected splice");
        };
        assert_eq!((target.as_str(), donor.as_str()), ("t", "d"));
        assert_eq!(genes, vec!["system", "context"]);
        assert!(!save.save);

        let grouped = parse(&["splice", "t", "d", "-g", "system", "context", "--save"]);
        let Command::Splice { genes, save, .. } = grouped else {
            panic!("expected splice");
        };
        assert_eq!(genes, vec!["system", "context"]);
        assert!(save.save);
    }

    #[test]
    fn test_list_short_aliases_parse_enums() {
        let Command::List { category, tier, search } = parse(&["list", "-c", "work", "-t", "premium", "-s", "code"])
        else {
            panic!("expected list");
        };
        assert_eq!(category, Some(Category::Work));
        assert_eq!(tier, Some(Tier::Premium));
        assert_eq!(search.as_deref(), Some("code"));
    }

    #[test]
    fn test_invalid_tier_is_rejected() {
        let argv = ["promptlab", "list", "--tier", "platinum"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_breed_flags() {
        let Command::Breed { parent1, parent2, name, save, force } =
            parse(&["breed", "a", "b", "-n", "Kid", "--force"])
        else {
            panic!("expected breed");
        };
        assert_eq!((parent1.as_str(), parent2.as_str()), ("a", "b"));
        assert_eq!(name.as_deref(), Some("Kid"));
        assert!(force);
        assert!(!save.save);
    }

    #[test]
    fn test_numeric_options() {
        let Command::Mutate { strength, .. } = parse(&["mutate", "x", "-s", "0.5"]) else {
            panic!("expected mutate");
        };
        assert_eq!(strength, Some(0.5));
        let Command::Lineage { depth, .. } = parse(&["lineage", "x", "--depth", "2"]) else {
            panic!("expected lineage");
        };
        assert_eq!(depth, Some(2));
    }

    #[test]
    fn test_no_command_and_help() {
        let cli = Cli::try_parse_from(["promptlab"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(parse(&["help"]), Command::Help));
    }
}
