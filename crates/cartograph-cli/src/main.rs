//! Cartograph CLI
//!
//! Command-line interface for:
//! - Resolving reference closures out of a corpus (`extract root` / `extract tag`)
//! - Building and inspecting `.cgr` corpus files (`corpus build` / `corpus info`)
//! - Managing resolution checkpoints (`checkpoint list|show|delete`)

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use regex::Regex;
use tracing_subscriber::EnvFilter;

use cartograph_checkpoint::{CheckpointStore, DirStore};
use cartograph_model::{EntityId, EntityKind, GraphSnapshot, RawEntity};
use cartograph_resolve::{resolve_root, resolve_selection, ResolvedGraph};
use cartograph_source::{corpus::corpus_stats, write_corpus, FileSource};

mod report;

use report::Report;

#[derive(Parser)]
#[command(name = "cartograph")]
#[command(
    author,
    version,
    about = "Reference-closure extraction over point/path/group corpora"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a closure and report its roots.
    Extract {
        #[command(subcommand)]
        command: ExtractCommands,
    },

    /// Build or inspect `.cgr` corpus files.
    Corpus {
        #[command(subcommand)]
        command: CorpusCommands,
    },

    /// Inspect or prune resolution checkpoints.
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommands,
    },
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Corpus file (`.cgr`)
    #[arg(long)]
    source: PathBuf,
    /// Checkpoint directory
    #[arg(long)]
    checkpoints: PathBuf,
    /// Selection name (checkpoint namespace; one writer per name)
    #[arg(long)]
    name: String,
    /// Resolution pass limit (0 = unlimited, 1 = no expansion)
    #[arg(long, default_value_t = 0)]
    passes: u32,
    /// Only report roots with a derivable display label
    #[arg(long)]
    labeled_only: bool,
    /// Write the full JSON report here
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ExtractCommands {
    /// Seed with one explicit id.
    Root {
        #[command(flatten)]
        args: ExtractArgs,
        /// Seed entity kind
        #[arg(long)]
        kind: EntityKindArg,
        /// Seed entity id
        #[arg(long)]
        id: EntityId,
    },
    /// Seed with every entity carrying a tag.
    Tag {
        #[command(flatten)]
        args: ExtractArgs,
        /// Tag key that must be present
        #[arg(long)]
        key: String,
        /// Regex the tag value must match (any value if omitted)
        #[arg(long)]
        value: Option<String>,
    },
}

#[derive(Subcommand)]
enum CorpusCommands {
    /// Compile a JSON document ({points, paths, groups}) into a corpus file.
    Build {
        /// Input JSON document
        #[arg(long)]
        from: PathBuf,
        /// Output corpus file
        #[arg(long)]
        out: PathBuf,
    },
    /// Per-kind entity counts.
    Info {
        /// Corpus file
        #[arg(long)]
        source: PathBuf,
    },
}

#[derive(Subcommand)]
enum CheckpointCommands {
    /// List checkpoint keys in a directory.
    List {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Summarize one checkpoint entry.
    Show {
        #[arg(long)]
        dir: PathBuf,
        name: String,
    },
    /// Delete a checkpoint entry (and, with --passes, its per-pass entries).
    Delete {
        #[arg(long)]
        dir: PathBuf,
        name: String,
        /// Also delete `<name>.passNNNN` entries
        #[arg(long)]
        passes: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum EntityKindArg {
    Point,
    Path,
    Group,
}

impl From<EntityKindArg> for EntityKind {
    fn from(arg: EntityKindArg) -> Self {
        match arg {
            EntityKindArg::Point => EntityKind::Point,
            EntityKindArg::Path => EntityKind::Path,
            EntityKindArg::Group => EntityKind::Group,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract { command } => match command {
            ExtractCommands::Root { args, kind, id } => extract_root(args, kind.into(), id),
            ExtractCommands::Tag { args, key, value } => extract_tag(args, key, value),
        },
        Commands::Corpus { command } => match command {
            CorpusCommands::Build { from, out } => corpus_build(from, out),
            CorpusCommands::Info { source } => corpus_info(source),
        },
        Commands::Checkpoint { command } => match command {
            CheckpointCommands::List { dir } => checkpoint_list(dir),
            CheckpointCommands::Show { dir, name } => checkpoint_show(dir, name),
            CheckpointCommands::Delete { dir, name, passes } => {
                checkpoint_delete(dir, name, passes)
            }
        },
    }
}

// ============================================================================
// extract
// ============================================================================

fn extract_root(args: ExtractArgs, kind: EntityKind, id: EntityId) -> Result<()> {
    let source = FileSource::new(&args.source);
    let store = DirStore::open(&args.checkpoints)?;

    let (graph, found) = resolve_root(&source, &store, &args.name, kind, id, args.passes)?;
    if !found {
        println!(
            "{} {kind} {id} is not present in the corpus",
            "warning:".yellow().bold()
        );
    }
    finish_extract(&args, &graph)
}

fn extract_tag(args: ExtractArgs, key: String, value: Option<String>) -> Result<()> {
    let source = FileSource::new(&args.source);
    let store = DirStore::open(&args.checkpoints)?;
    let value_re = value
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --value regex")?;

    let predicate = |raw: &RawEntity| match raw.tag(&key) {
        Some(v) => value_re.as_ref().map_or(true, |re| re.is_match(v)),
        None => false,
    };
    let graph = resolve_selection(&source, &store, &args.name, &predicate, args.passes)?;
    finish_extract(&args, &graph)
}

fn finish_extract(args: &ExtractArgs, graph: &ResolvedGraph) -> Result<()> {
    let report = Report::from_graph(&args.name, graph, args.labeled_only);
    print_summary(&report);

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(out, json).with_context(|| format!("writing report to {}", out.display()))?;
        println!("{} report written to {}", "ok:".green().bold(), out.display());
    }
    Ok(())
}

fn print_summary(report: &Report) {
    println!(
        "{} selection '{}': {} roots, {} unresolved ids",
        "cartograph".cyan().bold(),
        report.selection,
        report.total_roots(),
        report.total_missing(),
    );
    println!(
        "  complete: {} points, {} paths, {} groups",
        report.points.len(),
        report.paths.len(),
        report.groups.len()
    );
    if !report.broken_paths.is_empty() || !report.broken_groups.is_empty() {
        println!(
            "  {} {} paths, {} groups",
            "broken:".red().bold(),
            report.broken_paths.len(),
            report.broken_groups.len()
        );
    }
    for entry in report.groups.iter().chain(&report.broken_groups) {
        let label = entry.label.as_deref().unwrap_or("(unnamed)");
        println!(
            "    group {:>10}  {label}  [{}/{} members]",
            entry.id, entry.resolved, entry.refs
        );
    }
    if report.total_missing() > 0 {
        println!(
            "  missing ids: {} points, {} paths, {} groups",
            report.missing_point_ids.len(),
            report.missing_path_ids.len(),
            report.missing_group_ids.len()
        );
    }
}

// ============================================================================
// corpus
// ============================================================================

fn corpus_build(from: PathBuf, out: PathBuf) -> Result<()> {
    let text = fs::read_to_string(&from)
        .with_context(|| format!("reading corpus document {}", from.display()))?;
    let document: GraphSnapshot =
        serde_json::from_str(&text).context("parsing corpus document")?;
    let frames = write_corpus(&out, document.into_entities())?;
    println!(
        "{} wrote {} entities to {}",
        "ok:".green().bold(),
        frames,
        out.display()
    );
    Ok(())
}

fn corpus_info(source: PathBuf) -> Result<()> {
    let stats = corpus_stats(&source)?;
    println!("{} {}", "corpus".cyan().bold(), source.display());
    println!("  points: {}", stats.points);
    println!("  paths:  {}", stats.paths);
    println!("  groups: {}", stats.groups);
    println!("  total:  {}", stats.total());
    Ok(())
}

// ============================================================================
// checkpoint
// ============================================================================

fn checkpoint_list(dir: PathBuf) -> Result<()> {
    let store = DirStore::open(&dir)?;
    let names = store.list()?;
    if names.is_empty() {
        println!("no checkpoints under {}", dir.display());
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn checkpoint_show(dir: PathBuf, name: String) -> Result<()> {
    let store = DirStore::open(&dir)?;
    let Some(snapshot) = store.get::<GraphSnapshot>(&name)? else {
        println!("{} no checkpoint named '{name}'", "warning:".yellow().bold());
        return Ok(());
    };
    println!("{} {name}", "checkpoint".cyan().bold());
    println!(
        "  entities: {} points, {} paths, {} groups",
        snapshot.points.len(),
        snapshot.paths.len(),
        snapshot.groups.len()
    );
    println!(
        "  missing:  {} points, {} paths, {} groups",
        snapshot.missing_point_ids.len(),
        snapshot.missing_path_ids.len(),
        snapshot.missing_group_ids.len()
    );
    Ok(())
}

fn checkpoint_delete(dir: PathBuf, name: String, passes: bool) -> Result<()> {
    let store = DirStore::open(&dir)?;
    let mut removed = 0;
    if store.has(&name) {
        store.delete(&name)?;
        removed += 1;
    }
    if passes {
        let prefix = format!("{name}.pass");
        for key in store.list()? {
            if key.starts_with(&prefix) {
                store.delete(&key)?;
                removed += 1;
            }
        }
    }
    println!("{} removed {removed} entries", "ok:".green().bold());
    Ok(())
}
