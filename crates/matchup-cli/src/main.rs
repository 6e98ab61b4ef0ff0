use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use matchup_core::config::Config;
use matchup_core::export;
use matchup_core::graph::GraphStore;
use matchup_core::ops;
use matchup_core::source;

#[derive(Parser)]
#[command(name = "matchup")]
#[command(about = "Graph ingestion and matchup synthesis toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare schema constraints on the store
    Bootstrap,
    /// Load archetype and mechanic baselines
    IngestFoundations {
        /// Path to the archetypes YAML
        #[arg(short, long)]
        archetypes: Option<PathBuf>,
        /// Path to the mechanics YAML
        #[arg(short, long)]
        mechanics: Option<PathBuf>,
        /// Skip store writes
        #[arg(long)]
        dry_run: bool,
    },
    /// Checkpoint and ingest a single character profile
    IngestCharacter {
        /// Character name (maps to <data_root>/characters/<slug>.yaml)
        name: Option<String>,
        /// Explicit path to a character YAML
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Only write the checkpoint, do not push to the store
        #[arg(long)]
        skip: bool,
        /// Skip store writes
        #[arg(long)]
        dry_run: bool,
    },
    /// Ingest every character document under the data root
    IngestAll {
        /// Skip store writes
        #[arg(long)]
        dry_run: bool,
    },
    /// Derive STRONG/WEAK/EVEN matchup relationships
    Synthesize {
        /// Keep existing synthesized edges instead of clearing them first
        #[arg(long)]
        no_refresh: bool,
    },
    /// Report store-side consistency gaps
    Validate,
    /// Compare source file names against store contents
    Drift,
    /// Print the known roster
    Roster,
    /// Export the relationship table from the store
    ExportMatchups {
        /// Output path (defaults to the configured table path)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Keyed diff between two exported relationship tables
    DiffMatchups { old: PathBuf, new: PathBuf },
    /// Copy the current relationship table into the history directory
    Archive { label: Option<String> },
    /// Export the static graph JSON for the website
    ExportStatic {
        /// Output path (defaults to the configured artifact path)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Bootstrap => bootstrap(&config).await,
        Commands::IngestFoundations {
            archetypes,
            mechanics,
            dry_run,
        } => ingest_foundations(&config, archetypes, mechanics, dry_run).await,
        Commands::IngestCharacter {
            name,
            path,
            skip,
            dry_run,
        } => ingest_character(&config, name, path, skip, dry_run).await,
        Commands::IngestAll { dry_run } => ingest_all(&config, dry_run).await,
        Commands::Synthesize { no_refresh } => synthesize(&config, no_refresh).await,
        Commands::Validate => validate(&config).await,
        Commands::Drift => drift(&config).await,
        Commands::Roster => roster(&config),
        Commands::ExportMatchups { out } => export_matchups(&config, out).await,
        Commands::DiffMatchups { old, new } => diff_matchups(&old, &new),
        Commands::Archive { label } => archive(&config, label),
        Commands::ExportStatic { out } => export_static(&config, out),
    }
}

async fn bootstrap(config: &Config) -> Result<()> {
    let store = GraphStore::connect(&config.store).await?;
    ops::apply_schema(&store).await?;
    println!("Schema constraints ensured.");
    Ok(())
}

async fn ingest_foundations(
    config: &Config,
    archetypes: Option<PathBuf>,
    mechanics: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let archetypes_path = archetypes.unwrap_or_else(|| config.data.archetypes_file());
    let mechanics_path = mechanics.unwrap_or_else(|| config.data.mechanics_file());
    let archetype_list = source::load_archetypes(&archetypes_path)?;
    let mechanic_list = source::load_mechanics(&mechanics_path)?;
    println!(
        "Loaded {} archetypes and {} mechanics.",
        archetype_list.len(),
        mechanic_list.len()
    );
    if dry_run || config.dry_run {
        println!("Dry-run mode active; skipping store ingestion.");
        return Ok(());
    }
    let store = GraphStore::connect(&config.store).await?;
    ops::apply_schema(&store).await?;
    ops::upsert_archetypes(&store, &archetype_list).await?;
    ops::upsert_mechanics(&store, &mechanic_list).await?;
    println!("Foundational data ingested.");
    Ok(())
}

async fn ingest_character(
    config: &Config,
    name: Option<String>,
    path: Option<PathBuf>,
    skip: bool,
    dry_run: bool,
) -> Result<()> {
    let profile_path = match (path, name) {
        (Some(path), _) => path,
        (None, Some(name)) => source::character_path(&config.data.data_root, &name),
        (None, None) => bail!("provide a character name or --path"),
    };
    let profile = source::load_character_profile(&profile_path)?;
    let checkpoint_path = config.data.checkpoint_path(&profile.character.slug());
    source::write_checkpoint(&profile, &checkpoint_path)?;
    println!("Wrote checkpoint {}", checkpoint_path.display());
    if skip || dry_run || config.dry_run {
        println!("Dry-run/skip flag detected; halting before store ingestion.");
        return Ok(());
    }
    let store = GraphStore::connect(&config.store).await?;
    ops::apply_schema(&store).await?;
    ops::upsert_character(&store, &profile).await?;
    println!("Ingested {} into the store.", profile.character.name);
    Ok(())
}

async fn ingest_all(config: &Config, dry_run: bool) -> Result<()> {
    let profiles = source::load_character_profiles(&config.data.characters_dir())?;
    println!("Prepared {} character profiles.", profiles.len());
    for profile in &profiles {
        let checkpoint_path = config.data.checkpoint_path(&profile.character.slug());
        source::write_checkpoint(profile, &checkpoint_path)?;
    }
    if dry_run || config.dry_run {
        println!("Dry-run complete; checkpoints generated for all profiles.");
        return Ok(());
    }
    let store = GraphStore::connect(&config.store).await?;
    ops::apply_schema(&store).await?;
    for profile in &profiles {
        ops::upsert_character(&store, profile).await?;
    }
    println!("All {} characters ingested.", profiles.len());
    Ok(())
}

async fn synthesize(config: &Config, no_refresh: bool) -> Result<()> {
    let store = GraphStore::connect(&config.store).await?;
    if !no_refresh {
        ops::clear_synthesized_matchups(&store).await?;
        println!("Cleared existing synthesized matchups.");
    }
    let summary = ops::synthesize_matchups(&store).await?;
    println!(
        "Synthesized {} strong pairs and {} even pairs ({} evidence records).",
        summary.strong_pairs, summary.even_pairs, summary.evidence_records
    );
    Ok(())
}

async fn validate(config: &Config) -> Result<()> {
    let store = GraphStore::connect(&config.store).await?;
    let report = ops::run_validation_queries(&store).await?;
    if report.is_clean() {
        println!("No validation gaps found.");
        return Ok(());
    }
    print_gap(
        "characters missing archetype",
        &report.characters_missing_archetype,
    );
    print_gap(
        "characters missing abilities",
        &report.characters_missing_abilities,
    );
    print_gap(
        "abilities missing analysis",
        &report.abilities_missing_analysis,
    );
    Ok(())
}

fn print_gap(label: &str, names: &[String]) {
    if !names.is_empty() {
        println!("{label}: {}", names.join(", "));
    }
}

async fn drift(config: &Config) -> Result<()> {
    let store = GraphStore::connect(&config.store).await?;
    let report = ops::check_drift(&config.data.data_root, &store).await?;
    if report.is_clean() {
        println!("No drift between source files and store.");
        return Ok(());
    }
    for (kind, diff) in [
        ("characters", &report.characters),
        ("abilities", &report.abilities),
        ("mechanics", &report.mechanics),
    ] {
        println!(
            "{kind}: {} in source, {} in store",
            diff.source_count, diff.store_count
        );
        print_gap(&format!("  {kind} missing in store"), &diff.missing_in_store);
        print_gap(
            &format!("  {kind} missing in source"),
            &diff.missing_in_source,
        );
    }
    Ok(())
}

fn roster(config: &Config) -> Result<()> {
    let roster = source::load_roster(&config.data.roster_file())?;
    if let Some(checked) = roster.meta.get("last_checked") {
        match checked.as_str() {
            Some(date) => println!("Roster last checked: {date}"),
            None => println!("Roster last checked: {checked}"),
        }
    }
    for entry in &roster.characters {
        println!("- {} ({}) [{}]", entry.name, entry.archetype, entry.status);
    }
    Ok(())
}

async fn export_matchups(config: &Config, out: Option<PathBuf>) -> Result<()> {
    let store = GraphStore::connect(&config.store).await?;
    let rows = export::fetch_matchup_rows(&store).await?;
    let out = out.unwrap_or_else(|| config.export.matchups_file.clone());
    export::save_table(&out, &rows)?;
    println!("Exported {} matchup rows to {}.", rows.len(), out.display());
    Ok(())
}

fn diff_matchups(old: &Path, new: &Path) -> Result<()> {
    let old_rows = export::load_table(old)?;
    let new_rows = export::load_table(new)?;
    let diff = export::diff_tables(&old_rows, &new_rows);
    for row in &diff.added {
        println!(
            "+ {} {} {} (evidence {})",
            row.source, row.relationship, row.target, row.evidence
        );
    }
    for row in &diff.removed {
        println!(
            "- {} {} {} (evidence {})",
            row.source, row.relationship, row.target, row.evidence
        );
    }
    println!(
        "{} added, {} removed.",
        diff.added.len(),
        diff.removed.len()
    );
    Ok(())
}

fn archive(config: &Config, label: Option<String>) -> Result<()> {
    let label = label.unwrap_or_else(|| "matchups".to_string());
    let destination = export::archive_table(
        &config.export.matchups_file,
        &config.export.history_dir,
        &label,
    )?;
    println!("Archived table to {}.", destination.display());
    Ok(())
}

fn export_static(config: &Config, out: Option<PathBuf>) -> Result<()> {
    let matchups = if config.export.matchups_file.exists() {
        export::load_table(&config.export.matchups_file)?
    } else {
        eprintln!(
            "{} not found; skipping matchup edges.",
            config.export.matchups_file.display()
        );
        Vec::new()
    };
    let input = export::load_export_input(&config.data.data_root, matchups)?;
    let snapshot = export::build_snapshot(&input);
    let out = out.unwrap_or_else(|| config.export.graph_file.clone());
    export::write_snapshot(&snapshot, &out)?;
    println!(
        "Exported {} nodes and {} edges to {}.",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        out.display()
    );
    Ok(())
}
