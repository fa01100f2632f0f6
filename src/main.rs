use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use wq::config::{load_from_path, resolve_plan, suggest_id, MutationOutcome, PlanConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "wq")]
#[command(about = "Compose scoped DOM mutations and resolve them into deltas", long_about = None)]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); overrides WQ_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a plan and print its deltas as JSON
    Resolve {
        /// Plan file to resolve
        plan: PathBuf,

        /// Resolve a single mutation instead of the whole plan
        #[arg(long)]
        id: Option<String>,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Check that plans load and resolve
    Check {
        /// Plan file, or directory of plans (defaults to ./plans)
        path: Option<PathBuf>,
    },

    /// List the mutations of a plan
    List {
        /// Plan file to list
        plan: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve { plan, id, pretty } => cmd_resolve(&plan, id.as_deref(), pretty),
        Commands::Check { path } => cmd_check(path),
        Commands::List { plan } => cmd_list(&plan),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("WQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_plan(path: &Path) -> Result<PlanConfig> {
    load_from_path(path).with_context(|| format!("loading {}", path.display()))
}

fn cmd_resolve(path: &Path, id: Option<&str>, pretty: bool) -> Result<()> {
    let plan = load_plan(path)?;

    if let Some(id) = id {
        if plan.mutation(id).is_none() {
            match suggest_id(&plan, id) {
                Some(suggestion) => anyhow::bail!(
                    "no mutation '{}' in {} (did you mean '{}'?)",
                    id,
                    path.display(),
                    suggestion
                ),
                None => anyhow::bail!("no mutation '{}' in {}", id, path.display()),
            }
        }
    }

    let mut output = serde_json::Map::new();
    let mut failures = Vec::new();

    for (mutation_id, result) in resolve_plan(&plan, VERSION) {
        if id.is_some_and(|id| id != mutation_id) {
            continue;
        }
        match result {
            Ok(MutationOutcome::Resolved { delta }) => {
                output.insert(mutation_id, serde_json::to_value(&*delta)?);
            }
            Ok(MutationOutcome::SkippedVersion { reason }) => {
                eprintln!("{} {}: skipped - {}", "⊘".yellow(), mutation_id, reason);
            }
            Err(e) => failures.push(format!("{mutation_id}: {e}")),
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("{}", failures.join("\n"));
    }

    let value = match id {
        Some(id) => output.remove(id).unwrap_or(serde_json::Value::Null),
        None => serde_json::Value::Object(output),
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Helper: collect plan files.
///
/// A file is used as-is; a directory contributes every `.toml` file directly
/// inside it, sorted by path.
fn discover_plan_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("{} is neither a plan file nor a directory", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .toml plan files found in {}", path.display());
    }
    Ok(files)
}

fn cmd_check(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from("plans"));
    let files = discover_plan_files(&path)?;

    let mut resolved = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for file in &files {
        println!("{}", format!("Checking {}", file.display()).bold());

        let plan = match load_from_path(file) {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
                failed += 1;
                continue;
            }
        };

        for (id, result) in resolve_plan(&plan, VERSION) {
            match result {
                Ok(MutationOutcome::Resolved { delta }) => {
                    println!(
                        "{} {}: {} mutations",
                        "✓".green(),
                        id,
                        delta.mutation_count()
                    );
                    resolved += 1;
                }
                Ok(MutationOutcome::SkippedVersion { reason }) => {
                    println!("{} {}: skipped - {}", "⊘".yellow(), id, reason);
                    skipped += 1;
                }
                Err(e) => {
                    eprintln!("{} {}: {}", "✗".red(), id, e);
                    failed += 1;
                }
            }
        }
    }

    println!(
        "\n{} {} resolved, {} skipped, {} failed",
        "Summary:".bold(),
        resolved,
        skipped,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} failure(s)", failed);
    }
    Ok(())
}

fn cmd_list(path: &Path) -> Result<()> {
    let plan = load_plan(path)?;

    let name = if plan.meta.name.is_empty() {
        path.display().to_string()
    } else {
        plan.meta.name.clone()
    };
    println!("{}", name.bold());
    if let Some(description) = &plan.meta.description {
        println!("{}", description.dimmed());
    }
    if let Some(range) = &plan.meta.version_range {
        println!("{}", format!("version_range: {range}").dimmed());
    }

    for mutation in &plan.mutations {
        let steps = mutation.steps.len();
        match &mutation.description {
            Some(description) => println!(
                "  {} ({} steps) - {}",
                mutation.id.cyan(),
                steps,
                description
            ),
            None => println!("  {} ({} steps)", mutation.id.cyan(), steps),
        }
    }
    Ok(())
}
