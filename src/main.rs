use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use shardscope_metadata::{AnalyzerConfig, WorkflowMetadata, WorkflowPreemptionSummary};
use shardscope_tree::{build_tree, call_summaries};

/// Shardscope - call trees and preemption costs for workflow executions
#[derive(Parser)]
#[command(name = "shardscope")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the call tree of a workflow
  Tree {
    /// Path to the workflow metadata JSON
    metadata_file: PathBuf,

    /// Show every shard and sub-workflow instead of top-level calls only
    #[arg(long)]
    expand_all: bool,
  },

  /// Print one status row per call
  Calls {
    /// Path to the workflow metadata JSON
    metadata_file: PathBuf,
  },

  /// Print preemption efficiency and wasted cost
  Preemption {
    /// Path to the workflow metadata JSON
    metadata_file: PathBuf,

    /// Analyzer settings (JSON); unspecified fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Tree {
      metadata_file,
      expand_all,
    }) => print_tree(&metadata_file, expand_all)?,
    Some(Commands::Calls { metadata_file }) => print_calls(&metadata_file)?,
    Some(Commands::Preemption {
      metadata_file,
      config,
      json,
    }) => print_preemption(&metadata_file, config.as_deref(), json)?,
    None => {
      println!("shardscope - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_metadata(path: &Path) -> Result<WorkflowMetadata> {
  let bytes = std::fs::read(path)
    .with_context(|| format!("failed to read metadata file: {}", path.display()))?;

  let metadata = shardscope_metadata::decode(&bytes)
    .with_context(|| format!("failed to decode metadata file: {}", path.display()))?;

  debug!(path = %path.display(), calls = metadata.calls.len(), "metadata_loaded");
  Ok(metadata)
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
  let Some(path) = path else {
    return Ok(AnalyzerConfig::default());
  };

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read config file: {}", path.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn print_tree(metadata_file: &Path, expand_all: bool) -> Result<()> {
  let metadata = load_metadata(metadata_file)?;
  let mut tree = build_tree(&metadata);
  if expand_all {
    tree.expand_all();
  }

  for node in tree.visible_nodes() {
    let duration = node
      .duration
      .map(|d| format!("{}s", d.num_seconds()))
      .unwrap_or_else(|| "-".to_string());
    println!(
      "{}{} [{}] {}",
      "  ".repeat(node.depth),
      node.name,
      node.status,
      duration
    );
  }

  Ok(())
}

fn print_calls(metadata_file: &Path) -> Result<()> {
  let metadata = load_metadata(metadata_file)?;

  println!("Workflow: {} ({})", metadata.name, metadata.status);
  for summary in call_summaries(&metadata) {
    let cached = if summary.cache_hit { " (cached)" } else { "" };
    println!("{}\t{}{}", summary.label(), summary.status_text(), cached);
  }

  for message in metadata.failure_messages() {
    println!("failure: {}", message);
  }

  Ok(())
}

fn print_preemption(metadata_file: &Path, config: Option<&Path>, json: bool) -> Result<()> {
  let metadata = load_metadata(metadata_file)?;
  let config = load_config(config)?;
  let summary = metadata.preemption_summary(&config);

  if json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    print_summary(&summary);
  }

  Ok(())
}

fn print_summary(summary: &WorkflowPreemptionSummary) {
  println!("Workflow: {} ({})", summary.workflow_name, summary.workflow_id);
  println!(
    "Shards: {} ({} preemptible), attempts: {}, preemptions: {}",
    summary.total_tasks, summary.preemptible_tasks, summary.total_attempts, summary.total_preemptions
  );
  println!("Efficiency: {:.1}%", summary.overall_efficiency * 100.0);
  println!(
    "Cost: {:.2} total, {:.2} wasted ({:.1}% efficient)",
    summary.total_cost,
    summary.wasted_cost,
    summary.cost_efficiency * 100.0
  );

  if summary.problematic_tasks.is_empty() {
    return;
  }

  println!();
  println!("Problematic tasks (by wasted cost):");
  for task in &summary.problematic_tasks {
    println!(
      "  {}: {} shards, {} preemptions, efficiency {:.1}%, wasted {:.2} of {:.2}",
      task.task_name,
      task.shard_count,
      task.preempted_count,
      task.efficiency_score * 100.0,
      task.wasted_cost,
      task.total_cost
    );
  }
}
