//! Pipeline Toolkit CLI Module
//!
//! Command-line interface for training trees, writing feature lists and
//! comparing sequences.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::{DataSet, Features, Sequence};
use crate::distance::{DynamicTimeWarping, SparseMetric};
use crate::training::{RegressionTree, SplitCandidates, TreeConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Regression trees, feature lists and DTW distances")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a regression tree on an instance file
    Train {
        /// Instance file (id;class;outcome;f=v,...)
        #[arg(short, long)]
        data: PathBuf,

        /// JSON tree configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parameter override, e.g. --param maxDepth=4 (repeatable)
        #[arg(short, long)]
        param: Vec<String>,

        /// Maximum candidate thresholds per feature (0 = all)
        #[arg(long, default_value = "64")]
        max_splits: usize,

        /// Write the trained tree as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the feature list of an instance file
    Features {
        /// Instance file (id;class;outcome;f=v,...)
        #[arg(short, long)]
        data: PathBuf,

        /// Output feature file (index:feature:description)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Dynamic time warping distance between two sequence files
    Dtw {
        /// First sequence file (time;f=v,...)
        #[arg(long)]
        left: PathBuf,

        /// Second sequence file
        #[arg(long)]
        right: PathBuf,

        /// Point metric (euclidean, manhattan, chebyshev)
        #[arg(short, long, default_value = "euclidean")]
        metric: String,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    config_path: Option<&Path>,
    params: &[String],
    max_splits: usize,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");

    let mut config = match config_path {
        Some(path) => TreeConfig::from_json_file(path)?,
        None => TreeConfig::default(),
    };
    for assignment in params {
        config.apply_assignment(assignment)?;
    }
    config.validate()?;

    step_run("Loading data");
    let start = Instant::now();
    let dataset = DataSet::read_from_file(data_path)?;
    let features = Features::create_from_datasets(&[&dataset]);
    let splits = SplitCandidates::from_dataset(&dataset, &features, max_splits);
    step_done(&format!(
        "{} rows × {} features in {:?}",
        dataset.len(),
        features.len(),
        start.elapsed()
    ));

    step_run("Training regression tree");
    let start = Instant::now();
    let tree = RegressionTree::train(&dataset, &features, &splits, &config)?;
    step_done(&format!("{:?}", start.elapsed()));

    let predictions = tree.predict_dataset(&dataset);
    let mse = (&predictions - &dataset.outcomes()).mapv(|d| d * d).mean().unwrap_or(0.0);

    println!();
    kv("Nodes", &tree.n_nodes().to_string());
    kv("Leaves", &tree.n_leaves().to_string());
    kv("Depth", &tree.depth().to_string());
    kv("Training MSE", &format!("{:.4}", mse));
    println!();
    println!("{}", tree);

    if let Some(path) = output {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &tree)?;
        step_ok(&format!("Tree written to {}", path.display()));
    }

    Ok(())
}

pub fn cmd_features(data_path: &Path, output: &Path) -> anyhow::Result<()> {
    section("Features");

    let dataset = DataSet::read_from_file(data_path)?;
    let features = Features::create_from_datasets(&[&dataset]);
    features.write_to_file(output)?;

    kv("Features", &features.len().to_string());
    step_ok(&format!("Feature list written to {}", output.display()));
    Ok(())
}

pub fn cmd_dtw(left: &Path, right: &Path, metric: &str) -> anyhow::Result<()> {
    section("Dynamic Time Warping");

    let metric: SparseMetric = metric.parse()?;
    let s = Sequence::read_from_file(left)?;
    let t = Sequence::read_from_file(right)?;
    let dtw = DynamicTimeWarping::new(metric);
    let distance = dtw.distance(&s, &t)?;

    kv("Metric", &format!("{:?}", metric));
    kv("Lengths", &format!("{} × {}", s.len(), t.len()));
    kv("Distance", &format!("{:.6}", distance));
    println!();
    Ok(())
}
