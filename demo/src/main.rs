//! HemaGuard anemia triage CLI
//!
//! Single-patient inference, batch inference over a CSV, dataset
//! normalization, training-data preparation, and model validation.
//!
//! Usage:
//!   cargo run -p demo -- predict --hgb 11.0 --rbc 4.2 --mcv 70 --mch 26 --rdw 16
//!   cargo run -p demo -- batch normalized.csv predictions.csv
//!   cargo run -p demo -- normalize lucknow.csv normalized.csv
//!   cargo run -p demo -- prepare cbc.csv training.csv
//!   cargo run -p demo -- validate holdout.csv
//!   cargo run -p demo -- explain

mod batch;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hemaguard_contracts::{
    error::{HemaError, HemaResult},
    markers,
    record::PatientRecord,
};
use hemaguard_core::{orchestrator::rank_importances, traits::Classifier, InferenceOrchestrator};
use hemaguard_dataset::{
    DatasetNormalizer, NormalizerOptions, PreparationOptions, Table, TrainingPreparer,
};
use hemaguard_model::{evaluate, ForestClassifier};
use hemaguard_rules::RuleTriageEngine;

// ── CLI definition ────────────────────────────────────────────────────────────

/// HemaGuard: anemia triage from five blood-count markers.
#[derive(Parser)]
#[command(
    name = "hemaguard",
    about = "Anemia triage from a complete blood count",
    long_about = "Predicts anemia from HGB, RBC, MCV, MCH and RDW, assigns a triage tier,\n\
                  and explains the result. Also normalizes and prepares CBC datasets."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Triage one patient from lab values.
    Predict(PredictArgs),
    /// Triage every row of a normalized CSV.
    Batch(BatchArgs),
    /// Map an external CBC export onto the canonical schema and label it.
    Normalize(NormalizeArgs),
    /// Build a labeled training table from a raw CBC export.
    Prepare(PrepareArgs),
    /// Score the model against a labeled CSV.
    Validate(ValidateArgs),
    /// Show the model's feature importances and the triage rule order.
    Explain(ModelArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Directory holding model.json and features.json.
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,
    /// Rule configuration TOML; the bundled rules are used when omitted.
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(Args)]
struct PredictArgs {
    /// Hemoglobin, g/dL.
    #[arg(long)]
    hgb: f64,
    /// Red blood cell count, 10^6/µL.
    #[arg(long)]
    rbc: f64,
    /// Mean corpuscular volume, fL.
    #[arg(long)]
    mcv: f64,
    /// Mean corpuscular hemoglobin, pg.
    #[arg(long)]
    mch: f64,
    /// Red cell distribution width, %.
    #[arg(long)]
    rdw: f64,
    /// Additional marker, repeatable (e.g. --marker WBC=7.2).
    #[arg(long = "marker", value_name = "NAME=VALUE")]
    markers: Vec<String>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct BatchArgs {
    input: PathBuf,
    output: PathBuf,
    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct NormalizeArgs {
    input: PathBuf,
    output: PathBuf,
    /// Keep a measured HCT/PCV column instead of recomputing it from HGB.
    #[arg(long)]
    preserve_hct: bool,
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(Args)]
struct PrepareArgs {
    input: PathBuf,
    output: PathBuf,
    /// Skip the seeded smoker/athlete signature injection.
    #[arg(long)]
    no_signatures: bool,
    #[arg(long)]
    rules: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    input: PathBuf,
    /// Print the metrics as JSON.
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    model: ModelArgs,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-step output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Predict(args) => run_predict(args),
        Command::Batch(args) => run_batch(args),
        Command::Normalize(args) => run_normalize(args),
        Command::Prepare(args) => run_prepare(args),
        Command::Validate(args) => run_validate(args),
        Command::Explain(args) => run_explain(args),
    };

    if let Err(e) = result {
        eprintln!("hemaguard error: {}", e);
        std::process::exit(1);
    }
}

// ── Command dispatch ──────────────────────────────────────────────────────────

fn run_predict(args: PredictArgs) -> HemaResult<()> {
    let mut record = PatientRecord::new()
        .with(markers::HGB, args.hgb)
        .with(markers::RBC, args.rbc)
        .with(markers::MCV, args.mcv)
        .with(markers::MCH, args.mch)
        .with(markers::RDW, args.rdw);
    for raw in &args.markers {
        let (name, value) = parse_marker(raw)?;
        record = record.with(name, value);
    }

    let orchestrator = load_orchestrator(&args.model)?;
    let report = orchestrator.infer(&record)?;

    let mut out = io::stdout().lock();
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| HemaError::Io { reason: format!("failed to encode report: {}", e) })?;
        writeln!(out, "{}", json).map_err(stdout_error)
    } else {
        render::write_report(&mut out, &report).map_err(stdout_error)
    }
}

fn run_batch(args: BatchArgs) -> HemaResult<()> {
    let orchestrator = load_orchestrator(&args.model)?;
    let table = Table::read_csv(&args.input)?;
    let outcome = batch::run_batch(&orchestrator, table);
    outcome.table.write_csv(&args.output)?;

    println!(
        "{} row(s) triaged, {} skipped → {}",
        outcome.processed,
        outcome.failed,
        args.output.display()
    );
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> HemaResult<()> {
    let rules = load_rules(args.rules.as_deref())?;
    let normalizer = DatasetNormalizer::new(
        rules.labeler(),
        NormalizerOptions {
            preserve_measured_hct: args.preserve_hct,
        },
    );
    let table = normalizer.normalize(Table::read_csv(&args.input)?)?;
    table.write_csv(&args.output)?;

    println!("{} row(s) normalized → {}", table.len(), args.output.display());
    Ok(())
}

fn run_prepare(args: PrepareArgs) -> HemaResult<()> {
    let rules = load_rules(args.rules.as_deref())?;
    let preparer = TrainingPreparer::new(
        rules.labeler(),
        PreparationOptions {
            inject_signatures: !args.no_signatures,
            ..PreparationOptions::default()
        },
    );
    let table = preparer.prepare(Table::read_csv(&args.input)?)?;
    table.write_csv(&args.output)?;

    println!("{} row(s) prepared → {}", table.len(), args.output.display());
    Ok(())
}

fn run_validate(args: ValidateArgs) -> HemaResult<()> {
    let classifier = ForestClassifier::load(&args.model.model_dir)?;
    let table = Table::read_csv(&args.input)?;
    let report = evaluate(&classifier, &table)?;

    let mut out = io::stdout().lock();
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| HemaError::Io { reason: format!("failed to encode metrics: {}", e) })?;
        writeln!(out, "{}", json).map_err(stdout_error)
    } else {
        writeln!(out, "=== Model Validation ({} rows) ===", report.rows)
            .and_then(|_| writeln!(out, "{}", report))
            .map_err(stdout_error)
    }
}

fn run_explain(args: ModelArgs) -> HemaResult<()> {
    let classifier = ForestClassifier::load(&args.model_dir)?;
    let rules = load_rules(args.rules.as_deref())?;

    let mut out = io::stdout().lock();
    let write = |out: &mut io::StdoutLock<'_>| -> io::Result<()> {
        writeln!(out, "=== Model ===")?;
        writeln!(out, "  Directory:  {}", args.model_dir.display())?;
        writeln!(out, "  Trees:      {}", classifier.tree_count())?;
        writeln!(out, "  Features:   {}", classifier.feature_order().join(", "))?;
        writeln!(out)?;
        render::write_importances(out, &rank_importances(classifier.feature_importances()))?;
        writeln!(out)?;
        writeln!(out, "=== Triage rules (first match wins) ===")?;
        for (i, id) in rules.rules().iter().enumerate() {
            writeln!(out, "  [{}] {}", i + 1, id)?;
        }
        Ok(())
    };
    write(&mut out).map_err(stdout_error)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_rules(path: Option<&Path>) -> HemaResult<RuleTriageEngine> {
    match path {
        Some(path) => RuleTriageEngine::from_file(path),
        None => RuleTriageEngine::builtin(),
    }
}

fn load_orchestrator(args: &ModelArgs) -> HemaResult<InferenceOrchestrator> {
    let classifier = ForestClassifier::load(&args.model_dir)?;
    let rules = load_rules(args.rules.as_deref())?;
    Ok(InferenceOrchestrator::new(Box::new(classifier), Box::new(rules)))
}

/// Split `NAME=VALUE` into a marker name and a finite number.
fn parse_marker(raw: &str) -> HemaResult<(String, f64)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| {
        HemaError::invalid_record(format!("marker '{}' is not in NAME=VALUE form", raw))
    })?;
    let value: f64 = value
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| {
            HemaError::invalid_record(format!("marker '{}' has a non-numeric value", name.trim()))
        })?;
    Ok((name.trim().to_string(), value))
}

fn stdout_error(e: io::Error) -> HemaError {
    HemaError::Io {
        reason: format!("failed to write to stdout: {}", e),
    }
}
