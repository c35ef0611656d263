//! Pseudonymize command implementation
//!
//! This module implements the `pseudonymize` command, which processes a set
//! of text files in one session so labels stay consistent across them.

use crate::config::{load_config, parse_config, KineticConfig};
use crate::domain::{DocumentErrorDetail, DocumentId, Result as KineticResult};
use crate::pseudonymization::{
    AnchorPolicy, BatchOutcome, Document, PseudonymizationEngine, PseudonymizedDocument,
};
use clap::Args;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the pseudonymize command
#[derive(Args, Debug)]
pub struct PseudonymizeArgs {
    /// Text files to pseudonymize, all in one session
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory for the pseudonymized files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Fixed anchor date for every document (DD-MM-YYYY or YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub anchor_date: Option<String>,

    /// Anchor policy (earliest or incident)
    #[arg(long, value_name = "POLICY")]
    pub anchor: Option<AnchorPolicy>,

    /// Write the batch report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write the label mapping as JSON (contains identifying text)
    #[arg(long, value_name = "FILE")]
    pub export_mapping: Option<PathBuf>,

    /// Detect and report without writing pseudonymized files
    #[arg(long)]
    pub dry_run: bool,

    /// Per-document time budget in milliseconds (0 disables it)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl PseudonymizeArgs {
    /// Execute the pseudonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(files = self.files.len(), "Starting pseudonymize command");

        let mut config = match load_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let engine = match PseudonymizationEngine::new(config.pseudonymization.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize pseudonymization engine");
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let (documents, sources, read_failures) = read_documents(&self.files);

        let session = engine.new_session();
        let mut outcome = session
            .process_batch(documents, config.batch.time_budget())
            .await;
        for failure in &read_failures {
            outcome.report.add_failure(failure);
        }

        if engine.is_dry_run() {
            println!("🔍 Dry run: no pseudonymized files written");
        } else {
            write_outputs(&config.batch.output_dir, &outcome, &sources)?;
            println!(
                "✅ {} file(s) written to {}",
                outcome.documents.len(),
                config.batch.output_dir.display()
            );
        }

        if let Some(path) = &self.export_mapping {
            let snapshot = session.snapshot()?;
            fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
            println!(
                "⚠️  Label mapping written to {} (contains identifying text, keep it local)",
                path.display()
            );
        }

        print!("{}", outcome.report.format_console());

        if let Some(path) = &self.report {
            outcome.report.write_to_file(path)?;
            println!("📄 Report written to {}", path.display());
        }

        Ok(exit_code(&outcome))
    }

    fn apply_overrides(&self, config: &mut KineticConfig) {
        if let Some(date) = &self.anchor_date {
            tracing::info!("Overriding anchor date from CLI");
            config.pseudonymization.anchor_date = Some(date.clone());
        }
        if let Some(policy) = self.anchor {
            tracing::info!(policy = %policy, "Overriding anchor policy from CLI");
            config.pseudonymization.anchor_policy = policy;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.pseudonymization.dry_run = true;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.batch.timeout_ms = timeout_ms;
        }
        if let Some(dir) = &self.output_dir {
            config.batch.output_dir = dir.clone();
        }
    }
}

/// Load the configuration file, or defaults when it does not exist
fn load_or_default(config_path: &str) -> KineticResult<KineticConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::info!(config_path, "No configuration file, using defaults");
        parse_config("")
    }
}

/// Output file name per document id
type Sources = HashMap<String, String>;

/// Read every input file; unreadable files become failures
fn read_documents(files: &[PathBuf]) -> (Vec<Document>, Sources, Vec<DocumentErrorDetail>) {
    let mut documents = Vec::with_capacity(files.len());
    let mut sources = HashMap::new();
    let mut names = OutputNames::default();
    let mut failures = Vec::new();

    for path in files {
        let id = path.display().to_string();
        let document_id = match DocumentId::new(id.clone()) {
            Ok(document_id) => document_id,
            Err(e) => {
                failures.push(DocumentErrorDetail::new(e).with_document_id(id));
                continue;
            }
        };

        match fs::read_to_string(path) {
            Ok(text) => {
                sources.entry(id).or_insert_with(|| names.claim(path));
                documents.push(Document::with_id(document_id, text));
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read input file");
                failures.push(
                    DocumentErrorDetail::new(format!("Failed to read file: {e}"))
                        .with_document_id(id),
                );
            }
        }
    }

    (documents, sources, failures)
}

/// Output file names, distinct within one run
#[derive(Debug, Default)]
struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    /// `<stem>.pseudo.txt` for `input`.
    ///
    /// When another input already has that name, the parent directory is
    /// prefixed (`<parent>_<stem>.pseudo.txt`), then a counter is appended.
    fn claim(&mut self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let mut name = format!("{stem}.pseudo.txt");
        if self.taken.contains(&name) {
            if let Some(parent) = input.parent().and_then(Path::file_name) {
                name = format!("{}_{stem}.pseudo.txt", parent.to_string_lossy());
            }
        }
        let mut counter = 2;
        while self.taken.contains(&name) {
            name = format!("{stem}-{counter}.pseudo.txt");
            counter += 1;
        }

        self.taken.insert(name.clone());
        name
    }
}

fn write_outputs(output_dir: &Path, outcome: &BatchOutcome, sources: &Sources) -> anyhow::Result<()> {
    fs::create_dir_all(output_dir)?;
    for document in &outcome.documents {
        write_output(output_dir, document, sources)?;
    }
    Ok(())
}

fn write_output(
    output_dir: &Path,
    document: &PseudonymizedDocument,
    sources: &Sources,
) -> anyhow::Result<()> {
    let name = sources
        .get(document.document_id.as_str())
        .ok_or_else(|| anyhow::anyhow!("no input file for document {}", document.document_id))?;
    let path = output_dir.join(name);
    fs::write(&path, &document.pseudonymized_text)?;
    tracing::debug!(document_id = %document.document_id, output = %path.display(), "Output written");
    Ok(())
}

/// 0 success, 1 partial failure, 5 aborted session
fn exit_code(outcome: &BatchOutcome) -> i32 {
    if outcome.aborted() {
        5
    } else if outcome.report.documents_failed > 0 {
        1
    } else {
        0
    }
}
