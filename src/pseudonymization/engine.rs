//! Pseudonymization engine and sessions
//!
//! This module provides the [`PseudonymizationEngine`], which owns the
//! compiled recognizers, and the [`Session`], which owns one label registry.
//!
//! # Architecture
//!
//! A document flows through:
//! - **Recognizers**: every enabled category scans the text, optionally in parallel
//! - **Resolver**: overlapping candidates are reduced to one ordered, disjoint list
//! - **Timeline**: the document's anchor date is chosen
//! - **Rewriter**: spans are replaced by registry or timeline placeholders
//! - **Audit Logger**: the substitutions are recorded with hashed originals
//!
//! The engine is immutable after construction and can be shared between any
//! number of sessions. Label numbering is per session: two sessions never see
//! each other's labels.
//!
//! # Examples
//!
//! ```
//! use kinetic::pseudonymization::new_session;
//!
//! # fn example() -> kinetic::domain::Result<()> {
//! let session = new_session()?;
//! let result = session.process("Gesproken met Jan Jansen, BSN 123456782.")?;
//! assert_eq!(result.pseudonymized_text, "Gesproken met [NAAM_1], BSN [BSN].");
//! # Ok(())
//! # }
//! ```

use crate::domain::{DocumentErrorDetail, KineticError, Result, SessionId};
use crate::pseudonymization::{
    audit::AuditLogger,
    config::PseudonymizationConfig,
    models::{Category, Document, DocumentStatistics, PseudonymizedDocument, RegistrySnapshot},
    preprocess::OcrRepair,
    recognizer::{
        date::DateRecognizer,
        gazetteer::{GazetteerRecognizer, TomlGazetteer},
        name::NameRecognizer,
        patterns::PatternLibrary,
        RecognizerSet,
    },
    registry::LabelRegistry,
    report::BatchReport,
    resolver::resolve,
    rewriter::rewrite,
    timeline::TimelineTransformer,
};
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Confidence of an exact hospital gazetteer match
pub const HOSPITAL_CONFIDENCE: f32 = 0.9;

/// Confidence of an exact place gazetteer match
pub const PLACE_CONFIDENCE: f32 = 0.8;

/// Compiled detection pipeline
///
/// # Thread Safety
///
/// The engine holds no mutable state and is shared between sessions and
/// batch tasks through `Arc`.
pub struct PseudonymizationEngine {
    config: PseudonymizationConfig,
    recognizers: RecognizerSet,
    ocr_repair: Option<OcrRepair>,
    timeline: TimelineTransformer,
    anchor_date: Option<NaiveDate>,
    audit_logger: Option<AuditLogger>,
}

impl PseudonymizationEngine {
    /// Create a new engine
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The pattern library or gazetteer cannot be loaded
    /// - The audit log directory cannot be created
    pub fn new(config: PseudonymizationConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let recognizers = build_recognizers(&config)?;

        let ocr_repair = if config.repair_ocr_separators {
            Some(OcrRepair::new()?)
        } else {
            None
        };

        let audit_logger = if config.audit.enabled {
            Some(AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                true,
            )?)
        } else {
            None
        };

        tracing::info!(
            recognizers = recognizers.len(),
            categories = ?recognizers.categories(),
            anchor_policy = %config.anchor_policy,
            parallel = config.parallel_recognizers,
            audit = config.audit.enabled,
            "Pseudonymization engine initialized"
        );

        Ok(Arc::new(Self {
            timeline: TimelineTransformer::new(config.anchor_policy),
            anchor_date: config.anchor_date()?,
            recognizers,
            ocr_repair,
            audit_logger,
            config,
        }))
    }

    /// Engine with the built-in patterns, gazetteer and default settings
    pub fn with_defaults() -> Result<Arc<Self>> {
        Self::new(PseudonymizationConfig::default())
    }

    /// Start a session with an empty label registry
    pub fn new_session(self: &Arc<Self>) -> Session {
        let session = Session {
            id: SessionId::new(),
            engine: Arc::clone(self),
            registry: Arc::new(Mutex::new(LabelRegistry::new())),
            aborted: Arc::new(AtomicBool::new(false)),
        };
        tracing::debug!(session_id = %session.id, "Session started");
        session
    }

    pub fn config(&self) -> &PseudonymizationConfig {
        &self.config
    }

    /// Categories the engine detects
    pub fn categories(&self) -> Vec<Category> {
        self.recognizers.categories()
    }

    /// Check if in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }
}

fn build_recognizers(config: &PseudonymizationConfig) -> Result<RecognizerSet> {
    let mut set = RecognizerSet::new();

    let mut library = match &config.pattern_library {
        Some(path) => PatternLibrary::from_file(path)?,
        None => PatternLibrary::default_patterns()?,
    };
    library.retain_categories(&config.categories);
    for recognizer in library.into_recognizers() {
        set.push(recognizer);
    }

    if config.is_enabled(Category::Ziekenhuis) || config.is_enabled(Category::Plaats) {
        let mut gazetteer = TomlGazetteer::embedded()?;
        if let Some(path) = &config.gazetteer_path {
            gazetteer = gazetteer.merged(TomlGazetteer::from_file(path)?);
        }
        for (category, confidence) in [
            (Category::Ziekenhuis, HOSPITAL_CONFIDENCE),
            (Category::Plaats, PLACE_CONFIDENCE),
        ] {
            if config.is_enabled(category) {
                set.push(Box::new(GazetteerRecognizer::new(
                    &gazetteer, category, confidence,
                )?));
            }
        }
    }

    if config.is_enabled(Category::Naam) {
        set.push(Box::new(NameRecognizer::new(
            config.names.min_tokens,
            &config.names.extra_stop_words,
        )?));
    }

    if config.is_enabled(Category::Datum) {
        set.push(Box::new(DateRecognizer::new(config.two_digit_year_pivot)?));
    }

    Ok(set)
}

/// Start a session on an engine with default settings
pub fn new_session() -> Result<Session> {
    Ok(PseudonymizationEngine::with_defaults()?.new_session())
}

/// One pseudonymization session
///
/// Cloning a session shares its registry: clones may process documents from
/// several threads or tasks and still hand out one number per entity.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    engine: Arc<PseudonymizationEngine>,
    registry: Arc<Mutex<LabelRegistry>>,
    aborted: Arc<AtomicBool>,
}

/// Outcome of a batch run
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successfully pseudonymized documents, in input order
    pub documents: Vec<PseudonymizedDocument>,
    /// Failed documents, in input order
    pub failures: Vec<DocumentErrorDetail>,
    /// Aggregated report
    pub report: BatchReport,
}

impl BatchOutcome {
    /// Whether the session was aborted before the batch finished
    pub fn aborted(&self) -> bool {
        self.report.aborted
    }
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn engine(&self) -> &Arc<PseudonymizationEngine> {
        &self.engine
    }

    /// Whether a fatal error has invalidated this session
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Pseudonymize text with a generated document id
    pub fn process(&self, text: &str) -> Result<PseudonymizedDocument> {
        self.process_document(Document::new(text))
    }

    /// Pseudonymize a document
    pub fn process_document(&self, document: Document) -> Result<PseudonymizedDocument> {
        self.process_with_anchor(document, None)
    }

    /// Pseudonymize a document against an explicit anchor date.
    ///
    /// `anchor` overrides both the configured anchor date and the anchor
    /// policy; `[T+0]` is then that date even when it does not occur in the
    /// text.
    pub fn process_with_anchor(
        &self,
        document: Document,
        anchor: Option<NaiveDate>,
    ) -> Result<PseudonymizedDocument> {
        if self.is_aborted() {
            return Err(KineticError::RegistryConsistency(format!(
                "session {} was aborted by an earlier registry failure",
                self.id
            )));
        }

        let result = self.run(document, anchor);
        if let Err(e) = &result {
            if e.is_session_fatal() {
                self.aborted.store(true, Ordering::SeqCst);
                tracing::error!(session_id = %self.id, error = %e, "Session aborted");
            }
        }
        result
    }

    fn run(&self, document: Document, explicit: Option<NaiveDate>) -> Result<PseudonymizedDocument> {
        let start = Instant::now();
        let engine = &self.engine;
        let document_id = document.id;
        crate::log_document_start!(&document_id, &self.id);

        let mut warnings = Vec::new();
        let text = match &engine.ocr_repair {
            Some(repair) => {
                let (text, repaired) = repair.repair(&document.text);
                if repaired > 0 {
                    tracing::debug!(document_id = %document_id, repaired, "OCR separators repaired");
                    warnings.push(format!("Repaired {repaired} OCR-damaged separators"));
                }
                text.into_owned()
            }
            None => document.text,
        };

        let recognition = engine
            .recognizers
            .recognize_all(&text, engine.config.parallel_recognizers)?;
        let resolution = resolve(recognition.spans);

        let decision =
            engine
                .timeline
                .choose_anchor(&text, &resolution.spans, explicit.or(engine.anchor_date));
        if let Some(warning) = decision.warning {
            tracing::warn!(document_id = %document_id, "{warning}");
            warnings.push(warning);
        }
        let anchor = decision.anchor;

        // fail before the registry is touched, so a rejected document leaves no labels behind
        if anchor.is_none() && resolution.spans.iter().any(|s| s.category() == Category::Datum) {
            return Err(KineticError::DateResolution(format!(
                "document {document_id} has date spans but no anchor date"
            )));
        }

        // labels go into a working copy that replaces the session registry
        // only after the audit entry is written
        let mut registry = self.lock_registry()?;
        let mut working = registry.clone();
        let rewritten = rewrite(&text, &resolution.spans, |span| match span.category() {
            Category::Datum => TimelineTransformer::render(anchor.as_ref(), span),
            category => working.assign(category, span.raw_text()),
        })?;
        working.verify()?;

        let statistics = DocumentStatistics {
            substitutions: rewritten.substitutions,
            validation_failures: recognition.rejected,
            overlaps_discarded: resolution.overlaps_discarded,
        };

        let result = PseudonymizedDocument {
            document_id,
            pseudonymized_text: rewritten.text,
            audit_record: rewritten.audit_record,
            label_registry_snapshot: working.snapshot(),
            anchor: anchor.map(|a| a.date()),
            statistics,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        };

        if let Some(logger) = &engine.audit_logger {
            let originals: Vec<&str> = resolution.spans.iter().map(|s| s.raw_text()).collect();
            logger.log_document(self.id, &result, &originals)?;
        }

        *registry = working;
        drop(registry);

        crate::log_document_complete!(
            &result.document_id,
            result.total_substitutions(),
            start.elapsed()
        );

        Ok(result)
    }

    /// Current registry contents
    pub fn snapshot(&self) -> Result<RegistrySnapshot> {
        Ok(self.lock_registry()?.snapshot())
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, LabelRegistry>> {
        self.registry.lock().map_err(|_| {
            KineticError::RegistryConsistency(
                "label registry lock poisoned by a panicked document task".to_string(),
            )
        })
    }

    /// Pseudonymize documents in input order.
    ///
    /// Each document runs on a blocking task, bounded by `time_budget` when
    /// given. A failed document is recorded and skipped; a session-fatal
    /// error stops the batch. A document that exceeds its budget is reported
    /// as failed, but its task still runs to completion and may register
    /// labels.
    pub async fn process_batch(
        &self,
        documents: Vec<Document>,
        time_budget: Option<Duration>,
    ) -> BatchOutcome {
        let total = documents.len();
        let mut outcome = BatchOutcome {
            documents: Vec::with_capacity(total),
            failures: Vec::new(),
            report: BatchReport::for_session(self.id),
        };

        for (index, document) in documents.into_iter().enumerate() {
            crate::log_batch_progress!(index + 1, total);

            let document_id = document.id.to_string();
            let session = self.clone();
            let task = tokio::task::spawn_blocking(move || session.process_document(document));

            let joined = match time_budget {
                Some(budget) => match tokio::time::timeout(budget, task).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        let err = KineticError::Timeout(format!(
                            "document {document_id} exceeded its budget of {} ms",
                            budget.as_millis()
                        ));
                        self.record_failure(&mut outcome, &document_id, &err);
                        continue;
                    }
                },
                None => task.await,
            };

            let result = joined.unwrap_or_else(|e| {
                Err(KineticError::Other(format!(
                    "document task for {document_id} failed: {e}"
                )))
            });

            match result {
                Ok(pseudonymized) => {
                    outcome.report.add_document(&pseudonymized);
                    outcome.documents.push(pseudonymized);
                }
                Err(err) => {
                    self.record_failure(&mut outcome, &document_id, &err);
                    if err.is_session_fatal() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            session_id = %self.id,
            processed = outcome.report.documents_processed,
            failed = outcome.report.documents_failed,
            aborted = outcome.report.aborted,
            "Batch finished"
        );

        outcome
    }

    fn record_failure(&self, outcome: &mut BatchOutcome, document_id: &str, err: &KineticError) {
        crate::log_error_with_context!(err, document_id);
        let detail = DocumentErrorDetail::from(err).with_document_id(document_id);
        outcome.report.add_failure(&detail);
        outcome.failures.push(detail);
    }
}
