//! Extraction, persistence and validation of report documents.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info, warn};

use crate::document::ParsedDocument;
use crate::error::{ReportError, Result};
use crate::extract::RecordAssembler;
use crate::models::config::ReportlintConfig;
use crate::models::record::CanonicalRecord;
use crate::report::{DiscrepancyReporter, ReportSummary};
use crate::store::DocumentStore;
use crate::validation::{DocumentValidator, RuleOutcome, ValidationRule, build_rules};

/// Record and outcomes for a document, without persistence.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub record: CanonicalRecord,
    pub outcomes: Vec<RuleOutcome>,
}

impl Inspection {
    /// Outcomes that would be reported.
    pub fn discrepancies(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.is_valid())
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: Option<PathBuf>,
    /// Identifier the store assigned to the canonical record.
    pub record_id: String,
    pub record: CanonicalRecord,
    pub outcomes: Vec<RuleOutcome>,
    pub reported: ReportSummary,
    pub processing_time_ms: u64,
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a directory run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Successfully processed documents, sorted by path.
    pub reports: Vec<DocumentReport>,
    /// Files whose record could not be read or stored, sorted by path.
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn total_files(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    /// Discrepancies persisted across all documents.
    pub fn discrepancies(&self) -> usize {
        self.reports.iter().map(|r| r.reported.reported).sum()
    }

    /// Discrepancies the store rejected across all documents.
    pub fn report_failures(&self) -> usize {
        self.reports.iter().map(|r| r.reported.failures).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.report_failures() == 0
    }
}

/// Compiled extraction and validation setup bound to a store.
///
/// A pipeline is immutable once built; batch workers share it through an
/// `Arc` and each builds its own [`DocumentValidator`].
pub struct Pipeline {
    assembler: RecordAssembler,
    rules: Vec<ValidationRule>,
    store: Arc<dyn DocumentStore>,
    documents_collection: String,
    discrepancies_collection: String,
}

impl Pipeline {
    /// Compile patterns and rules from configuration.
    pub fn from_config(config: &ReportlintConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let assembler = RecordAssembler::new(&config.extraction)?;
        let rules = build_rules(config)?;

        debug!(
            "Pipeline ready with rules [{}]",
            rules.iter().map(ValidationRule::name).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            assembler,
            rules,
            store,
            documents_collection: config.storage.documents_collection.clone(),
            discrepancies_collection: config.storage.discrepancies_collection.clone(),
        })
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Run every configured rule in order.
    pub fn validate(&self, document: &ParsedDocument) -> Vec<RuleOutcome> {
        let Some(first) = self.rules.first() else {
            return Vec::new();
        };

        let mut validator = DocumentValidator::new(first);
        validator.validate_each(&self.rules, document)
    }

    /// Assemble and validate without touching the store.
    pub fn inspect(&self, document: &ParsedDocument) -> Inspection {
        Inspection {
            record: self.assembler.assemble(document),
            outcomes: self.validate(document),
        }
    }

    /// Assemble, persist, validate, and report one document.
    ///
    /// Validation only runs once the record is stored, since discrepancies
    /// reference the stored identifier.
    pub fn process_document(&self, document: &ParsedDocument) -> Result<DocumentReport> {
        let start = Instant::now();

        let record = self.assembler.assemble(document);
        let record_id = self
            .store
            .insert_one(&self.documents_collection, &record.to_value()?)?;
        debug!("Stored record {} in {}", record_id, self.documents_collection);

        let outcomes = self.validate(document);
        for outcome in outcomes.iter().filter(|o| !o.outcome.is_valid()) {
            info!(
                "{}: {} {}",
                document.source().map_or_else(|| record_id.clone(), |p| p.display().to_string()),
                outcome.rule,
                outcome.outcome.status
            );
        }

        let reporter = DiscrepancyReporter::new(self.store.as_ref(), &self.discrepancies_collection);
        let reported = reporter.report(&record_id, &outcomes);

        Ok(DocumentReport {
            source: document.source().map(Path::to_path_buf),
            record_id,
            record,
            outcomes,
            reported,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Read, parse, and process one file.
    pub fn process_file(&self, path: &Path) -> Result<DocumentReport> {
        debug!("Processing {}", path.display());
        let document = ParsedDocument::from_file(path)?;
        let report = self.process_document(&document)?;
        debug!("Finished {} in {}ms", path.display(), report.processing_time_ms);
        Ok(report)
    }

    /// Process every `*.html` file in `dir` on at most `workers` blocking
    /// threads, waiting for all of them.
    ///
    /// `on_done` is called once per file as it completes. A failing file is
    /// recorded in the summary and never cancels the others.
    pub async fn run_directory<F>(self: &Arc<Self>, dir: &Path, workers: usize, mut on_done: F) -> Result<BatchSummary>
    where
        F: FnMut(&Path, &Result<DocumentReport>),
    {
        let files = discover(dir)?;
        info!("Found {} report(s) in {}", files.len(), dir.display());

        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<task::Id, PathBuf> = HashMap::new();
        let mut summary = BatchSummary::default();

        for path in files {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ReportError::Worker(e.to_string()))?;

            let pipeline = Arc::clone(self);
            let task_path = path.clone();
            let handle = tasks.spawn_blocking(move || {
                let _permit = permit;
                let result = pipeline.process_file(&task_path);
                (task_path, result)
            });
            pending.insert(handle.id(), path);

            while let Some(joined) = tasks.try_join_next() {
                settle(joined, &mut pending, &mut summary, &mut on_done);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            settle(joined, &mut pending, &mut summary, &mut on_done);
        }

        summary.reports.sort_by(|a, b| a.source.cmp(&b.source));
        summary.failures.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            "Processed {} file(s): {} discrepancies, {} failure(s)",
            summary.total_files(),
            summary.discrepancies(),
            summary.failures.len()
        );
        Ok(summary)
    }
}

type Joined = std::result::Result<(PathBuf, Result<DocumentReport>), task::JoinError>;

fn settle<F>(joined: Joined, pending: &mut HashMap<task::Id, PathBuf>, summary: &mut BatchSummary, on_done: &mut F)
where
    F: FnMut(&Path, &Result<DocumentReport>),
{
    let (path, result) = match joined {
        Ok((path, result)) => {
            pending.retain(|_, p| *p != path);
            (path, result)
        }
        Err(e) => {
            let path = pending.remove(&e.id()).unwrap_or_default();
            error!("Worker for {} did not finish: {}", path.display(), e);
            (path, Err(ReportError::Worker(e.to_string())))
        }
    };

    on_done(&path, &result);

    match result {
        Ok(report) => summary.reports.push(report),
        Err(e) => {
            warn!("Failed to process {}: {}", path.display(), e);
            summary.failures.push(FileFailure {
                path,
                error: e.to_string(),
            });
        }
    }
}

/// `*.html` files directly inside `dir`, sorted.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input directory not found: {}", dir.display()),
        )
        .into());
    }

    let pattern = format!("{}/*.html", glob::Pattern::escape(&dir.to_string_lossy()));

    let mut files = Vec::new();
    for entry in glob::glob(&pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))? {
        let path = entry.map_err(io::Error::from)?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
