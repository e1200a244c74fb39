//! End-to-end processing pipeline.
//!
//! For each input file: validate, extract text, improve it, rewrite a
//! document, save, optionally print, and drop one JSON record into the
//! logs directory. DOCX inputs are rewritten in place of their original
//! run structure when formatting preservation is enabled; any failure on
//! that path falls back to a plain rebuild rather than failing the run.

use crate::config::{Config, Provider};
use crate::detect::{validate_input, DocFormat};
use crate::error::{Error, Result};
use crate::extract::ExtractorRegistry;
use crate::improve::{Improvement, OpenAiImprover, RuleImprover, TextImprover};
use crate::model::Document;
use crate::output::save;
use crate::print::{PrintDispatcher, PrintOutcome};
use crate::rewrite::{rewrite_plain, rewrite_preserving, RewritePath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const MAX_IMPROVE_RETRIES: u32 = 3;

/// One record per processing run, written as JSON to the logs directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub timestamp: DateTime<Utc>,
    pub source_file: PathBuf,
    pub output_file: PathBuf,
    pub change_summary: String,
    /// Character count of the extracted text
    pub original_length: usize,
    /// Character count of the improved text
    pub improved_length: usize,
    pub rewrite_path: RewritePath,
    pub print_outcome: PrintOutcome,
}

/// The document improvement pipeline.
pub struct Pipeline {
    config: Config,
    registry: ExtractorRegistry,
    improver: Box<dyn TextImprover>,
    dispatcher: PrintDispatcher,
}

impl Pipeline {
    /// Build a pipeline with the improver named by the configuration.
    pub fn new(config: Config) -> Result<Self> {
        let improver: Box<dyn TextImprover> = match config.provider {
            Provider::Rules => Box::new(RuleImprover::new()),
            Provider::OpenAi => {
                let key = config
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".into()))?;
                Box::new(OpenAiImprover::with_endpoint(
                    key,
                    &config.openai_base_url,
                    &config.openai_model,
                    config.max_processing_secs,
                )?)
            }
        };
        Ok(Self::with_improver(config, improver))
    }

    /// Build a pipeline around a caller-supplied improver.
    pub fn with_improver(config: Config, improver: Box<dyn TextImprover>) -> Self {
        let dispatcher =
            PrintDispatcher::new(config.printer_name.clone(), config.use_default_printer);
        Self {
            config,
            registry: ExtractorRegistry::with_defaults(),
            improver,
            dispatcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline on a single file.
    pub fn process_file(&self, path: &Path) -> Result<ProcessingRecord> {
        let timestamp = Utc::now();
        log::info!("processing {}", path.display());

        let (format, size) = validate_input(path, self.config.max_file_size_bytes())?;
        log::debug!("validated {} ({format}, {size} bytes)", path.display());

        let extraction = self.registry.extract_as(path, format)?;
        let original_length = extraction.char_count();
        log::info!("extracted {original_length} chars via {}", extraction.strategy);

        let improvement = self.improve_with_retry(&extraction.text, Some(format.extension()))?;
        let improved_length = improvement.improved_text.chars().count();
        log::info!("improvement done: {}", improvement.summary);

        let (doc, rewrite_path) = self.rewrite(path, format, &improvement);

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let output_name = format!(
            "processed_{}_{stem}.{}",
            timestamp.format("%Y%m%d_%H%M%S"),
            self.config.output_format.extension()
        );
        let target = self.config.processed_dir().join(output_name);
        let (output_file, rewrite_path) = self.finish_save(
            save(&doc, &target, self.config.output_format),
            rewrite_path,
            &improvement.improved_text,
            &target,
        )?;

        let print_outcome = if self.config.auto_print {
            match self.dispatcher.dispatch(&output_file, None) {
                Ok(printer) => PrintOutcome::Sent(printer),
                Err(e) => {
                    log::warn!("printing failed, continuing: {e}");
                    PrintOutcome::Failed(e.to_string())
                }
            }
        } else {
            PrintOutcome::Skipped
        };

        let record = ProcessingRecord {
            timestamp,
            source_file: path.to_path_buf(),
            output_file,
            change_summary: improvement.summary.clone(),
            original_length,
            improved_length,
            rewrite_path,
            print_outcome,
        };
        self.write_record(&record)?;

        log::info!("pipeline complete for {}", path.display());
        Ok(record)
    }

    /// Build the output document, preserving DOCX run structure when
    /// configured and possible.
    fn rewrite(
        &self,
        path: &Path,
        format: DocFormat,
        improvement: &Improvement,
    ) -> (Document, RewritePath) {
        if self.config.preserve_formatting && format == DocFormat::Docx {
            match self.rewrite_preserved(path, &improvement.improved_text) {
                Ok(doc) => return (doc, RewritePath::Preserved),
                Err(e) => {
                    log::warn!("formatting preservation failed, using plain rebuild: {e}");
                }
            }
        }
        (rewrite_plain(&improvement.improved_text), RewritePath::Plain)
    }

    /// Resolve the first save attempt. A preserved document that fails to
    /// serialize is rebuilt plain and saved once more; that failure is fatal.
    fn finish_save(
        &self,
        first: Result<PathBuf>,
        rewrite_path: RewritePath,
        improved_text: &str,
        target: &Path,
    ) -> Result<(PathBuf, RewritePath)> {
        match first {
            Ok(file) => Ok((file, rewrite_path)),
            Err(e) if rewrite_path == RewritePath::Preserved => {
                log::warn!("saving preserved document failed, rebuilding plain: {e}");
                let doc = rewrite_plain(improved_text);
                let file = save(&doc, target, self.config.output_format)?;
                Ok((file, RewritePath::Plain))
            }
            Err(e) => Err(e),
        }
    }

    fn rewrite_preserved(&self, path: &Path, improved_text: &str) -> Result<Document> {
        let mut doc = crate::extract::load_document(path)
            .map_err(|e| Error::Preservation(format!("cannot reload source structure: {e}")))?;
        if doc.is_empty() {
            return Err(Error::Preservation("source has no paragraphs".into()));
        }
        rewrite_preserving(&mut doc, improved_text);
        Ok(doc)
    }

    /// Improve with bounded exponential backoff on retryable failures,
    /// capped by the configured processing time budget.
    fn improve_with_retry(&self, text: &str, hint: Option<&str>) -> Result<Improvement> {
        let started = Instant::now();
        let budget = Duration::from_secs(self.config.max_processing_secs);
        let mut delay = Duration::from_secs(1);

        for attempt in 0..=MAX_IMPROVE_RETRIES {
            match self.improver.improve(text, hint) {
                Ok(improvement) => return Ok(improvement),
                Err(e) if e.is_retryable() && attempt < MAX_IMPROVE_RETRIES => {
                    if started.elapsed() + delay > budget {
                        log::error!("improvement retry budget exhausted: {e}");
                        return Err(e);
                    }
                    log::warn!(
                        "improvement failed (attempt {}/{}), retrying in {}s: {e}",
                        attempt + 1,
                        MAX_IMPROVE_RETRIES + 1,
                        delay.as_secs()
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
        unreachable!("retry loop always returns")
    }

    fn write_record(&self, record: &ProcessingRecord) -> Result<()> {
        std::fs::create_dir_all(self.config.logs_dir())?;
        let stem = record
            .source_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let name = format!(
            "processing_{}_{stem}.json",
            record.timestamp.format("%Y%m%d_%H%M%S")
        );
        let path = self.config.logs_dir().join(name);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| Error::Other(format!("cannot serialize record: {e}")))?;
        std::fs::write(&path, json)?;
        log::info!("record saved to {}", path.display());
        Ok(())
    }

    /// Process every supported file currently in the incoming directory.
    ///
    /// Each source is archived to `processed/original_<name>` after a
    /// successful run so it is not picked up again. A failing file is
    /// logged and left in place; it does not stop the sweep.
    pub fn process_pending(&self) -> Result<Vec<ProcessingRecord>> {
        self.config.ensure_dirs()?;
        let mut records = Vec::new();

        let mut entries: Vec<PathBuf> = std::fs::read_dir(self.config.incoming_dir())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .and_then(DocFormat::from_extension)
                        .is_some()
            })
            .collect();
        entries.sort();

        for path in entries {
            match self.process_file(&path) {
                Ok(record) => {
                    if let Err(e) = self.archive_original(&path) {
                        log::warn!("could not archive {}: {e}", path.display());
                    }
                    records.push(record);
                }
                Err(e) => {
                    log::error!("failed to process {}: {e}", path.display());
                }
            }
        }
        Ok(records)
    }

    fn archive_original(&self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Other(format!("bad file name: {}", path.display())))?;
        let target = self.config.processed_dir().join(format!("original_{name}"));
        std::fs::rename(path, &target)?;
        log::info!("archived original to {}", target.display());
        Ok(())
    }

    /// Poll the incoming directory forever, one sweep per interval.
    pub fn watch(&self, interval: Duration) -> Result<()> {
        self.config.ensure_dirs()?;
        log::info!(
            "watching {} every {}s",
            self.config.incoming_dir().display(),
            interval.as_secs()
        );
        loop {
            self.process_pending()?;
            std::thread::sleep(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlakyImprover {
        calls: Arc<AtomicUsize>,
        fail_times: usize,
    }

    impl TextImprover for FlakyImprover {
        fn name(&self) -> &'static str {
            "flaky"
        }
        fn improve(&self, text: &str, _hint: Option<&str>) -> Result<Improvement> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                Err(Error::ImproverUnavailable("transient".into()))
            } else {
                Ok(Improvement {
                    improved_text: text.to_string(),
                    summary: "ok".into(),
                    raw: text.to_string(),
                })
            }
        }
    }

    struct BrokenImprover;
    impl TextImprover for BrokenImprover {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn improve(&self, _text: &str, _hint: Option<&str>) -> Result<Improvement> {
            Err(Error::Extraction("not retryable".into()))
        }
    }

    fn test_config(dir: &Path) -> Config {
        Config::default().with_data_dir(dir.join("data"))
    }

    #[test]
    fn test_retry_recovers_from_transient_failure() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::with_improver(
            test_config(dir.path()),
            Box::new(FlakyImprover {
                calls: calls.clone(),
                fail_times: 2,
            }),
        );

        let improvement = pipeline.improve_with_retry("text", None).unwrap();
        assert_eq!(improvement.improved_text, "text");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_non_retryable_error_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline =
            Pipeline::with_improver(test_config(dir.path()), Box::new(BrokenImprover));
        assert!(pipeline.improve_with_retry("text", None).is_err());
    }

    #[test]
    fn test_failed_preserved_save_falls_back_to_plain() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        config.ensure_dirs().unwrap();
        let target = config.processed_dir().join("out.txt");
        let pipeline = Pipeline::with_improver(
            Config {
                output_format: crate::output::OutputFormat::Txt,
                ..config
            },
            Box::new(BrokenImprover),
        );

        let (file, path) = pipeline
            .finish_save(
                Err(Error::Save("cannot serialize run".into())),
                RewritePath::Preserved,
                "rebuilt text",
                &target,
            )
            .unwrap();
        assert_eq!(path, RewritePath::Plain);
        assert_eq!(std::fs::read_to_string(&file).unwrap().trim(), "rebuilt text");

        // a failure on the plain path stays fatal
        let err = pipeline
            .finish_save(
                Err(Error::Save("disk full".into())),
                RewritePath::Plain,
                "text",
                &target,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Save(_)));
    }

    #[test]
    fn test_retry_budget_caps_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let config = Config {
            max_processing_secs: 1,
            ..test_config(dir.path())
        };
        let pipeline = Pipeline::with_improver(
            config,
            Box::new(FlakyImprover {
                calls: calls.clone(),
                fail_times: usize::MAX,
            }),
        );

        assert!(pipeline.improve_with_retry("text", None).is_err());
        assert!(calls.load(Ordering::SeqCst) <= (MAX_IMPROVE_RETRIES + 1) as usize);
    }
}
