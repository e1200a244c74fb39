//! End-to-end pipeline tests using the offline improver.

use docmend::model::{Document, Paragraph, Run, RunStyle};
use docmend::output::{save, OutputFormat};
use docmend::print::PrintOutcome;
use docmend::rewrite::RewritePath;
use docmend::{Config, Pipeline};
use std::path::Path;

fn test_config(root: &Path) -> Config {
    Config {
        output_format: OutputFormat::Txt,
        auto_print: false,
        ..Config::default()
    }
    .with_data_dir(root.join("data"))
}

#[test]
fn test_txt_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.ensure_dirs().unwrap();

    let source = config.incoming_dir().join("note.txt");
    std::fs::write(&source, "i dont agree.\ncant say why.").unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let record = pipeline.process_file(&source).unwrap();

    assert_eq!(record.source_file, source);
    assert_eq!(record.rewrite_path, RewritePath::Plain);
    assert_eq!(record.print_outcome, PrintOutcome::Skipped);
    assert!(record.original_length > 0);

    let improved = std::fs::read_to_string(&record.output_file).unwrap();
    assert!(improved.contains("I don't agree."));
    assert!(improved.contains("Can't say why."));
}

#[test]
fn test_docx_preserves_run_structure() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_format: OutputFormat::Docx,
        ..test_config(dir.path())
    };
    config.ensure_dirs().unwrap();

    let mut doc = Document::new();
    let mut p = Paragraph::new();
    p.add_run(Run::styled(
        "dont ",
        RunStyle {
            bold: Some(true),
            ..Default::default()
        },
    ));
    p.add_run(Run::new("forget this"));
    doc.add_paragraph(p);

    let source = save(&doc, &config.incoming_dir().join("memo.docx"), OutputFormat::Docx).unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let record = pipeline.process_file(&source).unwrap();

    assert_eq!(record.rewrite_path, RewritePath::Preserved);

    let improved = docmend::load_docx(&record.output_file).unwrap();
    assert_eq!(improved.paragraph_count(), 1);
    assert_eq!(improved.plain_text(), "Don't forget this");
    // the leading run keeps its bold styling through the rewrite
    assert_eq!(improved.paragraphs[0].runs[0].style.bold, Some(true));
}

#[test]
fn test_record_written_to_logs_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.ensure_dirs().unwrap();

    let source = config.incoming_dir().join("note.txt");
    std::fs::write(&source, "hello there").unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    pipeline.process_file(&source).unwrap();

    let records: Vec<_> = std::fs::read_dir(config.logs_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
        .collect();
    assert_eq!(records.len(), 1);

    let json = std::fs::read_to_string(records[0].path()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed["change_summary"].is_string());
    assert!(parsed["original_length"].is_number());
}

#[test]
fn test_process_pending_archives_originals() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.ensure_dirs().unwrap();

    std::fs::write(config.incoming_dir().join("a.txt"), "first file").unwrap();
    std::fs::write(config.incoming_dir().join("b.txt"), "second file").unwrap();
    // unsupported extensions are ignored by the sweep
    std::fs::write(config.incoming_dir().join("skip.tmp"), "ignored").unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let records = pipeline.process_pending().unwrap();

    assert_eq!(records.len(), 2);
    assert!(!config.incoming_dir().join("a.txt").exists());
    assert!(config.processed_dir().join("original_a.txt").exists());
    assert!(config.processed_dir().join("original_b.txt").exists());
    assert!(config.incoming_dir().join("skip.tmp").exists());
}

#[test]
fn test_each_run_gets_its_own_record() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.ensure_dirs().unwrap();

    // both files process within the same second
    std::fs::write(config.incoming_dir().join("a.txt"), "first file").unwrap();
    std::fs::write(config.incoming_dir().join("b.txt"), "second file").unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let records = pipeline.process_pending().unwrap();
    assert_eq!(records.len(), 2);

    let on_disk: Vec<_> = std::fs::read_dir(config.logs_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
        .collect();
    assert_eq!(on_disk.len(), 2);
}

#[test]
fn test_oversized_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        max_file_size_mb: 1,
        ..test_config(dir.path())
    };
    config.ensure_dirs().unwrap();

    let source = config.incoming_dir().join("big.txt");
    std::fs::write(&source, vec![b'a'; 2 * 1024 * 1024]).unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.process_file(&source);
    assert!(matches!(
        result,
        Err(docmend::Error::FileTooLarge { .. })
    ));
}

#[test]
fn test_failing_file_does_not_stop_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    config.ensure_dirs().unwrap();

    // a .docx that is not a zip archive fails extraction
    std::fs::write(config.incoming_dir().join("broken.docx"), "not a docx").unwrap();
    std::fs::write(config.incoming_dir().join("good.txt"), "fine text").unwrap();

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let records = pipeline.process_pending().unwrap();

    assert_eq!(records.len(), 1);
    // the failing file stays in place for inspection
    assert!(config.incoming_dir().join("broken.docx").exists());
}
