use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cli::config::{AppConfig, PageSource, build_detector_config};
use crate::config::DetectorConfig;
use crate::detector::context::FormContext;
use crate::detector::detector::FieldDetector;
use crate::dom::document::Document;
use crate::error::DetectionError;
use crate::report::console::{format_batch_report, format_context_report};
use crate::report::report_model::{BatchReport, PageResult};
use crate::trace::logger::TraceLogger;

// ============================================================================
// detect subcommand
// ============================================================================

/// Detect one page and print or write the result.
#[allow(clippy::too_many_arguments)]
pub fn cmd_detect(
    source: &PageSource,
    format: Option<&str>,
    threshold: Option<f32>,
    diagnostic: bool,
    trace: Option<&str>,
    output: Option<&str>,
    verbose: u8,
    app: &AppConfig,
) -> Result<FormContext, Box<dyn std::error::Error>> {
    let (label, document) = load_page(source)?;
    let config = build_detector_config(&app.detection, threshold, diagnostic);

    let mut detector = FieldDetector::new(config);
    if let Some(path) = trace.or(app.output.trace.as_deref()) {
        let tracer = TraceLogger::new(path);
        if tracer.is_enabled() {
            detector = detector.with_tracer(tracer);
        } else {
            warn!("Trace file {} unavailable, detecting without a trace", path);
        }
    }

    info!("Detecting fields in {}", label);
    let context = detector.detect(&document);

    let format = format.unwrap_or(app.output.format.as_str());
    let rendered = render_context(&context, format, &label, verbose)?;
    write_output(output, &rendered)?;

    Ok(context)
}

// ============================================================================
// batch subcommand
// ============================================================================

/// Detect every page in `dir`; returns whether all pages ran without error.
pub fn cmd_batch(
    dir: &str,
    format: Option<&str>,
    output: Option<&str>,
    app: &AppConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let pages = list_pages(dir)?;

    if pages.is_empty() {
        eprintln!("No pages found in: {}", dir);
        return Ok(true);
    }

    let start = Instant::now();
    let report = run_batch(&pages, &app.detection, dir);
    let report = report.with_duration(start.elapsed().as_millis());

    let rendered = match format.unwrap_or(app.output.format.as_str()) {
        "json" => serde_json::to_string_pretty(&report)
            .map_err(|e| DetectionError::Render(e.to_string()))?,
        _ => format_batch_report(&report),
    };
    write_output(output, &rendered)?;

    Ok(report.all_succeeded())
}

/// Run one detector over every page. Load failures become failed entries.
pub fn run_batch(pages: &[PathBuf], config: &DetectorConfig, suite_name: &str) -> BatchReport {
    let mut detector = FieldDetector::new(config.clone());
    let mut results = Vec::new();

    for path in pages {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let result = match load_document(path) {
            Ok(document) => PageResult::new(&name, detector.detect(&document)),
            Err(e) => PageResult::load_failed(&name, e, config.active_threshold()),
        };
        debug!(page = %name, fields = result.context.fields.len(), "Page done");
        results.push(result);
    }

    BatchReport::from_results(suite_name, results)
}

/// `.html`/`.htm` pages and `.json` snapshots directly inside `dir`, sorted
/// by file name.
pub fn list_pages(dir: &str) -> Result<Vec<PathBuf>, DetectionError> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let p = entry?.path();
        let is_page = p
            .extension()
            .is_some_and(|e| e == "html" || e == "htm" || e == "json");
        if p.is_file() && is_page {
            pages.push(p);
        }
    }
    // Sort for deterministic order
    pages.sort();
    Ok(pages)
}

// ============================================================================
// Page loading
// ============================================================================

/// Resolve the `--file` / `--url` / `--snapshot` choice into a document and
/// a display label.
pub fn load_page(source: &PageSource) -> Result<(String, Document), DetectionError> {
    if let Some(path) = &source.file {
        return Ok((path.clone(), load_html_file(Path::new(path))?));
    }
    if let Some(url) = &source.url {
        return Ok((url.clone(), fetch_page(url)?));
    }
    if let Some(path) = &source.snapshot {
        return Ok((path.clone(), load_snapshot_file(Path::new(path))?));
    }
    Err(DetectionError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "no page source given",
    )))
}

/// HTML or JSON snapshot, chosen by extension.
pub fn load_document(path: &Path) -> Result<Document, DetectionError> {
    if path.extension().is_some_and(|e| e == "json") {
        load_snapshot_file(path)
    } else {
        load_html_file(path)
    }
}

pub fn load_html_file(path: &Path) -> Result<Document, DetectionError> {
    let html = std::fs::read_to_string(path)?;
    Ok(Document::parse_html(&html))
}

pub fn load_snapshot_file(path: &Path) -> Result<Document, DetectionError> {
    let json = std::fs::read_to_string(path)?;
    Document::from_snapshot_json(&json)
}

/// Fetch a page body over HTTP(S). Static markup only: no scripts run.
pub fn fetch_page(url: &str) -> Result<Document, DetectionError> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;
    let mut document = Document::parse_html(&body);
    let title = document.title().to_string();
    document.set_page_info(Some(url.to_string()), title);
    Ok(document)
}

// ============================================================================
// Output
// ============================================================================

pub fn render_context(
    context: &FormContext,
    format: &str,
    source: &str,
    verbose: u8,
) -> Result<String, DetectionError> {
    match format {
        "json" => {
            serde_json::to_string_pretty(context).map_err(|e| DetectionError::Render(e.to_string()))
        }
        "yaml" => serde_yaml::to_string(context).map_err(|e| DetectionError::Render(e.to_string())),
        _ => Ok(format_context_report(context, source, verbose)),
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<(), DetectionError> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => print!("{}", content),
    }
    Ok(())
}
