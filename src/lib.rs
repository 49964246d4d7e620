use crate::{
    config::DetectorConfig,
    detector::{context::FormContext, detector::FieldDetector},
    dom::document::Document,
    error::DetectionError,
};

pub mod cli;
pub mod config;
pub mod detector;
pub mod dom;
pub mod error;
pub mod field;
pub mod phase;
pub mod report;
pub mod trace;

/// Parse `html` and run a fresh detector over it.
pub fn detect_html(html: &str, config: &DetectorConfig) -> FormContext {
    let document = Document::parse_html(html);
    FieldDetector::new(config.clone()).detect(&document)
}

/// Run a fresh detector over a browser DOM snapshot (JSON).
pub fn detect_snapshot(json: &str, config: &DetectorConfig) -> Result<FormContext, DetectionError> {
    let document = Document::from_snapshot_json(json)?;
    Ok(FieldDetector::new(config.clone()).detect(&document))
}
