use thiserror::Error;

use crate::dom::dom_model::NodeId;

/// Every fallible operation in the crate reports through this type.
///
/// Inside a detection run these errors never reach the caller: phase-level
/// failures are logged and treated as "no candidates", and anything escaping
/// the phases ends up in `FormContext::error`.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Selector syntax outside the supported subset
    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// A node handle that no longer resolves (mutated or foreign document)
    #[error("Node {0:?} not found in document")]
    NodeNotFound(NodeId),

    /// DOM snapshot JSON could not be decoded
    #[error("Invalid DOM snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Page fetch failed (CLI `--url` only; the engine itself does no I/O)
    #[error("HTTP error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Report serialization (JSON/YAML output)
    #[error("Render error: {0}")]
    Render(String),

    /// A detection phase failed for a reason other than the above
    #[error("Phase '{phase}' failed: {message}")]
    Phase { phase: String, message: String },
}
