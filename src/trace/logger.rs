use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::trace::trace::TraceEvent;

/// Append-only JSONL sink for phase events, one line per phase.
///
/// A file that cannot be opened leaves the logger disabled; detection runs
/// the same either way.
pub struct TraceLogger {
    path: PathBuf,
    sink: Option<Mutex<BufWriter<File>>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let sink = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(Mutex::new(BufWriter::new(file))),
            Err(e) => {
                warn!(path = %path.display(), "Could not open trace file: {}", e);
                None
            }
        };
        Self { path, sink }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Appends the phase events of one detection run and flushes. Returns
    /// the number of lines written.
    pub fn log_run(&self, events: &[TraceEvent]) -> usize {
        let Some(sink) = &self.sink else {
            return 0;
        };
        let Ok(mut writer) = sink.lock() else {
            warn!(path = %self.path.display(), "Trace sink poisoned, dropping run");
            return 0;
        };

        let mut written = 0;
        for event in events {
            let line = match serde_json::to_string(event) {
                Ok(line) => line,
                Err(e) => {
                    warn!(phase = %event.phase, "Skipping unserializable trace event: {}", e);
                    continue;
                }
            };
            if let Err(e) = writeln!(writer, "{}", line) {
                warn!(path = %self.path.display(), "Trace write failed: {}", e);
                return written;
            }
            written += 1;
        }

        if let Err(e) = writer.flush() {
            warn!(path = %self.path.display(), "Trace flush failed: {}", e);
        }
        written
    }
}
