use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::Mutex,
};

use crate::trace::trace::TraceEvent;

/// Appends one JSON line per pipeline stage. A trace that cannot be written
/// is reported through `tracing` and otherwise ignored.
pub struct TraceLogger {
    sink: Option<Mutex<File>>,
}

impl TraceLogger {
    /// Open (or create) the trace file in append mode.
    pub fn new(path: &Path) -> Self {
        match open_append(path) {
            Ok(file) => Self {
                sink: Some(Mutex::new(file)),
            },
            Err(e) => {
                tracing::warn!("pipeline trace disabled, cannot open {}: {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    /// A logger that drops every event.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("skipping unserializable {:?} trace event: {}", event.stage, e);
                return;
            }
        };

        // A poisoned lock still guards a usable file handle.
        let mut file = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            tracing::warn!("failed to append {:?} trace event: {}", event.stage, e);
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
