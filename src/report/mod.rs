// Report output
//
// Keywords describe what they saved as `ReportEvent`s; a `ReportSink` decides
// where those end up.

mod events;
mod link;

pub use events::{escape_html, ReportEvent};
pub use link::link_path;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Receives report events
pub trait ReportSink: Send + Sync {
    fn record(&self, event: &ReportEvent);
}

/// Logs events through `tracing`
#[derive(Debug, Default, Clone)]
pub struct TracingReport;

impl ReportSink for TracingReport {
    fn record(&self, event: &ReportEvent) {
        info!(target: "screencap::report", event = event.name(), "{}", event.to_html());
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Appends one `<div>` per event to an HTML file
#[derive(Debug)]
pub struct HtmlFileReport {
    path: PathBuf,
    file: Mutex<File>,
}

impl HtmlFileReport {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(open_append(path)?),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for HtmlFileReport {
    fn record(&self, event: &ReportEvent) {
        let Ok(mut file) = self.file.lock() else {
            warn!("Report file {:?} is poisoned", self.path);
            return;
        };
        let line = format!(
            "<div class=\"screencap {}\">{}</div>\n",
            event.name(),
            event.to_html()
        );
        if let Err(e) = file.write_all(line.as_bytes()) {
            warn!("Failed to write report {:?}: {}", self.path, e);
        }
    }
}

/// Appends one JSON object per line
#[derive(Debug)]
pub struct JsonLinesReport {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesReport {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(open_append(path)?),
        })
    }
}

impl ReportSink for JsonLinesReport {
    fn record(&self, event: &ReportEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize report event: {}", e);
                return;
            }
        };
        let Ok(mut file) = self.file.lock() else {
            warn!("Report file {:?} is poisoned", self.path);
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            warn!("Failed to write report {:?}: {}", self.path, e);
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryReport {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl MemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl ReportSink for MemoryReport {
    fn record(&self, event: &ReportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> ReportEvent {
        ReportEvent::Message {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_memory_report_collects_in_order() {
        let report = MemoryReport::new();
        let shared = report.clone();
        report.record(&message("one"));
        shared.record(&message("two"));
        assert_eq!(report.events(), vec![message("one"), message("two")]);

        report.clear();
        assert!(shared.events().is_empty());
    }

    #[test]
    fn test_html_report_appends_divs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        let report = HtmlFileReport::create(&path).unwrap();
        report.record(&message("a < b"));
        report.record(&message("done"));

        let html = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            html,
            "<div class=\"screencap message\">a &lt; b</div>\n\
             <div class=\"screencap message\">done</div>\n"
        );
    }

    #[test]
    fn test_json_lines_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.jsonl");
        let report = JsonLinesReport::create(&path).unwrap();
        report.record(&ReportEvent::ScreenshotLinked {
            path: PathBuf::from("/logs/a.png"),
            link: "a.png".to_string(),
        });

        let text = std::fs::read_to_string(&path).unwrap();
        let back: ReportEvent = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(back.name(), "screenshot_linked");
        assert_eq!(text.lines().count(), 1);
    }
}
