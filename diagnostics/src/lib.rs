//! ===============================================
//! Metadata — diagnostics v0.1.0
//! ===============================================
//! _component_:     append-only debug log
//! _description_:   Timestamped, dual-format (text + JSON) log used by
//!                  `jackc` to record symbol-table dumps and, optionally,
//!                  compile diagnostics while translating a Jack source
//!                  file to VM code.
//!
//! _notes_:
//! - Entries are appended, never overwritten; callers own log rotation.
//! - Every write method is a no-op unless the `debug_mode` feature is
//!   compiled in, so release builds of `jackc` pay nothing for this.
//! ===============================================

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// What kind of thing produced this log entry.
///
/// Mirrors the error taxonomy a caller classifies its own failures with
/// (lexical / syntactic / semantic / I/O), plus a plain `Dump` kind for
/// symbol-table snapshots that aren't errors at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Dump,
    Lexical,
    Syntactic,
    Semantic,
    Io,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Kind::Dump => "dump",
            Kind::Lexical => "lexical",
            Kind::Syntactic => "syntactic",
            Kind::Semantic => "semantic",
            Kind::Io => "io",
        };
        write!(f, "{label}")
    }
}

/// A single entry appended to the debug log.
///
/// `body` holds the free-form payload: for a symbol-table dump this is the
/// `<name>: <type> <segment> <index>` block (one line per entry); for a
/// diagnostic it is the error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: Kind,
    pub tag: String,
    pub body: String,
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(kind: Kind, tag: impl Into<String>, body: impl Into<String>) -> Self {
        LogEntry {
            kind,
            tag: tag.into(),
            body: body.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    fn to_text(&self) -> String {
        format!(
            "==== {} [{}] {} ====\n{}\n",
            self.tag, self.kind, self.timestamp, self.body
        )
    }
}

/// Appends `entry` to both `<path>` (human-readable text) and
/// `<path>.json` (one JSON object per line), creating parent directories
/// as needed.
///
/// Compiled away to nothing unless the `debug_mode` feature is enabled,
/// so call sites don't need their own `#[cfg(...)]` guards.
#[cfg(feature = "debug_mode")]
pub fn append(path: impl AsRef<Path>, entry: &LogEntry) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut text_file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(text_file, "{}", entry.to_text())?;

    let json_path = json_sibling(path);
    let mut json_file = OpenOptions::new().create(true).append(true).open(json_path)?;
    let json_line = serde_json::to_string(entry)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    writeln!(json_file, "{json_line}")?;

    Ok(())
}

#[cfg(not(feature = "debug_mode"))]
pub fn append(_path: impl AsRef<Path>, _entry: &LogEntry) -> io::Result<()> {
    Ok(())
}

fn json_sibling(path: &Path) -> std::path::PathBuf {
    let mut json_path = path.as_os_str().to_owned();
    json_path.push(".json");
    std::path::PathBuf::from(json_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn log_entry_formats_tag_kind_and_body() {
        let entry = LogEntry::new(Kind::Dump, "Foo class", "x: int this 0\ny: int this 1");
        let text = entry.to_text();
        assert!(text.starts_with("==== Foo class [dump]"));
        assert!(text.contains("x: int this 0"));
        assert!(text.contains("y: int this 1"));
    }

    #[test]
    #[cfg(feature = "debug_mode")]
    fn append_writes_text_and_json_siblings() {
        let dir = std::env::temp_dir().join(format!("jackc-diag-test-{}", std::process::id()));
        let log_path = dir.join("debug.log");
        let entry = LogEntry::new(Kind::Dump, "Foo.new method", "this: Foo argument 0");

        append(&log_path, &entry).unwrap();

        let text = fs::read_to_string(&log_path).unwrap();
        assert!(text.contains("Foo.new method"));

        let json_path = json_sibling(&log_path);
        let json_text = fs::read_to_string(&json_path).unwrap();
        assert!(json_text.contains("\"tag\":\"Foo.new method\""));

        let _ = fs::remove_dir_all(&dir);
    }
}
