//! Append-only JSON-lines result sink.
//!
//! One serialized record per line, appended per task. Records are never
//! rewritten; re-opening the same path keeps accumulating, which is what
//! lets interrupted benchmark runs resume without clobbering earlier
//! results.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Open `path` for appending, creating it if missing.
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one record as a single JSON line and flush it, so a crash
    /// mid-run loses at most the task in flight.
    pub fn append<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        let line = serde_json::to_string(record).map_err(io::Error::from)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
