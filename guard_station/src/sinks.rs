//! Output sinks: actuation and per-tick records.
//!
//! - [`TracingSink`] stands in for a relay/PLC driver and logs output edges.
//! - [`RecordWriter`] appends one record per tick, CSV with a fixed header or
//!   JSON lines.

use guard_common::config::RecordFormat;
use guard_common::sensor::{ActuationSink, AdapterError};
use guard_core::record::LogRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, trace};

/// Actuation sink that only logs. Output edges are logged at info.
#[derive(Debug, Default)]
pub struct TracingSink {
    last: Option<bool>,
    applied: u64,
    enabled_ticks: u64,
}

impl TracingSink {
    /// Create a sink with no output applied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `apply` calls.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Number of ticks the output was enabled.
    pub fn enabled_ticks(&self) -> u64 {
        self.enabled_ticks
    }

    /// Last applied output, if any.
    pub fn last(&self) -> Option<bool> {
        self.last
    }
}

impl ActuationSink for TracingSink {
    fn apply(&mut self, output_enabled: bool, reason: &str) -> Result<(), AdapterError> {
        self.applied += 1;
        if output_enabled {
            self.enabled_ticks += 1;
        }
        if self.last != Some(output_enabled) {
            info!(output_enabled, reason, "actuation output changed");
        } else {
            trace!(output_enabled, reason, "actuation output");
        }
        self.last = Some(output_enabled);
        Ok(())
    }
}

/// Buffered per-tick record file.
#[derive(Debug)]
pub struct RecordWriter {
    out: BufWriter<File>,
    format: RecordFormat,
    rows: u64,
}

impl RecordWriter {
    /// Create (truncate) `path`; CSV files start with the header line.
    pub fn create(path: &Path, format: RecordFormat) -> std::io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        if format == RecordFormat::Csv {
            writeln!(out, "{}", LogRecord::HEADER)?;
        }
        info!(path = %path.display(), ?format, "recording ticks");
        Ok(Self {
            out,
            format,
            rows: 0,
        })
    }

    /// Append one record.
    pub fn write(&mut self, record: &LogRecord) -> std::io::Result<()> {
        match self.format {
            RecordFormat::Csv => writeln!(self.out, "{record}")?,
            RecordFormat::JsonLines => {
                serde_json::to_writer(&mut self.out, record)?;
                self.out.write_all(b"\n")?;
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far (header excluded).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}
