//! Report sinks for per-strategy summary rows.
//!
//! The file format is one line per strategy, tab-separated, no header:
//!
//! ```text
//! strategy_index \t usl[0] ... usl[n-1] \t wsl[0] ... wsl[n-1]
//! ```

use crate::loss::format_value;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One summary row: a strategy's averaged curves.
#[derive(Debug, Clone, Copy)]
pub struct ReportRow<'a> {
    /// 1-based processing order of the strategy
    pub strategy_index: usize,
    pub usl: &'a [f64],
    pub wsl: &'a [f64],
}

impl ReportRow<'_> {
    /// Renders the row without a trailing newline.
    pub fn render(&self) -> String {
        let mut line = self.strategy_index.to_string();
        for &v in self.usl.iter().chain(self.wsl) {
            line.push('\t');
            line.push_str(&format_value(v));
        }
        line
    }
}

/// Destination for report rows.
pub trait ReportSink {
    /// Writes one row.
    fn write_row(&mut self, row: &ReportRow<'_>) -> io::Result<()>;

    /// Flushes buffered output. Called once after the last row.
    fn finish(&mut self) -> io::Result<()>;
}

/// Writes rows as tab-separated lines to any [`Write`].
///
/// The underlying writer is buffered; it is flushed by [`finish`] and closed
/// when the sink is dropped, whether or not the run succeeded.
///
/// [`finish`]: ReportSink::finish
pub struct TsvReportSink<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> TsvReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl TsvReportSink<File> {
    /// Creates (or truncates) the report file, creating parent directories.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> ReportSink for TsvReportSink<W> {
    fn write_row(&mut self, row: &ReportRow<'_>) -> io::Result<()> {
        writeln!(self.writer, "{}", row.render())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Collects rendered rows in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    pub rows: Vec<String>,
    pub finished: bool,
}

impl ReportSink for MemoryReportSink {
    fn write_row(&mut self, row: &ReportRow<'_>) -> io::Result<()> {
        self.rows.push(row.render());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}
