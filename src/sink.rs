// src/sink.rs
use std::io::{self, Write};

use crate::{
    aggregate::{AggregateReport, REPORT_HEADERS, ReportRow},
    csv,
};

/// Receives a finished report for display or export. The pipeline makes no
/// assumption about rendering, and rows arrive in whatever order the report holds.
pub trait ResultSink {
    fn deliver(&mut self, report: &AggregateReport) -> io::Result<()>;
}

/// Writes the report as CSV (header line first) to any writer.
pub struct CsvSink<W: Write> {
    out: W,
    sep: char,
    sorted: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, sep: ',', sorted: true }
    }

    pub fn tsv(mut self) -> Self {
        self.sep = '\t';
        self
    }

    /// Keep the report's own (completion) order instead of sorting.
    pub fn unsorted(mut self) -> Self {
        self.sorted = false;
        self
    }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn deliver(&mut self, report: &AggregateReport) -> io::Result<()> {
        let rows = if self.sorted { report.sorted_rows() } else { report.rows() };
        csv::write_row(&mut self.out, &REPORT_HEADERS, self.sep)?;
        for r in &rows {
            csv::write_row(&mut self.out, &r.cells(), self.sep)?;
        }
        self.out.flush()
    }
}

/// Keeps the rows in memory (GUI grid, tests).
#[derive(Default)]
pub struct MemorySink {
    pub rows: Vec<ReportRow>,
}

impl ResultSink for MemorySink {
    fn deliver(&mut self, report: &AggregateReport) -> io::Result<()> {
        self.rows = report.rows();
        Ok(())
    }
}
