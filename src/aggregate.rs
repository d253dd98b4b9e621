// src/aggregate.rs
//! Aggregation phase: every stored artifact for one period, merged.
//!
//! Artifacts are re-read and re-resolved rather than trusted, so files written
//! by an older build, or by hand, go through the same column policy. Records
//! are tagged with the company id from the file name, not from the table.

use std::{
    cmp::Ordering as CmpOrdering,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
    thread,
};

use crate::{
    config::consts::AGGREGATE_WORKERS,
    extract::{DisclosureRecord, extract_changes, fmt_shares},
    period::normalize_period,
    progress::Progress,
    store::{ArtifactStore, StoreError},
};

/// Column names of the combined report, in [`ReportRow`] order.
pub const REPORT_HEADERS: [&str; 7] = ["公司", "身份別", "姓名", "上月持股", "增加持股", "減少持股", "本月持股"];

/// One line of the report as handed to a [`crate::sink::ResultSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub company_id: String,
    pub role: String,
    pub person_name: String,
    pub prior_holding: f64,
    pub increase_delta: f64,
    pub decrease_delta: f64,
    pub current_holding: f64,
}

impl From<&DisclosureRecord> for ReportRow {
    fn from(r: &DisclosureRecord) -> Self {
        Self {
            company_id: r.company_id.clone(),
            role: r.role.clone(),
            person_name: r.person_name.clone(),
            prior_holding: r.prior_holding,
            increase_delta: r.increase_delta,
            decrease_delta: r.decrease_delta,
            current_holding: r.current_holding,
        }
    }
}

impl ReportRow {
    /// Cells in [`REPORT_HEADERS`] order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.company_id.clone(),
            self.role.clone(),
            self.person_name.clone(),
            fmt_shares(self.prior_holding),
            fmt_shares(self.increase_delta),
            fmt_shares(self.decrease_delta),
            fmt_shares(self.current_holding),
        ]
    }
}

/// Changed records of one period across companies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateReport {
    pub year: String,
    pub month: String,
    /// Completion order of the aggregation workers; see [`AggregateReport::sorted`].
    pub records: Vec<DisclosureRecord>,
    /// Where the combined file was written, if it was.
    pub combined_path: Option<PathBuf>,
}

impl AggregateReport {
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn len(&self) -> usize { self.records.len() }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.records.iter().map(ReportRow::from).collect()
    }

    /// Records ordered by company id, then person name.
    pub fn sorted(&self) -> Vec<DisclosureRecord> {
        let mut out = self.records.clone();
        out.sort_by(|a, b| match a.company_id.cmp(&b.company_id) {
            CmpOrdering::Equal => a.person_name.cmp(&b.person_name),
            o => o,
        });
        out
    }

    pub fn sorted_rows(&self) -> Vec<ReportRow> {
        self.sorted().iter().map(ReportRow::from).collect()
    }
}

/// Merge every artifact stored for (year, month).
///
/// Per-artifact failures are logged and skipped. The combined file is written
/// only when there is something to report; an empty period leaves an existing
/// combined file alone.
pub fn run(
    store: &ArtifactStore,
    year: &str,
    month: &str,
    mut progress: Option<&mut dyn Progress>,
) -> Result<AggregateReport, StoreError> {
    let (year, month) = normalize_period(year, month)?;
    let matches = store.list_matching(&year, &month)?;
    logf!("Aggregate: {year}/{month}: {} artifact(s)", matches.len());

    let mut report = AggregateReport { year: year.clone(), month: month.clone(), ..Default::default() };
    if let Some(p) = progress.as_deref_mut() {
        p.begin(matches.len());
    }
    if matches.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        return Ok(report);
    }

    let counter = AtomicUsize::new(0);
    let workers = AGGREGATE_WORKERS.min(matches.len()).max(1);
    let (res_tx, res_rx) = mpsc::channel::<(String, Result<Vec<DisclosureRecord>, String>)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = res_tx.clone();
            let counter = &counter;
            let matches = &matches;

            scope.spawn(move || {
                loop {
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    if i >= matches.len() {
                        break;
                    }
                    let (key, handle) = &matches[i];
                    let result = store
                        .load(handle)
                        .map_err(|e| e.to_string())
                        .and_then(|t| extract_changes(&t, key.company_id()).map_err(|e| e.to_string()));
                    let _ = tx.send((s!(key.company_id()), result));
                }
            });
        }
        drop(res_tx);

        for (company, result) in res_rx.iter() {
            match result {
                Ok(mut recs) => {
                    logd!("Aggregate: {company}: {} changed row(s)", recs.len());
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_done(&company, &format!("{} row(s)", recs.len()));
                    }
                    report.records.append(&mut recs);
                }
                Err(msg) => {
                    loge!("Aggregate: {company}: {msg}");
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_failed(&company, &msg);
                    }
                }
            }
        }
    });

    if !report.is_empty() {
        let rows: Vec<Vec<String>> = report.sorted_rows().iter().map(ReportRow::cells).collect();
        match store.put_combined(&year, &month, &REPORT_HEADERS, &rows) {
            Ok(path) => {
                logf!("Aggregate: combined report → {}", path.display());
                report.combined_path = Some(path);
            }
            Err(e) => loge!("Aggregate: combined report not written: {e}"),
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    Ok(report)
}
