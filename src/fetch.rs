// src/fetch.rs
//! Fetch phase: one unit per company, bounded worker pool.
//!
//! Each unit runs check → fetch → resolve → detect → store on its own thread
//! with its own table; units share only the [`ArtifactStore`]. A failing unit
//! is recorded in the [`FetchSummary`] and never stops its siblings.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
    thread,
    time::Duration,
};

use thiserror::Error;

use crate::{
    config::consts::JITTER_MS,
    config::options::{FetchOptions, SkipPolicy},
    extract::{detect_changes, resolve_columns},
    period::{PeriodError, PeriodKey, normalize_period},
    progress::Progress,
    store::ArtifactStore,
    table::RawTable,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("portal answered HTTP {0}")]
    Status(u16),
    #[error("disclosure table not found in response")]
    TableMissing,
    #[error("disclosure table has no rows")]
    EmptyTable,
    #[error("{0}")]
    Other(String),
}

/// Retrieves one company's disclosure table for one period.
///
/// Implementations must be shareable across the worker threads. Any
/// per-request resources (sessions, connections) belong inside the call.
pub trait PageFetcher: Send + Sync {
    fn fetch_table(&self, key: &PeriodKey) -> Result<RawTable, FetchError>;
}

/// What happened to one company in a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Already stored (or marked unchanged); nothing fetched.
    Skipped,
    Stored { path: PathBuf, changed: usize },
    NoChange,
    Unresolved(String),
    FetchFailed(String),
    StoreFailed(String),
    InvalidKey(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::Unresolved(_) | Outcome::FetchFailed(_) | Outcome::StoreFailed(_) | Outcome::InvalidKey(_)
        )
    }

    pub fn describe(&self) -> String {
        match self {
            Outcome::Skipped => s!("already stored, skipped"),
            Outcome::Stored { path, changed } => format!("{changed} changed row(s) → {}", path.display()),
            Outcome::NoChange => s!("no change"),
            Outcome::Unresolved(m) => format!("columns unresolved: {m}"),
            Outcome::FetchFailed(m) => format!("fetch failed: {m}"),
            Outcome::StoreFailed(m) => format!("store failed: {m}"),
            Outcome::InvalidKey(m) => format!("invalid key: {m}"),
        }
    }
}

/// Per-company outcomes of one batch, in completion order.
#[derive(Clone, Debug, Default)]
pub struct FetchSummary {
    pub outcomes: Vec<(String, Outcome)>,
}

impl FetchSummary {
    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| matches!(o, Outcome::Stored { .. })).count()
    }
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == Outcome::Skipped).count()
    }
    pub fn unchanged(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == Outcome::NoChange).count()
    }
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
    pub fn outcome_for(&self, company_id: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|(c, _)| c == company_id).map(|(_, o)| o)
    }
}

/// Whether `key` already has a settled result under `opts`.
fn already_done(store: &ArtifactStore, key: &PeriodKey, opts: &FetchOptions) -> bool {
    if opts.skip == SkipPolicy::Refetch {
        return false;
    }
    store.exists(key) || (opts.mark_unchanged && store.is_marked_unchanged(key))
}

/// Run the full pipeline for one company.
pub fn process_company(
    fetcher: &dyn PageFetcher,
    store: &ArtifactStore,
    key: &PeriodKey,
    opts: &FetchOptions,
) -> Outcome {
    if already_done(store, key, opts) {
        logd!("Fetch: {key}: already stored, skipping");
        return Outcome::Skipped;
    }

    let table = match fetcher.fetch_table(key) {
        Ok(t) => t,
        Err(e) => {
            loge!("Fetch: {key}: {e}");
            return Outcome::FetchFailed(e.to_string());
        }
    };
    if table.is_empty() {
        logw!("Fetch: {key}: table is empty");
    }

    let cols = match resolve_columns(&table.headers) {
        Ok(c) => c,
        Err(e) => {
            loge!("Fetch: {key}: {e} (headers={:?})", table.headers);
            return Outcome::Unresolved(e.to_string());
        }
    };

    let records = detect_changes(&table, &cols, key.company_id());
    if records.is_empty() {
        logd!("Fetch: {key}: no change");
        if opts.mark_unchanged {
            if let Err(e) = store.mark_unchanged(key) {
                logw!("Fetch: {key}: could not write marker: {e}");
            }
        }
        return Outcome::NoChange;
    }

    match store.put(key, &records) {
        Ok(path) => {
            logf!("Fetch: {key}: {} changed row(s) → {}", records.len(), path.display());
            Outcome::Stored { path, changed: records.len() }
        }
        Err(e) => {
            loge!("Fetch: {key}: {e}");
            Outcome::StoreFailed(e.to_string())
        }
    }
}

/// Fetch every company in `roster` for (year, month).
///
/// Returns after every unit has finished. The only error is an invalid
/// period, reported before any work starts.
pub fn run_batch(
    fetcher: &dyn PageFetcher,
    store: &ArtifactStore,
    roster: &[String],
    year: &str,
    month: &str,
    opts: &FetchOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<FetchSummary, PeriodError> {
    let (year, month) = normalize_period(year, month)?;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(roster.len());
    }
    logf!("Fetch: begin {year}/{month}, companies={}", roster.len());

    let mut summary = FetchSummary::default();
    if roster.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("Roster is empty");
            p.finish();
        }
        return Ok(summary);
    }

    let counter = AtomicUsize::new(0);
    let workers = opts.pool_size(roster.len());
    let (res_tx, res_rx) = mpsc::channel::<(String, Outcome)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = res_tx.clone();
            let counter = &counter;
            let (year, month) = (&year, &month);

            scope.spawn(move || {
                loop {
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    if i >= roster.len() {
                        break;
                    }
                    let company = &roster[i];
                    let outcome = match PeriodKey::new(company, year, month) {
                        Ok(key) => process_company(fetcher, store, &key, opts),
                        Err(e) => Outcome::InvalidKey(e.to_string()),
                    };
                    let fetched = !matches!(outcome, Outcome::Skipped | Outcome::InvalidKey(_));
                    let _ = tx.send((company.clone(), outcome));
                    if fetched && opts.pause_ms > 0 {
                        let jitter = (i as u64) % JITTER_MS;
                        thread::sleep(Duration::from_millis(opts.pause_ms + jitter)); // be polite
                    }
                }
            });
        }
        drop(res_tx); // main thread is sole receiver now

        for (company, outcome) in res_rx.iter() {
            if let Some(p) = progress.as_deref_mut() {
                if outcome.is_failure() {
                    p.item_failed(&company, &outcome.describe());
                } else {
                    p.item_done(&company, &outcome.describe());
                }
            }
            summary.outcomes.push((company, outcome));
        }
    });

    logf!(
        "Fetch: done {year}/{month}: stored={} skipped={} unchanged={} failed={}",
        summary.stored(),
        summary.skipped(),
        summary.unchanged(),
        summary.failed()
    );
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    Ok(summary)
}
