// src/pipeline.rs
//! Fetch then aggregate, as one call. Shared by the CLI and the GUI job.

use std::{error::Error, path::PathBuf};

use crate::{
    aggregate::{self, AggregateReport},
    config::options::FetchOptions,
    fetch::{self, FetchSummary, PageFetcher},
    period::normalize_period,
    progress::{self, Progress},
    store::ArtifactStore,
};

pub type PipelineError = Box<dyn Error + Send + Sync>;

#[derive(Clone, Debug)]
pub struct PipelineRequest {
    pub companies: Vec<String>,
    pub year: String,
    pub month: String,
    pub out_dir: PathBuf,
    pub fetch: FetchOptions,
}

#[derive(Clone, Debug)]
pub struct PipelineResult {
    pub summary: FetchSummary,
    pub report: AggregateReport,
}

/// Run the fetch phase over `req.companies`, then aggregate the period.
///
/// Errors only for an invalid period or an unusable output directory; per
/// company failures are in `summary`.
pub fn run(
    fetcher: &dyn PageFetcher,
    req: &PipelineRequest,
    mut progress: Option<&mut dyn Progress>,
) -> Result<PipelineResult, PipelineError> {
    let (year, month) = normalize_period(&req.year, &req.month)?;
    let store = ArtifactStore::open(&req.out_dir, req.fetch.naming)?;

    let summary = fetch::run_batch(
        fetcher,
        &store,
        &req.companies,
        &year,
        &month,
        &req.fetch,
        progress::reborrow(&mut progress),
    )?;

    if let Some(p) = progress.as_deref_mut() {
        p.log("Aggregating…");
    }
    let report = aggregate::run(&store, &year, &month, progress::reborrow(&mut progress))?;

    Ok(PipelineResult { summary, report })
}
