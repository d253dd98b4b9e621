// src/config/options.rs
use std::path::PathBuf;

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub fetch: FetchOptions,
    pub out_dir: PathBuf,
    pub roster_path: PathBuf,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            roster_path: PathBuf::from(DEFAULT_ROSTER_FILE),
        }
    }
}

/// How per-company artifact files are named on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum NamingScheme {
    /// `{year}年{month}月_{company}_內部人持股.csv`
    #[default]
    PeriodFirst,
    /// `{company}_內部人持股_{year}年{month}月.csv`
    CompanyFirst,
}

/// What to do when a period already has a stored result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    #[default]
    SkipExisting,
    Refetch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub naming: NamingScheme,
    pub skip: SkipPolicy,
    /// Leave a `.nochange` marker when a company had nothing to report,
    /// so the next run can skip it too.
    pub mark_unchanged: bool,
    pub workers: usize,
    /// Pause between requests on one worker (ms). Zero in tests.
    pub pause_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            naming: NamingScheme::PeriodFirst,
            skip: SkipPolicy::SkipExisting,
            mark_unchanged: true,
            workers: FETCH_WORKERS,
            pause_ms: REQUEST_PAUSE_MS,
        }
    }
}

impl FetchOptions {
    /// Worker count for a batch of `n` units: never more than the batch, never zero.
    pub fn pool_size(&self, n: usize) -> usize {
        self.workers.min(n).max(1)
    }
}
