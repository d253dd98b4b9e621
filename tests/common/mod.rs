// tests/common/mod.rs
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use insider_scrape::{
    config::options::FetchOptions,
    log,
    extract::ARTIFACT_HEADERS,
    fetch::{FetchError, PageFetcher},
    period::PeriodKey,
    table::RawTable,
};

/// (role, name, prior, current, increase, decrease)
pub type Line<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str, &'a str);

pub fn portal_table(lines: &[Line]) -> RawTable {
    let headers = ARTIFACT_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = lines
        .iter()
        .map(|(a, b, c, d, e, f)| vec![a, b, c, d, e, f].into_iter().map(|s| s.to_string()).collect())
        .collect();
    RawTable::new(headers, rows)
}

/// Headers as the portal page flattens them: two header rows, the delta
/// columns split into self-held and other shares.
pub const PAGE_HEADERS: [&str; 8] = [
    "身份別",
    "姓 名",
    "上月實際持有股數",
    "本月增加 自有股數(集中)",
    "本月增加 其他",
    "本月減少 自有股數(集中)",
    "本月減少 其他",
    "本月實際自有持有股數",
];

/// Same lines as [`portal_table`], laid out like a fetched page. The "other"
/// columns carry noise that must not be read as self-held deltas.
pub fn page_table(lines: &[Line]) -> RawTable {
    let headers = PAGE_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = lines
        .iter()
        .map(|(role, name, prior, current, inc, dec)| {
            vec![role, name, prior, inc, &"7", dec, &"9", current]
                .into_iter()
                .map(|s| s.to_string())
                .collect()
        })
        .collect();
    RawTable::new(headers, rows)
}

/// Serves canned tables per company id and counts calls.
#[derive(Default)]
pub struct FakeFetcher {
    tables: HashMap<String, Result<RawTable, String>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with(mut self, company: &str, table: RawTable) -> Self {
        self.tables.insert(company.to_string(), Ok(table));
        self
    }

    pub fn failing(mut self, company: &str, msg: &str) -> Self {
        self.tables.insert(company.to_string(), Err(msg.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        let mut v = self.seen.lock().unwrap().clone();
        v.sort();
        v
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch_table(&self, key: &PeriodKey) -> Result<RawTable, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(key.company_id().to_string());
        match self.tables.get(key.company_id()) {
            Some(Ok(t)) => Ok(t.clone()),
            Some(Err(m)) => Err(FetchError::Other(m.clone())),
            None => Err(FetchError::TableMissing),
        }
    }
}

pub fn quiet_opts() -> FetchOptions {
    FetchOptions { pause_ms: 0, ..FetchOptions::default() }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Route the log away from the working tree and hand out a scratch dir.
pub fn setup() -> tempfile::TempDir {
    log::init(&std::env::temp_dir().join("insider_scrape_tests"));
    tempfile::tempdir().unwrap()
}
