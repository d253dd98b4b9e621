// src/extract.rs
//! Column resolution and change detection over a [`RawTable`].
//!
//! Columns are found by substring match on the flattened header text, so the
//! same code reads both a freshly fetched portal table and a stored artifact
//! (whose headers are [`ARTIFACT_HEADERS`]).

use thiserror::Error;

use crate::table::RawTable;

// Header fragments as the portal prints them.
pub const ROLE_MARK: &str = "身份別";
pub const NAME_MARK: &str = "姓";
pub const PRIOR_MARK: &str = "上月實際持有股數";
pub const CURRENT_MARK: &str = "本月實際自有持有股數";
pub const INCREASE_MARK: &str = "本月增加";
pub const DECREASE_MARK: &str = "本月減少";
pub const SELF_HELD_MARK: &str = "自有股數(集中)";

/// Column names written into artifacts. Each one satisfies its marker above,
/// so a stored artifact resolves like the page it came from.
pub const ARTIFACT_HEADERS: [&str; 6] = [
    "身份別",
    "姓名",
    "上月實際持有股數",
    "本月實際自有持有股數",
    "本月增加 自有股數(集中)",
    "本月減少 自有股數(集中)",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("required columns not found: {}", missing.join(", "))]
    Unresolved { missing: Vec<&'static str> },
}

/// Indices of the semantic columns in one table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub role: usize,
    pub name: usize,
    pub prior: usize,
    pub current: usize,
    pub increase: Option<usize>,
    pub decrease: Option<usize>,
}

fn find(headers: &[String], marks: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| marks.iter().all(|m| h.contains(m)))
}

/// Locate the semantic columns. Role, name, prior and current are required;
/// of the two delta columns at least one must be present.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMap, ResolveError> {
    let role = find(headers, &[ROLE_MARK]);
    let name = find(headers, &[NAME_MARK]);
    let prior = find(headers, &[PRIOR_MARK]);
    let current = find(headers, &[CURRENT_MARK]);
    let increase = find(headers, &[INCREASE_MARK, SELF_HELD_MARK]);
    let decrease = find(headers, &[DECREASE_MARK, SELF_HELD_MARK]);

    let mut missing = Vec::new();
    if role.is_none() { missing.push("role"); }
    if name.is_none() { missing.push("name"); }
    if prior.is_none() { missing.push("prior holding"); }
    if current.is_none() { missing.push("current holding"); }
    if increase.is_none() && decrease.is_none() { missing.push("increase/decrease delta"); }

    match (role, name, prior, current) {
        (Some(role), Some(name), Some(prior), Some(current)) if missing.is_empty() => {
            Ok(ColumnMap { role, name, prior, current, increase, decrease })
        }
        _ => Err(ResolveError::Unresolved { missing }),
    }
}

/// One insider's line for one company and period.
#[derive(Clone, Debug, PartialEq)]
pub struct DisclosureRecord {
    pub company_id: String,
    pub person_name: String,
    pub role: String,
    pub prior_holding: f64,
    pub current_holding: f64,
    pub increase_delta: f64,
    pub decrease_delta: f64,
}

impl DisclosureRecord {
    pub fn is_changed(&self) -> bool {
        self.increase_delta != 0.0 || self.decrease_delta != 0.0
    }

    /// Cells in [`ARTIFACT_HEADERS`] order.
    pub fn to_artifact_row(&self) -> Vec<String> {
        vec![
            self.role.clone(),
            self.person_name.clone(),
            fmt_shares(self.prior_holding),
            fmt_shares(self.current_holding),
            fmt_shares(self.increase_delta),
            fmt_shares(self.decrease_delta),
        ]
    }
}

/// Lenient share count: drop thousands separators, keep the first
/// whitespace-separated token, parse it. Anything unparsable (or NaN/inf) is 0.
pub fn parse_shares(cell: &str) -> f64 {
    cell.replace(',', "")
        .split_whitespace()
        .next()
        .and_then(|tok| tok.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Share counts are whole numbers in practice; print them without ".0".
pub fn fmt_shares(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Rows of `table` whose increase or decrease delta is non-zero, in table order.
pub fn detect_changes(table: &RawTable, cols: &ColumnMap, company_id: &str) -> Vec<DisclosureRecord> {
    let delta = |row: usize, col: Option<usize>| col.map(|c| parse_shares(table.cell(row, c))).unwrap_or(0.0);

    (0..table.row_count())
        .map(|ri| DisclosureRecord {
            company_id: s!(company_id),
            person_name: s!(table.cell(ri, cols.name)),
            role: s!(table.cell(ri, cols.role)),
            prior_holding: parse_shares(table.cell(ri, cols.prior)),
            current_holding: parse_shares(table.cell(ri, cols.current)),
            increase_delta: delta(ri, cols.increase),
            decrease_delta: delta(ri, cols.decrease),
        })
        .filter(DisclosureRecord::is_changed)
        .collect()
}

/// Resolve then detect in one step.
pub fn extract_changes(table: &RawTable, company_id: &str) -> Result<Vec<DisclosureRecord>, ResolveError> {
    let cols = resolve_columns(&table.headers)?;
    Ok(detect_changes(table, &cols, company_id))
}
