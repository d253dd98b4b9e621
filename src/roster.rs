// src/roster.rs
//! Company rosters: which tickers a batch covers.

use std::{collections::HashSet, error::Error, path::Path};

use crate::{
    core::sanitize::{clean_id, is_blank},
    csv,
    file::{read_text, write_atomic},
};

/// Ordered, de-duplicated company ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    ids: Vec<String>,
}

impl Roster {
    pub fn ids(&self) -> &[String] { &self.ids }
    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Build from raw entries: cleaned, blanks dropped, first occurrence kept.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let ids = ids
            .into_iter()
            .filter(|s| !is_blank(s.as_ref()))
            .map(|s| clean_id(s.as_ref()))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self { ids }
    }

    /// One id per line, first column only.
    pub fn parse(text: &str) -> Self {
        let rows = csv::parse_rows(text, ',');
        Self::from_ids(rows.into_iter().filter_map(|r| r.into_iter().next()))
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let text = read_text(path).map_err(|e| format!("Cannot read roster {}: {e}", path.display()))?;
        let roster = Self::parse(&text);
        logf!("Roster: {} company id(s) from {}", roster.len(), path.display());
        Ok(roster)
    }

    /// The exchange's listing sheet: `skip` preamble rows, then (id, name)
    /// column pairs side by side. An id counts only when its name cell is filled.
    pub fn from_paired_table(rows: &[Vec<String>], skip: usize) -> Self {
        let mut ids = Vec::new();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for c in (0..width).step_by(2) {
            for row in rows.iter().skip(skip) {
                let id = row.get(c).map(|s| s.as_str()).unwrap_or("");
                let name = row.get(c + 1).map(|s| s.as_str()).unwrap_or("");
                if !is_blank(id) && !is_blank(name) {
                    ids.push(s!(id));
                }
            }
        }
        Self::from_ids(ids)
    }

    /// Write one id per line, no header.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut text = s!();
        for id in &self.ids {
            text.push_str(id);
            text.push('\n');
        }
        write_atomic(path, text.as_bytes())?;
        Ok(())
    }
}
