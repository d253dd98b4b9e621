// src/store.rs
//! On-disk artifacts, one CSV file per (company, year, month).
//!
//! The file name is the key: `{year}年{month}月_{company}_內部人持股.csv` by
//! default, or `{company}_內部人持股_{year}年{month}月.csv`. A file's presence
//! means "fetched, had changes". The per-period combined report lives beside
//! them as `{year}年{month}月_變化.csv` and is never listed as an artifact.
//!
//! The naming scheme only decides how new files are written. Lookups accept a
//! key stored under either scheme, so switching schemes between runs neither
//! refetches a company nor lists it twice.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

use crate::{
    config::consts::{ARTIFACT_EXT, ARTIFACT_LABEL, COMBINED_LABEL, MARKER_EXT},
    config::options::NamingScheme,
    csv,
    extract::{ARTIFACT_HEADERS, DisclosureRecord},
    file::{ensure_directory, read_text, write_atomic},
    period::{PeriodError, PeriodKey, normalize_period},
    table::RawTable,
};

/// Whole-table encoding for files on disk.
pub trait TableStore: Send + Sync + std::fmt::Debug {
    /// File extension, without the dot.
    fn extension(&self) -> &str;
    fn encode(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<u8>;
    /// First row is the header.
    fn decode(&self, text: &str) -> RawTable;
}

/// Comma-separated, UTF-8 with BOM so spreadsheet apps pick up the encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvTables;

impl TableStore for CsvTables {
    fn extension(&self) -> &str { ARTIFACT_EXT }

    fn encode(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
        csv::table_to_string(headers, rows, ',').into_bytes()
    }

    fn decode(&self, text: &str) -> RawTable {
        csv::parse_table(text, ',')
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("refusing to store an empty artifact for {0}")]
    EmptyArtifact(String),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Period(#[from] PeriodError),
}

/// Opaque pointer to one stored artifact, as returned by [`ArtifactStore::list_matching`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactHandle {
    path: PathBuf,
}

impl ArtifactHandle {
    pub fn path(&self) -> &Path { &self.path }
}

#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    naming: NamingScheme,
    format: Arc<dyn TableStore>,
}

const SCHEMES: [NamingScheme; 2] = [NamingScheme::PeriodFirst, NamingScheme::CompanyFirst];

fn period_token(year: &str, month: &str) -> String {
    join!(year, "年", month, "月")
}

fn stem_in(key: &PeriodKey, naming: NamingScheme) -> String {
    let token = period_token(key.year(), key.month());
    let co = key.company_id();
    match naming {
        NamingScheme::PeriodFirst => join!(&token, "_", co, "_", ARTIFACT_LABEL),
        NamingScheme::CompanyFirst => join!(co, "_", ARTIFACT_LABEL, "_", &token),
    }
}

impl ArtifactStore {
    /// Open (creating if needed) the output directory.
    pub fn open(dir: impl Into<PathBuf>, naming: NamingScheme) -> Result<Self, StoreError> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(StoreError::NotADirectory(dir));
        }
        ensure_directory(&dir)?;
        Ok(Self { dir, naming, format: Arc::new(CsvTables) })
    }

    /// Swap the on-disk table format. Existing files in another format are not listed.
    pub fn with_format(mut self, format: Arc<dyn TableStore>) -> Self {
        self.format = format;
        self
    }

    pub fn dir(&self) -> &Path { &self.dir }
    pub fn naming(&self) -> NamingScheme { self.naming }

    fn path_in(&self, key: &PeriodKey, naming: NamingScheme, ext: &str) -> PathBuf {
        self.dir.join(join!(&stem_in(key, naming), ".", ext))
    }

    /// Where `put` writes `key` under the active scheme.
    pub fn artifact_path(&self, key: &PeriodKey) -> PathBuf {
        self.path_in(key, self.naming, self.format.extension())
    }

    fn marker_path(&self, key: &PeriodKey) -> PathBuf {
        self.path_in(key, self.naming, MARKER_EXT)
    }

    fn stored_under_any(&self, key: &PeriodKey, ext: &str) -> bool {
        SCHEMES.iter().any(|n| self.path_in(key, *n, ext).is_file())
    }

    fn remove_stale(path: &Path) {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                logw!("Store: could not remove {}: {}", path.display(), e);
            }
        }
    }

    pub fn combined_path(&self, year: &str, month: &str) -> PathBuf {
        let token = period_token(year, month);
        self.dir.join(join!(&token, "_", COMBINED_LABEL, ".", self.format.extension()))
    }

    /// Stored under either naming scheme.
    pub fn exists(&self, key: &PeriodKey) -> bool {
        self.stored_under_any(key, self.format.extension())
    }

    /// Persist changed records for `key`, replacing any previous artifact.
    pub fn put(&self, key: &PeriodKey, records: &[DisclosureRecord]) -> Result<PathBuf, StoreError> {
        if records.is_empty() {
            return Err(StoreError::EmptyArtifact(key.to_string()));
        }
        let rows: Vec<Vec<String>> = records.iter().map(DisclosureRecord::to_artifact_row).collect();
        let path = self.artifact_path(key);
        write_atomic(&path, &self.format.encode(&ARTIFACT_HEADERS, &rows))?;

        // One file per key: drop the copy under the other scheme and any
        // "no change" marker, which would contradict the artifact.
        for naming in SCHEMES {
            if naming != self.naming {
                Self::remove_stale(&self.path_in(key, naming, self.format.extension()));
            }
            Self::remove_stale(&self.path_in(key, naming, MARKER_EXT));
        }
        Ok(path)
    }

    /// Remember that `key` was fetched and had nothing to report.
    pub fn mark_unchanged(&self, key: &PeriodKey) -> Result<(), StoreError> {
        write_atomic(&self.marker_path(key), b"")?;
        Ok(())
    }

    pub fn is_marked_unchanged(&self, key: &PeriodKey) -> bool {
        self.stored_under_any(key, MARKER_EXT)
    }

    /// Every artifact stored for (year, month), whichever company and naming
    /// scheme, ordered by company. A key found under both schemes is listed
    /// once, from the active scheme's file.
    pub fn list_matching(&self, year: &str, month: &str) -> Result<Vec<(PeriodKey, ArtifactHandle)>, StoreError> {
        let (year, month) = normalize_period(year, month)?;
        let token = period_token(&year, &month);

        let mut found: BTreeMap<PeriodKey, (NamingScheme, ArtifactHandle)> = BTreeMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() { continue; }
            if path.extension().and_then(|s| s.to_str()) != Some(self.format.extension()) { continue; }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            if stem.starts_with('.') { continue; }

            let Some((company, naming)) = company_from_stem(stem, &token) else { continue };
            let key = match PeriodKey::new(company, &year, &month) {
                Ok(key) => key,
                Err(e) => {
                    logw!("Store: skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            if let Some((prev, _)) = found.get(&key) {
                logw!("Store: {key} stored under both naming schemes");
                if *prev == self.naming { continue; }
            }
            found.insert(key, (naming, ArtifactHandle { path }));
        }
        Ok(found.into_iter().map(|(key, (_, handle))| (key, handle)).collect())
    }

    /// Re-read an artifact as a plain table.
    pub fn load(&self, handle: &ArtifactHandle) -> Result<RawTable, StoreError> {
        let text = read_text(&handle.path)?;
        Ok(self.format.decode(&text))
    }

    /// Write the cross-company report for (year, month), replacing any previous one.
    pub fn put_combined(
        &self,
        year: &str,
        month: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<PathBuf, StoreError> {
        let (year, month) = normalize_period(year, month)?;
        let path = self.combined_path(&year, &month);
        write_atomic(&path, &self.format.encode(headers, rows))?;
        Ok(path)
    }
}

/// Company id embedded in an artifact file stem for the given period token,
/// under either naming scheme. `None` for the combined report and foreign files.
fn company_from_stem<'a>(stem: &'a str, token: &str) -> Option<(&'a str, NamingScheme)> {
    // {token}_{company}_{label}
    if let Some(rest) = stem.strip_prefix(token).and_then(|r| r.strip_prefix('_')) {
        let co = rest.strip_suffix(ARTIFACT_LABEL)?.strip_suffix('_')?;
        return (!co.is_empty()).then_some((co, NamingScheme::PeriodFirst));
    }
    // {company}_{label}_{token}
    let head = stem.strip_suffix(token)?.strip_suffix('_')?;
    let co = head.strip_suffix(ARTIFACT_LABEL)?.strip_suffix('_')?;
    (!co.is_empty()).then_some((co, NamingScheme::CompanyFirst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_parse_under_both_schemes() {
        let tok = period_token("113", "12");
        assert_eq!(company_from_stem("113年12月_2330_內部人持股", &tok), Some(("2330", NamingScheme::PeriodFirst)));
        assert_eq!(company_from_stem("2330_內部人持股_113年12月", &tok), Some(("2330", NamingScheme::CompanyFirst)));
        assert_eq!(company_from_stem("113年12月_變化", &tok), None);
        assert_eq!(company_from_stem("13年12月_2330_內部人持股", &period_token("3", "12")), None);
        assert_eq!(company_from_stem("1113年12月_2330_內部人持股", &tok), None);
    }
}
