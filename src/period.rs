// src/period.rs
use std::fmt;

use thiserror::Error;

use crate::core::sanitize::{clean_id, file_component};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("company id is empty")]
    EmptyCompany,
    #[error("company id cannot be used in a file name: {0:?}")]
    BadCompany(String),
    #[error("year is not a number: {0:?}")]
    BadYear(String),
    #[error("month must be 1..12, got {0:?}")]
    BadMonth(String),
}

/// One reporting period for one company. Fields are private so a key can
/// only be built through [`PeriodKey::new`], which normalizes the month.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    company_id: String,
    year: String,
    month: String,
}

impl PeriodKey {
    pub fn new(company_id: &str, year: &str, month: &str) -> Result<Self, PeriodError> {
        let company_id = clean_id(company_id);
        if company_id.is_empty() {
            return Err(PeriodError::EmptyCompany);
        }
        // The id is the file name's key; it must come back unchanged from a listing.
        if file_component(&company_id) != company_id {
            return Err(PeriodError::BadCompany(company_id));
        }
        let (year, month) = normalize_period(year, month)?;
        Ok(Self { company_id, year, month })
    }

    pub fn company_id(&self) -> &str { &self.company_id }
    pub fn year(&self) -> &str { &self.year }
    /// Always two digits, "01".."12".
    pub fn month(&self) -> &str { &self.month }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.company_id, self.year, self.month)
    }
}

/// Validate a (year, month) pair and zero-pad the month.
pub fn normalize_period(year: &str, month: &str) -> Result<(String, String), PeriodError> {
    let year = year.trim();
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(PeriodError::BadYear(s!(year)));
    }
    let m: u32 = month
        .trim()
        .parse()
        .map_err(|_| PeriodError::BadMonth(s!(month)))?;
    if !(1..=12).contains(&m) {
        return Err(PeriodError::BadMonth(s!(month)));
    }
    Ok((s!(year), format!("{m:02}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_is_zero_padded() {
        let k = PeriodKey::new("2330", "113", "3").unwrap();
        assert_eq!(k.month(), "03");
        assert_eq!(PeriodKey::new("2330", "113", "03").unwrap(), k);
        assert_eq!(PeriodKey::new("2330", "113", "12").unwrap().month(), "12");
    }

    #[test]
    fn bad_parts_are_rejected() {
        assert_eq!(PeriodKey::new(" ", "113", "1"), Err(PeriodError::EmptyCompany));
        assert!(matches!(PeriodKey::new("2330", "113", "0"), Err(PeriodError::BadMonth(_))));
        assert!(matches!(PeriodKey::new("2330", "113", "13"), Err(PeriodError::BadMonth(_))));
        assert!(matches!(PeriodKey::new("2330", "11x", "1"), Err(PeriodError::BadYear(_))));
    }

    #[test]
    fn ids_that_would_be_rewritten_on_disk_are_rejected() {
        assert_eq!(PeriodKey::new("23/30", "113", "1"), Err(PeriodError::BadCompany(s!("23/30"))));
        assert!(matches!(PeriodKey::new("23 30", "113", "1"), Err(PeriodError::BadCompany(_))));
        assert!(PeriodKey::new("0050", "113", "1").is_ok());
    }

    #[test]
    fn company_is_trimmed() {
        let k = PeriodKey::new("\u{3000}2330 ", "113", "12").unwrap();
        assert_eq!(k.company_id(), "2330");
        assert_eq!(k.to_string(), "2330 113/12");
    }
}
