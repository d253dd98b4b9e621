// src/core/net.rs
//
// MOPS historical-data query over HTTPS (blocking).
//
// Each fetch opens its own `Session` and drops it before returning, whatever
// the result, so no connection state leaks between companies or threads.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::{
    config::consts::{FETCH_TIMEOUT_SECS, FORM_FIXED, HOST, QUERY_ENDPOINT, QUERY_PAGE, TABLE_SELECTOR, USER_AGENT},
    fetch::{FetchError, PageFetcher},
    period::PeriodKey,
    table::{self, RawTable},
};

/// The shipped [`PageFetcher`]: posts the query form to the portal.
#[derive(Clone, Debug)]
pub struct MopsFetcher {
    base_url: String,
    timeout: Duration,
}

impl Default for MopsFetcher {
    fn default() -> Self {
        Self {
            base_url: join!("https://", HOST),
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }
}

impl MopsFetcher {
    /// Point at another host (a mirror, or a local stub).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = s!(base_url.trim_end_matches('/'));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl PageFetcher for MopsFetcher {
    fn fetch_table(&self, key: &PeriodKey) -> Result<RawTable, FetchError> {
        let session = Session::open(&self.base_url, self.timeout, key)?;
        let html = session.query(key)?;
        extract_table(&html)
    }
}

struct Session<'a> {
    client: Client,
    base_url: &'a str,
    label: String,
}

impl<'a> Session<'a> {
    fn open(base_url: &'a str, timeout: Duration, key: &PeriodKey) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT);
        // A local mirror is reached directly, never through a system proxy.
        if is_local(base_url) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        logd!("Net: session open for {key}");
        Ok(Self { client, base_url, label: key.to_string() })
    }

    fn query(&self, key: &PeriodKey) -> Result<String, FetchError> {
        let mut form: Vec<(&str, &str)> = FORM_FIXED.to_vec();
        form.push(("co_id", key.company_id()));
        form.push(("year", key.year()));
        form.push(("month", key.month()));

        let url = join!(self.base_url, QUERY_ENDPOINT);
        let referer = join!(self.base_url, QUERY_PAGE);
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::REFERER, referer)
            .form(&form)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text()?)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        logd!("Net: session closed for {}", self.label);
    }
}

fn is_local(base_url: &str) -> bool {
    let host = base_url.split_once("://").map_or(base_url, |(_, rest)| rest);
    ["localhost", "127.0.0.1", "[::1]"].iter().any(|h| host.starts_with(h))
}

/// Pull the disclosure table out of a result page.
pub fn extract_table(html: &str) -> Result<RawTable, FetchError> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(TABLE_SELECTOR).expect("table selector");
    let el = doc.select(&sel).next().ok_or(FetchError::TableMissing)?;
    table::parse_table_element(el).ok_or(FetchError::EmptyTable)
}
