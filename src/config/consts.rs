// src/config/consts.rs

// Portal
pub const HOST: &str = "mopsov.twse.com.tw";
pub const QUERY_PAGE: &str = "/mops/web/query6_1";
pub const QUERY_ENDPOINT: &str = "/mops/web/ajax_query6_1";
pub const USER_AGENT: &str = "insider_scrape/0.3";
pub const TABLE_SELECTOR: &str = "table.hasBorder";

// Fixed form fields sent with every historical-data query
pub const FORM_FIXED: &[(&str, &str)] = &[
    ("encodeURIComponent", "1"),
    ("step", "1"),
    ("firstin", "1"),
    ("off", "1"),
    ("TYPEK", "all"),
    ("isnew", "false"),
];

// Net
pub const FETCH_TIMEOUT_SECS: u64 = 10;
pub const REQUEST_PAUSE_MS: u64 = 250; // be polite
pub const JITTER_MS: u64 = 100; // extra 0..100 ms

// Concurrency
pub const FETCH_WORKERS: usize = 4;
pub const AGGREGATE_WORKERS: usize = 3;

// Output
pub const DEFAULT_OUT_DIR: &str = "output";
pub const LOG_FILE_NAME: &str = "debug.log";
pub const ARTIFACT_EXT: &str = "csv";
pub const MARKER_EXT: &str = "nochange";
pub const ARTIFACT_LABEL: &str = "內部人持股";
pub const COMBINED_LABEL: &str = "變化";

// Roster
pub const DEFAULT_ROSTER_FILE: &str = "stock_ids.csv";
pub const ROSTER_SHEET_SKIP_ROWS: usize = 2;

// GUI
pub const WINDOW_TITLE: &str = "Insider Scrape";
// First readable one wins; egui ships no CJK glyphs
pub const CJK_FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\msjh.ttc",
    "C:\\Windows\\Fonts\\mingliu.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
];
