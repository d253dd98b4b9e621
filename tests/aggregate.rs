// tests/aggregate.rs
mod common;

use std::{collections::HashSet, fs, sync::Arc};

use common::{FakeFetcher, ids, portal_table, quiet_opts};
use insider_scrape::{
    aggregate::{self, REPORT_HEADERS},
    config::options::NamingScheme,
    csv,
    fetch::run_batch,
    period::PeriodKey,
    store::{ArtifactStore, TableStore},
    table::RawTable,
};

#[derive(Debug)]
struct TabSeparated;

impl TableStore for TabSeparated {
    fn extension(&self) -> &str { "tsv" }
    fn encode(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
        csv::table_to_string(headers, rows, '\t').into_bytes()
    }
    fn decode(&self, text: &str) -> RawTable {
        csv::parse_table(text, '\t')
    }
}

fn seeded(naming: NamingScheme) -> (tempfile::TempDir, ArtifactStore) {
    let dir = common::setup();
    let store = ArtifactStore::open(dir.path(), naming).unwrap();
    let fetcher = FakeFetcher::default()
        .with("A", portal_table(&[("董事", "甲", "100", "150", "50", "0"), ("董事", "乙", "100", "100", "0", "0")]))
        .with("B", portal_table(&[("監察人", "丙", "80", "60", "0", "20")]))
        .with("C", portal_table(&[("經理人", "丁", "5", "7", "2", "0"), ("經理人", "戊", "9", "8", "0", "1")]));
    run_batch(&fetcher, &store, &ids(&["A", "B", "C"]), "113", "12", &quiet_opts(), None).unwrap();
    (dir, store)
}

#[test]
fn union_of_all_companies_tagged_by_file() {
    let (_dir, store) = seeded(NamingScheme::PeriodFirst);

    let report = aggregate::run(&store, "113", "12", None).unwrap();

    assert_eq!(report.len(), 4);
    let tagged: HashSet<(String, String)> = report
        .records
        .iter()
        .map(|r| (r.company_id.clone(), r.person_name.clone()))
        .collect();
    assert_eq!(tagged.len(), 4, "no duplicates");
    for pair in [("A", "甲"), ("B", "丙"), ("C", "丁"), ("C", "戊")] {
        assert!(tagged.contains(&(pair.0.to_string(), pair.1.to_string())), "missing {pair:?}");
    }

    let b = report.records.iter().find(|r| r.company_id == "B").unwrap();
    assert_eq!(b.decrease_delta, 20.0);
    assert_eq!(b.current_holding, 60.0);
}

#[test]
fn combined_file_is_written_sorted() {
    let (_dir, store) = seeded(NamingScheme::PeriodFirst);

    let report = aggregate::run(&store, "113", "12", None).unwrap();
    let path = report.combined_path.clone().unwrap();
    assert!(path.ends_with("113年12月_變化.csv"));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(lines[0], REPORT_HEADERS.join(","));
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("A,"));
    assert!(lines[4].starts_with("C,"));

    // re-running does not pick the combined file up as an artifact
    let again = aggregate::run(&store, "113", "12", None).unwrap();
    assert_eq!(again.len(), 4);
}

#[test]
fn company_first_naming_aggregates_the_same() {
    let (_dir, store) = seeded(NamingScheme::CompanyFirst);
    let key = PeriodKey::new("A", "113", "12").unwrap();
    assert!(store.artifact_path(&key).ends_with("A_內部人持股_113年12月.csv"));

    let report = aggregate::run(&store, "113", "12", None).unwrap();
    assert_eq!(report.len(), 4);
}

#[test]
fn other_periods_and_foreign_files_are_ignored() {
    let (dir, store) = seeded(NamingScheme::PeriodFirst);
    fs::write(dir.path().join("notes.txt"), "x").unwrap();
    fs::write(dir.path().join("113年12月_A_內部人持股.bak"), "x").unwrap();
    fs::write(dir.path().join("13年12月_Z_內部人持股.csv"), "x").unwrap();
    fs::write(dir.path().join("113年11月_Z_內部人持股.csv"), "x").unwrap();
    fs::create_dir(dir.path().join("113年12月_D_內部人持股.csv")).unwrap();

    let listed: Vec<String> = store
        .list_matching("113", "12")
        .unwrap()
        .into_iter()
        .map(|(k, _)| k.company_id().to_string())
        .collect();
    let mut listed = listed;
    listed.sort();
    assert_eq!(listed, ["A", "B", "C"]);
}

#[test]
fn empty_period_writes_nothing() {
    let dir = common::setup();
    let store = ArtifactStore::open(dir.path(), NamingScheme::PeriodFirst).unwrap();

    let report = aggregate::run(&store, "112", "1", None).unwrap();
    assert!(report.is_empty());
    assert!(report.combined_path.is_none());
    assert!(!store.combined_path("112", "01").exists());
}

#[test]
fn unreadable_artifact_is_skipped() {
    let (dir, store) = seeded(NamingScheme::PeriodFirst);
    fs::write(dir.path().join("113年12月_X_內部人持股.csv"), "garbage\nrow\n").unwrap();

    let report = aggregate::run(&store, "113", "12", None).unwrap();
    assert_eq!(report.len(), 4);
    assert!(report.records.iter().all(|r| r.company_id != "X"));
}

#[test]
fn another_table_format_round_trips() {
    let dir = common::setup();
    let store = ArtifactStore::open(dir.path(), NamingScheme::PeriodFirst)
        .unwrap()
        .with_format(Arc::new(TabSeparated));
    let fetcher = FakeFetcher::default().with("A", portal_table(&[("董事", "甲", "1,000", "1,500", "500", "0")]));
    run_batch(&fetcher, &store, &ids(&["A"]), "113", "2", &quiet_opts(), None).unwrap();

    let key = PeriodKey::new("A", "113", "2").unwrap();
    assert!(store.artifact_path(&key).ends_with("113年02月_A_內部人持股.tsv"));

    let report = aggregate::run(&store, "113", "2", None).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.records[0].increase_delta, 500.0);
    assert!(report.combined_path.unwrap().ends_with("113年02月_變化.tsv"));
}
