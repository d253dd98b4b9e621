// src/cli.rs
use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};

use crate::{
    aggregate,
    config::{
        consts::{DEFAULT_OUT_DIR, DEFAULT_ROSTER_FILE, ROSTER_SHEET_SKIP_ROWS},
        options::{FetchOptions, NamingScheme, SkipPolicy},
    },
    core::net::MopsFetcher,
    csv,
    fetch::FetchSummary,
    file::read_text,
    log,
    pipeline::{self, PipelineError, PipelineRequest},
    progress::Progress,
    roster::Roster,
    sink::{CsvSink, ResultSink},
    store::ArtifactStore,
};

#[derive(Parser, Debug)]
#[command(name = "insider_scrape", version, about = "Monthly insider shareholding changes from MOPS")]
pub struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_OUT_DIR, help = "Directory for artifacts, report and log")]
    pub out: PathBuf,
    #[arg(long, global = true, help = "Print the report tab-separated")]
    pub tsv: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every company for one period, then aggregate it.
    Fetch {
        #[arg(long, help = "ROC year, e.g. 113")]
        year: String,
        #[arg(long)]
        month: String,
        #[arg(long = "company", help = "Company id; repeatable. Overrides --roster")]
        companies: Vec<String>,
        #[arg(long, help = "Roster file, one company id per line")]
        roster: Option<PathBuf>,
        #[arg(long, default_value_t = false, help = "Fetch again even if already stored")]
        refetch: bool,
        #[arg(long, default_value_t = false, help = "Do not remember companies with no change")]
        no_marker: bool,
        #[arg(long, value_enum, default_value_t = NamingScheme::PeriodFirst)]
        naming: NamingScheme,
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Aggregate what is already stored for one period; no network.
    Aggregate {
        #[arg(long)]
        year: String,
        #[arg(long)]
        month: String,
        #[arg(long, value_enum, default_value_t = NamingScheme::PeriodFirst)]
        naming: NamingScheme,
    },
    /// Build a roster from the exchange listing sheet (exported as CSV).
    Roster {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_ROSTER_FILE)]
        output: PathBuf,
        #[arg(long, default_value_t = ROSTER_SHEET_SKIP_ROWS)]
        skip_rows: usize,
    },
}

/// Progress on stderr; stdout carries only the report.
struct CliProgress {
    done: usize,
    total: usize,
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) {
        self.done = 0;
        self.total = total;
    }
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
    fn item_done(&mut self, company_id: &str, summary: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {company_id}: {summary}", self.done, self.total);
    }
    fn item_failed(&mut self, company_id: &str, cause: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {company_id}: FAILED {cause}", self.done, self.total);
    }
}

pub fn run() -> Result<(), PipelineError> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<(), PipelineError> {
    log::init(&cli.out);
    logf!("CLI: {:?}", cli.command);

    match cli.command {
        Commands::Fetch { year, month, companies, roster, refetch, no_marker, naming, workers } => {
            let companies = if !companies.is_empty() {
                Roster::from_ids(companies)
            } else {
                Roster::load(&roster.unwrap_or_else(|| PathBuf::from(DEFAULT_ROSTER_FILE)))?
            };

            let mut fetch = FetchOptions {
                naming,
                skip: if refetch { SkipPolicy::Refetch } else { SkipPolicy::SkipExisting },
                mark_unchanged: !no_marker,
                ..FetchOptions::default()
            };
            if let Some(n) = workers {
                fetch.workers = n.max(1);
            }

            let req = PipelineRequest {
                companies: companies.ids().to_vec(),
                year,
                month,
                out_dir: cli.out.clone(),
                fetch,
            };
            let mut prog = CliProgress { done: 0, total: 0 };
            let result = pipeline::run(&MopsFetcher::default(), &req, Some(&mut prog))?;

            print_summary(&result.summary);
            deliver(&result.report, cli.tsv)?;
            report_location(&result.report);
        }
        Commands::Aggregate { year, month, naming } => {
            let store = ArtifactStore::open(&cli.out, naming)?;
            let mut prog = CliProgress { done: 0, total: 0 };
            let report = aggregate::run(&store, &year, &month, Some(&mut prog))?;
            deliver(&report, cli.tsv)?;
            report_location(&report);
        }
        Commands::Roster { input, output, skip_rows } => {
            let text = read_text(&input).map_err(|e| format!("Cannot read {}: {e}", input.display()))?;
            let rows = csv::parse_rows(&text, ',');
            let roster = Roster::from_paired_table(&rows, skip_rows);
            roster.save(&output)?;
            logf!("Roster: {} id(s) → {}", roster.len(), output.display());
            eprintln!("{} company id(s) → {}", roster.len(), output.display());
        }
    }
    Ok(())
}

fn print_summary(s: &FetchSummary) {
    eprintln!(
        "stored {}, skipped {}, unchanged {}, failed {}",
        s.stored(),
        s.skipped(),
        s.unchanged(),
        s.failed()
    );
    for (company, outcome) in s.outcomes.iter().filter(|(_, o)| o.is_failure()) {
        eprintln!("  {company}: {}", outcome.describe());
    }
}

fn deliver(report: &aggregate::AggregateReport, tsv: bool) -> io::Result<()> {
    let out = io::stdout().lock();
    let mut sink = if tsv { CsvSink::new(out).tsv() } else { CsvSink::new(out) };
    sink.deliver(report)
}

fn report_location(report: &aggregate::AggregateReport) {
    match &report.combined_path {
        Some(p) => eprintln!("{} changed row(s) → {}", report.len(), p.display()),
        None => eprintln!("No changes for {}/{}", report.year, report.month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetch_with_companies() {
        let cli = Cli::try_parse_from([
            "insider_scrape", "fetch", "--year", "113", "--month", "5",
            "--company", "2330", "--company", "1101", "--naming", "company-first", "--refetch",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch { companies, naming, refetch, no_marker, .. } => {
                assert_eq!(companies, ["2330", "1101"]);
                assert_eq!(naming, NamingScheme::CompanyFirst);
                assert!(refetch);
                assert!(!no_marker);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cli.out, PathBuf::from(DEFAULT_OUT_DIR));
    }

    #[test]
    fn roster_defaults() {
        let cli = Cli::try_parse_from(["insider_scrape", "roster", "--input", "sheet.csv"]).unwrap();
        match cli.command {
            Commands::Roster { output, skip_rows, .. } => {
                assert_eq!(output, PathBuf::from(DEFAULT_ROSTER_FILE));
                assert_eq!(skip_rows, ROSTER_SHEET_SKIP_ROWS);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
