// src/gui/app.rs
use std::{error::Error, path::PathBuf, sync::Arc};

use eframe::egui;

use crate::{
    aggregate::ReportRow,
    config::{
        consts::{CJK_FONT_CANDIDATES, WINDOW_TITLE},
        state::AppState,
    },
    core::net::MopsFetcher,
    fetch::{FetchSummary, PageFetcher},
    period::normalize_period,
    pipeline::PipelineRequest,
    roster::Roster,
};

use super::{
    components,
    job::{self, JobEvent, JobHandle},
};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| {
            install_cjk_font(&cc.egui_ctx);
            Ok(Box::new(App::new(AppState::default(), Arc::new(MopsFetcher::default()))))
        }),
    )?;
    Ok(())
}

fn install_cjk_font(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|p| std::fs::read(p).ok().map(|b| (*p, b)))
    else {
        logw!("Init: no CJK font found, table text may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(s!("cjk"), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push(s!("cjk"));
    }
    ctx.set_fonts(fonts);
    logf!("Init: CJK font {path}");
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,
    pub fetcher: Arc<dyn PageFetcher>,

    // at most one job in flight
    pub job: Option<JobHandle>,

    // last report, sorted for display
    pub rows: Vec<ReportRow>,
    pub summary: Option<FetchSummary>,
    pub status: String,
}

impl App {
    pub fn new(state: AppState, fetcher: Arc<dyn PageFetcher>) -> Self {
        logf!("Init: out={} roster={}", state.gui.out_text, state.gui.roster_text);
        Self {
            state,
            fetcher,
            job: None,
            rows: Vec::new(),
            summary: None,
            status: s!("Idle"),
        }
    }

    #[inline]
    pub fn running(&self) -> bool { self.job.is_some() }

    /// Validate the query bar and hand a request to a background job.
    pub fn submit(&mut self, ctx: &egui::Context) {
        if self.running() {
            return;
        }
        let gui = &self.state.gui;

        let (year, month) = match normalize_period(&gui.year, &gui.month) {
            Ok(p) => p,
            Err(e) => {
                self.status = format!("Error: {e}");
                return;
            }
        };

        self.state.options.roster_path = PathBuf::from(gui.roster_text.trim());
        self.state.options.out_dir = PathBuf::from(gui.out_text.trim());

        let roster = match Roster::load(&self.state.options.roster_path) {
            Ok(r) if !r.is_empty() => r,
            Ok(_) => {
                self.status = s!("Error: roster is empty");
                return;
            }
            Err(e) => {
                loge!("UI: {e}");
                self.status = format!("Error: {e}");
                return;
            }
        };

        let req = PipelineRequest {
            companies: roster.ids().to_vec(),
            year,
            month,
            out_dir: self.state.options.out_dir.clone(),
            fetch: self.state.options.fetch.clone(),
        };
        logf!("UI: submit {}/{} companies={}", req.year, req.month, req.companies.len());

        self.status = format!("Fetching {} compan(ies)…", req.companies.len());
        self.job = Some(job::spawn(req, Arc::clone(&self.fetcher), ctx.clone()));
    }

    /// Drain job events; drops the handle once the worker has exited.
    pub fn poll_job(&mut self) {
        let Some(job) = self.job.as_mut() else { return };

        let mut events = job.poll();
        if job.is_finished() {
            job.join();
            events.extend(job.poll()); // sent between poll and exit
            self.job = None;
        }
        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: JobEvent) {
        match event {
            JobEvent::Status(msg) => self.status = msg,
            JobEvent::Done(result) => {
                let s = &result.summary;
                self.status = format!(
                    "Done {}/{}: stored {}, skipped {}, unchanged {}, failed {} · {} changed row(s)",
                    result.report.year,
                    result.report.month,
                    s.stored(),
                    s.skipped(),
                    s.unchanged(),
                    s.failed(),
                    result.report.len()
                );
                self.rows = result.report.sorted_rows();
                self.summary = Some(result.summary);
            }
            JobEvent::Failed(msg) => self.status = format!("Error: {msg}"),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();

        egui::TopBottomPanel::top("query").show(ctx, |ui| {
            components::query_bar::draw(ui, self);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.running() {
                    ui.add(egui::Spinner::new());
                }
                ui.label(&self.status);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            components::results_table::draw(ui, &self.rows);
        });
    }
}
