// src/gui/progress.rs
use std::sync::mpsc::Sender;

use eframe::egui;

use super::job::JobEvent;
use crate::progress::Progress;

/// Forwards batch progress to the UI thread as status lines.
pub struct GuiProgress {
    tx: Sender<JobEvent>,
    ctx: egui::Context,
    phase: &'static str,
    done: usize,
    failed: usize,
    total: usize,
}

impl GuiProgress {
    pub fn new(tx: Sender<JobEvent>, ctx: egui::Context) -> Self {
        Self { tx, ctx, phase: "Fetch", done: 0, failed: 0, total: 0 }
    }

    fn set_status(&self, msg: impl Into<String>) {
        // UI gone means nobody is listening; the job still finishes its writes
        let _ = self.tx.send(JobEvent::Status(msg.into()));
        self.ctx.request_repaint();
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.failed = 0;
    }
    fn log(&mut self, msg: &str) {
        if msg.starts_with("Aggregating") {
            self.phase = "Aggregate";
        }
        self.set_status(msg);
    }
    fn item_done(&mut self, company_id: &str, summary: &str) {
        self.done += 1;
        self.set_status(format!("{}: {company_id} {summary} ({}/{})", self.phase, self.done + self.failed, self.total));
    }
    fn item_failed(&mut self, company_id: &str, cause: &str) {
        self.failed += 1;
        self.set_status(format!("{}: {company_id} failed: {cause} ({}/{})", self.phase, self.done + self.failed, self.total));
    }
    fn finish(&mut self) {
        if self.total == 0 {
            self.set_status(format!("{} complete", self.phase));
        } else {
            self.set_status(format!(
                "{} complete ({} ok, {} failed of {})",
                self.phase, self.done, self.failed, self.total
            ));
        }
    }
}
