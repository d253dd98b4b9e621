// src/gui/job.rs
//! Runs one pipeline request off the UI thread.
//!
//! The UI submits a [`PipelineRequest`] and polls the returned [`JobHandle`]
//! once per frame; the worker never touches UI state.

use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver},
    },
    thread::{self, JoinHandle},
};

use eframe::egui;

use super::progress::GuiProgress;
use crate::{
    fetch::PageFetcher,
    pipeline::{self, PipelineRequest, PipelineResult},
};

#[derive(Debug)]
pub enum JobEvent {
    Status(String),
    Done(PipelineResult),
    Failed(String),
}

pub struct JobHandle {
    rx: Receiver<JobEvent>,
    worker: Option<JoinHandle<()>>,
}

impl JobHandle {
    /// Everything the job has sent since the last poll.
    pub fn poll(&self) -> Vec<JobEvent> {
        self.rx.try_iter().collect()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Block until the worker exits. Used on shutdown and in tests.
    pub fn join(&mut self) {
        if let Some(h) = self.worker.take() {
            if h.join().is_err() {
                loge!("Job: worker panicked");
            }
        }
    }
}

pub fn spawn(req: PipelineRequest, fetcher: Arc<dyn PageFetcher>, ctx: egui::Context) -> JobHandle {
    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        logf!(
            "Job: start {}/{} companies={} out={}",
            req.year,
            req.month,
            req.companies.len(),
            req.out_dir.display()
        );
        let mut prog = GuiProgress::new(tx.clone(), ctx.clone());

        let event = match pipeline::run(fetcher.as_ref(), &req, Some(&mut prog)) {
            Ok(result) => {
                logf!(
                    "Job: done, stored={} failed={} report_rows={}",
                    result.summary.stored(),
                    result.summary.failed(),
                    result.report.len()
                );
                JobEvent::Done(result)
            }
            Err(e) => {
                loge!("Job: {e}");
                JobEvent::Failed(e.to_string())
            }
        };
        let _ = tx.send(event);
        ctx.request_repaint();
    });

    JobHandle { rx, worker: Some(worker) }
}
