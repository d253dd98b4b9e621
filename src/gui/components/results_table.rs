// src/gui/components/results_table.rs
//
// Read-only grid of the last report. Numbers centered, text left.

use eframe::egui::{self, Align, Layout, RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder};

use crate::aggregate::{REPORT_HEADERS, ReportRow};

// company, role, name, then four share counts
const WIDTHS: [f32; 7] = [70.0, 110.0, 140.0, 110.0, 100.0, 100.0, 110.0];
const FIRST_NUMERIC: usize = 3;

pub fn draw(ui: &mut egui::Ui, rows: &[ReportRow]) {
    if rows.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label("No changes to show");
        });
        return;
    }

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .min_scrolled_height(0.0)
        .id_salt("report_table");
    for w in WIDTHS {
        table = table.column(Column::initial(w).resizable(true).clip(true).at_least(20.0));
    }

    table
        .header(24.0, |mut header| {
            for (ci, title) in REPORT_HEADERS.iter().enumerate() {
                header.col(|ui| {
                    let label = egui::Label::new(RichText::new(*title).strong()).selectable(false);
                    if ci >= FIRST_NUMERIC {
                        ui.centered_and_justified(|ui| { ui.add(label); });
                    } else {
                        ui.with_layout(Layout::left_to_right(Align::Center), |ui| { ui.add(label); });
                    }
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let Some(r) = rows.get(row.index()) else { return };
                for (ci, cell) in r.cells().into_iter().enumerate() {
                    row.col(|ui| {
                        ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
                        let mut rt = RichText::new(cell);
                        // increases green, decreases red
                        if ci == 4 && r.increase_delta > 0.0 {
                            rt = rt.color(egui::Color32::from_rgb(0x3C, 0xB3, 0x71));
                        } else if ci == 5 && r.decrease_delta > 0.0 {
                            rt = rt.color(egui::Color32::from_rgb(0xDC, 0x61, 0x49));
                        }
                        if ci >= FIRST_NUMERIC {
                            ui.centered_and_justified(|ui| { ui.label(rt); });
                        } else {
                            ui.with_layout(Layout::left_to_right(Align::Center), |ui| { ui.label(rt); });
                        }
                    });
                }
            });
        });
}
