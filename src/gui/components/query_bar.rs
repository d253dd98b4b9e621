// src/gui/components/query_bar.rs
//
// Period + roster inputs and the submit button. Edits only GuiState and
// FetchOptions; the request is built in App::submit.

use eframe::egui;

use crate::{
    config::options::{NamingScheme, SkipPolicy},
    gui::app::App,
};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let running = app.running();

    ui.horizontal(|ui| {
        ui.label("年 (ROC):");
        let year = ui.add(egui::TextEdit::singleline(&mut app.state.gui.year).desired_width(48.0));
        ui.label("月:");
        let month = ui.add(egui::TextEdit::singleline(&mut app.state.gui.month).desired_width(32.0));

        ui.separator();
        ui.label("Roster:");
        ui.add(egui::TextEdit::singleline(&mut app.state.gui.roster_text).font(egui::TextStyle::Monospace));

        ui.label("Output:");
        ui.add(egui::TextEdit::singleline(&mut app.state.gui.out_text).font(egui::TextStyle::Monospace));

        let enter = (year.lost_focus() || month.lost_focus()) && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let clicked = ui.add_enabled(!running, egui::Button::new("查詢")).clicked();
        if (clicked || enter) && !running {
            let ctx = ui.ctx().clone();
            app.submit(&ctx);
        }
    });

    ui.horizontal(|ui| {
        let fetch = &mut app.state.options.fetch;

        let mut refetch = fetch.skip == SkipPolicy::Refetch;
        if ui.add_enabled(!running, egui::Checkbox::new(&mut refetch, "Refetch stored")).changed() {
            fetch.skip = if refetch { SkipPolicy::Refetch } else { SkipPolicy::SkipExisting };
            logf!("UI: skip policy → {:?}", fetch.skip);
        }

        if ui
            .add_enabled(!running, egui::Checkbox::new(&mut fetch.mark_unchanged, "Remember unchanged"))
            .changed()
        {
            logf!("UI: mark_unchanged → {}", fetch.mark_unchanged);
        }

        ui.separator();
        ui.label("Naming:");
        let before = fetch.naming;
        ui.add_enabled_ui(!running, |ui| {
            ui.selectable_value(&mut fetch.naming, NamingScheme::PeriodFirst, "年月_公司");
            ui.selectable_value(&mut fetch.naming, NamingScheme::CompanyFirst, "公司_年月");
        });
        if fetch.naming != before {
            logf!("UI: naming → {:?}", fetch.naming);
        }
    });
}
