use std::path::{Path, PathBuf};

use anyhow::Result;
use eframe::egui::{self, Color32, RichText};
use tm_screen_common::{ReportRow, ScoreOrder, Verdict};

use crate::io::{default_filtered_path, load_report, save_rows};
use crate::model::AppState;

const COLUMNS: &[&str] = &[
    "Target", "Stem", "Matched Mark", "Score", "Status", "Serial", "Verdict", "Classes",
];

pub struct ViewerApp {
    state: AppState,
    status: String,
}

impl ViewerApp {
    pub fn new(initial: Option<PathBuf>) -> Self {
        let mut app = Self {
            state: AppState::default(),
            status: String::new(),
        };
        if let Some(path) = initial {
            match app.load_from_path(&path) {
                Ok(_) => app.status = format!("Loaded {}", path.display()),
                Err(err) => app.status = format!("Load failed: {err}"),
            }
        }
        app
    }

    fn open_report(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .pick_file()
        {
            match self.load_from_path(&path) {
                Ok(_) => self.status = format!("Loaded {}", path.display()),
                Err(err) => self.status = format!("Load failed: {err}"),
            }
        }
    }

    fn reload_report(&mut self) {
        let Some(path) = self.state.source_path.clone() else {
            self.status = "No report loaded".to_string();
            return;
        };
        match self.load_from_path(&path) {
            Ok(_) => self.status = format!("Reloaded {}", path.display()),
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn load_from_path(&mut self, path: &Path) -> Result<()> {
        let rows = load_report(path)?;
        self.state.load(rows, path.to_path_buf());
        Ok(())
    }

    fn save_filtered(&mut self) {
        let Some(source) = &self.state.source_path else {
            self.status = "No report loaded".to_string();
            return;
        };
        let default_path = default_filtered_path(source);
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(
                default_path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("report.filtered.csv"),
            )
            .save_file()
        {
            let rows = self.state.visible_rows();
            let count = rows.len();
            match save_rows(&path, &rows) {
                Ok(_) => self.status = format!("Saved {count} rows to {}", path.display()),
                Err(err) => self.status = format!("Save failed: {err}"),
            }
        }
    }

    fn render_filters(&mut self, ui: &mut egui::Ui) {
        ui.heading("Filter");
        ui.separator();

        ui.label(RichText::new("Verdict").strong());
        ui.radio_value(&mut self.state.filter.verdict, None, "All");
        for verdict in Verdict::ALL {
            ui.radio_value(&mut self.state.filter.verdict, Some(verdict), verdict.as_str());
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Minimum score").strong());
        ui.add(egui::Slider::new(&mut self.state.filter.min_score, 0.0..=100.0).step_by(1.0));

        ui.add_space(8.0);
        ui.label(RichText::new("Target").strong());
        ui.text_edit_singleline(&mut self.state.filter.target);
        ui.checkbox(&mut self.state.filter.stems_only, "Hide exact-name rows");
        ui.checkbox(&mut self.state.filter.class_match_only, "Relevant classes only");

        ui.add_space(8.0);
        let order_label = match self.state.order {
            ScoreOrder::Descending => "Score ↓",
            ScoreOrder::Ascending => "Score ↑",
        };
        if ui.button(order_label).clicked() {
            self.state.toggle_order();
        }

        ui.add_space(16.0);
        ui.heading("Summary");
        ui.separator();
        let summaries = self.state.summaries();
        if summaries.is_empty() {
            ui.label("No rows loaded.");
            return;
        }
        egui::Grid::new("summary_grid").striped(true).show(ui, |ui| {
            for label in ["Target", "Exact", "Fuzzy", "Top", "Verdict"] {
                ui.label(RichText::new(label).strong());
            }
            ui.end_row();
            for summary in &summaries {
                ui.label(summary.target_name.as_str());
                ui.label(if summary.exact_hit { "yes" } else { "-" });
                ui.label(if summary.fuzzy_hit { "yes" } else { "-" });
                ui.label(format!("{:.1}", summary.top_score));
                ui.label(RichText::new(summary.verdict.badge()).color(verdict_color(summary.verdict)));
                ui.end_row();
            }
        });
    }

    fn render_rows(&mut self, ui: &mut egui::Ui) {
        let rows = self.state.visible_rows();
        ui.label(format!("{} of {} rows", rows.len(), self.state.rows.len()));
        ui.separator();

        let mut clicked: Option<ReportRow> = None;
        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new("rows_grid")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for label in COLUMNS {
                        ui.label(RichText::new(*label).strong());
                    }
                    ui.end_row();

                    for row in &rows {
                        let selected = self.state.is_selected(row);
                        if ui.selectable_label(selected, row.target_name.as_str()).clicked() {
                            clicked = Some((*row).clone());
                        }
                        ui.label(row.stem.as_str());
                        ui.label(row.matched_mark.as_str());
                        ui.label(format!("{:.2}", row.score));
                        ui.label(row.status.as_str());
                        ui.label(row.serial_number.as_str());
                        ui.label(RichText::new(row.verdict.badge()).color(verdict_color(row.verdict)));
                        let classes = RichText::new(row.inferred_classes.as_str());
                        ui.label(if row.class_match { classes.strong() } else { classes });
                        ui.end_row();
                    }
                });
        });

        if let Some(row) = clicked {
            self.state.select(&row);
        }
        if let Some(details) = self.state.selected_row().map(row_details) {
            ui.separator();
            ui.label(details);
        }
    }
}

fn row_details(row: &ReportRow) -> String {
    let mut details = format!(
        "{} vs {} (stem {}): score {:.2}, {} #{}, {}",
        row.target_name,
        row.matched_mark,
        row.stem,
        row.score,
        row.status,
        row.serial_number,
        row.verdict
    );
    if !row.registration_number.is_empty() {
        details.push_str(&format!(", reg. {}", row.registration_number));
    }
    if !row.inferred_classes.is_empty() {
        details.push_str(&format!(", classes {}", row.inferred_classes));
        if row.class_match {
            details.push_str(" (relevant)");
        }
    }
    details
}

fn verdict_color(verdict: Verdict) -> Color32 {
    match verdict {
        Verdict::Clear => Color32::from_rgb(96, 186, 112),
        Verdict::Risk => Color32::from_rgb(246, 196, 69),
        Verdict::Blocked => Color32::from_rgb(230, 86, 86),
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Report").clicked() {
                        self.open_report();
                        ui.close_menu();
                    }
                    if ui.button("Reload Report").clicked() {
                        self.reload_report();
                        ui.close_menu();
                    }
                    let save_enabled = !self.state.rows.is_empty();
                    if ui.add_enabled(save_enabled, egui::Button::new("Save Filtered")).clicked() {
                        self.save_filtered();
                        ui.close_menu();
                    }
                });

                ui.separator();
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::SidePanel::left("filters").resizable(true).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_filters(ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Matches");
            self.render_rows(ui);
        });
    }
}
