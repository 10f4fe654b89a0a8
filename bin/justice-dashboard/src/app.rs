// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::plot;
use anyhow::{anyhow, Context, Result};
use eframe::egui;
use justice::render::{self, html::PAGE_TITLE};
use justice::{
    ControlPanel, Dashboard, DashboardConfig, Dispatcher, ErrorReporter, RateKind, RenderOutput,
    SelectionState, Sex, Tab, Theme,
};
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const TOAST_DURATION: Duration = Duration::from_secs(2);

pub fn run(config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_title(PAGE_TITLE),
        ..Default::default()
    };
    eframe::run_native(
        PAGE_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
    .map_err(|err| anyhow!("dashboard window failed: {err}"))
}

/// One loaded dashboard: the datasets, the control panel and the dispatcher fed by it.
struct Session {
    dashboard: Dashboard,
    panel: ControlPanel,
    dispatcher: Dispatcher,
}

impl Session {
    fn open(config: DashboardConfig) -> Result<Self> {
        let dashboard = Dashboard::open(config).context("loading datasets")?;
        let panel = dashboard.control_panel();
        let mut dispatcher = dashboard.dispatcher();
        let report = dispatcher.start(panel.selection().clone());
        info!(charts = report.recomputed.len(), "initial charts computed");
        Ok(Self {
            dashboard,
            panel,
            dispatcher,
        })
    }
}

struct DashboardApp {
    config: DashboardConfig,
    session: Option<Session>,
    error_message: Option<String>,
    status: Option<String>,
    toast: Option<(String, Instant)>,
}

impl DashboardApp {
    fn new(config: DashboardConfig) -> Self {
        let mut app = Self {
            config,
            session: None,
            error_message: None,
            status: None,
            toast: None,
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        match Session::open(self.config.clone()) {
            Ok(session) => {
                self.status = session.dashboard.startup_report(&ErrorReporter::plain());
                self.session = Some(session);
                self.error_message = None;
            }
            Err(err) => {
                warn!(error = %err, "dashboard could not be opened");
                self.session = None;
                self.error_message = Some(format!("{err:#}"));
            }
        }
    }

    fn choose_data_folder(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            info!(dir = %dir.display(), "switching data folder");
            self.config = self.config.clone().with_data_dir(dir);
            self.reload();
        }
    }

    fn submit(&mut self, next: SelectionState) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let report = session.dispatcher.submit(next);
        if report.is_noop() {
            return;
        }
        let message = if report.failed.is_empty() {
            format!("Charts updated ({})", report.recomputed.len())
        } else {
            format!(
                "Charts updated ({}, {} failed)",
                report.recomputed.len(),
                report.failed.len()
            )
        };
        self.toast = Some((message, Instant::now()));
    }

    fn open_in_browser(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let theme = session.panel.selection().theme;
        let output = session.dispatcher.output();
        let result = render::document(output.specs().iter().map(|s| &**s), theme)
            .map_err(anyhow::Error::from)
            .and_then(|html| {
                let path = std::env::temp_dir().join("justice-dashboard.html");
                std::fs::write(&path, html)
                    .with_context(|| format!("writing {}", path.display()))?;
                Ok(path)
            })
            .and_then(|path| launch(&path));
        if let Err(err) = result {
            warn!(error = %err, "browser view failed");
            self.error_message = Some(format!("{err:#}"));
        }
    }
}

fn launch(path: &Path) -> Result<()> {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    }
    .with_context(|| format!("opening {}", path.display()))?;
    if !status.success() {
        return Err(anyhow!("browser launcher exited with {status}"));
    }
    Ok(())
}

/// Widget events collected during one frame, applied after the panels are drawn.
#[derive(Default)]
struct FrameActions {
    next: Vec<SelectionState>,
    choose_folder: bool,
    open_browser: bool,
}

impl FrameActions {
    fn push(&mut self, next: Option<SelectionState>) {
        self.next.extend(next);
    }
}

fn geography_controls(ui: &mut egui::Ui, panel: &mut ControlPanel, actions: &mut FrameActions) {
    ui.strong("Select Provinces:");
    let mut all = panel.selection().geographies.is_all();
    if ui.checkbox(&mut all, "All").changed() {
        let next = if all {
            panel.select_all()
        } else {
            panel.set_geographies(panel.options().geographies.clone())
        };
        actions.push(next);
    }
    let names = panel.options().geographies.clone();
    egui::ScrollArea::vertical()
        .id_salt("geographies")
        .max_height(220.0)
        .show(ui, |ui| {
            for name in &names {
                let mut checked = panel.selection().geographies.contains(name);
                if ui.checkbox(&mut checked, name.as_str()).changed() {
                    actions.push(panel.toggle_geography(name, checked));
                }
            }
        });
}

fn year_controls(ui: &mut egui::Ui, panel: &mut ControlPanel, actions: &mut FrameActions) {
    ui.strong("Select Years:");
    let Some(bounds) = panel.options().year_bounds() else {
        ui.weak("No years available");
        return;
    };
    let years = panel.selection().years;
    let mut start = years.start();
    let mut end = years.end();
    let moved_start = ui
        .add(egui::Slider::new(&mut start, bounds.start()..=bounds.end()).text("from"))
        .changed();
    let moved_end = ui
        .add(egui::Slider::new(&mut end, bounds.start()..=bounds.end()).text("to"))
        .changed();
    if moved_start || moved_end {
        actions.push(panel.set_years(start, end));
    }
    let marks: Vec<String> = panel
        .options()
        .slider_marks()
        .iter()
        .map(i32::to_string)
        .collect();
    ui.small(marks.join("  "));
}

fn tab_controls(ui: &mut egui::Ui, panel: &mut ControlPanel, actions: &mut FrameActions) {
    let selection = panel.selection().clone();
    match selection.active_tab {
        Some(Tab::Youth) => {
            ui.strong("Youth rate:");
            for rate in RateKind::ALL {
                if ui
                    .radio(selection.youth_rate == rate, rate.label())
                    .clicked()
                {
                    actions.push(panel.set_youth_rate(rate));
                }
            }
        }
        Some(Tab::Adult) => {
            ui.strong("Adult rate:");
            for rate in RateKind::ALL {
                if ui
                    .radio(selection.adult_rate == rate, rate.label())
                    .clicked()
                {
                    actions.push(panel.set_adult_rate(rate));
                }
            }
            ui.strong("Sex:");
            for sex in Sex::ALL {
                if ui.radio(selection.adult_sex == sex, sex.label()).clicked() {
                    actions.push(panel.set_adult_sex(sex));
                }
            }
        }
        Some(Tab::Misc) | None => {}
    }
}

/// egui visuals painted with the theme's body colours.
fn visuals(theme: Theme) -> egui::Visuals {
    let palette = theme.palette();
    let mut visuals = if palette.dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    let background = plot::colour(palette.background);
    visuals.panel_fill = background;
    visuals.window_fill = background;
    visuals.override_text_color = Some(plot::colour(palette.foreground));
    visuals.selection.bg_fill = plot::colour(palette.primary());
    visuals.hyperlink_color = plot::colour(palette.info());
    visuals
}

fn theme_controls(ui: &mut egui::Ui, panel: &mut ControlPanel, actions: &mut FrameActions) {
    let mut theme = panel.selection().theme;
    egui::ComboBox::from_label("Theme")
        .selected_text(theme.template_name())
        .show_ui(ui, |ui| {
            for option in Theme::ALL {
                ui.selectable_value(&mut theme, option, option.template_name());
            }
        });
    actions.push(panel.set_theme(theme));
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = FrameActions::default();
        let theme = self
            .session
            .as_ref()
            .map_or(Theme::Bootstrap, |s| s.panel.selection().theme);
        ctx.set_visuals(visuals(theme));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Justice in Motion");
                ui.separator();
                if let Some(session) = self.session.as_mut() {
                    geography_controls(ui, &mut session.panel, &mut actions);
                    ui.separator();
                    year_controls(ui, &mut session.panel, &mut actions);
                    ui.separator();
                    tab_controls(ui, &mut session.panel, &mut actions);
                    ui.separator();
                    theme_controls(ui, &mut session.panel, &mut actions);
                    ui.separator();
                    if ui.button("Open in browser").clicked() {
                        actions.open_browser = true;
                    }
                }
                if ui.button("Choose data folder").clicked() {
                    actions.choose_folder = true;
                }
            });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if let Some(error) = &self.error_message {
                ui.colored_label(egui::Color32::from_rgb(220, 53, 69), error);
            }
            if let Some(status) = &self.status {
                ui.small(status);
            }
            if let Some((message, shown)) = &self.toast {
                if shown.elapsed() < TOAST_DURATION {
                    ui.label(message);
                    ctx.request_repaint_after(TOAST_DURATION.saturating_sub(shown.elapsed()));
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = self.session.as_mut() else {
                ui.label("No data loaded. Choose a data folder to continue.");
                return;
            };
            let mut tab = session.panel.selection().active_tab;
            ui.horizontal(|ui| {
                for option in Tab::ALL {
                    ui.selectable_value(&mut tab, Some(option), option.label());
                }
            });
            if let Some(tab) = tab {
                actions.push(session.panel.set_tab(tab));
            }
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| match session.dispatcher.output() {
                RenderOutput::Charts { specs, .. } => {
                    for spec in &specs {
                        plot::chart(ui, spec);
                        ui.add_space(12.0);
                    }
                }
                RenderOutput::Fallback(message) => {
                    ui.label(message);
                }
            });
        });

        if let Some((_, shown)) = &self.toast {
            if shown.elapsed() >= TOAST_DURATION {
                self.toast = None;
            }
        }
        for next in actions.next {
            self.submit(next);
        }
        if actions.open_browser {
            self.open_in_browser();
        }
        if actions.choose_folder {
            self.choose_data_folder();
        }
    }
}
