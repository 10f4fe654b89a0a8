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

use anyhow::{Context, Result};
use justice::render::{self, csv::write_table_file};
use justice::{
    Dashboard, DashboardConfig, ErrorReporter, GeoSelection, RateKind, RenderOutput,
    SelectionState, Sex, Tab, Theme, YearRange,
};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub out: PathBuf,
    pub tab: Option<Tab>,
    pub from: Option<i32>,
    pub to: Option<i32>,
    pub geographies: Vec<String>,
    pub theme: Option<Theme>,
    pub youth_rate: Option<RateKind>,
    pub adult_rate: Option<RateKind>,
    pub sex: Option<Sex>,
}

impl ExportRequest {
    /// Flags layered over the default selection.
    pub fn selection(&self, defaults: SelectionState, span: YearRange) -> SelectionState {
        let mut selection = defaults;
        let start = self.from.unwrap_or(selection.years.start());
        let end = self.to.unwrap_or(selection.years.end());
        selection.years = YearRange::new(start, end).clamp_to(span);
        if self.geographies.iter().any(|g| g.eq_ignore_ascii_case("all")) {
            selection.geographies = GeoSelection::All;
        } else if let Some(only) = GeoSelection::only(self.geographies.iter().cloned()) {
            selection.geographies = only;
        }
        if let Some(tab) = self.tab {
            selection.active_tab = Some(tab);
        }
        if let Some(theme) = self.theme {
            selection.theme = theme;
        }
        if let Some(rate) = self.youth_rate {
            selection.youth_rate = rate;
        }
        if let Some(rate) = self.adult_rate {
            selection.adult_rate = rate;
        }
        if let Some(sex) = self.sex {
            selection.adult_sex = sex;
        }
        selection
    }
}

fn open(config: DashboardConfig) -> Result<Dashboard> {
    let dashboard = Dashboard::open(config).context("loading datasets")?;
    if let Some(report) = dashboard.startup_report(&ErrorReporter::new()) {
        eprintln!("{report}");
    }
    Ok(dashboard)
}

pub fn run_export(config: DashboardConfig, request: &ExportRequest) -> Result<()> {
    let dashboard = open(config)?;
    let selection = request.selection(dashboard.default_selection(), dashboard.year_span());
    let tab = selection.active_tab.unwrap_or(Tab::Youth);
    fs::create_dir_all(&request.out)
        .with_context(|| format!("creating {}", request.out.display()))?;

    let mut dispatcher = dashboard.dispatcher();
    let report = dispatcher.start(selection.clone());
    let page = request.out.join(format!("{}.html", tab.id()));
    match dispatcher.output() {
        RenderOutput::Charts { specs, .. } => {
            let html = render::document(specs.iter().map(|s| &**s), selection.theme)?;
            fs::write(&page, html).with_context(|| format!("writing {}", page.display()))?;
            for spec in &specs {
                let path = request.out.join(format!("{}.json", spec.id));
                let figure = serde_json::to_string_pretty(&spec.to_plotly())?;
                fs::write(&path, figure).with_context(|| format!("writing {}", path.display()))?;
            }
        }
        RenderOutput::Fallback(message) => {
            println!("{message}");
            let html = render::document(std::iter::empty(), selection.theme)?;
            fs::write(&page, html).with_context(|| format!("writing {}", page.display()))?;
        }
    }

    let pipeline = dashboard.pipeline();
    for descriptor in dashboard.registry().for_tab(tab) {
        match pipeline.table(descriptor, &selection) {
            Ok(table) => {
                let path = request.out.join(format!("{}.csv", descriptor.id));
                write_table_file(&table, &path)?;
            }
            Err(err) => warn!(chart = %descriptor.id, error = %err, "table not exported"),
        }
    }
    info!(
        tab = tab.id(),
        charts = report.recomputed.len(),
        failed = report.failed.len(),
        out = %request.out.display(),
        "export finished"
    );
    println!(
        "Exported {} chart(s) for {} ({}; {}) to {}",
        report.recomputed.len(),
        tab.label(),
        selection.years,
        selection.geographies.label(),
        request.out.display()
    );
    Ok(())
}

pub fn print_options(config: DashboardConfig) -> Result<()> {
    let dashboard = open(config)?;
    let options = dashboard.options();
    println!("Geographies:");
    for geo in &options.geographies {
        println!("  {geo}");
    }
    match options.year_bounds() {
        Some(span) => println!("Years: {span}"),
        None => println!("Years: none"),
    }
    let marks: Vec<String> = options.slider_marks().iter().map(i32::to_string).collect();
    println!("Slider marks: {}", marks.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExportRequest {
        ExportRequest {
            out: PathBuf::from("out"),
            tab: None,
            from: None,
            to: None,
            geographies: Vec::new(),
            theme: None,
            youth_rate: None,
            adult_rate: None,
            sex: None,
        }
    }

    #[test]
    fn test_flags_layer_over_defaults() {
        let span = YearRange::new(1997, 2022);
        let defaults = SelectionState::new(span, GeoSelection::All);
        let mut request = request();
        request.tab = Some(Tab::Adult);
        request.from = Some(1990);
        request.to = Some(2005);
        request.geographies = vec!["Alberta".to_string(), "Ontario".to_string()];
        request.sex = Some(Sex::Female);

        let selection = request.selection(defaults.clone(), span);
        assert_eq!(selection.active_tab, Some(Tab::Adult));
        assert_eq!(selection.years, YearRange::new(1997, 2005));
        assert_eq!(
            selection.geographies,
            GeoSelection::only(["Alberta", "Ontario"]).unwrap()
        );
        assert_eq!(selection.adult_sex, Sex::Female);
        assert_eq!(selection.theme, defaults.theme);
    }

    #[test]
    fn test_all_flag_selects_every_geography() {
        let span = YearRange::new(1997, 2022);
        let defaults = SelectionState::new(span, GeoSelection::only(["Alberta"]).unwrap());
        let mut request = request();
        request.geographies = vec!["ALL".to_string()];
        assert!(request.selection(defaults, span).geographies.is_all());
    }
}
