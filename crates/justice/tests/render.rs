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

mod common;

use anyhow::{anyhow, Result};
use common::{record, Fixture};
use justice::charts::{BarMode, BarSeries, ChartBody, ChartSpec};
use justice::dataset::Record;
use justice::render::{self, csv::write_table, html::PLOTLY_CDN};
use justice::{AggregatedTable, ChartId, Dashboard, Dimension, Tab, Theme};

fn bar_spec() -> ChartSpec {
    ChartSpec {
        id: ChartId::new("sample_bars"),
        title: "Admissions </script>".to_string(),
        annotation: Some("Selected: Alberta".to_string()),
        theme: Theme::Darkly,
        axes: Default::default(),
        body: ChartBody::Bar {
            mode: BarMode::Stack,
            categories: vec!["18 to 19 years".to_string(), "20 to 24 years".to_string()],
            series: vec![BarSeries {
                name: "Alberta".to_string(),
                values: vec![3.0, 4.0],
            }],
            percent: false,
        },
    }
}

#[test]
fn test_bar_figure_json() {
    let figure = bar_spec().to_plotly();
    assert_eq!(figure["layout"]["barmode"], "stack");
    assert_eq!(
        figure["layout"]["template"]["layout"]["paper_bgcolor"],
        "#222222"
    );
    assert_eq!(figure["layout"]["meta"]["theme"], "darkly");
    assert_eq!(figure["layout"]["meta"]["dark"], true);
    assert_eq!(figure["layout"]["xaxis"]["categoryorder"], "array");
    assert_eq!(
        figure["layout"]["annotations"][0]["text"],
        "Selected: Alberta"
    );
    let data = figure["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["type"], "bar");
    assert_eq!(data[0]["y"][1], 4.0);
}

#[test]
fn test_light_themes_differ() {
    let mut cerulean = bar_spec();
    cerulean.theme = Theme::Cerulean;
    let mut flatly = bar_spec();
    flatly.theme = Theme::Flatly;
    let cerulean = cerulean.to_plotly();
    let flatly = flatly.to_plotly();
    assert_ne!(cerulean["layout"]["template"], flatly["layout"]["template"]);
    assert_eq!(
        cerulean["layout"]["template"]["layout"]["colorway"][0],
        "#2fa4e7"
    );
    assert_eq!(
        flatly["layout"]["template"]["layout"]["colorway"][0],
        "#2c3e50"
    );
    assert_eq!(
        flatly["layout"]["template"]["layout"]["plot_bgcolor"],
        "#ffffff"
    );
}

#[test]
fn test_every_theme_has_its_own_palette() {
    let palettes: Vec<_> = Theme::ALL.iter().map(Theme::palette).collect();
    for (i, palette) in palettes.iter().enumerate() {
        assert!(palettes[i + 1..].iter().all(|other| other != palette));
        assert_eq!(palette.dark, Theme::ALL[i].is_dark());
    }
}

#[test]
fn test_placeholder_figure_hides_axes() {
    let spec = ChartSpec::failed(
        ChartId::new("broken"),
        "Broken".to_string(),
        Theme::Bootstrap,
        "Dataset 'adult/35100016' is unavailable",
    );
    let figure = spec.to_plotly();
    assert_eq!(figure["layout"]["xaxis"]["visible"], false);
    assert!(figure["layout"]["annotations"][0]["text"]
        .as_str()
        .is_some_and(|t| t.contains("unavailable")));
}

#[test]
fn test_geomap_figure_has_frames() -> Result<()> {
    let fixture = Fixture::new()?;
    let dashboard = Dashboard::open(fixture.config.clone())?;
    let mut dispatcher = dashboard.dispatcher();
    dispatcher.start(dashboard.default_selection().with_tab(Some(Tab::Adult)));
    let spec = dispatcher
        .output()
        .specs()
        .iter()
        .find(|s| s.id.as_str() == "adult_rates_geomap")
        .cloned()
        .ok_or_else(|| anyhow!("geomap slot missing"))?;
    let figure = spec.to_plotly();
    assert_eq!(figure["data"][0]["type"], "choropleth");
    assert_eq!(figure["frames"].as_array().map(Vec::len), Some(25));
    assert_eq!(
        figure["layout"]["sliders"][0]["steps"][0]["label"],
        "1997/1998"
    );
    Ok(())
}

#[test]
fn test_html_document() -> Result<()> {
    let spec = bar_spec();
    let page = render::document([&spec], Theme::Darkly)?;
    assert!(page.contains(PLOTLY_CDN));
    assert!(page.contains("id=\"chart-0\""));
    assert!(page.contains("data-chart=\"sample_bars\""));
    assert!(page.contains("data-theme=\"darkly\""));
    assert!(page.contains("background: #222222"));
    assert!(!page.contains("Admissions </script>"));

    let empty = render::document(std::iter::empty(), Theme::Flatly)?;
    assert!(empty.contains("No charts for this tab."));
    Ok(())
}

#[test]
fn test_csv_export() -> Result<()> {
    let records: Vec<Record> = vec![
        record(2001, "Ontario", &[("Sex", "Male")], Some(3.0)),
        record(2001, "Ontario", &[("Sex", "Female")], Some(4.5)),
    ];
    let refs: Vec<&Record> = records.iter().collect();
    let dimensions = [Dimension::Geography, Dimension::label("Sex")];
    let table = AggregatedTable::group_sum(&refs, &dimensions);
    let mut sink = Vec::new();
    write_table(&table, &mut sink)?;
    let text = String::from_utf8(sink)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["GEO,Sex,VALUE", "Ontario,Male,3", "Ontario,Female,4.5"]);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    render::csv::write_table_file(&table, &path)?;
    assert_eq!(std::fs::read_to_string(&path)?, text);
    Ok(())
}
