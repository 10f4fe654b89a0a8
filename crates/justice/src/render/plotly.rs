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

use crate::charts::{ChartBody, ChartSpec};
use crate::selection::Theme;
use serde_json::{json, Map, Value};

pub const CANADA_GEOJSON: &str =
    "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/canada.geojson";

const TALL_FIGURE: u32 = 650;

impl ChartSpec {
    pub fn to_plotly(&self) -> Value {
        to_plotly(self)
    }
}

/// Plotly figure (`data`, `layout` and, for choropleths, `frames`).
pub fn to_plotly(spec: &ChartSpec) -> Value {
    let mut layout = Map::new();
    layout.insert("title".into(), json!({ "text": spec.title }));
    layout.insert("template".into(), template(spec.theme));
    layout.insert(
        "meta".into(),
        json!({ "theme": spec.theme.template_name(), "dark": spec.theme.is_dark() }),
    );
    if let Some(annotation) = &spec.annotation {
        layout.insert(
            "annotations".into(),
            json!([{
                "x": 0.5,
                "y": 1.15,
                "xref": "paper",
                "yref": "paper",
                "text": annotation,
                "showarrow": false,
                "font": { "size": 14 },
            }]),
        );
    }
    let mut frames = None;
    let data: Vec<Value> = match &spec.body {
        ChartBody::Bar {
            mode,
            categories,
            series,
            percent,
        } => {
            let tickangle = if *percent { -45 } else { 0 };
            layout.insert("barmode".into(), json!(mode.as_str()));
            layout.insert(
                "xaxis".into(),
                json!({
                    "title": { "text": spec.axes.x.clone().unwrap_or_default() },
                    "categoryorder": "array",
                    "categoryarray": categories,
                    "tickangle": tickangle,
                }),
            );
            layout.insert(
                "yaxis".into(),
                json!({ "title": { "text": spec.axes.y.clone().unwrap_or_default() } }),
            );
            series
                .iter()
                .map(|s| {
                    let mut trace = json!({
                        "type": "bar",
                        "name": s.name,
                        "x": categories,
                        "y": s.values,
                    });
                    if *percent {
                        trace["hovertemplate"] = json!("%{y:.2f}%");
                    }
                    trace
                })
                .collect()
        }
        ChartBody::Pie { slices } => {
            let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
            let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
            vec![json!({
                "type": "pie",
                "labels": labels,
                "values": values,
                "sort": false,
                "textposition": "inside",
                "textinfo": "percent+label",
            })]
        }
        ChartBody::Scatter3d { traces } => {
            layout.insert("height".into(), json!(TALL_FIGURE));
            layout.insert(
                "scene".into(),
                json!({
                    "xaxis": { "title": { "text": spec.axes.x.clone().unwrap_or_default() } },
                    "yaxis": { "title": { "text": spec.axes.y.clone().unwrap_or_default() } },
                    "zaxis": { "title": { "text": spec.axes.value.clone().unwrap_or_default() } },
                }),
            );
            let peak = traces
                .iter()
                .flat_map(|t| t.z.iter().copied())
                .fold(0.0_f64, f64::max);
            traces
                .iter()
                .map(|t| {
                    let sizes: Vec<f64> = t.z.iter().map(|z| marker_size(*z, peak)).collect();
                    json!({
                        "type": "scatter3d",
                        "mode": "markers",
                        "name": t.name,
                        "x": t.x,
                        "y": t.y,
                        "z": t.z,
                        "marker": { "size": sizes },
                    })
                })
                .collect()
        }
        ChartBody::Choropleth {
            frames: source,
            range,
        } => {
            layout.insert("height".into(), json!(TALL_FIGURE));
            layout.insert(
                "geo".into(),
                json!({
                    "scope": "north america",
                    "projection": { "type": "orthographic" },
                    "center": { "lon": -95, "lat": 60 },
                    "fitbounds": "locations",
                }),
            );
            let trace = |locations: &[String], values: &[f64]| {
                json!({
                    "type": "choropleth",
                    "geojson": CANADA_GEOJSON,
                    "featureidkey": "properties.name",
                    "locationmode": "geojson-id",
                    "locations": locations,
                    "z": values,
                    "zmin": range.0,
                    "zmax": range.1,
                    "colorbar": { "title": { "text": spec.axes.value.clone().unwrap_or_default() } },
                })
            };
            let steps: Vec<Value> = source
                .iter()
                .map(|f| {
                    json!({
                        "label": f.name,
                        "method": "animate",
                        "args": [[f.name], { "mode": "immediate", "frame": { "duration": 300 } }],
                    })
                })
                .collect();
            layout.insert("sliders".into(), json!([{ "steps": steps }]));
            frames = Some(
                source
                    .iter()
                    .map(|f| json!({ "name": f.name, "data": [trace(&f.locations, &f.values)] }))
                    .collect::<Vec<_>>(),
            );
            source
                .first()
                .map(|f| vec![trace(&f.locations, &f.values)])
                .unwrap_or_default()
        }
        ChartBody::Heatmap { x, y, z } => {
            layout.insert("height".into(), json!(TALL_FIGURE));
            layout.insert(
                "xaxis".into(),
                json!({ "title": { "text": spec.axes.x.clone().unwrap_or_default() } }),
            );
            layout.insert(
                "yaxis".into(),
                json!({ "title": { "text": spec.axes.y.clone().unwrap_or_default() } }),
            );
            vec![json!({
                "type": "heatmap",
                "x": x,
                "y": y,
                "z": z,
                "texttemplate": "%{z}",
            })]
        }
        ChartBody::NoData { message } | ChartBody::Failed { message } => {
            layout.insert("xaxis".into(), json!({ "visible": false }));
            layout.insert("yaxis".into(), json!({ "visible": false }));
            layout.insert(
                "annotations".into(),
                json!([{
                    "text": message,
                    "xref": "paper",
                    "yref": "paper",
                    "showarrow": false,
                    "font": { "size": 16 },
                }]),
            );
            Vec::new()
        }
    };
    let mut figure = json!({ "data": data, "layout": Value::Object(layout) });
    if let Some(frames) = frames {
        figure["frames"] = Value::Array(frames);
    }
    figure
}

/// Plotly template object carrying the theme's colours.
pub fn template(theme: Theme) -> Value {
    let palette = theme.palette();
    let background = palette.background.to_string();
    let grid = palette.foreground.with_alpha(0.2);
    let axis = json!({
        "gridcolor": grid,
        "linecolor": grid,
        "zerolinecolor": grid,
    });
    let colorway: Vec<String> = palette.colorway.iter().map(ToString::to_string).collect();
    let scale = json!([
        [0.0, palette.info().to_string()],
        [1.0, palette.danger().to_string()],
    ]);
    json!({
        "layout": {
            "colorway": colorway,
            "paper_bgcolor": background,
            "plot_bgcolor": background,
            "font": { "color": palette.foreground.to_string() },
            "xaxis": axis,
            "yaxis": axis,
            "scene": { "xaxis": axis, "yaxis": axis, "zaxis": axis },
            "geo": { "bgcolor": background, "lakecolor": background },
            "colorscale": { "sequential": scale },
        },
    })
}

/// Marker diameter proportional to the value, as a bubble size.
fn marker_size(value: f64, peak: f64) -> f64 {
    if peak <= 0.0 || value <= 0.0 {
        return 4.0;
    }
    4.0 + 26.0 * (value / peak).sqrt()
}
