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

//! Mapping from an aggregated table to a [`ChartSpec`]. No filtering happens here.

use crate::aggregate::{percentage_shares, AggregatedTable, Dimension};
use crate::charts::spec::{
    Axes, BarSeries, ChartBody, ChartSpec, ChoroplethFrame, PieSlice, Scatter3dTrace,
};
use crate::charts::{BarMode, ChartDescriptor, ChartKind};
use crate::selection::SelectionState;
use tracing::warn;

/// Builds the chart for `descriptor`. An empty table yields the no-data placeholder.
pub fn build(
    descriptor: &ChartDescriptor,
    table: &AggregatedTable,
    selection: &SelectionState,
) -> ChartSpec {
    let title = descriptor.render_title(selection);
    if table.is_empty() {
        return ChartSpec::no_data(descriptor.id.clone(), title, selection.theme);
    }
    let body = match &descriptor.kind {
        ChartKind::Bar { mode } => {
            let (categories, series) = bar_series(descriptor, table);
            ChartBody::Bar {
                mode: *mode,
                categories,
                series,
                percent: false,
            }
        }
        ChartKind::ShareBar => share_bars(descriptor, table),
        ChartKind::Pie => ChartBody::Pie {
            slices: table
                .sums_by(&descriptor.x)
                .into_iter()
                .map(|(label, value)| PieSlice { label, value })
                .collect(),
        },
        ChartKind::Scatter3d { depth } => scatter(descriptor, depth, table),
        ChartKind::Choropleth { frame } => choropleth(descriptor, frame, table),
        ChartKind::Heatmap { rows } => {
            let pivot = table
                .pivot(rows, &descriptor.x)
                .ordered(&descriptor.row_order, &descriptor.category_order);
            ChartBody::Heatmap {
                x: pivot.column_keys,
                y: pivot.row_keys,
                z: pivot.cells,
            }
        }
    };
    let interpolate =
        |t: &Option<String>| t.as_ref().map(|t| descriptor.interpolate(t, selection));
    ChartSpec {
        id: descriptor.id.clone(),
        title,
        annotation: descriptor
            .annotate_selection
            .then(|| format!("Selected: {}", selection.geographies.label())),
        theme: selection.theme,
        axes: Axes {
            x: interpolate(&descriptor.axes.x),
            y: interpolate(&descriptor.axes.y),
            value: interpolate(&descriptor.axes.value),
        },
        body,
    }
}

/// Categories along `x`, one series per `series` value (or a single unnamed one).
fn bar_series(
    descriptor: &ChartDescriptor,
    table: &AggregatedTable,
) -> (Vec<String>, Vec<BarSeries>) {
    let Some(series_dim) = &descriptor.series else {
        let (categories, values) = table.sums_by(&descriptor.x).into_iter().unzip();
        let name = descriptor.axes.y.clone().unwrap_or_default();
        return (categories, vec![BarSeries { name, values }]);
    };
    let pivot = table
        .pivot(series_dim, &descriptor.x)
        .ordered(&descriptor.series_order, &descriptor.category_order);
    let series = pivot
        .row_keys
        .iter()
        .enumerate()
        .map(|(r, name)| BarSeries {
            name: name.clone(),
            values: (0..pivot.column_keys.len())
                .map(|c| pivot.value(r, c))
                .collect(),
        })
        .collect();
    (pivot.column_keys.clone(), series)
}

fn share_bars(descriptor: &ChartDescriptor, table: &AggregatedTable) -> ChartBody {
    let Some(series_dim) = &descriptor.series else {
        let (categories, values): (Vec<String>, Vec<f64>) =
            table.sums_by(&descriptor.x).into_iter().unzip();
        let values = percentage_shares(&values, descriptor.id.as_str()).unwrap_or_else(|err| {
            warn!(error = %err, "percentage base recovered as zero");
            vec![0.0; categories.len()]
        });
        return ChartBody::Bar {
            mode: BarMode::Stack,
            categories,
            series: vec![BarSeries {
                name: String::new(),
                values,
            }],
            percent: true,
        };
    };
    let shares = table
        .pivot(&descriptor.x, series_dim)
        .ordered(&descriptor.category_order, &descriptor.series_order)
        .shares();
    let series = shares
        .column_keys
        .iter()
        .enumerate()
        .map(|(c, name)| BarSeries {
            name: name.clone(),
            values: shares.column(c),
        })
        .collect();
    ChartBody::Bar {
        mode: BarMode::Stack,
        categories: shares.row_keys.clone(),
        series,
        percent: true,
    }
}

fn scatter(
    descriptor: &ChartDescriptor,
    depth: &Dimension,
    table: &AggregatedTable,
) -> ChartBody {
    let mut traces: Vec<Scatter3dTrace> = Vec::new();
    for row in &table.rows {
        let name = descriptor
            .series
            .as_ref()
            .map(|s| table.key(row, s).to_string())
            .unwrap_or_default();
        let at = match traces.iter().position(|t| t.name == name) {
            Some(at) => at,
            None => {
                traces.push(Scatter3dTrace {
                    name,
                    x: Vec::new(),
                    y: Vec::new(),
                    z: Vec::new(),
                });
                traces.len() - 1
            }
        };
        let trace = &mut traces[at];
        trace.x.push(table.key(row, &descriptor.x).to_string());
        trace.y.push(table.key(row, depth).to_string());
        trace.z.push(row.value);
    }
    ChartBody::Scatter3d { traces }
}

fn choropleth(
    descriptor: &ChartDescriptor,
    frame: &Dimension,
    table: &AggregatedTable,
) -> ChartBody {
    let pivot = table
        .pivot(frame, &descriptor.x)
        .ordered(&[], &descriptor.category_order);
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    let mut frames: Vec<ChoroplethFrame> = pivot
        .row_keys
        .iter()
        .enumerate()
        .map(|(r, name)| {
            let mut locations = Vec::new();
            let mut values = Vec::new();
            for (c, location) in pivot.column_keys.iter().enumerate() {
                if let Some(value) = pivot.cells[r][c] {
                    low = low.min(value);
                    high = high.max(value);
                    locations.push(location.clone());
                    values.push(value);
                }
            }
            ChoroplethFrame {
                name: name.clone(),
                locations,
                values,
            }
        })
        .collect();
    frames.sort_by(|a, b| a.name.cmp(&b.name));
    let range = if low.is_finite() { (low, high) } else { (0.0, 0.0) };
    ChartBody::Choropleth { frames, range }
}
