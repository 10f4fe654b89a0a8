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

use crate::charts::{BarMode, ChartId};
use crate::selection::Theme;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter3dTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub z: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethFrame {
    pub name: String,
    pub locations: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Bar {
        mode: BarMode,
        categories: Vec<String>,
        series: Vec<BarSeries>,
        /// Values are percentages of each category.
        percent: bool,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
    Scatter3d {
        traces: Vec<Scatter3dTrace>,
    },
    Choropleth {
        frames: Vec<ChoroplethFrame>,
        /// Shared colour scale across frames.
        range: (f64, f64),
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<Option<f64>>>,
    },
    NoData {
        message: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axes {
    pub x: Option<String>,
    pub y: Option<String>,
    pub value: Option<String>,
}

/// A chart ready for any rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub title: String,
    pub annotation: Option<String>,
    pub theme: Theme,
    pub axes: Axes,
    pub body: ChartBody,
}

impl ChartSpec {
    pub fn no_data(id: ChartId, title: String, theme: Theme) -> Self {
        Self {
            id,
            title,
            annotation: None,
            theme,
            axes: Axes::default(),
            body: ChartBody::NoData {
                message: "No data for the selected years and provinces.".to_string(),
            },
        }
    }
    pub fn failed(id: ChartId, title: String, theme: Theme, message: impl Into<String>) -> Self {
        Self {
            id,
            title,
            annotation: None,
            theme,
            axes: Axes::default(),
            body: ChartBody::Failed {
                message: message.into(),
            },
        }
    }
    /// True for the no-data and error placeholders.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.body,
            ChartBody::NoData { .. } | ChartBody::Failed { .. }
        )
    }
    pub fn is_failed(&self) -> bool {
        matches!(self.body, ChartBody::Failed { .. })
    }
}
