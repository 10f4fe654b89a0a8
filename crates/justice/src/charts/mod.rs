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

//! Chart descriptors and the registry of every chart the dashboard shows.
//!
//! A [`ChartDescriptor`] carries everything that used to differ between hand-written chart
//! functions: the source dataset, fixed row filters, the toggle it reacts to, grouping
//! dimensions, curated category order and the title template. One pipeline turns any
//! descriptor plus a selection into a [`ChartSpec`].

pub mod builder;
pub mod catalog;
pub mod pipeline;
pub mod spec;

pub use builder::build;
pub use pipeline::ChartPipeline;
pub use spec::{
    Axes, BarSeries, ChartBody, ChartSpec, ChoroplethFrame, PieSlice, Scatter3dTrace,
};

use crate::aggregate::{Dimension, RowFilter};
use crate::dataset::DatasetKey;
use crate::error::{ChartError, ChartResult};
use crate::selection::{RateKind, SelectionField, SelectionState, Sex, Tab};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(String);

impl ChartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChartId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Group,
    Stack,
}

impl BarMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarMode::Group => "group",
            BarMode::Stack => "stack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Summed values per `x` category, one bar series per `series` value.
    Bar { mode: BarMode },
    /// Stacked 100% bars: each `x` group split into `series` percentages.
    ShareBar,
    Pie,
    /// `x` by `depth` by value, coloured by `series` when present.
    Scatter3d { depth: Dimension },
    /// Map coloured by value per `x` location, one animation frame per `frame` value.
    Choropleth { frame: Dimension },
    /// `x` columns by `rows`.
    Heatmap { rows: Dimension },
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar { .. } => "bar",
            ChartKind::ShareBar => "share_bar",
            ChartKind::Pie => "pie",
            ChartKind::Scatter3d { .. } => "scatter3d",
            ChartKind::Choropleth { .. } => "choropleth",
            ChartKind::Heatmap { .. } => "heatmap",
        }
    }
}

/// Per-tab category switch in the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    YouthRate,
    AdultRate,
    AdultSex,
}

impl Toggle {
    pub fn field(&self) -> SelectionField {
        match self {
            Toggle::YouthRate => SelectionField::YouthRate,
            Toggle::AdultRate => SelectionField::AdultRate,
            Toggle::AdultSex => SelectionField::AdultSex,
        }
    }
    pub fn current(&self, selection: &SelectionState) -> &'static str {
        match self {
            Toggle::YouthRate => selection.youth_rate.label(),
            Toggle::AdultRate => selection.adult_rate.label(),
            Toggle::AdultSex => selection.adult_sex.label(),
        }
    }
    pub fn options(&self) -> Vec<&'static str> {
        match self {
            Toggle::YouthRate | Toggle::AdultRate => {
                RateKind::ALL.iter().map(RateKind::label).collect()
            }
            Toggle::AdultSex => Sex::ALL.iter().map(Sex::label).collect(),
        }
    }
}

/// How a toggle narrows a chart's rows: each toggle option maps to a value of `dimension`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleBinding {
    pub toggle: Toggle,
    pub dimension: Dimension,
    /// Substring match instead of equality.
    #[serde(default)]
    pub contains: bool,
    pub values: BTreeMap<String, String>,
}

impl ToggleBinding {
    pub fn new(toggle: Toggle, dimension: Dimension) -> Self {
        Self {
            toggle,
            dimension,
            contains: false,
            values: BTreeMap::new(),
        }
    }
    pub fn matching_substring(mut self) -> Self {
        self.contains = true;
        self
    }
    pub fn value(mut self, option: &str, value: impl Into<String>) -> Self {
        self.values.insert(option.to_string(), value.into());
        self
    }
    /// Row filter for the toggle's current option; an unmapped option filters by its label.
    pub fn filter_for(&self, selection: &SelectionState) -> RowFilter {
        let option = self.toggle.current(selection);
        let value = self
            .values
            .get(option)
            .cloned()
            .unwrap_or_else(|| option.to_string());
        if self.contains {
            RowFilter::contains(self.dimension.clone(), value)
        } else {
            RowFilter::equals(self.dimension.clone(), value)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTitles {
    pub x: Option<String>,
    pub y: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    pub id: ChartId,
    pub tab: Tab,
    pub dataset: DatasetKey,
    pub kind: ChartKind,
    /// Placeholders: `{start}`, `{end}`, `{selection}`, `{toggle}`.
    pub title: String,
    #[serde(default)]
    pub filters: Vec<RowFilter>,
    #[serde(default)]
    pub toggle: Option<ToggleBinding>,
    pub x: Dimension,
    #[serde(default)]
    pub series: Option<Dimension>,
    #[serde(default)]
    pub category_order: Vec<String>,
    #[serde(default)]
    pub series_order: Vec<String>,
    /// Heatmap row order.
    #[serde(default)]
    pub row_order: Vec<String>,
    #[serde(default)]
    pub series_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub axes: AxisTitles,
    /// Adds a "Selected: ..." annotation naming the geography selection.
    #[serde(default)]
    pub annotate_selection: bool,
}

impl ChartDescriptor {
    pub fn new(
        id: &str,
        tab: Tab,
        dataset: &str,
        kind: ChartKind,
        x: Dimension,
        title: &str,
    ) -> Self {
        Self {
            id: ChartId::new(id),
            tab,
            dataset: DatasetKey::new(dataset),
            kind,
            title: title.to_string(),
            filters: Vec::new(),
            toggle: None,
            x,
            series: None,
            category_order: Vec::new(),
            series_order: Vec::new(),
            row_order: Vec::new(),
            series_labels: BTreeMap::new(),
            axes: AxisTitles::default(),
            annotate_selection: false,
        }
    }
    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }
    pub fn toggle(mut self, binding: ToggleBinding) -> Self {
        self.toggle = Some(binding);
        self
    }
    pub fn series(mut self, dimension: Dimension) -> Self {
        self.series = Some(dimension);
        self
    }
    pub fn category_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_order = order.into_iter().map(Into::into).collect();
        self
    }
    pub fn series_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.series_order = order.into_iter().map(Into::into).collect();
        self
    }
    pub fn row_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.row_order = order.into_iter().map(Into::into).collect();
        self
    }
    pub fn series_label(mut self, raw: &str, label: &str) -> Self {
        self.series_labels.insert(raw.to_string(), label.to_string());
        self
    }
    pub fn axes(mut self, x: Option<&str>, y: Option<&str>, value: Option<&str>) -> Self {
        self.axes = AxisTitles {
            x: x.map(str::to_string),
            y: y.map(str::to_string),
            value: value.map(str::to_string),
        };
        self
    }
    pub fn annotate_selection(mut self) -> Self {
        self.annotate_selection = true;
        self
    }
    /// Grouping key of the aggregated table, in the order the builder reads it.
    pub fn group_dimensions(&self) -> Vec<Dimension> {
        let mut dims = match &self.kind {
            ChartKind::Bar { .. } | ChartKind::ShareBar | ChartKind::Pie => vec![self.x.clone()],
            ChartKind::Scatter3d { depth } => vec![self.x.clone(), depth.clone()],
            ChartKind::Choropleth { frame } => vec![frame.clone(), self.x.clone()],
            ChartKind::Heatmap { rows } => vec![self.x.clone(), rows.clone()],
        };
        if !matches!(self.kind, ChartKind::Pie | ChartKind::Choropleth { .. }) {
            if let Some(series) = &self.series {
                dims.push(series.clone());
            }
        }
        dims
    }
    /// Selection fields whose change invalidates this chart.
    pub fn depends_on(&self) -> Vec<SelectionField> {
        let mut fields = vec![
            SelectionField::Years,
            SelectionField::Geographies,
            SelectionField::Theme,
        ];
        if let Some(binding) = &self.toggle {
            fields.push(binding.toggle.field());
        }
        fields
    }
    pub fn render_title(&self, selection: &SelectionState) -> String {
        self.interpolate(&self.title, selection)
    }
    pub fn interpolate(&self, template: &str, selection: &SelectionState) -> String {
        let toggle = self
            .toggle
            .as_ref()
            .map(|b| b.toggle.current(selection))
            .unwrap_or_default();
        template
            .replace("{start}", &selection.years.start().to_string())
            .replace("{end}", &selection.years.end().to_string())
            .replace("{selection}", &selection.geographies.label())
            .replace("{toggle}", toggle)
    }
    pub fn validate(&self) -> ChartResult<()> {
        let invalid = |reason: &str| ChartError::InvalidDescriptor {
            chart: self.id.to_string(),
            reason: reason.to_string(),
        };
        if self.title.trim().is_empty() {
            return Err(invalid("title is empty"));
        }
        if matches!(self.kind, ChartKind::ShareBar) && self.series.is_none() {
            return Err(invalid("a share bar needs a series dimension"));
        }
        match self.kind {
            ChartKind::Bar { .. } | ChartKind::ShareBar | ChartKind::Pie
                if self.category_order.is_empty() =>
            {
                return Err(invalid("categories need a curated order"));
            }
            ChartKind::Heatmap { .. } if self.row_order.is_empty() => {
                return Err(invalid("heatmap rows need a curated order"));
            }
            _ => {}
        }
        let dims = self.group_dimensions();
        if dims.iter().collect::<HashSet<_>>().len() != dims.len() {
            return Err(invalid("grouping dimensions repeat"));
        }
        if let Some(binding) = &self.toggle {
            if binding.values.is_empty() {
                return Err(invalid("toggle binding maps no options"));
            }
        }
        Ok(())
    }
}

/// Ordered chart slots per tab.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: Vec<ChartDescriptor>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn builtin() -> Self {
        Self {
            charts: catalog::builtin_charts(),
        }
    }
    pub fn register(&mut self, descriptor: ChartDescriptor) -> ChartResult<()> {
        descriptor.validate()?;
        if self.get(&descriptor.id).is_some() {
            return Err(ChartError::InvalidDescriptor {
                chart: descriptor.id.to_string(),
                reason: "duplicate chart id".to_string(),
            });
        }
        self.charts.push(descriptor);
        Ok(())
    }
    pub fn validate(&self) -> ChartResult<()> {
        let mut seen = HashSet::new();
        for chart in &self.charts {
            chart.validate()?;
            if !seen.insert(&chart.id) {
                return Err(ChartError::InvalidDescriptor {
                    chart: chart.id.to_string(),
                    reason: "duplicate chart id".to_string(),
                });
            }
        }
        Ok(())
    }
    pub fn get(&self, id: &ChartId) -> Option<&ChartDescriptor> {
        self.charts.iter().find(|c| &c.id == id)
    }
    pub fn for_tab(&self, tab: Tab) -> impl Iterator<Item = &ChartDescriptor> {
        self.charts.iter().filter(move |c| c.tab == tab)
    }
    pub fn iter(&self) -> impl Iterator<Item = &ChartDescriptor> {
        self.charts.iter()
    }
    pub fn len(&self) -> usize {
        self.charts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
