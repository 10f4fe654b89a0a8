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

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod controls;
pub mod dataset;
pub mod dispatcher;
pub mod error;
pub mod render;
pub mod selection;

pub use aggregate::{AggregatedTable, Dimension, PivotTable, RowFilter};
pub use charts::{ChartDescriptor, ChartId, ChartPipeline, ChartRegistry, ChartSpec};
pub use config::DashboardConfig;
pub use controls::{ControlOptions, ControlPanel};
pub use dataset::{Dataset, DatasetCatalog, DatasetKey, Record, ReferencePeriod};
pub use dispatcher::{Dispatcher, RenderOutput, SharedDispatcher};
pub use error::{
    ChartError, ConfigError, DashboardError, DataError, ErrorReporter, ErrorSeverity, Result,
};
pub use selection::{GeoSelection, RateKind, SelectionState, Sex, Tab, Theme, YearRange};

use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::info;

/// Loaded datasets, chart registry and defaults: everything a rendering surface needs.
pub struct Dashboard {
    config: DashboardConfig,
    catalog: Arc<DatasetCatalog>,
    registry: Arc<ChartRegistry>,
    options: ControlOptions,
    startup_errors: Vec<DashboardError>,
}

impl Dashboard {
    /// Loads every dataset named by `config`. A missing dataset aborts; format problems are
    /// collected in [`Dashboard::startup_errors`] and only disable the affected charts.
    pub fn open(config: DashboardConfig) -> Result<Self> {
        let registry = ChartRegistry::builtin();
        registry.validate()?;
        let (catalog, problems) = DatasetCatalog::load(&config)?;
        let options = ControlOptions::from_catalog(&catalog, &config);
        info!(
            datasets = catalog.len(),
            charts = registry.len(),
            geographies = options.geographies.len(),
            "dashboard ready"
        );
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            registry: Arc::new(registry),
            options,
            startup_errors: problems.into_iter().map(DashboardError::from).collect(),
        })
    }
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
    pub fn catalog(&self) -> &Arc<DatasetCatalog> {
        &self.catalog
    }
    pub fn registry(&self) -> &Arc<ChartRegistry> {
        &self.registry
    }
    pub fn options(&self) -> &ControlOptions {
        &self.options
    }
    pub fn startup_errors(&self) -> &[DashboardError] {
        &self.startup_errors
    }
    /// Formatted startup problems, or `None` when every dataset loaded.
    pub fn startup_report(&self, reporter: &ErrorReporter) -> Option<String> {
        (!self.startup_errors.is_empty()).then(|| reporter.report_all(&self.startup_errors))
    }
    /// Year span of the control options, falling back to the configured defaults and then to
    /// the current year.
    pub fn year_span(&self) -> YearRange {
        self.options
            .year_bounds()
            .or_else(|| {
                self.config
                    .defaults
                    .years
                    .map(|[start, end]| YearRange::new(start, end))
            })
            .unwrap_or_else(|| {
                let year = Utc::now().year();
                YearRange::new(year, year)
            })
    }
    pub fn default_selection(&self) -> SelectionState {
        self.config.defaults.to_selection(self.year_span())
    }
    pub fn control_panel(&self) -> ControlPanel {
        ControlPanel::new(self.options.clone(), self.default_selection())
    }
    pub fn pipeline(&self) -> ChartPipeline {
        ChartPipeline::new(self.catalog.clone(), self.config.rollups())
    }
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.pipeline(), self.registry.clone())
    }
    pub fn shared_dispatcher(&self) -> SharedDispatcher {
        SharedDispatcher::new(self.dispatcher())
    }
}
