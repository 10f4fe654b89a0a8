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

use crate::aggregate::{select_records, AggregatedTable};
use crate::charts::{build, ChartDescriptor, ChartSpec};
use crate::dataset::DatasetCatalog;
use crate::error::{ChartError, ChartResult};
use crate::selection::{Rollups, SelectionState};
use std::sync::Arc;
use tracing::{debug, warn};

/// Filter, aggregate and build for any descriptor.
#[derive(Debug, Clone)]
pub struct ChartPipeline {
    catalog: Arc<DatasetCatalog>,
    rollups: Arc<Rollups>,
}

impl ChartPipeline {
    pub fn new(catalog: Arc<DatasetCatalog>, rollups: Rollups) -> Self {
        Self {
            catalog,
            rollups: Arc::new(rollups),
        }
    }
    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }
    pub fn rollups(&self) -> &Rollups {
        &self.rollups
    }
    /// Selected, grouped and ordered rows for one chart.
    pub fn table(
        &self,
        descriptor: &ChartDescriptor,
        selection: &SelectionState,
    ) -> ChartResult<AggregatedTable> {
        let dataset = self.catalog.get(&descriptor.dataset)?;
        let mut filters = descriptor.filters.clone();
        if let Some(binding) = &descriptor.toggle {
            filters.push(binding.filter_for(selection));
        }
        let records = select_records(
            dataset.records(),
            selection.years,
            &selection.geographies,
            &self.rollups,
            &filters,
        );
        if records.is_empty() {
            return Err(ChartError::EmptySelection {
                chart: descriptor.id.to_string(),
            });
        }
        let mut table = AggregatedTable::group_sum(&records, &descriptor.group_dimensions());
        if let Some(series) = &descriptor.series {
            table = table
                .relabel(series, &descriptor.series_labels)
                .order_by(series, &descriptor.series_order);
        }
        Ok(table.order_by(&descriptor.x, &descriptor.category_order))
    }
    /// Never fails: empty selections become the no-data placeholder and any other error an
    /// error placeholder confined to this chart.
    pub fn render(&self, descriptor: &ChartDescriptor, selection: &SelectionState) -> ChartSpec {
        match self.table(descriptor, selection) {
            Ok(table) => {
                debug!(
                    chart = %descriptor.id,
                    groups = table.len(),
                    matched = table.matched_rows,
                    "chart computed"
                );
                build(descriptor, &table, selection)
            }
            Err(ChartError::EmptySelection { .. }) => {
                debug!(chart = %descriptor.id, "no records for selection");
                ChartSpec::no_data(
                    descriptor.id.clone(),
                    descriptor.render_title(selection),
                    selection.theme,
                )
            }
            Err(err) => {
                warn!(chart = %descriptor.id, error = %err, "chart slot failed");
                ChartSpec::failed(
                    descriptor.id.clone(),
                    descriptor.render_title(selection),
                    selection.theme,
                    err.to_string(),
                )
            }
        }
    }
}
