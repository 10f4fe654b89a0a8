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

use crate::config::DashboardConfig;
use crate::dataset::{Dataset, DatasetKey, DatasetLoader};
use crate::error::{ChartError, ChartResult, DataError, DataResult};
use crate::selection::{Rollups, YearRange};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A dataset that loaded with a non-fatal error. Its charts render as error placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFault {
    pub key: DatasetKey,
    pub reason: String,
}

/// Every dataset of the dashboard, loaded once at startup and shared read-only.
#[derive(Debug, Default)]
pub struct DatasetCatalog {
    datasets: BTreeMap<DatasetKey, Arc<Dataset>>,
    faults: BTreeMap<DatasetKey, DatasetFault>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }
    /// Loads every configured source.
    ///
    /// A missing source aborts the whole load. Format problems are kept as faults and returned
    /// alongside the catalog so they can be reported once.
    pub fn load(config: &DashboardConfig) -> DataResult<(Self, Vec<DataError>)> {
        let loader = DatasetLoader::new(&config.data_dir);
        let mut catalog = Self::new();
        let mut problems = Vec::new();
        for source in &config.datasets {
            match loader.load(source) {
                Ok(dataset) => catalog.insert(dataset),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(dataset = %source.key, error = %err, "dataset disabled");
                    catalog.insert_fault(DatasetFault {
                        key: source.key.clone(),
                        reason: err.to_string(),
                    });
                    problems.push(err);
                }
            }
        }
        info!(
            loaded = catalog.datasets.len(),
            faulty = catalog.faults.len(),
            "dataset catalog ready"
        );
        Ok((catalog, problems))
    }
    pub fn insert(&mut self, dataset: Dataset) {
        let key = dataset.key().clone();
        self.faults.remove(&key);
        self.datasets.insert(key, Arc::new(dataset));
    }
    pub fn insert_fault(&mut self, fault: DatasetFault) {
        self.datasets.remove(&fault.key);
        self.faults.insert(fault.key.clone(), fault);
    }
    pub fn get(&self, key: &DatasetKey) -> ChartResult<&Arc<Dataset>> {
        if let Some(dataset) = self.datasets.get(key) {
            return Ok(dataset);
        }
        let reason = self
            .faults
            .get(key)
            .map_or_else(|| "not loaded".to_string(), |f| f.reason.clone());
        Err(ChartError::DatasetUnavailable {
            key: key.clone(),
            reason,
        })
    }
    pub fn faults(&self) -> impl Iterator<Item = &DatasetFault> {
        self.faults.values()
    }
    pub fn keys(&self) -> impl Iterator<Item = &DatasetKey> {
        self.datasets.keys()
    }
    pub fn len(&self) -> usize {
        self.datasets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
    /// Checklist entries: distinct geographies without rollups, alphabetical.
    pub fn geography_options(&self, key: &DatasetKey, rollups: &Rollups) -> Vec<String> {
        let Ok(dataset) = self.get(key) else {
            return Vec::new();
        };
        let mut geos: Vec<String> = dataset
            .geographies()
            .into_iter()
            .filter(|g| !g.is_empty() && !rollups.contains(g))
            .map(|g| g.to_string())
            .collect();
        geos.sort();
        geos
    }
    /// Every year from the first reference year through the last fiscal end year.
    pub fn year_options(&self, key: &DatasetKey) -> Vec<i32> {
        self.year_span(key)
            .map(|span| (span.start()..=span.end()).collect())
            .unwrap_or_default()
    }
    pub fn year_span(&self, key: &DatasetKey) -> Option<YearRange> {
        let dataset = self.get(key).ok()?;
        dataset
            .year_span()
            .map(|(first, last)| YearRange::new(first, last))
    }
}
