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

//! Immutable in-memory datasets and the records they hold.

pub mod catalog;
pub mod loader;
pub mod period;

pub use catalog::{DatasetCatalog, DatasetFault};
pub use loader::{DatasetLoader, GEO_COLUMN, REF_DATE_COLUMN, VALUE_COLUMN};
pub use period::ReferencePeriod;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Identifier of a source table, e.g. `adult/35100154`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetKey(String);

impl DatasetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DatasetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DatasetKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// One observation row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub period: ReferencePeriod,
    pub geo: Arc<str>,
    pub labels: BTreeMap<Arc<str>, Arc<str>>,
    pub value: Option<f64>,
}

impl Record {
    pub fn year(&self) -> i32 {
        self.period.year
    }
    pub fn label(&self, column: &str) -> Option<&str> {
        self.labels.get(column).map(AsRef::as_ref)
    }
    /// Contribution to a sum; blank values count as nothing.
    pub fn amount(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub key: DatasetKey,
    pub row_count: usize,
    pub label_columns: Vec<String>,
    pub loaded_at: DateTime<Utc>,
    pub source_path: Option<PathBuf>,
}

/// Records of one source, in file order. Never mutated after loading.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    records: Arc<[Record]>,
}

impl Dataset {
    pub fn new(metadata: DatasetMetadata, records: Vec<Record>) -> Self {
        let mut metadata = metadata;
        metadata.row_count = records.len();
        Self {
            metadata,
            records: records.into(),
        }
    }
    pub fn key(&self) -> &DatasetKey {
        &self.metadata.key
    }
    pub fn records(&self) -> &[Record] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Distinct geographies in order of first appearance.
    pub fn geographies(&self) -> Vec<Arc<str>> {
        use itertools::Itertools;
        self.records.iter().map(|r| r.geo.clone()).unique().collect()
    }
    /// Inclusive span from the first start year to the last end year.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let first = self.records.iter().map(|r| r.period.year).min()?;
        let last = self
            .records
            .iter()
            .map(|r| r.period.last_year())
            .max()?;
        Some((first, last))
    }
}
