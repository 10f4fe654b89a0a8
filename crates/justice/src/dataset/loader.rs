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

use crate::config::DatasetSource;
use crate::dataset::{Dataset, DatasetKey, DatasetMetadata, Record, ReferencePeriod};
use crate::error::{DataError, DataResult};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const REF_DATE_COLUMN: &str = "REF_DATE";
pub const GEO_COLUMN: &str = "GEO";
pub const VALUE_COLUMN: &str = "VALUE";

/// Reads whole delimited files into [`Dataset`]s. No partial loads.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    data_dir: PathBuf,
    delimiter: u8,
}

impl DatasetLoader {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            delimiter: b',',
        }
    }
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.data_dir.join(relative)
        }
    }
    pub fn load(&self, source: &DatasetSource) -> DataResult<Dataset> {
        let path = self.resolve(&source.path);
        self.load_path(&source.key, &path, &source.label_columns)
    }
    pub fn load_path(
        &self,
        key: &DatasetKey,
        path: &Path,
        label_columns: &[String],
    ) -> DataResult<Dataset> {
        File::open(path).map_err(|source| DataError::NotFound {
            key: key.clone(),
            path: path.to_path_buf(),
            source,
        })?;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_separator(self.delimiter))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|source| DataError::Unreadable {
                key: key.clone(),
                source,
            })?;
        let header = HeaderIndex::new(&df);
        let mut missing = Vec::new();
        let mut resolve = |wanted: &str| match header.find(wanted) {
            Some(actual) => Some(actual.to_string()),
            None => {
                missing.push(wanted.to_string());
                None
            }
        };
        let ref_date = resolve(REF_DATE_COLUMN);
        let geo = resolve(GEO_COLUMN);
        let value = resolve(VALUE_COLUMN);
        let labels: Vec<(String, Option<String>)> = label_columns
            .iter()
            .map(|name| (name.clone(), resolve(name)))
            .collect();
        let (Some(ref_date), Some(geo), Some(value)) = (ref_date, geo, value) else {
            return Err(DataError::Format {
                key: key.clone(),
                missing,
            });
        };
        if !missing.is_empty() {
            return Err(DataError::Format {
                key: key.clone(),
                missing,
            });
        }
        let bad_column = |column: &str| {
            let column = column.to_string();
            move |source: PolarsError| DataError::BadColumn {
                key: key.clone(),
                column,
                source,
            }
        };
        let periods = string_column(&df, &ref_date).map_err(bad_column(&ref_date))?;
        let geos = string_column(&df, &geo).map_err(bad_column(&geo))?;
        let values = float_column(&df, &value).map_err(bad_column(&value))?;
        let mut label_values = Vec::with_capacity(labels.len());
        for (name, actual) in &labels {
            let actual = actual.as_deref().unwrap_or(name);
            let column = string_column(&df, actual).map_err(bad_column(actual))?;
            label_values.push((name.as_str(), column));
        }

        let mut interner = Interner::default();
        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let raw_period = periods[row].as_deref().unwrap_or_default();
            let period =
                ReferencePeriod::parse(raw_period).ok_or_else(|| DataError::BadPeriod {
                    key: key.clone(),
                    row: row + 1,
                    value: raw_period.to_string(),
                })?;
            let mut row_labels = BTreeMap::new();
            for (name, column) in &label_values {
                let label = column[row].as_deref().unwrap_or_default();
                row_labels.insert(interner.intern(name), interner.intern(label));
            }
            records.push(Record {
                period,
                geo: interner.intern(geos[row].as_deref().unwrap_or_default()),
                labels: row_labels,
                value: values[row],
            });
        }
        debug!(dataset = %key, interned = interner.len(), "interned label values");
        info!(dataset = %key, rows = records.len(), path = %path.display(), "dataset loaded");
        Ok(Dataset::new(
            DatasetMetadata {
                key: key.clone(),
                row_count: records.len(),
                label_columns: label_columns.to_vec(),
                loaded_at: chrono::Utc::now(),
                source_path: Some(path.to_path_buf()),
            },
            records,
        ))
    }
}

/// Header lookup tolerant of a UTF-8 byte order mark and stray quotes on the first column.
struct HeaderIndex {
    names: Vec<String>,
}

impl HeaderIndex {
    fn new(df: &DataFrame) -> Self {
        Self {
            names: df
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
    fn find(&self, wanted: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| normalise_header(name) == wanted)
            .map(String::as_str)
    }
}

fn normalise_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim().trim_matches('"')
}

fn string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()))
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

#[derive(Default)]
struct Interner {
    values: HashMap<String, Arc<str>>,
}

impl Interner {
    fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.values.get(value) {
            return existing.clone();
        }
        let shared: Arc<str> = Arc::from(value);
        self.values.insert(value.to_string(), shared.clone());
        shared
    }
    fn len(&self) -> usize {
        self.values.len()
    }
}
