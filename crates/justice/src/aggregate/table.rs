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

use crate::aggregate::Dimension;
use crate::dataset::Record;
use crate::error::{ChartError, ChartResult};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub keys: Vec<String>,
    pub value: f64,
}

/// Grouped sums, one row per distinct key tuple, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedTable {
    pub dimensions: Vec<Dimension>,
    pub rows: Vec<AggregatedRow>,
    /// Records that passed the filters, blank values included.
    pub matched_rows: usize,
}

impl AggregatedTable {
    pub fn group_sum(records: &[&Record], dimensions: &[Dimension]) -> Self {
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let mut rows: Vec<AggregatedRow> = Vec::new();
        for record in records {
            let keys: Vec<String> = dimensions
                .iter()
                .map(|d| d.value_of(record).into_owned())
                .collect();
            match index.get(&keys) {
                Some(&at) => rows[at].value += record.amount(),
                None => {
                    index.insert(keys.clone(), rows.len());
                    rows.push(AggregatedRow {
                        keys,
                        value: record.amount(),
                    });
                }
            }
        }
        Self {
            dimensions: dimensions.to_vec(),
            rows,
            matched_rows: records.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.matched_rows == 0
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn position(&self, dimension: &Dimension) -> Option<usize> {
        self.dimensions.iter().position(|d| d == dimension)
    }
    pub fn key<'t>(&self, row: &'t AggregatedRow, dimension: &Dimension) -> &'t str {
        self.position(dimension)
            .and_then(|at| row.keys.get(at))
            .map_or("", String::as_str)
    }
    /// Distinct values of a dimension in row order.
    pub fn distinct(&self, dimension: &Dimension) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| self.key(row, dimension).to_string())
            .unique()
            .collect()
    }
    /// Sums per value of one dimension, in row order.
    pub fn sums_by(&self, dimension: &Dimension) -> Vec<(String, f64)> {
        let mut sums: Vec<(String, f64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in &self.rows {
            let key = self.key(row, dimension);
            match index.get(key) {
                Some(&at) => sums[at].1 += row.value,
                None => {
                    index.insert(key.to_string(), sums.len());
                    sums.push((key.to_string(), row.value));
                }
            }
        }
        sums
    }
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }
    /// Stable reorder of rows so that `dimension` follows `curated`.
    pub fn order_by(mut self, dimension: &Dimension, curated: &[String]) -> Self {
        let Some(at) = self.position(dimension) else {
            return self;
        };
        let order = curated_order(self.rows.iter().map(|r| r.keys[at].clone()), curated);
        let rank: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, v)| (v.as_str(), i))
            .collect();
        let mut rows = std::mem::take(&mut self.rows);
        rows.sort_by_key(|r| rank.get(r.keys[at].as_str()).copied().unwrap_or(usize::MAX));
        self.rows = rows;
        self
    }
    /// Renames values of one dimension, merging rows that end up with the same keys.
    pub fn relabel(self, dimension: &Dimension, labels: &BTreeMap<String, String>) -> Self {
        let Some(at) = self.position(dimension) else {
            return self;
        };
        if labels.is_empty() {
            return self;
        }
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let mut rows: Vec<AggregatedRow> = Vec::with_capacity(self.rows.len());
        for mut row in self.rows {
            if let Some(label) = labels.get(&row.keys[at]) {
                row.keys[at] = label.clone();
            }
            match index.get(&row.keys) {
                Some(&existing) => rows[existing].value += row.value,
                None => {
                    index.insert(row.keys.clone(), rows.len());
                    rows.push(row);
                }
            }
        }
        Self {
            dimensions: self.dimensions,
            rows,
            matched_rows: self.matched_rows,
        }
    }
    /// Cross-tabulates two dimensions. Any other dimension is summed away; a dimension the
    /// table lacks collapses into a single blank key.
    pub fn pivot(&self, row_dimension: &Dimension, column_dimension: &Dimension) -> PivotTable {
        let row_keys = self.distinct(row_dimension);
        let column_keys = self.distinct(column_dimension);
        let row_at: HashMap<&str, usize> = row_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        let column_at: HashMap<&str, usize> = column_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        let mut cells = vec![vec![None; column_keys.len()]; row_keys.len()];
        for row in &self.rows {
            let r = row_at[self.key(row, row_dimension)];
            let c = column_at[self.key(row, column_dimension)];
            let cell: &mut Option<f64> = &mut cells[r][c];
            *cell = Some(cell.unwrap_or(0.0) + row.value);
        }
        PivotTable {
            row_dimension: row_dimension.clone(),
            column_dimension: column_dimension.clone(),
            row_keys,
            column_keys,
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub row_keys: Vec<String>,
    pub column_keys: Vec<String>,
    /// `None` where no group had both keys.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .flatten()
            .unwrap_or(0.0)
    }
    pub fn row_total(&self, row: usize) -> f64 {
        (0..self.column_keys.len()).map(|c| self.value(row, c)).sum()
    }
    /// Values of one column key down the rows, missing cells as zero.
    pub fn column(&self, column: usize) -> Vec<f64> {
        (0..self.row_keys.len())
            .map(|r| self.value(r, column))
            .collect()
    }
    /// Rearranges both axes to follow curated lists.
    pub fn ordered(self, row_order: &[String], column_order: &[String]) -> PivotTable {
        let rows = curated_order(self.row_keys.iter().cloned(), row_order);
        let columns = curated_order(self.column_keys.iter().cloned(), column_order);
        let row_from: Vec<usize> = rows
            .iter()
            .filter_map(|k| self.row_keys.iter().position(|r| r == k))
            .collect();
        let column_from: Vec<usize> = columns
            .iter()
            .filter_map(|k| self.column_keys.iter().position(|c| c == k))
            .collect();
        let cells = row_from
            .iter()
            .map(|&r| column_from.iter().map(|&c| self.cells[r][c]).collect())
            .collect();
        PivotTable {
            row_dimension: self.row_dimension,
            column_dimension: self.column_dimension,
            row_keys: rows,
            column_keys: columns,
            cells,
        }
    }
    /// Row-wise percentages. A zero row total is logged and reported as all zeros.
    pub fn shares(&self) -> PivotTable {
        let cells = self
            .row_keys
            .iter()
            .enumerate()
            .map(|(r, key)| {
                let values: Vec<f64> = (0..self.column_keys.len())
                    .map(|c| self.value(r, c))
                    .collect();
                let shares = percentage_shares(&values, key).unwrap_or_else(|err| {
                    warn!(error = %err, "percentage base recovered as zero");
                    vec![0.0; values.len()]
                });
                shares.into_iter().map(Some).collect()
            })
            .collect();
        PivotTable {
            row_dimension: self.row_dimension.clone(),
            column_dimension: self.column_dimension.clone(),
            row_keys: self.row_keys.clone(),
            column_keys: self.column_keys.clone(),
            cells,
        }
    }
}

/// `100 * value / total` for each value of one group.
pub fn percentage_shares(values: &[f64], group: &str) -> ChartResult<Vec<f64>> {
    let total: f64 = values.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(ChartError::DivisionAmbiguous {
            group: group.to_string(),
        });
    }
    Ok(values.iter().map(|v| 100.0 * v / total).collect())
}

/// Listed values that occur, in list order, then unlisted values in first-seen order.
pub fn curated_order<I>(seen: I, curated: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let seen: Vec<String> = seen.into_iter().unique().collect();
    let mut ordered: Vec<String> = curated
        .iter()
        .filter(|c| seen.contains(c))
        .cloned()
        .unique()
        .collect();
    ordered.extend(seen.into_iter().filter(|s| !curated.contains(s)));
    ordered
}
