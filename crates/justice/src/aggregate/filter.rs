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

use crate::dataset::{Record, GEO_COLUMN};
use crate::selection::{GeoSelection, Rollups, YearRange};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A grouping axis of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Reference start year.
    Year,
    /// Full `REF_DATE` text, e.g. `1997/1998`.
    Period,
    Geography,
    Label(String),
}

impl Dimension {
    pub fn label(column: impl Into<String>) -> Self {
        Dimension::Label(column.into())
    }
    pub fn value_of<'r>(&self, record: &'r Record) -> Cow<'r, str> {
        match self {
            Dimension::Year => Cow::Owned(record.period.year.to_string()),
            Dimension::Period => Cow::Owned(record.period.to_string()),
            Dimension::Geography => Cow::Borrowed(record.geo.as_ref()),
            Dimension::Label(column) => Cow::Borrowed(record.label(column).unwrap_or_default()),
        }
    }
    pub fn name(&self) -> &str {
        match self {
            Dimension::Year => "Year",
            Dimension::Period => "REF_DATE",
            Dimension::Geography => GEO_COLUMN,
            Dimension::Label(column) => column,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed row predicate of a chart, applied before grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFilter {
    Equals { dimension: Dimension, value: String },
    NotEquals { dimension: Dimension, value: String },
    OneOf { dimension: Dimension, values: Vec<String> },
    NoneOf { dimension: Dimension, values: Vec<String> },
    Contains { dimension: Dimension, needle: String },
}

impl RowFilter {
    pub fn equals(dimension: Dimension, value: impl Into<String>) -> Self {
        RowFilter::Equals {
            dimension,
            value: value.into(),
        }
    }
    pub fn not_equals(dimension: Dimension, value: impl Into<String>) -> Self {
        RowFilter::NotEquals {
            dimension,
            value: value.into(),
        }
    }
    pub fn one_of<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RowFilter::OneOf {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
    pub fn none_of<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RowFilter::NoneOf {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
    pub fn contains(dimension: Dimension, needle: impl Into<String>) -> Self {
        RowFilter::Contains {
            dimension,
            needle: needle.into(),
        }
    }
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RowFilter::Equals { dimension, value } => dimension.value_of(record) == value.as_str(),
            RowFilter::NotEquals { dimension, value } => {
                dimension.value_of(record) != value.as_str()
            }
            RowFilter::OneOf { dimension, values } => {
                let actual = dimension.value_of(record);
                values.iter().any(|v| v.as_str() == actual)
            }
            RowFilter::NoneOf { dimension, values } => {
                let actual = dimension.value_of(record);
                !values.iter().any(|v| v.as_str() == actual)
            }
            RowFilter::Contains { dimension, needle } => {
                dimension.value_of(record).contains(needle.as_str())
            }
        }
    }
}

pub fn filter_years<'a, I>(records: I, range: YearRange) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| range.contains(r.year()))
        .collect()
}

/// Explicit selections keep members only; `All` keeps everything except rollup rows.
pub fn filter_geographies<'a, I>(
    records: I,
    selection: &GeoSelection,
    rollups: &Rollups,
) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| selection.admits(&r.geo, rollups))
        .collect()
}

/// Year range, geography selection and fixed predicates in one pass.
pub fn select_records<'a>(
    records: &'a [Record],
    range: YearRange,
    selection: &GeoSelection,
    rollups: &Rollups,
    filters: &[RowFilter],
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| range.contains(r.year()))
        .filter(|r| selection.admits(&r.geo, rollups))
        .filter(|r| filters.iter().all(|f| f.matches(r)))
        .collect()
}
