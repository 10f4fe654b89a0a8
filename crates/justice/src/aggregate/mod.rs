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

//! Filtering, grouping, pivoting and percentage arithmetic shared by every chart.

pub mod filter;
pub mod table;

pub use filter::{filter_geographies, filter_years, select_records, Dimension, RowFilter};
pub use table::{curated_order, percentage_shares, AggregatedRow, AggregatedTable, PivotTable};
