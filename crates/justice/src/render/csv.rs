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

use crate::aggregate::AggregatedTable;
use crate::dataset::VALUE_COLUMN;
use crate::error::SerialisationError;
use ::csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One header per grouping dimension followed by `VALUE`.
pub fn write_table<W: Write>(table: &AggregatedTable, sink: W) -> Result<(), SerialisationError> {
    let mut writer = Writer::from_writer(sink);
    let mut header: Vec<&str> = table.dimensions.iter().map(|d| d.name()).collect();
    header.push(VALUE_COLUMN);
    writer.write_record(&header)?;
    for row in &table.rows {
        let mut record: Vec<String> = row.keys.clone();
        record.push(row.value.to_string());
        writer.write_record(&record)?;
    }
    writer.flush().map_err(::csv::Error::from)?;
    Ok(())
}

pub fn write_table_file<P: AsRef<Path>>(
    table: &AggregatedTable,
    path: P,
) -> Result<(), SerialisationError> {
    let file = File::create(path.as_ref()).map_err(::csv::Error::from)?;
    write_table(table, file)
}
