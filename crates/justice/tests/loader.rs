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

mod common;

use anyhow::Result;
use common::{Fixture, GEOGRAPHIES};
use justice::aggregate::AggregatedTable;
use justice::dataset::DatasetLoader;
use justice::{
    ChartError, Dashboard, DashboardError, DataError, DatasetKey, Dimension, ReferencePeriod,
};
use std::fs;

fn key() -> DatasetKey {
    DatasetKey::new("test/table")
}

#[test]
fn test_missing_file_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let loader = DatasetLoader::new(dir.path());
    let err = loader
        .load_path(&key(), &dir.path().join("absent.csv"), &[])
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound { .. }));
    assert!(err.is_fatal());
    Ok(())
}

#[test]
fn test_missing_columns_is_format_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    fs::write(&path, "REF_DATE,GEO,AMOUNT\n2019,Alberta,4\n")?;
    let err = DatasetLoader::new(dir.path())
        .load_path(&key(), &path, &["Sex".to_string()])
        .unwrap_err();
    match &err {
        DataError::Format { missing, .. } => {
            assert!(missing.contains(&"VALUE".to_string()));
            assert!(missing.contains(&"Sex".to_string()));
        }
        other => panic!("expected a format error, got {other:?}"),
    }
    assert!(!err.is_fatal());
    Ok(())
}

#[test]
fn test_fiscal_and_monthly_periods() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    fs::write(
        &path,
        "REF_DATE,GEO,VALUE\n1997/1998,Alberta,1\n2019-03,Alberta,2\n2020,Alberta,3\n",
    )?;
    let dataset = DatasetLoader::new(dir.path()).load_path(&key(), &path, &[])?;
    let periods: Vec<ReferencePeriod> = dataset.records().iter().map(|r| r.period).collect();
    assert_eq!(periods[0], ReferencePeriod::fiscal(1997, 1998));
    assert_eq!(periods[1].year, 2019);
    assert_eq!(periods[1].month, Some(3));
    assert_eq!(periods[1].end_year, None);
    assert_eq!(periods[2], ReferencePeriod::year(2020));
    assert_eq!(dataset.year_span(), Some((1997, 2020)));
    assert_eq!(periods[0].to_string(), "1997/1998");
    assert_eq!(periods[1].to_string(), "2019-03");
    Ok(())
}

#[test]
fn test_unparseable_period_is_reported_with_row() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    fs::write(&path, "REF_DATE,GEO,VALUE\n2019,Alberta,1\nsoon,Alberta,2\n")?;
    let err = DatasetLoader::new(dir.path())
        .load_path(&key(), &path, &[])
        .unwrap_err();
    match err {
        DataError::BadPeriod { row, value, .. } => {
            assert_eq!(row, 2);
            assert_eq!(value, "soon");
        }
        other => panic!("expected a period error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_blank_value_counts_as_matched_row() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    fs::write(
        &path,
        "REF_DATE,GEO,Sex,VALUE\n2019,Alberta,Male,7.5\n2019,Alberta,Female,\n",
    )?;
    let dataset =
        DatasetLoader::new(dir.path()).load_path(&key(), &path, &["Sex".to_string()])?;
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[1].value, None);
    assert_eq!(dataset.records()[1].label("Sex"), Some("Female"));

    let records: Vec<_> = dataset.records().iter().collect();
    let table = AggregatedTable::group_sum(&records, &[Dimension::Geography]);
    assert_eq!(table.matched_rows, 2);
    assert_eq!(table.total(), 7.5);
    Ok(())
}

#[test]
fn test_byte_order_mark_in_header_is_tolerated() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    fs::write(&path, "\u{feff}REF_DATE,GEO,VALUE\n2019,Ontario,10\n")?;
    let dataset = DatasetLoader::new(dir.path()).load_path(&key(), &path, &[])?;
    assert_eq!(dataset.records()[0].geo.as_ref(), "Ontario");
    Ok(())
}

#[test]
fn test_fixture_catalog_and_options() -> Result<()> {
    let fixture = Fixture::new()?;
    let dashboard = Dashboard::open(fixture.config.clone())?;
    assert!(dashboard.startup_errors().is_empty());
    assert_eq!(dashboard.catalog().len(), 8);

    let options = dashboard.options();
    let mut expected: Vec<String> = GEOGRAPHIES.iter().map(|g| g.to_string()).collect();
    expected.sort();
    assert_eq!(options.geographies, expected);
    assert_eq!(options.years.first(), Some(&1997));
    assert_eq!(options.years.last(), Some(&2022));
    assert_eq!(options.slider_marks(), vec![1997, 2002, 2007, 2012, 2017, 2022]);
    Ok(())
}

#[test]
fn test_format_problem_disables_only_its_dataset() -> Result<()> {
    let fixture = Fixture::new()?;
    fixture.overwrite("adult/35100016.csv", "REF_DATE,GEO,VALUE\n2019,Alberta,1\n")?;
    let dashboard = Dashboard::open(fixture.config.clone())?;
    assert_eq!(dashboard.startup_errors().len(), 1);
    assert!(matches!(
        dashboard.startup_errors()[0],
        DashboardError::Data(DataError::Format { .. })
    ));
    assert_eq!(dashboard.catalog().len(), 7);
    let err = dashboard
        .catalog()
        .get(&DatasetKey::new("adult/35100016"))
        .unwrap_err();
    assert!(matches!(err, ChartError::DatasetUnavailable { .. }));
    Ok(())
}

#[test]
fn test_unparseable_file_is_fatal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.csv");
    fs::write(&path, "")?;
    let err = DatasetLoader::new(dir.path())
        .load_path(&key(), &path, &[])
        .unwrap_err();
    assert!(matches!(err, DataError::Unreadable { .. }));
    assert!(err.is_fatal());

    let fixture = Fixture::new()?;
    fixture.overwrite("adult/35100017.csv", "")?;
    let result = Dashboard::open(fixture.config.clone());
    assert!(matches!(
        result,
        Err(DashboardError::Data(DataError::Unreadable { .. }))
    ));
    Ok(())
}

#[test]
fn test_missing_dataset_aborts_startup() -> Result<()> {
    let fixture = Fixture::new()?;
    fixture.remove("youth/35100004.csv")?;
    let result = Dashboard::open(fixture.config.clone());
    assert!(matches!(
        result,
        Err(DashboardError::Data(DataError::NotFound { .. }))
    ));
    Ok(())
}
