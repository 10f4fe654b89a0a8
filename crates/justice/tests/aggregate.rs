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
use common::{record, Fixture, GEOGRAPHIES, ROLLUPS};
use justice::aggregate::{
    curated_order, filter_geographies, filter_years, percentage_shares, select_records,
};
use justice::dataset::Record;
use justice::selection::Rollups;
use justice::{
    AggregatedTable, ChartError, Dashboard, DatasetKey, Dimension, GeoSelection, RowFilter,
    YearRange,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

const SEX: &str = "Sex";

fn rollups() -> Rollups {
    Rollups::new(ROLLUPS)
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    let geos: Vec<&'static str> = GEOGRAPHIES.iter().chain(ROLLUPS.iter()).copied().collect();
    prop::collection::vec(
        (
            1990i32..2030,
            prop::sample::select(geos),
            prop::sample::select(vec!["Male", "Female"]),
            prop::option::of(0.0f64..1_000.0),
        ),
        0..200,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(year, geo, sex, value)| record(year, geo, &[(SEX, sex)], value))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_year_filter_is_idempotent(records in arb_records(), a in 1990i32..2030, b in 1990i32..2030) {
        let range = YearRange::new(a, b);
        let once = filter_years(&records, range);
        let twice = filter_years(once.iter().copied(), range);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.iter().all(|r| range.start() <= r.year() && r.year() <= range.end()));
    }

    #[test]
    fn prop_geography_selection_is_subset(
        records in arb_records(),
        picked in prop::sample::subsequence(GEOGRAPHIES.to_vec(), 1..5),
    ) {
        let rollups = rollups();
        let only = GeoSelection::only(picked.iter().copied()).unwrap();
        let subset = filter_geographies(&records, &only, &rollups);
        prop_assert!(subset.len() <= records.len());
        prop_assert!(subset.iter().all(|r| picked.contains(&r.geo.as_ref())));

        let all_before = filter_geographies(&records, &GeoSelection::All, &rollups).len();
        let _ = filter_geographies(subset.iter().copied(), &GeoSelection::All, &rollups);
        let all_after = filter_geographies(&records, &GeoSelection::All, &rollups).len();
        let expected = records.iter().filter(|r| !rollups.contains(&r.geo)).count();
        prop_assert_eq!(all_before, expected);
        prop_assert_eq!(all_after, expected);
    }

    #[test]
    fn prop_percentage_shares_sum_to_hundred_or_fail(values in prop::collection::vec(prop_oneof![Just(0.0f64), 0.0f64..500.0], 1..6)) {
        let total: f64 = values.iter().sum();
        match percentage_shares(&values, "group") {
            Ok(shares) => {
                prop_assert!(total > 0.0);
                let sum: f64 = shares.iter().sum();
                prop_assert!((sum - 100.0).abs() < 1e-6);
            }
            Err(ChartError::DivisionAmbiguous { group }) => {
                prop_assert_eq!(total, 0.0);
                prop_assert_eq!(group, "group");
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}

#[test]
fn test_alberta_between_1999_and_2005() -> Result<()> {
    let fixture = Fixture::new()?;
    let dashboard = Dashboard::open(fixture.config.clone())?;
    let dataset = dashboard
        .catalog()
        .get(&DatasetKey::new("youth/35100003"))?
        .clone();
    let selection = GeoSelection::only(["Alberta"]).unwrap();
    let rows = select_records(
        dataset.records(),
        YearRange::new(1999, 2005),
        &selection,
        &rollups(),
        &[],
    );
    assert_eq!(rows.len(), 7 * 4);
    assert!(rows
        .iter()
        .all(|r| r.geo.as_ref() == "Alberta" && (1999..=2005).contains(&r.year())));
    Ok(())
}

#[test]
fn test_all_excludes_rollups_but_keeps_provinces() -> Result<()> {
    let fixture = Fixture::new()?;
    let dashboard = Dashboard::open(fixture.config.clone())?;
    let dataset = dashboard
        .catalog()
        .get(&DatasetKey::new("youth/35100003"))?
        .clone();
    let rows = filter_geographies(dataset.records(), &GeoSelection::All, &rollups());
    assert!(rows.iter().all(|r| r.geo.as_ref() != "Canada"));
    let table = AggregatedTable::group_sum(&rows, &[Dimension::Geography]);
    let mut seen = table.distinct(&Dimension::Geography);
    seen.sort();
    let mut expected: Vec<String> = GEOGRAPHIES.iter().map(|g| g.to_string()).collect();
    expected.sort();
    assert_eq!(seen, expected);

    let explicit = GeoSelection::only(["Canada"]).unwrap();
    let national = filter_geographies(dataset.records(), &explicit, &rollups());
    assert!(!national.is_empty());
    Ok(())
}

#[test]
fn test_row_filters() {
    let male = record(2001, "Ontario", &[(SEX, "Male")], Some(3.0));
    let female = record(2001, "Ontario", &[(SEX, "Female")], Some(4.0));
    let sex = Dimension::label(SEX);

    assert!(RowFilter::equals(sex.clone(), "Male").matches(&male));
    assert!(!RowFilter::equals(sex.clone(), "Male").matches(&female));
    assert!(RowFilter::not_equals(sex.clone(), "Male").matches(&female));
    assert!(RowFilter::one_of(sex.clone(), ["Male", "Total"]).matches(&male));
    assert!(!RowFilter::none_of(sex.clone(), ["Male"]).matches(&male));
    assert!(RowFilter::contains(sex.clone(), "emal").matches(&female));
    assert!(RowFilter::equals(Dimension::Geography, "Ontario").matches(&male));
    assert!(RowFilter::equals(Dimension::Year, "2001").matches(&male));
    assert!(RowFilter::equals(Dimension::Period, "2001/2002").matches(&male));
    // A column the record lacks reads as blank.
    assert!(RowFilter::equals(Dimension::label("Age group"), "").matches(&male));
}

#[test]
fn test_group_sum_relabel_and_pivot() {
    let records = vec![
        record(2001, "Ontario", &[(SEX, "Male")], Some(3.0)),
        record(2001, "Ontario", &[(SEX, "Female")], Some(4.0)),
        record(2002, "Ontario", &[(SEX, "Male")], Some(5.0)),
        record(2002, "Alberta", &[(SEX, "Total")], None),
    ];
    let refs: Vec<&Record> = records.iter().collect();
    let sex = Dimension::label(SEX);
    let table = AggregatedTable::group_sum(&refs, &[Dimension::Geography, sex.clone()]);
    assert_eq!(table.matched_rows, 4);
    assert_eq!(table.len(), 4);
    assert_eq!(table.total(), 12.0);
    assert_eq!(
        table.sums_by(&sex),
        vec![
            ("Male".to_string(), 8.0),
            ("Female".to_string(), 4.0),
            ("Total".to_string(), 0.0),
        ]
    );

    let labels = BTreeMap::from([("Female".to_string(), "Male".to_string())]);
    let merged = table.clone().relabel(&sex, &labels);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.rows[0].value, 12.0);

    let pivot = table.pivot(&Dimension::Geography, &sex);
    assert_eq!(pivot.row_keys, vec!["Ontario", "Alberta"]);
    assert_eq!(pivot.column_keys, vec!["Male", "Female", "Total"]);
    assert_eq!(pivot.value(0, 0), 8.0);
    assert_eq!(pivot.cells[1][0], None);
    assert_eq!(pivot.row_total(0), 12.0);
}

#[test]
fn test_zero_total_group_shares_are_zero() {
    let records = vec![
        record(2001, "Yukon", &[(SEX, "Male")], Some(0.0)),
        record(2001, "Yukon", &[(SEX, "Female")], Some(0.0)),
        record(2001, "Ontario", &[(SEX, "Male")], Some(1.0)),
        record(2001, "Ontario", &[(SEX, "Female")], Some(3.0)),
    ];
    let refs: Vec<&Record> = records.iter().collect();
    let sex = Dimension::label(SEX);
    let shares = AggregatedTable::group_sum(&refs, &[Dimension::Geography, sex.clone()])
        .pivot(&Dimension::Geography, &sex)
        .shares();
    assert_eq!(shares.cells[0], vec![Some(0.0), Some(0.0)]);
    assert_eq!(shares.cells[1], vec![Some(25.0), Some(75.0)]);
}

#[test]
fn test_curated_order() {
    let curated: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let seen = ["x", "b", "a", "b", "y"].iter().map(|s| s.to_string());
    assert_eq!(curated_order(seen, &curated), vec!["a", "b", "x", "y"]);

    let refs_owned = vec![
        record(2001, "Ontario", &[(SEX, "Female")], Some(1.0)),
        record(2001, "Ontario", &[(SEX, "Other")], Some(1.0)),
        record(2001, "Ontario", &[(SEX, "Male")], Some(1.0)),
    ];
    let refs: Vec<&Record> = refs_owned.iter().collect();
    let sex = Dimension::label(SEX);
    let ordered = AggregatedTable::group_sum(&refs, &[sex.clone()])
        .order_by(&sex, &["Male".to_string(), "Female".to_string()]);
    assert_eq!(ordered.distinct(&sex), vec!["Male", "Female", "Other"]);
}
