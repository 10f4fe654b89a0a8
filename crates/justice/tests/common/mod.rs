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

#![allow(dead_code)]

use anyhow::Result;
use justice::dataset::Record;
use justice::{DashboardConfig, ReferencePeriod};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const GEOGRAPHIES: [&str; 13] = [
    "Newfoundland and Labrador",
    "Prince Edward Island",
    "Nova Scotia",
    "New Brunswick",
    "Quebec",
    "Ontario",
    "Manitoba",
    "Saskatchewan",
    "Alberta",
    "British Columbia",
    "Yukon",
    "Northwest Territories",
    "Nunavut",
];

pub const ROLLUPS: [&str; 2] = ["Canada", "Provinces and territories"];

pub const FIRST_YEAR: i32 = 1997;
pub const LAST_START_YEAR: i32 = 2021;

/// Geography whose Indigenous identity counts are all zero.
pub const ZERO_IDENTITY_GEO: &str = "Yukon";

const SUPERVISION: &str = "Custodial and community supervision";
const TOTAL_CUSTODIAL: &str = "Total, custodial admissions";

const AGE_GROUPS: [&str; 10] = [
    "Total, custodial admissions by age group",
    "50 years and over",
    "18 to 19 years",
    "20 to 24 years",
    "25 to 29 years",
    "30 to 34 years",
    "35 to 39 years",
    "40 to 44 years",
    "45 to 49 years",
    "Median age on admission",
];

const SENTENCE_LENGTHS: [&str; 4] = [
    "Total, sentence length ordered",
    "6 months to less than 12 months",
    "Less than 1 month",
    "24 months and over",
];

/// Every configured dataset written as CSV under a temporary data folder.
pub struct Fixture {
    pub dir: TempDir,
    pub config: DashboardConfig,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        write_all(dir.path())?;
        let config = DashboardConfig::builtin()?.with_data_dir(dir.path());
        Ok(Self { dir, config })
    }
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
    pub fn overwrite(&self, relative: &str, content: &str) -> Result<()> {
        fs::write(self.path(relative), content)?;
        Ok(())
    }
    pub fn remove(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.path(relative))?;
        Ok(())
    }
}

/// Deterministic value for one geography and start year.
pub fn value_for(geo: &str, year: i32) -> f64 {
    let index = GEOGRAPHIES
        .iter()
        .position(|g| *g == geo)
        .map_or(100, |i| i + 1);
    (index * 10) as f64 + f64::from(year - FIRST_YEAR)
}

fn all_geographies() -> impl Iterator<Item = &'static str> {
    GEOGRAPHIES.iter().chain(ROLLUPS.iter()).copied()
}

fn write_dataset<F>(
    root: &Path,
    relative: &str,
    label_columns: &[&str],
    combos: &[Vec<&str>],
    value: F,
) -> Result<()>
where
    F: Fn(&str, i32, &[&str]) -> Option<f64>,
{
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(&path)?;
    let mut header = vec!["REF_DATE", "GEO", "DGUID"];
    header.extend_from_slice(label_columns);
    header.extend_from_slice(&["UOM", "VALUE", "STATUS"]);
    writer.write_record(&header)?;
    for year in FIRST_YEAR..=LAST_START_YEAR {
        let period = format!("{}/{}", year, year + 1);
        for geo in all_geographies() {
            for combo in combos {
                let mut row: Vec<String> = vec![period.clone(), geo.to_string(), String::new()];
                row.extend(combo.iter().map(|s| s.to_string()));
                row.push("Number".to_string());
                row.push(value(geo, year, combo).map(|v| v.to_string()).unwrap_or_default());
                row.push(String::new());
                writer.write_record(&row)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn single(values: &[&'static str]) -> Vec<Vec<&'static str>> {
    values.iter().map(|v| vec![*v]).collect()
}

fn cross(left: &[&'static str], right: &[&'static str]) -> Vec<Vec<&'static str>> {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| vec![*l, *r]))
        .collect()
}

fn write_all(root: &Path) -> Result<()> {
    let plain = |geo: &str, year: i32, _: &[&str]| Some(value_for(geo, year));

    write_dataset(
        root,
        "youth/35100003.csv",
        &[SUPERVISION],
        &single(&[
            "Total actual-in counts",
            "Secure custody, actual-in counts",
            "Incarceration rate",
            "Probation rate",
        ]),
        plain,
    )?;
    write_dataset(
        root,
        "youth/35100004.csv",
        &["Initial entry status"],
        &single(&["Remand", "Sentenced custody", "Probation"]),
        plain,
    )?;
    write_dataset(
        root,
        "adult/35100154.csv",
        &[SUPERVISION],
        &single(&[
            "Incarceration rates per 100,000 adults",
            "Probation rates per 100,000 adults",
            "Total actual-in counts",
        ]),
        plain,
    )?;
    write_dataset(
        root,
        "adult/35100014.csv",
        &["Custodial and community admissions"],
        &single(&[
            "Total custodial admissions",
            "Total community admissions",
            "Probation",
        ]),
        plain,
    )?;
    write_dataset(
        root,
        "adult/35100015.csv",
        &["Custodial admissions", "Sex"],
        &cross(&[TOTAL_CUSTODIAL, "Sentenced"], &["Male", "Female"]),
        plain,
    )?;
    write_dataset(
        root,
        "adult/35100016.csv",
        &["Custodial admissions", "Indigenous identity"],
        &cross(
            &[TOTAL_CUSTODIAL, "Remand"],
            &[
                "Total, Indigenous identity",
                "Indigenous identity",
                "Non-Indigenous identity",
            ],
        ),
        |geo: &str, year: i32, _: &[&str]| {
            Some(if geo == ZERO_IDENTITY_GEO {
                0.0
            } else {
                value_for(geo, year)
            })
        },
    )?;
    write_dataset(
        root,
        "adult/35100017.csv",
        &["Custodial admissions", "Age group"],
        &cross(
            &[TOTAL_CUSTODIAL, "Sentenced", "Remand", "Other custodial statuses"],
            &AGE_GROUPS,
        ),
        plain,
    )?;
    write_dataset(
        root,
        "adult/35100018.csv",
        &["Sentence length ordered", "Sex"],
        &cross(
            &SENTENCE_LENGTHS,
            &["Male", "Female", "Total, custodial admission by sex"],
        ),
        plain,
    )?;
    Ok(())
}

/// Hand-built record for aggregation tests.
pub fn record(year: i32, geo: &str, labels: &[(&str, &str)], value: Option<f64>) -> Record {
    let labels: BTreeMap<Arc<str>, Arc<str>> = labels
        .iter()
        .map(|(k, v)| (Arc::from(*k), Arc::from(*v)))
        .collect();
    Record {
        period: ReferencePeriod::fiscal(year, year + 1),
        geo: Arc::from(geo),
        labels,
        value,
    }
}
