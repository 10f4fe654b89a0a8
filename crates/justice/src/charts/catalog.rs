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

//! Built-in chart slots, in display order.

use crate::aggregate::{Dimension, RowFilter};
use crate::charts::{BarMode, ChartDescriptor, ChartKind, Toggle, ToggleBinding};
use crate::selection::Tab;

pub const YOUTH_SUPERVISION: &str = "youth/35100003";
pub const YOUTH_ENTRY_STATUS: &str = "youth/35100004";
pub const ADULT_SUPERVISION: &str = "adult/35100154";
pub const ADULT_ADMISSIONS: &str = "adult/35100014";
pub const ADULT_BY_SEX: &str = "adult/35100015";
pub const ADULT_BY_IDENTITY: &str = "adult/35100016";
pub const ADULT_BY_AGE: &str = "adult/35100017";
pub const ADULT_SENTENCE_LENGTH: &str = "adult/35100018";

const SUPERVISION: &str = "Custodial and community supervision";
const ADMISSIONS: &str = "Custodial and community admissions";
const CUSTODIAL_ADMISSIONS: &str = "Custodial admissions";
const TOTAL_CUSTODIAL: &str = "Total, custodial admissions";
const AGE_GROUP: &str = "Age group";

/// Provinces and territories east to west, then the national rows.
pub const GEOGRAPHY_ORDER: [&str; 15] = [
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
    "Provinces and territories",
    "Canada",
];

fn label(column: &str) -> Dimension {
    Dimension::label(column)
}

pub fn builtin_charts() -> Vec<ChartDescriptor> {
    let mut charts = youth_charts();
    charts.extend(adult_charts());
    charts
}

fn youth_charts() -> Vec<ChartDescriptor> {
    vec![
        ChartDescriptor::new(
            "youth_actual_in_counts",
            Tab::Youth,
            YOUTH_SUPERVISION,
            ChartKind::Bar {
                mode: BarMode::Stack,
            },
            label(SUPERVISION),
            "Actual-In Counts of Young Persons in Correctional Services ({start} to {end})",
        )
        .filter(RowFilter::contains(label(SUPERVISION), "actual-in"))
        .series(Dimension::Geography)
        .category_order([
            "Total actual-in counts",
            "Total custody, actual-in counts",
            "Secure custody, actual-in counts",
            "Open custody, actual-in counts",
            "Remand, actual-in counts",
            "Total community supervision, actual-in counts",
            "Probation, actual-in counts",
        ])
        .series_order(GEOGRAPHY_ORDER)
        .axes(Some(""), Some("Count"), None),
        ChartDescriptor::new(
            "youth_initial_entry_status",
            Tab::Youth,
            YOUTH_ENTRY_STATUS,
            ChartKind::Pie,
            label("Initial entry status"),
            "Distribution of Initial Entry Status by GEO from {start} to {end}",
        )
        .category_order([
            "Remand",
            "Sentenced custody",
            "Deferred custody and supervision",
            "Intensive support and supervision",
            "Probation",
            "Other community",
        ]),
        ChartDescriptor::new(
            "youth_rates_trend",
            Tab::Youth,
            YOUTH_SUPERVISION,
            ChartKind::Scatter3d {
                depth: Dimension::Geography,
            },
            Dimension::Year,
            "Youth {toggle} rates by province ({start} to {end})",
        )
        .toggle(
            ToggleBinding::new(Toggle::YouthRate, label(SUPERVISION))
                .matching_substring()
                .value("Incarceration", "Incarceration rate")
                .value("Probation", "Probation rate"),
        )
        .axes(Some("Year"), Some("Geography"), Some("{toggle} rate")),
    ]
}

fn adult_charts() -> Vec<ChartDescriptor> {
    vec![
        ChartDescriptor::new(
            "adult_rates_geomap",
            Tab::Adult,
            ADULT_SUPERVISION,
            ChartKind::Choropleth {
                frame: Dimension::Period,
            },
            Dimension::Geography,
            "{toggle} rate by province over time",
        )
        .toggle(
            ToggleBinding::new(Toggle::AdultRate, label(SUPERVISION))
                .value("Incarceration", "Incarceration rates per 100,000 adults")
                .value("Probation", "Probation rates per 100,000 adults"),
        )
        .category_order(GEOGRAPHY_ORDER)
        .axes(None, None, Some("{toggle} rate")),
        ChartDescriptor::new(
            "adult_admissions_trend",
            Tab::Adult,
            ADULT_ADMISSIONS,
            ChartKind::Scatter3d {
                depth: Dimension::Geography,
            },
            Dimension::Year,
            "Trend of Total Custodial and Community Admissions ({start} to {end})",
        )
        .filter(RowFilter::one_of(
            label(ADMISSIONS),
            ["Total custodial admissions", "Total community admissions"],
        ))
        .series(label(ADMISSIONS))
        .series_order(["Total custodial admissions", "Total community admissions"])
        .axes(Some("Year"), Some("Geography"), Some("Admissions")),
        ChartDescriptor::new(
            "adult_age_group",
            Tab::Adult,
            ADULT_BY_AGE,
            ChartKind::Bar {
                mode: BarMode::Stack,
            },
            label(AGE_GROUP),
            "Adult admissions to correctional services by age group, ({start} to {end})",
        )
        .filter(RowFilter::equals(label(CUSTODIAL_ADMISSIONS), TOTAL_CUSTODIAL))
        .filter(RowFilter::none_of(
            label(AGE_GROUP),
            ["Median age on admission"],
        ))
        .series(Dimension::Geography)
        .series_order(GEOGRAPHY_ORDER)
        .category_order([
            "18 to 19 years",
            "20 to 24 years",
            "25 to 29 years",
            "30 to 34 years",
            "35 to 39 years",
            "40 to 44 years",
            "45 to 49 years",
            "50 years and over",
            "Age unknown",
            "Total, custodial admissions by age group",
        ])
        .axes(Some(AGE_GROUP), Some("Admissions"), None)
        .annotate_selection(),
        ChartDescriptor::new(
            "adult_custodial_status",
            Tab::Adult,
            ADULT_BY_AGE,
            ChartKind::Pie,
            label(CUSTODIAL_ADMISSIONS),
            "Custodial admissions by status ({start} to {end})",
        )
        .filter(RowFilter::one_of(
            label(CUSTODIAL_ADMISSIONS),
            ["Sentenced", "Remand", "Other custodial statuses"],
        ))
        .filter(RowFilter::none_of(
            label(AGE_GROUP),
            [
                "Total, custodial admissions by age group",
                "Median age on admission",
            ],
        ))
        .category_order(["Sentenced", "Remand", "Other custodial statuses"])
        .annotate_selection(),
        ChartDescriptor::new(
            "adult_sex_heatmap",
            Tab::Adult,
            ADULT_BY_SEX,
            ChartKind::Heatmap {
                rows: Dimension::Geography,
            },
            Dimension::Period,
            "{toggle} Adult custody admissions",
        )
        .filter(RowFilter::equals(label(CUSTODIAL_ADMISSIONS), TOTAL_CUSTODIAL))
        .toggle(
            ToggleBinding::new(Toggle::AdultSex, label("Sex"))
                .value("Male", "Male")
                .value("Female", "Female"),
        )
        .row_order(GEOGRAPHY_ORDER)
        .axes(Some("Year"), Some("Geography"), Some("Admissions")),
        ChartDescriptor::new(
            "adult_indigenous_share",
            Tab::Adult,
            ADULT_BY_IDENTITY,
            ChartKind::ShareBar,
            Dimension::Geography,
            "Indigenous vs Non-Indigenous Adult custody admissions ({start}-{end})",
        )
        .filter(RowFilter::equals(label(CUSTODIAL_ADMISSIONS), TOTAL_CUSTODIAL))
        .filter(RowFilter::one_of(
            label("Indigenous identity"),
            ["Indigenous identity", "Non-Indigenous identity"],
        ))
        .series(label("Indigenous identity"))
        .series_label("Indigenous identity", "% Indigenous identity")
        .series_label("Non-Indigenous identity", "% Non-Indigenous identity")
        .series_order(["% Indigenous identity", "% Non-Indigenous identity"])
        .category_order(GEOGRAPHY_ORDER)
        .axes(None, Some("% of admissions"), None),
        ChartDescriptor::new(
            "adult_sentence_length_by_sex",
            Tab::Adult,
            ADULT_SENTENCE_LENGTH,
            ChartKind::Bar {
                mode: BarMode::Group,
            },
            label("Sentence length ordered"),
            "Adult sentenced custody admissions by sex and sentence length ordered ({start}-{end})",
        )
        .filter(RowFilter::not_equals(
            label("Sentence length ordered"),
            "Total, sentence length ordered",
        ))
        .series(label("Sex"))
        .series_label("Total, custodial admission by sex", "Total")
        .series_order(["Male", "Female", "Total"])
        .category_order([
            "Less than 1 month",
            "1 month to less than 6 months",
            "6 months to less than 12 months",
            "12 months to less than 24 months",
            "24 months and over",
            "Unknown sentence length",
        ])
        .axes(None, Some("Number of admissions"), None)
        .annotate_selection(),
    ]
}
