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

use justice::selection::SelectionField;
use justice::{
    ControlOptions, ControlPanel, GeoSelection, RateKind, SelectionState, Sex, Tab, Theme,
    YearRange,
};
use std::collections::BTreeSet;

fn panel() -> ControlPanel {
    let options = ControlOptions {
        geographies: vec![
            "Alberta".to_string(),
            "Manitoba".to_string(),
            "Ontario".to_string(),
        ],
        years: (1997..=2022).collect(),
    };
    let selection = SelectionState::new(YearRange::new(1997, 2022), GeoSelection::All);
    ControlPanel::new(options, selection)
}

#[test]
fn test_unchanged_values_emit_nothing() {
    let mut panel = panel();
    assert!(panel.select_all().is_none());
    assert!(panel.set_tab(Tab::Youth).is_none());
    assert!(panel.set_theme(Theme::Bootstrap).is_none());
    assert!(panel.set_years(1997, 2022).is_none());
}

#[test]
fn test_years_are_ordered_and_clamped() {
    let mut panel = panel();
    let next = panel.set_years(2030, 1999).expect("changed");
    assert_eq!(next.years, YearRange::new(1999, 2022));
    assert_eq!(panel.selection().years, next.years);
}

#[test]
fn test_geography_checklist() {
    let mut panel = panel();
    assert!(panel.toggle_geography("Ontario", true).is_none());

    let next = panel.toggle_geography("Ontario", false).expect("changed");
    assert_eq!(
        next.geographies,
        GeoSelection::only(["Alberta", "Manitoba"]).expect("non-empty")
    );
    panel.toggle_geography("Alberta", false).expect("changed");
    assert!(panel.toggle_geography("Manitoba", false).is_none());
    assert!(panel.set_geographies(Vec::<String>::new()).is_none());
    assert_eq!(
        panel.selection().geographies,
        GeoSelection::only(["Manitoba"]).expect("non-empty")
    );

    let next = panel.select_all().expect("changed");
    assert!(next.geographies.is_all());
}

#[test]
fn test_radio_toggles_change_one_field() {
    let mut panel = panel();
    let before = panel.selection().clone();
    let next = panel.set_adult_sex(Sex::Female).expect("changed");
    assert_eq!(
        before.changed_fields(&next),
        BTreeSet::from([SelectionField::AdultSex])
    );
    let next = panel.set_youth_rate(RateKind::Probation).expect("changed");
    assert_eq!(next.adult_sex, Sex::Female);
    assert_eq!(next.youth_rate, RateKind::Probation);
    assert!(panel.set_adult_rate(RateKind::Incarceration).is_none());
}

#[test]
fn test_slider_marks_every_five_years() {
    let options = ControlOptions {
        geographies: Vec::new(),
        years: (1997..=2022).collect(),
    };
    assert_eq!(options.year_bounds(), Some(YearRange::new(1997, 2022)));
    assert_eq!(options.slider_marks(), vec![1997, 2002, 2007, 2012, 2017, 2022]);
    assert_eq!(ControlOptions::default().year_bounds(), None);
}
