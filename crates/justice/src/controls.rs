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

use crate::config::DashboardConfig;
use crate::dataset::DatasetCatalog;
use crate::selection::{GeoSelection, RateKind, SelectionState, Sex, Tab, Theme, YearRange};
use serde::Serialize;
use std::collections::BTreeSet;

pub const SLIDER_MARK_STEP: usize = 5;

/// Choices offered by the control panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlOptions {
    pub geographies: Vec<String>,
    pub years: Vec<i32>,
}

impl ControlOptions {
    pub fn from_catalog(catalog: &DatasetCatalog, config: &DashboardConfig) -> Self {
        Self {
            geographies: catalog.geography_options(&config.geography_source, &config.rollups()),
            years: catalog.year_options(&config.geography_source),
        }
    }
    pub fn year_bounds(&self) -> Option<YearRange> {
        let first = self.years.first()?;
        let last = self.years.last()?;
        Some(YearRange::new(*first, *last))
    }
    /// Labelled ticks every five years from the first year.
    pub fn slider_marks(&self) -> Vec<i32> {
        self.years
            .iter()
            .step_by(SLIDER_MARK_STEP)
            .copied()
            .collect()
    }
}

/// Holds the current snapshot and turns widget events into new ones.
///
/// Every setter returns the new snapshot when the value actually changed and `None` otherwise,
/// so callers only notify the dispatcher on real changes.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    options: ControlOptions,
    selection: SelectionState,
}

impl ControlPanel {
    pub fn new(options: ControlOptions, selection: SelectionState) -> Self {
        Self { options, selection }
    }
    pub fn options(&self) -> &ControlOptions {
        &self.options
    }
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }
    fn apply(&mut self, next: SelectionState) -> Option<SelectionState> {
        if next == self.selection {
            return None;
        }
        self.selection = next.clone();
        Some(next)
    }
    /// Bounds are reordered and clamped to the available years.
    pub fn set_years(&mut self, a: i32, b: i32) -> Option<SelectionState> {
        let mut range = YearRange::new(a, b);
        if let Some(bounds) = self.options.year_bounds() {
            range = range.clamp_to(bounds);
        }
        let next = self.selection.with_years(range);
        self.apply(next)
    }
    pub fn select_all(&mut self) -> Option<SelectionState> {
        let next = self.selection.with_geographies(GeoSelection::All);
        self.apply(next)
    }
    /// Replaces the checklist; an empty set is refused and leaves the selection unchanged.
    pub fn set_geographies<I, S>(&mut self, names: I) -> Option<SelectionState>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let geographies = GeoSelection::only(names)?;
        let next = self.selection.with_geographies(geographies);
        self.apply(next)
    }
    /// Checks or unchecks one geography. Unchecking the last one is refused.
    pub fn toggle_geography(&mut self, name: &str, checked: bool) -> Option<SelectionState> {
        let mut set: BTreeSet<String> = match &self.selection.geographies {
            GeoSelection::All => self.options.geographies.iter().cloned().collect(),
            GeoSelection::Only(set) => set.clone(),
        };
        if checked {
            if self.selection.geographies.is_all() {
                return None;
            }
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
        self.set_geographies(set)
    }
    pub fn set_youth_rate(&mut self, rate: RateKind) -> Option<SelectionState> {
        let next = self.selection.with_youth_rate(rate);
        self.apply(next)
    }
    pub fn set_adult_rate(&mut self, rate: RateKind) -> Option<SelectionState> {
        let next = self.selection.with_adult_rate(rate);
        self.apply(next)
    }
    pub fn set_adult_sex(&mut self, sex: Sex) -> Option<SelectionState> {
        let next = self.selection.with_adult_sex(sex);
        self.apply(next)
    }
    pub fn set_tab(&mut self, tab: Tab) -> Option<SelectionState> {
        let next = self.selection.with_tab(Some(tab));
        self.apply(next)
    }
    pub fn set_theme(&mut self, theme: Theme) -> Option<SelectionState> {
        let next = self.selection.with_theme(theme);
        self.apply(next)
    }
}
