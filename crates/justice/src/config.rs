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

use crate::dataset::DatasetKey;
use crate::error::{ConfigError, ConfigResult};
use crate::selection::{GeoSelection, RateKind, Rollups, SelectionState, Sex, Tab, Theme, YearRange};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "JUSTICE_DATA_DIR";
pub const BUILTIN_CONFIG: &str = include_str!("../config/dashboard.yml");

/// Geography value in `defaults.geographies` that selects every province and territory.
pub const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSource {
    pub key: DatasetKey,
    pub path: PathBuf,
    #[serde(default)]
    pub label_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionDefaults {
    pub years: Option<[i32; 2]>,
    pub geographies: Vec<String>,
    pub tab: Tab,
    pub theme: Theme,
    pub youth_rate: RateKind,
    pub adult_rate: RateKind,
    pub adult_sex: Sex,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            years: None,
            geographies: vec![ALL_SENTINEL.to_string()],
            tab: Tab::Youth,
            theme: Theme::Bootstrap,
            youth_rate: RateKind::Incarceration,
            adult_rate: RateKind::Incarceration,
            adult_sex: Sex::Male,
        }
    }
}

impl SelectionDefaults {
    pub fn geo_selection(&self) -> GeoSelection {
        if self
            .geographies
            .iter()
            .any(|g| g.eq_ignore_ascii_case(ALL_SENTINEL))
        {
            return GeoSelection::All;
        }
        GeoSelection::only(self.geographies.iter().cloned()).unwrap_or(GeoSelection::All)
    }
    /// Initial snapshot; configured years are clamped to what the data covers.
    pub fn to_selection(&self, span: YearRange) -> SelectionState {
        let years = self
            .years
            .map(|[start, end]| YearRange::new(start, end).clamp_to(span))
            .unwrap_or(span);
        SelectionState {
            years,
            geographies: self.geo_selection(),
            youth_rate: self.youth_rate,
            adult_rate: self.adult_rate,
            adult_sex: self.adult_sex,
            active_tab: Some(self.tab),
            theme: self.theme,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub geography_source: DatasetKey,
    #[serde(default)]
    pub rollup_geographies: Vec<String>,
    pub datasets: Vec<DatasetSource>,
    #[serde(default)]
    pub defaults: SelectionDefaults,
}

impl DashboardConfig {
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_yaml_string(BUILTIN_CONFIG)
    }
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::ConfigFile {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        Self::from_yaml_string(&content)
    }
    pub fn from_yaml_string(yaml_content: &str) -> ConfigResult<Self> {
        let config: DashboardConfig = serde_yaml::from_str(yaml_content)?;
        config.validate()?;
        Ok(config)
    }
    /// Applies `JUSTICE_DATA_DIR` when it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => self.with_data_dir(dir.trim()),
            _ => self,
        }
    }
    pub fn with_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.into();
        self
    }
    pub fn validate(&self) -> ConfigResult<()> {
        if self.datasets.is_empty() {
            return Err(ConfigError::MissingRequiredConfig {
                field: "datasets".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for source in &self.datasets {
            if !seen.insert(source.key.clone()) {
                return Err(ConfigError::DuplicateDataset {
                    key: source.key.to_string(),
                });
            }
        }
        if !seen.contains(&self.geography_source) {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "geography_source '{}' is not a configured dataset",
                    self.geography_source
                ),
            });
        }
        if let Some([start, end]) = self.defaults.years {
            if start > end {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("default year range {start}..{end} is inverted"),
                });
            }
        }
        if self.defaults.geographies.iter().all(|g| g.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed {
                reason: "default geographies must name at least one geography or 'all'"
                    .to_string(),
            });
        }
        Ok(())
    }
    pub fn source(&self, key: &DatasetKey) -> Option<&DatasetSource> {
        self.datasets.iter().find(|s| &s.key == key)
    }
    pub fn rollups(&self) -> Rollups {
        Rollups::new(self.rollup_geographies.iter().cloned())
    }
}
