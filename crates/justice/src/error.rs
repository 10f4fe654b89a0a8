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
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Dataset error: {0}")]
    Data(#[from] DataError),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] SerialisationError),
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Dataset '{key}' not found at '{}': {source}", path.display())]
    NotFound {
        key: DatasetKey,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Dataset '{key}' is missing expected columns: {}", missing.join(", "))]
    Format { key: DatasetKey, missing: Vec<String> },
    #[error("Failed to read dataset '{key}': {source}")]
    Unreadable {
        key: DatasetKey,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Column '{column}' of dataset '{key}' could not be converted: {source}")]
    BadColumn {
        key: DatasetKey,
        column: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Dataset '{key}' has an unparseable reference period '{value}' at row {row}")]
    BadPeriod {
        key: DatasetKey,
        row: usize,
        value: String,
    },
    #[error("Dataset '{key}' is not part of the configured catalog")]
    UnknownKey { key: DatasetKey },
}

/// Failures isolated to a single chart slot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("No records match the current selection for '{chart}'")]
    EmptySelection { chart: String },
    #[error("Zero total for group '{group}', shares reported as zero")]
    DivisionAmbiguous { group: String },
    #[error("Dataset '{key}' is unavailable: {reason}")]
    DatasetUnavailable { key: DatasetKey, reason: String },
    #[error("Chart '{chart}' is misconfigured: {reason}")]
    InvalidDescriptor { chart: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML configuration: {source}")]
    YamlParse {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Duplicate dataset key: '{key}'")]
    DuplicateDataset { key: String },
    #[error("Missing required configuration: {field}")]
    MissingRequiredConfig { field: String },
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum SerialisationError {
    #[error("JSON serialisation failed: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("CSV export failed: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ChartResult<T> = std::result::Result<T, ChartError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Serialisation(SerialisationError::Json { source: err })
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Serialisation(SerialisationError::Csv { source: err })
    }
}

impl DataError {
    /// Missing sources stop the dashboard; format problems only disable the affected charts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DataError::NotFound { .. } | DataError::Unreadable { .. } | DataError::UnknownKey { .. }
        )
    }
    pub fn key(&self) -> &DatasetKey {
        match self {
            DataError::NotFound { key, .. }
            | DataError::Format { key, .. }
            | DataError::Unreadable { key, .. }
            | DataError::BadColumn { key, .. }
            | DataError::BadPeriod { key, .. }
            | DataError::UnknownKey { key } => key,
        }
    }
}

impl DashboardError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::Data(err) => !err.is_fatal(),
            DashboardError::Chart(_) => true,
            DashboardError::Config(_) | DashboardError::Io(_) => false,
            DashboardError::Serialisation(_) => true,
        }
    }
    pub fn category(&self) -> &'static str {
        match self {
            DashboardError::Data(_) => "Data",
            DashboardError::Chart(_) => "Chart",
            DashboardError::Config(_) => "Configuration",
            DashboardError::Io(_) => "I/O",
            DashboardError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            DashboardError::Data(DataError::NotFound { .. } | DataError::Unreadable { .. }) => vec![
                "Check the data directory in config/dashboard.yml".to_string(),
                "Set JUSTICE_DATA_DIR to the folder holding the dataset files".to_string(),
            ],
            DashboardError::Data(DataError::Format { .. }) => vec![
                "Re-download the table in its full CSV layout".to_string(),
                "Compare the label columns listed in the configuration with the file header"
                    .to_string(),
            ],
            DashboardError::Chart(ChartError::EmptySelection { .. }) => vec![
                "Widen the year range".to_string(),
                "Select more provinces or territories".to_string(),
            ],
            DashboardError::Config(_) => {
                vec!["Validate config/dashboard.yml against the bundled default".to_string()]
            }
            _ => vec!["Check the error message for specific guidance".to_string()],
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Data(DataError::NotFound { key, .. }) => {
                format!("The dataset '{key}' could not be found. No charts can be shown.")
            }
            DashboardError::Data(DataError::Unreadable { key, .. }) => {
                format!("The dataset '{key}' could not be read. No charts can be shown.")
            }
            DashboardError::Chart(ChartError::EmptySelection { .. }) => {
                "No data for the current selection.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub fn of(error: &DashboardError) -> Self {
        match error {
            DashboardError::Chart(ChartError::EmptySelection { .. })
            | DashboardError::Chart(ChartError::DivisionAmbiguous { .. }) => ErrorSeverity::Info,
            DashboardError::Chart(_) => ErrorSeverity::Warning,
            DashboardError::Data(err) if err.is_fatal() => ErrorSeverity::Critical,
            DashboardError::Data(_) => ErrorSeverity::Error,
            DashboardError::Config(_) => ErrorSeverity::Critical,
            DashboardError::Io(_) | DashboardError::Serialisation(_) => ErrorSeverity::Error,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
    pub fn color_code(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "\x1b[36m",
            ErrorSeverity::Warning => "\x1b[33m",
            ErrorSeverity::Error => "\x1b[31m",
            ErrorSeverity::Critical => "\x1b[35m",
        }
    }
}

pub struct ErrorReporter {
    pub show_suggestions: bool,
    pub colored_output: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
            colored_output: true,
        }
    }
    pub fn plain() -> Self {
        Self {
            show_suggestions: true,
            colored_output: false,
        }
    }
    pub fn report(&self, error: &DashboardError) -> String {
        let severity = ErrorSeverity::of(error);
        let mut output = String::new();
        if self.colored_output {
            output.push_str(severity.color_code());
        }
        output.push_str(&format!(
            "[{}] {}: {}\n",
            severity.as_str(),
            error.category(),
            error
        ));
        if self.colored_output {
            output.push_str("\x1b[0m");
        }
        if self.show_suggestions {
            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                output.push_str("\nSuggestions:\n");
                for suggestion in suggestions {
                    output.push_str(&format!("  • {suggestion}\n"));
                }
            }
        }
        output
    }
    pub fn report_all<'a, I>(&self, errors: I) -> String
    where
        I: IntoIterator<Item = &'a DashboardError>,
    {
        errors
            .into_iter()
            .map(|e| self.report(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
