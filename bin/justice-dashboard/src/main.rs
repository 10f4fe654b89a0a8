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

mod app;
mod export;
mod plot;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use justice::{DashboardConfig, RateKind, Sex, Tab, Theme};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "justice-dashboard",
    about = "Justice in Motion: Canadian correctional services statistics"
)]
struct Cli {
    /// YAML configuration; the bundled one when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Folder holding the dataset files; overrides the configuration and JUSTICE_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Desktop dashboard.
    Ui,
    /// Render one tab for a selection and write HTML, Plotly JSON and CSV tables.
    Export {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_parser = parse_enum::<Tab>)]
        tab: Option<Tab>,
        #[arg(long)]
        from: Option<i32>,
        #[arg(long)]
        to: Option<i32>,
        /// Repeat for several; omit for the configured default.
        #[arg(long = "geo")]
        geographies: Vec<String>,
        #[arg(long, value_parser = parse_enum::<Theme>)]
        theme: Option<Theme>,
        #[arg(long, value_parser = parse_enum::<RateKind>)]
        youth_rate: Option<RateKind>,
        #[arg(long, value_parser = parse_enum::<RateKind>)]
        adult_rate: Option<RateKind>,
        #[arg(long, value_parser = parse_enum::<Sex>)]
        sex: Option<Sex>,
    },
    /// Print the geography and year choices of the control panel.
    Options,
}

/// Accepts the snake_case names used in the configuration file.
fn parse_enum<T: DeserializeOwned>(raw: &str) -> std::result::Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unrecognised value '{raw}'"))
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DashboardConfig::builtin().context("loading the bundled configuration")?,
    };
    let config = config.with_env_overrides();
    Ok(match &cli.data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    match cli.cmd.clone().unwrap_or(Command::Ui) {
        Command::Ui => app::run(config),
        Command::Export {
            out,
            tab,
            from,
            to,
            geographies,
            theme,
            youth_rate,
            adult_rate,
            sex,
        } => export::run_export(
            config,
            &export::ExportRequest {
                out,
                tab,
                from,
                to,
                geographies,
                theme,
                youth_rate,
                adult_rate,
                sex,
            },
        ),
        Command::Options => export::print_options(config),
    }
}
