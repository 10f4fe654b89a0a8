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

use crate::charts::ChartSpec;
use crate::error::SerialisationError;
use crate::selection::Theme;
use std::fmt::Write as _;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
pub const PAGE_TITLE: &str = "Justice in Motion - A Visualization of Canadian Criminal Cases";

/// Standalone page with one Plotly `div` per chart.
pub fn document<'a, I>(specs: I, theme: Theme) -> Result<String, SerialisationError>
where
    I: IntoIterator<Item = &'a ChartSpec>,
{
    let palette = theme.palette();
    let (background, foreground, banner) =
        (palette.background, palette.foreground, palette.danger());
    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<script src=\"{PLOTLY_CDN}\"></script>\n\
         <style>body {{ background: {background}; color: {foreground}; \
         font-family: sans-serif; margin: 2rem; }} \
         header {{ background: {banner}; color: #fff; padding: 1rem; text-align: center; \
         font-size: 1.6rem; font-weight: bold; }} .chart {{ margin: 1.5rem 0; }}</style>\n\
         </head>\n<body data-theme=\"{theme}\">\n<header>{title}</header>\n",
        title = escape(PAGE_TITLE),
    );
    let mut count = 0;
    for (i, spec) in specs.into_iter().enumerate() {
        let figure = serde_json::to_string(&spec.to_plotly())?;
        let _ = write!(
            page,
            "<div class=\"chart\" id=\"chart-{i}\" data-chart=\"{id}\"></div>\n\
             <script>(function() {{ var fig = {figure}; \
             Plotly.newPlot('chart-{i}', fig.data, fig.layout).then(function(gd) {{ \
             if (fig.frames) {{ Plotly.addFrames(gd, fig.frames); }} }}); }})();</script>\n",
            id = escape(spec.id.as_str()),
            figure = figure.replace("</", "<\\/"),
        );
        count += 1;
    }
    if count == 0 {
        page.push_str("<p>No charts for this tab.</p>\n");
    }
    page.push_str("</body>\n</html>\n");
    Ok(page)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
