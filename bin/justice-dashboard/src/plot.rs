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

//! Native drawing of chart specs with the egui painter. 3D scatters are flattened to
//! value-over-x and choropleths to a ranked bar strip per frame; the browser view keeps the
//! full Plotly figures.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use justice::charts::{BarSeries, ChartBody, ChartSpec, ChoroplethFrame, PieSlice};
use justice::charts::{BarMode, Scatter3dTrace};
use justice::selection::{Rgb, Theme};

const PLOT_HEIGHT: f32 = 300.0;
const MARGIN_LEFT: f32 = 56.0;
const MARGIN_BOTTOM: f32 = 36.0;

pub fn colour(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Series colours and the value ramp of one theme.
struct Palette {
    colorway: Vec<Color32>,
    low: Color32,
    high: Color32,
    danger: Color32,
}

impl Palette {
    fn of(theme: Theme) -> Self {
        let palette = theme.palette();
        Self {
            colorway: palette.colorway.iter().copied().map(colour).collect(),
            low: colour(palette.info()),
            high: colour(palette.danger()),
            danger: colour(palette.danger()),
        }
    }
    fn series(&self, i: usize) -> Color32 {
        self.colorway[i % self.colorway.len()]
    }
    /// Info to danger ramp for heatmaps and choropleths.
    fn ramp(&self, value: f64, low: f64, high: f64) -> Color32 {
        let t = if high > low {
            ((value - low) / (high - low)).clamp(0.0, 1.0) as f32
        } else {
            0.5
        };
        let lerp = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t) as u8;
        Color32::from_rgb(
            lerp(self.low.r(), self.high.r()),
            lerp(self.low.g(), self.high.g()),
            lerp(self.low.b(), self.high.b()),
        )
    }
}

fn short(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 10_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else if abs >= 100.0 || value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

pub fn chart(ui: &mut egui::Ui, spec: &ChartSpec) {
    let palette = Palette::of(spec.theme);
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.strong(&spec.title);
        if let Some(annotation) = &spec.annotation {
            ui.small(annotation);
        }
        match &spec.body {
            ChartBody::Bar {
                mode,
                categories,
                series,
                percent,
            } => bars(ui, &palette, *mode, categories, series, *percent),
            ChartBody::Pie { slices } => pie(ui, &palette, slices),
            ChartBody::Scatter3d { traces } => scatter(ui, &palette, traces),
            ChartBody::Choropleth { frames, range } => {
                choropleth(ui, &palette, spec.id.as_str(), frames, *range);
            }
            ChartBody::Heatmap { x, y, z } => heatmap(ui, &palette, x, y, z),
            ChartBody::NoData { message } => {
                ui.add_space(8.0);
                ui.weak(message);
                ui.add_space(8.0);
            }
            ChartBody::Failed { message } => {
                ui.add_space(8.0);
                ui.colored_label(palette.danger, message);
                ui.add_space(8.0);
            }
        }
    });
}

fn canvas(ui: &mut egui::Ui, height: f32) -> (egui::Painter, Rect) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), height), Sense::hover());
    let painter = ui.painter_at(rect);
    let plot = Rect::from_min_max(
        Pos2::new(rect.left() + MARGIN_LEFT, rect.top() + 8.0),
        Pos2::new(rect.right() - 8.0, rect.bottom() - MARGIN_BOTTOM),
    );
    (painter, plot)
}

fn axes(painter: &egui::Painter, plot: Rect, top: f64, text: Color32) {
    let stroke = Stroke::new(1.0, text.gamma_multiply(0.5));
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], stroke);
    painter.line_segment([plot.left_bottom(), plot.left_top()], stroke);
    for step in 0..=4 {
        let fraction = step as f32 / 4.0;
        let y = plot.bottom() - plot.height() * fraction;
        painter.line_segment(
            [Pos2::new(plot.left() - 4.0, y), Pos2::new(plot.left(), y)],
            stroke,
        );
        painter.text(
            Pos2::new(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            short(top * f64::from(fraction)),
            FontId::proportional(10.0),
            text,
        );
    }
}

fn legend<'a, I>(ui: &mut egui::Ui, palette: &Palette, names: I)
where
    I: IntoIterator<Item = &'a str>,
{
    ui.horizontal_wrapped(|ui| {
        for (i, name) in names.into_iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, palette.series(i));
            ui.small(name);
        }
    });
}

fn bars(
    ui: &mut egui::Ui,
    palette: &Palette,
    mode: BarMode,
    categories: &[String],
    series: &[BarSeries],
    percent: bool,
) {
    let text = ui.visuals().text_color();
    let (painter, plot) = canvas(ui, PLOT_HEIGHT);
    let stacked = mode == BarMode::Stack;
    let top = if percent && stacked {
        100.0
    } else if stacked {
        (0..categories.len())
            .map(|c| series.iter().map(|s| s.values.get(c).copied().unwrap_or(0.0).max(0.0)).sum::<f64>())
            .fold(0.0, f64::max)
    } else {
        series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    };
    let top = if top > 0.0 { top } else { 1.0 };
    axes(&painter, plot, top, text);
    let slot = plot.width() / categories.len().max(1) as f32;
    let bar_width = slot * 0.7;
    let scale = |v: f64| (v / top) as f32 * plot.height();
    for (c, category) in categories.iter().enumerate() {
        let left = plot.left() + slot * c as f32 + (slot - bar_width) / 2.0;
        let mut base = 0.0_f32;
        for (s, serie) in series.iter().enumerate() {
            let height = scale(serie.values.get(c).copied().unwrap_or(0.0).max(0.0));
            let rect = if stacked {
                let r = Rect::from_min_max(
                    Pos2::new(left, plot.bottom() - base - height),
                    Pos2::new(left + bar_width, plot.bottom() - base),
                );
                base += height;
                r
            } else {
                let width = bar_width / series.len().max(1) as f32;
                let x = left + width * s as f32;
                Rect::from_min_max(
                    Pos2::new(x, plot.bottom() - height),
                    Pos2::new(x + width, plot.bottom()),
                )
            };
            painter.rect_filled(rect, 0.0, palette.series(s));
        }
        painter.text(
            Pos2::new(left + bar_width / 2.0, plot.bottom() + 4.0),
            Align2::CENTER_TOP,
            truncate(category, slot),
            FontId::proportional(10.0),
            text,
        );
    }
    legend(ui, palette, series.iter().map(|s| s.name.as_str()));
}

fn truncate(label: &str, room: f32) -> String {
    let fits = (room / 6.0).max(3.0) as usize;
    if label.chars().count() <= fits {
        label.to_string()
    } else {
        let kept: String = label.chars().take(fits.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn pie(ui: &mut egui::Ui, palette: &Palette, slices: &[PieSlice]) {
    let text = ui.visuals().text_color();
    let (painter, plot) = canvas(ui, PLOT_HEIGHT);
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    let centre = plot.center();
    let radius = plot.height().min(plot.width()) / 2.0 - 4.0;
    if total <= 0.0 {
        painter.text(
            centre,
            Align2::CENTER_CENTER,
            "All values are zero",
            FontId::proportional(12.0),
            text,
        );
        return;
    }
    let mut angle = -std::f32::consts::FRAC_PI_2;
    for (i, slice) in slices.iter().enumerate() {
        let sweep = (slice.value.max(0.0) / total) as f32 * std::f32::consts::TAU;
        let segments = ((sweep / 0.05).ceil() as usize).max(1);
        for k in 0..segments {
            let a0 = angle + sweep * k as f32 / segments as f32;
            let a1 = angle + sweep * (k + 1) as f32 / segments as f32;
            let points = vec![
                centre,
                centre + Vec2::angled(a0) * radius,
                centre + Vec2::angled(a1) * radius,
            ];
            painter.add(egui::Shape::convex_polygon(points, palette.series(i), Stroke::NONE));
        }
        angle += sweep;
    }
    let labels: Vec<String> = slices
        .iter()
        .map(|s| format!("{} ({:.1}%)", s.label, 100.0 * s.value.max(0.0) / total))
        .collect();
    legend(ui, palette, labels.iter().map(String::as_str));
}

fn scatter(ui: &mut egui::Ui, palette: &Palette, traces: &[Scatter3dTrace]) {
    let text = ui.visuals().text_color();
    let (painter, plot) = canvas(ui, PLOT_HEIGHT);
    let mut xs: Vec<&str> = traces
        .iter()
        .flat_map(|t| t.x.iter().map(String::as_str))
        .collect();
    xs.sort_unstable();
    xs.dedup();
    let top = traces
        .iter()
        .flat_map(|t| t.z.iter().copied())
        .fold(0.0, f64::max);
    let top = if top > 0.0 { top } else { 1.0 };
    axes(&painter, plot, top, text);
    let step = plot.width() / xs.len().max(1) as f32;
    for (i, trace) in traces.iter().enumerate() {
        for (x, z) in trace.x.iter().zip(&trace.z) {
            let Ok(at) = xs.binary_search(&x.as_str()) else {
                continue;
            };
            let pos = Pos2::new(
                plot.left() + step * (at as f32 + 0.5),
                plot.bottom() - (z / top) as f32 * plot.height(),
            );
            painter.circle_filled(pos, 3.5, palette.series(i));
        }
    }
    let every = (xs.len() / 8).max(1);
    for (at, x) in xs.iter().enumerate().step_by(every) {
        painter.text(
            Pos2::new(plot.left() + step * (at as f32 + 0.5), plot.bottom() + 4.0),
            Align2::CENTER_TOP,
            *x,
            FontId::proportional(10.0),
            text,
        );
    }
    legend(ui, palette, traces.iter().map(|t| t.name.as_str()));
}

fn choropleth(
    ui: &mut egui::Ui,
    palette: &Palette,
    id: &str,
    frames: &[ChoroplethFrame],
    range: (f64, f64),
) {
    let Some(last) = frames.len().checked_sub(1) else {
        return;
    };
    let key = egui::Id::new(("choropleth-frame", id));
    let mut current = ui.ctx().data_mut(|d| *d.get_temp_mut_or(key, last));
    current = current.min(last);
    ui.horizontal(|ui| {
        ui.label("Period:");
        ui.add(
            egui::Slider::new(&mut current, 0..=last)
                .custom_formatter(|n, _| frames[n as usize].name.clone()),
        );
    });
    ui.ctx().data_mut(|d| d.insert_temp(key, current));
    let frame = &frames[current];
    let mut rows: Vec<(&String, f64)> = frame
        .locations
        .iter()
        .zip(frame.values.iter().copied())
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    let text = ui.visuals().text_color();
    let row_height = 18.0;
    let (painter, plot) = canvas(ui, row_height * rows.len() as f32 + MARGIN_BOTTOM + 8.0);
    let top = if range.1 > 0.0 { range.1 } else { 1.0 };
    let label_room = 150.0;
    for (i, (location, value)) in rows.iter().enumerate() {
        let y = plot.top() + row_height * i as f32;
        painter.text(
            Pos2::new(plot.left() - MARGIN_LEFT + label_room - 6.0, y + row_height / 2.0),
            Align2::RIGHT_CENTER,
            location.as_str(),
            FontId::proportional(10.0),
            text,
        );
        let left = plot.left() - MARGIN_LEFT + label_room;
        let width = (plot.right() - left) * (*value / top) as f32;
        painter.rect_filled(
            Rect::from_min_size(
                Pos2::new(left, y + 2.0),
                Vec2::new(width.max(1.0), row_height - 4.0),
            ),
            0.0,
            palette.ramp(*value, range.0, range.1),
        );
        painter.text(
            Pos2::new(left + width + 4.0, y + row_height / 2.0),
            Align2::LEFT_CENTER,
            short(*value),
            FontId::proportional(10.0),
            text,
        );
    }
}

fn heatmap(
    ui: &mut egui::Ui,
    palette: &Palette,
    x: &[String],
    y: &[String],
    z: &[Vec<Option<f64>>],
) {
    let text = ui.visuals().text_color();
    let row_height = 18.0;
    let (painter, plot) = canvas(ui, row_height * y.len() as f32 + MARGIN_BOTTOM + 8.0);
    let values = z.iter().flatten().flatten().copied();
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let label_room = 150.0;
    let left = plot.left() - MARGIN_LEFT + label_room;
    let cell_width = (plot.right() - left) / x.len().max(1) as f32;
    for (r, row_label) in y.iter().enumerate() {
        let top = plot.top() + row_height * r as f32;
        painter.text(
            Pos2::new(left - 6.0, top + row_height / 2.0),
            Align2::RIGHT_CENTER,
            row_label.as_str(),
            FontId::proportional(10.0),
            text,
        );
        for c in 0..x.len() {
            let cell = Rect::from_min_size(
                Pos2::new(left + cell_width * c as f32, top),
                Vec2::new(cell_width - 1.0, row_height - 1.0),
            );
            match z.get(r).and_then(|row| row.get(c)).copied().flatten() {
                Some(value) => {
                    painter.rect_filled(cell, 0.0, palette.ramp(value, low, high));
                    if cell_width > 28.0 {
                        painter.text(
                            cell.center(),
                            Align2::CENTER_CENTER,
                            short(value),
                            FontId::proportional(9.0),
                            Color32::WHITE,
                        );
                    }
                }
                None => {
                    painter.rect_filled(cell, 0.0, text.gamma_multiply(0.08));
                }
            }
        }
    }
    let every = ((x.len() as f32 * 40.0 / (plot.right() - left)).ceil() as usize).max(1);
    for (c, label) in x.iter().enumerate().step_by(every) {
        painter.text(
            Pos2::new(
                left + cell_width * (c as f32 + 0.5),
                plot.top() + row_height * y.len() as f32 + 4.0,
            ),
            Align2::CENTER_TOP,
            label.as_str(),
            FontId::proportional(10.0),
            text,
        );
    }
}
