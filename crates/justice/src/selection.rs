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

//! Control values as immutable snapshots.
//!
//! Every user interaction produces a new [`SelectionState`]; the dispatcher diffs consecutive
//! snapshots field by field with [`SelectionState::changed_fields`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

pub const ALL_GEOGRAPHIES_LABEL: &str = "All provinces and territories";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Bounds are reordered so that `start <= end` always holds.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }
    pub fn start(&self) -> i32 {
        self.start
    }
    pub fn end(&self) -> i32 {
        self.end
    }
    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
    pub fn clamp_to(&self, bounds: YearRange) -> Self {
        Self::new(
            self.start.clamp(bounds.start, bounds.end),
            self.end.clamp(bounds.start, bounds.end),
        )
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Non-empty geography selection. `All` stands for every province and territory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoSelection {
    All,
    Only(BTreeSet<String>),
}

impl GeoSelection {
    /// `None` when `names` is empty.
    pub fn only<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        (!set.is_empty()).then_some(GeoSelection::Only(set))
    }
    pub fn is_all(&self) -> bool {
        matches!(self, GeoSelection::All)
    }
    pub fn contains(&self, geo: &str) -> bool {
        match self {
            GeoSelection::All => true,
            GeoSelection::Only(set) => set.contains(geo),
        }
    }
    /// Membership test used by the filters; rollups only matter for `All`.
    pub fn admits(&self, geo: &str, rollups: &Rollups) -> bool {
        match self {
            GeoSelection::All => !rollups.contains(geo),
            GeoSelection::Only(set) => set.contains(geo),
        }
    }
    pub fn label(&self) -> String {
        match self {
            GeoSelection::All => ALL_GEOGRAPHIES_LABEL.to_string(),
            GeoSelection::Only(set) => set.iter().cloned().collect::<Vec<_>>().join(","),
        }
    }
}

/// Geography labels that already aggregate other rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollups(HashSet<String>);

impl Rollups {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }
    pub fn contains(&self, geo: &str) -> bool {
        self.0.contains(geo)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    Incarceration,
    Probation,
}

impl RateKind {
    pub const ALL: [RateKind; 2] = [RateKind::Incarceration, RateKind::Probation];
    pub fn label(&self) -> &'static str {
        match self {
            RateKind::Incarceration => "Incarceration",
            RateKind::Probation => "Probation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Youth,
    Adult,
    Misc,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Youth, Tab::Adult, Tab::Misc];
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Youth => "Youth",
            Tab::Adult => "Adult",
            Tab::Misc => "Misc",
        }
    }
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Youth => "youth",
            Tab::Adult => "adult",
            Tab::Misc => "misc",
        }
    }
}

/// Body background, body text and colorway per theme, in declaration order.
const PALETTES: [(u32, u32, [u32; 5]); 26] = [
    (0xffffff, 0x212529, [0x0d6efd, 0x198754, 0x0dcaf0, 0xffc107, 0xdc3545]), // bootstrap
    (0xffffff, 0x495057, [0x2fa4e7, 0x73a839, 0x033c73, 0xdd5600, 0xc71c22]), // cerulean
    (0xffffff, 0x373a3c, [0x2780e3, 0x3fb618, 0x9954bb, 0xff7518, 0xff0039]), // cosmo
    (0x060606, 0xadafae, [0x2a9fd6, 0x77b300, 0x9933cc, 0xff8800, 0xcc0000]), // cyborg
    (0x222222, 0xffffff, [0x375a7f, 0x00bc8c, 0x3498db, 0xf39c12, 0xe74c3c]), // darkly
    (0xffffff, 0x212529, [0x2c3e50, 0x18bc9c, 0x3498db, 0xf39c12, 0xe74c3c]), // flatly
    (0xffffff, 0x222222, [0xeb6864, 0x22b24c, 0x336699, 0xf5e625, 0xf57a00]), // journal
    (0xffffff, 0x343a40, [0x4582ec, 0x02b875, 0x17a2b8, 0xf0ad4e, 0xd9534f]), // litera
    (0xffffff, 0x222222, [0x158cba, 0x28b62c, 0x75caeb, 0xff851b, 0xff4136]), // lumen
    (0xffffff, 0x55595c, [0x1a1a1a, 0x4bbf73, 0x1f9bcf, 0xf0ad4e, 0xd9534f]), // lux
    (0xffffff, 0x444444, [0x2196f3, 0x4caf50, 0x9c27b0, 0xff9800, 0xe51c23]), // materia
    (0xffffff, 0x888888, [0x78c2ad, 0x56cc9d, 0x6cc3d5, 0xffce67, 0xff7851]), // minty
    (0xd9e3f1, 0x7b8ab8, [0x378dfc, 0x43cc29, 0x5b62f4, 0xffc107, 0xe52527]), // morph
    (0xffffff, 0x444444, [0x593196, 0x13b955, 0x009cdc, 0xefa31d, 0xfc3939]), // pulse
    (0x686dc3, 0xffffff, [0xe83283, 0x41d7a7, 0x39cbfb, 0xffc107, 0xfd7e14]), // quartz
    (0xffffff, 0x3e3f3a, [0x325d88, 0x93c54b, 0x29abe0, 0xf47c3c, 0xd9534f]), // sandstone
    (0xfcfcfc, 0x212529, [0xd9230f, 0x469408, 0x029acf, 0x9b479f, 0xd9831f]), // simplex
    (0xffffff, 0x212529, [0x333333, 0x28a745, 0x17a2b8, 0xffc107, 0xdc3545]), // sketchy
    (0x272b30, 0xaaaaaa, [0x3a3f44, 0x62c462, 0x5bc0de, 0xf89406, 0xee5f5b]), // slate
    (0x002b36, 0x839496, [0xb58900, 0x2aa198, 0x268bd2, 0xcb4b16, 0xd33682]), // solar
    (0xffffff, 0x777777, [0x446e9b, 0x3cb521, 0x3399f3, 0xd47500, 0xcd0200]), // spacelab
    (0x0f2537, 0xebebeb, [0xdf6919, 0x5cb85c, 0x5bc0de, 0xffc107, 0xd9534f]), // superhero
    (0xffffff, 0x333333, [0xe95420, 0x38b44a, 0x17a2b8, 0xefb73e, 0xdf382c]), // united
    (0x1a0933, 0x32fbe2, [0x6f42c1, 0x3cf281, 0x1ba2f6, 0xffc107, 0xe44c55]), // vapor
    (0xffffff, 0x222222, [0x008cba, 0x43ac6a, 0x5bc0de, 0xe99002, 0xf04124]), // yeti
    (0xffffff, 0x495057, [0x3459e6, 0x2fb380, 0x287bb5, 0xf4bd61, 0xda292e]), // zephyr
];

/// Bootstrap-derived figure templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Bootstrap,
    Cerulean,
    Cosmo,
    Cyborg,
    Darkly,
    Flatly,
    Journal,
    Litera,
    Lumen,
    Lux,
    Materia,
    Minty,
    Morph,
    Pulse,
    Quartz,
    Sandstone,
    Simplex,
    Sketchy,
    Slate,
    Solar,
    Spacelab,
    Superhero,
    United,
    Vapor,
    Yeti,
    Zephyr,
}

impl Theme {
    pub const ALL: [Theme; 26] = [
        Theme::Bootstrap,
        Theme::Cerulean,
        Theme::Cosmo,
        Theme::Cyborg,
        Theme::Darkly,
        Theme::Flatly,
        Theme::Journal,
        Theme::Litera,
        Theme::Lumen,
        Theme::Lux,
        Theme::Materia,
        Theme::Minty,
        Theme::Morph,
        Theme::Pulse,
        Theme::Quartz,
        Theme::Sandstone,
        Theme::Simplex,
        Theme::Sketchy,
        Theme::Slate,
        Theme::Solar,
        Theme::Spacelab,
        Theme::Superhero,
        Theme::United,
        Theme::Vapor,
        Theme::Yeti,
        Theme::Zephyr,
    ];
    /// Plotly template name registered by the dashboard page.
    pub fn template_name(&self) -> &'static str {
        match self {
            Theme::Bootstrap => "bootstrap",
            Theme::Cerulean => "cerulean",
            Theme::Cosmo => "cosmo",
            Theme::Cyborg => "cyborg",
            Theme::Darkly => "darkly",
            Theme::Flatly => "flatly",
            Theme::Journal => "journal",
            Theme::Litera => "litera",
            Theme::Lumen => "lumen",
            Theme::Lux => "lux",
            Theme::Materia => "materia",
            Theme::Minty => "minty",
            Theme::Morph => "morph",
            Theme::Pulse => "pulse",
            Theme::Quartz => "quartz",
            Theme::Sandstone => "sandstone",
            Theme::Simplex => "simplex",
            Theme::Sketchy => "sketchy",
            Theme::Slate => "slate",
            Theme::Solar => "solar",
            Theme::Spacelab => "spacelab",
            Theme::Superhero => "superhero",
            Theme::United => "united",
            Theme::Vapor => "vapor",
            Theme::Yeti => "yeti",
            Theme::Zephyr => "zephyr",
        }
    }
    pub fn is_dark(&self) -> bool {
        matches!(
            self,
            Theme::Cyborg
                | Theme::Darkly
                | Theme::Quartz
                | Theme::Slate
                | Theme::Solar
                | Theme::Superhero
                | Theme::Vapor
        )
    }
    /// Body colours and the primary, success, info, warning and danger swatches.
    pub fn palette(&self) -> ThemePalette {
        let (background, foreground, colorway) = PALETTES[*self as usize];
        ThemePalette {
            background: Rgb::from_hex(background),
            foreground: Rgb::from_hex(foreground),
            colorway: colorway.map(Rgb::from_hex),
            dark: self.is_dark(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
    /// CSS `rgba()` form with the given opacity.
    pub fn with_alpha(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {alpha})", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Colours one theme applies to figures, the exported page and the desktop shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: Rgb,
    pub foreground: Rgb,
    /// Trace colours in cycle order.
    pub colorway: [Rgb; 5],
    pub dark: bool,
}

impl ThemePalette {
    pub fn primary(&self) -> Rgb {
        self.colorway[0]
    }
    pub fn info(&self) -> Rgb {
        self.colorway[2]
    }
    pub fn danger(&self) -> Rgb {
        self.colorway[4]
    }
}

/// One field of [`SelectionState`]; the keys of the dependency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionField {
    Years,
    Geographies,
    YouthRate,
    AdultRate,
    AdultSex,
    ActiveTab,
    Theme,
}

impl SelectionField {
    pub const ALL: [SelectionField; 7] = [
        SelectionField::Years,
        SelectionField::Geographies,
        SelectionField::YouthRate,
        SelectionField::AdultRate,
        SelectionField::AdultSex,
        SelectionField::ActiveTab,
        SelectionField::Theme,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub years: YearRange,
    pub geographies: GeoSelection,
    pub youth_rate: RateKind,
    pub adult_rate: RateKind,
    pub adult_sex: Sex,
    pub active_tab: Option<Tab>,
    pub theme: Theme,
}

impl SelectionState {
    pub fn new(years: YearRange, geographies: GeoSelection) -> Self {
        Self {
            years,
            geographies,
            youth_rate: RateKind::Incarceration,
            adult_rate: RateKind::Incarceration,
            adult_sex: Sex::Male,
            active_tab: Some(Tab::Youth),
            theme: Theme::Bootstrap,
        }
    }
    pub fn with_years(&self, years: YearRange) -> Self {
        Self {
            years,
            ..self.clone()
        }
    }
    pub fn with_geographies(&self, geographies: GeoSelection) -> Self {
        Self {
            geographies,
            ..self.clone()
        }
    }
    pub fn with_youth_rate(&self, youth_rate: RateKind) -> Self {
        Self {
            youth_rate,
            ..self.clone()
        }
    }
    pub fn with_adult_rate(&self, adult_rate: RateKind) -> Self {
        Self {
            adult_rate,
            ..self.clone()
        }
    }
    pub fn with_adult_sex(&self, adult_sex: Sex) -> Self {
        Self {
            adult_sex,
            ..self.clone()
        }
    }
    pub fn with_tab(&self, active_tab: Option<Tab>) -> Self {
        Self {
            active_tab,
            ..self.clone()
        }
    }
    pub fn with_theme(&self, theme: Theme) -> Self {
        Self {
            theme,
            ..self.clone()
        }
    }
    pub fn changed_fields(&self, next: &SelectionState) -> BTreeSet<SelectionField> {
        let mut changed = BTreeSet::new();
        if self.years != next.years {
            changed.insert(SelectionField::Years);
        }
        if self.geographies != next.geographies {
            changed.insert(SelectionField::Geographies);
        }
        if self.youth_rate != next.youth_rate {
            changed.insert(SelectionField::YouthRate);
        }
        if self.adult_rate != next.adult_rate {
            changed.insert(SelectionField::AdultRate);
        }
        if self.adult_sex != next.adult_sex {
            changed.insert(SelectionField::AdultSex);
        }
        if self.active_tab != next.active_tab {
            changed.insert(SelectionField::ActiveTab);
        }
        if self.theme != next.theme {
            changed.insert(SelectionField::Theme);
        }
        changed
    }
}
