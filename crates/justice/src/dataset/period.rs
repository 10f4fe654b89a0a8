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

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn period_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d{4})(?:\s*(/|-)\s*(\d{1,4}))?\s*$").expect("period pattern is valid")
    })
}

/// `REF_DATE` of a record: a calendar year, a fiscal year (`1997/1998`) or a month (`2019-03`).
///
/// `year` is the reference year used for range filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferencePeriod {
    pub year: i32,
    pub end_year: Option<i32>,
    pub month: Option<u8>,
}

impl ReferencePeriod {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            end_year: None,
            month: None,
        }
    }
    pub fn fiscal(start: i32, end: i32) -> Self {
        Self {
            year: start,
            end_year: Some(end),
            month: None,
        }
    }
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = period_pattern().captures(raw)?;
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let Some(separator) = caps.get(2) else {
            return Some(Self::year(year));
        };
        let tail = caps.get(3)?.as_str();
        match separator.as_str() {
            "/" if tail.len() == 4 => Some(Self::fiscal(year, tail.parse().ok()?)),
            "-" if tail.len() <= 2 => {
                let month: u8 = tail.parse().ok()?;
                (1..=12).contains(&month).then_some(Self {
                    year,
                    end_year: None,
                    month: Some(month),
                })
            }
            _ => None,
        }
    }
    pub fn last_year(&self) -> i32 {
        self.end_year.unwrap_or(self.year)
    }
}

impl fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.end_year, self.month) {
            (Some(end), _) => write!(f, "{}/{}", self.year, end),
            (None, Some(month)) => write!(f, "{}-{:02}", self.year, month),
            (None, None) => write!(f, "{}", self.year),
        }
    }
}
