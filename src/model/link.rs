// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowstate-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowstate and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Canvas rendering of a transition. Links reference node ids, never names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_port: String,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, slot: usize) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_port: format!("out{slot}"),
            points: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }

    /// Output slot encoded in the trailing digits of `sourcePort` (`"out2"` is slot 2).
    pub fn slot_index(&self) -> Option<usize> {
        let digits = self
            .source_port
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .len();
        self.source_port[digits..].parse().ok()
    }

    /// Same link with every point snapped to integer coordinates.
    pub fn rounded(mut self) -> Self {
        for point in &mut self.points {
            *point = point.rounded();
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn rounded(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }
}

/// `Some` when `value` is a whole number that fits an `i64` exactly.
pub(crate) fn as_whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then_some(value as i64)
}

/// Canvas coordinates are written as integers when they are whole, so documents keep `"x": 100`
/// instead of `"x": 100.0` across a load/save cycle.
pub(crate) fn serialize_coord<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match as_whole(*value) {
        Some(whole) => serializer.serialize_i64(whole),
        None => serializer.serialize_f64(*value),
    }
}
