// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input point representations accepted at the API boundary.
//!
//! Callers hand in coordinate tuples, named `x`/`y` points or `"x y ..."`
//! strings. Everything is resolved to `Point2<f64>` once, before the sweep
//! sees it; a third coordinate is ignored.

use nalgebra::{Point2, Point3};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// A point in one of the representations callers commonly have at hand
#[derive(Debug, Clone, PartialEq)]
pub enum PointLike {
    /// Two or three coordinates; anything past the second is ignored
    Coordinates(SmallVec<[f64; 3]>),
    /// A point with named fields
    Named { x: f64, y: f64 },
    /// Whitespace separated text, `"x y"` or `"x y z"`
    Encoded(String),
}

impl PointLike {
    /// Resolve to a planar point.
    pub fn resolve(&self) -> Result<Point2<f64>> {
        match self {
            PointLike::Coordinates(coords) => {
                if coords.len() < 2 {
                    return Err(Error::InvalidPoint(format!(
                        "expected at least 2 coordinates, got {}",
                        coords.len()
                    )));
                }
                finite(coords[0], coords[1])
            }
            PointLike::Named { x, y } => finite(*x, *y),
            PointLike::Encoded(text) => {
                let mut fields = text.split_whitespace();
                let x = parse_field(fields.next(), text)?;
                let y = parse_field(fields.next(), text)?;
                finite(x, y)
            }
        }
    }
}

fn parse_field(field: Option<&str>, text: &str) -> Result<f64> {
    let field = field
        .ok_or_else(|| Error::InvalidPoint(format!("'{}' has fewer than 2 fields", text)))?;
    field
        .parse::<f64>()
        .map_err(|e| Error::InvalidPoint(format!("'{}' in '{}': {}", field, text, e)))
}

fn finite(x: f64, y: f64) -> Result<Point2<f64>> {
    if x.is_finite() && y.is_finite() {
        Ok(Point2::new(x, y))
    } else {
        Err(Error::InvalidPoint(format!("non-finite coordinates ({}, {})", x, y)))
    }
}

/// Resolve a batch of points, failing on the first unusable one.
pub fn resolve_points(points: &[PointLike]) -> Result<Vec<Point2<f64>>> {
    points.iter().map(PointLike::resolve).collect()
}

impl From<(f64, f64)> for PointLike {
    fn from((x, y): (f64, f64)) -> Self {
        PointLike::Coordinates(SmallVec::from_slice(&[x, y]))
    }
}

impl From<(f64, f64, f64)> for PointLike {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        PointLike::Coordinates(SmallVec::from_slice(&[x, y, z]))
    }
}

impl From<[f64; 2]> for PointLike {
    fn from(coords: [f64; 2]) -> Self {
        PointLike::Coordinates(SmallVec::from_slice(&coords))
    }
}

impl From<&[f64]> for PointLike {
    fn from(coords: &[f64]) -> Self {
        PointLike::Coordinates(SmallVec::from_slice(coords))
    }
}

impl From<Point2<f64>> for PointLike {
    fn from(p: Point2<f64>) -> Self {
        PointLike::Named { x: p.x, y: p.y }
    }
}

impl From<Point3<f64>> for PointLike {
    fn from(p: Point3<f64>) -> Self {
        PointLike::Named { x: p.x, y: p.y }
    }
}

impl From<&str> for PointLike {
    fn from(text: &str) -> Self {
        PointLike::Encoded(text.to_string())
    }
}

impl From<String> for PointLike {
    fn from(text: String) -> Self {
        PointLike::Encoded(text)
    }
}
