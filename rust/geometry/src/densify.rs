// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discretization of linear objects into point clouds.
//!
//! A generalized Voronoi diagram of lines is approximated by the ordinary
//! diagram of points placed along them, merged per object.

use nalgebra::Point2;
use rustc_hash::FxHashSet;

use crate::config::Rect;
use crate::error::{Error, Result};
use crate::site::SiteKey;

/// A point, a line string or a set of line strings
#[derive(Debug, Clone, PartialEq)]
pub enum LinearGeometry {
    Point(Point2<f64>),
    LineString(Vec<Point2<f64>>),
    MultiLineString(Vec<Vec<Point2<f64>>>),
}

impl LinearGeometry {
    /// Every coordinate, line strings in order
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Point2<f64>> + '_> {
        match self {
            LinearGeometry::Point(p) => Box::new(std::iter::once(p)),
            LinearGeometry::LineString(line) => Box::new(line.iter()),
            LinearGeometry::MultiLineString(lines) => Box::new(lines.iter().flatten()),
        }
    }
}

/// Insert points along every segment so that none is longer than `density`.
///
/// A segment of length `l` is cut into `ceil(l / density)` equal pieces,
/// repeated consecutive points are dropped. With `move_inside > 0` the first
/// and last point are pulled that far towards their neighbour, so that line
/// strings meeting at an end point no longer share a site.
pub fn densify(
    geometry: &LinearGeometry,
    density: f64,
    move_inside: f64,
) -> Result<LinearGeometry> {
    if !density.is_finite() || density <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "density must be a positive number, got {}",
            density
        )));
    }

    Ok(match geometry {
        LinearGeometry::Point(p) => LinearGeometry::Point(*p),
        LinearGeometry::LineString(line) => {
            LinearGeometry::LineString(densify_line(line, density, move_inside))
        }
        LinearGeometry::MultiLineString(lines) => LinearGeometry::MultiLineString(
            lines
                .iter()
                .map(|line| densify_line(line, density, move_inside))
                .collect(),
        ),
    })
}

fn densify_line(line: &[Point2<f64>], density: f64, move_inside: f64) -> Vec<Point2<f64>> {
    let Some(last) = line.last() else {
        return Vec::new();
    };
    if line.len() == 1 {
        return line.to_vec();
    }

    let mut points = Vec::with_capacity(line.len());
    for pair in line.windows(2) {
        let (o, p) = (pair[0], pair[1]);
        if o == p {
            continue;
        }
        let pieces = ((p - o).norm() / density).ceil() as usize;
        let step = (p - o) / pieces as f64;
        points.extend((0..pieces).map(|i| o + step * i as f64));
    }
    points.push(*last);

    let n = points.len();
    if move_inside > 0.0 && n > 1 {
        let head = (points[1] - points[0]).normalize();
        let tail = (points[n - 2] - points[n - 1]).normalize();
        points[0] += head * move_inside;
        points[n - 1] += tail * move_inside;
    }
    points
}

/// Distinct coordinates of a geometry, in order of first appearance.
pub fn coords_list(geometry: &LinearGeometry) -> Vec<Point2<f64>> {
    let mut seen: FxHashSet<SiteKey> = FxHashSet::default();
    geometry
        .coords()
        .filter(|p| seen.insert(SiteKey::from(*p)))
        .copied()
        .collect()
}

/// Smallest axis-aligned rectangle holding every geometry.
///
/// `None` when there are no coordinates at all. The rectangle may be flat.
pub fn get_bounds(geometries: &[LinearGeometry]) -> Option<Rect> {
    Rect::bounding(geometries.iter().flat_map(|g| g.coords()))
}
