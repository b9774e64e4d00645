// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D ring operations for merging Voronoi cells.
//!
//! Rings are closed point lists (last point repeats the first) as produced
//! by clipping. The union goes through the i_overlay crate; everything else
//! is plain shoelace arithmetic.

use crate::error::{Error, Result};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum area threshold - rings smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
///
/// A repeated closing point contributes nothing, so open and closed
/// contours give the same result.
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let n = contour.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    contour.len() >= 3 && compute_signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Repeat the first point at the end unless it is already there.
pub fn close_ring(mut contour: Vec<Point2<f64>>) -> Vec<Point2<f64>> {
    if let (Some(first), Some(last)) = (contour.first().copied(), contour.last()) {
        if first != *last {
            contour.push(first);
        }
    }
    contour
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Union of two rings, as a closed counter-clockwise ring.
///
/// Disjoint operands produce several shapes; the one with the largest area
/// is kept. Holes are dropped, only the outer boundary is returned.
pub fn union_rings(this: &[Point2<f64>], that: &[Point2<f64>]) -> Result<Vec<Point2<f64>>> {
    if !is_valid_contour(this) || !is_valid_contour(that) {
        return Err(Error::Union("operand ring is degenerate".into()));
    }

    let subject = vec![contour_to_path(&open_ring(this))];
    let clip = vec![contour_to_path(&open_ring(that))];

    // Result is Vec<Vec<Vec<[f64; 2]>>> - Vec of shapes, each shape is Vec of contours
    let shapes = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);

    if shapes.len() > 1 {
        tracing::warn!(shapes = shapes.len(), "Union of disjoint cells, keeping the largest");
    }

    let outer = shapes
        .iter()
        .filter_map(|shape| shape.first())
        .map(|contour| path_to_contour(contour))
        .filter(|contour| is_valid_contour(contour))
        .max_by(|a, b| {
            compute_signed_area(a)
                .abs()
                .total_cmp(&compute_signed_area(b).abs())
        })
        .ok_or_else(|| Error::Union("union produced no shape".into()))?;

    Ok(close_ring(ensure_ccw(&outer)))
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Drop the closing point of a ring, i_overlay wants implicit closure
fn open_ring(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut points = ensure_ccw(contour);
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}
