// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closing unbounded cells against a rectangle.

use nalgebra::{Point2, Vector2};

use super::assemble::dedup_consecutive;
use super::CellBoundary;
use crate::bool2d::{close_ring, compute_signed_area};
use crate::config::Rect;
use crate::context::Context;
use crate::site::TOLERANCE;

/// Side of the clip rectangle a ray leaves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    Bottom,
    Right,
    Top,
    Left,
}

/// Where the ray from `base` along `direction` leaves `rect`.
///
/// The ray is intersected with the horizontal and the vertical border it
/// points at; the nearer hit wins, the horizontal one on a tie.
pub fn clip_ray(
    rect: &Rect,
    base: &Point2<f64>,
    direction: &Vector2<f64>,
) -> (Point2<f64>, Border) {
    let (dx, dy) = (direction.x, direction.y);

    let (p_y, horizontal, y) = if dy > 0.0 {
        ((rect.ymax - base.y) / dy, Border::Top, rect.ymax)
    } else if dy < 0.0 {
        ((rect.ymin - base.y) / dy, Border::Bottom, rect.ymin)
    } else {
        (f64::INFINITY, Border::Top, rect.ymax)
    };

    let (p_x, vertical, x) = if dx > 0.0 {
        ((rect.xmax - base.x) / dx, Border::Right, rect.xmax)
    } else if dx < 0.0 {
        ((rect.xmin - base.x) / dx, Border::Left, rect.xmin)
    } else {
        (f64::INFINITY, Border::Right, rect.xmax)
    };

    if p_x < p_y {
        (Point2::new(x, base.y + p_x * dy), vertical)
    } else {
        (Point2::new(base.x + p_y * dx, y), horizontal)
    }
}

/// Distance from the lower-left corner, counter-clockwise along the border
fn perimeter_position(rect: &Rect, p: &Point2<f64>, border: Border) -> f64 {
    let (w, h) = (rect.width(), rect.height());
    let t = match border {
        Border::Bottom => p.x - rect.xmin,
        Border::Right => w + (p.y - rect.ymin),
        Border::Top => w + h + (rect.xmax - p.x),
        Border::Left => 2.0 * w + h + (rect.ymax - p.y),
    };
    t.rem_euclid(2.0 * (w + h))
}

/// Corners passed walking counter-clockwise from `from` to `to`.
fn corners_between(rect: &Rect, from: f64, to: f64) -> Vec<Point2<f64>> {
    let (w, h) = (rect.width(), rect.height());
    let perimeter = 2.0 * (w + h);
    let corners = [
        (w, Point2::new(rect.xmax, rect.ymin)),
        (w + h, Point2::new(rect.xmax, rect.ymax)),
        (2.0 * w + h, Point2::new(rect.xmin, rect.ymax)),
        (perimeter, Point2::new(rect.xmin, rect.ymin)),
    ];
    let to = if to < from { to + perimeter } else { to };

    (0..8)
        .map(|k| {
            let (t, corner) = corners[k % 4];
            (t + (k / 4) as f64 * perimeter, corner)
        })
        .filter(|(t, _)| *t > from && *t < to)
        .map(|(_, corner)| corner)
        .collect()
}

/// Close an open boundary into a counter-clockwise ring inside `rect`.
pub(crate) fn close_boundary(
    rect: &Rect,
    incoming: &Vector2<f64>,
    path: &[Point2<f64>],
    outgoing: &Vector2<f64>,
) -> Vec<Point2<f64>> {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return Vec::new();
    };
    let (entry, entry_border) = clip_ray(rect, first, incoming);
    let (exit, exit_border) = clip_ray(rect, last, outgoing);

    let mut ring = Vec::with_capacity(path.len() + 7);
    ring.push(entry);
    ring.extend_from_slice(path);
    ring.push(exit);
    ring.extend(corners_between(
        rect,
        perimeter_position(rect, &exit, exit_border),
        perimeter_position(rect, &entry, entry_border),
    ));
    ring.push(entry);
    dedup_consecutive(ring)
}

/// Part of a convex ring inside `rect`, or `None` when nothing is left.
///
/// Sutherland-Hodgman against the four borders in turn. Crossing points are
/// snapped onto the border they cross.
pub(crate) fn clip_convex_ring(ring: &[Point2<f64>], rect: &Rect) -> Option<Vec<Point2<f64>>> {
    let mut points = ring.to_vec();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let borders = [
        (Vector2::new(0.0, -1.0), -rect.ymin),
        (Vector2::new(1.0, 0.0), rect.xmax),
        (Vector2::new(0.0, 1.0), rect.ymax),
        (Vector2::new(-1.0, 0.0), -rect.xmin),
    ];
    for (normal, offset) in borders {
        if points.is_empty() {
            return None;
        }
        let distance = |p: &Point2<f64>| normal.dot(&p.coords) - offset;
        let mut kept = Vec::with_capacity(points.len() + 2);
        for (i, current) in points.iter().enumerate() {
            let next = &points[(i + 1) % points.len()];
            let (dc, dn) = (distance(current), distance(next));
            if dc <= 0.0 {
                kept.push(*current);
            }
            if (dc <= 0.0) != (dn <= 0.0) {
                let mut crossing = current + (next - current) * (dc / (dc - dn));
                if normal.x != 0.0 {
                    crossing.x = normal.x * offset;
                } else {
                    crossing.y = normal.y * offset;
                }
                kept.push(crossing);
            }
        }
        points = kept;
    }

    let mut ring = dedup_consecutive(points);
    while ring.len() > 1
        && ring
            .first()
            .zip(ring.last())
            .is_some_and(|(a, b)| (a - b).norm() <= TOLERANCE)
    {
        ring.pop();
    }
    if ring.len() < 3 || compute_signed_area(&ring) <= 0.0 {
        return None;
    }
    Some(close_ring(ring))
}

/// Rectangle holding `clip` and every finite point of an open cell
fn enclosing_frame(clip: &Rect, path: &[Point2<f64>]) -> Rect {
    let corners = [
        Point2::new(clip.xmin, clip.ymin),
        Point2::new(clip.xmax, clip.ymax),
    ];
    match Rect::bounding(corners.iter().chain(path)) {
        Some(frame) => frame.expand(clip.width().max(clip.height())),
        None => *clip,
    }
}

impl Context {
    /// Close every cell inside `clip`.
    ///
    /// Open cells have their rays cut at the rectangle. Cells reaching past
    /// it, closed ones included, are cut down to the part inside. A cell
    /// with nothing inside the rectangle is removed.
    pub fn clip_polygons(&mut self, clip: &Rect) {
        // Ray ends land on the border up to rounding
        let slack = clip.expand(TOLERANCE * clip.width().max(clip.height()).max(1.0));
        let (mut closed, mut cut) = (0, 0);
        let mut outside = Vec::new();
        for cell in self.polygons.iter_mut() {
            let ring = match &cell.boundary {
                CellBoundary::Open {
                    incoming,
                    path,
                    outgoing,
                } => {
                    closed += 1;
                    if path.iter().all(|p| slack.contains(p)) {
                        close_boundary(clip, incoming, path, outgoing)
                    } else {
                        let frame = enclosing_frame(clip, path);
                        close_boundary(&frame, incoming, path, outgoing)
                    }
                }
                CellBoundary::Closed(ring) => ring.clone(),
            };

            if ring.iter().all(|p| slack.contains(p)) {
                cell.boundary = CellBoundary::Closed(ring);
                continue;
            }
            cut += 1;
            match clip_convex_ring(&ring, clip) {
                Some(inside) => cell.boundary = CellBoundary::Closed(inside),
                None => outside.push(cell.site),
            }
        }

        if !outside.is_empty() {
            let cells = outside.len();
            tracing::warn!(cells, ?clip, "Dropped cells outside the clip rectangle");
        }
        for site in &outside {
            self.polygons.remove(site);
        }
        tracing::debug!(closed, cut, ?clip, "Clipped cells");
    }
}
