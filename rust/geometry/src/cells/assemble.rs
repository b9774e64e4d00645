// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turning edge records into one boundary per site.

use nalgebra::{Point2, Vector2};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::{CellBoundary, PolygonMap};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::site::{quantize, TOLERANCE};
use crate::sweep::SiteList;

/// One end of an edge: a vertex, or the direction of an unbounded end
#[derive(Debug, Clone, Copy)]
enum End {
    Vertex(Point2<f64>),
    Ray(Vector2<f64>),
}

type PointKey = (i64, i64);

fn point_key(p: &Point2<f64>) -> PointKey {
    (quantize(p.x, 9), quantize(p.y, 9))
}

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Edges bounding one site, deduplicated, plus the sites across them
#[derive(Default)]
struct Boundary {
    segments: Vec<(End, End)>,
    seen: FxHashSet<(usize, Option<usize>, Option<usize>)>,
    opposites: SmallVec<[usize; 8]>,
}

impl Context {
    /// Assemble the boundary of every site from the edge records.
    ///
    /// Run after [`Context::compact`]; `sites` must be back in the caller's
    /// coordinates. Cells come out counter-clockwise around their site.
    /// A cell whose boundary is two or more parallel lines, and so has no
    /// vertex at all, cannot be represented and is an error.
    pub fn find_polygons(&mut self, sites: &SiteList) -> Result<&PolygonMap> {
        let mut boundaries: FxHashMap<usize, Boundary> = FxHashMap::default();
        let mut order: Vec<usize> = Vec::new();

        for edge in &self.edges {
            let line = &self.bisectors[edge.line];
            let direction = Vector2::new(line.b, -line.a);
            let to_end = |index: Option<usize>| match index {
                Some(v) => End::Vertex(self.vertices[v]),
                None => End::Ray(direction),
            };
            let segment = (to_end(edge.start), to_end(edge.end));
            let identity = (edge.line, edge.start, edge.end);

            for (site, other) in [(line.reg[0], line.reg[1]), (line.reg[1], line.reg[0])] {
                let boundary = boundaries.entry(site).or_insert_with(|| {
                    order.push(site);
                    Boundary::default()
                });
                if boundary.seen.insert(identity) {
                    boundary.segments.push(segment);
                }
                if !boundary.opposites.contains(&other) {
                    boundary.opposites.push(other);
                }
            }
        }

        let mut polygons = PolygonMap::new();
        for sitenum in order {
            let site = sites.get(sitenum).to_point();
            let boundary = &boundaries[&sitenum];
            let cell = assemble(&site, boundary, sites)?;
            polygons.insert(site, cell);
        }

        tracing::debug!(cells = polygons.len(), "Assembled cells");
        self.polygons = polygons;
        Ok(&self.polygons)
    }
}

fn unsupported(site: &Point2<f64>, reason: String) -> Error {
    Error::UnsupportedCell {
        x: site.x,
        y: site.y,
        reason,
    }
}

fn assemble(site: &Point2<f64>, boundary: &Boundary, sites: &SiteList) -> Result<CellBoundary> {
    let mut finite: Vec<Point2<f64>> = Vec::new();
    let mut keys: FxHashSet<PointKey> = FxHashSet::default();
    for (a, b) in &boundary.segments {
        for end in [a, b] {
            if let End::Vertex(p) = end {
                if keys.insert(point_key(p)) {
                    finite.push(*p);
                }
            }
        }
    }

    // Each ray starts at the other end of its segment
    let mut rays: Vec<(End, Vector2<f64>)> = Vec::new();
    for (a, b) in &boundary.segments {
        if let End::Ray(d) = a {
            rays.push((*b, *d));
        }
    }
    for (a, b) in &boundary.segments {
        if let End::Ray(d) = b {
            rays.push((*a, *d));
        }
    }

    let angle = |p: &Point2<f64>| (p.y - site.y).atan2(p.x - site.x);
    finite.sort_by(|p, q| angle(p).total_cmp(&angle(q)));

    if finite.is_empty() {
        return single_line(site, boundary, &rays, sites);
    }
    if finite.len() == 1 {
        return simple_angle(site, finite[0], &rays);
    }
    if rays.is_empty() {
        let mut ring = finite;
        ring.push(ring[0]);
        return Ok(CellBoundary::Closed(dedup_consecutive(ring)));
    }
    open_polygon(site, finite, &rays)
}

/// A cell bounded by a single line: the half-plane on the site's side.
fn single_line(
    site: &Point2<f64>,
    boundary: &Boundary,
    rays: &[(End, Vector2<f64>)],
    sites: &SiteList,
) -> Result<CellBoundary> {
    if boundary.opposites.len() != 1 {
        return Err(unsupported(
            site,
            format!(
                "strip between {} parallel lines has no vertex",
                boundary.opposites.len()
            ),
        ));
    }
    let opposite = sites.get(boundary.opposites[0]).to_point();
    let midpoint = Point2::from((opposite.coords + site.coords) * 0.5);
    let mut incoming = rays
        .first()
        .map(|(_, d)| *d)
        .ok_or_else(|| unsupported(site, "boundary line has no direction".into()))?;

    // Travelling in along `incoming` reversed and out along its opposite
    // keeps the site on the left
    if cross(&-incoming, &(site - midpoint)) < 0.0 {
        incoming = -incoming;
    }

    Ok(CellBoundary::Open {
        incoming,
        path: vec![midpoint],
        outgoing: -incoming,
    })
}

/// A cell with one vertex and two rays.
///
/// Ray signs are fixed from cross products against the site-to-vertex
/// direction, so `incoming, vertex, outgoing` runs counter-clockwise around
/// the site. A one-vertex cell is convex, which keeps this true for obtuse
/// and nearly straight angles too.
fn simple_angle(
    site: &Point2<f64>,
    vertex: Point2<f64>,
    rays: &[(End, Vector2<f64>)],
) -> Result<CellBoundary> {
    if rays.len() < 2 {
        return Err(unsupported(
            site,
            format!("angle at ({}, {}) has {} rays", vertex.x, vertex.y, rays.len()),
        ));
    }
    let mut first = rays[0].1;
    let mut last = rays[1].1;
    let to_vertex = vertex - site;

    if cross(&first, &to_vertex) < 0.0 {
        first = -first;
    }
    if cross(&last, &to_vertex) > 0.0 {
        last = -last;
    }
    if cross(&last, &first) < 0.0 {
        (first, last) = (-last, -first);
    }

    Ok(CellBoundary::Open {
        incoming: first,
        path: vec![vertex],
        outgoing: last,
    })
}

fn open_polygon(
    site: &Point2<f64>,
    finite: Vec<Point2<f64>>,
    rays: &[(End, Vector2<f64>)],
) -> Result<CellBoundary> {
    let mut starts: SmallVec<[(PointKey, Vector2<f64>); 2]> = SmallVec::new();
    for (start, direction) in rays {
        if let End::Vertex(p) = start {
            let key = point_key(p);
            if !starts.iter().any(|(k, _)| *k == key) {
                starts.push((key, *direction));
            }
        }
    }
    if starts.len() != 2 {
        return Err(unsupported(
            site,
            format!("open cell has {} ray origins, expected 2", starts.len()),
        ));
    }
    let direction_at = |p: &Point2<f64>| {
        let key = point_key(p);
        starts.iter().find(|(k, _)| *k == key).map(|(_, d)| *d)
    };

    let mut indices: SmallVec<[usize; 2]> = SmallVec::new();
    for (key, _) in &starts {
        match finite.iter().position(|p| point_key(p) == *key) {
            Some(i) => indices.push(i),
            None => return Err(unsupported(site, "ray origin is not a vertex".into())),
        }
    }
    indices.sort_unstable();
    let (i1, i2) = (indices[0], indices[1]);

    // Rotate so the unbounded gap falls between the last and first point
    let mut path = finite;
    if (i1, i2) != (0, path.len() - 1) {
        path.rotate_left(i2);
    }
    while path.len() > 1 && path.last().and_then(direction_at).is_none() {
        path.pop();
    }

    let (mut incoming, mut outgoing) = match (
        path.first().and_then(direction_at),
        path.last().and_then(direction_at),
    ) {
        (Some(a), Some(b)) if path.len() > 1 => (a, b),
        _ => return Err(unsupported(site, "cannot locate entry and exit rays".into())),
    };

    if cross(&(path[0] - site), &(path[1] - site)) < 0.0 {
        path.reverse();
        std::mem::swap(&mut incoming, &mut outgoing);
    }
    if cross(&incoming, &(path[0] - site)) < 0.0 {
        incoming = -incoming;
    }
    let last = path.len() - 1;
    if cross(&outgoing, &(path[last] - site)) > 0.0 {
        outgoing = -outgoing;
    }

    Ok(CellBoundary::Open {
        incoming,
        path: dedup_consecutive(path),
        outgoing,
    })
}

/// Drop points equal (within tolerance) to their predecessor.
pub(crate) fn dedup_consecutive(mut points: Vec<Point2<f64>>) -> Vec<Point2<f64>> {
    points.dedup_by(|b, a| (b.x - a.x).abs() <= TOLERANCE && (b.y - a.y).abs() <= TOLERANCE);
    points
}
