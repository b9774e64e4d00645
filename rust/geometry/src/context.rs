// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-call state of one tessellation.
//!
//! The sweep writes vertices, bisectors, edges and Delaunay triangles into a
//! [`Context`]; the cell assembler then compacts that record and turns it into
//! polygons in place. Nothing here is shared between calls, the edge counter
//! included.

use nalgebra::Point2;

use crate::cells::PolygonMap;
use crate::site::Site;
use crate::sweep::{Bisector, SiteList};

/// An edge of the diagram: a piece of bisector `line` between two vertices.
///
/// A missing end extends to infinity along the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    pub line: usize,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Context {
    /// Record Delaunay triples instead of the Voronoi edges
    pub triangulate: bool,
    pub vertices: Vec<Point2<f64>>,
    pub bisectors: Vec<Bisector>,
    pub edges: Vec<EdgeRecord>,
    pub triangles: Vec<[usize; 3]>,
    pub polygons: PolygonMap,
    next_edge_id: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that collects Delaunay triangles.
    pub fn triangulating() -> Self {
        Self {
            triangulate: true,
            ..Self::default()
        }
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        let triangulate = self.triangulate;
        *self = Self {
            triangulate,
            ..Self::default()
        };
    }

    /// Create the bisector of two sites and return its index.
    pub(crate) fn out_bisector(&mut self, s1: &Site, s2: &Site) -> usize {
        let bisector = Bisector::between(s1, s2, &mut self.next_edge_id);
        debug_assert_eq!(bisector.edgenum, self.bisectors.len());
        self.bisectors.push(bisector);
        self.bisectors.len() - 1
    }

    pub(crate) fn out_vertex(&mut self, vertex: &Site) {
        debug_assert_eq!(vertex.sitenum, self.vertices.len());
        self.vertices.push(vertex.to_point());
    }

    pub(crate) fn out_triple(&mut self, s1: usize, s2: usize, s3: usize) {
        if self.triangulate {
            self.triangles.push([s1, s2, s3]);
        }
    }

    pub(crate) fn out_edge(&mut self, edge: usize) {
        if self.triangulate {
            return;
        }
        let bisector = &self.bisectors[edge];
        self.edges.push(EdgeRecord {
            line: bisector.edgenum,
            start: bisector.ep[0],
            end: bisector.ep[1],
        });
    }

    /// Move vertices and lines back by the offset the sites were shifted by,
    /// then restore the sites themselves.
    pub fn translate(&mut self, sites: &mut SiteList) {
        let (dx, dy) = sites.translation();
        if dx != 0.0 || dy != 0.0 {
            for vertex in &mut self.vertices {
                vertex.x += dx;
                vertex.y += dy;
            }
            for bisector in &mut self.bisectors {
                bisector.translate(dx, dy);
            }
        }
        sites.restore_origin();
    }
}
