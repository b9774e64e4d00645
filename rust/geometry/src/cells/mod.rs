// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Voronoi cells: assembly from the edge soup, clipping and merging.
//!
//! The passes run in this order on a [`Context`](crate::Context):
//! [`compact`](crate::Context::compact),
//! [`find_polygons`](crate::Context::find_polygons), then optionally
//! [`clip_polygons`](crate::Context::clip_polygons) and
//! [`combine_polygons`](crate::Context::combine_polygons).

mod assemble;
mod clipping;
mod compact;
mod merge;

use nalgebra::{Point2, Vector2};
use rustc_hash::FxHashMap;

use crate::site::SiteKey;

pub use clipping::{clip_ray, Border};
pub use merge::representative;

/// The boundary of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellBoundary {
    /// Counter-clockwise ring whose last point repeats the first
    Closed(Vec<Point2<f64>>),
    /// Unbounded cell: comes in from infinity along `incoming`, follows
    /// `path`, leaves along `outgoing`
    Open {
        incoming: Vector2<f64>,
        path: Vec<Point2<f64>>,
        outgoing: Vector2<f64>,
    },
}

impl CellBoundary {
    pub fn is_closed(&self) -> bool {
        matches!(self, CellBoundary::Closed(_))
    }

    /// The finite points of the boundary
    pub fn points(&self) -> &[Point2<f64>] {
        match self {
            CellBoundary::Closed(ring) => ring,
            CellBoundary::Open { path, .. } => path,
        }
    }
}

/// A cell and the site it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub site: Point2<f64>,
    pub boundary: CellBoundary,
}

/// Cells keyed by their site, rounded to five decimals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMap {
    cells: FxHashMap<SiteKey, Cell>,
}

impl PolygonMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, site: &Point2<f64>) -> Option<&CellBoundary> {
        self.cells.get(&SiteKey::from(site)).map(|cell| &cell.boundary)
    }

    pub fn get_mut(&mut self, site: &Point2<f64>) -> Option<&mut CellBoundary> {
        self.cells
            .get_mut(&SiteKey::from(site))
            .map(|cell| &mut cell.boundary)
    }

    pub fn contains(&self, site: &Point2<f64>) -> bool {
        self.cells.contains_key(&SiteKey::from(site))
    }

    /// Add or replace the cell of `site`, returning the previous boundary.
    pub fn insert(&mut self, site: Point2<f64>, boundary: CellBoundary) -> Option<CellBoundary> {
        self.cells
            .insert(SiteKey::from(&site), Cell { site, boundary })
            .map(|cell| cell.boundary)
    }

    pub fn remove(&mut self, site: &Point2<f64>) -> Option<CellBoundary> {
        self.cells.remove(&SiteKey::from(site)).map(|cell| cell.boundary)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.values_mut()
    }

    /// Cells ordered by site (y, then x), for stable output.
    pub fn sorted(&self) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.values().collect();
        cells.sort_by(|a, b| {
            a.site
                .y
                .total_cmp(&b.site.y)
                .then_with(|| a.site.x.total_cmp(&b.site.x))
        });
        cells
    }
}
