// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Front-ends: Voronoi diagrams, Delaunay triangulations and the
//! generalized diagram of linear objects.

use nalgebra::Point2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cells::{CellBoundary, PolygonMap};
use crate::config::{ClipRegion, Rect, VoronoiConfig};
use crate::context::{Context, EdgeRecord};
use crate::densify::{coords_list, densify, LinearGeometry};
use crate::error::{Error, Result};
use crate::site::{quantize, Site};
use crate::sweep::{voronoi, Bisector, SiteList};

/// Highest number of decimals used to recognize repeated lines
const LINE_KEY_DECIMALS: u32 = 9;

/// The line `a*x + b*y = c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl From<&Bisector> for LineEquation {
    fn from(bisector: &Bisector) -> Self {
        Self {
            a: bisector.a,
            b: bisector.b,
            c: bisector.c,
        }
    }
}

/// A Voronoi diagram in the caller's coordinates
#[derive(Debug, Clone)]
pub struct VoronoiDiagram {
    pub vertices: Vec<Point2<f64>>,
    /// Distinct bisector lines; edges refer to them by index
    pub lines: Vec<LineEquation>,
    pub edges: Vec<EdgeRecord>,
    /// One cell per site, or per merged equivalence class
    pub polygons: PolygonMap,
    /// The rectangle open cells were closed against
    pub clip: Option<Rect>,
    /// Site standing for each non-empty equivalence class, in order
    pub representatives: Vec<Point2<f64>>,
}

/// Voronoi diagram of `points`.
///
/// Exact duplicates are dropped with a warning. Vertices closer than
/// [`VoronoiConfig::zero_length`] are merged. With a clip region every cell
/// is closed and cut to the rectangle, and the equivalence classes are
/// merged; without one unbounded cells stay open. Cells lying wholly outside
/// an explicit rectangle are dropped.
pub fn compute_voronoi_diagram(
    points: &[Point2<f64>],
    config: &VoronoiConfig,
) -> Result<VoronoiDiagram> {
    config.validate()?;

    let mut sites = SiteList::new(points)?;
    if sites.duplicates() > 0 {
        tracing::warn!(repeated = sites.duplicates(), "Dropped repeated points");
    }

    let mut context = Context::new();
    voronoi(&mut sites, &mut context)?;
    context.compact(config.zero_length());
    context.find_polygons(&sites)?;

    let clip = match config.region() {
        Some(ClipRegion::Rect(rect)) => Some(rect),
        Some(ClipRegion::Margin(margin)) => Some(auto_clip(&context, &sites, margin)?),
        None => None,
    };

    let mut representatives = Vec::new();
    if let Some(rect) = &clip {
        context.clip_polygons(rect);
        representatives = context.combine_polygons(&config.equivalence)?;
    }

    let (lines, edges) = distinct_lines(&context, config.ndigits.min(LINE_KEY_DECIMALS));
    tracing::debug!(
        vertices = context.vertices.len(),
        lines = lines.len(),
        edges = edges.len(),
        cells = context.polygons.len(),
        "Voronoi diagram complete"
    );

    Ok(VoronoiDiagram {
        vertices: context.vertices,
        lines,
        edges,
        polygons: context.polygons,
        clip,
        representatives,
    })
}

/// Bounding box of every vertex and every site, grown by `margin`.
fn auto_clip(context: &Context, sites: &SiteList, margin: f64) -> Result<Rect> {
    let site_points: Vec<Point2<f64>> = sites.sites().iter().map(Site::to_point).collect();
    let bounds = Rect::bounding(context.vertices.iter().chain(&site_points))
        .ok_or(Error::EmptyInput)?
        .expand(margin);

    if context.polygons.is_empty() {
        // Nothing will be clipped; a flat box is harmless
        return Ok(bounds);
    }
    Rect::new(bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax)
}

/// Lines with repeated equations collapsed, and the edges renumbered to match.
fn distinct_lines(context: &Context, decimals: u32) -> (Vec<LineEquation>, Vec<EdgeRecord>) {
    let decimals = decimals as i32;
    let mut index: FxHashMap<(i64, i64, i64), usize> = FxHashMap::default();
    let mut lines: Vec<LineEquation> = Vec::new();

    let remap: Vec<usize> = context
        .bisectors
        .iter()
        .map(|bisector| {
            let key = (
                quantize(bisector.a, decimals),
                quantize(bisector.b, decimals),
                quantize(bisector.c, decimals),
            );
            *index.entry(key).or_insert_with(|| {
                lines.push(LineEquation::from(bisector));
                lines.len() - 1
            })
        })
        .collect();

    let mut seen: FxHashSet<EdgeRecord> = FxHashSet::default();
    let edges = context
        .edges
        .iter()
        .map(|edge| EdgeRecord {
            line: remap[edge.line],
            ..*edge
        })
        .filter(|edge| seen.insert(*edge))
        .collect();

    (lines, edges)
}

/// Delaunay triangles of `points`, as triples of indices into `points`.
pub fn compute_delaunay_triangulation(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    let mut sites = SiteList::new(points)?;
    let mut context = Context::triangulating();
    voronoi(&mut sites, &mut context)?;

    let triangles: Vec<[usize; 3]> = context
        .triangles
        .iter()
        .map(|t| t.map(|sitenum| sites.source_index(sitenum)))
        .collect();
    tracing::debug!(triangles = triangles.len(), "Delaunay triangulation complete");
    Ok(triangles)
}

/// Approximate Voronoi diagram of linear objects
#[derive(Debug, Clone)]
pub struct GeneralizedVoronoiDiagram {
    /// Diagram of the densified objects, one merged cell per object
    pub diagram: VoronoiDiagram,
    pub objects: Vec<LinearGeometry>,
}

impl GeneralizedVoronoiDiagram {
    /// Site the cell of object `index` is keyed by
    pub fn representative(&self, index: usize) -> Option<Point2<f64>> {
        self.diagram.representatives.get(index).copied()
    }

    /// Cell of object `index`
    pub fn cell(&self, index: usize) -> Option<&CellBoundary> {
        self.diagram.polygons.get(&self.representative(index)?)
    }
}

/// Voronoi diagram of points spaced at most `density` apart along every
/// object, each object's points merged into one cell.
pub fn compute_generalized_voronoi_diagram(
    objects: &[LinearGeometry],
    density: f64,
    clip: ClipRegion,
) -> Result<GeneralizedVoronoiDiagram> {
    let densified = objects
        .iter()
        .map(|object| densify(object, density, 0.0))
        .collect::<Result<Vec<_>>>()?;
    let equivalence: Vec<Vec<Point2<f64>>> = densified.iter().map(coords_list).collect();
    let points: Vec<Point2<f64>> = equivalence.iter().flatten().copied().collect();
    tracing::debug!(
        objects = objects.len(),
        points = points.len(),
        "Densified linear objects"
    );

    let config = VoronoiConfig::new()
        .with_region(clip)
        .with_equivalence(equivalence);
    let diagram = compute_voronoi_diagram(&points, &config)?;

    Ok(GeneralizedVoronoiDiagram {
        diagram,
        objects: objects.to_vec(),
    })
}
