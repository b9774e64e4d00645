// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON output of the commands.

use flooding_geometry::{Cell, CellBoundary, EdgeRecord, LineEquation, Point2, Rect, Vector2};
use flooding_grid::AscHeader;
use serde::Serialize;

fn xy(p: &Point2<f64>) -> [f64; 2] {
    [p.x, p.y]
}

fn direction(v: &Vector2<f64>) -> [f64; 2] {
    [v.x, v.y]
}

/// A bisector `a*x + b*y = c`.
#[derive(Debug, Clone, Serialize)]
pub struct LineData {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl From<&LineEquation> for LineData {
    fn from(line: &LineEquation) -> Self {
        Self {
            a: line.a,
            b: line.b,
            c: line.c,
        }
    }
}

/// An edge between two vertex indices; `null` ends run to infinity.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeData {
    pub line: usize,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl From<&EdgeRecord> for EdgeData {
    fn from(edge: &EdgeRecord) -> Self {
        Self {
            line: edge.line,
            start: edge.start,
            end: edge.end,
        }
    }
}

/// Cell of one site.
#[derive(Debug, Clone, Serialize)]
pub struct CellData {
    pub site: [f64; 2],
    pub closed: bool,
    /// The closed ring, or the finite part of an open boundary.
    pub points: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<[f64; 2]>,
}

impl From<&Cell> for CellData {
    fn from(cell: &Cell) -> Self {
        let (incoming, outgoing) = match &cell.boundary {
            CellBoundary::Closed(_) => (None, None),
            CellBoundary::Open {
                incoming, outgoing, ..
            } => (Some(direction(incoming)), Some(direction(outgoing))),
        };
        Self {
            site: xy(&cell.site),
            closed: cell.boundary.is_closed(),
            points: cell.boundary.points().iter().map(xy).collect(),
            incoming,
            outgoing,
        }
    }
}

/// Output of `voronoi`.
#[derive(Debug, Clone, Serialize)]
pub struct VoronoiOutput {
    pub vertices: Vec<[f64; 2]>,
    pub lines: Vec<LineData>,
    pub edges: Vec<EdgeData>,
    pub cells: Vec<CellData>,
    /// `[xmin, ymin, xmax, ymax]` of the clip rectangle, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<[f64; 4]>,
}

impl From<&flooding_geometry::VoronoiDiagram> for VoronoiOutput {
    fn from(diagram: &flooding_geometry::VoronoiDiagram) -> Self {
        Self {
            vertices: diagram.vertices.iter().map(xy).collect(),
            lines: diagram.lines.iter().map(LineData::from).collect(),
            edges: diagram.edges.iter().map(EdgeData::from).collect(),
            cells: diagram.polygons.sorted().into_iter().map(CellData::from).collect(),
            clip: diagram.clip.as_ref().map(rect),
        }
    }
}

fn rect(r: &Rect) -> [f64; 4] {
    [r.xmin, r.ymin, r.xmax, r.ymax]
}

/// Output of `delaunay`.
#[derive(Debug, Clone, Serialize)]
pub struct DelaunayOutput {
    /// Indices into the input points.
    pub triangles: Vec<[usize; 3]>,
}

/// Cell of one linear object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectCellData {
    pub object: usize,
    pub representative: [f64; 2],
    pub ring: Vec<[f64; 2]>,
}

/// Output of `generalized`.
#[derive(Debug, Clone, Serialize)]
pub struct GeneralizedOutput {
    pub clip: Option<[f64; 4]>,
    pub cells: Vec<ObjectCellData>,
}

impl From<&flooding_geometry::GeneralizedVoronoiDiagram> for GeneralizedOutput {
    fn from(result: &flooding_geometry::GeneralizedVoronoiDiagram) -> Self {
        let cells = (0..result.objects.len())
            .filter_map(|object| {
                let representative = result.representative(object)?;
                let boundary = result.cell(object)?;
                Some(ObjectCellData {
                    object,
                    representative: xy(&representative),
                    ring: boundary.points().iter().map(xy).collect(),
                })
            })
            .collect();
        Self {
            clip: result.diagram.clip.as_ref().map(rect),
            cells,
        }
    }
}

/// Summary of one FLS frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameData {
    pub timestamp: f64,
    /// Cells with a depth above zero.
    pub wet_cells: usize,
    pub wet_area: f64,
    pub max_depth: Option<f64>,
}

/// Output of `fls`.
#[derive(Debug, Clone, Serialize)]
pub struct FlsOutput {
    pub grid: AscHeader,
    pub geo_transform: [f64; 6],
    pub frames: Vec<FrameData>,
}
