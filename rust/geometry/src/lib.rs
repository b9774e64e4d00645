// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flooding Geometry
//!
//! Voronoi tessellation of flood-scenario points using Fortune's sweepline,
//! with cell assembly, clipping and merging of equivalent cells.
//!
//! ## Quick start
//!
//! ```
//! use flooding_geometry::{compute_voronoi_diagram, Point2, VoronoiConfig};
//!
//! let points = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(0.0, 2.0),
//!     Point2::new(2.0, 2.0),
//!     Point2::new(2.0, 0.0),
//! ];
//! let diagram = compute_voronoi_diagram(&points, &VoronoiConfig::new().with_margin(1.0))?;
//! assert_eq!(diagram.polygons.len(), 4);
//! # Ok::<(), flooding_geometry::Error>(())
//! ```
//!
//! Lower-level passes are available on [`Context`] for callers that want to
//! inspect the raw sweep output.

pub mod bool2d;
pub mod cells;
pub mod config;
pub mod context;
pub mod densify;
pub mod diagram;
pub mod error;
pub mod point_like;
pub mod site;
pub mod sweep;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use cells::{clip_ray, Border, Cell, CellBoundary, PolygonMap};
pub use config::{ClipRegion, Rect, VoronoiConfig, DEFAULT_NDIGITS};
pub use context::{Context, EdgeRecord};
pub use densify::{coords_list, densify, get_bounds, LinearGeometry};
pub use diagram::{
    compute_delaunay_triangulation, compute_generalized_voronoi_diagram,
    compute_voronoi_diagram, GeneralizedVoronoiDiagram, LineEquation, VoronoiDiagram,
};
pub use error::{Error, Result};
pub use point_like::{resolve_points, PointLike};
pub use site::{Site, SiteKey, TOLERANCE};
pub use sweep::{voronoi, SiteList};
