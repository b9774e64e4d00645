// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merging the cells of equivalent sites.

use nalgebra::Point2;

use super::CellBoundary;
use crate::bool2d::{close_ring, ensure_ccw, is_valid_contour, union_rings};
use crate::context::Context;
use crate::error::{Error, Result};

/// Site standing for a merged class: two thirds of the way from its first
/// to its second member.
pub fn representative(class: &[Point2<f64>]) -> Option<Point2<f64>> {
    match class {
        [] => None,
        [only] => Some(*only),
        [p0, p1, ..] => Some(p0 + (p1 - p0) * (2.0 / 3.0)),
    }
}

/// Union that falls back to whichever operand is still usable.
fn safe_union(this: Vec<Point2<f64>>, that: Vec<Point2<f64>>) -> Result<Vec<Point2<f64>>> {
    match union_rings(&this, &that) {
        Ok(ring) => Ok(ring),
        Err(e) if is_valid_contour(&this) => {
            tracing::warn!(error = %e, "Cell union failed, keeping the left operand");
            Ok(close_ring(ensure_ccw(&this)))
        }
        Err(e) if is_valid_contour(&that) => {
            tracing::warn!(error = %e, "Cell union failed, keeping the right operand");
            Ok(close_ring(ensure_ccw(&that)))
        }
        Err(e) => Err(Error::Union(format!("both operands unusable: {}", e))),
    }
}

impl Context {
    /// Replace the cells of every equivalence class by their union, keyed by
    /// the class [`representative`].
    ///
    /// Run after [`Context::clip_polygons`]. Members without a cell are
    /// skipped; open cells cannot be unioned and stay where they are.
    /// Returns the representative of every non-empty class, in order.
    ///
    /// A representative landing on a site that still has its own cell is an
    /// [`Error::InvalidConfig`].
    pub fn combine_polygons(
        &mut self,
        equivalence: &[Vec<Point2<f64>>],
    ) -> Result<Vec<Point2<f64>>> {
        let mut representatives = Vec::with_capacity(equivalence.len());

        for class in equivalence {
            let Some(site) = representative(class) else {
                continue;
            };
            representatives.push(site);
            if class.len() < 2 {
                continue;
            }

            let mut rings: Vec<Vec<Point2<f64>>> = Vec::with_capacity(class.len());
            for member in class {
                match self.polygons.get(member) {
                    Some(CellBoundary::Closed(_)) => {
                        if let Some(CellBoundary::Closed(ring)) = self.polygons.remove(member) {
                            rings.push(ring);
                        }
                    }
                    Some(CellBoundary::Open { .. }) => {
                        tracing::warn!(x = member.x, y = member.y, "Open cell left out of merge");
                    }
                    None => {
                        tracing::warn!(x = member.x, y = member.y, "Equivalent point has no cell");
                    }
                }
            }

            let mut rings = rings.into_iter().filter(|ring| !ring.is_empty());
            let Some(first) = rings.next() else {
                tracing::warn!(x = site.x, y = site.y, "Nothing to merge for class");
                continue;
            };
            if self.polygons.contains(&site) {
                return Err(Error::InvalidConfig(format!(
                    "merged cell of ({}, {}) would replace the cell of another site",
                    site.x, site.y
                )));
            }
            let union = rings.try_fold(first, safe_union)?;
            self.polygons.insert(site, CellBoundary::Closed(union));
        }

        tracing::debug!(
            classes = equivalence.len(),
            cells = self.polygons.len(),
            "Combined equivalent cells"
        );
        Ok(representatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool2d::compute_signed_area;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64) -> CellBoundary {
        CellBoundary::Closed(vec![
            Point2::new(x - 0.5, y - 0.5),
            Point2::new(x + 0.5, y - 0.5),
            Point2::new(x + 0.5, y + 0.5),
            Point2::new(x - 0.5, y + 0.5),
            Point2::new(x - 0.5, y - 0.5),
        ])
    }

    fn grid_context() -> Context {
        let mut context = Context::new();
        for x in 0..3 {
            for y in 0..2 {
                let (x, y) = (x as f64, y as f64);
                context.polygons.insert(Point2::new(x, y), square(x, y));
            }
        }
        context
    }

    #[test]
    fn test_representative() {
        let class = [Point2::new(0.0, 2.0), Point2::new(0.0, -2.0), Point2::new(9.0, 9.0)];
        let site = representative(&class).unwrap();
        assert_relative_eq!(site.x, 0.0);
        assert_relative_eq!(site.y, -2.0 / 3.0);
        assert_eq!(representative(&class[..1]), Some(class[0]));
        assert_eq!(representative(&[]), None);
    }

    #[test]
    fn test_row_of_cells_merges_into_one() {
        let mut context = grid_context();
        let row = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        let singleton = vec![Point2::new(1.0, 1.0)];

        let representatives = context
            .combine_polygons(&[singleton.clone(), row.clone()])
            .unwrap();

        assert_eq!(representatives[0], singleton[0]);
        assert_relative_eq!(representatives[1].x, 2.0 / 3.0);
        assert_eq!(context.polygons.len(), 6 - 3 + 1);
        for member in &row {
            assert!(!context.polygons.contains(member));
        }

        let merged = context.polygons.get(&representatives[1]).unwrap();
        assert!(merged.is_closed());
        let ring = merged.points();
        assert_eq!(ring.first(), ring.last());
        assert_relative_eq!(compute_signed_area(ring), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_members_are_skipped() {
        let mut context = grid_context();
        let class = vec![Point2::new(0.0, 1.0), Point2::new(7.0, 7.0), Point2::new(1.0, 1.0)];
        let representatives = context.combine_polygons(&[class]).unwrap();

        let merged = context.polygons.get(&representatives[0]).unwrap();
        assert_relative_eq!(compute_signed_area(merged.points()), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_ring_falls_back_to_other_operand() {
        let mut context = Context::new();
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 0.0);
        context.polygons.insert(a, square(0.0, 0.0));
        let sliver = vec![
            Point2::new(3.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(3.0, 0.0),
        ];
        context.polygons.insert(b, CellBoundary::Closed(sliver));

        let representatives = context.combine_polygons(&[vec![a, b]]).unwrap();
        let merged = context.polygons.get(&representatives[0]).unwrap();
        assert_relative_eq!(compute_signed_area(merged.points()), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_two_degenerate_rings_fail() {
        let mut context = Context::new();
        let flat = |x: f64| {
            let ring = vec![Point2::new(x, 0.0), Point2::new(x + 1.0, 0.0), Point2::new(x, 0.0)];
            CellBoundary::Closed(ring)
        };
        let (a, b) = (Point2::new(0.0, 0.0), Point2::new(5.0, 0.0));
        context.polygons.insert(a, flat(0.0));
        context.polygons.insert(b, flat(5.0));
        assert!(matches!(
            context.combine_polygons(&[vec![a, b]]),
            Err(Error::Union(_))
        ));
    }

    #[test]
    fn test_representative_on_another_site_is_rejected() {
        let mut context = Context::new();
        for x in [0.0, 2.0, 3.0] {
            context.polygons.insert(Point2::new(x, 0.0), square(x, 0.0));
        }
        // Two thirds of the way from (0, 0) to (3, 0) is the site (2, 0)
        let class = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)];
        assert!(matches!(
            context.combine_polygons(&[class]),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(context.polygons.get(&Point2::new(2.0, 0.0)), Some(&square(2.0, 0.0)));
    }
}
