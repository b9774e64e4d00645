// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use nalgebra::Point2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::{Context, EdgeRecord};

/// Grid cell of a vertex at resolution `zero_length`; exact bits when zero.
fn vertex_key(p: &Point2<f64>, zero_length: f64) -> (i64, i64) {
    if zero_length > 0.0 {
        (
            (p.x / zero_length).round() as i64,
            (p.y / zero_length).round() as i64,
        )
    } else {
        ((p.x + 0.0).to_bits() as i64, (p.y + 0.0).to_bits() as i64)
    }
}

impl Context {
    /// Drop zero-length edges, merge coincident vertices and discard the
    /// vertices and lines no edge refers to any more.
    ///
    /// Indices are renumbered densely, preserving order. Edges that became
    /// identical are kept once.
    pub fn compact(&mut self, zero_length: f64) {
        let before = (self.vertices.len(), self.bisectors.len(), self.edges.len());

        let vertices = &self.vertices;
        self.edges.retain(|edge| match (edge.start, edge.end) {
            (Some(a), Some(b)) => (vertices[a] - vertices[b]).norm() > zero_length,
            _ => true,
        });

        // First occurrence of every vertex position wins
        let mut first: FxHashMap<(i64, i64), usize> = FxHashMap::default();
        let canonical: Vec<usize> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, p)| *first.entry(vertex_key(p, zero_length)).or_insert(i))
            .collect();

        let mut used_vertices = vec![false; self.vertices.len()];
        let mut used_lines = vec![false; self.bisectors.len()];
        for edge in &mut self.edges {
            edge.start = edge.start.map(|v| canonical[v]);
            edge.end = edge.end.map(|v| canonical[v]);
            for v in [edge.start, edge.end].into_iter().flatten() {
                used_vertices[v] = true;
            }
            used_lines[edge.line] = true;
        }

        let vertex_index = renumber(&used_vertices);
        let line_index = renumber(&used_lines);

        let mut kept = 0;
        self.vertices.retain(|_| {
            kept += 1;
            used_vertices[kept - 1]
        });
        let mut kept = 0;
        self.bisectors.retain(|_| {
            kept += 1;
            used_lines[kept - 1]
        });
        for (i, bisector) in self.bisectors.iter_mut().enumerate() {
            bisector.edgenum = i;
        }

        let mut seen: FxHashSet<EdgeRecord> = FxHashSet::default();
        let edges = std::mem::take(&mut self.edges);
        for edge in edges {
            let edge = EdgeRecord {
                line: line_index[edge.line],
                start: edge.start.map(|v| vertex_index[v]),
                end: edge.end.map(|v| vertex_index[v]),
            };
            if seen.insert(edge) {
                self.edges.push(edge);
            }
        }

        tracing::debug!(
            vertices = ?(before.0, self.vertices.len()),
            lines = ?(before.1, self.bisectors.len()),
            edges = ?(before.2, self.edges.len()),
            "Compacted diagram"
        );
    }
}

/// New index of every surviving slot; unused slots map to `usize::MAX`.
fn renumber(used: &[bool]) -> Vec<usize> {
    let mut next = 0;
    used.iter()
        .map(|&u| {
            if u {
                next += 1;
                next - 1
            } else {
                usize::MAX
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;

    fn context() -> Context {
        let mut context = Context::new();
        let s = [
            Site::numbered(0.0, 0.0, 0),
            Site::numbered(2.0, 0.0, 1),
            Site::numbered(0.0, 2.0, 2),
        ];
        for (a, b) in [(0, 1), (0, 2), (1, 2), (0, 1)] {
            context.out_bisector(&s[a], &s[b]);
        }
        context.vertices = vec![
            Point2::new(1.0, 1.0),
            Point2::new(5.0, 5.0),
            Point2::new(1.0 + 1e-7, 1.0),
            Point2::new(3.0, 3.0),
        ];
        context
    }

    #[test]
    fn test_zero_length_edges_are_removed() {
        let mut context = context();
        context.edges = vec![
            EdgeRecord { line: 0, start: Some(0), end: Some(2) },
            EdgeRecord { line: 1, start: Some(0), end: None },
        ];
        context.compact(1e-5);
        assert_eq!(context.edges.len(), 1);
        assert_eq!(context.vertices, vec![Point2::new(1.0, 1.0)]);
        assert_eq!(context.bisectors.len(), 1);
        assert_eq!(
            context.edges[0],
            EdgeRecord { line: 0, start: Some(0), end: None }
        );
    }

    #[test]
    fn test_coincident_vertices_merge_and_indices_shift() {
        let mut context = context();
        context.edges = vec![
            EdgeRecord { line: 2, start: Some(2), end: Some(3) },
            EdgeRecord { line: 1, start: None, end: Some(0) },
            EdgeRecord { line: 3, start: Some(3), end: Some(0) },
        ];
        context.compact(1e-5);

        // Vertex 1 is unused and vertex 2 folds into vertex 0
        assert_eq!(
            context.vertices,
            vec![Point2::new(1.0, 1.0), Point2::new(3.0, 3.0)]
        );
        // Line 0 is unused
        assert_eq!(context.bisectors.len(), 3);
        assert_eq!(context.bisectors[2].edgenum, 2);
        assert_eq!(
            context.edges,
            vec![
                EdgeRecord { line: 1, start: Some(0), end: Some(1) },
                EdgeRecord { line: 0, start: None, end: Some(0) },
                EdgeRecord { line: 2, start: Some(1), end: Some(0) },
            ]
        );
    }

    #[test]
    fn test_repeated_edges_are_kept_once() {
        let mut context = context();
        let edge = EdgeRecord { line: 0, start: None, end: None };
        context.edges = vec![edge, edge];
        context.compact(0.0);
        assert_eq!(context.edges, vec![edge]);
        assert!(context.vertices.is_empty());
    }
}
