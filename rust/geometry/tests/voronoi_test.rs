// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertices, lines and edges of known point sets.
//!
//! Output order is not part of the contract, so diagrams are compared as
//! sets of rounded vertices, line equations and expanded segments.

use std::collections::BTreeSet;

use flooding_geometry::{
    compute_delaunay_triangulation, compute_voronoi_diagram, resolve_points, Error, Point2,
    PointLike, VoronoiConfig, VoronoiDiagram,
};

type Key = (i64, i64);
type LineKey = (i64, i64, i64);

fn round(v: f64) -> i64 {
    (v * 1e6).round() as i64
}

fn key(x: f64, y: f64) -> Key {
    (round(x), round(y))
}

fn points(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
    coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

fn vertex_set(diagram: &VoronoiDiagram) -> BTreeSet<Key> {
    diagram.vertices.iter().map(|p| key(p.x, p.y)).collect()
}

fn line_set(diagram: &VoronoiDiagram) -> BTreeSet<LineKey> {
    diagram
        .lines
        .iter()
        .map(|l| (round(l.a), round(l.b), round(l.c)))
        .collect()
}

/// Every edge as (line equation, start point, end point)
fn segment_set(diagram: &VoronoiDiagram) -> BTreeSet<(LineKey, Option<Key>, Option<Key>)> {
    diagram
        .edges
        .iter()
        .map(|edge| {
            let line = diagram.lines[edge.line];
            let end = |v: Option<usize>| {
                v.map(|i| key(diagram.vertices[i].x, diagram.vertices[i].y))
            };
            (
                (round(line.a), round(line.b), round(line.c)),
                end(edge.start),
                end(edge.end),
            )
        })
        .collect()
}

fn expected_segments(
    vertices: &[(f64, f64)],
    lines: &[(f64, f64, f64)],
    edges: &[(usize, i32, i32)],
) -> BTreeSet<(LineKey, Option<Key>, Option<Key>)> {
    let end = |v: i32| {
        (v >= 0).then(|| {
            let (x, y) = vertices[v as usize];
            key(x, y)
        })
    };
    edges
        .iter()
        .map(|&(l, a, b)| {
            let (la, lb, lc) = lines[l];
            ((round(la), round(lb), round(lc)), end(a), end(b))
        })
        .collect()
}

fn expected_lines(lines: &[(f64, f64, f64)]) -> BTreeSet<LineKey> {
    lines
        .iter()
        .map(|&(a, b, c)| (round(a), round(b), round(c)))
        .collect()
}

fn assert_diagram(
    coords: &[(f64, f64)],
    vertices: &[(f64, f64)],
    lines: &[(f64, f64, f64)],
    edges: &[(usize, i32, i32)],
) {
    let diagram = compute_voronoi_diagram(&points(coords), &VoronoiConfig::default()).unwrap();
    let expected_vertices: BTreeSet<Key> = vertices.iter().map(|&(x, y)| key(x, y)).collect();

    assert_eq!(vertex_set(&diagram), expected_vertices, "vertices");
    assert_eq!(line_set(&diagram), expected_lines(lines), "lines");
    assert_eq!(
        segment_set(&diagram),
        expected_segments(vertices, lines, edges),
        "segments"
    );
}

#[test]
fn test_two_points_on_a_diagonal() {
    let diagram = compute_voronoi_diagram(
        &points(&[(0.0, 0.0), (1.0, 1.0)]),
        &VoronoiConfig::default(),
    )
    .unwrap();
    assert!(diagram.vertices.is_empty());
    assert_eq!(line_set(&diagram), expected_lines(&[(1.0, 1.0, 1.0)]));
    assert_eq!(diagram.edges.len(), 1);
    assert_eq!((diagram.edges[0].start, diagram.edges[0].end), (None, None));
}

#[test]
fn test_two_points_side_by_side() {
    assert_diagram(&[(0.0, 0.0), (2.0, 0.0)], &[], &[(1.0, 0.0, 1.0)], &[(0, -1, -1)]);
}

#[test]
fn test_vertical_pair_is_degenerate() {
    let result = compute_voronoi_diagram(
        &points(&[(0.0, 0.0), (0.0, 2.0)]),
        &VoronoiConfig::default(),
    );
    assert!(matches!(result, Err(Error::DegenerateInput(_))));
}

#[test]
fn test_single_point_gives_empty_diagram() {
    let diagram =
        compute_voronoi_diagram(&points(&[(0.0, 0.0)]), &VoronoiConfig::default()).unwrap();
    assert!(diagram.vertices.is_empty());
    assert!(diagram.lines.is_empty());
    assert!(diagram.edges.is_empty());
    assert!(diagram.polygons.is_empty());
}

#[test]
fn test_no_points_is_an_error() {
    let result = compute_voronoi_diagram(&[], &VoronoiConfig::default());
    assert!(matches!(result, Err(Error::EmptyInput)));
}

#[test]
fn test_square() {
    let coords = [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)];
    assert_diagram(
        &coords,
        &[(1.0, 1.0)],
        &[(0.0, 1.0, 1.0), (1.0, 0.0, 1.0)],
        &[(0, -1, 0), (0, 0, -1), (1, -1, 0), (1, 0, -1)],
    );

    let diagram = compute_voronoi_diagram(&points(&coords), &VoronoiConfig::default()).unwrap();
    assert_eq!(diagram.vertices.len(), 1);
    assert_eq!(diagram.lines.len(), 2);
    assert_eq!(diagram.edges.len(), 4);
}

#[test]
fn test_rotated_square() {
    assert_diagram(
        &[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)],
        &[(0.0, 0.0)],
        &[(1.0, 1.0, 0.0), (-1.0, 1.0, 0.0)],
        &[(0, -1, 0), (0, 0, -1), (1, -1, 0), (1, 0, -1)],
    );
}

const CROSS_EDGES: [(usize, i32, i32); 8] = [
    (2, 0, 1),
    (3, 2, 3),
    (4, 2, 0),
    (5, 3, 1),
    (1, -1, 2),
    (1, 1, -1),
    (0, 3, -1),
    (0, -1, 0),
];

#[test]
fn test_cross() {
    assert_diagram(
        &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)],
        &[(-0.5, -0.5), (0.5, -0.5), (-0.5, 0.5), (0.5, 0.5)],
        &[
            (-1.0, 1.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, -0.5),
            (0.0, 1.0, 0.5),
            (1.0, 0.0, -0.5),
            (1.0, 0.0, 0.5),
        ],
        &CROSS_EDGES,
    );
}

#[test]
fn test_translated_cross() {
    assert_diagram(
        &[(5.0, 5.0), (6.0, 5.0), (5.0, 6.0), (4.0, 5.0), (5.0, 4.0)],
        &[(4.5, 4.5), (5.5, 4.5), (4.5, 5.5), (5.5, 5.5)],
        &[
            (-1.0, 1.0, 0.0),
            (1.0, 1.0, 10.0),
            (0.0, 1.0, 4.5),
            (0.0, 1.0, 5.5),
            (1.0, 0.0, 4.5),
            (1.0, 0.0, 5.5),
        ],
        &CROSS_EDGES,
    );
}

#[test]
fn test_zigzag() {
    let coords = [
        (0.0, 0.0),
        (1.0, 1.0),
        (0.0, 2.0),
        (1.0, 3.0),
        (0.0, 4.0),
        (2.0, 0.0),
        (3.0, 1.0),
        (2.0, 2.0),
        (3.0, 3.0),
        (2.0, 4.0),
    ];
    let vertices = [
        (1.0, 0.0),
        (0.0, 1.0),
        (2.0, 1.0),
        (2.0, 1.0),
        (1.0, 2.0),
        (1.0, 2.0),
        (3.0, 2.0),
        (0.0, 3.0),
        (2.0, 3.0),
        (1.0, 4.0),
    ];
    let lines = [
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (-1.0, 1.0, -1.0),
        (1.0, 1.0, 3.0),
        (0.0, 1.0, 1.0),
        (-1.0, 1.0, 1.0),
        (0.0, 1.0, 2.0),
        (1.0, 1.0, 5.0),
        (0.0, 1.0, 3.0),
        (-1.0, 1.0, 3.0),
    ];
    let edges = [
        (1, 1, 0),
        (2, 0, 2),
        (5, 1, 4),
        (3, 4, 2),
        (2, 3, 6),
        (3, 7, 4),
        (5, 5, 8),
        (7, 8, 6),
        (9, 7, 9),
        (7, 9, 8),
        (4, -1, 1),
        (8, -1, 7),
        (0, -1, 9),
        (5, 8, -1),
        (6, 6, -1),
        (3, 2, -1),
        (0, 0, -1),
    ];
    assert_diagram(&coords, &vertices, &lines, &edges);

    // Repeated circle events collapse onto one vertex each
    let diagram = compute_voronoi_diagram(&points(&coords), &VoronoiConfig::default()).unwrap();
    assert_eq!(diagram.vertices.len(), 8);
}

#[test]
fn test_difficult_five_points() {
    let coords = [
        (877.9, 874.4),
        (0.0, 892.9),
        (372.7, 0.0),
        (773.6, 2452.1),
        (1287.2, 2371.8),
    ];
    let diagram = compute_voronoi_diagram(&points(&coords), &VoronoiConfig::default()).unwrap();
    let expected = [
        (431.8966967160988, 548.942164706115),
        (914.2575471490126, 1669.1011359368968),
        (454.86183322550085, 1638.7309939820118),
    ];
    assert_eq!(diagram.vertices.len(), expected.len());
    for (x, y) in expected {
        assert!(
            diagram
                .vertices
                .iter()
                .any(|p| (p.x - x).abs() < 1e-6 && (p.y - y).abs() < 1e-6),
            "missing vertex ({}, {}) in {:?}",
            x,
            y,
            diagram.vertices
        );
    }
}

#[test]
fn test_repeated_points_are_tolerated() {
    let coords = [(0.0, 85.0), (9.0, 12.0), (9.0, 12.0), (39.0, 12.0), (50.0, 80.0)];
    let diagram = compute_voronoi_diagram(&points(&coords), &VoronoiConfig::default()).unwrap();
    assert_eq!(diagram.polygons.len(), 4);
}

#[test]
fn test_results_are_deterministic() {
    let coords = [
        (0.0, 0.0),
        (1.0, 1.0),
        (0.0, 2.0),
        (1.0, 3.0),
        (0.0, 4.0),
        (2.0, 0.0),
        (3.0, 1.0),
        (2.0, 2.0),
        (3.0, 3.0),
        (2.0, 4.0),
    ];
    let config = VoronoiConfig::new().with_margin(2.0);
    let first = compute_voronoi_diagram(&points(&coords), &config).unwrap();
    let second = compute_voronoi_diagram(&points(&coords), &config).unwrap();
    assert_eq!(vertex_set(&first), vertex_set(&second));
    assert_eq!(line_set(&first), line_set(&second));
    assert_eq!(segment_set(&first), segment_set(&second));
    assert_eq!(first.polygons, second.polygons);
}

#[test]
fn test_point_like_input() {
    let input: Vec<PointLike> = vec!["0 0".into(), (2.0, 0.0).into(), [2.0, 2.0].into()];
    let resolved = resolve_points(&input).unwrap();
    let diagram = compute_voronoi_diagram(&resolved, &VoronoiConfig::default()).unwrap();
    assert_eq!(diagram.vertices.len(), 1);
    assert_eq!(vertex_set(&diagram), BTreeSet::from([key(1.0, 1.0)]));
}

#[test]
fn test_delaunay_of_square_and_centre() {
    let coords = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (1.0, 1.1)];
    let triangles = compute_delaunay_triangulation(&points(&coords)).unwrap();
    assert_eq!(triangles.len(), 4);
    for triangle in &triangles {
        assert!(triangle.contains(&4), "{:?}", triangle);
    }
}
