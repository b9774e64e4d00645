// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Perpendicular bisectors between pairs of sites.

use crate::site::Site;

/// Which end of a bisector a half-edge or endpoint refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// The line `a*x + b*y = c` equidistant from two sites.
///
/// One of `a` or `b` is always exactly 1: `a` when the sites are further
/// apart in x than in y, `b` otherwise. `reg` holds the site numbers of the
/// two generating sites and `ep` the vertex indices of the endpoints, once
/// the sweep has found them.
#[derive(Debug, Clone, PartialEq)]
pub struct Bisector {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub reg: [usize; 2],
    pub ep: [Option<usize>; 2],
    pub edgenum: usize,
}

impl Bisector {
    /// Build the bisector of `s1` and `s2`, numbering it from `next_edge_id`.
    pub fn between(s1: &Site, s2: &Site, next_edge_id: &mut usize) -> Self {
        let dx = s2.x - s1.x;
        let dy = s2.y - s1.y;
        let mut c = s1.x * dx + s1.y * dy + (dx * dx + dy * dy) * 0.5;

        let (a, b) = if dx.abs() > dy.abs() {
            c /= dx;
            (1.0, dy / dx)
        } else {
            c /= dy;
            (dx / dy, 1.0)
        };

        let edgenum = *next_edge_id;
        *next_edge_id += 1;

        Self {
            a,
            b,
            c,
            reg: [s1.sitenum, s2.sitenum],
            ep: [None, None],
            edgenum,
        }
    }

    /// Record the vertex at one end. Returns true once both ends are known.
    pub fn set_endpoint(&mut self, side: Side, vertex: usize) -> bool {
        self.ep[side.index()] = Some(vertex);
        self.ep[side.opposite().index()].is_some()
    }

    /// Direction along the line, `(b, -a)`; used for unbounded ends.
    pub fn direction(&self) -> (f64, f64) {
        (self.b, -self.a)
    }

    /// Shift the line by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.c += self.a * dx + self.b * dy;
    }
}
