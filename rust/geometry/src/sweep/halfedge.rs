// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-edges of the beach line, stored in a generational arena.
//!
//! A half-edge is one side of a bisector as seen from the sweep. It sits in
//! two linked structures at once: the doubly linked edge list (`left`,
//! `right`) and a singly linked priority-queue bucket (`qnext`). Both are
//! expressed as [`HalfedgeKey`] links into one [`SlotMap`], so unlinking
//! never invalidates anything else.

use slotmap::{new_key_type, SlotMap};

use super::bisector::{Bisector, Side};
use super::site_list::SiteList;
use crate::site::{nearly_equal, Site, TOLERANCE};

new_key_type! {
    /// Stable handle to a half-edge in the sweep arena
    pub struct HalfedgeKey;
}

#[derive(Debug, Clone)]
pub struct Halfedge {
    pub left: Option<HalfedgeKey>,
    pub right: Option<HalfedgeKey>,
    pub qnext: Option<HalfedgeKey>,
    /// Index into the sweep's bisectors; `None` for sentinels and bucket heads
    pub edge: Option<usize>,
    pub pm: Side,
    /// Pending circle event, set while the half-edge is queued
    pub vertex: Option<Site>,
    pub ystar: f64,
    pub deleted: bool,
}

impl Halfedge {
    fn new(edge: Option<usize>, pm: Side) -> Self {
        Self {
            left: None,
            right: None,
            qnext: None,
            edge,
            pm,
            vertex: None,
            ystar: f64::MAX,
            deleted: false,
        }
    }
}

/// Arena owning every half-edge of one sweep
pub type Halfedges = SlotMap<HalfedgeKey, Halfedge>;

pub fn alloc(arena: &mut Halfedges, edge: Option<usize>, pm: Side) -> HalfedgeKey {
    arena.insert(Halfedge::new(edge, pm))
}

/// Site on the left of the half-edge, `None` for sentinels
pub fn leftreg(he: &Halfedge, bisectors: &[Bisector]) -> Option<usize> {
    he.edge.map(|e| bisectors[e].reg[he.pm.index()])
}

/// Site on the right of the half-edge, `None` for sentinels
pub fn rightreg(he: &Halfedge, bisectors: &[Bisector]) -> Option<usize> {
    he.edge.map(|e| bisectors[e].reg[he.pm.opposite().index()])
}

/// Whether `pt` lies to the right of the half-edge's bisector.
pub fn is_point_right_of(
    he: &Halfedge,
    pt: &Site,
    bisectors: &[Bisector],
    sites: &SiteList,
) -> bool {
    let Some(e) = he.edge else {
        return false;
    };
    let e = &bisectors[e];
    let topsite = sites.get(e.reg[1]);
    let right_of_site = pt.x > topsite.x;

    if right_of_site && he.pm == Side::Left {
        return true;
    }
    if !right_of_site && he.pm == Side::Right {
        return false;
    }

    let mut above;
    if e.a == 1.0 {
        let dyp = pt.y - topsite.y;
        let dxp = pt.x - topsite.x;
        let mut fast = false;

        if (!right_of_site && e.b < 0.0) || (right_of_site && e.b >= 0.0) {
            above = dyp >= e.b * dxp;
            fast = above;
        } else {
            above = pt.x + pt.y * e.b > e.c;
            if e.b < 0.0 {
                above = !above;
            }
            if !above {
                fast = true;
            }
        }

        if !fast {
            let dxs = topsite.x - sites.get(e.reg[0]).x;
            above = e.b * (dxp * dxp - dyp * dyp)
                < dxs * dyp * (1.0 + 2.0 * dxp / dxs + e.b * e.b);
            if e.b < 0.0 {
                above = !above;
            }
        }
    } else {
        let yl = e.c - e.a * pt.x;
        let t1 = pt.y - yl;
        let t2 = pt.x - topsite.x;
        let t3 = yl - topsite.y;
        above = t1 * t1 > t2 * t2 + t3 * t3;
    }

    match he.pm {
        Side::Left => above,
        Side::Right => !above,
    }
}

/// Where the bisectors of two half-edges cross, if that crossing can become
/// a Voronoi vertex.
pub fn intersect(
    he1: &Halfedge,
    he2: &Halfedge,
    bisectors: &[Bisector],
    sites: &SiteList,
) -> Option<Site> {
    let (e1, e2) = (&bisectors[he1.edge?], &bisectors[he2.edge?]);

    // Bisectors sharing their upper site diverge
    if e1.reg[1] == e2.reg[1] {
        return None;
    }

    let d = e1.a * e2.b - e1.b * e2.a;
    if nearly_equal(d, 0.0, TOLERANCE) {
        return None;
    }

    let xint = (e1.c * e2.b - e2.c * e1.b) / d;
    let yint = (e2.c * e1.a - e1.c * e2.a) / d;

    let (he, e) = if sites
        .get(e1.reg[1])
        .sweep_cmp(sites.get(e2.reg[1]))
        .is_lt()
    {
        (he1, e1)
    } else {
        (he2, e2)
    };

    let right_of_site = xint >= sites.get(e.reg[1]).x;
    if (right_of_site && he.pm == Side::Left) || (!right_of_site && he.pm == Side::Right) {
        return None;
    }

    Some(Site::new(xint, yint))
}
