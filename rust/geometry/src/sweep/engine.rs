// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fortune's sweepline.
//!
//! Sites are consumed bottom to top. A site event splits the arc above the
//! new site with a pair of half-edges; a circle event removes an arc, emits a
//! Voronoi vertex (and a Delaunay triangle) and joins its neighbours with a
//! new bisector. Whatever is left on the beach line at the end becomes the
//! unbounded edges.

use super::bisector::Side;
use super::edge_list::EdgeList;
use super::halfedge::{alloc, intersect, leftreg, rightreg, Halfedges};
use super::priority_queue::PriorityQueue;
use super::site_list::SiteList;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::site::Site;

/// Run the sweep over `sites`, recording into `context`.
///
/// On return the context and the sites are back in the caller's coordinates.
/// Every site sharing one x coordinate is rejected: the beach line hash has
/// no width to spread over.
pub fn voronoi(sites: &mut SiteList, context: &mut Context) -> Result<()> {
    context.reset();

    if sites.len() > 1 && sites.xmax() - sites.xmin() <= 0.0 {
        return Err(Error::DegenerateInput(format!(
            "all {} sites share x = {}",
            sites.len(),
            sites.xmin() + sites.translation().0
        )));
    }

    run(sites, context)?;
    context.translate(sites);

    tracing::debug!(
        sites = sites.len(),
        vertices = context.vertices.len(),
        edges = context.edges.len(),
        triangles = context.triangles.len(),
        "Sweep complete"
    );
    Ok(())
}

fn run(sites: &SiteList, context: &mut Context) -> Result<()> {
    let nsites = sites.len();
    let mut arena = Halfedges::with_key();
    let mut edge_list = EdgeList::new(&mut arena, sites.xmin(), sites.xmax(), nsites);
    let mut queue = PriorityQueue::new(&mut arena, sites.ymin(), sites.ymax(), nsites);

    let mut order = sites.sweep_order();
    let bottom = *order.next().ok_or(Error::EmptyInput)?;
    let mut newsite = order.next().copied();
    let mut minpt = Site::new(f64::MIN, f64::MIN);
    let mut vertex_count = 0;

    loop {
        if !queue.is_empty() {
            minpt = queue.min_point(&arena);
        }

        match newsite {
            Some(site) if queue.is_empty() || site.sweep_cmp(&minpt).is_lt() => {
                // Site event
                let lbnd = edge_list.leftbnd(&arena, &site, &context.bisectors, sites);
                let rbnd = arena[lbnd].right.unwrap_or(edge_list.rightend);
                let bot = rightreg(&arena[lbnd], &context.bisectors).unwrap_or(bottom.sitenum);

                let edge = context.out_bisector(sites.get(bot), &site);

                let bisector = alloc(&mut arena, Some(edge), Side::Left);
                edge_list.insert(&mut arena, lbnd, bisector);
                if let Some(p) =
                    intersect(&arena[lbnd], &arena[bisector], &context.bisectors, sites)
                {
                    queue.delete(&mut arena, lbnd);
                    queue.insert(&mut arena, lbnd, p, site.distance(&p));
                }

                let lbnd = bisector;
                let bisector = alloc(&mut arena, Some(edge), Side::Right);
                edge_list.insert(&mut arena, lbnd, bisector);
                if let Some(p) =
                    intersect(&arena[bisector], &arena[rbnd], &context.bisectors, sites)
                {
                    queue.insert(&mut arena, bisector, p, site.distance(&p));
                }

                newsite = order.next().copied();
            }
            _ if !queue.is_empty() => {
                // Circle event
                let lbnd = queue
                    .pop_min(&mut arena)
                    .ok_or_else(|| Error::DegenerateInput("event queue out of sync".into()))?;
                let llbnd = arena[lbnd].left.unwrap_or(edge_list.leftend);
                let rbnd = arena[lbnd].right.unwrap_or(edge_list.rightend);
                let rrbnd = arena[rbnd].right.unwrap_or(edge_list.rightend);

                let reg = |side: Option<usize>| side.unwrap_or(bottom.sitenum);
                let mut bot = reg(leftreg(&arena[lbnd], &context.bisectors));
                let mut top = reg(rightreg(&arena[rbnd], &context.bisectors));
                let mid = reg(rightreg(&arena[lbnd], &context.bisectors));
                context.out_triple(bot, top, mid);

                let mut vertex = arena[lbnd]
                    .vertex
                    .ok_or_else(|| Error::DegenerateInput("circle event without vertex".into()))?;
                vertex.sitenum = vertex_count;
                vertex_count += 1;
                context.out_vertex(&vertex);

                for he in [lbnd, rbnd] {
                    if let Some(edge) = arena[he].edge {
                        if context.bisectors[edge].set_endpoint(arena[he].pm, vertex.sitenum) {
                            context.out_edge(edge);
                        }
                    }
                }

                edge_list.delete(&mut arena, lbnd);
                queue.delete(&mut arena, rbnd);
                edge_list.delete(&mut arena, rbnd);

                let mut pm = Side::Left;
                if sites.get(bot).y > sites.get(top).y {
                    std::mem::swap(&mut bot, &mut top);
                    pm = Side::Right;
                }

                let edge = context.out_bisector(sites.get(bot), sites.get(top));
                let bisector = alloc(&mut arena, Some(edge), pm);
                edge_list.insert(&mut arena, llbnd, bisector);
                if context.bisectors[edge].set_endpoint(pm.opposite(), vertex.sitenum) {
                    context.out_edge(edge);
                }

                let lower = *sites.get(bot);
                if let Some(p) =
                    intersect(&arena[llbnd], &arena[bisector], &context.bisectors, sites)
                {
                    queue.delete(&mut arena, llbnd);
                    queue.insert(&mut arena, llbnd, p, lower.distance(&p));
                }
                if let Some(p) =
                    intersect(&arena[bisector], &arena[rrbnd], &context.bisectors, sites)
                {
                    queue.insert(&mut arena, bisector, p, lower.distance(&p));
                }
            }
            _ => break,
        }
    }

    let mut he = arena[edge_list.leftend].right;
    while let Some(key) = he {
        if key == edge_list.rightend {
            break;
        }
        if let Some(edge) = arena[key].edge {
            context.out_edge(edge);
        }
        he = arena[key].right;
    }

    Ok(())
}
