// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bucketed queue of pending circle events.
//!
//! Events are hashed on `ystar`, the y coordinate of the sweep line at which
//! they fire. Every bucket is a sorted singly linked list hanging off a dummy
//! head half-edge; `minidx` only moves down on insert and up while scanning
//! for the minimum, which keeps both operations cheap for well spread input.

use super::bisector::Side;
use super::halfedge::{alloc, Halfedge, HalfedgeKey, Halfedges};
use crate::site::Site;

#[derive(Debug)]
pub struct PriorityQueue {
    ymin: f64,
    deltay: f64,
    hashsize: usize,
    count: usize,
    minidx: usize,
    heads: Vec<HalfedgeKey>,
}

impl PriorityQueue {
    pub fn new(arena: &mut Halfedges, ymin: f64, ymax: f64, nsites: usize) -> Self {
        let hashsize = ((4.0 * (nsites as f64).sqrt()) as usize).max(1);
        let heads = (0..hashsize).map(|_| alloc(arena, None, Side::Left)).collect();
        Self {
            ymin,
            deltay: ymax - ymin,
            hashsize,
            count: 0,
            minidx: 0,
            heads,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn bucket(&mut self, he: &Halfedge) -> usize {
        // Every site on one horizontal line: a single bucket holds everything
        let raw = if self.deltay > 0.0 {
            ((he.ystar - self.ymin) / self.deltay * self.hashsize as f64) as isize
        } else {
            0
        };
        let bucket = raw.clamp(0, self.hashsize as isize - 1) as usize;
        if bucket < self.minidx {
            self.minidx = bucket;
        }
        bucket
    }

    /// Queue `he` to fire at `site`, `offset` above it.
    pub fn insert(&mut self, arena: &mut Halfedges, he: HalfedgeKey, site: Site, offset: f64) {
        arena[he].vertex = Some(site);
        arena[he].ystar = site.y + offset;

        let bucket = self.bucket(&arena[he]);
        let (ystar, x) = (arena[he].ystar, site.x);

        let mut last = self.heads[bucket];
        while let Some(next) = arena[last].qnext {
            let other = &arena[next];
            let other_x = other.vertex.map_or(f64::MAX, |v| v.x);
            if ystar > other.ystar || (ystar == other.ystar && x > other_x) {
                last = next;
            } else {
                break;
            }
        }

        arena[he].qnext = arena[last].qnext;
        arena[last].qnext = Some(he);
        self.count += 1;
    }

    /// Remove `he` if it is queued; a no-op otherwise.
    pub fn delete(&mut self, arena: &mut Halfedges, he: HalfedgeKey) {
        if arena[he].vertex.is_none() {
            return;
        }

        let bucket = self.bucket(&arena[he]);
        let mut last = self.heads[bucket];
        while let Some(next) = arena[last].qnext {
            if next == he {
                break;
            }
            last = next;
        }

        if arena[last].qnext == Some(he) {
            arena[last].qnext = arena[he].qnext;
            self.count -= 1;
        }
        arena[he].qnext = None;
        arena[he].vertex = None;
    }

    /// The lowest pending event as a point at `(x, ystar)`.
    ///
    /// Must not be called on an empty queue.
    pub fn min_point(&mut self, arena: &Halfedges) -> Site {
        while self.minidx + 1 < self.hashsize
            && arena[self.heads[self.minidx]].qnext.is_none()
        {
            self.minidx += 1;
        }
        match arena[self.heads[self.minidx]].qnext {
            Some(he) => {
                let he = &arena[he];
                let x = he.vertex.map_or(0.0, |v| v.x);
                Site::new(x, he.ystar)
            }
            None => Site::new(f64::MAX, f64::MAX),
        }
    }

    /// Unlink and return the lowest pending event. Its vertex stays set.
    ///
    /// Call [`PriorityQueue::min_point`] first so `minidx` is current.
    pub fn pop_min(&mut self, arena: &mut Halfedges) -> Option<HalfedgeKey> {
        let head = self.heads[self.minidx];
        let he = arena[head].qnext?;
        arena[head].qnext = arena[he].qnext;
        arena[he].qnext = None;
        self.count -= 1;
        Some(he)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(arena: &mut Halfedges) -> HalfedgeKey {
        alloc(arena, Some(0), Side::Left)
    }

    #[test]
    fn test_pops_in_ystar_then_x_order() {
        let mut arena = Halfedges::with_key();
        let mut queue = PriorityQueue::new(&mut arena, 0.0, 10.0, 9);

        let a = queued(&mut arena);
        let b = queued(&mut arena);
        let c = queued(&mut arena);
        let d = queued(&mut arena);
        queue.insert(&mut arena, a, Site::new(5.0, 6.0), 1.0);
        queue.insert(&mut arena, b, Site::new(1.0, 2.0), 0.5);
        queue.insert(&mut arena, c, Site::new(3.0, 7.0), 0.0);
        queue.insert(&mut arena, d, Site::new(0.0, 2.5), 0.0);
        assert_eq!(queue.len(), 4);

        let mut order = Vec::new();
        while !queue.is_empty() {
            let min = queue.min_point(&arena);
            let he = queue.pop_min(&mut arena).unwrap();
            assert_eq!(min.y, arena[he].ystar);
            order.push(he);
        }
        // Ties on ystar are broken by x
        assert_eq!(order, vec![d, b, c, a]);
    }

    #[test]
    fn test_delete_unqueued_is_noop() {
        let mut arena = Halfedges::with_key();
        let mut queue = PriorityQueue::new(&mut arena, 0.0, 10.0, 4);
        let a = queued(&mut arena);
        queue.delete(&mut arena, a);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delete_removes_event() {
        let mut arena = Halfedges::with_key();
        let mut queue = PriorityQueue::new(&mut arena, 0.0, 10.0, 4);
        let a = queued(&mut arena);
        let b = queued(&mut arena);
        queue.insert(&mut arena, a, Site::new(1.0, 1.0), 0.0);
        queue.insert(&mut arena, b, Site::new(1.0, 4.0), 0.0);

        queue.delete(&mut arena, a);
        assert_eq!(queue.len(), 1);
        assert!(arena[a].vertex.is_none());
        let min = queue.min_point(&arena);
        assert_eq!(min.y, 4.0);
        assert_eq!(queue.pop_min(&mut arena), Some(b));
    }

    #[test]
    fn test_flat_range_uses_one_bucket() {
        let mut arena = Halfedges::with_key();
        let mut queue = PriorityQueue::new(&mut arena, 0.0, 0.0, 4);
        let a = queued(&mut arena);
        let b = queued(&mut arena);
        queue.insert(&mut arena, a, Site::new(2.0, 0.0), 3.0);
        queue.insert(&mut arena, b, Site::new(1.0, 0.0), 1.0);
        queue.min_point(&arena);
        assert_eq!(queue.pop_min(&mut arena), Some(b));
    }
}
