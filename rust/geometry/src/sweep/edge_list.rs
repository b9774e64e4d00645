// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The beach line: half-edges ordered left to right between two sentinels,
//! with a coarse hash on x to start the search for a site's left neighbour.

use super::bisector::{Bisector, Side};
use super::halfedge::{alloc, is_point_right_of, HalfedgeKey, Halfedges};
use super::site_list::SiteList;
use crate::site::Site;

#[derive(Debug)]
pub struct EdgeList {
    hashsize: usize,
    xmin: f64,
    deltax: f64,
    hash: Vec<Option<HalfedgeKey>>,
    pub leftend: HalfedgeKey,
    pub rightend: HalfedgeKey,
}

impl EdgeList {
    /// Create the list for `nsites` sites spread over `[xmin, xmax]`.
    ///
    /// `xmax` must exceed `xmin`; the caller rejects flat input first.
    pub fn new(arena: &mut Halfedges, xmin: f64, xmax: f64, nsites: usize) -> Self {
        let hashsize = ((2.0 * ((nsites + 4) as f64).sqrt()) as usize).max(2);
        let leftend = alloc(arena, None, Side::Left);
        let rightend = alloc(arena, None, Side::Left);
        arena[leftend].right = Some(rightend);
        arena[rightend].left = Some(leftend);

        let mut hash = vec![None; hashsize];
        hash[0] = Some(leftend);
        hash[hashsize - 1] = Some(rightend);

        Self {
            hashsize,
            xmin,
            deltax: xmax - xmin,
            hash,
            leftend,
            rightend,
        }
    }

    /// Link `he` immediately to the right of `left`.
    pub fn insert(&mut self, arena: &mut Halfedges, left: HalfedgeKey, he: HalfedgeKey) {
        let right = arena[left].right;
        arena[he].left = Some(left);
        arena[he].right = right;
        if let Some(right) = right {
            arena[right].left = Some(he);
        }
        arena[left].right = Some(he);
    }

    /// Unlink `he`. Stale hash entries pointing at it are evicted lazily.
    pub fn delete(&mut self, arena: &mut Halfedges, he: HalfedgeKey) {
        let (left, right) = (arena[he].left, arena[he].right);
        if let Some(left) = left {
            arena[left].right = right;
        }
        if let Some(right) = right {
            arena[right].left = left;
        }
        arena[he].deleted = true;
    }

    fn gethash(&mut self, arena: &Halfedges, bucket: isize) -> Option<HalfedgeKey> {
        if bucket < 0 || bucket as usize >= self.hashsize {
            return None;
        }
        let bucket = bucket as usize;
        let he = self.hash[bucket]?;
        if arena[he].deleted {
            self.hash[bucket] = None;
            return None;
        }
        Some(he)
    }

    /// The half-edge immediately left of `pt` on the beach line.
    pub fn leftbnd(
        &mut self,
        arena: &Halfedges,
        pt: &Site,
        bisectors: &[Bisector],
        sites: &SiteList,
    ) -> HalfedgeKey {
        let last = self.hashsize as isize - 1;
        let bucket = ((pt.x - self.xmin) / self.deltax * self.hashsize as f64) as isize;
        let bucket = bucket.clamp(0, last);

        // The sentinels sit in the outermost buckets, so this terminates
        let mut he = self.gethash(arena, bucket);
        let mut i = 1;
        while he.is_none() && i <= self.hashsize as isize {
            he = self
                .gethash(arena, bucket - i)
                .or_else(|| self.gethash(arena, bucket + i));
            i += 1;
        }
        let mut he = he.unwrap_or(self.leftend);

        let right_of = |key: HalfedgeKey| is_point_right_of(&arena[key], pt, bisectors, sites);

        if he == self.leftend || (he != self.rightend && right_of(he)) {
            loop {
                let Some(next) = arena[he].right else { break };
                he = next;
                if he == self.rightend || !right_of(he) {
                    break;
                }
            }
            he = arena[he].left.unwrap_or(self.leftend);
        } else {
            loop {
                let Some(prev) = arena[he].left else { break };
                he = prev;
                if he == self.leftend || right_of(he) {
                    break;
                }
            }
        }

        if bucket > 0 && bucket < last {
            self.hash[bucket as usize] = Some(he);
        }
        he
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn test_new_list_links_sentinels() {
        let mut arena = Halfedges::with_key();
        let list = EdgeList::new(&mut arena, 0.0, 10.0, 5);
        assert_eq!(list.hashsize, 6);
        assert_eq!(arena[list.leftend].right, Some(list.rightend));
        assert_eq!(arena[list.rightend].left, Some(list.leftend));
    }

    #[test]
    fn test_insert_and_delete() {
        let mut arena = Halfedges::with_key();
        let mut list = EdgeList::new(&mut arena, 0.0, 10.0, 5);
        let a = alloc(&mut arena, Some(0), Side::Left);
        let b = alloc(&mut arena, Some(0), Side::Right);
        list.insert(&mut arena, list.leftend, a);
        list.insert(&mut arena, a, b);
        assert_eq!(arena[list.leftend].right, Some(a));
        assert_eq!(arena[a].right, Some(b));
        assert_eq!(arena[b].right, Some(list.rightend));

        list.delete(&mut arena, a);
        assert!(arena[a].deleted);
        assert_eq!(arena[list.leftend].right, Some(b));
        assert_eq!(arena[b].left, Some(list.leftend));
    }

    #[test]
    fn test_leftbnd_on_empty_list_is_leftend() {
        let points = [Point2::new(0.0, 0.0), Point2::new(10.0, 1.0)];
        let sites = SiteList::new(&points).unwrap();
        let mut arena = Halfedges::with_key();
        let mut list = EdgeList::new(&mut arena, 0.0, 10.0, 2);
        for x in [0.0, 3.0, 9.9, 10.0] {
            let he = list.leftbnd(&arena, &Site::new(x, 1.0), &[], &sites);
            assert_eq!(he, list.leftend);
        }
    }

    #[test]
    fn test_leftbnd_finds_enclosing_arc() {
        let points = [Point2::new(0.0, 0.0), Point2::new(4.0, 0.0), Point2::new(2.0, 5.0)];
        let sites = SiteList::untranslated(&points).unwrap();
        let mut counter = 0;
        let bisectors = vec![Bisector::between(sites.get(0), sites.get(1), &mut counter)];

        let mut arena = Halfedges::with_key();
        let mut list = EdgeList::new(&mut arena, 0.0, 4.0, 3);
        let left = alloc(&mut arena, Some(0), Side::Left);
        let right = alloc(&mut arena, Some(0), Side::Right);
        list.insert(&mut arena, list.leftend, left);
        list.insert(&mut arena, left, right);

        // Left of both half-edges lies the arc of (0, 0), between them (4, 0)
        let west = list.leftbnd(&arena, &Site::new(1.0, 5.0), &bisectors, &sites);
        assert_eq!(west, list.leftend);
        let east = list.leftbnd(&arena, &Site::new(3.5, 5.0), &bisectors, &sites);
        assert_eq!(east, left);
        assert_eq!(arena[left].right, Some(right));
    }
}
