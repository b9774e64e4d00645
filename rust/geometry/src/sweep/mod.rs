// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fortune sweepline and the structures it runs on.

mod bisector;
mod edge_list;
mod engine;
mod halfedge;
mod priority_queue;
mod site_list;

pub use bisector::{Bisector, Side};
pub use edge_list::EdgeList;
pub use engine::voronoi;
pub use halfedge::{Halfedge, HalfedgeKey, Halfedges};
pub use priority_queue::PriorityQueue;
pub use site_list::SiteList;
