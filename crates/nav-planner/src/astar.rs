//! A* over mesh nodes.
//!
//! Heuristic: straight-line distance between node centers.  Edge cost: the
//! distance between the two incident node centers, or impassable when the
//! portal is narrower than the requested clearance.
//!
//! # Scratch buffers
//!
//! Each worker thread keeps its own `g`/back-pointer/state arrays sized to
//! the node count, so concurrent searches never contend.  Entries are tagged
//! with a search generation instead of being cleared between searches.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use nav_core::{EdgeId, NodeId};
use nav_mesh::NavMesh;

use crate::error::{PlannerError, PlannerResult};
use crate::route::PortalRoute;

#[derive(Default)]
struct Scratch {
    /// Search generation that last touched each node.
    stamp:      Vec<u32>,
    closed:     Vec<bool>,
    g:          Vec<f32>,
    /// Edge through which each node was best reached.
    prev_edge:  Vec<EdgeId>,
    heap:       BinaryHeap<Reverse<(OrderedFloat<f32>, NodeId)>>,
    generation: u32,
}

impl Scratch {
    fn begin(&mut self, node_count: usize) {
        if self.stamp.len() < node_count {
            self.stamp.resize(node_count, 0);
            self.closed.resize(node_count, false);
            self.g.resize(node_count, f32::INFINITY);
            self.prev_edge.resize(node_count, EdgeId::INVALID);
        }
        self.heap.clear();
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: stale stamps could alias the new generation.
            self.stamp.fill(0);
            self.generation = 1;
        }
    }

    #[inline]
    fn touch(&mut self, i: usize) {
        if self.stamp[i] != self.generation {
            self.stamp[i] = self.generation;
            self.closed[i] = false;
            self.g[i] = f32::INFINITY;
            self.prev_edge[i] = EdgeId::INVALID;
        }
    }
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = RefCell::new(Scratch::default());
}

/// Shortest route from `start` to `end` through portals at least
/// `min_width` wide.
pub fn find_route(
    mesh: &NavMesh,
    start: NodeId,
    end: NodeId,
    min_width: f32,
) -> PlannerResult<PortalRoute> {
    let n = mesh.node_count();
    for node in [start, end] {
        if node.index() >= n {
            return Err(PlannerError::InvalidNode { node, count: n });
        }
    }

    let goal = mesh.node(end).center;
    let h = |node: NodeId| mesh.node(node).center.distance(goal);

    SCRATCH.with_borrow_mut(|s| {
        s.begin(n);
        s.touch(start.index());
        s.g[start.index()] = 0.0;
        s.heap.push(Reverse((OrderedFloat(h(start)), start)));

        let mut found = false;
        while let Some(Reverse((_, x))) = s.heap.pop() {
            if s.closed[x.index()] {
                continue;
            }
            if x == end {
                found = true;
                break;
            }
            s.closed[x.index()] = true;
            let gx = s.g[x.index()];

            for (edge_id, y) in mesh.neighbors(x) {
                s.touch(y.index());
                if s.closed[y.index()] {
                    continue;
                }
                let Some(cost) = mesh.edge(edge_id).node_distance(min_width) else {
                    continue;
                };
                let tentative = gx + cost;
                if tentative < s.g[y.index()] {
                    s.g[y.index()] = tentative;
                    s.prev_edge[y.index()] = edge_id;
                    s.heap.push(Reverse((OrderedFloat(tentative + h(y)), y)));
                }
            }
        }

        if !found {
            log::warn!("A* finished without a route from {start} to {end} (clearance {min_width})");
            return Err(PlannerError::NoRoute { from: start, to: end, clearance: min_width });
        }

        // Walk back-pointers from the goal.
        let mut steps = Vec::new();
        let mut curr = end;
        while curr != start {
            let edge_id = s.prev_edge[curr.index()];
            let prev = mesh.edge(edge_id).other(curr);
            steps.push((edge_id, prev));
            curr = prev;
        }

        let mut route = PortalRoute::new(start, end);
        for &(edge_id, node) in steps.iter().rev() {
            route.push_portal(edge_id, mesh.edge(edge_id), node);
        }
        Ok(route)
    })
}
