//! Clearance-aware route cache.
//!
//! The best route for a wide agent may avoid a narrow shortcut that a
//! narrow agent would take, so one (start, end) pair can hold several
//! routes.  Each is kept with the narrowest clearance for which it is known
//! to be optimal (`best_smallest`) and its own width limit (`max_width`).
//!
//! A cached route answers a request for clearance `c` when
//! `max_width >= c` and `best_smallest <= c * 1.05`.  The 5 % slack stops
//! nearly equal clearances from each triggering a fresh search.  A portal
//! exactly as wide as the clearance is passable (see
//! `NavMeshEdge::node_distance`).

use std::sync::{Arc, RwLock};

use nav_core::NodeId;
use nav_mesh::NavMesh;

use crate::astar::find_route;
use crate::error::PlannerResult;
use crate::route::PortalRoute;

const CLEARANCE_SLACK: f32 = 1.05;

type RouteKey = (NodeId, NodeId);

#[cfg(feature = "fx-hash")]
type RouteMap = rustc_hash::FxHashMap<RouteKey, Vec<CachedRoute>>;
#[cfg(not(feature = "fx-hash"))]
type RouteMap = std::collections::HashMap<RouteKey, Vec<CachedRoute>>;

#[derive(Clone, Debug)]
struct CachedRoute {
    best_smallest: f32,
    route:         Arc<PortalRoute>,
}

impl CachedRoute {
    #[inline]
    fn serves(&self, clearance: f32) -> bool {
        self.route.max_width >= clearance && self.best_smallest <= clearance * CLEARANCE_SLACK
    }
}

/// Shared route planner for one mesh.  Safe to call from many threads: the
/// search runs on per-thread scratch and only the cache is locked.
pub struct PathPlanner {
    mesh:   Arc<NavMesh>,
    routes: RwLock<RouteMap>,
}

impl PathPlanner {
    pub fn new(mesh: Arc<NavMesh>) -> Self {
        Self { mesh, routes: RwLock::new(RouteMap::default()) }
    }

    pub fn mesh(&self) -> &Arc<NavMesh> {
        &self.mesh
    }

    /// Route from `start` to `end` passable with `min_clearance`, from the
    /// cache if one qualifies.
    pub fn get_route(
        &self,
        start: NodeId,
        end: NodeId,
        min_clearance: f32,
    ) -> PlannerResult<Arc<PortalRoute>> {
        if let Some(route) = self.lookup(start, end, min_clearance) {
            return Ok(route);
        }
        log::debug!("route cache miss {start} -> {end} (clearance {min_clearance})");
        let route = find_route(&self.mesh, start, end, min_clearance)?;
        Ok(self.cache_route(route, min_clearance))
    }

    pub(crate) fn lookup(&self, start: NodeId, end: NodeId, clearance: f32) -> Option<Arc<PortalRoute>> {
        let routes = self.routes.read().unwrap_or_else(|e| e.into_inner());
        routes
            .get(&(start, end))?
            .iter()
            .rev()
            .find(|c| c.serves(clearance))
            .map(|c| Arc::clone(&c.route))
    }

    /// Merge a freshly computed route.  An equivalent cached route has its
    /// `best_smallest` tightened instead of being duplicated.
    fn cache_route(&self, route: PortalRoute, clearance: f32) -> Arc<PortalRoute> {
        let mut routes = self.routes.write().unwrap_or_else(|e| e.into_inner());
        let list = routes.entry((route.start, route.end)).or_default();

        if let Some(existing) = list.iter_mut().find(|c| c.route.is_equivalent(&route)) {
            existing.best_smallest = existing.best_smallest.min(clearance);
            return Arc::clone(&existing.route);
        }

        let route = Arc::new(route);
        let at = list.partition_point(|c| c.route.max_width <= route.max_width);
        list.insert(at, CachedRoute { best_smallest: clearance, route: Arc::clone(&route) });
        route
    }

    /// Number of cached routes between `start` and `end`.
    pub fn cached_route_count(&self, start: NodeId, end: NodeId) -> usize {
        let routes = self.routes.read().unwrap_or_else(|e| e.into_inner());
        routes.get(&(start, end)).map_or(0, Vec::len)
    }

    pub fn clear_cache(&self) {
        self.routes.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
