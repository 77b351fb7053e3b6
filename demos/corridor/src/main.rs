//! corridor: two crowds swapping rooms through a narrow corridor.
//!
//! Ten agents start in the west room and ten in the east room; each group
//! heads for the far room.  They meet head-on in the 1 m corridor and must
//! file past each other.
//!
//! Pass a `.nav` file as the only argument to run on that mesh instead: the
//! crowds then start around the first node's centre and swap with the last
//! node's.

mod mesh;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use nav_agent::{AgentParams, AgentStore, AgentStoreBuilder};
use nav_core::{NodeId, SimConfig, Tick, Vector2};
use nav_localizer::NavMeshLocalizer;
use nav_mesh::NavMesh;
use nav_path::Goal;
use nav_sim::{SimBuilder, SimObserver};

use mesh::{EAST_ROOM, WEST_ROOM, build_corridor};

// ── Constants ─────────────────────────────────────────────────────────────────

const PER_SIDE:              usize = 10;
const SEED:                  u64   = 42;
const TIME_STEP:             f32   = 0.1;
const TOTAL_TICKS:           u64   = 900;  // 90 s
const OUTPUT_INTERVAL_TICKS: u64   = 50;   // progress line every 5 s
const SPAWN_SPACING:         f32   = 0.8;
const SPAWN_JITTER:          f32   = 0.15;

// ── Progress observer ─────────────────────────────────────────────────────────

struct ArrivalReporter {
    goals:   Vec<Goal>,
    arrived: usize,
}

impl ArrivalReporter {
    fn count(&mut self, agents: &AgentStore) {
        self.arrived = agents
            .agents
            .iter()
            .zip(&self.goals)
            .filter(|(a, g)| g.squared_distance(a.pos) == 0.0)
            .count();
    }
}

impl SimObserver for ArrivalReporter {
    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, localizer: &NavMeshLocalizer) {
        self.count(agents);
        let on_paths = localizer.locations().iter().filter(|l| l.is_path()).count();
        log::info!(
            "{tick}: {}/{} agents arrived, {on_paths} following paths",
            self.arrived,
            agents.len()
        );
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        log::info!("finished at {final_tick}");
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Up to `PER_SIDE` jittered grid points filling the box `lo..hi`.
fn spawn_block(lo: Vector2, hi: Vector2, rng: &mut SmallRng) -> Vec<Vector2> {
    let margin = SPAWN_SPACING * 0.5;
    let cols = (((hi.x - lo.x - 2.0 * margin) / SPAWN_SPACING) as usize + 1).max(1);
    (0..PER_SIDE)
        .map(|i| {
            let x = lo.x + margin + (i % cols) as f32 * SPAWN_SPACING;
            let y = lo.y + margin + (i / cols) as f32 * SPAWN_SPACING;
            Vector2::new(
                x + rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER),
                y + rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER),
            )
        })
        .collect()
}

/// The built-in corridor: rooms swap.
fn corridor_scenario(rng: &mut SmallRng) -> Result<(NavMesh, Vec<Vector2>, Vec<Goal>)> {
    let mesh = build_corridor().context("building the corridor mesh")?;
    let inset = Vector2::new(0.5, 0.5);
    let west_goal = Goal::aabb(WEST_ROOM.0 + inset, WEST_ROOM.1 - inset);
    let east_goal = Goal::aabb(EAST_ROOM.0 + inset, EAST_ROOM.1 - inset);

    let mut positions = spawn_block(WEST_ROOM.0, WEST_ROOM.1, rng);
    positions.extend(spawn_block(EAST_ROOM.0, EAST_ROOM.1, rng));
    let goals = std::iter::repeat_n(east_goal, PER_SIDE)
        .chain(std::iter::repeat_n(west_goal, PER_SIDE))
        .collect();
    Ok((mesh, positions, goals))
}

/// A mesh from disk: crowds around the first and last node swap.
fn file_scenario(path: &str, rng: &mut SmallRng) -> Result<(NavMesh, Vec<Vector2>, Vec<Goal>)> {
    let mesh = nav_mesh::load_from_path(path).with_context(|| format!("loading {path}"))?;
    anyhow::ensure!(mesh.node_count() >= 2, "{path} needs at least two nodes");
    let first = mesh.node(NodeId(0)).center;
    let last = mesh.node(NodeId(mesh.node_count() as u32 - 1)).center;
    let half = Vector2::new(1.5, 1.5);

    let mut positions = spawn_block(first - half, first + half, rng);
    positions.extend(spawn_block(last - half, last + half, rng));
    let goals = std::iter::repeat_n(Goal::Circle { center: last, radius: 1.0 }, PER_SIDE)
        .chain(std::iter::repeat_n(Goal::Circle { center: first, radius: 1.0 }, PER_SIDE))
        .collect();
    Ok((mesh, positions, goals))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    fast_log::init(
        fast_log::config::Config::new()
            .console()
            .level(log::LevelFilter::Info),
    )?;

    let config = SimConfig {
        time_step:             TIME_STEP,
        total_ticks:           TOTAL_TICKS,
        seed:                  SEED,
        num_threads:           None, // all logical cores
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };
    let mut rng = SmallRng::seed_from_u64(config.seed);

    // 1. Floor plan, spawns, and goals.
    let (mesh, positions, goals) = match std::env::args().nth(1) {
        Some(path) => file_scenario(&path, &mut rng)?,
        None => corridor_scenario(&mut rng)?,
    };
    let mesh = Arc::new(mesh);
    println!("=== corridor: rust_nav crowd demo ===");
    println!(
        "Mesh: {} nodes, {} portals, {} obstacles  |  Agents: {}",
        mesh.node_count(),
        mesh.edge_count(),
        mesh.obstacle_count(),
        positions.len()
    );

    // 2. Agents.
    let (store, neighbors) = AgentStoreBuilder::new(positions.len())
        .params(AgentParams::default())
        .positions(positions)
        .build();

    // 3. Sim.
    let mut sim = SimBuilder::new(config, mesh, store, neighbors)
        .goals(goals.iter().copied().map(Some).collect())
        .build()?;

    // 4. Run.
    let mut obs = ArrivalReporter { goals, arrived: 0 };
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    obs.count(&sim.agents);
    let elapsed = t0.elapsed();
    log::logger().flush();

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("Arrived: {}/{}", obs.arrived, sim.agents.len());
    println!();
    println!("{:<8} {:>8} {:>8} {:>6}", "Agent", "x", "y", "Node");
    println!("{}", "-".repeat(33));
    for agent in &sim.agents.agents {
        let node = sim
            .localizer
            .node_of_agent(agent.id)
            .map_or_else(|| "-".to_string(), |n| n.0.to_string());
        println!("{:<8} {:>8.2} {:>8.2} {:>6}", agent.id.0, agent.pos.x, agent.pos.y, node);
    }

    Ok(())
}
