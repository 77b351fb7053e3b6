//! ASCII navigation mesh loader.
//!
//! # Format
//!
//! Whitespace-separated tokens:
//!
//! ```text
//! <vertex count>
//!   x y                          (per vertex)
//! <edge count>
//!   v0 v1 n0 n1                  (per edge)
//! <obstacle count>
//!   v0 v1 node next              (per obstacle; next = -1 for none)
//! <group name> <node count>      (repeated until end of input)
//!   cx cy  n v0 … vn-1  A B C  e edge…  o obstacle…
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::SplitWhitespace;

use nav_core::{EdgeId, NodeId, ObstacleId, Vector2, VertexId};

use crate::builder::{NavMeshBuilder, NodeSpec};
use crate::error::{MeshError, MeshResult};
use crate::mesh::NavMesh;

/// Load and build a mesh from a `.nav` file.
pub fn load_from_path(path: impl AsRef<Path>) -> MeshResult<NavMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        log::error!("error opening navigation mesh file {}: {e}", path.display());
        e
    })?;
    let mesh = load_from_reader(file)?;
    log::info!("loaded navigation mesh from {}", path.display());
    Ok(mesh)
}

/// Load and build a mesh from any reader.
pub fn load_from_reader(mut reader: impl Read) -> MeshResult<NavMesh> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)?.build()
}

fn parse(text: &str) -> MeshResult<NavMeshBuilder> {
    let mut tok = Tokens { inner: text.split_whitespace() };

    let vert_count = tok.usize("vertex count")?;
    let mut b = NavMeshBuilder::new();
    for v in 0..vert_count {
        let x = tok.f32(|| format!("x of vertex {v}"))?;
        let y = tok.f32(|| format!("y of vertex {v}"))?;
        b.add_vertex(Vector2::new(x, y));
    }

    let edge_count = tok.usize("edge count")?;
    for e in 0..edge_count {
        let what = || format!("edge {e}");
        let v0 = VertexId(tok.u32(what)?);
        let v1 = VertexId(tok.u32(what)?);
        let n0 = NodeId(tok.u32(what)?);
        let n1 = NodeId(tok.u32(what)?);
        b.add_edge(v0, v1, n0, n1);
    }

    let obst_count = tok.usize("obstacle count")?;
    for o in 0..obst_count {
        let what = || format!("obstacle {o}");
        let v0 = VertexId(tok.u32(what)?);
        let v1 = VertexId(tok.u32(what)?);
        let node = NodeId(tok.u32(what)?);
        let next = tok.i64(what)?;
        let next = if next >= 0 {
            let next = u32::try_from(next)
                .map_err(|_| MeshError::Parse(format!("obstacle {o}: next index {next} too large")))?;
            Some(ObstacleId(next))
        } else {
            None
        };
        b.add_obstacle(v0, v1, node, next);
    }

    let mut node_idx = 0usize;
    while let Some(name) = tok.inner.next() {
        let count = tok.usize("node group size")?;
        // The count is unchecked input; the list grows as nodes parse.
        let mut specs = Vec::new();
        for _ in 0..count {
            specs.push(parse_node(&mut tok, node_idx)?);
            node_idx += 1;
        }
        b.add_group(name, specs)?;
    }
    Ok(b)
}

fn parse_node(tok: &mut Tokens<'_>, n: usize) -> MeshResult<NodeSpec> {
    let what = || format!("node {n}");
    let cx = tok.f32(what)?;
    let cy = tok.f32(what)?;

    let vcount = tok.usize_with(|| format!("vertex count of node {n}"))?;
    let vertices = (0..vcount)
        .map(|_| tok.u32(what).map(VertexId))
        .collect::<MeshResult<Vec<_>>>()?;
    let plane = [
        tok.f32(|| format!("plane of node {n}"))?,
        tok.f32(|| format!("plane of node {n}"))?,
        tok.f32(|| format!("plane of node {n}"))?,
    ];

    let ecount = tok.usize_with(|| format!("edge count of node {n}"))?;
    let edges = (0..ecount)
        .map(|_| tok.u32(what).map(EdgeId))
        .collect::<MeshResult<Vec<_>>>()?;

    let ocount = tok.usize_with(|| format!("obstacle count of node {n}"))?;
    let obstacles = (0..ocount)
        .map(|_| tok.u32(what).map(ObstacleId))
        .collect::<MeshResult<Vec<_>>>()?;

    Ok(NodeSpec { center: Vector2::new(cx, cy), vertices, plane, edges, obstacles })
}

// ── Tokenizer ─────────────────────────────────────────────────────────────────

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl Tokens<'_> {
    fn next_parsed<T: std::str::FromStr>(&mut self, what: impl Fn() -> String) -> MeshResult<T> {
        let Some(raw) = self.inner.next() else {
            let msg = format!("unexpected end of input reading {}", what());
            log::error!("error parsing navigation mesh: {msg}");
            return Err(MeshError::Parse(msg));
        };
        raw.parse().map_err(|_| {
            let msg = format!("bad token {raw:?} reading {}", what());
            log::error!("error parsing navigation mesh: {msg}");
            MeshError::Parse(msg)
        })
    }

    fn f32(&mut self, what: impl Fn() -> String) -> MeshResult<f32> {
        self.next_parsed(what)
    }

    fn u32(&mut self, what: impl Fn() -> String) -> MeshResult<u32> {
        self.next_parsed(what)
    }

    fn i64(&mut self, what: impl Fn() -> String) -> MeshResult<i64> {
        self.next_parsed(what)
    }

    fn usize(&mut self, what: &'static str) -> MeshResult<usize> {
        self.next_parsed(|| what.to_string())
    }

    fn usize_with(&mut self, what: impl Fn() -> String) -> MeshResult<usize> {
        self.next_parsed(what)
    }
}
