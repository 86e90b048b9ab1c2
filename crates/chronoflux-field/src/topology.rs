// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Small-World Topology Builder
// ─────────────────────────────────────────────────────────────────────
//! Watts–Strogatz mesh construction: ring lattice with `k/2` clockwise
//! neighbours per node, then per-edge endpoint rewiring with probability
//! `rewire_prob`.
//!
//! The ring phase deduplicates unordered pairs; the rewiring phase does
//! not, so rewired meshes may contain parallel edges. That asymmetry is
//! part of the model's observed behaviour and is kept as-is — the
//! integrator treats every edge occurrence as a separate conductance
//! path.

use rand::Rng;
use serde::{Deserialize, Serialize};

use chronoflux_types::{IelError, IelResult};

/// Neighbour count `k` used when the caller does not pick one.
pub const DEFAULT_NEIGHBOURS: usize = 4;

/// Rewiring probability used when the caller does not pick one.
pub const DEFAULT_REWIRE_PROB: f64 = 0.1;

/// One directed-storage edge of the mesh.
///
/// `i`/`j` are array indices into the node list. Orientation is a
/// storage artefact: currents computed along `i → j` enter `j` with the
/// opposite sign, so the physics is orientation-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IelEdge {
    pub i: usize,
    pub j: usize,
    /// Coherence projection `a_ij`, unconstrained.
    pub a: f64,
    /// Conductance `g_ij`, fixed at construction.
    pub g: f64,
}

/// Build a small-world edge list over `n` nodes.
///
/// Requires `n > k`, `k >= 2`, and `rewire_prob ∈ [0, 1]`; anything else
/// is an [`IelError::Config`]. With `rewire_prob = 0` the result is a
/// pure ring lattice with exactly `n · k/2` edges and no duplicates;
/// a seeded `rng` makes the whole construction deterministic.
pub fn build_small_world<R: Rng>(
    n: usize,
    k: usize,
    rewire_prob: f64,
    rng: &mut R,
) -> IelResult<Vec<IelEdge>> {
    if k < 2 {
        return Err(IelError::Config(format!("neighbour count k must be >= 2, got {k}")));
    }
    if n <= k {
        return Err(IelError::Config(format!(
            "mesh needs more nodes than neighbours: n = {n}, k = {k}"
        )));
    }
    if !(0.0..=1.0).contains(&rewire_prob) {
        return Err(IelError::Config(format!(
            "rewire_prob must be in [0, 1], got {rewire_prob}"
        )));
    }

    // Ring lattice: k/2 clockwise neighbours, unordered-pair dedup.
    let mut edges: Vec<IelEdge> = Vec::with_capacity(n * k / 2);
    for i in 0..n {
        for offset in 1..=(k / 2) {
            let j = (i + offset) % n;
            let exists = edges
                .iter()
                .any(|e| (e.i == i && e.j == j) || (e.i == j && e.j == i));
            if !exists {
                edges.push(IelEdge { i, j, a: 0.0, g: 1.0 });
            }
        }
    }

    // Rewire each edge's far endpoint with probability rewire_prob.
    // No dedup here: a rewired edge may land on an existing pair.
    for edge in edges.iter_mut() {
        if rng.gen::<f64>() < rewire_prob {
            let mut j = rng.gen_range(0..n);
            while j == edge.i {
                j = rng.gen_range(0..n);
            }
            edge.j = j;
        }
    }

    Ok(edges)
}

/// Incidence index over a fixed edge list.
///
/// Built once after rewiring; the mesh never changes size afterwards,
/// so the index stays valid for the life of the integrator. It replaces
/// the per-step linear scans over the edge list without changing any
/// result: each edge occurrence still contributes separately, and a
/// "touching" edge (sharing either endpoint) is counted exactly once.
#[derive(Debug, Clone)]
pub struct Adjacency {
    /// `incident[v]` — indices of edges with `v` as either endpoint.
    pub incident: Vec<Vec<usize>>,
    /// `touching[e]` — indices of edges sharing an endpoint with `e`,
    /// including `e` itself.
    pub touching: Vec<Vec<usize>>,
}

impl Adjacency {
    pub fn build(n: usize, edges: &[IelEdge]) -> Self {
        let mut incident = vec![Vec::new(); n];
        for (idx, e) in edges.iter().enumerate() {
            incident[e.i].push(idx);
            incident[e.j].push(idx);
        }

        let mut touching = Vec::with_capacity(edges.len());
        for e in edges {
            let mut t: Vec<usize> = incident[e.i]
                .iter()
                .chain(incident[e.j].iter())
                .copied()
                .collect();
            t.sort_unstable();
            t.dedup();
            touching.push(t);
        }

        Self { incident, touching }
    }
}
