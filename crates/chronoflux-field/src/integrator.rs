// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Field Integrator
// ─────────────────────────────────────────────────────────────────────
//! Explicit Euler integrator for the coupled IEL field equations:
//!
//!   dq/dt     = -div J + S - ρ·q + γ·♥             (intent)
//!   φ         = q                                   (potential, Poisson shortcut)
//!   da/dt     = -(φ_j - φ_i) - η·a + α·(ā - a) + β·(q_i + q_j)/2
//!   dθ/dt     = ω + K·Σ sin(θ_j - θ_i) + γ_φ·φ     (Kuramoto phase)
//!   d♥/dt     = -η_l·♥ + α_l·Δ♥ + β_l·q·♥          (love field)
//!
//! with the edge current
//!
//!   J_ij = g·(φ_i - φ_j) + σ·a - D·(q_i - q_j)
//!        + λ·((♥_i + ♥_j)/2)·(♥_i - ♥_j)
//!
//! Every right-hand side reads values snapshotted at the start of the
//! step; scratch arrays are pre-allocated so the hot path does not
//! allocate.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use chronoflux_types::{IelParameters, IelResult};

use crate::events::{IntentPulse, LionGate};
use crate::topology::{
    build_small_world, Adjacency, IelEdge, DEFAULT_NEIGHBOURS, DEFAULT_REWIRE_PROB,
};

/// Integration step size used when the caller does not pick one.
pub const DEFAULT_DT: f64 = 0.01;

/// One node of the mesh.
///
/// `q`, `phi`, `theta`, `heart` are the dynamic fields; `omega` is the
/// natural frequency fixed at construction; `s` is the external intent
/// source, zero except while an intent pulse is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IelNode {
    /// Intent density, clamped to [0, 10].
    pub q: f64,
    /// Scalar potential; re-derived as `q` each step.
    pub phi: f64,
    /// Local phase, wrapped into [0, 2π).
    pub theta: f64,
    /// Love field, clamped to [0, 1] plus the stability cap.
    pub heart: f64,
    /// Natural frequency, drawn as 1 ± 0.1 at construction.
    pub omega: f64,
    /// External intent source.
    pub s: f64,
}

/// The ChronoFlux-IEL field engine.
///
/// Owns the mesh, the parameter set, and a seeded RNG. `step()` is the
/// only integration entry point; randomness is consumed only at
/// construction and inside `pacemaker_flip`, so fixed topology + fixed
/// state + fixed `dt` always reproduce the same trajectory.
///
/// The instance is a single-threaded state machine: callers must
/// serialise all mutating calls (single-writer discipline). Dropping an
/// instance drops any pending event restore with it; no state leaks.
pub struct ChronoFluxIel {
    pub nodes: Vec<IelNode>,
    pub edges: Vec<IelEdge>,
    pub params: IelParameters,
    pub dt: f64,
    /// Simulation clock, advanced by `dt` per step.
    pub time: f64,

    adjacency: Adjacency,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) gate: Option<LionGate>,
    pub(crate) pulse: Option<IntentPulse>,

    // Pre-allocated step scratch (start-of-step snapshots + divergence)
    old_q: Vec<f64>,
    old_phi: Vec<f64>,
    old_theta: Vec<f64>,
    old_heart: Vec<f64>,
    old_a: Vec<f64>,
    div_j: Vec<f64>,
}

/// Current along one edge, oriented `i → j` as stored.
///
/// The same value enters the divergence of `i` with `+` and of `j`
/// with `-`, so storage orientation cancels out of the physics.
#[inline]
pub(crate) fn edge_flow(
    params: &IelParameters,
    edge: &IelEdge,
    phi: &[f64],
    q: &[f64],
    heart: &[f64],
) -> f64 {
    let (i, j) = (edge.i, edge.j);
    edge.g * (phi[i] - phi[j]) + params.sigma * edge.a - params.d * (q[i] - q[j])
        + params.lambda * 0.5 * (heart[i] + heart[j]) * (heart[i] - heart[j])
}

impl ChronoFluxIel {
    /// Build a mesh with an entropy seed (every construction differs).
    pub fn new(node_count: usize, params: IelParameters) -> IelResult<Self> {
        Self::seeded(node_count, params, rand::random::<u64>())
    }

    /// Build a mesh with the default small-world topology and a fixed
    /// seed. Same seed, same mesh, same trajectory.
    pub fn seeded(node_count: usize, params: IelParameters, seed: u64) -> IelResult<Self> {
        Self::with_topology(node_count, DEFAULT_NEIGHBOURS, DEFAULT_REWIRE_PROB, params, seed)
    }

    /// Build a mesh with explicit topology parameters.
    ///
    /// Node fields start as `q ∈ [0, 0.5)`, `phi = 0`, `theta ∈ [0, 2π)`,
    /// `heart ∈ [0.2, 0.5)`, `omega = 1 ± 0.1`, `s = 0`.
    pub fn with_topology(
        node_count: usize,
        k: usize,
        rewire_prob: f64,
        params: IelParameters,
        seed: u64,
    ) -> IelResult<Self> {
        params.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let nodes: Vec<IelNode> = (0..node_count)
            .map(|_| IelNode {
                q: rng.gen::<f64>() * 0.5,
                phi: 0.0,
                theta: rng.gen::<f64>() * std::f64::consts::TAU,
                heart: 0.2 + rng.gen::<f64>() * 0.3,
                omega: 1.0 + (rng.gen::<f64>() - 0.5) * 0.2,
                s: 0.0,
            })
            .collect();

        let edges = build_small_world(node_count, k, rewire_prob, &mut rng)?;
        let adjacency = Adjacency::build(node_count, &edges);
        let m = edges.len();

        Ok(Self {
            nodes,
            edges,
            params,
            dt: DEFAULT_DT,
            time: 0.0,
            adjacency,
            rng,
            gate: None,
            pulse: None,
            old_q: vec![0.0; node_count],
            old_phi: vec![0.0; node_count],
            old_theta: vec![0.0; node_count],
            old_heart: vec![0.0; node_count],
            old_a: vec![0.0; m],
            div_j: vec![0.0; node_count],
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Advance all fields by one Euler step of size `dt`.
    ///
    /// Update order: intent → potential → edge coherence → phase → love.
    /// The order is cosmetic — every rule reads the start-of-step
    /// snapshot, except that the love stability cap intentionally reads
    /// the intent value just written (it bounds the feedback the *next*
    /// step would amplify). Event countdowns tick after the integration,
    /// so an event spanning `n` steps affects exactly `n` of them.
    pub fn step(&mut self) {
        let n = self.nodes.len();
        let dt = self.dt;

        // Snapshot start-of-step state.
        for (i, node) in self.nodes.iter().enumerate() {
            self.old_q[i] = node.q;
            self.old_phi[i] = node.phi;
            self.old_theta[i] = node.theta;
            self.old_heart[i] = node.heart;
        }
        for (idx, edge) in self.edges.iter().enumerate() {
            self.old_a[idx] = edge.a;
        }

        // Divergence of the edge current at every node.
        {
            let params = &self.params;
            let (old_phi, old_q, old_heart) = (&self.old_phi, &self.old_q, &self.old_heart);
            let div = &mut self.div_j;
            div.iter_mut().for_each(|v| *v = 0.0);
            for edge in &self.edges {
                let flow = edge_flow(params, edge, old_phi, old_q, old_heart);
                div[edge.i] += flow;
                div[edge.j] -= flow;
            }
        }

        // Intent, then potential (φ = q).
        for i in 0..n {
            let dq = -self.div_j[i] + self.nodes[i].s - self.params.rho * self.old_q[i]
                + self.params.gamma * self.old_heart[i];
            let node = &mut self.nodes[i];
            node.q = (node.q + dt * dq).clamp(0.0, 10.0);
            node.phi = node.q;
        }

        // Edge coherence, relaxing toward the mean over touching edges.
        for idx in 0..self.edges.len() {
            let touching = &self.adjacency.touching[idx];
            let mean_a =
                touching.iter().map(|&t| self.old_a[t]).sum::<f64>() / touching.len() as f64;
            let (i, j) = (self.edges[idx].i, self.edges[idx].j);
            let da = -(self.old_phi[j] - self.old_phi[i]) - self.params.eta * self.old_a[idx]
                + self.params.alpha * (mean_a - self.old_a[idx])
                + self.params.beta * 0.5 * (self.old_q[i] + self.old_q[j]);
            self.edges[idx].a += dt * da;
        }

        // Kuramoto phase, wrapped into [0, 2π) by true modulo.
        for i in 0..n {
            let mut kuramoto = 0.0;
            for &eidx in &self.adjacency.incident[i] {
                let edge = &self.edges[eidx];
                let other = if edge.i == i { edge.j } else { edge.i };
                kuramoto += (self.old_theta[other] - self.old_theta[i]).sin();
            }
            let node = &mut self.nodes[i];
            let dtheta =
                node.omega + self.params.k * kuramoto + self.params.gamma_phi * self.old_phi[i];
            node.theta = (self.old_theta[i] + dt * dtheta).rem_euclid(std::f64::consts::TAU);
        }

        // Love field with Laplacian diffusion, clamp, then runaway cap.
        for i in 0..n {
            let mut laplacian = 0.0;
            for &eidx in &self.adjacency.incident[i] {
                let edge = &self.edges[eidx];
                let other = if edge.i == i { edge.j } else { edge.i };
                laplacian += self.old_heart[other] - self.old_heart[i];
            }
            let p = &self.params;
            let dheart = -p.eta_l * self.old_heart[i] + p.alpha_l * laplacian
                + p.beta_l * self.old_q[i] * self.old_heart[i];
            let node = &mut self.nodes[i];
            node.heart = (node.heart + dt * dheart).clamp(0.0, 1.0);
            // Avalanche cut-off: where β_l·q outruns η_l, the
            // self-amplification term has positive net growth and the
            // field is held at its fixed-point ceiling.
            if p.beta_l * node.q > p.eta_l {
                node.heart = node.heart.min(p.eta_l / (p.beta_l * node.q));
            }
        }

        self.time += dt;
        self.tick_events();
    }

    /// Run `n_steps` consecutive steps.
    pub fn run(&mut self, n_steps: u64) {
        for _ in 0..n_steps {
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn engine(n: usize, seed: u64) -> ChronoFluxIel {
        ChronoFluxIel::seeded(n, IelParameters::default(), seed).unwrap()
    }

    #[test]
    fn test_construction_initial_ranges() {
        let sim = engine(30, 1);
        assert_eq!(sim.node_count(), 30);
        for node in &sim.nodes {
            assert!((0.0..0.5).contains(&node.q));
            assert_eq!(node.phi, 0.0);
            assert!((0.0..TAU).contains(&node.theta));
            assert!((0.2..0.5).contains(&node.heart));
            assert!((0.9..=1.1).contains(&node.omega));
            assert_eq!(node.s, 0.0);
        }
    }

    #[test]
    fn test_default_topology_edge_count() {
        // k = 4 ring edges survive rewiring count-for-count.
        let sim = engine(20, 2);
        assert_eq!(sim.edge_count(), 40);
    }

    #[test]
    fn test_construction_rejects_tiny_mesh() {
        assert!(ChronoFluxIel::seeded(4, IelParameters::default(), 0).is_err());
    }

    #[test]
    fn test_construction_rejects_invalid_params() {
        let mut params = IelParameters::default();
        params.eta_l = -1.0;
        assert!(ChronoFluxIel::seeded(10, params, 0).is_err());
    }

    #[test]
    fn test_bounds_hold_over_long_run() {
        let mut sim = engine(20, 3);
        for _ in 0..500 {
            sim.step();
            for node in &sim.nodes {
                assert!((0.0..=10.0).contains(&node.q), "q={} escaped", node.q);
                assert!((0.0..=1.0).contains(&node.heart), "heart={} escaped", node.heart);
                assert!(
                    node.theta >= 0.0 && node.theta < TAU,
                    "theta={} escaped [0, 2π)",
                    node.theta
                );
            }
        }
    }

    #[test]
    fn test_potential_tracks_intent() {
        let mut sim = engine(15, 4);
        sim.run(10);
        for node in &sim.nodes {
            assert_eq!(node.phi, node.q);
        }
    }

    #[test]
    fn test_time_accumulates_by_dt() {
        let mut sim = engine(10, 5);
        sim.run(100);
        assert!((sim.time - 1.0).abs() < 1e-9, "time={}", sim.time);
    }

    #[test]
    fn test_step_is_deterministic() {
        let mut a = engine(25, 42);
        let mut b = engine(25, 42);
        assert_eq!(a.edges, b.edges, "seeded construction must match");
        for _ in 0..200 {
            a.step();
            b.step();
        }
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.edges, b.edges);
        assert_eq!(a.time, b.time);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = engine(25, 1);
        let b = engine(25, 2);
        assert_ne!(a.nodes, b.nodes);
    }

    #[test]
    fn test_love_stability_cap() {
        let mut params = IelParameters::default();
        params.beta_l = 0.5;
        params.eta_l = 0.05;
        let mut sim = ChronoFluxIel::seeded(10, params, 7).unwrap();
        for node in sim.nodes.iter_mut() {
            node.q = 5.0;
            node.phi = 5.0;
            node.heart = 0.9;
        }
        sim.step();
        let p = &sim.params;
        for (i, node) in sim.nodes.iter().enumerate() {
            if p.beta_l * node.q > p.eta_l {
                let cap = p.eta_l / (p.beta_l * node.q);
                assert!(
                    node.heart <= cap + 1e-12,
                    "node {i}: heart={} above cap={cap}",
                    node.heart
                );
            }
        }
    }

    #[test]
    fn test_synchronisation_with_strong_coupling() {
        // Identical frequencies, phases within a half-circle, strong K,
        // no potential drift: coherence must approach 1.
        let mut params = IelParameters::default();
        params.k = 5.0;
        params.gamma_phi = 0.0;
        let mut sim = ChronoFluxIel::with_topology(16, 4, 0.0, params, 0).unwrap();
        for (i, node) in sim.nodes.iter_mut().enumerate() {
            node.omega = 1.0;
            node.theta = 0.05 * i as f64;
        }
        sim.run(3000);
        let h = sim.compute_metrics().h;
        assert!(h > 0.99, "H={h} should approach 1 under strong coupling");
    }

    #[test]
    fn test_intent_pulse_scenario() {
        // A pulse at node 5 lifts its intent above the rest during the
        // pulse window; the surplus then decays once the source resets.
        let mut sim = engine(10, 9);
        for node in sim.nodes.iter_mut() {
            node.q = 0.2;
            node.phi = 0.2;
            node.heart = 0.3;
        }
        sim.intent_pulse(5, 8.0).unwrap();

        let mut peaked_above_rest = false;
        let mut peak_q5 = 0.0f64;
        for _ in 0..5 {
            sim.step();
            let q5 = sim.nodes[5].q;
            peak_q5 = peak_q5.max(q5);
            let max_other = sim
                .nodes
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != 5)
                .map(|(_, n)| n.q)
                .fold(f64::MIN, f64::max);
            if q5 > max_other {
                peaked_above_rest = true;
            }
        }
        assert!(peaked_above_rest, "pulsed node never led the mesh");
        assert!(sim.intent_pulse_active().is_none(), "pulse should have expired");
        assert_eq!(sim.nodes[5].s, 0.0);

        sim.run(45);
        assert!(
            sim.nodes[5].q < peak_q5,
            "q at node 5 should decay after the pulse: peak={peak_q5}, now={}",
            sim.nodes[5].q
        );
    }

    #[test]
    fn test_edge_flow_antisymmetric_in_fields() {
        // Swapping endpoint field values negates the g/D/λ terms.
        let params = IelParameters::default();
        let edge = IelEdge { i: 0, j: 1, a: 0.0, g: 1.0 };
        let f_ab = edge_flow(&params, &edge, &[2.0, 1.0], &[0.4, 0.1], &[0.8, 0.2]);
        let f_ba = edge_flow(&params, &edge, &[1.0, 2.0], &[0.1, 0.4], &[0.2, 0.8]);
        assert!((f_ab + f_ba).abs() < 1e-12, "f_ab={f_ab}, f_ba={f_ba}");
    }

    #[test]
    fn test_edge_flow_coherence_term() {
        // With all fields flat, only σ·a survives.
        let params = IelParameters::default();
        let edge = IelEdge { i: 0, j: 1, a: 2.0, g: 1.0 };
        let f = edge_flow(&params, &edge, &[0.5, 0.5], &[0.5, 0.5], &[0.3, 0.3]);
        assert!((f - params.sigma * 2.0).abs() < 1e-12);
    }
}
