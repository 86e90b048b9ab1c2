// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Metrics & Thought Export
// ─────────────────────────────────────────────────────────────────────
//! Aggregate observables over the current field state, and the thought
//! snapshot export for mesh consumers. Both are pure reads: unlike the
//! integration rules, the metrics evaluate the state as it stands now,
//! not a start-of-step snapshot.

use std::time::{SystemTime, UNIX_EPOCH};

use chronoflux_types::thought::round_to;
use chronoflux_types::{IelMetrics, IelResult, Thought, ThoughtFields, THOUGHT_SCHEMA};

use crate::integrator::{edge_flow, ChronoFluxIel};

impl ChronoFluxIel {
    /// Compute the three aggregate observables.
    ///
    /// - `h`: phase coherence `|Σ e^{iθ}| / N` ∈ [0, 1]
    /// - `tau`: mean absolute edge current, ≥ 0
    /// - `l`: mean love field ∈ [0, 1]
    pub fn compute_metrics(&self) -> IelMetrics {
        let n = self.nodes.len() as f64;

        let (sum_cos, sum_sin) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(c, s), node| (c + node.theta.cos(), s + node.theta.sin()));
        let h = ((sum_cos * sum_cos + sum_sin * sum_sin).sqrt() / n).clamp(0.0, 1.0);

        let phi: Vec<f64> = self.nodes.iter().map(|node| node.phi).collect();
        let q: Vec<f64> = self.nodes.iter().map(|node| node.q).collect();
        let heart: Vec<f64> = self.nodes.iter().map(|node| node.heart).collect();
        let tau = self
            .edges
            .iter()
            .map(|edge| edge_flow(&self.params, edge, &phi, &q, &heart).abs())
            .sum::<f64>()
            / self.edges.len() as f64;

        let l = heart.iter().sum::<f64>() / n;

        IelMetrics { h, tau, l }
    }

    /// Serialize the current state as a thought record (JSON bytes).
    ///
    /// Metrics are rounded to three decimals; `q`/`phi`/`theta` to two
    /// and `heart` to three. Rounding is the only loss — parsing the
    /// bytes back reproduces the rounded values exactly.
    pub fn export_thought(&self, topic: &str) -> IelResult<Vec<u8>> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let thought = Thought {
            kind: THOUGHT_SCHEMA.to_string(),
            ts,
            topic: topic.to_string(),
            metrics: self.compute_metrics().rounded(),
            fields: ThoughtFields {
                q: self.nodes.iter().map(|n| round_to(n.q, 2)).collect(),
                phi: self.nodes.iter().map(|n| round_to(n.phi, 2)).collect(),
                heart: self.nodes.iter().map(|n| round_to(n.heart, 3)).collect(),
                theta: self.nodes.iter().map(|n| round_to(n.theta, 2)).collect(),
            },
            time: self.time,
            links: Vec::new(),
        };
        thought.to_bytes()
    }
}
