// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Metrics and Thought Snapshot Records
// ─────────────────────────────────────────────────────────────────────
//! Aggregate metric triple and the "thought" snapshot record the kernel
//! exports for downstream mesh consumers. The wire format is JSON; the
//! record carries the schema tag [`THOUGHT_SCHEMA`] so consumers can
//! reject incompatible revisions.

use serde::{Deserialize, Serialize};

use crate::error::{IelError, IelResult};

/// Schema tag stamped on every exported thought record.
pub const THOUGHT_SCHEMA: &str = "thought/v1";

/// Round to `decimals` places. Snapshot export is the only lossy step in
/// the kernel, and this is the loss.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The three aggregate observables of the field state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IelMetrics {
    /// Phase coherence `|Σ e^{iθ}| / N` ∈ [0, 1]; 1 = perfect sync.
    pub h: f64,
    /// Turbulence: mean absolute edge current, ≥ 0.
    pub tau: f64,
    /// Love power: mean love field ∈ [0, 1].
    pub l: f64,
}

impl IelMetrics {
    /// Copy with each component rounded to three decimals (the snapshot
    /// precision).
    pub fn rounded(&self) -> Self {
        Self {
            h: round_to(self.h, 3),
            tau: round_to(self.tau, 3),
            l: round_to(self.l, 3),
        }
    }

    /// Band the metrics into a qualitative regime read-out.
    pub fn classify(&self) -> RegimeSummary {
        RegimeSummary {
            phase: if self.h > 0.7 {
                PhaseRegime::Synchronised
            } else if self.h < 0.3 {
                PhaseRegime::Chaotic
            } else {
                PhaseRegime::Mixed
            },
            flow: if self.tau < 0.2 {
                FlowRegime::Smooth
            } else {
                FlowRegime::Turbulent
            },
            love: if self.l > 0.6 {
                LoveRegime::Harmonious
            } else {
                LoveRegime::Depleted
            },
        }
    }
}

/// Qualitative phase-coherence band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseRegime {
    /// H > 0.7 — the mesh is synchronised.
    Synchronised,
    /// 0.3 ≤ H ≤ 0.7.
    Mixed,
    /// H < 0.3 — phases are scattered.
    Chaotic,
}

/// Qualitative turbulence band (threshold τ = 0.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowRegime {
    Smooth,
    Turbulent,
}

/// Qualitative love-power band (threshold L = 0.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoveRegime {
    Harmonious,
    Depleted,
}

/// Regime read-out across all three metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeSummary {
    pub phase: PhaseRegime,
    pub flow: FlowRegime,
    pub love: LoveRegime,
}

/// Per-node field arrays carried by a thought record.
///
/// `q`, `phi`, `theta` are rounded to two decimals, `heart` to three —
/// the love field lives in [0, 1] and needs the extra digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtFields {
    pub q: Vec<f64>,
    pub phi: Vec<f64>,
    pub heart: Vec<f64>,
    pub theta: Vec<f64>,
}

/// One exported field-state snapshot.
///
/// Records chain into a history through `links`, which holds references
/// (identifiers chosen by the mesh layer) to prior thoughts; the kernel
/// always emits it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    /// Schema tag, always [`THOUGHT_SCHEMA`] for records we emit.
    #[serde(rename = "type")]
    pub kind: String,
    /// Wall-clock timestamp, unix milliseconds.
    pub ts: u64,
    /// Caller-supplied topic string.
    pub topic: String,
    /// Metrics rounded to three decimals.
    pub metrics: IelMetrics,
    pub fields: ThoughtFields,
    /// Simulation clock at export.
    pub time: f64,
    pub links: Vec<String>,
}

impl Thought {
    /// Serialize to the JSON wire form.
    pub fn to_bytes(&self) -> IelResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| IelError::Snapshot(format!("encode: {e}")))
    }

    /// Parse a record previously produced by [`Thought::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> IelResult<Self> {
        let thought: Self = serde_json::from_slice(bytes)
            .map_err(|e| IelError::Snapshot(format!("decode: {e}")))?;
        if thought.kind != THOUGHT_SCHEMA {
            return Err(IelError::Snapshot(format!(
                "unknown schema tag {:?}, expected {THOUGHT_SCHEMA:?}",
                thought.kind
            )));
        }
        Ok(thought)
    }
}
