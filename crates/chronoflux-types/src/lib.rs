// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Kernel Types
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, parameterisation, and error hierarchy for the
//! ChronoFlux-IEL field kernel — the coupled intent/coherence/phase/love
//! dynamics engine over a small-world node mesh.

pub mod config;
pub mod error;
pub mod thought;

pub use config::IelParameters;
pub use error::{IelError, IelResult};
pub use thought::{
    FlowRegime, IelMetrics, LoveRegime, PhaseRegime, RegimeSummary, Thought, ThoughtFields,
    THOUGHT_SCHEMA,
};
