// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Field Kernel
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! ChronoFlux-IEL field kernel: coupled intent/coherence/phase/love
//! dynamics over a small-world node mesh.
//!
//! Four scalar fields live on the mesh — intent density `q`, scalar
//! potential `phi`, local phase `theta`, and the love field `heart` —
//! plus a per-edge coherence projection `a`. [`ChronoFluxIel::step`]
//! advances all of them by one explicit Euler step; every right-hand
//! side reads values snapshotted at the start of the step, so the
//! update order carries no bias.
//!
//! Architecture:
//!   - `topology`: Watts–Strogatz small-world builder + adjacency index
//!   - `integrator`: node/edge state and the Euler step
//!   - `events`: countdown-based perturbations (lion gate, pacemaker
//!     flip, intent pulse)
//!   - `metrics`: coherence/turbulence/love observables and thought
//!     snapshot export
//!
//! # Concurrency
//!
//! One [`ChronoFluxIel`] instance is a plain single-threaded state
//! machine: all mutating calls on an instance must be serialised by the
//! caller (single-writer discipline). Independent instances share no
//! state and may run on separate threads freely.

pub mod events;
pub mod integrator;
pub mod metrics;
pub mod topology;

pub use events::{DEFAULT_INTENT_PULSE_STEPS, DEFAULT_LION_GATE_STEPS};
pub use integrator::{ChronoFluxIel, IelNode, DEFAULT_DT};
pub use topology::{build_small_world, Adjacency, IelEdge, DEFAULT_NEIGHBOURS, DEFAULT_REWIRE_PROB};
