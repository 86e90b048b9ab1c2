// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Perturbation Events
// ─────────────────────────────────────────────────────────────────────
//! Named perturbations that transiently alter parameters or node state.
//!
//! Timed events (`lion_gate`, `intent_pulse`) are countdown records the
//! integrator ticks at the end of every `step()`; when a countdown
//! expires the exact snapshotted prior values are written back. There
//! is one active slot per event kind: re-triggering an active event
//! refreshes its countdown instead of stacking a second application, so
//! overlapping calls can never corrupt the restore.
//!
//! `pacemaker_flip` is synchronous and immediate, with no restore.

use rand::Rng;

use chronoflux_types::{IelError, IelResult};

use crate::integrator::ChronoFluxIel;

/// Default lion-gate duration, in steps.
pub const DEFAULT_LION_GATE_STEPS: u32 = 100;

/// Steps an intent pulse stays applied before its source resets.
pub const DEFAULT_INTENT_PULSE_STEPS: u32 = 5;

/// Active lion gate: parameter snapshot plus remaining steps.
#[derive(Debug, Clone)]
pub(crate) struct LionGate {
    sigma_prev: f64,
    eta_prev: f64,
    eta_l_prev: f64,
    remaining: u32,
}

/// Active intent pulse: target node, parameter snapshot, remaining steps.
#[derive(Debug, Clone)]
pub(crate) struct IntentPulse {
    pub(crate) node: usize,
    beta_l_prev: f64,
    remaining: u32,
}

impl ChronoFluxIel {
    /// Open the lion gate for `duration_steps` steps: double `sigma`,
    /// halve `eta` and `eta_l`. The exact prior values come back when
    /// the countdown expires. Calling while a gate is already open only
    /// refreshes the countdown.
    pub fn lion_gate(&mut self, duration_steps: u32) {
        match self.gate.as_mut() {
            Some(gate) => {
                gate.remaining = duration_steps;
                log::debug!("lion gate refreshed for {duration_steps} steps");
            }
            None => {
                self.gate = Some(LionGate {
                    sigma_prev: self.params.sigma,
                    eta_prev: self.params.eta,
                    eta_l_prev: self.params.eta_l,
                    remaining: duration_steps,
                });
                self.params.sigma *= 2.0;
                self.params.eta *= 0.5;
                self.params.eta_l *= 0.5;
                log::info!("lion gate open for {duration_steps} steps");
            }
        }
    }

    /// Scramble the mesh: each node's phase advances by π/2 with
    /// probability 0.3, each edge's coherence is multiplied by -0.5
    /// with probability 0.2. Immediate, no restore. Draws from the
    /// engine RNG, so a seeded engine flips reproducibly.
    pub fn pacemaker_flip(&mut self) {
        let tau = std::f64::consts::TAU;
        let mut flipped_nodes = 0u32;
        for node in self.nodes.iter_mut() {
            if self.rng.gen::<f64>() < 0.3 {
                node.theta = (node.theta + std::f64::consts::FRAC_PI_2).rem_euclid(tau);
                flipped_nodes += 1;
            }
        }
        let mut flipped_edges = 0u32;
        for edge in self.edges.iter_mut() {
            if self.rng.gen::<f64>() < 0.2 {
                edge.a *= -0.5;
                flipped_edges += 1;
            }
        }
        log::info!("pacemaker flip: {flipped_nodes} phases shifted, {flipped_edges} coherences inverted");
    }

    /// Drive intent into one node: set its source `s` to `strength` and
    /// raise `beta_l` by 1.5×, both restored after
    /// [`DEFAULT_INTENT_PULSE_STEPS`] steps. A pulse while another is
    /// active refreshes the countdown and retargets the source (the
    /// previous node's source is zeroed); `beta_l` is not re-scaled.
    ///
    /// An out-of-range `node` is an [`IelError::OutOfRange`]; the mesh
    /// is left untouched.
    pub fn intent_pulse(&mut self, node: usize, strength: f64) -> IelResult<()> {
        let len = self.nodes.len();
        if node >= len {
            return Err(IelError::OutOfRange { index: node, len });
        }
        match self.pulse.as_mut() {
            Some(pulse) => {
                if pulse.node != node {
                    self.nodes[pulse.node].s = 0.0;
                    pulse.node = node;
                }
                pulse.remaining = DEFAULT_INTENT_PULSE_STEPS;
                self.nodes[node].s = strength;
                log::debug!("intent pulse retargeted to node {node}, strength {strength}");
            }
            None => {
                self.pulse = Some(IntentPulse {
                    node,
                    beta_l_prev: self.params.beta_l,
                    remaining: DEFAULT_INTENT_PULSE_STEPS,
                });
                self.params.beta_l *= 1.5;
                self.nodes[node].s = strength;
                log::info!("intent pulse at node {node}, strength {strength}");
            }
        }
        Ok(())
    }

    /// Whether a lion gate is currently applied.
    pub fn lion_gate_active(&self) -> bool {
        self.gate.is_some()
    }

    /// Target node of the active intent pulse, if any.
    pub fn intent_pulse_active(&self) -> Option<usize> {
        self.pulse.as_ref().map(|p| p.node)
    }

    /// Tick event countdowns; called once at the end of every step.
    pub(crate) fn tick_events(&mut self) {
        if let Some(mut gate) = self.gate.take() {
            if gate.remaining > 0 {
                gate.remaining -= 1;
            }
            if gate.remaining == 0 {
                self.params.sigma = gate.sigma_prev;
                self.params.eta = gate.eta_prev;
                self.params.eta_l = gate.eta_l_prev;
                log::info!("lion gate closed");
            } else {
                self.gate = Some(gate);
            }
        }
        if let Some(mut pulse) = self.pulse.take() {
            if pulse.remaining > 0 {
                pulse.remaining -= 1;
            }
            if pulse.remaining == 0 {
                self.nodes[pulse.node].s = 0.0;
                self.params.beta_l = pulse.beta_l_prev;
                log::info!("intent pulse at node {} expired", pulse.node);
            } else {
                self.pulse = Some(pulse);
            }
        }
    }
}
