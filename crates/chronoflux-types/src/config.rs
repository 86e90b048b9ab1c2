// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Field Parameters
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{IelError, IelResult};

/// Coupling and decay coefficients for the IEL field equations.
///
/// The struct is a plain bag of reals: it is cloned into the integrator
/// at construction and mutated only by perturbation events (which
/// restore their exact prior values on expiry). JSON overrides are
/// merged over `Default` field by field, so a partial document such as
/// `{"k": 5.0}` is a valid parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IelParameters {
    /// Intent mobility. Accepted for compatibility; the discrete update
    /// rules do not currently reference it.
    pub mu: f64,

    /// Coherence contribution to edge current.
    /// Default: 0.5.
    pub sigma: f64,

    /// Vortex coefficient. Accepted for compatibility; the discrete
    /// update rules do not currently reference it.
    pub kappa: f64,

    /// Intent diffusion along edges.
    /// Default: 0.1.
    pub d: f64,

    /// Love-gradient contribution to edge current.
    /// Default: 0.3.
    pub lambda: f64,

    /// Intent generation from the love field.
    /// Default: 0.2.
    pub gamma: f64,

    /// Intent decay rate.
    /// Default: 0.05.
    pub rho: f64,

    /// Edge-coherence decay rate.
    /// Default: 0.1.
    pub eta: f64,

    /// Edge-coherence diffusion toward the local mean.
    /// Default: 0.05.
    pub alpha: f64,

    /// Edge-coherence generation from endpoint intent.
    /// Default: 0.3.
    pub beta: f64,

    /// Love-field decay rate.
    /// Default: 0.1.
    pub eta_l: f64,

    /// Love-field diffusion (graph Laplacian weight).
    /// Default: 0.05.
    pub alpha_l: f64,

    /// Love self-amplification from intent. The integrator caps the
    /// love field at `eta_l / (beta_l · q)` whenever `beta_l · q`
    /// exceeds `eta_l`, which keeps this feedback term from blowing up.
    /// Default: 0.2.
    pub beta_l: f64,

    /// Kuramoto phase-coupling strength.
    /// Default: 2.0.
    pub k: f64,

    /// Phase drift from the scalar potential.
    /// Default: 0.1.
    pub gamma_phi: f64,
}

impl Default for IelParameters {
    fn default() -> Self {
        Self {
            mu: 1.0,
            sigma: 0.5,
            kappa: 0.1,
            d: 0.1,
            lambda: 0.3,
            gamma: 0.2,
            rho: 0.05,
            eta: 0.1,
            alpha: 0.05,
            beta: 0.3,
            eta_l: 0.1,
            alpha_l: 0.05,
            beta_l: 0.2,
            k: 2.0,
            gamma_phi: 0.1,
        }
    }
}

impl IelParameters {
    /// Validate the parameter set.
    ///
    /// Every coefficient must be finite; decay and diffusion rates must
    /// be non-negative (a negative decay inverts the damping terms and
    /// the clamps become the only thing holding the fields together).
    pub fn validate(&self) -> IelResult<()> {
        let fields = [
            ("mu", self.mu),
            ("sigma", self.sigma),
            ("kappa", self.kappa),
            ("d", self.d),
            ("lambda", self.lambda),
            ("gamma", self.gamma),
            ("rho", self.rho),
            ("eta", self.eta),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("eta_l", self.eta_l),
            ("alpha_l", self.alpha_l),
            ("beta_l", self.beta_l),
            ("k", self.k),
            ("gamma_phi", self.gamma_phi),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(IelError::Config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        let non_negative = [
            ("d", self.d),
            ("rho", self.rho),
            ("eta", self.eta),
            ("alpha", self.alpha),
            ("eta_l", self.eta_l),
            ("alpha_l", self.alpha_l),
            ("beta_l", self.beta_l),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(IelError::Config(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Load from a JSON document, merging partial overrides over defaults.
    pub fn from_json(json: &str) -> IelResult<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| IelError::Config(format!("JSON parse error: {e}")))?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(IelParameters::default().validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let p = IelParameters::default();
        assert_eq!(p.sigma, 0.5);
        assert_eq!(p.rho, 0.05);
        assert_eq!(p.beta_l, 0.2);
        assert_eq!(p.k, 2.0);
    }

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let p = IelParameters::from_json(r#"{"k": 5.0, "eta_l": 0.2}"#).unwrap();
        assert_eq!(p.k, 5.0);
        assert_eq!(p.eta_l, 0.2);
        // Untouched fields keep their defaults
        assert_eq!(p.sigma, 0.5);
        assert_eq!(p.gamma_phi, 0.1);
    }

    #[test]
    fn test_empty_json_is_defaults() {
        let p = IelParameters::from_json("{}").unwrap();
        assert_eq!(p.beta, IelParameters::default().beta);
    }

    #[test]
    fn test_negative_decay_rejected() {
        let mut p = IelParameters::default();
        p.rho = -0.1;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut p = IelParameters::default();
        p.k = f64::NAN;
        assert!(p.validate().is_err());
        p.k = f64::INFINITY;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(IelParameters::from_json("{not json").is_err());
    }
}
