// ─────────────────────────────────────────────────────────────────────
// ChronoFlux-IEL — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all ChronoFlux-IEL kernel failures.
///
/// Every variant is local, synchronous, and recoverable: the caller may
/// skip the offending call and keep stepping the simulation.
#[derive(Error, Debug)]
pub enum IelError {
    /// Invalid parameter set or topology request.
    #[error("config error: {0}")]
    Config(String),

    /// A perturbation targeted a node index outside the mesh.
    #[error("node index {index} out of range (mesh has {len} nodes)")]
    OutOfRange { index: usize, len: usize },

    /// Snapshot encode/decode failed.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

pub type IelResult<T> = Result<T, IelError>;
