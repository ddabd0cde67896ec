//! Resampling primitives shared by the statistical jobs.
//!
//! - [`noise`]: Gaussian or bootstrap perturbation of a dependent table
//! - [`masking`]: leave-X-out row combinations
//! - [`perturbation`]: one-dimensional parameter scans with refits
//!
//! Randomness comes from ChaCha8 streams keyed by the job seed, one stream
//! per trial index, so results do not depend on which worker ran a trial.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod masking;
pub mod noise;
pub mod perturbation;

pub use masking::{binomial, choose_strategy, leave_x_out, CombinationStrategy};
pub use noise::{inject_bootstrap, inject_gaussian};
pub use perturbation::{
    scan_direction, Direction, ScanLimits, ScanOutcome, ScanPoint, ScanStop, StepCounters,
    StepPerturbation,
};

/// Stream reserved for job-level draws (e.g. choosing combinations).
const JOB_STREAM: u64 = u64::MAX;

/// Generator of trial `index` in the job seeded with `seed`.
pub fn trial_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Generator for job-level draws that never collides with a trial stream.
pub fn job_rng(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(JOB_STREAM);
    rng
}
