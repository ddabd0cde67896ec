//! One-dimensional parameter scans.
//!
//! A scan moves one parameter away from its fitted value in fixed increments,
//! holding it locked while the other free parameters are refitted, and
//! records the SSE at every position. It stops once the SSE stays above the
//! confidence ceiling or one of the step counters runs out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Model;
use crate::optimizer::Optimizer;
use crate::runner::CancellationToken;
use crate::statistics::StatisticVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Down => -1.0,
            Direction::Up => 1.0,
        }
    }
}

/// Step geometry of one scanned parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepPerturbation {
    pub index: usize,
    pub origin: f64,
    pub increment: f64,
}

impl StepPerturbation {
    /// Increment is `scaling · |origin|`, or `scaling` itself at zero.
    pub fn new(index: usize, origin: f64, scaling: f64) -> Self {
        let increment = if origin == 0.0 {
            scaling.abs()
        } else {
            (scaling * origin).abs()
        };
        Self {
            index,
            origin,
            increment,
        }
    }

    /// Value after `steps` increments in `direction`.
    pub fn position(&self, direction: Direction, steps: usize) -> f64 {
        self.origin + direction.sign() * steps as f64 * self.increment
    }
}

/// When a scan gives up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanLimits {
    pub max_steps: usize,
    /// SSE ceiling of the confidence region.
    pub max_error: f64,
    /// SSE of the unperturbed fit.
    pub fit_error: f64,
    /// Consecutive steps above the ceiling tolerated before stopping.
    pub overshoot: usize,
    /// Steps with an SSE below the fit tolerated before the fit is declared
    /// not to be at a minimum.
    pub error_decrease: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub value: f64,
    pub sse: f64,
    pub converged: bool,
    /// Full parameter vector, kept only for raw scans.
    pub parameters: Option<Vec<f64>>,
    pub statistics: Option<StatisticVector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStop {
    CeilingExceeded,
    StepLimit,
    NotAtMinimum,
    NonFinite,
    Interrupted,
}

/// Result of scanning one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub direction: Direction,
    pub points: Vec<ScanPoint>,
    /// Last position whose SSE stayed within the ceiling.
    pub bound: f64,
    pub stop: ScanStop,
}

impl ScanOutcome {
    /// The bound is only trustworthy if the ceiling was actually crossed.
    pub fn converged(&self) -> bool {
        self.stop == ScanStop::CeilingExceeded
    }
}

/// Counters that end a scan on a run of SSE values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounters {
    /// Consecutive steps above the ceiling.
    pub over: usize,
    /// Steps below the fit SSE so far.
    pub below_fit: usize,
}

impl StepCounters {
    /// Count one finite SSE and return the stop reason once a counter runs
    /// out. Dropping back under the ceiling resets the overshoot count.
    pub fn observe(&mut self, sse: f64, limits: &ScanLimits) -> Option<ScanStop> {
        if sse < limits.fit_error {
            self.below_fit += 1;
            if self.below_fit > limits.error_decrease {
                return Some(ScanStop::NotAtMinimum);
            }
        }
        if sse > limits.max_error {
            self.over += 1;
            if self.over > limits.overshoot {
                return Some(ScanStop::CeilingExceeded);
            }
        } else {
            self.over = 0;
        }
        None
    }
}

/// Scan one direction starting from the parameters of `base`.
///
/// `refit` is `None` when the other parameters should stay where the fit put
/// them; the inline locals are still re-derived at every step.
pub fn scan_direction(
    base: &dyn Model,
    perturbation: &StepPerturbation,
    direction: Direction,
    limits: &ScanLimits,
    refit: Option<&Optimizer>,
    store_raw: bool,
    cancel: &CancellationToken,
) -> ScanOutcome {
    let mut work = base.clone_model(false);
    work.core_mut().lock(perturbation.index, true);

    let mut points = Vec::new();
    let mut bound = perturbation.origin;
    let mut counters = StepCounters::default();
    let mut stop = ScanStop::StepLimit;

    for step in 1..=limits.max_steps {
        if cancel.is_cancelled() {
            stop = ScanStop::Interrupted;
            break;
        }

        let value = perturbation.position(direction, step);
        let mut start = work.parameters().to_vec();
        start[perturbation.index] = value;

        let (sse, converged) = match refit {
            Some(optimizer) => match optimizer.fit(work.as_mut(), &start) {
                Ok(report) => (report.sse, report.converged),
                Err(e) => {
                    debug!(step, error = %e, "scan refit failed");
                    (f64::NAN, false)
                }
            },
            None => {
                work.set_parameters(&start);
                work.calculate();
                (work.sse(), true)
            }
        };
        debug!(index = perturbation.index, ?direction, step, value, sse, "scan step");

        if !sse.is_finite() {
            stop = ScanStop::NonFinite;
            break;
        }

        points.push(ScanPoint {
            value,
            sse,
            converged,
            parameters: store_raw.then(|| work.parameters().to_vec()),
            statistics: if store_raw { work.statistics().cloned() } else { None },
        });

        if sse <= limits.max_error {
            bound = value;
        }
        if let Some(reason) = counters.observe(sse, limits) {
            stop = reason;
            break;
        }
    }

    ScanOutcome {
        direction,
        points,
        bound,
        stop,
    }
}
