//! Leave-X-out row combinations.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{FitError, Result};

/// Combination counts above this switch the automatic choice to random draws
/// once the requested share of them is small.
const RANDOM_THRESHOLD: f64 = 1e5;

/// How combinations are produced when not all of them are wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinationStrategy {
    /// Pick ranks from the lexicographic enumeration (all of them if the
    /// count fits under the cap).
    Precomputed,
    /// Draw random subsets until enough distinct ones exist.
    Random,
}

/// `n` choose `k`, saturating at `u128::MAX`.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // exact: result * (n - i) is divisible by (i + 1)
        result = match result.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    result
}

/// Automatic strategy: random draws for huge enumerations of which only a
/// small share is requested, or for more than ten left-out rows.
pub fn choose_strategy(rows: usize, x: usize, max_steps: usize) -> CombinationStrategy {
    let total = binomial(rows, x) as f64;
    if (total > RANDOM_THRESHOLD && (max_steps as f64) / total < 0.75) || x > 10 {
        CombinationStrategy::Random
    } else {
        CombinationStrategy::Precomputed
    }
}

/// Combination of rank `rank` in the lexicographic order of `k`-subsets of
/// `0..n`.
fn unrank(n: usize, k: usize, mut rank: u128) -> Vec<usize> {
    let mut out = Vec::with_capacity(k);
    let mut next = 0;
    for slot in 0..k {
        let remaining = k - slot - 1;
        loop {
            let block = binomial(n - next - 1, remaining);
            if rank < block {
                break;
            }
            rank -= block;
            next += 1;
        }
        out.push(next);
        next += 1;
    }
    out
}

fn advance(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    for i in (0..k).rev() {
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Row subsets of size `x` taken from `rows`.
///
/// Without a cap, or when the cap is at least the total count, every
/// combination is returned in lexicographic order. Otherwise `cap` distinct
/// combinations are chosen with `strategy`. Each subset is sorted.
pub fn leave_x_out<R: Rng + ?Sized>(
    rows: &[usize],
    x: usize,
    cap: Option<usize>,
    strategy: CombinationStrategy,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>> {
    let n = rows.len();
    if x == 0 || x >= n {
        return Err(FitError::InvalidInput(format!(
            "cannot leave {} of {} rows out",
            x, n
        )));
    }
    let total = binomial(n, x);
    let wanted = match cap {
        Some(c) if (c as u128) < total => c,
        _ => {
            if total > usize::MAX as u128 {
                return Err(FitError::InvalidInput(format!(
                    "{} combinations cannot be enumerated",
                    total
                )));
            }
            let mut all = Vec::with_capacity(total as usize);
            let mut current: Vec<usize> = (0..x).collect();
            loop {
                all.push(current.iter().map(|&i| rows[i]).collect());
                if !advance(&mut current, n) {
                    break;
                }
            }
            return Ok(all);
        }
    };

    let picks: Vec<Vec<usize>> = match strategy {
        CombinationStrategy::Precomputed if total <= usize::MAX as u128 => {
            let mut ranks = index::sample(rng, total as usize, wanted).into_vec();
            ranks.sort_unstable();
            ranks
                .into_iter()
                .map(|rank| unrank(n, x, rank as u128))
                .collect()
        }
        _ => {
            let mut seen = HashSet::with_capacity(wanted);
            let mut picks = Vec::with_capacity(wanted);
            while picks.len() < wanted {
                let mut draw = index::sample(rng, n, x).into_vec();
                draw.sort_unstable();
                if seen.insert(draw.clone()) {
                    picks.push(draw);
                }
            }
            picks
        }
    };

    Ok(picks
        .into_iter()
        .map(|combo| combo.into_iter().map(|i| rows[i]).collect())
        .collect())
}
