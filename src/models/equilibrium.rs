//! Species concentrations of host-guest equilibria.

/// Concentration of the 1:1 complex HG for total host `host`, total guest
/// `guest` and association constant `k`.
///
/// Smaller root of `k·x² − (k·H₀ + k·G₀ + 1)·x + k·H₀·G₀ = 0`, written in the
/// cancellation-free form `2c / (−b + √disc)`.
pub fn one_to_one_complex(host: f64, guest: f64, k: f64) -> f64 {
    if host <= 0.0 || guest <= 0.0 {
        return 0.0;
    }
    let minus_b = k * host + k * guest + 1.0;
    let c = k * host * guest;
    let disc = (k * (host - guest)).powi(2) + 2.0 * k * (host + guest) + 1.0;
    2.0 * c / (minus_b + disc.sqrt())
}

/// Free host, HG and HG₂ for the stepwise constants `k11` and `k12`.
///
/// Solves the guest mass balance
/// `g + H₀·(K₁₁g + 2β g²)/(1 + K₁₁g + β g²) = G₀` with `β = K₁₁·K₁₂` for the
/// free guest `g ∈ [0, G₀]` by Newton iteration safeguarded with bisection.
pub fn one_to_two_species(host: f64, guest: f64, k11: f64, k12: f64) -> (f64, f64, f64) {
    if host <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    if guest <= 0.0 {
        return (host, 0.0, 0.0);
    }
    let beta = k11 * k12;
    let balance = |g: f64| {
        let d = 1.0 + k11 * g + beta * g * g;
        let f = g + host * (k11 * g + 2.0 * beta * g * g) / d - guest;
        let n = k11 * g + 2.0 * beta * g * g;
        let dn = k11 + 4.0 * beta * g;
        let dd = k11 + 2.0 * beta * g;
        let df = 1.0 + host * (dn * d - n * dd) / (d * d);
        (f, df)
    };

    let (mut lo, mut hi) = (0.0, guest);
    let mut g = guest / 2.0;
    for _ in 0..200 {
        let (f, df) = balance(g);
        if f.abs() <= 1e-15 * guest {
            break;
        }
        if f > 0.0 {
            hi = g;
        } else {
            lo = g;
        }
        let newton = g - f / df;
        g = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        if hi - lo <= 1e-16 * guest {
            break;
        }
    }

    let free_host = host / (1.0 + k11 * g + beta * g * g);
    (free_host, k11 * free_host * g, beta * free_host * g * g)
}
