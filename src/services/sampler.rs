// ============================================
// Random Variate Sampler
// ============================================
//
// Gamma sampling uses the Marsaglia-Tsang "squeeze" method; shape < 1 is
// handled by sampling Gamma(shape + 1) and applying the u^(1/shape) power
// correction. Normal variates come from a Box-Muller transform of two
// uniform draws. Beta(a, b) = X / (X + Y) with X ~ Gamma(a), Y ~ Gamma(b).
//
// Pure and stateless: each call only consumes entropy from the supplied
// uniform source. The rejection loop stops with probability 1 (geometric
// acceptance).

use rand::Rng;

/// Standard Normal draw via Box-Muller. Zero uniforms are rejected to keep
/// the logarithm finite.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u: f64 = 0.0;
    while u == 0.0 {
        u = rng.gen();
    }
    let mut v: f64 = 0.0;
    while v == 0.0 {
        v = rng.gen();
    }
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

/// Draw from Gamma(shape, 1).
///
/// `shape` must be positive; values arbitrarily close to zero are accepted.
/// A non-positive shape is an internal invariant violation (the stat store
/// floors alpha/beta above zero), so it is clamped rather than surfaced.
pub fn gamma_sample<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    debug_assert!(shape > 0.0, "gamma shape must be positive, got {}", shape);
    let shape = shape.max(f64::MIN_POSITIVE);

    if shape < 1.0 {
        let mut u: f64 = 0.0;
        while u == 0.0 {
            u = rng.gen();
        }
        return gamma_sample(rng, shape + 1.0) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    loop {
        let mut x;
        let mut v;
        loop {
            x = standard_normal(rng);
            v = 1.0 + c * x;
            if v > 0.0 {
                break;
            }
        }
        let v = v * v * v;
        let u: f64 = rng.gen();

        // Cheap squeeze first, exact log check second.
        if u < 1.0 - 0.0331 * (x * x) * (x * x) {
            return d * v;
        }
        if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// Draw from Beta(alpha, beta); the result lies in [0, 1].
pub fn beta_sample<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    let x = gamma_sample(rng, alpha);
    let y = gamma_sample(rng, beta);
    if x + y == 0.0 {
        // Both draws underflowed; either outcome is equally likely.
        return 0.5;
    }
    x / (x + y)
}
