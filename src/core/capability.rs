//! Capability evaluation - Cp, Cpk, sigma multiples, out-of-spec and DPMO
//!
//! Each output is computed independently. Whatever an output needs (a limit,
//! a positive sigma) decides whether it is `Some`; a missing input never
//! suppresses the other outputs.

use serde::Serialize;

/// Long-term mean drift, in sigmas, applied before counting defects
pub const DRIFT_SHIFT_SIGMA: f64 = 1.5;

/// Error function, Abramowitz & Stegun 7.1.26 (|error| ≤ 1.5e-7)
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function Φ(z)
pub fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return 0.5;
    }
    if z == f64::INFINITY {
        return 1.0;
    }
    if z == f64::NEG_INFINITY {
        return 0.0;
    }
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Capability outputs for one stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Capability {
    /// (USL − LSL) / 6σ; needs both limits
    pub cp: Option<f64>,

    /// Achieved Cpk; one-sided when only one limit is set
    pub cpk: Option<f64>,

    /// (USL − mean) / σ
    pub z_upper: Option<f64>,

    /// (mean − LSL) / σ
    pub z_lower: Option<f64>,

    /// Distance to the nearer limit in sigmas
    pub sigma_level: Option<f64>,

    /// Percent of parts outside the limits, no drift
    pub percent_out_of_spec: Option<f64>,

    /// Defects per million with the mean drifted toward the nearer limit
    pub dpmo: Option<f64>,

    /// The drifted mean used for DPMO
    pub shifted_mean: Option<f64>,
}

/// Evaluate process capability of the stack against its spec limits
pub fn evaluate(mean: f64, sigma: f64, lsl: Option<f64>, usl: Option<f64>) -> Capability {
    if !(sigma > 0.0 && sigma.is_finite()) || (lsl.is_none() && usl.is_none()) {
        return Capability::default();
    }

    let cp = match (lsl, usl) {
        (Some(l), Some(u)) => Some((u - l) / (6.0 * sigma)),
        _ => None,
    };

    let z_upper = usl.map(|u| (u - mean) / sigma);
    let z_lower = lsl.map(|l| (mean - l) / sigma);

    let sigma_level = match (z_upper, z_lower) {
        (Some(u), Some(l)) => Some(u.min(l)),
        (Some(z), None) | (None, Some(z)) => Some(z),
        (None, None) => None,
    };
    let cpk = sigma_level.map(|z| z / 3.0);

    let percent_out_of_spec = Some(out_of_spec_fraction(mean, sigma, lsl, usl) * 100.0);

    let shifted = shifted_mean(mean, sigma, lsl, usl);
    let dpmo = Some(out_of_spec_fraction(shifted, sigma, lsl, usl) * 1_000_000.0);

    Capability {
        cp,
        cpk,
        z_upper,
        z_lower,
        sigma_level,
        percent_out_of_spec,
        dpmo,
        shifted_mean: Some(shifted),
    }
}

/// Two-tail probability outside the limits; a missing limit has no tail
fn out_of_spec_fraction(mean: f64, sigma: f64, lsl: Option<f64>, usl: Option<f64>) -> f64 {
    let below = lsl.map(|l| normal_cdf((l - mean) / sigma)).unwrap_or(0.0);
    // Φ(-z) instead of 1 - Φ(z) keeps precision far out in the tail
    let above = usl.map(|u| normal_cdf((mean - u) / sigma)).unwrap_or(0.0);
    below + above
}

/// Drift the mean by 1.5σ toward the nearer limit
fn shifted_mean(mean: f64, sigma: f64, lsl: Option<f64>, usl: Option<f64>) -> f64 {
    let shift = DRIFT_SHIFT_SIGMA * sigma;
    match (lsl, usl) {
        (Some(l), Some(u)) => {
            if u - mean < mean - l {
                mean + shift
            } else {
                mean - shift
            }
        }
        (None, Some(_)) => mean + shift,
        _ => mean - shift,
    }
}
