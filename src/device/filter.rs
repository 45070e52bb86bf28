//! Digital filter sections and the zero-phase application helper.
//!
//! Band limits are realized as cascaded second-order (biquad) sections with
//! RBJ cookbook coefficients; very low high-pass cutoffs use a first-order
//! section instead, which behaves better near DC at these corner
//! frequencies. Every section is applied forward-then-backward (filtfilt) so
//! fiducial timing survives filtering without phase distortion.

use crate::types::{Hertz, Real};

/// A filter section that can run over a buffer with fresh state.
pub trait Filter {
    /// Runs the section over `input`, returning the filtered sequence.
    fn run(&self, input: &[Real]) -> Vec<Real>;
}

/// Second-order IIR section, normalized so `a0 = 1`.
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: Real,
    b1: Real,
    b2: Real,
    a1: Real,
    a2: Real,
}

impl Biquad {
    /// Butterworth-style Q for a single second-order section.
    pub const BUTTERWORTH_Q: Real = std::f64::consts::FRAC_1_SQRT_2;

    fn from_rbj(b0: Real, b1: Real, b2: Real, a0: Real, a1: Real, a2: Real) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Low-pass section with cutoff `fc`.
    #[must_use]
    pub fn lowpass(fs: Hertz, fc: Hertz, q: Real) -> Self {
        let w = std::f64::consts::TAU * fc / fs;
        let (sin_w, cos_w) = w.sin_cos();
        let alpha = sin_w / (2.0 * q);
        Self::from_rbj(
            (1.0 - cos_w) / 2.0,
            1.0 - cos_w,
            (1.0 - cos_w) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// High-pass section with cutoff `fc`.
    #[must_use]
    pub fn highpass(fs: Hertz, fc: Hertz, q: Real) -> Self {
        let w = std::f64::consts::TAU * fc / fs;
        let (sin_w, cos_w) = w.sin_cos();
        let alpha = sin_w / (2.0 * q);
        Self::from_rbj(
            (1.0 + cos_w) / 2.0,
            -(1.0 + cos_w),
            (1.0 + cos_w) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// Notch section centered on `fc`.
    #[must_use]
    pub fn notch(fs: Hertz, fc: Hertz, q: Real) -> Self {
        let w = std::f64::consts::TAU * fc / fs;
        let (sin_w, cos_w) = w.sin_cos();
        let alpha = sin_w / (2.0 * q);
        Self::from_rbj(
            1.0,
            -2.0 * cos_w,
            1.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }
}

impl Filter for Biquad {
    fn run(&self, input: &[Real]) -> Vec<Real> {
        // Direct form II transposed.
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        let mut out = Vec::with_capacity(input.len());
        for &x in input {
            let y = self.b0 * x + s1;
            s1 = self.b1 * x - self.a1 * y + s2;
            s2 = self.b2 * x - self.a2 * y;
            out.push(y);
        }
        out
    }
}

/// One-pole section used for very low high-pass corners.
#[derive(Debug, Clone, Copy)]
pub struct FirstOrder {
    alpha: Real,
    highpass: bool,
}

impl FirstOrder {
    /// First-order high-pass (RC) with cutoff `fc`.
    #[must_use]
    pub fn highpass(fs: Hertz, fc: Hertz) -> Self {
        let rc = 1.0 / (std::f64::consts::TAU * fc);
        let dt = 1.0 / fs;
        Self {
            alpha: rc / (rc + dt),
            highpass: true,
        }
    }

    /// First-order low-pass (RC) with cutoff `fc`.
    #[must_use]
    pub fn lowpass(fs: Hertz, fc: Hertz) -> Self {
        let rc = 1.0 / (std::f64::consts::TAU * fc);
        let dt = 1.0 / fs;
        Self {
            alpha: dt / (rc + dt),
            highpass: false,
        }
    }
}

impl Filter for FirstOrder {
    fn run(&self, input: &[Real]) -> Vec<Real> {
        let mut out = Vec::with_capacity(input.len());
        if self.highpass {
            let mut y_prev = 0.0;
            let mut x_prev = input.first().copied().unwrap_or_default();
            for &x in input {
                let y = self.alpha * (y_prev + x - x_prev);
                out.push(y);
                y_prev = y;
                x_prev = x;
            }
        } else {
            let mut y = input.first().copied().unwrap_or_default();
            for &x in input {
                y += self.alpha * (x - y);
                out.push(y);
            }
        }
        out
    }
}

/// Zero-phase application: forward pass, then a second pass over the
/// reversed sequence.
#[must_use]
pub fn filtfilt<F: Filter>(section: &F, input: &[Real]) -> Vec<Real> {
    let mut forward = section.run(input);
    forward.reverse();
    let mut backward = section.run(&forward);
    backward.reverse();
    backward
}

/// Decimates by an integer factor, keeping every `factor`-th sample.
///
/// The caller is responsible for anti-alias filtering beforehand.
#[must_use]
pub fn decimate(input: &[Real], factor: usize) -> Vec<Real> {
    if factor <= 1 {
        return input.to_vec();
    }
    input.iter().step_by(factor).copied().collect()
}
