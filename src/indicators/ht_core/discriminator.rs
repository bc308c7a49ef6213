//! Homodyne discriminator: multiplies the smoothed phasor by its one-bar-delayed
//! conjugate and reads the instantaneous cycle period off the product's angle.

use super::transformer::HilbertOutput;

#[derive(Debug, Clone, Copy, Default)]
pub struct HomodyneDiscriminator {
    prev_i2: f64,
    prev_q2: f64,
    re: f64,
    im: f64,
}

impl HomodyneDiscriminator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one bar and returns the raw period estimate, or `None` when
    /// `Re` or `Im` is exactly zero (the caller keeps its previous period).
    #[inline]
    pub fn advance(&mut self, h: &HilbertOutput) -> Option<f64> {
        let q2 = 0.2 * (h.quadrature + h.j_i) + 0.8 * self.prev_q2;
        let i2 = 0.2 * (h.in_phase - h.j_q) + 0.8 * self.prev_i2;

        self.re = 0.2 * ((i2 * self.prev_i2) + (q2 * self.prev_q2)) + 0.8 * self.re;
        self.im = 0.2 * ((i2 * self.prev_q2) - (q2 * self.prev_i2)) + 0.8 * self.im;
        self.prev_q2 = q2;
        self.prev_i2 = i2;

        if self.im != 0.0 && self.re != 0.0 {
            Some(360.0 / (self.im / self.re).atan().to_degrees())
        } else {
            None
        }
    }

    #[inline]
    pub fn re(&self) -> f64 {
        self.re
    }

    #[inline]
    pub fn im(&self) -> f64 {
        self.im
    }
}
