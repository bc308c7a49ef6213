//! 4-tap weighted moving average that de-noises price before the Hilbert stages.

/// `(4·p0 + 3·p1 + 2·p2 + p3) / 10`, newest price first.
#[inline(always)]
pub fn smooth_price(p0: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    (4.0 * p0 + 3.0 * p1 + 2.0 * p2 + p3) / 10.0
}

#[derive(Debug, Clone, Default)]
pub struct PriceSmoother {
    /// Previous three raw prices, newest first.
    history: [f64; 3],
    filled: usize,
}

impl PriceSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes one raw price. Returns `None` until three earlier prices are held.
    #[inline]
    pub fn next(&mut self, price: f64) -> Option<f64> {
        let [p1, p2, p3] = self.history;
        self.history = [price, p1, p2];
        if self.filled < 3 {
            self.filled += 1;
            return None;
        }
        Some(smooth_price(price, p1, p2, p3))
    }

    #[inline]
    pub fn is_primed(&self) -> bool {
        self.filled == 3
    }
}
