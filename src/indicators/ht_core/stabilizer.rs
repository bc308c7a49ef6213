//! Keeps the discriminator's raw period physically plausible.
//!
//! `period` feeds back into the Hilbert stages; `smooth_period` sizes the phase
//! estimator's window. The two are deliberately separate.

/// Shortest cycle the engine will report.
pub const MIN_PERIOD: f64 = 6.0;
/// Longest cycle the engine will report; also the smoothed-price ring capacity.
pub const MAX_PERIOD: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
pub struct PeriodStabilizer {
    period: f64,
    smooth_period: f64,
}

impl Default for PeriodStabilizer {
    fn default() -> Self {
        Self {
            period: MIN_PERIOD,
            smooth_period: MIN_PERIOD,
        }
    }
}

impl PeriodStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one raw estimate in. `None` repeats the previous period.
    #[inline]
    pub fn advance(&mut self, raw_period: Option<f64>) {
        let prev = self.period;
        let mut p = raw_period.unwrap_or(prev);

        let upper = 1.5 * prev;
        if p > upper {
            p = upper;
        }
        let lower = 0.67 * prev;
        if p < lower {
            p = lower;
        }
        if p < MIN_PERIOD {
            p = MIN_PERIOD;
        } else if p > MAX_PERIOD {
            p = MAX_PERIOD;
        }

        self.period = 0.2 * p + 0.8 * prev;
        self.smooth_period = 0.33 * self.period + 0.67 * self.smooth_period;
    }

    /// Stabilized period, fed back into the Hilbert stages.
    #[inline]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Doubly smoothed period, used to size the phase window.
    #[inline]
    pub fn smooth_period(&self) -> f64 {
        self.smooth_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_lower_bound() {
        let s = PeriodStabilizer::new();
        assert_eq!(s.period(), MIN_PERIOD);
        assert_eq!(s.smooth_period(), MIN_PERIOD);
    }

    #[test]
    fn test_growth_is_limited_per_bar() {
        let mut s = PeriodStabilizer::new();
        s.advance(Some(1000.0));
        // raw clamped to 1.5 * 6 = 9, then 0.2 * 9 + 0.8 * 6
        assert!((s.period() - 6.6).abs() < 1e-12);
        assert!((s.smooth_period() - (0.33 * 6.6 + 0.67 * 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_hard_bounds() {
        let mut s = PeriodStabilizer::new();
        for _ in 0..500 {
            s.advance(Some(1e9));
            assert!(s.period() <= MAX_PERIOD + 1e-9);
        }
        assert!((s.period() - MAX_PERIOD).abs() < 1e-6);
        for _ in 0..500 {
            s.advance(Some(-3.0));
            assert!(s.period() >= MIN_PERIOD - 1e-9);
            assert!(s.smooth_period() >= MIN_PERIOD - 1e-9);
        }
        assert!((s.smooth_period() - MIN_PERIOD).abs() < 1e-6);
    }

    #[test]
    fn test_missing_estimate_holds_period() {
        let mut s = PeriodStabilizer::new();
        for _ in 0..100 {
            s.advance(Some(20.0));
        }
        let before = s.period();
        s.advance(None);
        assert!((s.period() - before).abs() < 1e-12);
    }
}
