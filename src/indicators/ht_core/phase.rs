//! Dominant-cycle phase: a one-cycle DFT over the most recent smoothed prices.

use super::stabilizer::MAX_PERIOD;
use std::f64::consts::TAU;

pub const PRICE_RING_CAPACITY: usize = MAX_PERIOD as usize;

/// Fixed ring of the last 50 values, newest tracked by `head`.
#[derive(Debug, Clone)]
pub struct PriceRing {
    slots: [f64; PRICE_RING_CAPACITY],
    /// Slot holding the newest value.
    head: usize,
    primed: bool,
}

impl Default for PriceRing {
    fn default() -> Self {
        Self {
            slots: [0.0; PRICE_RING_CAPACITY],
            head: PRICE_RING_CAPACITY - 1,
            primed: false,
        }
    }
}

impl PriceRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first value pushed fills every slot.
    #[inline]
    pub fn push(&mut self, value: f64) {
        if !self.primed {
            self.slots = [value; PRICE_RING_CAPACITY];
            self.primed = true;
        }
        self.head = if self.head == PRICE_RING_CAPACITY - 1 {
            0
        } else {
            self.head + 1
        };
        self.slots[self.head] = value;
    }

    #[inline]
    pub fn newest(&self) -> f64 {
        self.slots[self.head]
    }

    /// Up to `n` values, newest first. `n` is capped at the ring capacity.
    pub fn iter_newest(&self, n: usize) -> impl Iterator<Item = f64> + '_ {
        let n = n.min(PRICE_RING_CAPACITY);
        (0..n).map(move |i| {
            let idx = (self.head + PRICE_RING_CAPACITY - i) % PRICE_RING_CAPACITY;
            self.slots[idx]
        })
    }
}

/// Real and imaginary sums of the DFT at the dominant-cycle frequency.
#[inline]
pub fn cycle_dft(ring: &PriceRing, dc_period_int: usize) -> (f64, f64) {
    let mut real_part = 0.0;
    let mut imag_part = 0.0;
    if dc_period_int == 0 {
        return (real_part, imag_part);
    }
    let n = dc_period_int as f64;
    for (i, price) in ring.iter_newest(dc_period_int).enumerate() {
        let angle = (i as f64 * TAU) / n;
        real_part += angle.sin() * price;
        imag_part += angle.cos() * price;
    }
    (real_part, imag_part)
}

#[derive(Debug, Clone, Default)]
pub struct PhaseEstimator {
    ring: PriceRing,
    phase: f64,
}

impl PhaseEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes this bar's smoothed price and returns `(dc_period_int, phase)`,
    /// phase in degrees within `(-45, 315]`.
    pub fn advance(&mut self, smoothed_price: f64, smooth_period: f64) -> (usize, f64) {
        self.ring.push(smoothed_price);

        let dc_period_int = (smooth_period + 0.5) as usize;
        let (real_part, imag_part) = cycle_dft(&self.ring, dc_period_int);

        let mut phase = self.phase;
        if imag_part.abs() > 0.0 {
            phase = (real_part / imag_part).atan().to_degrees();
        } else if imag_part.abs() <= 0.01 {
            tracing::trace!(real_part, phase, "ht_core: zero imaginary part, nudging phase");
            if real_part < 0.0 {
                phase -= 90.0;
            } else if real_part > 0.0 {
                phase += 90.0;
            }
        }
        phase += 90.0;
        phase += 360.0 / smooth_period;
        if imag_part < 0.0 {
            phase += 180.0;
        }
        if phase > 315.0 {
            phase -= 360.0;
        }

        self.phase = phase;
        (dc_period_int, phase)
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    #[inline]
    pub fn ring(&self) -> &PriceRing {
        &self.ring
    }
}
