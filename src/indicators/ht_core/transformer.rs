//! Hilbert transformer: four identically shaped FIR stages run on alternating
//! bar parity.
//!
//! Each stage evaluates
//!
//! ```text
//! out[t] = (a·in[t] + b·in[t-2] - b·in[t-4] - a·in[t-6]) · (0.075·period + 0.54)
//! ```
//!
//! where the taps `t-2, t-4, t-6` are the three previous inputs of the *same*
//! parity. Every stage therefore keeps an even-bar and an odd-bar history and
//! advances only the one matching the current bar.

pub const HILBERT_A: f64 = 0.0962;
pub const HILBERT_B: f64 = 0.5769;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[inline(always)]
    pub fn of(bar: usize) -> Self {
        if bar % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    #[inline(always)]
    pub fn flip(self) -> Self {
        match self {
            Parity::Even => Parity::Odd,
            Parity::Odd => Parity::Even,
        }
    }
}

/// Same-parity history of one stage.
///
/// `taps` rotates the `a`-weighted inputs of the last three same-parity bars,
/// `prev_input` is the previous same-parity input and `prev` its `b`-weighted
/// value, which together supply the `b·in[t-2] - b·in[t-4]` pair.
#[derive(Debug, Clone, Default)]
pub struct ParityHistory {
    taps: [f64; 3],
    idx: usize,
    prev: f64,
    prev_input: f64,
    primed: bool,
    #[cfg(test)]
    advances: usize,
}

impl ParityHistory {
    /// Fills the history as if `input` had been the stage input forever.
    fn seed(&mut self, input: f64) {
        self.taps = [HILBERT_A * input; 3];
        self.prev = HILBERT_B * input;
        self.prev_input = input;
        self.primed = true;
    }

    #[inline(always)]
    pub fn advance(&mut self, input: f64, adjusted_period: f64) -> f64 {
        if !self.primed {
            self.seed(input);
        }
        let weighted = HILBERT_A * input;
        let mut out = -self.taps[self.idx];
        self.taps[self.idx] = weighted;
        self.idx = if self.idx == 2 { 0 } else { self.idx + 1 };
        out += weighted;
        out -= self.prev;
        self.prev = HILBERT_B * self.prev_input;
        out += self.prev;
        self.prev_input = input;
        #[cfg(test)]
        {
            self.advances += 1;
        }
        out * adjusted_period
    }

    #[cfg(test)]
    fn advances(&self) -> usize {
        self.advances
    }
}

#[derive(Debug, Clone, Default)]
pub struct HilbertStage {
    pub even: ParityHistory,
    pub odd: ParityHistory,
}

impl HilbertStage {
    #[inline(always)]
    pub fn advance(&mut self, parity: Parity, input: f64, adjusted_period: f64) -> f64 {
        match parity {
            Parity::Even => self.even.advance(input, adjusted_period),
            Parity::Odd => self.odd.advance(input, adjusted_period),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DelayLine {
    prev2: f64,
    prev3: f64,
}

/// Delays the detrender by three bars to form the in-phase component `I1`.
///
/// The line read on a bar of one parity is the one written by bars of the
/// other parity.
#[derive(Debug, Clone, Default)]
pub struct InPhaseDelay {
    even: DelayLine,
    odd: DelayLine,
    primed: bool,
}

impl InPhaseDelay {
    #[inline(always)]
    fn line(&mut self, parity: Parity) -> &mut DelayLine {
        match parity {
            Parity::Even => &mut self.even,
            Parity::Odd => &mut self.odd,
        }
    }

    /// Detrender value from three bars ago for a bar of `parity`.
    #[inline(always)]
    pub fn current(&mut self, parity: Parity, detrender: f64) -> f64 {
        if !self.primed {
            let seeded = DelayLine {
                prev2: detrender,
                prev3: detrender,
            };
            self.even = seeded;
            self.odd = seeded;
            self.primed = true;
        }
        self.line(parity).prev3
    }

    /// Records this bar's detrender for the next bar of the opposite parity.
    #[inline(always)]
    pub fn push(&mut self, parity: Parity, detrender: f64) {
        let line = self.line(parity.flip());
        line.prev3 = line.prev2;
        line.prev2 = detrender;
    }
}

/// Per-bar outputs of the transformer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HilbertOutput {
    pub detrender: f64,
    /// `I1`: the detrender delayed by three bars.
    pub in_phase: f64,
    /// `Q1`: the Hilbert transform of the detrender.
    pub quadrature: f64,
    /// `jI`: `I1` advanced by 90 degrees.
    pub j_i: f64,
    /// `jQ`: `Q1` advanced by 90 degrees.
    pub j_q: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HilbertTransformer {
    detrender: HilbertStage,
    q1: HilbertStage,
    j_i: HilbertStage,
    j_q: HilbertStage,
    i1: InPhaseDelay,
}

impl HilbertTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs all four stages for one bar. `period` is the previous bar's
    /// stabilized period.
    #[inline]
    pub fn advance(&mut self, parity: Parity, smoothed_price: f64, period: f64) -> HilbertOutput {
        let adjusted_period = 0.075 * period + 0.54;

        let detrender = self
            .detrender
            .advance(parity, smoothed_price, adjusted_period);
        let quadrature = self.q1.advance(parity, detrender, adjusted_period);
        let in_phase = self.i1.current(parity, detrender);
        let j_i = self.j_i.advance(parity, in_phase, adjusted_period);
        let j_q = self.j_q.advance(parity, quadrature, adjusted_period);
        self.i1.push(parity, detrender);

        HilbertOutput {
            detrender,
            in_phase,
            quadrature,
            j_i,
            j_q,
        }
    }

    /// Bars consumed by the even and odd detrender histories.
    #[cfg(test)]
    fn parity_advances(&self) -> (usize, usize) {
        (
            self.detrender.even.advances(),
            self.detrender.odd.advances(),
        )
    }
}
