//! # Hilbert Transform cycle engine
//!
//! The shared pipeline behind every `ht_*` indicator and MAMA: a 4-tap price
//! smoother, a parity-alternating Hilbert transformer, a homodyne discriminator,
//! a period stabilizer and a one-cycle DFT phase estimator. [`HtEngine`] runs
//! one bar at a time; the indicators are projections of the [`HtBar`] it emits.
//!
//! ## Warm-up
//! The first three bars only fill the smoother. Output is trusted after
//! [`HT_LOOKBACK`] bars plus the configured unstable period. Windowed calls
//! re-run the engine from the bar chosen by [`WarmupAnchor`].
//!
//! ## Errors
//! - **EmptyData**: input slice is empty.
//! - **AllValuesNaN**: every input value is `NaN`.
//! - **NotEnoughValidData**: fewer valid bars than the lookback needs.
//! - **OutputLengthMismatch**: a destination slice differs from the input length.
//! - **Range**: invalid window or undersized output buffer.

pub mod config;
pub mod discriminator;
pub mod phase;
pub mod smoother;
pub mod stabilizer;
pub mod transformer;

pub use config::{HtConfig, HtFunc, UnstablePeriods, WarmupAnchor, HT_LOOKBACK};

use crate::utilities::data_loader::{source_type, Candles};
use crate::utilities::helpers::{alloc_with_nan_prefix, first_valid_index};
use crate::utilities::range::{check_output, check_range, resolve_range, RangeError, RangeOutput};
use discriminator::HomodyneDiscriminator;
use phase::PhaseEstimator;
use smoother::PriceSmoother;
use stabilizer::PeriodStabilizer;
use thiserror::Error;
use transformer::{HilbertTransformer, Parity};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HtError {
    #[error("{func}: Empty data provided.")]
    EmptyData { func: &'static str },
    #[error("{func}: All values are NaN.")]
    AllValuesNaN { func: &'static str },
    #[error("{func}: Not enough valid data: needed = {needed}, valid = {valid}")]
    NotEnoughValidData {
        func: &'static str,
        needed: usize,
        valid: usize,
    },
    #[error("{func}: output length mismatch: expected = {expected}, got = {got}")]
    OutputLengthMismatch {
        func: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{func}: {source}")]
    Range {
        func: &'static str,
        source: RangeError,
    },
}

impl HtError {
    #[inline]
    pub(crate) fn range(func: &'static str) -> impl FnOnce(RangeError) -> HtError {
        move |source| HtError::Range { func, source }
    }

    /// Name of the indicator that failed.
    pub fn func(&self) -> &'static str {
        match self {
            HtError::EmptyData { func }
            | HtError::AllValuesNaN { func }
            | HtError::NotEnoughValidData { func, .. }
            | HtError::OutputLengthMismatch { func, .. }
            | HtError::Range { func, .. } => *func,
        }
    }
}

/// Price input shared by the HT indicators.
#[derive(Debug, Clone)]
pub enum HtData<'a> {
    Candles {
        candles: &'a Candles,
        source: &'a str,
    },
    Slice(&'a [f64]),
}

impl<'a> AsRef<[f64]> for HtData<'a> {
    #[inline(always)]
    fn as_ref(&self) -> &[f64] {
        match self {
            HtData::Slice(slice) => slice,
            HtData::Candles { candles, source } => source_type(candles, source),
        }
    }
}

/// Everything the engine knows after one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HtBar {
    pub price: f64,
    pub smoothed_price: f64,
    /// Stabilized period fed back into the Hilbert stages.
    pub period: f64,
    /// Dominant cycle period.
    pub smooth_period: f64,
    /// `smooth_period` rounded to the nearest bar count.
    pub dc_period_int: usize,
    /// Dominant cycle phase in degrees, within `(-45, 315]`.
    pub dc_phase: f64,
    pub in_phase: f64,
    pub quadrature: f64,
    pub sine: f64,
    pub lead_sine: f64,
    pub re: f64,
    pub im: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HtEngine {
    smoother: PriceSmoother,
    hilbert: HilbertTransformer,
    discriminator: HomodyneDiscriminator,
    stabilizer: PeriodStabilizer,
    phase: PhaseEstimator,
    bars: usize,
}

impl HtEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one price. `None` while the smoother is still filling.
    #[inline]
    pub fn next(&mut self, price: f64) -> Option<HtBar> {
        let parity = Parity::of(self.bars);
        self.bars += 1;
        let smoothed_price = self.smoother.next(price)?;

        let h = self
            .hilbert
            .advance(parity, smoothed_price, self.stabilizer.period());
        let raw_period = self.discriminator.advance(&h);
        self.stabilizer.advance(raw_period);
        let smooth_period = self.stabilizer.smooth_period();
        let (dc_period_int, dc_phase) = self.phase.advance(smoothed_price, smooth_period);

        Some(HtBar {
            price,
            smoothed_price,
            period: self.stabilizer.period(),
            smooth_period,
            dc_period_int,
            dc_phase,
            in_phase: h.in_phase,
            quadrature: h.quadrature,
            sine: dc_phase.to_radians().sin(),
            lead_sine: (dc_phase + 45.0).to_radians().sin(),
            re: self.discriminator.re(),
            im: self.discriminator.im(),
        })
    }

    /// Bars consumed so far, including smoother warm-up.
    #[inline]
    pub fn bars(&self) -> usize {
        self.bars
    }
}

/// Streaming front end: skips leading `NaN`s and reports bars only once the
/// lookback has elapsed, matching the batch functions bar for bar.
#[derive(Debug, Clone)]
pub struct HtCoreStream {
    engine: HtEngine,
    lookback: usize,
    seen: usize,
}

impl HtCoreStream {
    pub fn new(lookback: usize) -> Self {
        Self {
            engine: HtEngine::new(),
            lookback,
            seen: 0,
        }
    }

    pub fn from_config(config: &HtConfig) -> Self {
        Self::new(config.max_lookback())
    }

    /// Advances the engine. The flag is `true` once the bar lies past the
    /// lookback. Stateful projections must see every bar, ready or not.
    #[inline]
    pub fn step(&mut self, price: f64) -> (Option<HtBar>, bool) {
        if self.seen == 0 && price.is_nan() {
            return (None, false);
        }
        let ready = self.seen >= self.lookback;
        self.seen += 1;
        (self.engine.next(price), ready)
    }

    #[inline]
    pub fn update(&mut self, price: f64) -> Option<HtBar> {
        match self.step(price) {
            (Some(bar), true) => Some(bar),
            _ => None,
        }
    }

    #[inline]
    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

/// Runs a fresh engine over the window `start..=end` and hands every bar at or
/// after `max(start, lookback)` to `emit` with its output offset.
///
/// `project` sees every bar the engine produces, warm-up included.
pub(crate) fn walk_range<T>(
    data: &[f64],
    start: usize,
    end: usize,
    lookback: usize,
    anchor: WarmupAnchor,
    mut project: impl FnMut(&HtBar) -> T,
    mut emit: impl FnMut(usize, T),
) -> Result<RangeOutput, RangeError> {
    check_range(start, end, data.len())?;
    let begin = match resolve_range(start, end, lookback) {
        Some(begin) => begin,
        None => {
            tracing::debug!(start, end, lookback, "ht_core: window ends inside the lookback");
            return Ok(RangeOutput::EMPTY);
        }
    };

    let walk_start = anchor.walk_start(begin, lookback);
    let mut engine = HtEngine::new();
    let mut written = 0;
    for (idx, &price) in data.iter().enumerate().take(end + 1).skip(walk_start) {
        if let Some(bar) = engine.next(price) {
            let value = project(&bar);
            if idx >= begin {
                emit(written, value);
                written += 1;
            }
        }
    }

    Ok(RangeOutput {
        out_beg_idx: begin,
        out_nb_element: written,
    })
}

/// Checks the input of a full-length call and returns its first non-`NaN` index.
pub(crate) fn prepare(func: &'static str, data: &[f64], lookback: usize) -> Result<usize, HtError> {
    if data.is_empty() {
        return Err(HtError::EmptyData { func });
    }
    let first = first_valid_index(data).ok_or(HtError::AllValuesNaN { func })?;
    let valid = data.len() - first;
    if valid <= lookback {
        return Err(HtError::NotEnoughValidData {
            func,
            needed: lookback + 1,
            valid,
        });
    }
    Ok(first)
}

/// Every destination slice must match the input length.
pub(crate) fn check_dst(func: &'static str, len: usize, dsts: &[usize]) -> Result<(), HtError> {
    match dsts.iter().find(|&&got| got != len) {
        Some(&got) => Err(HtError::OutputLengthMismatch {
            func,
            expected: len,
            got,
        }),
        None => Ok(()),
    }
}

/// Validates a windowed call's window and output buffers before anything is written.
pub(crate) fn check_window(
    func: &'static str,
    data_len: usize,
    start: usize,
    end: usize,
    outs: &[usize],
) -> Result<(), HtError> {
    check_range(start, end, data_len).map_err(HtError::range(func))?;
    for &got in outs {
        check_output(start, end, got).map_err(HtError::range(func))?;
    }
    Ok(())
}

#[inline]
pub fn ht_core_lookback(config: &HtConfig) -> usize {
    config.max_lookback()
}

#[derive(Debug, Clone)]
pub struct HtCoreInput<'a> {
    pub data: HtData<'a>,
    pub config: HtConfig,
}

impl<'a> HtCoreInput<'a> {
    pub fn from_candles(candles: &'a Candles, source: &'a str, config: HtConfig) -> Self {
        Self {
            data: HtData::Candles { candles, source },
            config,
        }
    }

    pub fn from_slice(slice: &'a [f64], config: HtConfig) -> Self {
        Self {
            data: HtData::Slice(slice),
            config,
        }
    }

    pub fn with_default_candles(candles: &'a Candles) -> Self {
        Self::from_candles(candles, "close", HtConfig::default())
    }
}

/// All engine projections at once, aligned with the input.
#[derive(Debug, Clone)]
pub struct HtCoreOutput {
    pub smooth_period: Vec<f64>,
    pub dc_phase: Vec<f64>,
    pub in_phase: Vec<f64>,
    pub quadrature: Vec<f64>,
    pub sine: Vec<f64>,
    pub lead_sine: Vec<f64>,
}

pub fn ht_core(input: &HtCoreInput) -> Result<HtCoreOutput, HtError> {
    const FUNC: &str = "ht_core";
    let data = input.data.as_ref();
    let lookback = ht_core_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let warm = first + lookback;
    let len = data.len();

    let mut smooth_period = alloc_with_nan_prefix(len, warm);
    let mut dc_phase = alloc_with_nan_prefix(len, warm);
    let mut in_phase = alloc_with_nan_prefix(len, warm);
    let mut quadrature = alloc_with_nan_prefix(len, warm);
    let mut sine = alloc_with_nan_prefix(len, warm);
    let mut lead_sine = alloc_with_nan_prefix(len, warm);
    walk_range(
        &data[first..],
        0,
        len - first - 1,
        lookback,
        input.config.anchor,
        |bar| *bar,
        |i, bar| {
            let idx = warm + i;
            smooth_period[idx] = bar.smooth_period;
            dc_phase[idx] = bar.dc_phase;
            in_phase[idx] = bar.in_phase;
            quadrature[idx] = bar.quadrature;
            sine[idx] = bar.sine;
            lead_sine[idx] = bar.lead_sine;
        },
    )
    .map_err(HtError::range(FUNC))?;

    Ok(HtCoreOutput {
        smooth_period,
        dc_phase,
        in_phase,
        quadrature,
        sine,
        lead_sine,
    })
}

/// Windowed engine call: fills `out[..out_nb_element]` with the bars
/// starting at `out_beg_idx`.
///
/// Under [`WarmupAnchor::SeriesStart`] the engine walks from bar 0, so the cost
/// is O(`end`) however narrow the window. [`WarmupAnchor::Lookback`] walks only
/// `end - start + lookback` bars at the price of window-dependent output.
pub fn ht_core_range(
    data: &[f64],
    start: usize,
    end: usize,
    config: &HtConfig,
    out: &mut [HtBar],
) -> Result<RangeOutput, HtError> {
    const FUNC: &str = "ht_core";
    check_window(FUNC, data.len(), start, end, &[out.len()])?;
    walk_range(
        data,
        start,
        end,
        ht_core_lookback(config),
        config.anchor,
        |bar| *bar,
        |i, bar| out[i] = bar,
    )
    .map_err(HtError::range(FUNC))
}
