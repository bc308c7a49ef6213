//! # MESA Adaptive Moving Average (MAMA) and Following Adaptive Moving Average (FAMA)
//!
//! An exponential average whose smoothing constant follows the rate of change of
//! the phasor phase `atan(Q1 / I1)`. A phase advancing by one degree or less per
//! bar (or moving backwards) uses `fast_limit`; faster advances divide it down to
//! no less than `slow_limit`. FAMA applies half that constant to MAMA itself.
//!
//! ## Parameters
//! - **fast_limit**: upper smoothing constant, within `[0.01, 0.99]`. Defaults to 0.5.
//! - **slow_limit**: lower smoothing constant, within `[0.01, 0.99]`. Defaults to 0.05.
//! - **config**: unstable period and warm-up anchor, see [`HtConfig`].
//!
//! ## Errors
//! - **Ht**: input, window and buffer errors shared with the HT indicators.
//! - **InvalidFastLimit** / **InvalidSlowLimit**: a limit outside `[0.01, 0.99]`.
//! - **InvalidSweep**: a batch axis that yields no values.

use crate::indicators::ht_core::{
    check_dst, check_window, prepare, walk_range, HtBar, HtConfig, HtCoreStream, HtData, HtEngine,
    HtError, HtFunc, WarmupAnchor,
};
use crate::utilities::data_loader::{source_type, Candles};
use crate::utilities::helpers::{alloc_with_nan_prefix, fill_nan};
use crate::utilities::range::RangeOutput;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

const FUNC: &str = "mama";
const DEFAULT_FAST_LIMIT: f64 = 0.5;
const DEFAULT_SLOW_LIMIT: f64 = 0.05;
const LIMIT_MIN: f64 = 0.01;
const LIMIT_MAX: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MamaError {
    #[error(transparent)]
    Ht(#[from] HtError),
    #[error("mama: Invalid fast limit: {fast_limit} (expected 0.01..=0.99)")]
    InvalidFastLimit { fast_limit: f64 },
    #[error("mama: Invalid slow limit: {slow_limit} (expected 0.01..=0.99)")]
    InvalidSlowLimit { slow_limit: f64 },
    #[error("mama: Invalid sweep: start={start}, end={end}, step={step}")]
    InvalidSweep { start: f64, end: f64, step: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MamaParams {
    pub fast_limit: Option<f64>,
    pub slow_limit: Option<f64>,
}

impl Default for MamaParams {
    fn default() -> Self {
        Self {
            fast_limit: Some(DEFAULT_FAST_LIMIT),
            slow_limit: Some(DEFAULT_SLOW_LIMIT),
        }
    }
}

impl MamaParams {
    #[inline]
    pub fn fast_limit(&self) -> f64 {
        self.fast_limit.unwrap_or(DEFAULT_FAST_LIMIT)
    }

    #[inline]
    pub fn slow_limit(&self) -> f64 {
        self.slow_limit.unwrap_or(DEFAULT_SLOW_LIMIT)
    }

    /// Resolved `(fast_limit, slow_limit)`, both checked against `[0.01, 0.99]`.
    pub fn validate(&self) -> Result<(f64, f64), MamaError> {
        let fast_limit = self.fast_limit();
        let slow_limit = self.slow_limit();
        if !(LIMIT_MIN..=LIMIT_MAX).contains(&fast_limit) {
            return Err(MamaError::InvalidFastLimit { fast_limit });
        }
        if !(LIMIT_MIN..=LIMIT_MAX).contains(&slow_limit) {
            return Err(MamaError::InvalidSlowLimit { slow_limit });
        }
        Ok((fast_limit, slow_limit))
    }
}

/// Phase of the `(I1, Q1)` phasor in degrees, 0 when `I1` is zero.
#[inline(always)]
pub fn phasor_phase(bar: &HtBar) -> f64 {
    if bar.in_phase != 0.0 {
        (bar.quadrature / bar.in_phase).atan().to_degrees()
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct MamaFilter {
    fast_limit: f64,
    slow_limit: f64,
    prev_phase: f64,
    mama: f64,
    fama: f64,
    primed: bool,
}

impl MamaFilter {
    /// Limits are taken as given; see [`MamaParams::validate`].
    pub fn new(fast_limit: f64, slow_limit: f64) -> Self {
        Self {
            fast_limit,
            slow_limit,
            prev_phase: 0.0,
            mama: 0.0,
            fama: 0.0,
            primed: false,
        }
    }

    #[inline]
    pub fn advance(&mut self, bar: &HtBar) -> (f64, f64) {
        self.advance_phase(bar.price, phasor_phase(bar))
    }

    /// Returns `(mama, fama)` after folding in `price`.
    #[inline]
    pub fn advance_phase(&mut self, price: f64, phase: f64) -> (f64, f64) {
        let delta = (self.prev_phase - phase).max(1.0);
        self.prev_phase = phase;

        let alpha = if delta > 1.0 {
            (self.fast_limit / delta).max(self.slow_limit)
        } else {
            self.fast_limit
        };

        if !self.primed {
            self.mama = price;
            self.fama = price;
            self.primed = true;
        }
        self.mama = alpha * price + (1.0 - alpha) * self.mama;
        self.fama = 0.5 * alpha * self.mama + (1.0 - 0.5 * alpha) * self.fama;
        (self.mama, self.fama)
    }
}

#[derive(Debug, Clone)]
pub struct MamaOutput {
    pub mama_values: Vec<f64>,
    pub fama_values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct MamaInput<'a> {
    pub data: HtData<'a>,
    pub params: MamaParams,
    pub config: HtConfig,
}

impl<'a> MamaInput<'a> {
    pub fn from_candles(candles: &'a Candles, source: &'a str, params: MamaParams) -> Self {
        Self {
            data: HtData::Candles { candles, source },
            params,
            config: HtConfig::default(),
        }
    }

    pub fn from_slice(slice: &'a [f64], params: MamaParams) -> Self {
        Self {
            data: HtData::Slice(slice),
            params,
            config: HtConfig::default(),
        }
    }

    pub fn with_default_candles(candles: &'a Candles) -> Self {
        Self::from_candles(candles, "close", MamaParams::default())
    }

    pub fn with_config(mut self, config: HtConfig) -> Self {
        self.config = config;
        self
    }
}

#[inline]
pub fn mama_lookback(config: &HtConfig) -> usize {
    config.lookback(HtFunc::Mama)
}

pub fn mama(input: &MamaInput) -> Result<MamaOutput, MamaError> {
    let (fast_limit, slow_limit) = input.params.validate()?;
    let data = input.data.as_ref();
    let lookback = mama_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let mut mama_values = alloc_with_nan_prefix(data.len(), first + lookback);
    let mut fama_values = alloc_with_nan_prefix(data.len(), first + lookback);
    mama_compute_into(
        data,
        first,
        MamaFilter::new(fast_limit, slow_limit),
        &input.config,
        &mut mama_values,
        &mut fama_values,
    )?;
    Ok(MamaOutput {
        mama_values,
        fama_values,
    })
}

pub fn mama_into_slice(
    dst_mama: &mut [f64],
    dst_fama: &mut [f64],
    input: &MamaInput,
) -> Result<(), MamaError> {
    let (fast_limit, slow_limit) = input.params.validate()?;
    let data = input.data.as_ref();
    let lookback = mama_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    check_dst(FUNC, data.len(), &[dst_mama.len(), dst_fama.len()])?;
    fill_nan(&mut dst_mama[..first + lookback]);
    fill_nan(&mut dst_fama[..first + lookback]);
    mama_compute_into(
        data,
        first,
        MamaFilter::new(fast_limit, slow_limit),
        &input.config,
        dst_mama,
        dst_fama,
    )
}

fn mama_compute_into(
    data: &[f64],
    first: usize,
    mut filter: MamaFilter,
    config: &HtConfig,
    out_mama: &mut [f64],
    out_fama: &mut [f64],
) -> Result<(), MamaError> {
    let lookback = mama_lookback(config);
    let warm = first + lookback;
    walk_range(
        &data[first..],
        0,
        data.len() - first - 1,
        lookback,
        config.anchor,
        |bar| filter.advance(bar),
        |i, (m, f)| {
            out_mama[warm + i] = m;
            out_fama[warm + i] = f;
        },
    )
    .map_err(HtError::range(FUNC))?;
    Ok(())
}

/// Windowed call over `start..=end`; see [`RangeOutput`].
///
/// Under the default [`WarmupAnchor::SeriesStart`] the engine walks from bar 0,
/// so the cost is O(`end`) however narrow the window. [`WarmupAnchor::Lookback`]
/// walks `end - start + lookback` bars instead, and its output depends on `start`.
pub fn mama_range(
    data: &[f64],
    start: usize,
    end: usize,
    params: &MamaParams,
    config: &HtConfig,
    out_mama: &mut [f64],
    out_fama: &mut [f64],
) -> Result<RangeOutput, MamaError> {
    let (fast_limit, slow_limit) = params.validate()?;
    check_window(FUNC, data.len(), start, end, &[out_mama.len(), out_fama.len()])?;
    let mut filter = MamaFilter::new(fast_limit, slow_limit);
    let r = walk_range(
        data,
        start,
        end,
        mama_lookback(config),
        config.anchor,
        |bar| filter.advance(bar),
        |i, (m, f)| {
            out_mama[i] = m;
            out_fama[i] = f;
        },
    )
    .map_err(HtError::range(FUNC))?;
    Ok(r)
}

#[derive(Copy, Clone, Debug, Default)]
pub struct MamaBuilder {
    fast_limit: Option<f64>,
    slow_limit: Option<f64>,
    config: HtConfig,
}

impl MamaBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn fast_limit(mut self, v: f64) -> Self {
        self.fast_limit = Some(v);
        self
    }
    #[inline(always)]
    pub fn slow_limit(mut self, v: f64) -> Self {
        self.slow_limit = Some(v);
        self
    }
    #[inline(always)]
    pub fn unstable_period(mut self, bars: usize) -> Self {
        self.config.unstable.set(HtFunc::Mama, bars);
        self
    }
    #[inline(always)]
    pub fn anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.config.anchor = anchor;
        self
    }
    fn params(&self) -> MamaParams {
        MamaParams {
            fast_limit: self.fast_limit,
            slow_limit: self.slow_limit,
        }
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<MamaOutput, MamaError> {
        mama(&MamaInput::from_candles(c, "close", self.params()).with_config(self.config))
    }
    #[inline(always)]
    pub fn apply_slice(self, d: &[f64]) -> Result<MamaOutput, MamaError> {
        mama(&MamaInput::from_slice(d, self.params()).with_config(self.config))
    }
    #[inline(always)]
    pub fn into_stream(self) -> Result<MamaStream, MamaError> {
        MamaStream::try_new(self.params(), &self.config)
    }
}

#[derive(Debug, Clone)]
pub struct MamaStream {
    core: HtCoreStream,
    filter: MamaFilter,
}

impl MamaStream {
    pub fn try_new(params: MamaParams, config: &HtConfig) -> Result<Self, MamaError> {
        let (fast_limit, slow_limit) = params.validate()?;
        Ok(Self {
            core: HtCoreStream::new(mama_lookback(config)),
            filter: MamaFilter::new(fast_limit, slow_limit),
        })
    }

    /// Returns `(mama, fama)` once the lookback has elapsed.
    #[inline]
    pub fn update(&mut self, value: f64) -> Option<(f64, f64)> {
        let (bar, ready) = self.core.step(value);
        let out = self.filter.advance(&bar?);
        ready.then_some(out)
    }
}

#[derive(Clone, Debug)]
pub struct MamaBatchRange {
    pub fast_limit: (f64, f64, f64),
    pub slow_limit: (f64, f64, f64),
}

impl Default for MamaBatchRange {
    fn default() -> Self {
        Self {
            fast_limit: (DEFAULT_FAST_LIMIT, DEFAULT_FAST_LIMIT, 0.0),
            slow_limit: (DEFAULT_SLOW_LIMIT, DEFAULT_SLOW_LIMIT, 0.0),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MamaBatchBuilder {
    range: MamaBatchRange,
    config: HtConfig,
}

impl MamaBatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    #[inline]
    pub fn fast_limit_range(mut self, start: f64, end: f64, step: f64) -> Self {
        self.range.fast_limit = (start, end, step);
        self
    }
    #[inline]
    pub fn fast_limit_static(mut self, v: f64) -> Self {
        self.range.fast_limit = (v, v, 0.0);
        self
    }
    #[inline]
    pub fn slow_limit_range(mut self, start: f64, end: f64, step: f64) -> Self {
        self.range.slow_limit = (start, end, step);
        self
    }
    #[inline]
    pub fn slow_limit_static(mut self, v: f64) -> Self {
        self.range.slow_limit = (v, v, 0.0);
        self
    }
    #[inline]
    pub fn config(mut self, config: HtConfig) -> Self {
        self.config = config;
        self
    }
    pub fn apply_slice(self, data: &[f64]) -> Result<MamaBatchOutput, MamaError> {
        mama_batch_par_slice(data, &self.range, &self.config)
    }
    pub fn apply_candles(self, c: &Candles, src: &str) -> Result<MamaBatchOutput, MamaError> {
        let slice = source_type(c, src);
        self.apply_slice(slice)
    }
    pub fn with_default_candles(c: &Candles) -> Result<MamaBatchOutput, MamaError> {
        MamaBatchBuilder::new().apply_candles(c, "close")
    }
}

/// One row per parameter combination, `rows × cols`, row-major.
#[derive(Clone, Debug)]
pub struct MamaBatchOutput {
    pub mama: Vec<f64>,
    pub fama: Vec<f64>,
    pub combos: Vec<MamaParams>,
    pub rows: usize,
    pub cols: usize,
}

impl MamaBatchOutput {
    pub fn row_for_params(&self, p: &MamaParams) -> Option<usize> {
        self.combos.iter().position(|c| {
            (c.fast_limit() - p.fast_limit()).abs() < 1e-12
                && (c.slow_limit() - p.slow_limit()).abs() < 1e-12
        })
    }
    pub fn mama_for(&self, p: &MamaParams) -> Option<&[f64]> {
        self.row_for_params(p).map(|row| {
            let start = row * self.cols;
            &self.mama[start..start + self.cols]
        })
    }
    pub fn fama_for(&self, p: &MamaParams) -> Option<&[f64]> {
        self.row_for_params(p).map(|row| {
            let start = row * self.cols;
            &self.fama[start..start + self.cols]
        })
    }
}

fn expand_grid(r: &MamaBatchRange) -> Result<Vec<MamaParams>, MamaError> {
    fn axis_f64((start, end, step): (f64, f64, f64)) -> Result<Vec<f64>, MamaError> {
        if step.abs() < 1e-12 || (start - end).abs() < 1e-12 {
            return Ok(vec![start]);
        }
        let mut v = Vec::new();
        let mut x = start;
        if step > 0.0 {
            while x <= end + 1e-12 {
                v.push(x);
                x += step;
            }
        } else {
            while x >= end - 1e-12 {
                v.push(x);
                x += step;
            }
        }
        if v.is_empty() {
            return Err(MamaError::InvalidSweep { start, end, step });
        }
        Ok(v)
    }

    let fasts = axis_f64(r.fast_limit)?;
    let slows = axis_f64(r.slow_limit)?;
    let mut out = Vec::with_capacity(fasts.len() * slows.len());
    for &f in &fasts {
        for &s in &slows {
            out.push(MamaParams {
                fast_limit: Some(f),
                slow_limit: Some(s),
            });
        }
    }
    Ok(out)
}

#[inline]
pub fn mama_batch_slice(
    data: &[f64],
    sweep: &MamaBatchRange,
    config: &HtConfig,
) -> Result<MamaBatchOutput, MamaError> {
    mama_batch_inner(data, sweep, config, false)
}

#[inline]
pub fn mama_batch_par_slice(
    data: &[f64],
    sweep: &MamaBatchRange,
    config: &HtConfig,
) -> Result<MamaBatchOutput, MamaError> {
    mama_batch_inner(data, sweep, config, true)
}

fn mama_batch_inner(
    data: &[f64],
    sweep: &MamaBatchRange,
    config: &HtConfig,
    parallel: bool,
) -> Result<MamaBatchOutput, MamaError> {
    let combos = expand_grid(sweep)?;
    let limits = combos
        .iter()
        .map(MamaParams::validate)
        .collect::<Result<Vec<_>, _>>()?;

    let lookback = mama_lookback(config);
    let first = prepare(FUNC, data, lookback)?;
    let warm = first + lookback;
    let rows = combos.len();
    let cols = data.len();

    // The engine does not depend on the limits, so it runs once for every row.
    let mut engine = HtEngine::new();
    let phases: Vec<(usize, f64, f64)> = data[first..]
        .iter()
        .enumerate()
        .filter_map(|(i, &price)| {
            engine
                .next(price)
                .map(|bar| (first + i, price, phasor_phase(&bar)))
        })
        .collect();
    tracing::debug!(rows, cols, "mama: batch sweep");

    let do_row = |row: usize, out_mama: &mut [f64], out_fama: &mut [f64]| {
        let (fast_limit, slow_limit) = limits[row];
        let mut filter = MamaFilter::new(fast_limit, slow_limit);
        fill_nan(&mut out_mama[..warm]);
        fill_nan(&mut out_fama[..warm]);
        for &(idx, price, phase) in &phases {
            let (m, f) = filter.advance_phase(price, phase);
            if idx >= warm {
                out_mama[idx] = m;
                out_fama[idx] = f;
            }
        }
    };

    let mut mama = vec![0.0; rows * cols];
    let mut fama = vec![0.0; rows * cols];
    if parallel {
        #[cfg(not(target_arch = "wasm32"))]
        {
            mama.par_chunks_mut(cols)
                .zip(fama.par_chunks_mut(cols))
                .enumerate()
                .for_each(|(row, (m, f))| do_row(row, m, f));
        }

        #[cfg(target_arch = "wasm32")]
        {
            for (row, (m, f)) in mama.chunks_mut(cols).zip(fama.chunks_mut(cols)).enumerate() {
                do_row(row, m, f);
            }
        }
    } else {
        for (row, (m, f)) in mama.chunks_mut(cols).zip(fama.chunks_mut(cols)).enumerate() {
            do_row(row, m, f);
        }
    }

    Ok(MamaBatchOutput {
        mama,
        fama,
        combos,
        rows,
        cols,
    })
}
