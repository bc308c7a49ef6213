//! # Hilbert Transform - Trend vs Cycle Mode (HT_TRENDMODE)
//!
//! `1.0` while the market is trending, `0.0` while it is cycling. A bar is in
//! cycle mode when the sine and lead sine have crossed within the last half
//! cycle, or when the phase advances at the rate the dominant cycle predicts.
//! A smoothed price more than 1.5% away from the instantaneous trendline forces
//! trend mode.
//!
//! ## Parameters
//! - **config**: unstable period and warm-up anchor, see [`HtConfig`].
//!
//! ## Errors
//! See [`HtError`]; messages are prefixed with `ht_trendmode:`.

use crate::indicators::ht_core::{
    check_dst, check_window, prepare, walk_range, HtBar, HtConfig, HtCoreStream, HtData, HtError,
    HtFunc, WarmupAnchor,
};
use crate::indicators::ht_trendline::TrendlineFilter;
use crate::utilities::data_loader::Candles;
use crate::utilities::helpers::{alloc_with_nan_prefix, fill_nan};
use crate::utilities::range::RangeOutput;

const FUNC: &str = "ht_trendmode";

/// Relative distance from the trendline that always counts as trending.
const TREND_DEVIATION: f64 = 0.015;

#[derive(Debug, Clone, Default)]
pub struct TrendModeDetector {
    trendline: TrendlineFilter,
    days_in_trend: usize,
    prev_sine: f64,
    prev_lead_sine: f64,
    prev_phase: f64,
}

impl TrendModeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` for trend mode.
    pub fn advance(&mut self, bar: &HtBar) -> bool {
        let trendline = self.trendline.advance(bar);
        let sp = bar.smooth_period;
        let mut trend = true;

        let crossed_up = bar.sine > bar.lead_sine && self.prev_sine <= self.prev_lead_sine;
        let crossed_down = bar.sine < bar.lead_sine && self.prev_sine >= self.prev_lead_sine;
        if crossed_up || crossed_down {
            self.days_in_trend = 0;
            trend = false;
        }

        self.days_in_trend += 1;
        if (self.days_in_trend as f64) < 0.5 * sp {
            trend = false;
        }

        let phase_advance = bar.dc_phase - self.prev_phase;
        if sp != 0.0 && phase_advance > 0.67 * 360.0 / sp && phase_advance < 1.5 * 360.0 / sp {
            trend = false;
        }

        if trendline != 0.0 && ((bar.smoothed_price - trendline) / trendline).abs() >= TREND_DEVIATION
        {
            trend = true;
        }

        self.prev_sine = bar.sine;
        self.prev_lead_sine = bar.lead_sine;
        self.prev_phase = bar.dc_phase;
        trend
    }
}

#[inline(always)]
fn mode_value(trend: bool) -> f64 {
    if trend {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct HtTrendModeOutput {
    pub values: Vec<f64>,
}

impl std::ops::Deref for HtTrendModeOutput {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

#[derive(Debug, Clone)]
pub struct HtTrendModeInput<'a> {
    pub data: HtData<'a>,
    pub config: HtConfig,
}

impl<'a> HtTrendModeInput<'a> {
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

#[inline]
pub fn ht_trendmode_lookback(config: &HtConfig) -> usize {
    config.lookback(HtFunc::TrendMode)
}

pub fn ht_trendmode(input: &HtTrendModeInput) -> Result<HtTrendModeOutput, HtError> {
    let data = input.data.as_ref();
    let lookback = ht_trendmode_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let mut out = alloc_with_nan_prefix(data.len(), first + lookback);
    ht_trendmode_compute_into(data, first, &input.config, &mut out)?;
    Ok(HtTrendModeOutput { values: out })
}

pub fn ht_trendmode_into_slice(dst: &mut [f64], input: &HtTrendModeInput) -> Result<(), HtError> {
    let data = input.data.as_ref();
    let lookback = ht_trendmode_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    check_dst(FUNC, data.len(), &[dst.len()])?;
    fill_nan(&mut dst[..first + lookback]);
    ht_trendmode_compute_into(data, first, &input.config, dst)
}

fn ht_trendmode_compute_into(
    data: &[f64],
    first: usize,
    config: &HtConfig,
    out: &mut [f64],
) -> Result<(), HtError> {
    let lookback = ht_trendmode_lookback(config);
    let warm = first + lookback;
    let mut detector = TrendModeDetector::new();
    walk_range(
        &data[first..],
        0,
        data.len() - first - 1,
        lookback,
        config.anchor,
        |bar| mode_value(detector.advance(bar)),
        |i, v| out[warm + i] = v,
    )
    .map_err(HtError::range(FUNC))?;
    Ok(())
}

/// Windowed call. Trend mode is written as `1.0`, cycle mode as `0.0`.
///
/// Under the default [`WarmupAnchor::SeriesStart`] the engine walks from bar 0,
/// so the cost is O(`end`) however narrow the window. [`WarmupAnchor::Lookback`]
/// walks `end - start + lookback` bars instead, and its output depends on `start`.
pub fn ht_trendmode_range(
    data: &[f64],
    start: usize,
    end: usize,
    config: &HtConfig,
    out: &mut [f64],
) -> Result<RangeOutput, HtError> {
    check_window(FUNC, data.len(), start, end, &[out.len()])?;
    let mut detector = TrendModeDetector::new();
    walk_range(
        data,
        start,
        end,
        ht_trendmode_lookback(config),
        config.anchor,
        |bar| mode_value(detector.advance(bar)),
        |i, v| out[i] = v,
    )
    .map_err(HtError::range(FUNC))
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HtTrendModeBuilder {
    config: HtConfig,
}

impl HtTrendModeBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn unstable_period(mut self, bars: usize) -> Self {
        self.config.unstable.set(HtFunc::TrendMode, bars);
        self
    }
    #[inline(always)]
    pub fn anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.config.anchor = anchor;
        self
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<HtTrendModeOutput, HtError> {
        ht_trendmode(&HtTrendModeInput::from_candles(c, "close", self.config))
    }
    #[inline(always)]
    pub fn apply_slice(self, d: &[f64]) -> Result<HtTrendModeOutput, HtError> {
        ht_trendmode(&HtTrendModeInput::from_slice(d, self.config))
    }
    #[inline(always)]
    pub fn into_stream(self) -> HtTrendModeStream {
        HtTrendModeStream::new(&self.config)
    }
}

#[derive(Debug, Clone)]
pub struct HtTrendModeStream {
    core: HtCoreStream,
    detector: TrendModeDetector,
}

impl HtTrendModeStream {
    pub fn new(config: &HtConfig) -> Self {
        Self {
            core: HtCoreStream::new(ht_trendmode_lookback(config)),
            detector: TrendModeDetector::new(),
        }
    }

    /// `Some(true)` for trend mode once the lookback has elapsed.
    #[inline]
    pub fn update(&mut self, value: f64) -> Option<bool> {
        let (bar, ready) = self.core.step(value);
        let trend = self.detector.advance(&bar?);
        ready.then_some(trend)
    }
}
