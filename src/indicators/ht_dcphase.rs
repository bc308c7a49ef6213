//! # Hilbert Transform - Dominant Cycle Phase (HT_DCPHASE)
//!
//! Position within the current dominant cycle, in degrees. The phase runs as a
//! sawtooth within `(-45, 315]`, advancing roughly `360 / period` per bar.
//!
//! The output length matches the input length, with `NaN` values until the
//! first valid input plus the lookback (63 bars plus the unstable period).
//!
//! ## Parameters
//! - **config**: unstable period and warm-up anchor, see [`HtConfig`].
//!
//! ## Errors
//! - **EmptyData**: ht_dcphase: Input data slice is empty.
//! - **AllValuesNaN**: ht_dcphase: All input data values are `NaN`.
//! - **NotEnoughValidData**: ht_dcphase: No valid bar survives the lookback.
//! - **OutputLengthMismatch** / **Range**: destination or window errors.
//!
//! ## Returns
//! - **`Ok(HtDcPhaseOutput)`** on success, containing a `Vec<f64>` of phase values.
//! - **`Err(HtError)`** otherwise.

use crate::indicators::ht_core::{
    check_dst, check_window, prepare, walk_range, HtConfig, HtCoreStream, HtData, HtError, HtFunc,
    WarmupAnchor,
};
use crate::utilities::data_loader::Candles;
use crate::utilities::helpers::{alloc_with_nan_prefix, fill_nan};
use crate::utilities::range::RangeOutput;

const FUNC: &str = "ht_dcphase";

#[derive(Debug, Clone)]
pub struct HtDcPhaseOutput {
    pub values: Vec<f64>,
}

impl std::ops::Deref for HtDcPhaseOutput {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

#[derive(Debug, Clone)]
pub struct HtDcPhaseInput<'a> {
    pub data: HtData<'a>,
    pub config: HtConfig,
}

impl<'a> HtDcPhaseInput<'a> {
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
pub fn ht_dcphase_lookback(config: &HtConfig) -> usize {
    config.lookback(HtFunc::DcPhase)
}

#[inline]
pub fn ht_dcphase(input: &HtDcPhaseInput) -> Result<HtDcPhaseOutput, HtError> {
    let data = input.data.as_ref();
    let lookback = ht_dcphase_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let mut out = alloc_with_nan_prefix(data.len(), first + lookback);
    ht_dcphase_compute_into(data, first, &input.config, &mut out)?;
    Ok(HtDcPhaseOutput { values: out })
}

/// Writes the full-length output into `dst`, which must match the input length.
pub fn ht_dcphase_into_slice(dst: &mut [f64], input: &HtDcPhaseInput) -> Result<(), HtError> {
    let data = input.data.as_ref();
    let lookback = ht_dcphase_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    check_dst(FUNC, data.len(), &[dst.len()])?;
    fill_nan(&mut dst[..first + lookback]);
    ht_dcphase_compute_into(data, first, &input.config, dst)
}

fn ht_dcphase_compute_into(
    data: &[f64],
    first: usize,
    config: &HtConfig,
    out: &mut [f64],
) -> Result<(), HtError> {
    let lookback = ht_dcphase_lookback(config);
    let warm = first + lookback;
    walk_range(
        &data[first..],
        0,
        data.len() - first - 1,
        lookback,
        config.anchor,
        |bar| bar.dc_phase,
        |i, v| out[warm + i] = v,
    )
    .map_err(HtError::range(FUNC))?;
    Ok(())
}

/// Windowed call over `start..=end`; see [`RangeOutput`].
///
/// Under the default [`WarmupAnchor::SeriesStart`] the engine walks from bar 0,
/// so the cost is O(`end`) however narrow the window. [`WarmupAnchor::Lookback`]
/// walks `end - start + lookback` bars instead, and its output depends on `start`.
pub fn ht_dcphase_range(
    data: &[f64],
    start: usize,
    end: usize,
    config: &HtConfig,
    out: &mut [f64],
) -> Result<RangeOutput, HtError> {
    check_window(FUNC, data.len(), start, end, &[out.len()])?;
    walk_range(
        data,
        start,
        end,
        ht_dcphase_lookback(config),
        config.anchor,
        |bar| bar.dc_phase,
        |i, v| out[i] = v,
    )
    .map_err(HtError::range(FUNC))
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HtDcPhaseBuilder {
    config: HtConfig,
}

impl HtDcPhaseBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn unstable_period(mut self, bars: usize) -> Self {
        self.config.unstable.set(HtFunc::DcPhase, bars);
        self
    }
    #[inline(always)]
    pub fn anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.config.anchor = anchor;
        self
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<HtDcPhaseOutput, HtError> {
        ht_dcphase(&HtDcPhaseInput::from_candles(c, "close", self.config))
    }
    #[inline(always)]
    pub fn apply_slice(self, d: &[f64]) -> Result<HtDcPhaseOutput, HtError> {
        ht_dcphase(&HtDcPhaseInput::from_slice(d, self.config))
    }
    #[inline(always)]
    pub fn into_stream(self) -> HtDcPhaseStream {
        HtDcPhaseStream::new(&self.config)
    }
}

#[derive(Debug, Clone)]
pub struct HtDcPhaseStream {
    core: HtCoreStream,
}

impl HtDcPhaseStream {
    pub fn new(config: &HtConfig) -> Self {
        Self {
            core: HtCoreStream::new(ht_dcphase_lookback(config)),
        }
    }

    #[inline(always)]
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.core.update(value).map(|bar| bar.dc_phase)
    }
}
