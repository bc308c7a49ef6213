//! # Hilbert Transform - Phasor Components (HT_PHASOR)
//!
//! The in-phase (`I1`, the detrended price delayed three bars) and quadrature
//! (`Q1`, its Hilbert transform) components that feed the discriminator.
//! On a clean cycle the two are a quarter period apart.
//!
//! ## Parameters
//! - **config**: unstable period and warm-up anchor, see [`HtConfig`].
//!
//! ## Errors
//! See [`HtError`]; messages are prefixed with `ht_phasor:`.

use crate::indicators::ht_core::{
    check_dst, check_window, prepare, walk_range, HtConfig, HtCoreStream, HtData, HtError, HtFunc,
    WarmupAnchor,
};
use crate::utilities::data_loader::Candles;
use crate::utilities::helpers::{alloc_with_nan_prefix, fill_nan};
use crate::utilities::range::RangeOutput;

const FUNC: &str = "ht_phasor";

#[derive(Debug, Clone)]
pub struct HtPhasorOutput {
    pub in_phase: Vec<f64>,
    pub quadrature: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct HtPhasorInput<'a> {
    pub data: HtData<'a>,
    pub config: HtConfig,
}

impl<'a> HtPhasorInput<'a> {
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
pub fn ht_phasor_lookback(config: &HtConfig) -> usize {
    config.lookback(HtFunc::Phasor)
}

pub fn ht_phasor(input: &HtPhasorInput) -> Result<HtPhasorOutput, HtError> {
    let data = input.data.as_ref();
    let lookback = ht_phasor_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let mut in_phase = alloc_with_nan_prefix(data.len(), first + lookback);
    let mut quadrature = alloc_with_nan_prefix(data.len(), first + lookback);
    ht_phasor_compute_into(data, first, &input.config, &mut in_phase, &mut quadrature)?;
    Ok(HtPhasorOutput {
        in_phase,
        quadrature,
    })
}

pub fn ht_phasor_into_slice(
    dst_in_phase: &mut [f64],
    dst_quadrature: &mut [f64],
    input: &HtPhasorInput,
) -> Result<(), HtError> {
    let data = input.data.as_ref();
    let lookback = ht_phasor_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    check_dst(
        FUNC,
        data.len(),
        &[dst_in_phase.len(), dst_quadrature.len()],
    )?;
    fill_nan(&mut dst_in_phase[..first + lookback]);
    fill_nan(&mut dst_quadrature[..first + lookback]);
    ht_phasor_compute_into(data, first, &input.config, dst_in_phase, dst_quadrature)
}

fn ht_phasor_compute_into(
    data: &[f64],
    first: usize,
    config: &HtConfig,
    in_phase: &mut [f64],
    quadrature: &mut [f64],
) -> Result<(), HtError> {
    let lookback = ht_phasor_lookback(config);
    let warm = first + lookback;
    walk_range(
        &data[first..],
        0,
        data.len() - first - 1,
        lookback,
        config.anchor,
        |bar| (bar.in_phase, bar.quadrature),
        |i, (ip, q)| {
            in_phase[warm + i] = ip;
            quadrature[warm + i] = q;
        },
    )
    .map_err(HtError::range(FUNC))?;
    Ok(())
}

/// Windowed call writing `I1` and `Q1` for `start..=end`.
///
/// Under the default [`WarmupAnchor::SeriesStart`] the engine walks from bar 0,
/// so the cost is O(`end`) however narrow the window. [`WarmupAnchor::Lookback`]
/// walks `end - start + lookback` bars instead, and its output depends on `start`.
pub fn ht_phasor_range(
    data: &[f64],
    start: usize,
    end: usize,
    config: &HtConfig,
    out_in_phase: &mut [f64],
    out_quadrature: &mut [f64],
) -> Result<RangeOutput, HtError> {
    check_window(
        FUNC,
        data.len(),
        start,
        end,
        &[out_in_phase.len(), out_quadrature.len()],
    )?;
    walk_range(
        data,
        start,
        end,
        ht_phasor_lookback(config),
        config.anchor,
        |bar| (bar.in_phase, bar.quadrature),
        |i, (ip, q)| {
            out_in_phase[i] = ip;
            out_quadrature[i] = q;
        },
    )
    .map_err(HtError::range(FUNC))
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HtPhasorBuilder {
    config: HtConfig,
}

impl HtPhasorBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn unstable_period(mut self, bars: usize) -> Self {
        self.config.unstable.set(HtFunc::Phasor, bars);
        self
    }
    #[inline(always)]
    pub fn anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.config.anchor = anchor;
        self
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<HtPhasorOutput, HtError> {
        ht_phasor(&HtPhasorInput::from_candles(c, "close", self.config))
    }
    #[inline(always)]
    pub fn apply_slice(self, d: &[f64]) -> Result<HtPhasorOutput, HtError> {
        ht_phasor(&HtPhasorInput::from_slice(d, self.config))
    }
    #[inline(always)]
    pub fn into_stream(self) -> HtPhasorStream {
        HtPhasorStream::new(&self.config)
    }
}

#[derive(Debug, Clone)]
pub struct HtPhasorStream {
    core: HtCoreStream,
}

impl HtPhasorStream {
    pub fn new(config: &HtConfig) -> Self {
        Self {
            core: HtCoreStream::new(ht_phasor_lookback(config)),
        }
    }

    /// Returns `(in_phase, quadrature)` once the lookback has elapsed.
    #[inline(always)]
    pub fn update(&mut self, value: f64) -> Option<(f64, f64)> {
        self.core
            .update(value)
            .map(|bar| (bar.in_phase, bar.quadrature))
    }
}
