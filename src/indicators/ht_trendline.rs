//! # Hilbert Transform - Instantaneous Trendline (HT_TRENDLINE)
//!
//! A simple average of raw prices over the current dominant cycle, smoothed with
//! the same 4-tap weighted average used on price. Averaging over exactly one
//! cycle cancels the cyclic component, leaving the trend.
//!
//! ## Parameters
//! - **config**: unstable period and warm-up anchor, see [`HtConfig`].
//!
//! ## Errors
//! See [`HtError`]; messages are prefixed with `ht_trendline:`.

use crate::indicators::ht_core::phase::PriceRing;
use crate::indicators::ht_core::smoother::smooth_price;
use crate::indicators::ht_core::{
    check_dst, check_window, prepare, walk_range, HtBar, HtConfig, HtCoreStream, HtData, HtError,
    HtFunc, WarmupAnchor,
};
use crate::utilities::data_loader::Candles;
use crate::utilities::helpers::{alloc_with_nan_prefix, fill_nan};
use crate::utilities::range::RangeOutput;

const FUNC: &str = "ht_trendline";

/// Cycle-length average of raw prices, smoothed by the 4-tap weighted average.
#[derive(Debug, Clone, Default)]
pub struct TrendlineFilter {
    prices: PriceRing,
    filled: usize,
    /// Last three cycle averages, newest first.
    averages: [f64; 3],
    primed: bool,
}

impl TrendlineFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, bar: &HtBar) -> f64 {
        self.prices.push(bar.price);
        self.filled += 1;

        let n = bar.dc_period_int.min(self.filled);
        let average = if n > 0 {
            self.prices.iter_newest(n).sum::<f64>() / n as f64
        } else {
            bar.price
        };
        if !self.primed {
            self.averages = [average; 3];
            self.primed = true;
        }

        let [a1, a2, a3] = self.averages;
        self.averages = [average, a1, a2];
        smooth_price(average, a1, a2, a3)
    }
}

#[derive(Debug, Clone)]
pub struct HtTrendlineOutput {
    pub values: Vec<f64>,
}

impl std::ops::Deref for HtTrendlineOutput {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

#[derive(Debug, Clone)]
pub struct HtTrendlineInput<'a> {
    pub data: HtData<'a>,
    pub config: HtConfig,
}

impl<'a> HtTrendlineInput<'a> {
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
pub fn ht_trendline_lookback(config: &HtConfig) -> usize {
    config.lookback(HtFunc::Trendline)
}

pub fn ht_trendline(input: &HtTrendlineInput) -> Result<HtTrendlineOutput, HtError> {
    let data = input.data.as_ref();
    let lookback = ht_trendline_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let mut out = alloc_with_nan_prefix(data.len(), first + lookback);
    ht_trendline_compute_into(data, first, &input.config, &mut out)?;
    Ok(HtTrendlineOutput { values: out })
}

pub fn ht_trendline_into_slice(dst: &mut [f64], input: &HtTrendlineInput) -> Result<(), HtError> {
    let data = input.data.as_ref();
    let lookback = ht_trendline_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    check_dst(FUNC, data.len(), &[dst.len()])?;
    fill_nan(&mut dst[..first + lookback]);
    ht_trendline_compute_into(data, first, &input.config, dst)
}

fn ht_trendline_compute_into(
    data: &[f64],
    first: usize,
    config: &HtConfig,
    out: &mut [f64],
) -> Result<(), HtError> {
    let lookback = ht_trendline_lookback(config);
    let warm = first + lookback;
    let mut filter = TrendlineFilter::new();
    walk_range(
        &data[first..],
        0,
        data.len() - first - 1,
        lookback,
        config.anchor,
        |bar| filter.advance(bar),
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
pub fn ht_trendline_range(
    data: &[f64],
    start: usize,
    end: usize,
    config: &HtConfig,
    out: &mut [f64],
) -> Result<RangeOutput, HtError> {
    check_window(FUNC, data.len(), start, end, &[out.len()])?;
    let mut filter = TrendlineFilter::new();
    walk_range(
        data,
        start,
        end,
        ht_trendline_lookback(config),
        config.anchor,
        |bar| filter.advance(bar),
        |i, v| out[i] = v,
    )
    .map_err(HtError::range(FUNC))
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HtTrendlineBuilder {
    config: HtConfig,
}

impl HtTrendlineBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn unstable_period(mut self, bars: usize) -> Self {
        self.config.unstable.set(HtFunc::Trendline, bars);
        self
    }
    #[inline(always)]
    pub fn anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.config.anchor = anchor;
        self
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<HtTrendlineOutput, HtError> {
        ht_trendline(&HtTrendlineInput::from_candles(c, "close", self.config))
    }
    #[inline(always)]
    pub fn apply_slice(self, d: &[f64]) -> Result<HtTrendlineOutput, HtError> {
        ht_trendline(&HtTrendlineInput::from_slice(d, self.config))
    }
    #[inline(always)]
    pub fn into_stream(self) -> HtTrendlineStream {
        HtTrendlineStream::new(&self.config)
    }
}

#[derive(Debug, Clone)]
pub struct HtTrendlineStream {
    core: HtCoreStream,
    filter: TrendlineFilter,
}

impl HtTrendlineStream {
    pub fn new(config: &HtConfig) -> Self {
        Self {
            core: HtCoreStream::new(ht_trendline_lookback(config)),
            filter: TrendlineFilter::new(),
        }
    }

    #[inline]
    pub fn update(&mut self, value: f64) -> Option<f64> {
        let (bar, ready) = self.core.step(value);
        let trendline = self.filter.advance(&bar?);
        ready.then_some(trendline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::data_loader::sample_candles;
    use std::error::Error;
    use std::f64::consts::TAU;

    fn check_ht_trendline_removes_cycle(test_name: &str) -> Result<(), Box<dyn Error>> {
        let data: Vec<f64> = (0..300)
            .map(|t| 100.0 + 10.0 * (TAU * t as f64 / 20.0).sin())
            .collect();
        let out = HtTrendlineBuilder::new().apply_slice(&data)?;
        for i in 100..300 {
            assert!(
                (out[i] - 100.0).abs() < 1e-6,
                "[{}] trendline {} at {}",
                test_name,
                out[i],
                i
            );
        }
        Ok(())
    }

    fn check_ht_trendline_constant(test_name: &str) -> Result<(), Box<dyn Error>> {
        let out = HtTrendlineBuilder::new().apply_slice(&[100.0; 150])?;
        for i in 63..150 {
            assert!((out[i] - 100.0).abs() < 1e-12, "[{}] idx {}", test_name, i);
        }
        Ok(())
    }

    fn check_ht_trendline_lags_ramp(test_name: &str) -> Result<(), Box<dyn Error>> {
        let data: Vec<f64> = (0..200).map(|t| 100.0 + 2.0 * t as f64).collect();
        let out = HtTrendlineBuilder::new().apply_slice(&data)?;
        for i in 64..200 {
            assert!(out[i] < data[i], "[{}] trendline above price at {}", test_name, i);
            assert!(out[i] > out[i - 1], "[{}] trendline not rising at {}", test_name, i);
        }
        Ok(())
    }

    fn check_ht_trendline_filter_weights(test_name: &str) -> Result<(), Box<dyn Error>> {
        let mut filter = TrendlineFilter::new();
        let mut bar = HtBar {
            dc_period_int: 2,
            ..HtBar::default()
        };
        let mut last = 0.0;
        for price in [10.0, 20.0, 30.0, 40.0, 50.0] {
            bar.price = price;
            last = filter.advance(&bar);
        }
        // two-bar averages, newest first: 45, 35, 25, 15
        assert!(
            (last - (4.0 * 45.0 + 3.0 * 35.0 + 2.0 * 25.0 + 15.0) / 10.0).abs() < 1e-12,
            "[{}] got {}",
            test_name,
            last
        );
        Ok(())
    }

    fn check_ht_trendline_streaming(test_name: &str) -> Result<(), Box<dyn Error>> {
        let candles = sample_candles(260);
        let batch = HtTrendlineBuilder::new().unstable_period(9).apply(&candles)?;
        let mut stream = HtTrendlineBuilder::new().unstable_period(9).into_stream();
        for (i, &price) in candles.close.iter().enumerate() {
            match stream.update(price) {
                Some(v) => assert_eq!(v, batch[i], "[{}] idx {}", test_name, i),
                None => assert!(batch[i].is_nan(), "[{}] idx {}", test_name, i),
            }
        }
        Ok(())
    }

    fn check_ht_trendline_range_matches_full(test_name: &str) -> Result<(), Box<dyn Error>> {
        let candles = sample_candles(300);
        let full = ht_trendline(&HtTrendlineInput::with_default_candles(&candles))?;
        let mut out = vec![0.0; 80];
        let r = ht_trendline_range(&candles.close, 200, 279, &HtConfig::default(), &mut out)?;
        assert_eq!(r.out_beg_idx, 200, "[{}]", test_name);
        assert_eq!(&out[..], &full[200..280], "[{}]", test_name);
        Ok(())
    }

    macro_rules! generate_all_ht_trendline_tests {
        ($($test_fn:ident),*) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<$test_fn _f64>]() {
                        $test_fn(stringify!([<$test_fn _f64>])).unwrap();
                    }
                )*
            }
        }
    }

    generate_all_ht_trendline_tests!(
        check_ht_trendline_removes_cycle,
        check_ht_trendline_constant,
        check_ht_trendline_lags_ramp,
        check_ht_trendline_filter_weights,
        check_ht_trendline_streaming,
        check_ht_trendline_range_matches_full
    );
}
