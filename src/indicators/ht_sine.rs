//! # Hilbert Transform - SineWave (HT_SINE)
//!
//! `sin(phase)` and the lead sine `sin(phase + 45°)` of the dominant cycle.
//! The lead line crosses the sine line ahead of cycle turning points.
//!
//! ## Parameters
//! - **config**: unstable period and warm-up anchor, see [`HtConfig`].
//!
//! ## Errors
//! See [`HtError`]; messages are prefixed with `ht_sine:`.

use crate::indicators::ht_core::{
    check_dst, check_window, prepare, walk_range, HtConfig, HtCoreStream, HtData, HtError, HtFunc,
    WarmupAnchor,
};
use crate::utilities::data_loader::Candles;
use crate::utilities::helpers::{alloc_with_nan_prefix, fill_nan};
use crate::utilities::range::RangeOutput;

const FUNC: &str = "ht_sine";

#[derive(Debug, Clone)]
pub struct HtSineOutput {
    pub sine: Vec<f64>,
    pub lead_sine: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct HtSineInput<'a> {
    pub data: HtData<'a>,
    pub config: HtConfig,
}

impl<'a> HtSineInput<'a> {
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
pub fn ht_sine_lookback(config: &HtConfig) -> usize {
    config.lookback(HtFunc::Sine)
}

pub fn ht_sine(input: &HtSineInput) -> Result<HtSineOutput, HtError> {
    let data = input.data.as_ref();
    let lookback = ht_sine_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    let mut sine = alloc_with_nan_prefix(data.len(), first + lookback);
    let mut lead_sine = alloc_with_nan_prefix(data.len(), first + lookback);
    ht_sine_compute_into(data, first, &input.config, &mut sine, &mut lead_sine)?;
    Ok(HtSineOutput { sine, lead_sine })
}

pub fn ht_sine_into_slice(
    dst_sine: &mut [f64],
    dst_lead_sine: &mut [f64],
    input: &HtSineInput,
) -> Result<(), HtError> {
    let data = input.data.as_ref();
    let lookback = ht_sine_lookback(&input.config);
    let first = prepare(FUNC, data, lookback)?;
    check_dst(FUNC, data.len(), &[dst_sine.len(), dst_lead_sine.len()])?;
    fill_nan(&mut dst_sine[..first + lookback]);
    fill_nan(&mut dst_lead_sine[..first + lookback]);
    ht_sine_compute_into(data, first, &input.config, dst_sine, dst_lead_sine)
}

fn ht_sine_compute_into(
    data: &[f64],
    first: usize,
    config: &HtConfig,
    sine: &mut [f64],
    lead_sine: &mut [f64],
) -> Result<(), HtError> {
    let lookback = ht_sine_lookback(config);
    let warm = first + lookback;
    walk_range(
        &data[first..],
        0,
        data.len() - first - 1,
        lookback,
        config.anchor,
        |bar| (bar.sine, bar.lead_sine),
        |i, (s, l)| {
            sine[warm + i] = s;
            lead_sine[warm + i] = l;
        },
    )
    .map_err(HtError::range(FUNC))?;
    Ok(())
}

/// Windowed call writing sine and lead sine for `start..=end`.
///
/// Under the default [`WarmupAnchor::SeriesStart`] the engine walks from bar 0,
/// so the cost is O(`end`) however narrow the window. [`WarmupAnchor::Lookback`]
/// walks `end - start + lookback` bars instead, and its output depends on `start`.
pub fn ht_sine_range(
    data: &[f64],
    start: usize,
    end: usize,
    config: &HtConfig,
    out_sine: &mut [f64],
    out_lead_sine: &mut [f64],
) -> Result<RangeOutput, HtError> {
    check_window(
        FUNC,
        data.len(),
        start,
        end,
        &[out_sine.len(), out_lead_sine.len()],
    )?;
    walk_range(
        data,
        start,
        end,
        ht_sine_lookback(config),
        config.anchor,
        |bar| (bar.sine, bar.lead_sine),
        |i, (s, l)| {
            out_sine[i] = s;
            out_lead_sine[i] = l;
        },
    )
    .map_err(HtError::range(FUNC))
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HtSineBuilder {
    config: HtConfig,
}

impl HtSineBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
    #[inline(always)]
    pub fn unstable_period(mut self, bars: usize) -> Self {
        self.config.unstable.set(HtFunc::Sine, bars);
        self
    }
    #[inline(always)]
    pub fn anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.config.anchor = anchor;
        self
    }
    #[inline(always)]
    pub fn apply(self, c: &Candles) -> Result<HtSineOutput, HtError> {
        ht_sine(&HtSineInput::from_candles(c, "close", self.config))
    }
    #[inline(always)]
    pub fn apply_slice(self, d: &[f64]) -> Result<HtSineOutput, HtError> {
        ht_sine(&HtSineInput::from_slice(d, self.config))
    }
    #[inline(always)]
    pub fn into_stream(self) -> HtSineStream {
        HtSineStream::new(&self.config)
    }
}

#[derive(Debug, Clone)]
pub struct HtSineStream {
    core: HtCoreStream,
}

impl HtSineStream {
    pub fn new(config: &HtConfig) -> Self {
        Self {
            core: HtCoreStream::new(ht_sine_lookback(config)),
        }
    }

    /// Returns `(sine, lead_sine)`.
    #[inline(always)]
    pub fn update(&mut self, value: f64) -> Option<(f64, f64)> {
        self.core.update(value).map(|bar| (bar.sine, bar.lead_sine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ht_dcphase::{ht_dcphase, HtDcPhaseInput};
    use crate::utilities::data_loader::sample_candles;
    use std::error::Error;
    use std::f64::consts::{PI, TAU};

    fn up_crossings(values: &[f64], from: usize) -> Vec<usize> {
        (from..values.len() - 1)
            .filter(|&t| values[t] < 0.0 && values[t + 1] >= 0.0)
            .collect()
    }

    fn check_ht_sine_matches_phase(test_name: &str) -> Result<(), Box<dyn Error>> {
        let candles = sample_candles(400);
        let out = HtSineBuilder::new().apply(&candles)?;
        let phase = ht_dcphase(&HtDcPhaseInput::with_default_candles(&candles))?;
        for i in 63..400 {
            let s = (phase[i] * PI / 180.0).sin();
            let l = ((phase[i] + 45.0) * PI / 180.0).sin();
            assert!((out.sine[i] - s).abs() < 1e-9, "[{}] sine at {}", test_name, i);
            assert!((out.lead_sine[i] - l).abs() < 1e-9, "[{}] lead at {}", test_name, i);
        }
        Ok(())
    }

    fn check_ht_sine_lead_crosses_first(test_name: &str) -> Result<(), Box<dyn Error>> {
        let data: Vec<f64> = (0..400)
            .map(|t| 100.0 + 10.0 * (TAU * t as f64 / 20.0).sin())
            .collect();
        let out = HtSineBuilder::new().apply_slice(&data)?;
        let sine_up = up_crossings(&out.sine, 120);
        let lead_up = up_crossings(&out.lead_sine, 110);
        assert!(sine_up.len() >= 10, "[{}] {:?}", test_name, sine_up);
        for t in sine_up {
            // an eighth of a 20-bar cycle is 2.5 bars
            assert!(
                lead_up.iter().any(|&l| l + 2 <= t && t <= l + 3),
                "[{}] sine crossing at {} has no lead crossing 2-3 bars earlier: {:?}",
                test_name,
                t,
                lead_up
            );
        }
        Ok(())
    }

    fn check_ht_sine_streaming(test_name: &str) -> Result<(), Box<dyn Error>> {
        let candles = sample_candles(200);
        let batch = HtSineBuilder::new().apply(&candles)?;
        let mut stream = HtSineBuilder::new().into_stream();
        for (i, &price) in candles.close.iter().enumerate() {
            match stream.update(price) {
                Some((s, l)) => {
                    assert_eq!(s, batch.sine[i], "[{}] idx {}", test_name, i);
                    assert_eq!(l, batch.lead_sine[i], "[{}] idx {}", test_name, i);
                }
                None => assert!(batch.sine[i].is_nan(), "[{}] idx {}", test_name, i),
            }
        }
        Ok(())
    }

    fn check_ht_sine_rewindow(test_name: &str) -> Result<(), Box<dyn Error>> {
        let candles = sample_candles(260);
        let cfg = HtConfig::default();
        let (mut s1, mut l1) = (vec![0.0; 101], vec![0.0; 101]);
        let (mut s2, mut l2) = (vec![0.0; 51], vec![0.0; 51]);
        ht_sine_range(&candles.close, 100, 200, &cfg, &mut s1, &mut l1)?;
        ht_sine_range(&candles.close, 150, 200, &cfg, &mut s2, &mut l2)?;
        assert_eq!(&s1[50..], &s2[..], "[{}]", test_name);
        assert_eq!(&l1[50..], &l2[..], "[{}]", test_name);
        Ok(())
    }

    fn check_ht_sine_empty_window(test_name: &str) -> Result<(), Box<dyn Error>> {
        let candles = sample_candles(100);
        let cfg = HtConfig::new().with_unstable(HtFunc::Sine, 30);
        let (mut s, mut l) = (vec![0.0; 93], vec![0.0; 93]);
        let r = ht_sine_range(&candles.close, 0, 92, &cfg, &mut s, &mut l)?;
        assert!(r.is_empty(), "[{}]", test_name);
        assert_eq!(r.out_beg_idx, 0);
        let r = ht_sine_range(&candles.close, 0, 93, &cfg, &mut s, &mut l);
        assert!(r.is_err(), "[{}] 94-bar window needs a 94-slot buffer", test_name);
        Ok(())
    }

    macro_rules! generate_all_ht_sine_tests {
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

    generate_all_ht_sine_tests!(
        check_ht_sine_matches_phase,
        check_ht_sine_lead_crosses_first,
        check_ht_sine_streaming,
        check_ht_sine_rewindow,
        check_ht_sine_empty_window
    );
}
