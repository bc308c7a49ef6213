mod common;

use common::{assert_array_close, ramp_series, sine_series, walk_from_steps};
use cycle_ta::indicators::ht_core::{ht_core_range, HtBar};
use cycle_ta::indicators::moving_averages::mama::{mama, MamaBuilder, MamaInput, MamaParams};
use cycle_ta::indicators::{
    ht_core, ht_dcperiod, ht_trendmode, HtConfig, HtCoreInput, HtDcPeriodBuilder, HtDcPeriodInput,
    HtError, HtFunc, HtSineBuilder, HtTrendModeInput, HtTrendlineBuilder, WarmupAnchor,
};
use proptest::prelude::*;

#[test]
fn dominant_cycle_locks_onto_pure_sines() {
    for period in [15.0, 20.0, 30.0] {
        let data = sine_series(400, period, 10.0);
        let out = HtDcPeriodBuilder::new().apply_slice(&data).unwrap();
        for (i, &sp) in out.iter().enumerate().skip(200) {
            assert!(
                (sp - period).abs() < 0.5,
                "period {}: smooth period {} at bar {}",
                period,
                sp,
                i
            );
        }
    }
}

#[test]
fn constant_series_is_flat_everywhere() {
    let data = vec![100.0; 200];
    let trend = HtTrendlineBuilder::new().apply_slice(&data).unwrap();
    assert_array_close(&trend[63..], &vec![100.0; 137], 0.0, 1e-12, "trendline");

    let m = MamaBuilder::new().apply_slice(&data).unwrap();
    assert_array_close(&m.mama_values[63..], &vec![100.0; 137], 0.0, 1e-12, "mama");
    assert_array_close(&m.fama_values[63..], &vec![100.0; 137], 0.0, 1e-12, "fama");

    let modes = ht_trendmode(&HtTrendModeInput::from_slice(&data, HtConfig::default())).unwrap();
    assert!(modes[63..].iter().all(|&v| v == 0.0));
}

#[test]
fn mama_lags_a_ramp() {
    let data = ramp_series(200, 2.0);
    let out = mama(&MamaInput::from_slice(&data, MamaParams::default())).unwrap();
    assert!((out.mama_values[150] - 396.8476).abs() < 0.05, "{}", out.mama_values[150]);
    assert!((out.fama_values[150] - 388.2888).abs() < 0.25, "{}", out.fama_values[150]);
}

#[test]
fn trend_mode_separates_ramp_from_cycle() {
    let cfg = HtConfig::default();
    let ramp = ramp_series(200, 2.0);
    let out = ht_trendmode(&HtTrendModeInput::from_slice(&ramp, cfg)).unwrap();
    assert!(out[63..].iter().all(|&v| v == 1.0));

    let cycle = sine_series(300, 20.0, 1.0);
    let out = ht_trendmode(&HtTrendModeInput::from_slice(&cycle, cfg)).unwrap();
    assert!(out[63..].iter().all(|&v| v == 0.0));
}

#[test]
fn lookback_anchor_matches_sliced_input() {
    let data = sine_series(300, 20.0, 10.0);
    let cfg = HtConfig::new()
        .with_unstable(HtFunc::DcPeriod, 10)
        .with_anchor(WarmupAnchor::Lookback);
    let mut windowed = vec![0.0; 101];
    let r = cycle_ta::indicators::ht_dcperiod::ht_dcperiod_range(&data, 199, 299, &cfg, &mut windowed)
        .unwrap();
    assert_eq!(r.out_beg_idx, 199);

    // the walk starts 73 bars before the window
    let sliced = HtDcPeriodBuilder::new()
        .unstable_period(10)
        .apply_slice(&data[126..])
        .unwrap();
    assert_eq!(&windowed[..], &sliced[73..]);
}

#[test]
fn errors_name_the_function() {
    let err = ht_dcperiod(&HtDcPeriodInput::from_slice(&[f64::NAN; 80], HtConfig::default()))
        .unwrap_err();
    assert_eq!(err, HtError::AllValuesNaN { func: "ht_dcperiod" });
    assert_eq!(err.to_string(), "ht_dcperiod: All values are NaN.");

    let short = vec![1.0; 63];
    let err = HtSineBuilder::new().apply_slice(&short).unwrap_err();
    assert_eq!(
        err,
        HtError::NotEnoughValidData {
            func: "ht_sine",
            needed: 64,
            valid: 63
        }
    );
}

fn walk_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0f64..5.0, 70..300).prop_map(|steps| walk_from_steps(&steps))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engine_outputs_stay_in_band(data in walk_strategy()) {
        let out = ht_core(&HtCoreInput::from_slice(&data, HtConfig::default())).unwrap();
        for i in 63..data.len() {
            let sp = out.smooth_period[i];
            prop_assert!((6.0..=50.0).contains(&sp), "smooth period {} at {}", sp, i);
            let phase = out.dc_phase[i];
            prop_assert!(phase > -45.0 && phase <= 315.0, "phase {} at {}", phase, i);
            prop_assert!((out.sine[i] - phase.to_radians().sin()).abs() < 1e-12);
            prop_assert!((out.lead_sine[i] - (phase + 45.0).to_radians().sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn windows_reproduce_the_full_run(data in walk_strategy(), cut in 0.0f64..1.0) {
        let cfg = HtConfig::default();
        let len = data.len();
        let start = 63 + ((len - 64) as f64 * cut) as usize;
        let full = ht_core(&HtCoreInput::from_slice(&data, cfg)).unwrap();

        let mut bars = vec![HtBar::default(); len - start];
        let r = ht_core_range(&data, start, len - 1, &cfg, &mut bars).unwrap();
        prop_assert_eq!(r.out_beg_idx, start);
        prop_assert_eq!(r.out_nb_element, len - start);
        for (k, bar) in bars.iter().enumerate() {
            prop_assert_eq!(bar.smooth_period, full.smooth_period[start + k]);
            prop_assert_eq!(bar.dc_phase, full.dc_phase[start + k]);
        }
    }

    #[test]
    fn repeated_calls_are_identical(data in walk_strategy()) {
        let a = HtDcPeriodBuilder::new().apply_slice(&data).unwrap();
        let b = HtDcPeriodBuilder::new().apply_slice(&data).unwrap();
        prop_assert_eq!(&a[63..], &b[63..]);
    }

    #[test]
    fn stream_matches_batch(data in walk_strategy(), unstable in 0usize..20) {
        let builder = HtDcPeriodBuilder::new().unstable_period(unstable);
        if data.len() <= 63 + unstable {
            return Ok(());
        }
        let batch = builder.apply_slice(&data).unwrap();
        let mut stream = builder.into_stream();
        for (i, &price) in data.iter().enumerate() {
            match stream.update(price) {
                Some(v) => prop_assert_eq!(v, batch[i]),
                None => prop_assert!(batch[i].is_nan()),
            }
        }
    }

    #[test]
    fn mama_stays_within_price_range(
        data in walk_strategy(),
        fast in 0.1f64..0.9,
        slow in 0.01f64..0.1,
    ) {
        let out = MamaBuilder::new().fast_limit(fast).slow_limit(slow).apply_slice(&data).unwrap();
        let lo = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for i in 63..data.len() {
            for v in [out.mama_values[i], out.fama_values[i]] {
                prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "{} outside [{}, {}]", v, lo, hi);
            }
        }
    }

    #[test]
    fn trend_mode_is_binary(data in walk_strategy()) {
        let out = ht_trendmode(&HtTrendModeInput::from_slice(&data, HtConfig::default())).unwrap();
        prop_assert!(out[..63].iter().all(|v| v.is_nan()));
        prop_assert!(out[63..].iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
