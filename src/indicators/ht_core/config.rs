//! Per-call configuration for the Hilbert-transform indicators.
//!
//! There is no process-wide state: an [`HtConfig`] is a small `Copy` value
//! handed to every call, builder and stream. Changing it between calls is the
//! only way to change warm-up behaviour, and an in-flight computation never
//! observes a change.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bars consumed before the first trusted output, excluding the unstable period.
pub const HT_LOOKBACK: usize = 63;

/// Identifies one of the indicators built on the shared engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HtFunc {
    DcPeriod,
    DcPhase,
    Phasor,
    Sine,
    Trendline,
    TrendMode,
    Mama,
}

impl HtFunc {
    pub const ALL: [HtFunc; 7] = [
        HtFunc::DcPeriod,
        HtFunc::DcPhase,
        HtFunc::Phasor,
        HtFunc::Sine,
        HtFunc::Trendline,
        HtFunc::TrendMode,
        HtFunc::Mama,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            HtFunc::DcPeriod => 0,
            HtFunc::DcPhase => 1,
            HtFunc::Phasor => 2,
            HtFunc::Sine => 3,
            HtFunc::Trendline => 4,
            HtFunc::TrendMode => 5,
            HtFunc::Mama => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HtFunc::DcPeriod => "ht_dcperiod",
            HtFunc::DcPhase => "ht_dcphase",
            HtFunc::Phasor => "ht_phasor",
            HtFunc::Sine => "ht_sine",
            HtFunc::Trendline => "ht_trendline",
            HtFunc::TrendMode => "ht_trendmode",
            HtFunc::Mama => "mama",
        }
    }
}

/// Extra warm-up bars per indicator, all zero by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnstablePeriods {
    periods: [usize; 7],
}

impl UnstablePeriods {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, func: HtFunc) -> usize {
        self.periods[func.index()]
    }

    pub fn set(&mut self, func: HtFunc, bars: usize) {
        tracing::debug!(func = func.name(), bars, "unstable period set");
        self.periods[func.index()] = bars;
    }

    pub fn set_all(&mut self, bars: usize) {
        tracing::debug!(bars, "unstable period set for all HT functions");
        self.periods = [bars; 7];
    }

    /// Largest unstable period across all functions.
    pub fn max(&self) -> usize {
        self.periods.iter().copied().max().unwrap_or(0)
    }
}

/// Where a windowed call starts feeding bars to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WarmupAnchor {
    /// Always from bar 0. Output for a bar never depends on the requested window.
    #[default]
    SeriesStart,
    /// From `start - lookback`. Cheaper on long series; output depends on `start`.
    Lookback,
}

impl WarmupAnchor {
    /// First bar fed to the engine for an output window beginning at `begin`.
    #[inline]
    pub fn walk_start(self, begin: usize, lookback: usize) -> usize {
        match self {
            WarmupAnchor::SeriesStart => 0,
            WarmupAnchor::Lookback => begin.saturating_sub(lookback),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HtConfig {
    pub unstable: UnstablePeriods,
    pub anchor: WarmupAnchor,
}

impl HtConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unstable(mut self, func: HtFunc, bars: usize) -> Self {
        self.unstable.set(func, bars);
        self
    }

    pub fn with_anchor(mut self, anchor: WarmupAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Total lookback of `func`: the engine's fixed warm-up plus its unstable period.
    #[inline]
    pub fn lookback(&self, func: HtFunc) -> usize {
        HT_LOOKBACK + self.unstable.get(func)
    }

    /// Lookback that satisfies every function at once.
    #[inline]
    pub fn max_lookback(&self) -> usize {
        HT_LOOKBACK + self.unstable.max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstable_periods_default_zero() {
        let cfg = HtConfig::default();
        for func in HtFunc::ALL {
            assert_eq!(cfg.unstable.get(func), 0);
            assert_eq!(cfg.lookback(func), HT_LOOKBACK);
        }
        assert_eq!(cfg.anchor, WarmupAnchor::SeriesStart);
    }

    #[test]
    fn test_set_touches_one_function() {
        let cfg = HtConfig::new().with_unstable(HtFunc::Sine, 12);
        assert_eq!(cfg.lookback(HtFunc::Sine), 75);
        assert_eq!(cfg.lookback(HtFunc::DcPhase), 63);
        assert_eq!(cfg.max_lookback(), 75);
    }

    #[test]
    fn test_set_all() {
        let mut u = UnstablePeriods::new();
        u.set_all(5);
        u.set(HtFunc::Mama, 9);
        assert_eq!(u.get(HtFunc::DcPeriod), 5);
        assert_eq!(u.get(HtFunc::Mama), 9);
        assert_eq!(u.max(), 9);
    }

    #[test]
    fn test_walk_start() {
        assert_eq!(WarmupAnchor::SeriesStart.walk_start(150, 63), 0);
        assert_eq!(WarmupAnchor::Lookback.walk_start(150, 63), 87);
        assert_eq!(WarmupAnchor::Lookback.walk_start(40, 63), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde() {
        let cfg = HtConfig::new()
            .with_unstable(HtFunc::TrendMode, 20)
            .with_anchor(WarmupAnchor::Lookback);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: HtConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
