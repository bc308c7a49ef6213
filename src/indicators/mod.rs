pub mod ht_core;
pub use ht_core::{
    ht_core, HtBar, HtConfig, HtCoreInput, HtCoreOutput, HtCoreStream, HtData, HtEngine, HtError,
    HtFunc, UnstablePeriods, WarmupAnchor,
};
pub mod ht_dcperiod;
pub use ht_dcperiod::{
    ht_dcperiod, HtDcPeriodBuilder, HtDcPeriodInput, HtDcPeriodOutput, HtDcPeriodStream,
};
pub mod ht_dcphase;
pub use ht_dcphase::{ht_dcphase, HtDcPhaseBuilder, HtDcPhaseInput, HtDcPhaseOutput, HtDcPhaseStream};
pub mod ht_phasor;
pub use ht_phasor::{ht_phasor, HtPhasorBuilder, HtPhasorInput, HtPhasorOutput, HtPhasorStream};
pub mod ht_sine;
pub use ht_sine::{ht_sine, HtSineBuilder, HtSineInput, HtSineOutput, HtSineStream};
pub mod ht_trendline;
pub use ht_trendline::{
    ht_trendline, HtTrendlineBuilder, HtTrendlineInput, HtTrendlineOutput, HtTrendlineStream,
};
pub mod ht_trendmode;
pub use ht_trendmode::{
    ht_trendmode, HtTrendModeBuilder, HtTrendModeInput, HtTrendModeOutput, HtTrendModeStream,
};
pub mod moving_averages;
