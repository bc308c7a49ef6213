use thiserror::Error;

#[derive(Debug, Error)]
pub enum CandleError {
    #[error("candles: field lengths differ: {field} has {got} values, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("candles: unknown field `{0}`")]
    InvalidField(String),
}

/// Column-oriented OHLCV bars.
///
/// The derived price sources (`hl2`, `hlc3`, `ohlc4`, `hlcc4`) are computed once
/// at construction so every indicator can borrow them as plain slices.
#[derive(Debug, Clone)]
pub struct Candles {
    pub timestamp: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub hl2: Vec<f64>,
    pub hlc3: Vec<f64>,
    pub ohlc4: Vec<f64>,
    pub hlcc4: Vec<f64>,
}

impl Candles {
    pub fn new(
        timestamp: Vec<i64>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self, CandleError> {
        let expected = timestamp.len();
        for (field, got) in [
            ("open", open.len()),
            ("high", high.len()),
            ("low", low.len()),
            ("close", close.len()),
            ("volume", volume.len()),
        ] {
            if got != expected {
                return Err(CandleError::LengthMismatch {
                    field,
                    got,
                    expected,
                });
            }
        }

        let hl2 = high
            .iter()
            .zip(low.iter())
            .map(|(&h, &l)| (h + l) / 2.0)
            .collect();
        let hlc3 = high
            .iter()
            .zip(low.iter())
            .zip(close.iter())
            .map(|((&h, &l), &c)| (h + l + c) / 3.0)
            .collect();
        let ohlc4 = open
            .iter()
            .zip(high.iter())
            .zip(low.iter())
            .zip(close.iter())
            .map(|(((&o, &h), &l), &c)| (o + h + l + c) / 4.0)
            .collect();
        let hlcc4 = high
            .iter()
            .zip(low.iter())
            .zip(close.iter())
            .map(|((&h, &l), &c)| (h + l + 2.0 * c) / 4.0)
            .collect();

        Ok(Candles {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            hl2,
            hlc3,
            ohlc4,
            hlcc4,
        })
    }

    /// Builds candles whose every price field is `close`. Handy for feeding a
    /// single series through candle-based APIs.
    pub fn from_close(close: Vec<f64>) -> Self {
        let n = close.len();
        Candles {
            timestamp: (0..n as i64).collect(),
            open: close.clone(),
            high: close.clone(),
            low: close.clone(),
            volume: vec![0.0; n],
            hl2: close.clone(),
            hlc3: close.clone(),
            ohlc4: close.clone(),
            hlcc4: close.clone(),
            close,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn select_candle_field(&self, field: &str) -> Result<&[f64], CandleError> {
        match field.to_ascii_lowercase().as_str() {
            "open" => Ok(&self.open),
            "high" => Ok(&self.high),
            "low" => Ok(&self.low),
            "close" => Ok(&self.close),
            "volume" => Ok(&self.volume),
            "hl2" => Ok(&self.hl2),
            "hlc3" => Ok(&self.hlc3),
            "ohlc4" => Ok(&self.ohlc4),
            "hlcc4" => Ok(&self.hlcc4),
            _ => Err(CandleError::InvalidField(field.to_string())),
        }
    }
}

/// Resolves a price source name against `candles`, falling back to `close`
/// for names it does not know.
#[inline]
pub fn source_type<'a>(candles: &'a Candles, source: &str) -> &'a [f64] {
    match candles.select_candle_field(source) {
        Ok(values) => values,
        Err(_) => {
            tracing::warn!(source, "unknown price source, falling back to close");
            &candles.close
        }
    }
}

/// Deterministic bars for unit tests: a random walk with a 20-bar cycle on top.
#[cfg(test)]
pub(crate) fn sample_candles(len: usize) -> Candles {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut uniform = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let mut walk = 1000.0;
    let mut prev_close = walk;
    let mut open = Vec::with_capacity(len);
    let mut high = Vec::with_capacity(len);
    let mut low = Vec::with_capacity(len);
    let mut close = Vec::with_capacity(len);
    let mut volume = Vec::with_capacity(len);
    for t in 0..len {
        walk += (uniform() - 0.5) * 8.0;
        let c = walk + 25.0 * (std::f64::consts::TAU * t as f64 / 20.0).sin();
        let o = prev_close;
        open.push(o);
        high.push(o.max(c) + uniform() * 5.0);
        low.push(o.min(c) - uniform() * 5.0);
        close.push(c);
        volume.push(1000.0 + uniform() * 500.0);
        prev_close = c;
    }
    let timestamp = (0..len as i64).map(|t| t * 14_400_000).collect();
    match Candles::new(timestamp, open, high, low, close, volume) {
        Ok(c) => c,
        Err(e) => panic!("sample candles: {}", e),
    }
}
