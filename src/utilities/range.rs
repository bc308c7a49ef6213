//! The windowed call contract shared by every indicator.
//!
//! A caller asks for the inclusive bar window `start..=end`. The indicator
//! raises `start` to its lookback, computes the surviving bars and reports where
//! its first value landed (`out_beg_idx`) and how many values it wrote
//! (`out_nb_element`). An empty window is a successful call with zero elements.

use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range: start index {start} is after end index {end}")]
    InvalidRange { start: usize, end: usize },
    #[error("end index {end} is out of range for a series of {len} bars")]
    OutOfRangeEndIndex { end: usize, len: usize },
    #[error("output buffer too small: needed {needed}, got {got}")]
    OutputTooSmall { needed: usize, got: usize },
}

/// Where a windowed call placed its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOutput {
    /// Input index of the first value written to the output buffer.
    pub out_beg_idx: usize,
    /// Number of values written, starting at output index 0.
    pub out_nb_element: usize,
}

impl RangeOutput {
    pub const EMPTY: RangeOutput = RangeOutput {
        out_beg_idx: 0,
        out_nb_element: 0,
    };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out_nb_element == 0
    }

    /// Input indices covered by the output.
    #[inline]
    pub fn input_range(&self) -> Range<usize> {
        self.out_beg_idx..self.out_beg_idx + self.out_nb_element
    }
}

/// Validates a requested window against a series of `len` bars.
#[inline]
pub fn check_range(start: usize, end: usize, len: usize) -> Result<(), RangeError> {
    if start > end {
        return Err(RangeError::InvalidRange { start, end });
    }
    if end >= len {
        return Err(RangeError::OutOfRangeEndIndex { end, len });
    }
    Ok(())
}

/// Output buffers must hold the whole requested window, even when the lookback
/// trims it.
#[inline]
pub fn check_output(start: usize, end: usize, got: usize) -> Result<(), RangeError> {
    let needed = end - start + 1;
    if got < needed {
        return Err(RangeError::OutputTooSmall { needed, got });
    }
    Ok(())
}

/// Raises `start` to `lookback`. `None` means no bar of the window survives.
#[inline]
pub fn resolve_range(start: usize, end: usize, lookback: usize) -> Option<usize> {
    let begin = start.max(lookback);
    (begin <= end).then_some(begin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert_eq!(check_range(0, 9, 10), Ok(()));
        assert_eq!(
            check_range(5, 4, 10),
            Err(RangeError::InvalidRange { start: 5, end: 4 })
        );
        assert_eq!(
            check_range(0, 10, 10),
            Err(RangeError::OutOfRangeEndIndex { end: 10, len: 10 })
        );
    }

    #[test]
    fn test_check_output() {
        assert_eq!(check_output(10, 19, 10), Ok(()));
        assert_eq!(
            check_output(10, 19, 9),
            Err(RangeError::OutputTooSmall { needed: 10, got: 9 })
        );
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(0, 100, 63), Some(63));
        assert_eq!(resolve_range(80, 100, 63), Some(80));
        assert_eq!(resolve_range(0, 62, 63), None);
        assert_eq!(resolve_range(63, 63, 63), Some(63));
    }

    #[test]
    fn test_range_output() {
        let out = RangeOutput {
            out_beg_idx: 63,
            out_nb_element: 3,
        };
        assert_eq!(out.input_range(), 63..66);
        assert!(!out.is_empty());
        assert!(RangeOutput::EMPTY.is_empty());
    }
}
