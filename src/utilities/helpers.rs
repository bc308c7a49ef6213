/// Allocates an output vector of `len` values whose first `warm` slots are `NaN`.
///
/// The remaining slots are zero and are expected to be overwritten by the caller.
#[inline]
pub fn alloc_with_nan_prefix(len: usize, warm: usize) -> Vec<f64> {
    let warm = warm.min(len);
    let mut v = Vec::with_capacity(len);
    v.resize(warm, f64::NAN);
    v.resize(len, 0.0);
    v
}

/// Index of the first non-`NaN` value.
#[inline(always)]
pub fn first_valid_index(data: &[f64]) -> Option<usize> {
    data.iter().position(|x| !x.is_nan())
}

/// Fills `dst` with `NaN`.
#[inline(always)]
pub fn fill_nan(dst: &mut [f64]) {
    for v in dst {
        *v = f64::NAN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_with_nan_prefix() {
        let v = alloc_with_nan_prefix(5, 2);
        assert_eq!(v.len(), 5);
        assert!(v[0].is_nan() && v[1].is_nan());
        assert!(v[2..].iter().all(|&x| x == 0.0));

        let all = alloc_with_nan_prefix(3, 10);
        assert!(all.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_first_valid_index() {
        assert_eq!(first_valid_index(&[f64::NAN, f64::NAN, 1.0]), Some(2));
        assert_eq!(first_valid_index(&[f64::NAN]), None);
        assert_eq!(first_valid_index(&[]), None);
    }
}
