//! Module containing miscellaneous numeric helpers.

use crate::imports::*;

/// return max <f64> of arr; `NaN` when empty
pub fn arrmax(arr: &[f64]) -> f64 {
    arr.iter().copied().fold(f64::NAN, f64::max)
}

/// return min <f64> of arr; `NaN` when empty
pub fn arrmin(arr: &[f64]) -> f64 {
    arr.iter().copied().fold(f64::NAN, f64::min)
}

/// Arithmetic mean of the values, or zero if there are none
pub fn mean_or_zero<I: IntoIterator<Item = f64>>(vals: I) -> f64 {
    let (sum, count) = vals
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Running total of `arr`
pub fn ndarrcumsum(arr: &Array1<f64>) -> Array1<f64> {
    arr.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Returns true if all elements of `arr` are exactly zero
pub fn ndarrallzeros(arr: &Array1<f64>) -> bool {
    arr.iter().all(|x| *x == 0.0)
}

pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Returns true if `val1` and `val2` are within a relative/absolute `epsilon` of each other,
/// depending on magnitude.
pub fn almost_eq(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    ((val2 - val1) / (val1 + val2)).abs() < epsilon || (val2 - val1).abs() < epsilon
}

pub fn almost_gt(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    val1 > val2 * (1.0 + epsilon)
}

pub fn almost_lt(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    val1 < val2 * (1.0 - epsilon)
}

/// Returns true if `val1` is greater than or equal to `val2` with some error margin, `epsilon`
pub fn almost_ge(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    val1 > val2 * (1.0 - epsilon) || val1 > val2 - epsilon
}

/// Returns true if `val1` is less than or equal to `val2` with some error margin, `epsilon`
pub fn almost_le(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    val1 < val2 * (1.0 + epsilon) || val1 < val2 + epsilon
}

/// Element-wise [almost_eq] over two equal-length series
pub fn almost_eq_arrs(a: &[f64], b: &[f64], epsilon: Option<f64>) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| almost_eq(*x, *y, epsilon))
}
