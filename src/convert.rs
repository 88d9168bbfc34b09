//! Narrowing of 64-bit logical integers to native BLAS integer widths.
//!
//! The public API takes `i64` sizes and strides throughout. Host BLAS
//! libraries are usually built with 32-bit integers (LP64); ILP64 vendor
//! builds widen [`BlasInt`] to `i64` via the `ilp64` feature, which turns
//! the checks here into compile-time no-ops. The device BLAS ABI
//! ([`DeviceBlasInt`]) is 32-bit regardless.

use crate::{BlasError, Result};

/// Integer type of the host BLAS ABI.
#[cfg(not(feature = "ilp64"))]
pub type BlasInt = i32;
/// Integer type of the host BLAS ABI.
#[cfg(feature = "ilp64")]
pub type BlasInt = i64;

/// Integer type of the device BLAS ABI.
pub type DeviceBlasInt = i32;

/// Narrow `value` to [`BlasInt`], failing with
/// [`Overflow`](BlasError::Overflow) when its magnitude does not fit.
///
/// The magnitude check covers negative strides as well as dimensions; every
/// parameter that crosses the ABI boundary must go through here.
#[inline]
pub fn to_blas_int(value: i64, func: &'static str, what: &'static str) -> Result<BlasInt> {
    if BlasInt::BITS < i64::BITS && value.unsigned_abs() > BlasInt::MAX as u64 {
        return Err(BlasError::Overflow { func, what, value });
    }
    Ok(value as BlasInt)
}

/// Narrow `value` to [`DeviceBlasInt`], failing with
/// [`Overflow`](BlasError::Overflow) when its magnitude does not fit.
#[inline]
pub fn to_device_blas_int(value: i64, func: &'static str, what: &'static str) -> Result<DeviceBlasInt> {
    if value.unsigned_abs() > DeviceBlasInt::MAX as u64 {
        return Err(BlasError::Overflow { func, what, value });
    }
    Ok(value as DeviceBlasInt)
}

/// Number of buffer elements a strided vector of logical length `n` spans:
/// `1 + (n-1)*|inc|`, or 0 when `n == 0`. Saturates at `usize::MAX` when
/// the extent is not representable; no buffer can cover a saturated span,
/// so coverage checks reject the call instead of wrapping.
///
/// Callers must have validated `n >= 0` and `inc != 0` first.
#[inline]
pub(crate) fn vector_span(n: i64, inc: i64) -> usize {
    if n == 0 {
        return 0;
    }
    let span = inc
        .unsigned_abs()
        .saturating_mul(n as u64 - 1)
        .saturating_add(1);
    usize::try_from(span).unwrap_or(usize::MAX)
}

/// Number of buffer elements a `rows x cols` column-major matrix with
/// leading dimension `ld` spans: `ld*(cols-1) + rows`, or 0 when empty.
/// Saturates at `usize::MAX` like [`vector_span`].
///
/// Callers must have validated the dimensions and `ld >= max(1, rows)`
/// first.
#[inline]
pub(crate) fn matrix_span(rows: i64, cols: i64, ld: i64) -> usize {
    if rows == 0 || cols == 0 {
        return 0;
    }
    let span = (ld as u64)
        .saturating_mul(cols as u64 - 1)
        .saturating_add(rows as u64);
    usize::try_from(span).unwrap_or(usize::MAX)
}
