//! Host dispatch for the level-1 (vector) routines.
//!
//! Each routine validates, narrows integers, then forwards to the native
//! Fortran-ABI symbol for the scalar kind. The calls are synchronous: the
//! native routine has completed when the function returns. Reference BLAS
//! silently returns on bad arguments; here every violated precondition is
//! a hard [`InvalidArgument`](crate::BlasError::InvalidArgument) failure
//! raised before any native call.

use crate::arg_error_if;
use crate::convert::{to_blas_int, vector_span};
use crate::scalar::Scalar;
use crate::Result;

#[cfg(not(feature = "blas"))]
use crate::BlasError;

/// Scaled vector accumulate: `y := alpha*x + y` over strided vectors.
///
/// `x` and `y` must each hold at least `1 + (n-1)*|inc|` elements.
/// Negative increments walk the vector from its far end, as in BLAS.
///
/// # Example
/// ```no_run
/// let x = [1.0f64; 5];
/// let mut y = [0.0f64; 5];
/// blas_dispatch::axpy(5, 2.0, &x, 1, &mut y, 1).unwrap();
/// assert_eq!(y, [2.0; 5]);
/// ```
pub fn axpy<T: Scalar>(n: i64, alpha: T, x: &[T], incx: i64, y: &mut [T], incy: i64) -> Result<()> {
    const FUNC: &str = "axpy";

    arg_error_if!(FUNC, n < 0, "n = {n} is negative");
    arg_error_if!(FUNC, incx == 0, "incx is zero");
    arg_error_if!(FUNC, incy == 0, "incy is zero");

    // Narrow before checking coverage so out-of-range values report as
    // Overflow rather than as an impossible buffer requirement.
    let n_ = to_blas_int(n, FUNC, "n")?;
    let incx_ = to_blas_int(incx, FUNC, "incx")?;
    let incy_ = to_blas_int(incy, FUNC, "incy")?;

    arg_error_if!(
        FUNC,
        x.len() < vector_span(n, incx),
        "x holds {} elements but n = {n}, incx = {incx} requires {}",
        x.len(),
        vector_span(n, incx)
    );
    arg_error_if!(
        FUNC,
        y.len() < vector_span(n, incy),
        "y holds {} elements but n = {n}, incy = {incy} requires {}",
        y.len(),
        vector_span(n, incy)
    );

    #[cfg(feature = "blas")]
    {
        unsafe { T::blas_axpy(n_, alpha, x.as_ptr(), incx_, y.as_mut_ptr(), incy_) };
        Ok(())
    }
    #[cfg(not(feature = "blas"))]
    {
        let _ = (n_, incx_, incy_, alpha);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
}

/// Vector scale: `x := alpha*x`.
///
/// BLAS defines scal only for positive increments; `incx <= 0` is
/// rejected.
pub fn scal<T: Scalar>(n: i64, alpha: T, x: &mut [T], incx: i64) -> Result<()> {
    const FUNC: &str = "scal";

    arg_error_if!(FUNC, n < 0, "n = {n} is negative");
    arg_error_if!(FUNC, incx <= 0, "incx = {incx} is not positive");

    let n_ = to_blas_int(n, FUNC, "n")?;
    let incx_ = to_blas_int(incx, FUNC, "incx")?;

    arg_error_if!(
        FUNC,
        x.len() < vector_span(n, incx),
        "x holds {} elements but n = {n}, incx = {incx} requires {}",
        x.len(),
        vector_span(n, incx)
    );

    #[cfg(feature = "blas")]
    {
        unsafe { T::blas_scal(n_, alpha, x.as_mut_ptr(), incx_) };
        Ok(())
    }
    #[cfg(not(feature = "blas"))]
    {
        let _ = (n_, incx_, alpha);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
}

/// Euclidean norm of a strided vector; the result is real even for
/// complex kinds.
///
/// BLAS defines nrm2 only for positive increments; `incx <= 0` is
/// rejected.
pub fn nrm2<T: Scalar>(n: i64, x: &[T], incx: i64) -> Result<T::Real> {
    const FUNC: &str = "nrm2";

    arg_error_if!(FUNC, n < 0, "n = {n} is negative");
    arg_error_if!(FUNC, incx <= 0, "incx = {incx} is not positive");

    let n_ = to_blas_int(n, FUNC, "n")?;
    let incx_ = to_blas_int(incx, FUNC, "incx")?;

    arg_error_if!(
        FUNC,
        x.len() < vector_span(n, incx),
        "x holds {} elements but n = {n}, incx = {incx} requires {}",
        x.len(),
        vector_span(n, incx)
    );

    #[cfg(feature = "blas")]
    {
        Ok(unsafe { T::blas_nrm2(n_, x.as_ptr(), incx_) })
    }
    #[cfg(not(feature = "blas"))]
    {
        let _ = (n_, incx_);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
}
