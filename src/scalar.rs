//! Scalar-kind abstraction over the four BLAS precisions.
//!
//! Dispatch routines are written once, generic over [`Scalar`], and
//! monomorphize for `f32`, `f64`, `Complex<f32>`, `Complex<f64>`. The trait
//! isolates everything that actually differs per kind: which native symbol
//! to call and how the scalar crosses the ABI boundary. Validation and
//! integer conversion stay in one place in the callers.

use num_complex::{Complex32, Complex64};

#[cfg(feature = "blas")]
use crate::convert::BlasInt;
#[cfg(feature = "blas")]
use crate::ffi;
#[cfg(feature = "blas")]
use std::os::raw::c_char;

#[cfg(feature = "cuda")]
use crate::convert::DeviceBlasInt;
#[cfg(feature = "cuda")]
use crate::cuda;
#[cfg(feature = "cuda")]
use crate::enums::{Diag, Op, Side, Uplo};
#[cfg(feature = "cuda")]
use crate::Result;
#[cfg(feature = "cuda")]
use cudarc::cublas::sys::cublasHandle_t;

mod private {
    use num_complex::{Complex32, Complex64};

    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for Complex32 {}
    impl Sealed for Complex64 {}
}

/// One of the four BLAS scalar kinds.
///
/// Sealed: the set of kinds is closed by the native ABIs, so the trait is
/// implemented for exactly `f32`, `f64`, `Complex<f32>`, `Complex<f64>`.
///
/// The `blas_*` hooks forward to the corresponding s/d/c/z Fortran symbol
/// with reference-passed arguments; the `cublas_*` hooks target the cuBLAS
/// v2 entry points with device operand pointers. Both families are raw ABI
/// shims: all argument checking happens in the dispatch routines before
/// these are reached.
pub trait Scalar: private::Sealed + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Real type of the same precision (`f32` or `f64`); norms and other
    /// magnitude results are produced in this type.
    type Real: Scalar + num_traits::Float;

    /// # Safety
    /// Pointers must reference buffers spanning `1 + (n-1)*|inc|` elements.
    #[cfg(feature = "blas")]
    unsafe fn blas_axpy(n: BlasInt, alpha: Self, x: *const Self, incx: BlasInt, y: *mut Self, incy: BlasInt);

    /// # Safety
    /// `x` must span `1 + (n-1)*incx` elements.
    #[cfg(feature = "blas")]
    unsafe fn blas_scal(n: BlasInt, alpha: Self, x: *mut Self, incx: BlasInt);

    /// # Safety
    /// `x` must span `1 + (n-1)*incx` elements.
    #[cfg(feature = "blas")]
    unsafe fn blas_nrm2(n: BlasInt, x: *const Self, incx: BlasInt) -> Self::Real;

    /// # Safety
    /// `side`/`uplo`/`transa`/`diag` must be valid Fortran mode characters;
    /// `a` and `b` must span their column-major extents for `(m, n, lda, ldb)`.
    #[cfg(feature = "blas")]
    unsafe fn blas_trmm(
        side: u8,
        uplo: u8,
        transa: u8,
        diag: u8,
        m: BlasInt,
        n: BlasInt,
        alpha: Self,
        a: *const Self,
        lda: BlasInt,
        b: *mut Self,
        ldb: BlasInt,
    );

    /// # Safety
    /// `x` and `y` must be device pointers spanning their strided extents,
    /// valid until the issuing queue is synchronized.
    #[cfg(feature = "cuda")]
    unsafe fn cublas_axpy(
        handle: cublasHandle_t,
        n: DeviceBlasInt,
        alpha: &Self,
        x: *const Self,
        incx: DeviceBlasInt,
        y: *mut Self,
        incy: DeviceBlasInt,
    ) -> Result<()>;

    /// # Safety
    /// `x` must be a device pointer spanning its strided extent, valid
    /// until the issuing queue is synchronized.
    #[cfg(feature = "cuda")]
    unsafe fn cublas_scal(
        handle: cublasHandle_t,
        n: DeviceBlasInt,
        alpha: &Self,
        x: *mut Self,
        incx: DeviceBlasInt,
    ) -> Result<()>;

    /// # Safety
    /// `x` must be a device pointer; `result` must be a device pointer (the
    /// handle is expected to be in device pointer mode). Both must stay
    /// valid until the issuing queue is synchronized.
    #[cfg(feature = "cuda")]
    unsafe fn cublas_nrm2(
        handle: cublasHandle_t,
        n: DeviceBlasInt,
        x: *const Self,
        incx: DeviceBlasInt,
        result: *mut Self::Real,
    ) -> Result<()>;

    /// # Safety
    /// `a` and `b` must be device pointers spanning their column-major
    /// extents, valid until the issuing queue is synchronized. `b` is both
    /// input and output (cuBLAS's out-of-place trmm is invoked with C = B).
    #[cfg(feature = "cuda")]
    unsafe fn cublas_trmm(
        handle: cublasHandle_t,
        side: Side,
        uplo: Uplo,
        trans: Op,
        diag: Diag,
        m: DeviceBlasInt,
        n: DeviceBlasInt,
        alpha: &Self,
        a: *const Self,
        lda: DeviceBlasInt,
        b: *mut Self,
        ldb: DeviceBlasInt,
    ) -> Result<()>;
}

macro_rules! impl_scalar {
    (
        $ty:ty, $real:ty,
        $axpy:ident, $scal:ident, $nrm2:ident, $trmm:ident,
        $cu_axpy:ident, $cu_scal:ident, $cu_nrm2:ident, $cu_trmm:ident,
        $cu_ty:ty, $cu_real:ty
    ) => {
        impl Scalar for $ty {
            type Real = $real;

            #[cfg(feature = "blas")]
            unsafe fn blas_axpy(n: BlasInt, alpha: Self, x: *const Self, incx: BlasInt, y: *mut Self, incy: BlasInt) {
                ffi::$axpy(&n, &alpha, x, &incx, y, &incy);
            }

            #[cfg(feature = "blas")]
            unsafe fn blas_scal(n: BlasInt, alpha: Self, x: *mut Self, incx: BlasInt) {
                ffi::$scal(&n, &alpha, x, &incx);
            }

            #[cfg(feature = "blas")]
            unsafe fn blas_nrm2(n: BlasInt, x: *const Self, incx: BlasInt) -> Self::Real {
                ffi::$nrm2(&n, x, &incx)
            }

            #[cfg(feature = "blas")]
            unsafe fn blas_trmm(
                side: u8,
                uplo: u8,
                transa: u8,
                diag: u8,
                m: BlasInt,
                n: BlasInt,
                alpha: Self,
                a: *const Self,
                lda: BlasInt,
                b: *mut Self,
                ldb: BlasInt,
            ) {
                ffi::$trmm(
                    &(side as c_char),
                    &(uplo as c_char),
                    &(transa as c_char),
                    &(diag as c_char),
                    &m,
                    &n,
                    &alpha,
                    a,
                    &lda,
                    b,
                    &ldb,
                );
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_axpy(
                handle: cublasHandle_t,
                n: DeviceBlasInt,
                alpha: &Self,
                x: *const Self,
                incx: DeviceBlasInt,
                y: *mut Self,
                incy: DeviceBlasInt,
            ) -> Result<()> {
                cuda::check(
                    "axpy",
                    cudarc::cublas::sys::$cu_axpy(
                        handle,
                        n,
                        alpha as *const Self as *const $cu_ty,
                        x as *const $cu_ty,
                        incx,
                        y as *mut $cu_ty,
                        incy,
                    ),
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_scal(
                handle: cublasHandle_t,
                n: DeviceBlasInt,
                alpha: &Self,
                x: *mut Self,
                incx: DeviceBlasInt,
            ) -> Result<()> {
                cuda::check(
                    "scal",
                    cudarc::cublas::sys::$cu_scal(
                        handle,
                        n,
                        alpha as *const Self as *const $cu_ty,
                        x as *mut $cu_ty,
                        incx,
                    ),
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_nrm2(
                handle: cublasHandle_t,
                n: DeviceBlasInt,
                x: *const Self,
                incx: DeviceBlasInt,
                result: *mut Self::Real,
            ) -> Result<()> {
                cuda::check(
                    "nrm2",
                    cudarc::cublas::sys::$cu_nrm2(
                        handle,
                        n,
                        x as *const $cu_ty,
                        incx,
                        result as *mut $cu_real,
                    ),
                )
            }

            #[cfg(feature = "cuda")]
            unsafe fn cublas_trmm(
                handle: cublasHandle_t,
                side: Side,
                uplo: Uplo,
                trans: Op,
                diag: Diag,
                m: DeviceBlasInt,
                n: DeviceBlasInt,
                alpha: &Self,
                a: *const Self,
                lda: DeviceBlasInt,
                b: *mut Self,
                ldb: DeviceBlasInt,
            ) -> Result<()> {
                cuda::check(
                    "trmm",
                    cudarc::cublas::sys::$cu_trmm(
                        handle,
                        cuda::side_mode(side),
                        cuda::fill_mode(uplo),
                        cuda::operation(trans),
                        cuda::diag_type(diag),
                        m,
                        n,
                        alpha as *const Self as *const $cu_ty,
                        a as *const $cu_ty,
                        lda,
                        b as *const $cu_ty,
                        ldb,
                        b as *mut $cu_ty,
                        ldb,
                    ),
                )
            }
        }
    };
}

impl_scalar!(
    f32, f32,
    saxpy_, sscal_, snrm2_, strmm_,
    cublasSaxpy_v2, cublasSscal_v2, cublasSnrm2_v2, cublasStrmm_v2,
    f32, f32
);
impl_scalar!(
    f64, f64,
    daxpy_, dscal_, dnrm2_, dtrmm_,
    cublasDaxpy_v2, cublasDscal_v2, cublasDnrm2_v2, cublasDtrmm_v2,
    f64, f64
);
impl_scalar!(
    Complex32, f32,
    caxpy_, cscal_, scnrm2_, ctrmm_,
    cublasCaxpy_v2, cublasCscal_v2, cublasScnrm2_v2, cublasCtrmm_v2,
    cudarc::cublas::sys::cuComplex, f32
);
impl_scalar!(
    Complex64, f64,
    zaxpy_, zscal_, dznrm2_, ztrmm_,
    cublasZaxpy_v2, cublasZscal_v2, cublasDznrm2_v2, cublasZtrmm_v2,
    cudarc::cublas::sys::cuDoubleComplex, f64
);
