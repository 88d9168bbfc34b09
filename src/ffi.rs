//! Fortran-ABI declarations for the host BLAS routines.
//!
//! Every argument is passed by reference, matching the Fortran calling
//! convention. Complex operands are declared directly as
//! `num_complex::Complex`, whose `#[repr(C)]` interleaved re/im layout is
//! exactly the native Fortran complex representation, so no copy or
//! conversion happens at the boundary. Linkage against a concrete vendor
//! comes from `blas-src`.

use std::os::raw::c_char;

use num_complex::{Complex32, Complex64};

use crate::convert::BlasInt;

extern "C" {
    // ------------------------------------------------------------------
    // Level 1
    // ------------------------------------------------------------------
    pub fn saxpy_(
        n: *const BlasInt,
        alpha: *const f32,
        x: *const f32,
        incx: *const BlasInt,
        y: *mut f32,
        incy: *const BlasInt,
    );
    pub fn daxpy_(
        n: *const BlasInt,
        alpha: *const f64,
        x: *const f64,
        incx: *const BlasInt,
        y: *mut f64,
        incy: *const BlasInt,
    );
    pub fn caxpy_(
        n: *const BlasInt,
        alpha: *const Complex32,
        x: *const Complex32,
        incx: *const BlasInt,
        y: *mut Complex32,
        incy: *const BlasInt,
    );
    pub fn zaxpy_(
        n: *const BlasInt,
        alpha: *const Complex64,
        x: *const Complex64,
        incx: *const BlasInt,
        y: *mut Complex64,
        incy: *const BlasInt,
    );

    pub fn sscal_(n: *const BlasInt, alpha: *const f32, x: *mut f32, incx: *const BlasInt);
    pub fn dscal_(n: *const BlasInt, alpha: *const f64, x: *mut f64, incx: *const BlasInt);
    pub fn cscal_(n: *const BlasInt, alpha: *const Complex32, x: *mut Complex32, incx: *const BlasInt);
    pub fn zscal_(n: *const BlasInt, alpha: *const Complex64, x: *mut Complex64, incx: *const BlasInt);

    pub fn snrm2_(n: *const BlasInt, x: *const f32, incx: *const BlasInt) -> f32;
    pub fn dnrm2_(n: *const BlasInt, x: *const f64, incx: *const BlasInt) -> f64;
    pub fn scnrm2_(n: *const BlasInt, x: *const Complex32, incx: *const BlasInt) -> f32;
    pub fn dznrm2_(n: *const BlasInt, x: *const Complex64, incx: *const BlasInt) -> f64;

    // ------------------------------------------------------------------
    // Level 3
    // ------------------------------------------------------------------
    pub fn strmm_(
        side: *const c_char,
        uplo: *const c_char,
        transa: *const c_char,
        diag: *const c_char,
        m: *const BlasInt,
        n: *const BlasInt,
        alpha: *const f32,
        a: *const f32,
        lda: *const BlasInt,
        b: *mut f32,
        ldb: *const BlasInt,
    );
    pub fn dtrmm_(
        side: *const c_char,
        uplo: *const c_char,
        transa: *const c_char,
        diag: *const c_char,
        m: *const BlasInt,
        n: *const BlasInt,
        alpha: *const f64,
        a: *const f64,
        lda: *const BlasInt,
        b: *mut f64,
        ldb: *const BlasInt,
    );
    pub fn ctrmm_(
        side: *const c_char,
        uplo: *const c_char,
        transa: *const c_char,
        diag: *const c_char,
        m: *const BlasInt,
        n: *const BlasInt,
        alpha: *const Complex32,
        a: *const Complex32,
        lda: *const BlasInt,
        b: *mut Complex32,
        ldb: *const BlasInt,
    );
    pub fn ztrmm_(
        side: *const c_char,
        uplo: *const c_char,
        transa: *const c_char,
        diag: *const c_char,
        m: *const BlasInt,
        n: *const BlasInt,
        alpha: *const Complex64,
        a: *const Complex64,
        lda: *const BlasInt,
        b: *mut Complex64,
        ldb: *const BlasInt,
    );
}
