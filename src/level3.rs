//! Host dispatch for the level-3 (matrix) routines.
//!
//! The native Fortran routines are column-major. Row-major calls are
//! mapped onto them by transposing the whole equation: flip `side` and
//! `uplo` and swap `m` with `n`; `trans` and `diag` carry over unchanged.
//! Leading-dimension checks happen against the caller's layout, before
//! the swap.

use crate::arg_error_if;
use crate::convert::{matrix_span, to_blas_int};
use crate::enums::{Diag, Layout, Op, Side, Uplo};
use crate::scalar::Scalar;
use crate::Result;

#[cfg(not(feature = "blas"))]
use crate::BlasError;

/// Triangular matrix-matrix multiply:
/// `B := alpha*op(A)*B` (`Side::Left`) or `B := alpha*B*op(A)`
/// (`Side::Right`), with `A` triangular.
///
/// `A` is `k x k` where `k = m` for `Side::Left` and `k = n` for
/// `Side::Right`; only the triangle selected by `uplo` is referenced, and
/// `Diag::Unit` treats the diagonal as ones without reading it. `B` is
/// `m x n`, stored per `layout` with leading dimension `ldb`.
pub fn trmm<T: Scalar>(
    layout: Layout,
    side: Side,
    uplo: Uplo,
    trans: Op,
    diag: Diag,
    m: i64,
    n: i64,
    alpha: T,
    a: &[T],
    lda: i64,
    b: &mut [T],
    ldb: i64,
) -> Result<()> {
    const FUNC: &str = "trmm";

    arg_error_if!(FUNC, m < 0, "m = {m} is negative");
    arg_error_if!(FUNC, n < 0, "n = {n} is negative");

    // A is k x k on the side it multiplies from.
    let k = match side {
        Side::Left => m,
        Side::Right => n,
    };
    arg_error_if!(FUNC, lda < k.max(1), "lda = {lda} < max(1, {k})");

    // B's rows in storage order depend on the caller's layout.
    let b_rows = match layout {
        Layout::ColMajor => m,
        Layout::RowMajor => n,
    };
    let b_cols = match layout {
        Layout::ColMajor => n,
        Layout::RowMajor => m,
    };
    arg_error_if!(FUNC, ldb < b_rows.max(1), "ldb = {ldb} < max(1, {b_rows})");

    // Narrow before checking coverage so out-of-range values report as
    // Overflow rather than as an impossible buffer requirement.
    let m_ = to_blas_int(m, FUNC, "m")?;
    let n_ = to_blas_int(n, FUNC, "n")?;
    let lda_ = to_blas_int(lda, FUNC, "lda")?;
    let ldb_ = to_blas_int(ldb, FUNC, "ldb")?;

    arg_error_if!(
        FUNC,
        a.len() < matrix_span(k, k, lda),
        "a holds {} elements but k = {k}, lda = {lda} requires {}",
        a.len(),
        matrix_span(k, k, lda)
    );
    arg_error_if!(
        FUNC,
        b.len() < matrix_span(b_rows, b_cols, ldb),
        "b holds {} elements but m = {m}, n = {n}, ldb = {ldb} requires {}",
        b.len(),
        matrix_span(b_rows, b_cols, ldb)
    );

    // Map a row-major call onto the column-major native convention.
    let (side, uplo, m_, n_) = match layout {
        Layout::ColMajor => (side, uplo, m_, n_),
        Layout::RowMajor => (side.flipped(), uplo.flipped(), n_, m_),
    };

    #[cfg(feature = "blas")]
    {
        unsafe {
            T::blas_trmm(
                side as u8,
                uplo as u8,
                trans as u8,
                diag as u8,
                m_,
                n_,
                alpha,
                a.as_ptr(),
                lda_,
                b.as_mut_ptr(),
                ldb_,
            );
        }
        Ok(())
    }
    #[cfg(not(feature = "blas"))]
    {
        let _ = (side, uplo, trans, diag, m_, n_, lda_, ldb_, alpha);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlasError;

    #[test]
    fn rejects_negative_dimensions() {
        let a = [1.0f64; 4];
        let mut b = [1.0f64; 4];
        let call = |m, n, b: &mut [f64]| {
            trmm(
                Layout::ColMajor,
                Side::Left,
                Uplo::Upper,
                Op::NoTrans,
                Diag::NonUnit,
                m,
                n,
                1.0,
                &a,
                2,
                b,
                2,
            )
        };
        assert!(matches!(
            call(-1, 2, &mut b).unwrap_err(),
            BlasError::InvalidArgument { func: "trmm", .. }
        ));
        assert!(call(2, -1, &mut b).is_err());
    }

    #[test]
    fn rejects_bad_leading_dimensions() {
        let a = [1.0f64; 9];
        let mut b = [1.0f64; 6];
        // Side::Left: A is m x m = 3x3, lda must be >= 3.
        assert!(trmm(
            Layout::ColMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            3,
            2,
            1.0,
            &a,
            2,
            &mut b,
            3,
        )
        .is_err());
        // ColMajor: ldb must be >= m.
        assert!(trmm(
            Layout::ColMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            3,
            2,
            1.0,
            &a,
            3,
            &mut b,
            2,
        )
        .is_err());
        // RowMajor: ldb must be >= n.
        assert!(trmm(
            Layout::RowMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            2,
            3,
            1.0,
            &a,
            2,
            &mut b,
            2,
        )
        .is_err());
    }

    #[test]
    fn huge_dimensions_are_rejected_not_wrapped() {
        let a = [1.0f64; 1];
        let mut b = [1.0f64; 1];
        // lda*(n-1)+m overflows i64; the call must fail cleanly.
        let big = 1i64 << 40;
        let err = trmm(
            Layout::ColMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            big,
            big,
            1.0,
            &a,
            big,
            &mut b,
            big,
        )
        .unwrap_err();
        #[cfg(not(feature = "ilp64"))]
        assert!(matches!(err, BlasError::Overflow { func: "trmm", what: "m", .. }));
        #[cfg(feature = "ilp64")]
        assert!(matches!(err, BlasError::InvalidArgument { func: "trmm", .. }));
    }

    #[test]
    fn rejects_short_buffers() {
        let a = [1.0f64; 8]; // 3x3 with lda=3 needs 9
        let mut b = [1.0f64; 6];
        assert!(trmm(
            Layout::ColMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            3,
            2,
            1.0,
            &a,
            3,
            &mut b,
            3,
        )
        .is_err());
    }

    #[cfg(feature = "blas")]
    mod native {
        use super::*;
        use approx::assert_relative_eq;
        use num_complex::Complex64;

        // A = [1 2; 0 3] upper triangular, B = [1 0; 1 1] (both col-major).
        // A*B = [3 2; 3 3].
        #[test]
        fn upper_left_notrans() {
            let a = [1.0f64, 0.0, 2.0, 3.0];
            let mut b = [1.0f64, 1.0, 0.0, 1.0];
            trmm(
                Layout::ColMajor,
                Side::Left,
                Uplo::Upper,
                Op::NoTrans,
                Diag::NonUnit,
                2,
                2,
                1.0,
                &a,
                2,
                &mut b,
                2,
            )
            .unwrap();
            assert_eq!(b, [3.0, 3.0, 2.0, 3.0]);
        }

        // Unit diagonal: stored diagonal entries are ignored.
        #[test]
        fn unit_diag_ignores_stored_diagonal() {
            let a = [9.0f64, 0.0, 2.0, 9.0]; // read as [1 2; 0 1]
            let mut b = [1.0f64, 1.0, 0.0, 1.0];
            trmm(
                Layout::ColMajor,
                Side::Left,
                Uplo::Upper,
                Op::NoTrans,
                Diag::Unit,
                2,
                2,
                1.0,
                &a,
                2,
                &mut b,
                2,
            )
            .unwrap();
            // [1 2; 0 1] * [1 0; 1 1] = [3 2; 1 1]
            assert_eq!(b, [3.0, 1.0, 2.0, 1.0]);
        }

        // Row-major call must agree with the equivalent col-major one.
        #[test]
        fn row_major_matches_col_major() {
            let n = 3usize;
            // A upper triangular, row-major storage.
            let a_row = [1.0f64, 2.0, 3.0, 0.0, 4.0, 5.0, 0.0, 0.0, 6.0];
            // Same A in col-major storage.
            let a_col = [1.0f64, 0.0, 0.0, 2.0, 4.0, 0.0, 3.0, 5.0, 6.0];
            let b_init_row = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
            let b_init_col = [1.0f64, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0];

            let mut b_row = b_init_row;
            trmm(
                Layout::RowMajor,
                Side::Left,
                Uplo::Upper,
                Op::NoTrans,
                Diag::NonUnit,
                n as i64,
                n as i64,
                2.0,
                &a_row,
                n as i64,
                &mut b_row,
                n as i64,
            )
            .unwrap();

            let mut b_col = b_init_col;
            trmm(
                Layout::ColMajor,
                Side::Left,
                Uplo::Upper,
                Op::NoTrans,
                Diag::NonUnit,
                n as i64,
                n as i64,
                2.0,
                &a_col,
                n as i64,
                &mut b_col,
                n as i64,
            )
            .unwrap();

            for i in 0..n {
                for j in 0..n {
                    assert_relative_eq!(b_row[i * n + j], b_col[j * n + i], epsilon = 1e-12);
                }
            }
        }

        #[test]
        fn conj_trans_complex() {
            // A = [i 0; 0 2], conj(A)^T = [-i 0; 0 2].
            let a = [
                Complex64::new(0.0, 1.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(2.0, 0.0),
            ];
            let mut b = [
                Complex64::new(1.0, 0.0),
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(1.0, 0.0),
            ];
            trmm(
                Layout::ColMajor,
                Side::Left,
                Uplo::Lower,
                Op::ConjTrans,
                Diag::NonUnit,
                2,
                2,
                Complex64::new(1.0, 0.0),
                &a,
                2,
                &mut b,
                2,
            )
            .unwrap();
            assert_eq!(b[0], Complex64::new(0.0, -1.0));
            assert_eq!(b[1], Complex64::new(2.0, 0.0));
            assert_eq!(b[2], Complex64::new(0.0, 0.0));
            assert_eq!(b[3], Complex64::new(2.0, 0.0));
        }
    }
}
