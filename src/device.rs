//! Device dispatch: the host routine families against device-resident
//! operands, enqueued on a [`Queue`].
//!
//! Signatures mirror the host layer plus a trailing queue; operands are
//! raw device addresses obtained from
//! [`DeviceBuffer`](crate::DeviceBuffer). Every routine validates and
//! converts exactly like its host counterpart, re-asserts the queue's
//! device, then enqueues the native call and returns immediately; results
//! are defined only after [`Queue::sync`](crate::Queue::sync).
//!
//! With no device backend compiled in, every routine fails with
//! [`BackendUnavailable`](crate::BlasError::BackendUnavailable) before
//! looking at its arguments.

use crate::enums::{Diag, Layout, Op, Side, Uplo};
use crate::scalar::Scalar;
use crate::queue::Queue;
use crate::Result;

#[cfg(feature = "cuda")]
use crate::arg_error_if;
#[cfg(feature = "cuda")]
use crate::convert::to_device_blas_int;
#[cfg(feature = "cuda")]
use crate::cuda::{self, MemoryKind};
#[cfg(not(feature = "cuda"))]
use crate::BlasError;

/// Enqueue `y := alpha*x + y` over strided device vectors.
///
/// # Safety
/// `x` and `y` must be device addresses on the queue's device, each
/// spanning `1 + (n-1)*|inc|` elements, and must stay valid until the
/// queue is synchronized.
pub unsafe fn axpy<T: Scalar>(
    n: i64,
    alpha: T,
    x: *const T,
    incx: i64,
    y: *mut T,
    incy: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "axpy";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (n, alpha, x, incx, y, incy, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, incx == 0, "incx is zero");
        arg_error_if!(FUNC, incy == 0, "incy is zero");

        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let incx_ = to_device_blas_int(incx, FUNC, "incx")?;
        let incy_ = to_device_blas_int(incy, FUNC, "incy")?;

        queue.activate()?;
        T::cublas_axpy(queue.inner.handle(), n_, &alpha, x, incx_, y, incy_)
    }
}

/// Enqueue `x := alpha*x` over a strided device vector.
///
/// # Safety
/// `x` must be a device address on the queue's device spanning
/// `1 + (n-1)*incx` elements, valid until the queue is synchronized.
pub unsafe fn scal<T: Scalar>(
    n: i64,
    alpha: T,
    x: *mut T,
    incx: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "scal";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (n, alpha, x, incx, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, incx <= 0, "incx = {incx} is not positive");

        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let incx_ = to_device_blas_int(incx, FUNC, "incx")?;

        queue.activate()?;
        T::cublas_scal(queue.inner.handle(), n_, &alpha, x, incx_)
    }
}

/// Enqueue the Euclidean norm of a strided device vector, writing the
/// real-valued result through `result` when the computation completes.
///
/// Unlike the host version, `result` is an output parameter: the write is
/// asynchronous and `*result` is defined only after the queue is
/// synchronized. `result` may point into device-accessible memory (the
/// backend then writes it in place) or into plain host memory (the result
/// is computed into a transient device scalar and copied back
/// asynchronously); the memory space is classified at runtime.
///
/// # Safety
/// `x` must be a device address on the queue's device spanning its
/// strided extent; `result` must be valid for a write of `T::Real`. Both
/// must stay valid until the queue is synchronized.
pub unsafe fn nrm2<T: Scalar>(
    n: i64,
    x: *const T,
    incx: i64,
    result: *mut T::Real,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "nrm2";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (n, x, incx, result, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, incx <= 0, "incx = {incx} is not positive");

        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let incx_ = to_device_blas_int(incx, FUNC, "incx")?;

        queue.activate()?;
        let handle = queue.inner.handle();

        // The backend writes the scalar result from the device side, so
        // the destination must be device-accessible. Host destinations go
        // through a transient device scalar plus an asynchronous copy
        // back, instead of forcing a synchronous round trip.
        let dest = match cuda::memory_kind(result as *const std::ffi::c_void) {
            MemoryKind::Device => result,
            MemoryKind::Host => queue.inner.alloc_scratch(std::mem::size_of::<T::Real>(), FUNC)?
                as *mut T::Real,
        };

        cuda::set_pointer_mode(handle, cuda::PointerMode::Device, FUNC)?;
        let status = T::cublas_nrm2(handle, n_, x, incx_, dest);
        cuda::set_pointer_mode(handle, cuda::PointerMode::Host, FUNC)?;
        status?;

        if dest != result {
            // Copy back is ordered after the nrm2 on the same stream; the
            // scratch scalar is released at the next sync.
            queue.inner.copy_dtoh_async(
                result as *mut std::ffi::c_void,
                dest as cuda::DevPtr,
                std::mem::size_of::<T::Real>(),
                FUNC,
            )?;
        }
        Ok(())
    }
}

/// Enqueue the triangular matrix-matrix multiply
/// `B := alpha*op(A)*B` or `B := alpha*B*op(A)` on device matrices.
///
/// Validation and the row-major mapping match the host
/// [`trmm`](crate::trmm). The device backend's out-of-place trmm is
/// invoked with `B` as both input and output.
///
/// # Safety
/// `a` and `b` must be device addresses on the queue's device spanning
/// their column-major extents for `(m, n, lda, ldb)` under `layout`,
/// valid until the queue is synchronized.
pub unsafe fn trmm<T: Scalar>(
    layout: Layout,
    side: Side,
    uplo: Uplo,
    trans: Op,
    diag: Diag,
    m: i64,
    n: i64,
    alpha: T,
    a: *const T,
    lda: i64,
    b: *mut T,
    ldb: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "trmm";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (layout, side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, m < 0, "m = {m} is negative");
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");

        let k = match side {
            Side::Left => m,
            Side::Right => n,
        };
        arg_error_if!(FUNC, lda < k.max(1), "lda = {lda} < max(1, {k})");

        let b_rows = match layout {
            Layout::ColMajor => m,
            Layout::RowMajor => n,
        };
        arg_error_if!(FUNC, ldb < b_rows.max(1), "ldb = {ldb} < max(1, {b_rows})");

        let (side, uplo, m, n) = match layout {
            Layout::ColMajor => (side, uplo, m, n),
            Layout::RowMajor => (side.flipped(), uplo.flipped(), n, m),
        };

        let m_ = to_device_blas_int(m, FUNC, "m")?;
        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let lda_ = to_device_blas_int(lda, FUNC, "lda")?;
        let ldb_ = to_device_blas_int(ldb, FUNC, "ldb")?;

        queue.activate()?;
        T::cublas_trmm(
            queue.inner.handle(),
            side,
            uplo,
            trans,
            diag,
            m_,
            n_,
            &alpha,
            a,
            lda_,
            b,
            ldb_,
        )
    }
}
