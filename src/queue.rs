//! Execution queues and device memory management.
//!
//! A [`Queue`] owns one device's execution context: the device ordinal, a
//! stream, and the backend library handle. Work enqueued on a queue runs
//! in FIFO order relative to that queue only; nothing orders operations
//! across queues. Results written asynchronously (device copies, scalar
//! results) are defined only after [`Queue::sync`] returns.
//!
//! The active device is process-global mutable state in every device
//! runtime, so each enqueue path re-asserts this queue's device first
//! rather than trusting whatever was left active.
//!
//! Without a device backend compiled in, a `Queue` still constructs (it
//! is just a descriptor) and `sync` is a no-op; every operation that
//! would touch a device fails with
//! [`BackendUnavailable`](crate::BlasError::BackendUnavailable).

use std::marker::PhantomData;

use crate::scalar::Scalar;
use crate::Result;

#[cfg(feature = "cuda")]
use crate::arg_error_if;
#[cfg(feature = "cuda")]
use crate::convert::{matrix_span, to_device_blas_int, vector_span};

#[cfg(feature = "cuda")]
use crate::cuda;
#[cfg(not(feature = "cuda"))]
use crate::BlasError;

/// An ordered, asynchronous command stream bound to one device.
///
/// Not thread-shared: enqueueing requires `&mut Queue`, so concurrent use
/// from several threads needs external synchronization (or one queue per
/// thread, which also gives concurrent device execution).
pub struct Queue {
    device: i32,
    #[cfg(feature = "cuda")]
    pub(crate) inner: cuda::QueueInner,
}

impl Queue {
    /// Create a queue bound to `device`, with its own stream and backend
    /// handle.
    pub fn new(device: i32) -> Result<Queue> {
        #[cfg(feature = "cuda")]
        {
            Ok(Queue {
                device,
                inner: cuda::QueueInner::new(device)?,
            })
        }
        #[cfg(not(feature = "cuda"))]
        Ok(Queue { device })
    }

    /// The bound device ordinal.
    pub fn device(&self) -> i32 {
        self.device
    }

    /// Block until every operation previously enqueued on this queue has
    /// completed. Host-visible results of device operations are valid
    /// only after this returns.
    pub fn sync(&mut self) -> Result<()> {
        #[cfg(feature = "cuda")]
        {
            self.inner.sync()
        }
        #[cfg(not(feature = "cuda"))]
        Ok(())
    }

    /// Re-assert this queue's device as the active device context.
    /// Called on every enqueue path: the active device is process-global
    /// and other queues may have changed it since the last call.
    #[cfg(feature = "cuda")]
    pub(crate) fn activate(&self) -> Result<()> {
        self.inner.activate()
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("device", &self.device).finish()
    }
}

// ============================================================================
// Device buffers
// ============================================================================

/// A caller-owned device memory region of `len` elements of `T`.
///
/// Allocated with [`device_malloc`], released on drop or explicitly with
/// [`device_free`]. The dispatch routines never take ownership; they
/// operate on pointer ranges obtained from [`as_ptr`](Self::as_ptr) /
/// [`as_mut_ptr`](Self::as_mut_ptr).
#[derive(Debug)]
pub struct DeviceBuffer<T> {
    #[cfg(feature = "cuda")]
    pub(crate) dptr: cuda::DevPtr,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T> DeviceBuffer<T> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Device address of the first element. Only meaningful to pass back
    /// into this crate's device routines on the owning device.
    pub fn as_ptr(&self) -> *const T {
        #[cfg(feature = "cuda")]
        {
            self.dptr as *const T
        }
        #[cfg(not(feature = "cuda"))]
        std::ptr::null()
    }

    /// Mutable device address of the first element.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        #[cfg(feature = "cuda")]
        {
            self.dptr as *mut T
        }
        #[cfg(not(feature = "cuda"))]
        std::ptr::null_mut()
    }
}

#[cfg(feature = "cuda")]
impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        // Freeing is synchronous in the driver; a failure here cannot be
        // propagated and is ignored, as on any Drop path.
        cuda::free_quiet(self.dptr);
    }
}

/// Allocate an uninitialized device buffer of `n` elements on the queue's
/// device. Synchronous; may block on outstanding work, depending on the
/// backend.
pub fn device_malloc<T: Scalar>(n: i64, queue: &mut Queue) -> Result<DeviceBuffer<T>> {
    const FUNC: &str = "device_malloc";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (n, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        queue.activate()?;
        let dptr = queue
            .inner
            .alloc(n as usize * std::mem::size_of::<T>(), FUNC)?;
        Ok(DeviceBuffer {
            dptr,
            len: n as usize,
            _marker: PhantomData,
        })
    }
}

/// Release a device buffer. Equivalent to dropping it, but surfaces the
/// backend-unavailable case explicitly and re-asserts the device first.
pub fn device_free<T: Scalar>(buffer: DeviceBuffer<T>, queue: &mut Queue) -> Result<()> {
    const FUNC: &str = "device_free";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (buffer, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        queue.activate()?;
        drop(buffer);
        Ok(())
    }
}

// ============================================================================
// Host <-> device transfers
// ============================================================================

/// Enqueue a strided copy of `n` elements from host `x` (stride `incx`)
/// into device buffer `dy` (stride `incy`). Asynchronous; complete after
/// [`Queue::sync`].
pub fn device_setvector<T: Scalar>(
    n: i64,
    x: &[T],
    incx: i64,
    dy: &mut DeviceBuffer<T>,
    incy: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "device_setvector";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (n, x, incx, dy, incy, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, incx <= 0, "incx = {incx} is not positive");
        arg_error_if!(FUNC, incy <= 0, "incy = {incy} is not positive");

        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let incx_ = to_device_blas_int(incx, FUNC, "incx")?;
        let incy_ = to_device_blas_int(incy, FUNC, "incy")?;

        arg_error_if!(
            FUNC,
            x.len() < vector_span(n, incx),
            "x holds {} elements but n = {n}, incx = {incx} requires {}",
            x.len(),
            vector_span(n, incx)
        );
        arg_error_if!(
            FUNC,
            dy.len() < vector_span(n, incy),
            "device buffer holds {} elements but n = {n}, incy = {incy} requires {}",
            dy.len(),
            vector_span(n, incy)
        );

        queue.activate()?;
        queue
            .inner
            .set_vector_async::<T>(n_, x.as_ptr(), incx_, dy.dptr, incy_, FUNC)
    }
}

/// Enqueue a strided copy of `n` elements from device buffer `dx` into
/// host `y`. Asynchronous; `y` is valid only after [`Queue::sync`].
pub fn device_getvector<T: Scalar>(
    n: i64,
    dx: &DeviceBuffer<T>,
    incx: i64,
    y: &mut [T],
    incy: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "device_getvector";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (n, dx, incx, y, incy, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, incx <= 0, "incx = {incx} is not positive");
        arg_error_if!(FUNC, incy <= 0, "incy = {incy} is not positive");

        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let incx_ = to_device_blas_int(incx, FUNC, "incx")?;
        let incy_ = to_device_blas_int(incy, FUNC, "incy")?;

        arg_error_if!(
            FUNC,
            dx.len() < vector_span(n, incx),
            "device buffer holds {} elements but n = {n}, incx = {incx} requires {}",
            dx.len(),
            vector_span(n, incx)
        );
        arg_error_if!(
            FUNC,
            y.len() < vector_span(n, incy),
            "y holds {} elements but n = {n}, incy = {incy} requires {}",
            y.len(),
            vector_span(n, incy)
        );

        queue.activate()?;
        queue
            .inner
            .get_vector_async::<T>(n_, dx.dptr, incx_, y.as_mut_ptr(), incy_, FUNC)
    }
}

/// Enqueue a copy of an `m x n` column-major matrix from host `a`
/// (leading dimension `lda`) into device buffer `da` (leading dimension
/// `ldda`). Asynchronous; complete after [`Queue::sync`].
pub fn device_setmatrix<T: Scalar>(
    m: i64,
    n: i64,
    a: &[T],
    lda: i64,
    da: &mut DeviceBuffer<T>,
    ldda: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "device_setmatrix";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (m, n, a, lda, da, ldda, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, m < 0, "m = {m} is negative");
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, lda < m.max(1), "lda = {lda} < max(1, {m})");
        arg_error_if!(FUNC, ldda < m.max(1), "ldda = {ldda} < max(1, {m})");

        let m_ = to_device_blas_int(m, FUNC, "m")?;
        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let lda_ = to_device_blas_int(lda, FUNC, "lda")?;
        let ldda_ = to_device_blas_int(ldda, FUNC, "ldda")?;

        arg_error_if!(
            FUNC,
            a.len() < matrix_span(m, n, lda),
            "a holds {} elements but m = {m}, n = {n}, lda = {lda} requires {}",
            a.len(),
            matrix_span(m, n, lda)
        );
        arg_error_if!(
            FUNC,
            da.len() < matrix_span(m, n, ldda),
            "device buffer holds {} elements but m = {m}, n = {n}, ldda = {ldda} requires {}",
            da.len(),
            matrix_span(m, n, ldda)
        );

        queue.activate()?;
        queue
            .inner
            .set_matrix_async::<T>(m_, n_, a.as_ptr(), lda_, da.dptr, ldda_, FUNC)
    }
}

/// Enqueue a copy of an `m x n` column-major matrix from device buffer
/// `da` back into host `a`. Asynchronous; `a` is valid only after
/// [`Queue::sync`].
pub fn device_getmatrix<T: Scalar>(
    m: i64,
    n: i64,
    da: &DeviceBuffer<T>,
    ldda: i64,
    a: &mut [T],
    lda: i64,
    queue: &mut Queue,
) -> Result<()> {
    const FUNC: &str = "device_getmatrix";

    #[cfg(not(feature = "cuda"))]
    {
        let _ = (m, n, da, ldda, a, lda, queue);
        Err(BlasError::BackendUnavailable { func: FUNC })
    }
    #[cfg(feature = "cuda")]
    {
        arg_error_if!(FUNC, m < 0, "m = {m} is negative");
        arg_error_if!(FUNC, n < 0, "n = {n} is negative");
        arg_error_if!(FUNC, ldda < m.max(1), "ldda = {ldda} < max(1, {m})");
        arg_error_if!(FUNC, lda < m.max(1), "lda = {lda} < max(1, {m})");

        let m_ = to_device_blas_int(m, FUNC, "m")?;
        let n_ = to_device_blas_int(n, FUNC, "n")?;
        let ldda_ = to_device_blas_int(ldda, FUNC, "ldda")?;
        let lda_ = to_device_blas_int(lda, FUNC, "lda")?;

        arg_error_if!(
            FUNC,
            da.len() < matrix_span(m, n, ldda),
            "device buffer holds {} elements but m = {m}, n = {n}, ldda = {ldda} requires {}",
            da.len(),
            matrix_span(m, n, ldda)
        );
        arg_error_if!(
            FUNC,
            a.len() < matrix_span(m, n, lda),
            "a holds {} elements but m = {m}, n = {n}, lda = {lda} requires {}",
            a.len(),
            matrix_span(m, n, lda)
        );

        queue.activate()?;
        queue
            .inner
            .get_matrix_async::<T>(m_, n_, da.dptr, ldda_, a.as_mut_ptr(), lda_, FUNC)
    }
}
