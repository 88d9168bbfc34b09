//! Precision- and device-generic dispatch over native BLAS backends.
//!
//! This crate does not compute anything itself. Every public routine
//! validates its arguments against BLAS semantic constraints, narrows
//! 64-bit logical sizes and strides to the backend's native integer width
//! (detecting overflow), and forwards the call to a native routine:
//! a Fortran-ABI host BLAS for the host entry points, or a device BLAS
//! driven through an execution [`Queue`] for the entry points in
//! [`device`].
//!
//! # Scalar kinds
//!
//! Each operation is written once, generic over [`Scalar`], and
//! monomorphizes to the four BLAS precisions: `f32`, `f64`,
//! `Complex<f32>`, `Complex<f64>`. The kind-specific ABI details
//! (routine symbol, complex layout) live behind the trait.
//!
//! # Backends
//!
//! - Host: enable the `blas` feature (or a vendor feature such as
//!   `openblas`) to link a Fortran-ABI BLAS through `blas-src`.
//! - Device: enable the `cuda` feature for cuBLAS through `cudarc`.
//!
//! With no backend compiled in, routines still validate and convert, then
//! fail with [`BlasError::BackendUnavailable`]; nothing silently no-ops.
//!
//! # Example
//!
//! Validation happens before any native call, so argument errors are
//! reported identically in every build:
//!
//! ```
//! use blas_dispatch::{axpy, BlasError};
//!
//! let x = [1.0f64; 5];
//! let mut y = [0.0f64; 5];
//!
//! // Zero increments are outside BLAS semantics and always rejected.
//! let err = axpy(5, 2.0, &x, 0, &mut y, 1).unwrap_err();
//! assert!(matches!(err, BlasError::InvalidArgument { .. }));
//! ```
//!
//! # Device execution
//!
//! Device routines enqueue work on a [`Queue`] and return immediately.
//! Results are defined only after [`Queue::sync`]:
//!
//! ```ignore
//! use blas_dispatch::{device, device_malloc, device_setvector, Queue};
//!
//! let mut queue = Queue::new(0)?;
//! let x = vec![1.0f32; 5];
//! let mut dx = device_malloc::<f32>(5, &mut queue)?;
//! device_setvector(5, &x, 1, &mut dx, 1, &mut queue)?;
//!
//! let mut result = 0.0f32;
//! unsafe { device::nrm2(5, dx.as_ptr(), 1, &mut result, &mut queue)? };
//! queue.sync()?; // `result` is valid only from here on
//! ```

// BLAS signatures carry their full parameter lists by definition.
#![allow(clippy::too_many_arguments)]

mod convert;
mod enums;
mod level1;
mod level3;
mod queue;
mod scalar;

pub mod device;

#[cfg(feature = "blas")]
mod ffi;

#[cfg(feature = "cuda")]
mod cuda;

// Force linkage of the selected host BLAS vendor.
#[cfg(feature = "blas")]
use blas_src as _;

// ============================================================================
// Public surface
// ============================================================================

pub use convert::{to_blas_int, to_device_blas_int, BlasInt, DeviceBlasInt};
pub use enums::{Diag, Layout, Op, Side, Uplo};
pub use level1::{axpy, nrm2, scal};
pub use level3::trmm;
pub use queue::{
    device_free, device_getmatrix, device_getvector, device_malloc, device_setmatrix,
    device_setvector, DeviceBuffer, Queue,
};
pub use scalar::Scalar;

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by the dispatch layer.
///
/// Every check is local and synchronous: a failing call returns before any
/// native routine is invoked or any device work is enqueued, and output
/// buffers are left untouched.
#[derive(Debug, thiserror::Error)]
pub enum BlasError {
    /// A logical parameter violates a BLAS precondition (negative
    /// dimension, zero stride, unrecognized enum code).
    #[error("{func}: invalid argument: {what}")]
    InvalidArgument {
        func: &'static str,
        what: String,
    },

    /// A 64-bit logical value does not fit the backend's native integer
    /// width.
    #[error("{func}: {what} = {value} exceeds the native BLAS integer range")]
    Overflow {
        func: &'static str,
        what: &'static str,
        value: i64,
    },

    /// The requested backend was not compiled into this build.
    #[error("{func}: BLAS backend not available in this build")]
    BackendUnavailable { func: &'static str },

    /// A native backend call failed after dispatch (device driver or
    /// library error).
    #[error("{func}: backend failure: {msg}")]
    Backend {
        func: &'static str,
        msg: String,
    },
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, BlasError>;

/// Early-return with `InvalidArgument` when `cond` holds.
macro_rules! arg_error_if {
    ($func:expr, $cond:expr, $($what:tt)+) => {
        if $cond {
            return Err($crate::BlasError::InvalidArgument {
                func: $func,
                what: format!($($what)+),
            });
        }
    };
}
pub(crate) use arg_error_if;
