//! cuBLAS device backend.
//!
//! The one concrete implementation behind the abstract device surface:
//! context/stream/handle management through `cudarc`'s driver API, routine
//! entry points through its raw cuBLAS bindings, and the pointer-space
//! query used for scalar results. Nothing outside this module names a
//! vendor SDK; the dispatch layer only asks whether a backend exists.

use std::ffi::c_void;
use std::sync::Arc;

use cudarc::cublas::sys as cublas;
use cudarc::cublas::CudaBlas;
use cudarc::driver::sys as cu;
use cudarc::driver::{result as cures, CudaContext, CudaStream};

use crate::enums::{Diag, Op, Side, Uplo};
use crate::{BlasError, Result};

/// Raw device address.
pub(crate) type DevPtr = cu::CUdeviceptr;

/// Map a cuBLAS status to a backend error.
pub(crate) fn check(func: &'static str, status: cublas::cublasStatus_t) -> Result<()> {
    if status == cublas::cublasStatus_t::CUBLAS_STATUS_SUCCESS {
        Ok(())
    } else {
        Err(BlasError::Backend {
            func,
            msg: format!("cuBLAS status {status:?}"),
        })
    }
}

fn driver_err(func: &'static str, err: cudarc::driver::DriverError) -> BlasError {
    BlasError::Backend {
        func,
        msg: format!("CUDA driver: {err}"),
    }
}

// ============================================================================
// Queue internals
// ============================================================================

/// Device-side state of a `Queue`: context, stream, cuBLAS handle, and
/// transient scalar staging buffers released at the next sync.
pub(crate) struct QueueInner {
    ctx: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    blas: CudaBlas,
    scratch: Vec<DevPtr>,
}

impl QueueInner {
    pub(crate) fn new(device: i32) -> Result<Self> {
        const FUNC: &str = "Queue::new";
        let ctx = CudaContext::new(device as usize).map_err(|e| driver_err(FUNC, e))?;
        let stream = ctx.new_stream().map_err(|e| driver_err(FUNC, e))?;
        let blas = CudaBlas::new(stream.clone()).map_err(|e| BlasError::Backend {
            func: FUNC,
            msg: format!("cuBLAS: {e}"),
        })?;
        Ok(QueueInner {
            ctx,
            stream,
            blas,
            scratch: Vec::new(),
        })
    }

    /// Make this queue's device the active device context for the calling
    /// thread.
    pub(crate) fn activate(&self) -> Result<()> {
        self.ctx
            .bind_to_thread()
            .map_err(|e| driver_err("Queue::activate", e))
    }

    pub(crate) fn sync(&mut self) -> Result<()> {
        self.stream
            .synchronize()
            .map_err(|e| driver_err("Queue::sync", e))?;
        for dptr in self.scratch.drain(..) {
            free_quiet(dptr);
        }
        Ok(())
    }

    pub(crate) fn handle(&self) -> cublas::cublasHandle_t {
        *self.blas.handle()
    }

    fn raw_stream(&self) -> cu::CUstream {
        self.stream.cu_stream()
    }

    /// Synchronous device allocation of `nbytes`.
    pub(crate) fn alloc(&mut self, nbytes: usize, func: &'static str) -> Result<DevPtr> {
        if nbytes == 0 {
            return Ok(0);
        }
        cures::malloc_sync(nbytes).map_err(|e| driver_err(func, e))
    }

    /// Allocate a staging buffer that lives until the next `sync`.
    pub(crate) fn alloc_scratch(&mut self, nbytes: usize, func: &'static str) -> Result<DevPtr> {
        let dptr = self.alloc(nbytes, func)?;
        self.scratch.push(dptr);
        Ok(dptr)
    }

    /// Enqueue a device-to-host copy of `nbytes` on this queue's stream.
    ///
    /// # Safety (internal)
    /// `dst` must be valid for `nbytes` and stay valid until sync.
    pub(crate) fn copy_dtoh_async(
        &self,
        dst: *mut c_void,
        src: DevPtr,
        nbytes: usize,
        func: &'static str,
    ) -> Result<()> {
        let dst = unsafe { std::slice::from_raw_parts_mut(dst as *mut u8, nbytes) };
        unsafe { cures::memcpy_dtoh_async(dst, src, self.raw_stream()) }
            .map_err(|e| driver_err(func, e))
    }

    pub(crate) fn set_vector_async<T>(
        &self,
        n: i32,
        x: *const T,
        incx: i32,
        dy: DevPtr,
        incy: i32,
        func: &'static str,
    ) -> Result<()> {
        check(func, unsafe {
            cublas::cublasSetVectorAsync(
                n,
                std::mem::size_of::<T>() as i32,
                x as *const c_void,
                incx,
                dy as *mut c_void,
                incy,
                self.raw_stream() as cublas::cudaStream_t,
            )
        })
    }

    pub(crate) fn get_vector_async<T>(
        &self,
        n: i32,
        dx: DevPtr,
        incx: i32,
        y: *mut T,
        incy: i32,
        func: &'static str,
    ) -> Result<()> {
        check(func, unsafe {
            cublas::cublasGetVectorAsync(
                n,
                std::mem::size_of::<T>() as i32,
                dx as *const c_void,
                incx,
                y as *mut c_void,
                incy,
                self.raw_stream() as cublas::cudaStream_t,
            )
        })
    }

    pub(crate) fn set_matrix_async<T>(
        &self,
        rows: i32,
        cols: i32,
        a: *const T,
        lda: i32,
        db: DevPtr,
        lddb: i32,
        func: &'static str,
    ) -> Result<()> {
        check(func, unsafe {
            cublas::cublasSetMatrixAsync(
                rows,
                cols,
                std::mem::size_of::<T>() as i32,
                a as *const c_void,
                lda,
                db as *mut c_void,
                lddb,
                self.raw_stream() as cublas::cudaStream_t,
            )
        })
    }

    pub(crate) fn get_matrix_async<T>(
        &self,
        rows: i32,
        cols: i32,
        da: DevPtr,
        ldda: i32,
        b: *mut T,
        ldb: i32,
        func: &'static str,
    ) -> Result<()> {
        check(func, unsafe {
            cublas::cublasGetMatrixAsync(
                rows,
                cols,
                std::mem::size_of::<T>() as i32,
                da as *const c_void,
                ldda,
                b as *mut c_void,
                ldb,
                self.raw_stream() as cublas::cudaStream_t,
            )
        })
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        // Scratch buffers normally die at sync; release stragglers.
        for dptr in self.scratch.drain(..) {
            free_quiet(dptr);
        }
    }
}

/// Free a device allocation, swallowing errors (Drop paths).
pub(crate) fn free_quiet(dptr: DevPtr) {
    if dptr != 0 {
        let _ = unsafe { cures::free_sync(dptr) };
    }
}

// ============================================================================
// Pointer provenance
// ============================================================================

/// Memory space a scalar-result pointer resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemoryKind {
    /// Plain host memory, not visible to the device.
    Host,
    /// Device or unified memory the device can write directly.
    Device,
}

/// Classify a pointer against the active device context.
///
/// Pointers the driver has never seen (ordinary host allocations) make
/// the attribute query fail; that is the expected answer for host memory,
/// not an error.
pub(crate) fn memory_kind(ptr: *const c_void) -> MemoryKind {
    let mut mem_type = cu::CUmemorytype::CU_MEMORYTYPE_HOST;
    let res = unsafe {
        cu::cuPointerGetAttribute(
            &mut mem_type as *mut cu::CUmemorytype as *mut c_void,
            cu::CUpointer_attribute::CU_POINTER_ATTRIBUTE_MEMORY_TYPE,
            ptr as DevPtr,
        )
    };
    if res != cu::CUresult::CUDA_SUCCESS {
        return MemoryKind::Host;
    }
    match mem_type {
        cu::CUmemorytype::CU_MEMORYTYPE_DEVICE | cu::CUmemorytype::CU_MEMORYTYPE_UNIFIED => {
            MemoryKind::Device
        }
        _ => MemoryKind::Host,
    }
}

// ============================================================================
// Mode conversions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerMode {
    Host,
    Device,
}

/// Select where cuBLAS reads scalars and writes scalar results.
pub(crate) fn set_pointer_mode(
    handle: cublas::cublasHandle_t,
    mode: PointerMode,
    func: &'static str,
) -> Result<()> {
    let mode = match mode {
        PointerMode::Host => cublas::cublasPointerMode_t::CUBLAS_POINTER_MODE_HOST,
        PointerMode::Device => cublas::cublasPointerMode_t::CUBLAS_POINTER_MODE_DEVICE,
    };
    check(func, unsafe {
        cublas::cublasSetPointerMode_v2(handle, mode)
    })
}

pub(crate) fn side_mode(side: Side) -> cublas::cublasSideMode_t {
    match side {
        Side::Left => cublas::cublasSideMode_t::CUBLAS_SIDE_LEFT,
        Side::Right => cublas::cublasSideMode_t::CUBLAS_SIDE_RIGHT,
    }
}

pub(crate) fn fill_mode(uplo: Uplo) -> cublas::cublasFillMode_t {
    match uplo {
        Uplo::Upper => cublas::cublasFillMode_t::CUBLAS_FILL_MODE_UPPER,
        Uplo::Lower => cublas::cublasFillMode_t::CUBLAS_FILL_MODE_LOWER,
    }
}

pub(crate) fn operation(op: Op) -> cublas::cublasOperation_t {
    match op {
        Op::NoTrans => cublas::cublasOperation_t::CUBLAS_OP_N,
        Op::Trans => cublas::cublasOperation_t::CUBLAS_OP_T,
        Op::ConjTrans => cublas::cublasOperation_t::CUBLAS_OP_C,
    }
}

pub(crate) fn diag_type(diag: Diag) -> cublas::cublasDiagType_t {
    match diag {
        Diag::NonUnit => cublas::cublasDiagType_t::CUBLAS_DIAG_NON_UNIT,
        Diag::Unit => cublas::cublasDiagType_t::CUBLAS_DIAG_UNIT,
    }
}
