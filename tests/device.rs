//! End-to-end device tests. These require the `cuda` feature and at
//! least one visible device; run with `cargo test --features cuda`.
#![cfg(feature = "cuda")]

use approx::assert_relative_eq;
use blas_dispatch::{
    device, device_getmatrix, device_getvector, device_malloc, device_setmatrix,
    device_setvector, BlasError, Diag, Layout, Op, Queue, Side, Uplo,
};

#[test]
fn vector_roundtrip() {
    let mut queue = Queue::new(0).unwrap();
    let x: Vec<f64> = (0..100).map(f64::from).collect();
    let mut y = vec![0.0f64; 100];

    let mut dx = device_malloc::<f64>(100, &mut queue).unwrap();
    device_setvector(100, &x, 1, &mut dx, 1, &mut queue).unwrap();
    device_getvector(100, &dx, 1, &mut y, 1, &mut queue).unwrap();
    queue.sync().unwrap();

    assert_eq!(x, y);
}

#[test]
fn axpy_on_device_matches_host_loop() {
    let mut queue = Queue::new(0).unwrap();
    let n = 257i64;
    let x: Vec<f32> = (0..n).map(|i| i as f32).collect();
    let y0: Vec<f32> = (0..n).map(|i| 1.0 - i as f32).collect();
    let alpha = 0.5f32;

    let mut dx = device_malloc::<f32>(n, &mut queue).unwrap();
    let mut dy = device_malloc::<f32>(n, &mut queue).unwrap();
    device_setvector(n, &x, 1, &mut dx, 1, &mut queue).unwrap();
    device_setvector(n, &y0, 1, &mut dy, 1, &mut queue).unwrap();

    unsafe {
        device::axpy(n, alpha, dx.as_ptr(), 1, dy.as_mut_ptr(), 1, &mut queue).unwrap();
    }

    let mut y = vec![0.0f32; n as usize];
    device_getvector(n, &dy, 1, &mut y, 1, &mut queue).unwrap();
    queue.sync().unwrap();

    for i in 0..n as usize {
        assert_relative_eq!(y[i], y0[i] + alpha * x[i], epsilon = 1e-5);
    }
}

#[test]
fn nrm2_writes_a_host_scalar_after_sync() {
    let mut queue = Queue::new(0).unwrap();
    let x = [3.0f64, 4.0];
    let mut dx = device_malloc::<f64>(2, &mut queue).unwrap();
    device_setvector(2, &x, 1, &mut dx, 1, &mut queue).unwrap();

    // result lives on the host stack: the staging-buffer path.
    let mut result = 0.0f64;
    unsafe {
        device::nrm2(2, dx.as_ptr(), 1, &mut result, &mut queue).unwrap();
    }
    queue.sync().unwrap();
    assert_relative_eq!(result, 5.0, epsilon = 1e-12);
}

#[test]
fn nrm2_can_write_a_device_scalar() {
    let mut queue = Queue::new(0).unwrap();
    let x = [3.0f32, 4.0];
    let mut dx = device_malloc::<f32>(2, &mut queue).unwrap();
    device_setvector(2, &x, 1, &mut dx, 1, &mut queue).unwrap();

    // result lives on the device: written in place, then copied back
    // explicitly.
    let mut dresult = device_malloc::<f32>(1, &mut queue).unwrap();
    unsafe {
        device::nrm2(2, dx.as_ptr(), 1, dresult.as_mut_ptr(), &mut queue).unwrap();
    }
    let mut result = [0.0f32];
    device_getvector(1, &dresult, 1, &mut result, 1, &mut queue).unwrap();
    queue.sync().unwrap();
    assert_relative_eq!(result[0], 5.0, epsilon = 1e-5);
}

#[test]
fn trmm_on_device_matches_host() {
    let mut queue = Queue::new(0).unwrap();
    let (m, n) = (2i64, 2i64);
    // A = [1 2; 0 3] upper triangular, B = [1 0; 1 1], col-major.
    let a = [1.0f64, 0.0, 2.0, 3.0];
    let b0 = [1.0f64, 1.0, 0.0, 1.0];

    let mut da = device_malloc::<f64>(4, &mut queue).unwrap();
    let mut db = device_malloc::<f64>(4, &mut queue).unwrap();
    device_setmatrix(m, m, &a, m, &mut da, m, &mut queue).unwrap();
    device_setmatrix(m, n, &b0, m, &mut db, m, &mut queue).unwrap();

    unsafe {
        device::trmm(
            Layout::ColMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            m,
            n,
            1.0,
            da.as_ptr(),
            m,
            db.as_mut_ptr(),
            m,
            &mut queue,
        )
        .unwrap();
    }

    let mut b = [0.0f64; 4];
    device_getmatrix(m, n, &db, m, &mut b, m, &mut queue).unwrap();
    queue.sync().unwrap();
    assert_eq!(b, [3.0, 3.0, 2.0, 3.0]);

    // Host agreement when a host backend is also linked.
    #[cfg(feature = "blas")]
    {
        let mut b_host = b0;
        blas_dispatch::trmm(
            Layout::ColMajor,
            Side::Left,
            Uplo::Upper,
            Op::NoTrans,
            Diag::NonUnit,
            m,
            n,
            1.0,
            &a,
            m,
            &mut b_host,
            m,
        )
        .unwrap();
        assert_eq!(b, b_host);
    }
}

#[test]
fn device_routines_still_validate() {
    let mut queue = Queue::new(0).unwrap();
    let mut dx = device_malloc::<f64>(8, &mut queue).unwrap();

    let err = unsafe {
        device::axpy::<f64>(8, 1.0, dx.as_ptr(), 0, dx.as_mut_ptr(), 1, &mut queue).unwrap_err()
    };
    assert!(matches!(err, BlasError::InvalidArgument { func: "axpy", .. }));

    // Transfers check extents against the buffer's length.
    let host = [0.0f64; 4];
    assert!(device_setvector(8, &host, 1, &mut dx, 1, &mut queue).is_err());
}
