//! Lock helpers that recover from poisoning instead of propagating the panic.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[track_caller]
fn report_poisoned(kind: &'static str) {
    let loc = std::panic::Location::caller();
    tracing::error!(
        target = "jmodel.registry",
        file = loc.file(),
        line = loc.line(),
        column = loc.column(),
        lock = kind,
        "lock poisoned; continuing with recovered guard"
    );
}

#[track_caller]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(err) => {
            report_poisoned("mutex");
            err.into_inner()
        }
    }
}

#[track_caller]
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(err) => {
            report_poisoned("rwlock");
            err.into_inner()
        }
    }
}

#[track_caller]
pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(err) => {
            report_poisoned("rwlock");
            err.into_inner()
        }
    }
}
