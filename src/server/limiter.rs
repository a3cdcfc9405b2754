//! # Límite de Workers
//! src/server/limiter.rs
//!
//! Compuerta contadora que acota cuántos threads de conexión corren a la
//! vez. El acceptor pide un permiso antes de lanzar cada worker; si no
//! hay permisos, espera (y con él deja de aceptar) hasta que alguno
//! termine o hasta que el servidor se detenga. Sin límite la compuerta
//! nunca bloquea, sólo cuenta.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Compuerta `Mutex<usize>` + `Condvar`
#[derive(Debug)]
pub struct WorkerLimiter {
    limit: Option<usize>,
    active: Mutex<usize>,
    released: Condvar,
}

/// Permiso de un worker; se libera al dropearlo
#[derive(Debug)]
pub struct WorkerPermit {
    limiter: Arc<WorkerLimiter>,
}

impl WorkerLimiter {
    /// `None` = sin límite
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|n| *n > 0),
            active: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Workers con permiso en este momento
    pub fn active(&self) -> usize {
        *self.lock()
    }

    /// Bloquea hasta que haya un permiso libre mientras `running` siga
    /// encendido
    ///
    /// Retorna `None` si `running` se apagó antes de conseguir permiso.
    /// Quien apaga la bandera debe llamar a [`WorkerLimiter::wake_all`].
    pub fn acquire(self: &Arc<Self>, running: &AtomicBool) -> Option<WorkerPermit> {
        let mut active = self.lock();
        if let Some(limit) = self.limit {
            if *active >= limit {
                tracing::debug!(active = *active, limit, "límite de workers alcanzado, esperando");
            }
            active = self
                .released
                .wait_while(active, |n| *n >= limit && running.load(Ordering::SeqCst))
                .unwrap_or_else(PoisonError::into_inner);
        }
        if !running.load(Ordering::SeqCst) {
            return None;
        }
        *active += 1;
        Some(WorkerPermit {
            limiter: Arc::clone(self),
        })
    }

    /// Despierta a todos los que esperan en `acquire` para que revisen
    /// su bandera
    pub fn wake_all(&self) {
        let _active = self.lock();
        self.released.notify_all();
    }

    /// Como `acquire` pero sin bloquear
    pub fn try_acquire(self: &Arc<Self>) -> Option<WorkerPermit> {
        let mut active = self.lock();
        if self.limit.is_some_and(|limit| *active >= limit) {
            return None;
        }
        *active += 1;
        Some(WorkerPermit {
            limiter: Arc::clone(self),
        })
    }

    fn release(&self) {
        let mut active = self.lock();
        *active = active.saturating_sub(1);
        self.released.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
