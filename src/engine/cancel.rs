//! Cooperative cancellation.
//! The engine never owns a global flag; callers create a token, pass it in
//! through the run context, and trip it from wherever they like (the CLI
//! wires Ctrl-C to it).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable one-way "stop" flag. Relaxed atomics are sufficient.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (idempotent, safe from signal handlers).
    #[inline]
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
