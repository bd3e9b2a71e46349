//! Filesystem move primitives used by the executor.

mod atomic;
mod copy;
pub mod helpers;
mod util;

pub use atomic::try_atomic_move;
pub use copy::copy_verify_rename;
pub(crate) use util::is_cross_device;
