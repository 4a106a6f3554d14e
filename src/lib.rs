#![doc = include_str!("../README.md")]
#![warn(missing_docs, missing_debug_implementations)]
mod coroutine;
mod error;
mod iter;
mod math;
mod pool;
mod pool_host;
mod reusable;
pub mod routines;
mod scene;
mod scheduler;
mod search;
mod singleton;

pub use coroutine::*;
pub use error::*;
pub use iter::*;
pub use math::*;
pub use pool::*;
pub use pool_host::*;
pub use reusable::*;
pub use scene::*;
pub use scheduler::*;
pub use search::*;
pub use singleton::*;
