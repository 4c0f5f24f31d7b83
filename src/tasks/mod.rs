//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the host process.
//!
//! # Tasks
//! - Expiry sweep: eagerly removes expired cache entries at configured
//!   intervals, complementing the lazy removal done on reads

mod sweep;

pub use sweep::spawn_sweep_task;
