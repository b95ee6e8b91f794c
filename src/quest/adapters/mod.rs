//! Adapter implementations for guild ports.

mod configured;
pub mod memory;
pub mod postgres;

pub use configured::ConfiguredStore;
