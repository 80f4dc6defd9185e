//! Gas meter telemetry agent library.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module, with host simulations alongside.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod counter;
pub mod error;
pub mod inspection;
pub mod pins;
pub mod scheduler;
pub mod state;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
pub mod sensors;
