//! Hedgerow library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the sandbox entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import game types, systems, and resources without needing a
//! window or GPU.

pub mod shared;
pub mod config;
pub mod calendar;
pub mod player;
pub mod world;
pub mod bushes;
pub mod audio;
pub mod save;
