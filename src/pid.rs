// src/pid.rs

//! # PID Control Module
//!
//! This module provides the compute function and control data structure
//! used for altitude PID control, and the [`PidCore`] interface the
//! altitude-hold regulator drives.

pub mod altitude;
pub use altitude::*;

/// Numeric PID core driven by the altitude-hold regulator.
///
/// Implementations own their integrator and derivative memory. The
/// regulator calls [`PidCore::reset`] every time altitude hold engages.
pub trait PidCore<T> {
    /// Clears integrator and derivative memory.
    fn reset(&mut self);

    /// Computes the control output that drives `measured` toward `target`.
    fn update(&mut self, target: T, measured: T, dt: T) -> T;
}
