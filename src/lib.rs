// src/lib.rs

//! # Range-Sensor Altitude Hold
//!
//! This crate provides a `no_std`, no-alloc altitude-hold regulation loop for
//! small multirotors flying over a range sensor (sonar), together with a
//! step-response sequencer used to characterize the loop while tuning.
//!
//! The regulator captures a reference throttle and set point when altitude
//! hold is engaged, turns the low pass filtered pilot throttle into a target
//! height, and corrects the throttle with a PID controller. The sequencer
//! replaces that target with a timed square wave and logs every sample.
//!
//! Control math is generic over [`Number`], so the loop runs on `f32` or on
//! fixed point types.

#![no_std]
#![deny(missing_docs)]

pub mod hold;
pub mod io;
pub mod pid;
pub mod sensors;
pub mod telemetry;

#[doc(inline)]
pub use hold::*;
#[doc(inline)]
pub use io::{ActiveLevel, FaultSignal, Indicator, OutputIndicator};
#[doc(inline)]
pub use pid::{AltitudePid, AltitudePidConfig, PidCore};
#[doc(inline)]
pub use sensors::{AltitudeSensors, Barometer, RangeSensor};
#[doc(inline)]
pub use telemetry::{CsvTelemetry, StepSample, TelemetryQueue, TelemetrySink};

#[cfg(test)]
mod test_utils;
