// src/test_utils.rs

//! This module contains utilities for testing.

use crate::io::{FaultSignal, Indicator};
use crate::pid::PidCore;
use crate::sensors::{Barometer, RangeSensor};
use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};

/// A constant defining the tolerance within which floating-point values
/// are considered close enough to be equal.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Checks if two floating point numbers are close enough to be considered
/// equal.
///
/// # Arguments
/// * `target` - The target value.
/// * `value` - The value to compare against the target.
///
/// # Returns
/// `true` if the absolute difference between `target` and `value` is less than
/// `TEST_TOLERANCE`, otherwise `false`.
pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// Checks if two floating point numbers are not close enough to be
/// considered equal.
///
/// # Arguments
/// * `target` - The target value.
/// * `value` - The value to compare against the target.
///
/// # Returns
/// `true` if the absolute difference between `target` and `value` exceeds
/// `TEST_TOLERANCE`, otherwise `false`.
pub fn value_not_close(target: f32, value: f32) -> bool {
    TEST_TOLERANCE <= (target - value).abs()
}

/// PID core returning a fixed output and recording its last inputs.
#[derive(Debug, Default)]
pub struct ScriptedPid {
    /// Output returned by every update.
    pub output: f32,
    /// Last target passed to update.
    pub target: f32,
    /// Last measurement passed to update.
    pub measured: f32,
    /// Last time delta passed to update.
    pub dt: f32,
    /// Number of updates.
    pub calls: u32,
    /// Number of resets.
    pub resets: u32,
}

impl ScriptedPid {
    pub fn new(output: f32) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }
}

impl PidCore<f32> for ScriptedPid {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn update(&mut self, target: f32, measured: f32, dt: f32) -> f32 {
        self.target = target;
        self.measured = measured;
        self.dt = dt;
        self.calls += 1;
        self.output
    }
}

/// Fault signal and indicator recording every write.
#[derive(Debug, Default)]
pub struct RecordingSignal {
    /// Last state written, `None` if never written.
    pub last: Option<bool>,
    /// Number of writes.
    pub writes: u32,
    /// Number of writes turning the output on.
    pub asserted: u32,
}

impl RecordingSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, on: bool) {
        self.last = Some(on);
        self.writes += 1;
        if on {
            self.asserted += 1;
        }
    }
}

impl FaultSignal for RecordingSignal {
    fn signal(&mut self, on: bool) {
        self.record(on);
    }
}

impl Indicator for RecordingSignal {
    fn set(&mut self, on: bool) {
        self.record(on);
    }
}

/// Output pin recording its level.
#[derive(Debug, Default)]
pub struct MockPin {
    /// Current level, `None` if never driven.
    pub high: Option<bool>,
    /// Number of level writes.
    pub writes: u32,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = Some(false);
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = Some(true);
        self.writes += 1;
        Ok(())
    }
}

/// Range sensor returning a fixed distance.
#[derive(Debug)]
pub struct MockSonar {
    pub distance: f32,
    pub initialized: bool,
    pub triggers: u32,
}

impl MockSonar {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            initialized: false,
            triggers: 0,
        }
    }
}

impl RangeSensor<f32> for MockSonar {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn trigger(&mut self) -> bool {
        self.triggers += 1;
        true
    }

    fn distance(&mut self) -> f32 {
        self.distance
    }
}

/// Barometer returning a fixed altitude, always with new data.
#[derive(Debug)]
pub struct MockBarometer {
    pub altitude: f32,
    pub initialized: bool,
}

impl MockBarometer {
    pub fn new(altitude: f32) -> Self {
        Self {
            altitude,
            initialized: false,
        }
    }
}

impl Barometer<f32> for MockBarometer {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn poll(&mut self) -> bool {
        true
    }

    fn relative_altitude(&self) -> f32 {
        self.altitude
    }
}
