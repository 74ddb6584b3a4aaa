// src/sensors.rs

//! # Altitude Sensors
//!
//! Interfaces to the range sensor and barometer drivers, and
//! [`AltitudeSensors`], which selects at runtime which of them the
//! altitude-hold loop is built on.

use core::marker::PhantomData;

/// Range sensor driver, typically an ultrasonic sonar.
pub trait RangeSensor<T> {
    /// One-time bring-up.
    fn init(&mut self);

    /// Starts a new measurement if the previous one has completed.
    /// Returns `true` if a measurement was started.
    fn trigger(&mut self) -> bool;

    /// Latest distance. Negative values mean the reading is invalid or out
    /// of range.
    fn distance(&mut self) -> T;
}

/// Barometer driver.
pub trait Barometer<T> {
    /// One-time bring-up, including capturing the ground reference.
    fn init(&mut self);

    /// Advances the driver's conversion cycle. Returns `true` when new data
    /// is available.
    fn poll(&mut self) -> bool;

    /// Altitude relative to the ground reference captured at bring-up.
    fn relative_altitude(&self) -> T;
}

/// Sensors available to altitude hold.
///
/// Built with [`AltitudeSensors::sonar`], [`AltitudeSensors::sonar_with_barometer`]
/// or [`AltitudeSensors::barometer`]. Only the range sensor feeds the
/// regulator; without one, altitude hold passes the throttle through.
pub struct AltitudeSensors<T, S: RangeSensor<T>, B: Barometer<T>> {
    range: Option<S>,
    barometer: Option<B>,
    _number: PhantomData<T>,
}

impl<T, S: RangeSensor<T>, B: Barometer<T>> AltitudeSensors<T, S, B> {
    /// Range sensor only.
    pub fn sonar(range: S) -> Self {
        Self {
            range: Some(range),
            barometer: None,
            _number: PhantomData,
        }
    }

    /// Range sensor and barometer.
    pub fn sonar_with_barometer(range: S, barometer: B) -> Self {
        Self {
            range: Some(range),
            barometer: Some(barometer),
            _number: PhantomData,
        }
    }

    /// Barometer only.
    pub fn barometer(barometer: B) -> Self {
        Self {
            range: None,
            barometer: Some(barometer),
            _number: PhantomData,
        }
    }

    /// Brings up every present sensor.
    pub fn init(&mut self) {
        if let Some(range) = self.range.as_mut() {
            range.init();
        }
        if let Some(barometer) = self.barometer.as_mut() {
            barometer.init();
        }
        log::debug!(
            "altitude sensors initialized: range {}, barometer {}",
            self.range.is_some(),
            self.barometer.is_some()
        );
    }

    /// Background work for each scheduler pass: triggers the range sensor
    /// and advances the barometer. Returns `true` when the barometer has new
    /// data.
    pub fn poll(&mut self) -> bool {
        if let Some(range) = self.range.as_mut() {
            let _ = range.trigger();
        }
        match self.barometer.as_mut() {
            Some(barometer) => barometer.poll(),
            None => false,
        }
    }

    /// Latest range reading, or `None` without a range sensor.
    pub fn range(&mut self) -> Option<T> {
        self.range.as_mut().map(|range| range.distance())
    }

    /// Barometric altitude, or `None` without a barometer.
    pub fn barometer_altitude(&self) -> Option<T> {
        self.barometer.as_ref().map(|barometer| barometer.relative_altitude())
    }

    /// Returns `true` if a range sensor is present.
    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }
}
