// src/hold/altitude_hold.rs

//! A module specifying the shared numeric and configuration types for the
//! altitude-hold regulator and the step-response sequencer.
//! This module is designed for embedded systems in no_std environments.
//! It includes the [`Number`] trait the control math is generic over, the
//! regulator configuration, and the configuration error type.

use core::fmt::Debug;
use core::ops::Neg;
use num_traits::{One, Zero};
use piddiy::Number as PiddiyNumber;

/// Custom trait to encapsulate base number requirements.
pub trait Number: PiddiyNumber + Zero + One + Neg<Output = Self> + Debug {
    /// Clamps generic PartialOrd values within a given range.
    fn clamp(self, min: Self, max: Self) -> Self {
        if self < min {
            min
        } else if max < self {
            max
        } else {
            self
        }
    }

    /// Linearly maps `self` from `[in_min, in_max]` to `[out_min, out_max]`.
    ///
    /// Values outside the input range extrapolate. A degenerate input range
    /// maps everything to `out_min`.
    fn map_range(self, in_min: Self, in_max: Self, out_min: Self, out_max: Self) -> Self {
        if in_max == in_min {
            return out_min;
        }
        // Divide before multiplying so narrow fixed point types do not overflow.
        (self - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
    }
}

impl<T: PiddiyNumber + Zero + One + Neg<Output = T> + Debug> Number for T {}

/// Reasons a configuration is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The distance range is empty, inverted, or starts below zero.
    #[error("distance range must satisfy 0 <= min_distance < max_distance")]
    InvalidDistanceRange,
    /// The actuator range is empty or inverted.
    #[error("actuator range must satisfy actuator_min < actuator_max")]
    InvalidActuatorRange,
    /// The low throttle threshold lies outside the actuator range.
    #[error("min_throttle must lie within (actuator_min, actuator_max]")]
    MinThrottleOutOfRange,
    /// The hover throttle estimate lies outside the actuator range.
    #[error("hover_throttle must lie within (actuator_min, actuator_max)")]
    HoverThrottleOutOfRange,
    /// The default set point lies outside the distance range.
    #[error("default_set_point must lie within [min_distance, max_distance]")]
    DefaultSetPointOutOfRange,
    /// The throttle filter coefficient is not a usable smoothing factor.
    #[error("filter_alpha must lie within (0, 1]")]
    FilterAlphaOutOfRange,
    /// The output floor would exclude the whole actuator range.
    #[error("floor_fraction must lie within [0, 1)")]
    FloorFractionOutOfRange,
    /// The PID integral limit is negative.
    #[error("integral_limit must not be negative")]
    NegativeIntegralLimit,
    /// The step duration is zero or too long for wraparound-safe comparison.
    #[error("phase_duration must lie within [1, i32::MAX] ticks")]
    PhaseDurationOutOfRange,
}

/// Configuration for the altitude-hold regulator.
///
/// Distances are in range sensor units (millimeters for the sonar), throttle
/// values are in actuator units (percent, `-100..=100` by default).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeHoldConfig<T: Number> {
    /// Lowest height the throttle map can command.
    pub min_distance: T,
    /// Highest height the throttle map can command, in practice the sensor's range.
    pub max_distance: T,
    /// Lowest actuator command.
    pub actuator_min: T,
    /// Highest actuator command.
    pub actuator_max: T,
    /// Throttle below which the stick is considered to be at the bottom when
    /// altitude hold engages.
    pub min_throttle: T,
    /// Set point used when altitude hold engages with the stick at the bottom.
    pub default_set_point: T,
    /// Throttle at which the vehicle approximately hovers, used as the
    /// reference when altitude hold engages with the stick at the bottom.
    pub hover_throttle: T,
    /// Smoothing factor of the throttle low pass filter.
    pub filter_alpha: T,
    /// Fraction of the actuator span added to `actuator_min` so the output
    /// never commands a full cutoff.
    pub floor_fraction: T,
    /// Drop out of altitude hold on an invalid range reading, so the next
    /// valid reading captures a new reference.
    pub deactivate_on_dropout: bool,
}

/// Converts an integer constant into the control number type.
pub(crate) fn lit<T: From<i16>>(value: i16) -> T {
    T::from(value)
}

impl<T: Number + From<i16>> AltitudeHoldConfig<T> {
    /// Creates a new configuration with defaults for a sonar with a
    /// 5 cm to 1.5 m usable range and a `-100..=100` throttle.
    ///
    /// Example Usage
    /// ```
    /// use free_flight_altitude_hold::AltitudeHoldConfig;
    ///
    /// let mut config = AltitudeHoldConfig::<f32>::new();
    ///
    /// // Hold between 10 cm and 2 m.
    /// config.min_distance = 100.0;
    /// config.max_distance = 2000.0;
    ///
    /// // This airframe hovers around 20% below mid stick.
    /// config.hover_throttle = -20.0;
    ///
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            min_distance: lit(50),
            max_distance: lit(1500),
            actuator_min: lit(-100),
            actuator_max: lit(100),
            min_throttle: lit(-90),
            default_set_point: lit(1000),
            hover_throttle: lit(-30),
            filter_alpha: T::one() / lit::<T>(1000),
            floor_fraction: T::one() / lit::<T>(20),
            deactivate_on_dropout: false,
        }
    }
}

impl<T: Number + From<i16>> Default for AltitudeHoldConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Number> AltitudeHoldConfig<T> {
    /// Checks that the ranges and constants describe a usable regulator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_distance < T::zero() || self.max_distance <= self.min_distance {
            return Err(ConfigError::InvalidDistanceRange);
        }
        if self.actuator_max <= self.actuator_min {
            return Err(ConfigError::InvalidActuatorRange);
        }
        if self.min_throttle <= self.actuator_min || self.actuator_max < self.min_throttle {
            return Err(ConfigError::MinThrottleOutOfRange);
        }
        if self.hover_throttle <= self.actuator_min || self.actuator_max <= self.hover_throttle {
            return Err(ConfigError::HoverThrottleOutOfRange);
        }
        if self.default_set_point < self.min_distance || self.max_distance < self.default_set_point
        {
            return Err(ConfigError::DefaultSetPointOutOfRange);
        }
        if self.filter_alpha <= T::zero() || T::one() < self.filter_alpha {
            return Err(ConfigError::FilterAlphaOutOfRange);
        }
        if self.floor_fraction < T::zero() || T::one() <= self.floor_fraction {
            return Err(ConfigError::FloorFractionOutOfRange);
        }
        Ok(())
    }

    /// Margin kept between `actuator_min` and the lowest output.
    pub fn floor_margin(&self) -> T {
        (self.actuator_max - self.actuator_min) * self.floor_fraction
    }

    /// Lowest throttle the regulator outputs while holding altitude.
    pub fn output_floor(&self) -> T {
        self.actuator_min + self.floor_margin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Test the mapping at both ends and in the middle of the input range.
    #[test]
    fn test_map_range() {
        assert!(value_close(50.0, (-100.0f32).map_range(-100.0, 100.0, 50.0, 1500.0)));
        assert!(value_close(1500.0, 100.0f32.map_range(-100.0, 100.0, 50.0, 1500.0)));
        assert!(value_close(775.0, 0.0f32.map_range(-100.0, 100.0, 50.0, 1500.0)));
    }

    /// Test that a degenerate input range maps to the lower output bound.
    #[test]
    fn test_map_range_degenerate_input() {
        assert!(value_close(800.0, 100.0f32.map_range(100.0, 100.0, 800.0, 1500.0)));
    }

    /// Test the default configuration.
    #[test]
    fn test_default_config() {
        let config = AltitudeHoldConfig::<f32>::new();
        assert_eq!(Ok(()), config.validate());
        assert!(value_close(0.001, config.filter_alpha));
        assert!(value_close(10.0, config.floor_margin()));
        assert!(value_close(-90.0, config.output_floor()));
    }

    /// Test that inconsistent configurations are rejected.
    #[test]
    fn test_config_validation() {
        let mut config = AltitudeHoldConfig::<f32>::new();
        config.max_distance = 10.0;
        assert_eq!(Err(ConfigError::InvalidDistanceRange), config.validate());

        let mut config = AltitudeHoldConfig::<f32>::new();
        config.actuator_max = config.actuator_min;
        assert_eq!(Err(ConfigError::InvalidActuatorRange), config.validate());

        let mut config = AltitudeHoldConfig::<f32>::new();
        config.min_throttle = -100.0;
        assert_eq!(Err(ConfigError::MinThrottleOutOfRange), config.validate());

        let mut config = AltitudeHoldConfig::<f32>::new();
        config.hover_throttle = 100.0;
        assert_eq!(Err(ConfigError::HoverThrottleOutOfRange), config.validate());

        let mut config = AltitudeHoldConfig::<f32>::new();
        config.default_set_point = 2000.0;
        assert_eq!(Err(ConfigError::DefaultSetPointOutOfRange), config.validate());

        let mut config = AltitudeHoldConfig::<f32>::new();
        config.filter_alpha = 0.0;
        assert_eq!(Err(ConfigError::FilterAlphaOutOfRange), config.validate());

        let mut config = AltitudeHoldConfig::<f32>::new();
        config.floor_fraction = 1.0;
        assert_eq!(Err(ConfigError::FloorFractionOutOfRange), config.validate());
    }
}
