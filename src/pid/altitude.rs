// src/pid/altitude.rs

//! # Altitude PID Control Module
//!
//! This module provides a compute function and control data structure
//! to perform altitude PID (Proportional-Integral-Derivative) control
//! calculations on a range measurement, and [`AltitudePid`], the default
//! [`PidCore`] used by the altitude-hold regulator.

use crate::pid::PidCore;
use crate::{ConfigError, Number};
use piddiy::PidController;

/// Control data for the altitude PID compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AltitudeControlData<T> {
    /// The current height, typically reported by a range sensor.
    pub measurement: T,
    /// The time delta since the last computation.
    pub dt: T,
    /// The maximum allowed value for the integral term, used to prevent integral windup.
    pub integral_limit: T,
    /// Flag to reset the integral term.
    pub reset_integral: bool,
    /// Flag to zero the derivative term, used on the first tick after a reset
    /// when there is no previous error to differentiate against.
    pub skip_derivative: bool,
}

/// Altitude PID compute callback.
pub fn compute_altitude<T: Number>(
    pid: &mut PidController<T, AltitudeControlData<T>>,
    data: AltitudeControlData<T>,
) -> (T, T, T) {
    let error = pid.set_point - data.measurement;
    let integral = if !data.reset_integral {
        (pid.integral + error * data.dt).clamp(-data.integral_limit, data.integral_limit)
    } else {
        T::zero()
    };
    let derivative = if !data.skip_derivative {
        (error - pid.error) / data.dt
    } else {
        T::zero()
    };

    (error, integral, derivative)
}

/// Gains and limits for [`AltitudePid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudePidConfig<T: Number> {
    /// Proportional gain.
    pub kp: T,
    /// Integral gain.
    pub ki: T,
    /// Derivative gain.
    pub kd: T,
    /// Upper limit for integral term to prevent integral windup.
    pub integral_limit: T,
}

impl<T: Number> AltitudePidConfig<T> {
    /// Creates a new configuration with a unit proportional gain and no
    /// integral or derivative action. These should be replaced with values
    /// tuned for the airframe.
    pub fn new() -> Self {
        Self {
            kp: T::one(),
            ki: T::zero(),
            kd: T::zero(),
            integral_limit: T::one(),
        }
    }

    /// Checks that the limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.integral_limit < T::zero() {
            return Err(ConfigError::NegativeIntegralLimit);
        }
        Ok(())
    }
}

impl<T: Number> Default for AltitudePidConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// PID core for altitude hold built on a `piddiy` controller.
///
/// With a zero `kd` the derivative term is never computed. Otherwise the
/// number type must hold the error rate `error / dt`, which for millimetre
/// distances and a 10 ms tick reaches hundreds of thousands, so fixed point
/// users need a type such as `I32F32` rather than `I16F16`.
pub struct AltitudePid<T: Number> {
    pid: PidController<T, AltitudeControlData<T>>,
    integral_limit: T,
    derivative: bool,
    primed: bool,
}

impl<T: Number> AltitudePid<T> {
    /// Creates a new controller using the provided configuration.
    pub fn with_config(config: AltitudePidConfig<T>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut pid = PidController::new();
        pid.compute_fn(compute_altitude)
            .set_point(T::zero())
            .kp(config.kp)
            .ki(config.ki)
            .kd(config.kd);

        Ok(AltitudePid {
            pid,
            integral_limit: config.integral_limit,
            derivative: config.kd != T::zero(),
            primed: false,
        })
    }

    /// Current value of the integral term.
    pub fn integral(&self) -> T {
        self.pid.integral
    }
}

impl<T: Number> PidCore<T> for AltitudePid<T> {
    fn reset(&mut self) {
        self.pid.integral = T::zero();
        self.pid.error = T::zero();
        self.primed = false;
    }

    fn update(&mut self, target: T, measured: T, dt: T) -> T {
        self.pid.set_point(target);
        let data = AltitudeControlData {
            measurement: measured,
            dt,
            integral_limit: self.integral_limit,
            reset_integral: false,
            skip_derivative: !self.primed || !self.derivative,
        };
        self.primed = true;
        self.pid.compute(data)
    }
}
