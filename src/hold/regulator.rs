// src/hold/regulator.rs

//! # Altitude-Hold Regulator
//!
//! Holds the vehicle at a height above the ground measured by a range
//! sensor, while still letting the pilot climb and descend with the
//! throttle stick.
//!
//! ## Overview
//!
//! When altitude hold engages (the first valid range reading after a
//! [`AltitudeHold::reset`]) the regulator captures two references: the
//! throttle at that moment and the height to hold. If the stick is at the
//! bottom on engagement, a default height and a hover throttle estimate are
//! used instead, since a near-zero throttle is meaningless as a reference.
//!
//! Every tick after that the throttle is low pass filtered and mapped onto a
//! target height with two linear segments meeting at the captured
//! references: less throttle than on engagement descends toward
//! `min_distance`, more throttle climbs toward `max_distance`. The PID output
//! is added to the captured throttle and clamped so the motors are never
//! commanded fully off.
//!
//! Invalid range readings assert the fault signal and pass the pilot
//! throttle through unmodified.

use crate::io::{FaultSignal, Indicator};
use crate::pid::{AltitudePid, PidCore};
use crate::sensors::{AltitudeSensors, Barometer, RangeSensor};
use crate::telemetry::TelemetrySink;
use crate::{AltitudeHoldConfig, ConfigError, Number, StepInjection, StepResponseSequencer};

/// Persistent state of the regulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegulatorState<T> {
    /// Whether the loop is regulating.
    pub active: bool,
    /// Low pass filtered pilot throttle.
    pub filtered_throttle: T,
    /// Throttle captured when altitude hold engaged.
    pub initial_throttle: T,
    /// Height captured when altitude hold engaged.
    pub set_point: T,
}

impl<T: Number> RegulatorState<T> {
    /// Creates an inactive state.
    pub fn new() -> Self {
        Self {
            active: false,
            filtered_throttle: T::zero(),
            initial_throttle: T::zero(),
            set_point: T::zero(),
        }
    }
}

impl<T: Number> Default for RegulatorState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Altitude-hold regulator.
pub struct AltitudeHold<T: Number, F: FaultSignal, P: PidCore<T> = AltitudePid<T>> {
    config: AltitudeHoldConfig<T>,
    pid: P,
    fault: F,
    state: RegulatorState<T>,
    faulted: bool,
}

impl<T: Number, F: FaultSignal, P: PidCore<T>> AltitudeHold<T, F, P> {
    /// Creates an inactive regulator using the provided configuration.
    pub fn with_config(config: AltitudeHoldConfig<T>, pid: P, fault: F) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            pid,
            fault,
            state: RegulatorState::new(),
            faulted: false,
        })
    }

    /// Brings up the sensors and leaves the regulator inactive.
    pub fn init<S: RangeSensor<T>, B: Barometer<T>>(&mut self, sensors: &mut AltitudeSensors<T, S, B>) {
        sensors.init();
        self.reset();
    }

    /// Disengages altitude hold. The next valid reading captures new
    /// references.
    pub fn reset(&mut self) {
        self.state.active = false;
    }

    /// Runs one tick and returns the corrected throttle.
    ///
    /// - `distance`: Range reading, negative if invalid.
    /// - `throttle`: Pilot throttle command.
    /// - `dt`: Time delta since the last tick.
    pub fn update(&mut self, distance: T, throttle: T, dt: T) -> T {
        if !self.accept(distance) {
            return throttle;
        }
        self.engage(distance, throttle);
        self.filter(throttle);
        let target = self.target();
        self.correct(target, distance, dt)
    }

    /// Runs one tick on the current reading of `sensors`.
    ///
    /// Without a range sensor the throttle passes through and no fault is
    /// signaled.
    pub fn update_from<S: RangeSensor<T>, B: Barometer<T>>(
        &mut self,
        sensors: &mut AltitudeSensors<T, S, B>,
        throttle: T,
        dt: T,
    ) -> T {
        match sensors.range() {
            Some(distance) => self.update(distance, throttle, dt),
            None => throttle,
        }
    }

    /// Runs one tick with a step-response sequencer wired in per its
    /// [`StepInjection`].
    ///
    /// - `enabled`: Enable signal for the sequencer, sampled this tick.
    /// - `now`: Free-running tick counter.
    #[allow(clippy::too_many_arguments)]
    pub fn update_with_step<I: Indicator, S: TelemetrySink<T>>(
        &mut self,
        distance: T,
        throttle: T,
        dt: T,
        sequencer: &mut StepResponseSequencer<T, I, S>,
        enabled: bool,
        now: u32,
    ) -> T {
        if !self.accept(distance) {
            return throttle;
        }
        self.engage(distance, throttle);

        let step = *sequencer.config();
        let c = &self.config;
        let target = match step.injection {
            StepInjection::SetPoint => {
                self.filter(throttle);
                let target = self.target();
                sequencer.run(enabled, target, distance, now)
            }
            StepInjection::Throttle => {
                let to_throttle =
                    |d: T| d.map_range(c.min_distance, c.max_distance, c.actuator_min, c.actuator_max);
                let stepped = sequencer.step(
                    enabled,
                    throttle,
                    to_throttle(distance),
                    to_throttle(step.low),
                    to_throttle(step.high),
                    step.phase_duration,
                    now,
                );
                self.filter(stepped);
                let c = &self.config;
                self.state.filtered_throttle.map_range(
                    c.actuator_min,
                    c.actuator_max,
                    c.min_distance,
                    c.max_distance,
                )
            }
        };
        self.correct(target, distance, dt)
    }

    /// Returns `true` while regulating.
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Persistent state.
    pub fn state(&self) -> &RegulatorState<T> {
        &self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &AltitudeHoldConfig<T> {
        &self.config
    }

    /// Borrows the PID core.
    pub fn pid(&self) -> &P {
        &self.pid
    }

    /// Borrows the fault signal.
    pub fn fault(&self) -> &F {
        &self.fault
    }

    /// Signals a fault on an invalid reading. Returns `true` if the reading
    /// can be regulated on.
    fn accept(&mut self, distance: T) -> bool {
        if distance < T::zero() {
            if !self.faulted {
                log::warn!("range reading invalid: {:?}", distance);
                self.faulted = true;
            }
            self.fault.signal(true);
            if self.config.deactivate_on_dropout {
                self.state.active = false;
            }
            return false;
        }
        if self.faulted {
            log::debug!("range reading recovered: {:?}", distance);
            self.faulted = false;
            self.fault.signal(false);
        }
        true
    }

    /// Captures the references on the inactive to active edge.
    fn engage(&mut self, distance: T, throttle: T) {
        if self.state.active {
            return;
        }
        let c = &self.config;
        let state = &mut self.state;
        state.active = true;
        self.pid.reset();
        state.filtered_throttle = throttle;
        if throttle < c.min_throttle {
            state.set_point = c.default_set_point;
            state.initial_throttle = c.hover_throttle;
        } else {
            state.set_point = distance.clamp(c.min_distance, c.max_distance);
            state.initial_throttle = throttle;
        }
        log::debug!(
            "altitude hold engaged: set point {:?}, initial throttle {:?}",
            state.set_point,
            state.initial_throttle
        );
    }

    fn filter(&mut self, throttle: T) {
        let alpha = self.config.filter_alpha;
        let state = &mut self.state;
        state.filtered_throttle = state.filtered_throttle * (T::one() - alpha) + throttle * alpha;
    }

    /// Maps the filtered throttle onto a target height.
    fn target(&self) -> T {
        let c = &self.config;
        let state = &self.state;
        if state.filtered_throttle < state.initial_throttle {
            state.filtered_throttle.map_range(
                c.actuator_min,
                state.initial_throttle,
                c.min_distance,
                state.set_point,
            )
        } else {
            state.filtered_throttle.map_range(
                state.initial_throttle,
                c.actuator_max,
                state.set_point,
                c.max_distance,
            )
        }
    }

    fn correct(&mut self, target: T, distance: T, dt: T) -> T {
        let output = self.pid.update(target, distance, dt);
        (self.state.initial_throttle + output).clamp(self.config.output_floor(), self.config.actuator_max)
    }
}
