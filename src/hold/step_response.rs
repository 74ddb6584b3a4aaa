// src/hold/step_response.rs

//! # Step-Response Sequencer
//!
//! Drives the altitude-hold loop through a timed square wave while logging
//! every sample, so settling time, overshoot and steady-state error can be
//! read off the telemetry while tuning.
//!
//! A run holds the low level for one phase, steps to the high level for one
//! phase, returns to the low level for one phase, and then stops. Outputs
//! depend only on the current phase; phases advance only on elapsed time and
//! the enable signal, never on the measured value. Dropping the enable signal
//! returns the sequencer to idle, and the next enable starts a fresh run.
//!
//! Time is a free-running `u32` tick counter (microseconds on the reference
//! hardware). Durations are compared on the wrapping difference so a run is
//! timed correctly across counter overflow.

use crate::hold::altitude_hold::lit;
use crate::io::Indicator;
use crate::telemetry::{StepSample, TelemetrySink};
use crate::{ConfigError, Number};

/// Longest phase duration, in ticks, that survives counter wraparound.
pub const MAX_PHASE_DURATION: u32 = i32::MAX as u32;

/// Phase of a step-response run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SequencerPhase {
    /// Not running. The next enabled tick starts a run.
    #[default]
    Idle,
    /// Holding the low level before the step.
    RisingHold,
    /// Holding the high level.
    StepHigh,
    /// Holding the low level after the step.
    FallingHold,
    /// Run finished. Waits for the enable signal to drop.
    Done,
}

/// Where the step-response sequencer is wired into the altitude-hold loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepInjection {
    /// The square wave replaces the height set point fed to the PID.
    #[default]
    SetPoint,
    /// The square wave replaces the pilot throttle ahead of the throttle
    /// filter, and throttle maps linearly onto height so both can be compared
    /// in the same units.
    Throttle,
}

/// Configuration for a step-response run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResponseConfig<T: Number> {
    /// Height held before and after the step.
    pub low: T,
    /// Height held during the step.
    pub high: T,
    /// Ticks spent in each phase.
    pub phase_duration: u32,
    /// Where the square wave enters the loop.
    pub injection: StepInjection,
    /// Aux channel value above which the run is enabled.
    pub enable_threshold: T,
}

impl<T: Number + From<i16>> StepResponseConfig<T> {
    /// Creates a configuration stepping from 50 cm to 1 m with 10 s phases
    /// on a microsecond clock, enabled by an aux channel above 90.
    pub fn new() -> Self {
        Self {
            low: lit(500),
            high: lit(1000),
            phase_duration: 10_000_000,
            injection: StepInjection::SetPoint,
            enable_threshold: lit(90),
        }
    }
}

impl<T: Number + From<i16>> Default for StepResponseConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Number> StepResponseConfig<T> {
    /// Checks that the phase duration can be timed across counter wraparound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phase_duration == 0 || self.phase_duration > MAX_PHASE_DURATION {
            return Err(ConfigError::PhaseDurationOutOfRange);
        }
        Ok(())
    }

    /// Returns `true` if the aux channel value enables a run.
    pub fn enabled_by(&self, aux: T) -> bool {
        aux > self.enable_threshold
    }
}

/// Persistent state of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencerState {
    /// Current phase.
    pub phase: SequencerPhase,
    /// Tick at which the current run started.
    pub start_time: u32,
    /// Tick at which the current phase started.
    pub phase_timer: u32,
    /// Samples logged in the current run.
    pub sample_counter: u32,
}

/// Step-response sequencer with its run indicator and telemetry sink.
pub struct StepResponseSequencer<T: Number, I: Indicator, S: TelemetrySink<T>> {
    config: StepResponseConfig<T>,
    state: SequencerState,
    indicator: I,
    telemetry: S,
}

impl<T: Number, I: Indicator, S: TelemetrySink<T>> StepResponseSequencer<T, I, S> {
    /// Creates an idle sequencer using the provided configuration.
    pub fn with_config(
        config: StepResponseConfig<T>,
        indicator: I,
        telemetry: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: SequencerState::default(),
            indicator,
            telemetry,
        })
    }

    /// Runs one tick with explicit levels and duration.
    ///
    /// Returns `set_point` unchanged while disabled or after the run has
    /// finished, and the commanded level otherwise. `phase_duration` is
    /// limited to `i32::MAX` ticks, the longest span the wrapping comparison
    /// can time.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        active: bool,
        set_point: T,
        measured: T,
        low: T,
        high: T,
        phase_duration: u32,
        now: u32,
    ) -> T {
        let phase_duration = phase_duration.min(MAX_PHASE_DURATION);
        if !active {
            if self.state.phase != SequencerPhase::Idle {
                log::info!("step response disabled in {:?}", self.state.phase);
            }
            self.state.phase = SequencerPhase::Idle;
            self.indicator.set(false);
            return set_point;
        }

        let state = &mut self.state;
        let mut effective = set_point;
        match state.phase {
            SequencerPhase::Idle => {
                state.start_time = now;
                state.phase_timer = now;
                state.sample_counter = 0;
                state.phase = SequencerPhase::RisingHold;
                effective = low;
                log::info!("step response started at {}", now);
            }
            SequencerPhase::RisingHold => {
                effective = low;
                if elapsed(now, state.phase_timer, phase_duration) {
                    state.phase_timer = now;
                    state.phase = SequencerPhase::StepHigh;
                    log::info!("step response stepped high at {}", now);
                }
            }
            SequencerPhase::StepHigh => {
                effective = high;
                if elapsed(now, state.phase_timer, phase_duration) {
                    state.phase_timer = now;
                    state.phase = SequencerPhase::FallingHold;
                    log::info!("step response stepped low at {}", now);
                }
            }
            SequencerPhase::FallingHold => {
                effective = low;
                if elapsed(now, state.phase_timer, phase_duration) {
                    state.phase = SequencerPhase::Done;
                    log::info!(
                        "step response done after {} samples",
                        state.sample_counter
                    );
                }
            }
            SequencerPhase::Done => {}
        }

        if state.phase != SequencerPhase::Done {
            state.sample_counter = state.sample_counter.wrapping_add(1);
            let sample = StepSample {
                counter: state.sample_counter,
                elapsed: now.wrapping_sub(state.start_time),
                set_point: effective,
                measured,
            };
            self.indicator.set(true);
            self.telemetry.emit(sample);
        } else {
            self.indicator.set(false);
        }

        effective
    }

    /// Runs one tick with the configured levels and duration.
    pub fn run(&mut self, active: bool, set_point: T, measured: T, now: u32) -> T {
        let StepResponseConfig {
            low,
            high,
            phase_duration,
            ..
        } = self.config;
        self.step(active, set_point, measured, low, high, phase_duration, now)
    }

    /// Current phase.
    pub fn phase(&self) -> SequencerPhase {
        self.state.phase
    }

    /// Returns `true` between the first enabled tick and the end of the run.
    pub fn is_running(&self) -> bool {
        !matches!(
            self.state.phase,
            SequencerPhase::Idle | SequencerPhase::Done
        )
    }

    /// Samples logged in the current run.
    pub fn sample_counter(&self) -> u32 {
        self.state.sample_counter
    }

    /// Persistent state.
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &StepResponseConfig<T> {
        &self.config
    }

    /// Borrows the run indicator.
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Borrows the telemetry sink.
    pub fn telemetry(&self) -> &S {
        &self.telemetry
    }

    /// Mutably borrows the telemetry sink, e.g. to drain a queue.
    pub fn telemetry_mut(&mut self) -> &mut S {
        &mut self.telemetry
    }
}

/// Wraparound-safe check that `duration` ticks have passed since `since`.
fn elapsed(now: u32, since: u32, duration: u32) -> bool {
    let delta = now.wrapping_sub(since) as i32;
    delta >= 0 && delta as u32 >= duration
}
