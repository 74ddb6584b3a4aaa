// demos/altitude_hold.rs

use core::fmt;
use free_flight_altitude_hold::{
    AltitudeHold, AltitudeHoldConfig, AltitudePid, AltitudePidConfig, CsvTelemetry,
    StepResponseConfig, StepResponseSequencer,
};

// Forward CSV rows to standard output.
struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        print!("{}", s);
        Ok(())
    }
}

// Simple vertical model: throttle above hover accelerates upward, with drag.
struct Vehicle {
    height: f32,
    velocity: f32,
}

impl Vehicle {
    const HOVER: f32 = -30.0;
    const GAIN: f32 = 40.0;
    const DRAG: f32 = 1.5;
    const SONAR_MAX: f32 = 4000.0;

    fn advance(&mut self, throttle: f32, dt: f32) {
        let accel = Self::GAIN * (throttle - Self::HOVER) - Self::DRAG * self.velocity;
        self.velocity += accel * dt;
        self.height = (self.height + self.velocity * dt).max(0.0);
    }

    // Negative when out of range.
    fn sonar(&self) -> f32 {
        if self.height > Self::SONAR_MAX {
            -1.0
        } else {
            self.height
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AltitudeHoldConfig::<f32>::new();

    // Set the PID gains and the integral limit to prevent windup.
    let mut pid_config = AltitudePidConfig::<f32>::new();
    pid_config.kp = 0.08;
    pid_config.ki = 0.02;
    pid_config.kd = 0.03;
    pid_config.integral_limit = 400.0;
    let pid = AltitudePid::with_config(pid_config)?;

    // No buzzer on the bench.
    let mut hold = AltitudeHold::with_config(config, pid, ())?;

    // Two second phases on a microsecond clock.
    let mut step_config = StepResponseConfig::<f32>::new();
    step_config.phase_duration = 2_000_000;
    let telemetry = CsvTelemetry::new(Stdout);
    let mut sequencer = StepResponseSequencer::with_config(step_config, (), telemetry)?;
    sequencer.telemetry_mut().write_header()?;

    let mut vehicle = Vehicle {
        height: 700.0,
        velocity: 0.0,
    };
    let throttle = -30.0; // pilot stick near hover
    let aux = 100.0; // step-response switch on
    let dt = 0.01;
    let tick_us = 10_000u32;
    let mut now = 0u32;

    for _ in 0..800 {
        let enabled = step_config.enabled_by(aux);
        let output =
            hold.update_with_step(vehicle.sonar(), throttle, dt, &mut sequencer, enabled, now);
        vehicle.advance(output, dt);
        now = now.wrapping_add(tick_us);
    }

    eprintln!(
        "phase {:?}, {} samples, {} dropped, final height {:.1}",
        sequencer.phase(),
        sequencer.sample_counter(),
        sequencer.telemetry().dropped(),
        vehicle.height
    );
    Ok(())
}
