// src/hold.rs

//! # Altitude Hold Module
//!
//! This module provides the altitude-hold regulator, the step-response
//! sequencer that drives it through a test pattern, and their shared
//! numeric and configuration types.

pub mod altitude_hold;
pub use altitude_hold::*;
pub mod regulator;
pub use regulator::*;
pub mod step_response;
pub use step_response::*;
