// src/telemetry.rs

//! # Step-Response Telemetry
//!
//! Records emitted by the step-response sequencer and the sinks that carry
//! them off the control loop. Sinks never block: a record that cannot be
//! buffered or formatted is dropped and counted.

use core::fmt::{Display, Write};
use heapless::{Deque, String};

/// A safe upper bound for a single CSV row.
pub const MAX_LINE_LEN: usize = 64;

/// Column names of [`StepSample::write_csv`] rows.
pub const CSV_HEADER: &str = "counter,elapsed,set_point,measured";

/// One logged sample of a step-response run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSample<T> {
    /// Samples logged in this run, starting at 1.
    pub counter: u32,
    /// Ticks since the run started.
    pub elapsed: u32,
    /// Value the sequencer commanded on this tick.
    pub set_point: T,
    /// Measured value on this tick.
    pub measured: T,
}

impl<T: Display> StepSample<T> {
    /// Writes the sample as one CSV row with two decimals, including the newline.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> core::fmt::Result {
        writeln!(
            out,
            "{},{},{:.2},{:.2}",
            self.counter, self.elapsed, self.set_point, self.measured
        )
    }
}

/// Destination for step-response samples.
pub trait TelemetrySink<T> {
    /// Accepts one sample. Must not block.
    fn emit(&mut self, sample: StepSample<T>);
}

impl<T> TelemetrySink<T> for () {
    fn emit(&mut self, _sample: StepSample<T>) {}
}

/// Bounded in-memory queue of samples, drained outside the control loop.
pub struct TelemetryQueue<T, const N: usize> {
    queue: Deque<StepSample<T>, N>,
    dropped: u32,
}

impl<T, const N: usize> TelemetryQueue<T, N> {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Removes the oldest sample.
    pub fn pop(&mut self) -> Option<StepSample<T>> {
        self.queue.pop_front()
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Samples dropped because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<T, const N: usize> Default for TelemetryQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> TelemetrySink<T> for TelemetryQueue<T, N> {
    fn emit(&mut self, sample: StepSample<T>) {
        if self.queue.push_back(sample).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            log::trace!("telemetry queue full, {} samples dropped", self.dropped);
        }
    }
}

/// Formats samples as CSV rows and forwards them to a writer such as a
/// buffered UART.
pub struct CsvTelemetry<W: Write> {
    writer: W,
    dropped: u32,
}

impl<W: Write> CsvTelemetry<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer, dropped: 0 }
    }

    /// Writes the [`CSV_HEADER`] row.
    pub fn write_header(&mut self) -> core::fmt::Result {
        writeln!(self.writer, "{}", CSV_HEADER)
    }

    /// Rows that failed to format or write.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Borrows the underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T: Display, W: Write> TelemetrySink<T> for CsvTelemetry<W> {
    fn emit(&mut self, sample: StepSample<T>) {
        let mut line: String<MAX_LINE_LEN> = String::new();
        if sample.write_csv(&mut line).is_err() || self.writer.write_str(&line).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            log::trace!("telemetry row {} dropped", sample.counter);
        }
    }
}
