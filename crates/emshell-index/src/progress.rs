//! Progress reporting for long-running passes.
//!
//! Passes over the lattice can run for many millions of iterations. They call a
//! [`Progress`] observer once every `interval` iterations, tracked by a
//! [`Cadence`]. The observer only receives messages; nothing it does feeds back
//! into the pass.

use std::fmt;

/// Default number of iterations between progress reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 1000;

/// Observer for progress messages.
pub trait Progress {
    /// Receive a formatted message. `flush` asks for the message to be shown
    /// immediately rather than buffered.
    fn report(&mut self, message: fmt::Arguments<'_>, flush: bool);
}

impl<F> Progress for F
where
    F: FnMut(&str, bool),
{
    fn report(&mut self, message: fmt::Arguments<'_>, flush: bool) {
        self(&message.to_string(), flush)
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Progress for Silent {
    #[inline]
    fn report(&mut self, _message: fmt::Arguments<'_>, _flush: bool) {}
}

/// Forwards messages to `tracing`: flushed messages at info level, the rest at
/// debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn report(&mut self, message: fmt::Arguments<'_>, flush: bool) {
        if flush {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }
}

/// Fires once every `interval` ticks.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval: u64,
    countdown: u64,
}

impl Cadence {
    /// An interval of 0 is treated as 1.
    pub fn new(interval: u64) -> Self {
        let interval = interval.max(1);
        Self {
            interval,
            countdown: interval,
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Count one iteration. Returns `true` on every `interval`-th call.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.interval;
            true
        } else {
            false
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_fires_every_interval() {
        let mut cadence = Cadence::new(3);
        let fired: Vec<_> = (0..9).map(|_| cadence.tick()).collect();
        assert_eq!(
            fired,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn zero_interval_fires_every_tick() {
        let mut cadence = Cadence::new(0);
        assert_eq!(cadence.interval(), 1);
        assert!(cadence.tick());
        assert!(cadence.tick());
    }

    #[test]
    fn closures_receive_formatted_messages() {
        let mut seen = Vec::new();
        {
            let mut sink = |message: &str, flush: bool| seen.push((message.to_owned(), flush));
            let progress: &mut dyn Progress = &mut sink;
            progress.report(format_args!("verified {} / {}", 3, 10), true);
            progress.report(format_args!("done"), false);
        }
        assert_eq!(
            seen,
            vec![("verified 3 / 10".to_owned(), true), ("done".to_owned(), false)]
        );
    }
}
