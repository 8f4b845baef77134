use std::time::{Duration, Instant};

/// A periodic task driven by an external clock.
///
/// The task does not own a thread or a timer. Whoever runs the event loop calls
/// [`PeriodicTask::poll`] with the current instant and runs the work when it
/// returns `true`. Ticks that were missed while the caller was busy are skipped, never
/// replayed back to back.
#[derive(Clone, Debug)]
pub struct PeriodicTask {
    name: &'static str,
    period: Duration,
    next_due: Option<Instant>,
    ticks: u64,
}

impl PeriodicTask {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            next_due: None,
            ticks: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of times the task fired since it was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Starts the task so that its first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns `true` at most once per call when the task is due, and schedules the
    /// following tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let mut next = due + self.period;
        if next <= now {
            // we fell behind by at least a whole period, re-anchor on now
            next = now + self.period;
        }
        self.next_due = Some(next);
        self.ticks += 1;
        true
    }

    /// How long until the next tick, `None` when stopped.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(now))
    }
}
