/// Fixed-period tick timer for the enemy round.
///
/// The game loop polls it once per frame; `poll` reports at most one due
/// tick per call. Started at game start, stopped once on entering a
/// terminal phase (and around pauses).

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct TickTimer {
    period: Duration,
    last: Option<Instant>,
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        TickTimer { period, last: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }

    /// True if a period has elapsed since the last tick. The next period
    /// starts from the previous deadline, so slow frames do not drift.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(last) = self.last else { return false };
        if now.saturating_duration_since(last) < self.period {
            return false;
        }
        let next = last + self.period;
        // Fell more than a full period behind: resync instead of bursting.
        self.last = Some(if now.saturating_duration_since(next) >= self.period { now } else { next });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn stopped_timer_never_fires() {
        let mut t = TickTimer::new(SEC);
        assert!(!t.is_running());
        assert!(!t.poll(Instant::now() + SEC * 5));
    }

    #[test]
    fn fires_once_per_period() {
        let t0 = Instant::now();
        let mut t = TickTimer::new(SEC);
        t.start(t0);
        assert!(!t.poll(t0 + Duration::from_millis(999)));
        assert!(t.poll(t0 + SEC));
        assert!(!t.poll(t0 + Duration::from_millis(1500)));
        assert!(t.poll(t0 + Duration::from_millis(2010)));
    }

    #[test]
    fn late_frame_does_not_burst() {
        let t0 = Instant::now();
        let mut t = TickTimer::new(SEC);
        t.start(t0);
        assert!(t.poll(t0 + SEC * 5));
        assert!(!t.poll(t0 + SEC * 5 + Duration::from_millis(10)));
    }

    #[test]
    fn stop_cancels() {
        let t0 = Instant::now();
        let mut t = TickTimer::new(SEC);
        t.start(t0);
        t.stop();
        assert!(!t.poll(t0 + SEC * 2));
        t.start(t0 + SEC * 2);
        assert!(t.poll(t0 + SEC * 3));
    }
}
