use std::time::{Duration, Instant};

/// Cancelable periodic tick source for playback.
///
/// The host polls it once per frame with the current time. While armed,
/// each poll yields the time elapsed since the previous one; once stopped,
/// polls yield nothing until it is started again.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    last_tick: Option<Instant>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the scheduler. Restarting an armed scheduler is a no-op so a
    /// repeated play does not swallow elapsed time.
    pub fn start(&mut self, now: Instant) {
        if self.last_tick.is_none() {
            self.last_tick = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.last_tick = None;
    }

    pub fn is_armed(&self) -> bool {
        self.last_tick.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        let last = self.last_tick.as_mut()?;
        let elapsed = now.saturating_duration_since(*last);
        *last = now;
        Some(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_yields_elapsed_between_ticks() {
        let t0 = Instant::now();
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.poll(t0), None);

        scheduler.start(t0);
        assert_eq!(
            scheduler.poll(t0 + Duration::from_millis(16)),
            Some(Duration::from_millis(16))
        );
        assert_eq!(
            scheduler.poll(t0 + Duration::from_millis(40)),
            Some(Duration::from_millis(24))
        );
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let t0 = Instant::now();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(t0);
        scheduler.stop();
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_restart_while_armed_keeps_anchor() {
        let t0 = Instant::now();
        let mut scheduler = FrameScheduler::new();
        scheduler.start(t0);
        scheduler.start(t0 + Duration::from_millis(10));
        assert_eq!(
            scheduler.poll(t0 + Duration::from_millis(30)),
            Some(Duration::from_millis(30))
        );
    }
}
