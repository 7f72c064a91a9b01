//! Deadlines for the periodic parts of the appliance loop
//!
//! Ticks are scheduled against an absolute deadline: if the loop stalls
//! (a slow channel service, for example), every whole period that passed is
//! reported so the countdown catches up instead of drifting.

use std::time::Duration;

use tokio::time::Instant;

/// Countdown tick period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Default channel service period
pub const SERVICE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Scheduler {
    tick_period: Duration,
    service_period: Duration,
    next_tick: Instant,
    next_service: Instant,
}

impl Scheduler {
    /// First tick one period after `start`; first service right away
    pub fn new(start: Instant, tick_period: Duration, service_period: Duration) -> Self {
        Self {
            tick_period,
            service_period,
            next_tick: start + tick_period,
            next_service: start,
        }
    }

    /// Number of ticks that became due by `now`, consuming them
    pub fn ticks_due(&mut self, now: Instant) -> u32 {
        if now < self.next_tick {
            return 0;
        }

        let behind = now.duration_since(self.next_tick).as_nanos();
        let missed = behind / self.tick_period.as_nanos().max(1);
        let due = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        self.next_tick += self.tick_period * due;
        due
    }

    /// Whether a service pass is due; the next one is measured from `now`
    pub fn service_due(&mut self, now: Instant) -> bool {
        if now < self.next_service {
            return false;
        }
        self.next_service = now + self.service_period;
        true
    }

    /// Restart the tick cadence from `now`
    pub fn rearm_tick(&mut self, now: Instant) {
        self.next_tick = now + self.tick_period;
    }

    /// Start over as if created at `now`
    pub fn restart(&mut self, now: Instant) {
        *self = Self::new(now, self.tick_period, self.service_period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_ticks_once_per_period() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start, TICK_PERIOD, SERVICE_PERIOD);

        assert_eq!(scheduler.ticks_due(start + Duration::from_millis(999)), 0);
        assert_eq!(scheduler.ticks_due(start + secs(1)), 1);
        assert_eq!(scheduler.ticks_due(start + Duration::from_millis(1500)), 0);
        assert_eq!(scheduler.ticks_due(start + secs(2)), 1);
    }

    #[test]
    fn test_stall_is_caught_up() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start, TICK_PERIOD, SERVICE_PERIOD);

        assert_eq!(scheduler.ticks_due(start + Duration::from_millis(3500)), 3);
        // Sub-second remainder is kept, not dropped
        assert_eq!(scheduler.ticks_due(start + secs(4)), 1);
    }

    #[test]
    fn test_service_due_immediately_then_every_period() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start, TICK_PERIOD, SERVICE_PERIOD);

        assert!(scheduler.service_due(start));
        assert!(!scheduler.service_due(start + secs(9)));
        assert!(scheduler.service_due(start + secs(10)));
        assert!(!scheduler.service_due(start + secs(19)));
    }

    #[test]
    fn test_rearm_pushes_next_tick() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start, TICK_PERIOD, SERVICE_PERIOD);

        scheduler.rearm_tick(start + Duration::from_millis(900));
        assert_eq!(scheduler.ticks_due(start + secs(1)), 0);
        assert_eq!(scheduler.ticks_due(start + Duration::from_millis(1900)), 1);
    }

    #[test]
    fn test_restart_forgets_elapsed_time() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start, TICK_PERIOD, SERVICE_PERIOD);
        assert!(scheduler.service_due(start));

        let armed = start + secs(3);
        scheduler.restart(armed);
        assert_eq!(scheduler.ticks_due(armed), 0);
        assert!(scheduler.service_due(armed));
        assert_eq!(scheduler.ticks_due(armed + secs(1)), 1);
    }
}
