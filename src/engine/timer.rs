#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Stopped,
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTick {
    /// Counted down; carries the seconds left.
    Running(u32),
    /// This tick took the clock to zero.
    Expired,
    /// Timer was already stopped or expired.
    Idle,
}

/// Per-level countdown. One `tick` per wall-clock second, driven externally.
#[derive(Clone, Debug)]
pub struct LevelTimer {
    remaining: u32,
    state: TimerState,
}

impl LevelTimer {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            state: if seconds == 0 {
                TimerState::Expired
            } else {
                TimerState::Running
            },
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn tick(&mut self) -> TimerTick {
        if self.state != TimerState::Running {
            return TimerTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            TimerTick::Expired
        } else {
            TimerTick::Running(self.remaining)
        }
    }

    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
        }
    }

    /// Seconds left after `ticks` ticks from a fresh start.
    pub fn remaining_after(seconds: u32, ticks: u32) -> u32 {
        seconds.saturating_sub(ticks)
    }
}

/// Identifies one scheduled countdown. Ticks carrying a stale handle are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Issues and cancels timer handles. At most one handle is live at a time.
#[derive(Clone, Debug, Default)]
pub struct TimerSchedule {
    next: u64,
    active: Option<TimerHandle>,
}

impl TimerSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new countdown, invalidating any previous handle.
    pub fn start(&mut self) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.active = Some(handle);
        handle
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<TimerHandle> {
        self.active
    }

    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.active == Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_on_the_sixtieth_tick() {
        let mut timer = LevelTimer::new(60);
        for tick in 1..60 {
            assert_eq!(timer.tick(), TimerTick::Running(60 - tick), "tick {tick}");
        }
        assert_eq!(timer.tick(), TimerTick::Expired);
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.state(), TimerState::Expired);
    }

    #[test]
    fn ticks_after_expiry_are_idle() {
        let mut timer = LevelTimer::new(2);
        timer.tick();
        assert_eq!(timer.tick(), TimerTick::Expired);
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn stopped_timer_holds_its_value() {
        let mut timer = LevelTimer::new(60);
        timer.tick();
        timer.tick();
        timer.stop();
        assert_eq!(timer.tick(), TimerTick::Idle);
        assert_eq!(timer.remaining(), 58);
        assert!(!timer.is_running());
    }

    #[test]
    fn remaining_is_deterministic_in_tick_count() {
        let mut timer = LevelTimer::new(60);
        for _ in 0..27 {
            timer.tick();
        }
        assert_eq!(timer.remaining(), LevelTimer::remaining_after(60, 27));
        assert_eq!(LevelTimer::remaining_after(60, 500), 0);
    }

    #[test]
    fn new_handle_invalidates_previous() {
        let mut schedule = TimerSchedule::new();
        let first = schedule.start();
        let second = schedule.start();
        assert!(!schedule.is_current(first));
        assert!(schedule.is_current(second));

        schedule.cancel();
        assert!(!schedule.is_current(second));
        assert_eq!(schedule.active(), None);
    }
}
