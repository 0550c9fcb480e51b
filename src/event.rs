use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};

use mathmatch::engine::timer::TimerHandle;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let sent = match event::read() {
                        Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
                        Ok(Event::Resize(_, _)) => tx.send(AppEvent::Resize),
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

/// Turns wall-clock time into whole-second ticks for one timer handle.
///
/// The event loop polls faster than once a second, so each poll asks how many
/// seconds have elapsed since the last delivery.
#[derive(Clone, Copy, Debug)]
pub struct SecondTicker {
    handle: TimerHandle,
    started: Instant,
    delivered: u32,
}

impl SecondTicker {
    pub fn new(handle: TimerHandle, started: Instant) -> Self {
        Self {
            handle,
            started,
            delivered: 0,
        }
    }

    pub fn handle(&self) -> TimerHandle {
        self.handle
    }

    /// Number of ticks newly due at `now`. Marks them delivered.
    pub fn due(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.started).as_secs();
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        let due = elapsed.saturating_sub(self.delivered);
        self.delivered = elapsed.max(self.delivered);
        due
    }
}
