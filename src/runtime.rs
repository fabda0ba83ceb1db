use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};

/// Interval between countdown ticks.
pub const TICK_RATE_MS: u64 = 100;
/// Redraw interval when nothing else happens (keeps effects animating).
pub const FRAME_RATE_MS: u64 = 33;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// Countdown tick, tagged with the cadence generation that produced it.
    Tick(u64),
    /// No event arrived within one frame interval.
    Frame,
}

/// Source of game events (keyboard, mouse, ticks, ...)
pub trait GameEventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Event source backed by a channel. Terminal input and the tick cadence
/// both feed the same channel, so events are consumed in arrival order.
pub struct ChannelEventSource {
    rx: Receiver<GameEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward crossterm input into `tx` from a background thread.
pub fn spawn_terminal_reader(tx: Sender<GameEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => GameEvent::Key(key),
            Ok(CtEvent::Mouse(mouse)) => GameEvent::Mouse(mouse),
            Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "terminal event reader stopped");
                break;
            }
        };

        if tx.send(evt).is_err() {
            break;
        }
    })
}

/// Runner that hands the app one event at a time, or `Frame` when idle
pub struct Runner<E: GameEventSource> {
    event_source: E,
    frame_interval: Duration,
}

impl<E: GameEventSource> Runner<E> {
    pub fn new(event_source: E, frame_interval: Duration) -> Self {
        Self {
            event_source,
            frame_interval,
        }
    }

    /// Returns `None` once every sender is gone.
    pub fn step(&self) -> Option<GameEvent> {
        match self.event_source.recv_timeout(self.frame_interval) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => Some(GameEvent::Frame),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Repeating countdown trigger owned by a session.
///
/// At most one periodic task is live at a time: `start` cancels the
/// previous one before launching a new generation.
pub trait Cadence {
    /// Cancel any running task and start a new one. Returns its generation.
    fn start(&mut self) -> u64;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn generation(&self) -> u64;

    /// Whether a tick tagged `generation` comes from the live task.
    fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.generation() == generation
    }
}

/// Cadence backed by a sleeper thread that posts `GameEvent::Tick`.
#[derive(Debug)]
pub struct ThreadCadence {
    tx: Sender<GameEvent>,
    interval: Duration,
    generation: u64,
    alive: Option<Arc<AtomicBool>>,
}

impl ThreadCadence {
    pub fn new(tx: Sender<GameEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            generation: 0,
            alive: None,
        }
    }
}

impl Cadence for ThreadCadence {
    fn start(&mut self) -> u64 {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let alive = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&alive);
        let tx = self.tx.clone();
        let interval = self.interval;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if !flag.load(Ordering::Acquire) {
                break;
            }
            if tx.send(GameEvent::Tick(generation)).is_err() {
                break;
            }
        });

        self.alive = Some(alive);
        tracing::trace!(generation, "tick cadence started");
        generation
    }

    fn stop(&mut self) {
        if let Some(alive) = self.alive.take() {
            alive.store(false, Ordering::Release);
            tracing::trace!(generation = self.generation, "tick cadence stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.alive.is_some()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for ThreadCadence {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cadence without a timer; ticks are delivered by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualCadence {
    generation: u64,
    running: bool,
    pub starts: usize,
    pub stops: usize,
}

impl ManualCadence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cadence for ManualCadence {
    fn start(&mut self) -> u64 {
        self.stop();
        self.generation += 1;
        self.running = true;
        self.starts += 1;
        self.generation
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
