use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::config::GameConfig;
use crate::effects::Effects;
use crate::runtime::{Cadence, GameEvent, ManualCadence};
use crate::session::{Activation, GameStatus, Session};
use crate::ui;

/// Presentation-side state: the session plus everything that only
/// matters for drawing it.
#[derive(Debug)]
pub struct App<C: Cadence> {
    pub session: Session<C>,
    pub effects: Effects,
    /// Last known drawable area, used to place keyboard activations.
    pub viewport: Rect,
    /// Time the current frame is drawn at.
    pub now: Instant,
    pub should_quit: bool,
}

impl App<ManualCadence> {
    pub fn manual(config: &GameConfig) -> Self {
        Self::new(Session::manual(config))
    }
}

impl<C: Cadence> App<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            session,
            effects: Effects::new(),
            viewport: Rect::new(0, 0, 80, 24),
            now: Instant::now(),
            should_quit: false,
        }
    }

    pub fn handle_event(&mut self, event: GameEvent, now: Instant) {
        self.now = now;
        match event {
            GameEvent::Tick(generation) => {
                self.session.handle_tick(generation);
            }
            GameEvent::Key(key) => self.on_key(key),
            GameEvent::Mouse(mouse) => self.on_mouse(mouse),
            GameEvent::Resize | GameEvent::Frame => {}
        }
        self.effects.update(now);
    }

    /// Whether a redraw is worth doing on an idle frame.
    pub fn needs_redraw(&self) -> bool {
        self.session.status() == GameStatus::Playing || self.effects.is_active(self.now)
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char(' ') | KeyCode::Enter => self.press_button(),
            _ => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let button = ui::button_area(self.viewport, self.session.status());
        if button.contains(Position::new(mouse.column, mouse.row)) {
            match self.session.status() {
                GameStatus::Lost => self.reset(),
                GameStatus::Idle | GameStatus::Playing => {
                    self.activate_at(mouse.column, mouse.row);
                }
            }
        }
    }

    /// Keyboard press on the on-screen button. On the results screen the
    /// button is "retry".
    fn press_button(&mut self) {
        if self.session.status() == GameStatus::Lost {
            self.reset();
            return;
        }
        let button = ui::button_area(self.viewport, self.session.status());
        let x = button.x + button.width / 2;
        let y = button.y + button.height / 2;
        self.activate_at(x, y);
    }

    pub fn activate_at(&mut self, x: u16, y: u16) -> Activation {
        let activation = self.session.activate(x, y, Local::now());
        match &activation {
            Activation::Ignored => {}
            Activation::Started => self.effects.on_press(self.now),
            Activation::Scored(feedback) => {
                self.effects.on_press(self.now);
                self.effects.on_feedback(feedback, self.now);
            }
        }
        activation
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.effects.clear();
    }
}
