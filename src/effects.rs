//! Transient visual feedback. Lives entirely on the presentation side:
//! effects are spawned from activation feedback and expire on their own
//! timers without ever touching the session.

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

use crate::scoring::BonusTier;
use crate::session::Feedback;

pub const POPUP_DURATION: Duration = Duration::from_millis(1000);
pub const PERFECT_FLASH_DURATION: Duration = Duration::from_millis(300);
pub const PRECISION_FLASH_DURATION: Duration = Duration::from_millis(200);
pub const PRESS_PULSE_DURATION: Duration = Duration::from_millis(150);
/// Rows a popup climbs over its lifetime.
pub const POPUP_RISE_ROWS: f64 = 3.0;

const SPARKLE_SYMBOLS: [char; 5] = ['*', '+', '✦', '✧', '·'];
const SPARKLE_COUNT: usize = 18;

/// Floating "+points" label spawned where the player activated.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsPopup {
    pub value: u32,
    pub x: u16,
    pub y: u16,
    pub tier: BonusTier,
    pub spawned: Instant,
}

impl PointsPopup {
    /// Lifetime progress in [0, 1].
    pub fn progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.spawned).as_secs_f64();
        (elapsed / POPUP_DURATION.as_secs_f64()).min(1.0)
    }

    /// Current row, drifting upwards from the spawn point.
    pub fn row(&self, now: Instant) -> u16 {
        let rise = (self.progress(now) * POPUP_RISE_ROWS).round() as u16;
        self.y.saturating_sub(rise)
    }

    pub fn label(&self) -> String {
        format!("+{}", self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Precision,
    Perfect,
}

/// Particle thrown out on a perfect hit
#[derive(Debug, Clone)]
pub struct Sparkle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl Sparkle {
    fn new(x: f64, y: f64, rng: &mut impl Rng) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-6.0..6.0),
            vel_y: rng.gen_range(-5.0..-1.0),
            symbol: *SPARKLE_SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(0.5..1.0),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 12.0 * dt;
        self.age += dt;
        self.age < self.max_age
    }

    /// Remaining life in [0, 1], used for fading.
    pub fn alpha(&self) -> f64 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
pub struct Effects {
    pub popups: Vec<PointsPopup>,
    pub sparkles: Vec<Sparkle>,
    flash: Option<(FlashKind, Instant)>,
    pressed_until: Option<Instant>,
    last_update: Option<Instant>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Button press pulse, shown for every accepted activation.
    pub fn on_press(&mut self, now: Instant) {
        self.pressed_until = Some(now + PRESS_PULSE_DURATION);
    }

    pub fn on_feedback(&mut self, feedback: &Feedback, now: Instant) {
        let tier = feedback.tier();
        match tier {
            BonusTier::Perfect => {
                self.flash = Some((FlashKind::Perfect, now + PERFECT_FLASH_DURATION));
                self.burst(feedback.x, feedback.y);
            }
            BonusTier::Precision => {
                self.flash = Some((FlashKind::Precision, now + PRECISION_FLASH_DURATION));
            }
            BonusTier::None => {}
        }

        if feedback.points > 0 {
            self.popups.push(PointsPopup {
                value: feedback.points,
                x: feedback.x,
                y: feedback.y,
                tier,
                spawned: now,
            });
        }
    }

    fn burst(&mut self, x: u16, y: u16) {
        let mut rng = rand::thread_rng();
        for _ in 0..SPARKLE_COUNT {
            self.sparkles.push(Sparkle::new(x as f64, y as f64, &mut rng));
        }
    }

    /// Expire finished effects and advance particles.
    pub fn update(&mut self, now: Instant) {
        let dt = self
            .last_update
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_update = Some(now);

        self.popups
            .retain(|p| now.saturating_duration_since(p.spawned) < POPUP_DURATION);
        if matches!(self.flash, Some((_, until)) if now >= until) {
            self.flash = None;
        }
        if matches!(self.pressed_until, Some(until) if now >= until) {
            self.pressed_until = None;
        }
        self.sparkles.retain_mut(|s| s.update(dt));
    }

    pub fn flash(&self, now: Instant) -> Option<FlashKind> {
        match self.flash {
            Some((kind, until)) if now < until => Some(kind),
            _ => None,
        }
    }

    pub fn is_pressed(&self, now: Instant) -> bool {
        matches!(self.pressed_until, Some(until) if now < until)
    }

    /// Whether anything still needs redrawing.
    pub fn is_active(&self, now: Instant) -> bool {
        !self.popups.is_empty()
            || !self.sparkles.is_empty()
            || self.flash(now).is_some()
            || self.is_pressed(now)
    }

    pub fn clear(&mut self) {
        self.popups.clear();
        self.sparkles.clear();
        self.flash = None;
        self.pressed_until = None;
    }
}
