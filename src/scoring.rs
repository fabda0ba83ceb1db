//! Scoring for a single activation.
//!
//! Points scale linearly from 0 at 80% of the countdown elapsed to 100 at
//! 100% (five points per percentage point). Two precision bonuses stack on
//! top: +50 from 98% and +100 from 99%. For display the two tiers are
//! exclusive: at 99% and above only the perfect flag is raised, even though
//! both bonuses are paid.
//!
//! All thresholds are evaluated on whole tenths of a second, so the
//! comparisons are exact. Base points round half up.

use crate::countdown::Countdown;
use serde::Serialize;

pub const SCORING_THRESHOLD_PCT: u64 = 80;
pub const POINTS_PER_PCT: u64 = 5;
pub const PRECISION_THRESHOLD_PCT: u64 = 98;
pub const PRECISION_BONUS: u32 = 50;
pub const PERFECT_THRESHOLD_PCT: u64 = 99;
pub const PERFECT_BONUS: u32 = 100;

/// Outcome of scoring one activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttemptScore {
    pub points: u32,
    pub base: u32,
    pub bonus98: u32,
    pub bonus99: u32,
    /// Display flag for the 98% tier; false once the 99% tier is reached.
    pub is_bonus98: bool,
    pub is_bonus99: bool,
    pub percent_elapsed: f64,
}

impl AttemptScore {
    pub fn tier(&self) -> BonusTier {
        BonusTier::from_flags(self.is_bonus98, self.is_bonus99)
    }
}

/// Display tier of a single activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum BonusTier {
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "PRECISION!")]
    Precision,
    #[strum(serialize = "PERFECT!")]
    Perfect,
}

impl BonusTier {
    /// The perfect flag wins when both are raised.
    pub fn from_flags(is_bonus98: bool, is_bonus99: bool) -> Self {
        if is_bonus99 {
            BonusTier::Perfect
        } else if is_bonus98 {
            BonusTier::Precision
        } else {
            BonusTier::None
        }
    }
}

/// Live classification of the countdown, used to colour the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum PrecisionZone {
    /// Less than 80% elapsed, an activation scores nothing.
    Safe,
    /// 80% to just under 98% elapsed.
    Scoring,
    /// 98% elapsed or more, bonus territory.
    Critical,
}

impl PrecisionZone {
    pub fn of(countdown: &Countdown) -> Self {
        let elapsed = countdown.tenths_elapsed() as u64;
        let initial = countdown.initial_tenths() as u64;
        if !reaches(elapsed, initial, SCORING_THRESHOLD_PCT) {
            PrecisionZone::Safe
        } else if !reaches(elapsed, initial, PRECISION_THRESHOLD_PCT) {
            PrecisionZone::Scoring
        } else {
            PrecisionZone::Critical
        }
    }
}

/// Points band of a recorded attempt, used by the history list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, strum_macros::Display,
)]
pub enum PointsTier {
    Plain,
    Good,
    Great,
    Legendary,
}

impl PointsTier {
    pub fn of(points: u32) -> Self {
        match points {
            p if p >= 200 => PointsTier::Legendary,
            p if p >= 150 => PointsTier::Great,
            p if p >= 100 => PointsTier::Good,
            _ => PointsTier::Plain,
        }
    }
}

/// `elapsed / initial >= pct / 100`, without division.
fn reaches(elapsed: u64, initial: u64, pct: u64) -> bool {
    elapsed * 100 >= pct * initial
}

/// Score an activation made with `tenths_left` remaining out of `initial_tenths`.
pub fn score_attempt(tenths_left: u32, initial_tenths: u32) -> AttemptScore {
    let initial = initial_tenths as u64;
    if initial == 0 {
        return AttemptScore {
            points: 0,
            base: 0,
            bonus98: 0,
            bonus99: 0,
            is_bonus98: false,
            is_bonus99: false,
            percent_elapsed: 0.0,
        };
    }

    let elapsed = initial.saturating_sub(tenths_left as u64);
    let percent_elapsed = (elapsed * 100) as f64 / initial as f64;

    let scoring = reaches(elapsed, initial, SCORING_THRESHOLD_PCT);
    let precision = reaches(elapsed, initial, PRECISION_THRESHOLD_PCT);
    let perfect = reaches(elapsed, initial, PERFECT_THRESHOLD_PCT);

    // 5 * (pct - 80) == (500 * elapsed - 400 * initial) / initial
    let base = if scoring {
        let num = POINTS_PER_PCT * (elapsed * 100 - SCORING_THRESHOLD_PCT * initial);
        ((2 * num + initial) / (2 * initial)) as u32
    } else {
        0
    };
    let bonus98 = if precision { PRECISION_BONUS } else { 0 };
    let bonus99 = if perfect { PERFECT_BONUS } else { 0 };

    AttemptScore {
        points: base + bonus98 + bonus99,
        base,
        bonus98,
        bonus99,
        is_bonus98: precision && !perfect,
        is_bonus99: perfect,
        percent_elapsed,
    }
}

pub fn score_countdown(countdown: &Countdown) -> AttemptScore {
    score_attempt(countdown.tenths_left(), countdown.initial_tenths())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_time_elapsed_scores_nothing() {
        let s = score_attempt(100, 100);
        assert_eq!((s.points, s.is_bonus98, s.is_bonus99), (0, false, false));
        assert_eq!(s.percent_elapsed, 0.0);
    }

    #[test]
    fn test_below_eighty_percent_scores_nothing() {
        for left in 21..=100 {
            let s = score_attempt(left, 100);
            assert_eq!(s.points, 0, "time left {left}");
            assert_eq!(s.tier(), BonusTier::None);
        }
    }

    #[test]
    fn test_eighty_percent_boundary() {
        assert_eq!(score_attempt(20, 100).points, 0);
        assert_eq!(score_attempt(19, 100).points, 5);
        assert_eq!(score_attempt(10, 100).points, 50);
    }

    #[test]
    fn test_precision_tier_at_98() {
        let s = score_attempt(2, 100);
        assert!(s.is_bonus98);
        assert!(!s.is_bonus99);
        assert_eq!(s.base, 90);
        assert_eq!(s.points, 140);
        assert_eq!(s.tier(), BonusTier::Precision);
    }

    #[test]
    fn test_perfect_tier_at_99_stacks_both_bonuses() {
        let s = score_attempt(1, 100);
        assert!(s.is_bonus99);
        assert!(!s.is_bonus98);
        assert_eq!((s.base, s.bonus98, s.bonus99), (95, 50, 100));
        assert_eq!(s.points, 245);
        assert_eq!(s.tier(), BonusTier::Perfect);
    }

    #[test]
    fn test_full_elapse_is_max_score() {
        let s = score_attempt(0, 100);
        assert_eq!(s.points, 250);
        assert!(s.is_bonus99);
        assert_eq!(s.percent_elapsed, 100.0);
    }

    #[test]
    fn test_points_never_decrease_as_time_runs_out() {
        let mut last = 0;
        for left in (0..=100).rev() {
            let points = score_attempt(left, 100).points;
            assert!(points >= last);
            last = points;
        }
    }

    #[test]
    fn test_base_rounds_half_up() {
        // initial 4.0s, 3.7s elapsed: pct = 92.5, 5 * 12.5 = 62.5
        let s = score_attempt(3, 40);
        assert_eq!(s.base, 63);
        // initial 6.0s, 5.3s elapsed: pct = 88.33.., 5 * 8.33.. = 41.66..
        assert_eq!(score_attempt(7, 60).base, 42);
    }

    #[test]
    fn test_custom_initial_time_thresholds() {
        // 5 second countdown: 98% is 0.1s left
        let s = score_attempt(1, 50);
        assert!(s.is_bonus98);
        assert!(!s.is_bonus99);
        assert_eq!(s.points, 90 + 50);
    }

    #[test]
    fn test_zero_initial_time_is_harmless() {
        assert_eq!(score_attempt(0, 0).points, 0);
    }

    #[test]
    fn test_precision_zone() {
        let mut countdown = Countdown::new(100);
        assert_eq!(PrecisionZone::of(&countdown), PrecisionZone::Safe);
        for _ in 0..80 {
            countdown.step();
        }
        assert_eq!(PrecisionZone::of(&countdown), PrecisionZone::Scoring);
        for _ in 0..18 {
            countdown.step();
        }
        assert_eq!(PrecisionZone::of(&countdown), PrecisionZone::Critical);
    }

    #[test]
    fn test_points_tier() {
        assert_eq!(PointsTier::of(0), PointsTier::Plain);
        assert_eq!(PointsTier::of(99), PointsTier::Plain);
        assert_eq!(PointsTier::of(100), PointsTier::Good);
        assert_eq!(PointsTier::of(150), PointsTier::Great);
        assert_eq!(PointsTier::of(245), PointsTier::Legendary);
        assert_eq!(PointsTier::Legendary.to_string(), "Legendary");
    }

    #[test]
    fn test_bonus_tier_labels() {
        assert_eq!(BonusTier::Perfect.to_string(), "PERFECT!");
        assert_eq!(BonusTier::Precision.to_string(), "PRECISION!");
        assert_eq!(BonusTier::None.to_string(), "");
    }

    #[test]
    fn test_bonus_tier_from_flags() {
        assert_eq!(BonusTier::from_flags(false, false), BonusTier::None);
        assert_eq!(BonusTier::from_flags(true, false), BonusTier::Precision);
        assert_eq!(BonusTier::from_flags(false, true), BonusTier::Perfect);
        assert_eq!(BonusTier::from_flags(true, true), BonusTier::Perfect);

        // The flags computed by scoring agree with the shared mapping.
        let s = score_attempt(1, 100);
        assert_eq!(s.tier(), BonusTier::from_flags(s.is_bonus98, s.is_bonus99));
    }
}
