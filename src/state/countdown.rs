//! Countdown state machine
//!
//! Everything the appliance shows is a function of a [`Countdown`] value and
//! the event applied to it. Transitions are pure: they hand back the next
//! state together with the render effects the caller must apply, so the
//! machine can be exercised without any hardware attached.

use std::fmt;

use serde::Serialize;

/// Countdown phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Ticking down once per second
    Running,
    /// Reached zero; frozen until the next touch reset
    Expired,
}

/// Time left on the counter, `seconds` always within `0..=59`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub minutes: u32,
    pub seconds: u8,
}

impl Remaining {
    pub const ZERO: Self = Self { minutes: 0, seconds: 0 };

    /// Whole minutes with zero seconds
    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes, seconds: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// Text for the minutes label, zero-padded to two digits
    pub fn minutes_label(&self) -> String {
        format!("{:02}", self.minutes)
    }

    /// Text for the seconds label, zero-padded to two digits
    pub fn seconds_label(&self) -> String {
        format!("{:02}", self.seconds)
    }

    /// One second less, borrowing a minute when the seconds are exhausted.
    ///
    /// Must not be called on [`Remaining::ZERO`].
    fn decrement(self) -> Self {
        if self.seconds == 0 {
            Self {
                minutes: self.minutes - 1,
                seconds: 59,
            }
        } else {
            Self {
                minutes: self.minutes,
                seconds: self.seconds - 1,
            }
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.minutes_label(), self.seconds_label())
    }
}

/// Full-screen background fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Black,
    Red,
}

/// Semantic status light colors; the palette maps them to RGB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Off,
    /// Freshly reset, waiting for the first tick
    Idle,
    /// A tick is being processed
    Ticking,
    /// A tick finished and the countdown is still running
    Settled,
    Expired,
}

/// Output requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Background(Background),
    Labels(Remaining),
    Indicator(Indicator),
}

/// The countdown itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: Remaining,
    phase: Phase,
}

impl Countdown {
    /// A running countdown starting at `minutes:00`
    pub fn new(minutes: u32) -> Self {
        Self {
            remaining: Remaining::from_minutes(minutes),
            phase: Phase::Running,
        }
    }

    pub fn remaining(&self) -> Remaining {
        self.remaining
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Advance by one second.
    ///
    /// Expired countdowns are left untouched and produce no effects. A
    /// countdown already at `00:00` expires instead of decrementing; one
    /// that reaches `00:00` through this tick expires in the same tick.
    #[must_use]
    pub fn tick(self) -> (Self, Vec<Effect>) {
        if self.phase == Phase::Expired {
            return (self, Vec::new());
        }

        let mut effects = vec![Effect::Indicator(Indicator::Ticking)];

        if self.remaining.is_zero() {
            effects.extend(expiry_effects());
            effects.push(Effect::Labels(Remaining::ZERO));
            return (self.expired(), effects);
        }

        let remaining = self.remaining.decrement();
        effects.push(Effect::Labels(remaining));

        let next = Self {
            remaining,
            phase: Phase::Running,
        };
        if remaining.is_zero() {
            effects.extend(expiry_effects());
            (next.expired(), effects)
        } else {
            effects.push(Effect::Indicator(Indicator::Settled));
            (next, effects)
        }
    }

    /// Restart from `minutes:00`, whatever the current phase.
    #[must_use]
    pub fn reset(self, minutes: u32) -> (Self, Vec<Effect>) {
        let effects = vec![
            Effect::Background(Background::Black),
            Effect::Indicator(Indicator::Off),
            Effect::Indicator(Indicator::Idle),
        ];
        (Self::new(minutes), effects)
    }

    fn expired(self) -> Self {
        Self {
            remaining: Remaining::ZERO,
            phase: Phase::Expired,
        }
    }
}

fn expiry_effects() -> [Effect; 2] {
    [
        Effect::Background(Background::Red),
        Effect::Indicator(Indicator::Expired),
    ]
}
