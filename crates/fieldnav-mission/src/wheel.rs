//! Wheel duty-cycle commands and their serial text form.
//!
//! Wire format: `WHEEL SPEED <MODE> <duty> <MODE> <duty>`, left wheel first,
//! where `<MODE>` is `FORWARD`, `BRAKE` or `REVERSE` and `<duty>` is the
//! magnitude in `0..=255`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MAX_DUTY: i16 = 255;

/// Above this on both wheels the robot counts as moving forward.
pub const MOVING_FORWARD_DUTY: i16 = 30;
/// Above this on both wheels the robot counts as driving straight enough to
/// trust GPS course.
pub const MOVING_STRAIGHT_DUTY: i16 = 100;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WheelParseError {
    #[error("expected `WHEEL SPEED <MODE> <duty> <MODE> <duty>`, got {0:?}")]
    Malformed(String),
    #[error("unknown wheel mode {0:?}")]
    UnknownMode(String),
    #[error("invalid duty cycle {0:?}")]
    InvalidDuty(String),
    #[error("mode {mode} does not match duty {duty}")]
    ModeMismatch { mode: WheelMode, duty: i16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WheelMode {
    Forward,
    Brake,
    Reverse,
}

impl WheelMode {
    fn of(duty: i16) -> Self {
        match duty {
            d if d > 0 => WheelMode::Forward,
            d if d < 0 => WheelMode::Reverse,
            _ => WheelMode::Brake,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WheelMode::Forward => "FORWARD",
            WheelMode::Brake => "BRAKE",
            WheelMode::Reverse => "REVERSE",
        }
    }
}

impl fmt::Display for WheelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WheelMode {
    type Err = WheelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD" => Ok(WheelMode::Forward),
            "BRAKE" => Ok(WheelMode::Brake),
            "REVERSE" => Ok(WheelMode::Reverse),
            other => Err(WheelParseError::UnknownMode(other.to_string())),
        }
    }
}

/// Signed duty cycles for both wheels; negative drives in reverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelSpeed {
    pub left: i16,
    pub right: i16,
}

impl WheelSpeed {
    /// Build a command, clamping both duties into `[-255, 255]`.
    pub fn new(left: i32, right: i32) -> Self {
        let clamp = |d: i32| d.clamp(-(MAX_DUTY as i32), MAX_DUTY as i32) as i16;
        Self {
            left: clamp(left),
            right: clamp(right),
        }
    }

    pub const fn stop() -> Self {
        Self { left: 0, right: 0 }
    }

    pub fn is_moving_forward(&self) -> bool {
        self.left > MOVING_FORWARD_DUTY && self.right > MOVING_FORWARD_DUTY
    }

    pub fn is_moving_straight(&self) -> bool {
        self.left > MOVING_STRAIGHT_DUTY && self.right > MOVING_STRAIGHT_DUTY
    }
}

impl fmt::Display for WheelSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WHEEL SPEED {} {} {} {}",
            WheelMode::of(self.left),
            self.left.unsigned_abs(),
            WheelMode::of(self.right),
            self.right.unsigned_abs()
        )
    }
}

impl FromStr for WheelSpeed {
    type Err = WheelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WheelParseError::Malformed(s.to_string());
        let mut it = s.split_whitespace();
        if it.next() != Some("WHEEL") || it.next() != Some("SPEED") {
            return Err(malformed());
        }
        let mut side = || -> Result<i16, WheelParseError> {
            let mode: WheelMode = it.next().ok_or_else(malformed)?.parse()?;
            let raw = it.next().ok_or_else(malformed)?;
            let duty: i16 = raw
                .parse()
                .ok()
                .filter(|d| (0..=MAX_DUTY).contains(d))
                .ok_or_else(|| WheelParseError::InvalidDuty(raw.to_string()))?;
            match mode {
                WheelMode::Forward => Ok(duty),
                WheelMode::Reverse => Ok(-duty),
                WheelMode::Brake if duty == 0 => Ok(0),
                WheelMode::Brake => Err(WheelParseError::ModeMismatch { mode, duty }),
            }
        };
        let left = side()?;
        let right = side()?;
        if it.next().is_some() {
            return Err(malformed());
        }
        Ok(Self { left, right })
    }
}
