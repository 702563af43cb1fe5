use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BallLocation, MissionError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallColor {
    #[default]
    None,
    Blue,
    Red,
    Yellow,
    Green,
    Black,
    White,
}

impl BallColor {
    /// Single-letter code used by the colour sensor board. Black is `K` so it
    /// does not clash with blue.
    pub fn code(self) -> char {
        match self {
            BallColor::None => 'N',
            BallColor::Blue => 'B',
            BallColor::Red => 'R',
            BallColor::Yellow => 'Y',
            BallColor::Green => 'G',
            BallColor::Black => 'K',
            BallColor::White => 'W',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        Some(match c.to_ascii_uppercase() {
            'N' => BallColor::None,
            'B' => BallColor::Blue,
            'R' => BallColor::Red,
            'Y' => BallColor::Yellow,
            'G' => BallColor::Green,
            'K' => BallColor::Black,
            'W' => BallColor::White,
            _ => return None,
        })
    }
}

/// `"<location><colour code>"`, e.g. `"2W"`: stand 2 holds a white ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallReport {
    pub location: BallLocation,
    pub color: BallColor,
}

impl fmt::Display for BallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.location, self.color.code())
    }
}

impl FromStr for BallReport {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || MissionError::BadBallReport(s.to_string());
        let mut chars = s.trim().chars();
        let (Some(l), Some(c), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(bad());
        };
        let digit = l.to_digit(10).ok_or_else(bad)?;
        let location = BallLocation::try_from(digit as u8)?;
        let color = BallColor::from_code(c).ok_or_else(bad)?;
        Ok(Self { location, color })
    }
}
