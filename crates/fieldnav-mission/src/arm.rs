//! Timed arm scripts for knocking a ball off its stand.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MissionError;

/// Joint angles in degrees, base first.
pub type JointAngles = [i16; 5];

pub const ARM_HOME: JointAngles = [0, 90, 0, -90, 90];
pub const BALL1_OPEN: JointAngles = [32, 134, -87, -180, 13];
pub const BALL1_FLICK: JointAngles = [55, 134, -87, -180, 13];
pub const BALL2_OPEN: JointAngles = [1, 125, -87, -173, 13];
pub const BALL2_PRELAUNCH: JointAngles = [1, 94, -97, -173, 13];
pub const BALL3_OPEN: JointAngles = [-33, 130, -97, -180, 13];
pub const BALL3_FLICK: JointAngles = [-68, 130, -87, -180, 13];

/// Servo attach mask sent before every script.
pub const ATTACH_ALL: &str = "111111";

/// Time a removal script takes from first command to finished.
pub const ARM_REMOVAL_TIME_MS: u64 = 5000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArmCommand {
    Attach(String),
    Position(JointAngles),
}

impl fmt::Display for ArmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmCommand::Attach(mask) => write!(f, "ATTACH {mask}"),
            ArmCommand::Position(j) => {
                write!(f, "POSITION {} {} {} {} {}", j[0], j[1], j[2], j[3], j[4])
            }
        }
    }
}

/// Ball stand position, 1 to 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BallLocation(u8);

impl BallLocation {
    pub const ALL: [BallLocation; 3] = [BallLocation(1), BallLocation(2), BallLocation(3)];

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot for per-location arrays.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for BallLocation {
    type Error = MissionError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        if (1..=3).contains(&v) {
            Ok(BallLocation(v))
        } else {
            Err(MissionError::InvalidLocation(v))
        }
    }
}

impl From<BallLocation> for u8 {
    fn from(l: BallLocation) -> u8 {
        l.0
    }
}

impl fmt::Display for BallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command to send `offset_ms` after the script starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedCommand {
    pub offset_ms: u64,
    pub command: ArmCommand,
}

impl TimedCommand {
    fn at(offset_ms: u64, command: ArmCommand) -> Self {
        Self { offset_ms, command }
    }
}

/// Command sequence that removes the ball at `location`, ordered by offset.
///
/// Every script attaches the servos and parks the arm at home first, then
/// swings to the stand and back. Stand 2 sits in the middle and needs a
/// launch-style motion instead of a sideways flick.
pub fn removal_script(location: BallLocation) -> Vec<TimedCommand> {
    use ArmCommand::Position;

    let mut script = vec![
        TimedCommand::at(0, ArmCommand::Attach(ATTACH_ALL.to_string())),
        TimedCommand::at(0, Position(ARM_HOME)),
    ];
    let tail: &[(u64, JointAngles)] = match location.get() {
        1 => &[(1000, BALL1_OPEN), (2500, BALL1_FLICK), (3000, ARM_HOME)],
        2 => &[
            (1000, BALL2_OPEN),
            (2500, BALL2_PRELAUNCH),
            (3500, BALL2_OPEN),
            (4500, ARM_HOME),
        ],
        _ => &[(1000, BALL3_OPEN), (2500, BALL3_FLICK), (3000, ARM_HOME)],
    };
    script.extend(tail.iter().map(|&(t, j)| TimedCommand::at(t, Position(j))));
    script
}
