//! Ball-delivery mission logic, decoupled from any UI or transport.
//!
//! [`Mission`] is a state machine fed with [`MissionEvent`]s (button presses,
//! control-loop ticks, GPS fixes, colour reports) that answers with
//! [`MissionAction`]s (wheel and arm commands, announcements). The caller
//! owns the clock and the serial link; commands implement `Display` in the
//! text protocol the motor and arm controller expects.
//!
//! Steering laws live alongside: [`seek_wheel_speed`] for heading-error
//! seeking and [`arc_wheel_speed`] for following an arc from
//! `fieldnav-arc`.

mod arm;
mod ball;
mod drive;
mod fsm;
mod seek;
mod wheel;

use fieldnav_core::InputError;

pub use arm::{
    removal_script, ArmCommand, BallLocation, JointAngles, TimedCommand, ARM_HOME,
    ARM_REMOVAL_TIME_MS, ATTACH_ALL, BALL1_FLICK, BALL1_OPEN, BALL2_OPEN, BALL2_PRELAUNCH,
    BALL3_FLICK, BALL3_OPEN,
};
pub use ball::{BallColor, BallReport};
pub use drive::{arc_wheel_speed, inner_outer_ratio, ArcDriveParams};
pub use fsm::{
    next_state, transition_is_legal, Mission, MissionAction, MissionConfig, MissionEvent,
    MissionPlan, MissionState, Trigger, TRANSITIONS,
};
pub use seek::{seek_wheel_speed, SeekParams};
pub use wheel::{
    WheelMode, WheelParseError, WheelSpeed, MAX_DUTY, MOVING_FORWARD_DUTY, MOVING_STRAIGHT_DUTY,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MissionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: MissionState,
        to: MissionState,
    },

    #[error("ball location must be 1, 2 or 3 (got {0})")]
    InvalidLocation(u8),

    #[error("malformed ball report {0:?}")]
    BadBallReport(String),

    #[error("invalid mission parameter {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },
}
