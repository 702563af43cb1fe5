//! Ball-delivery mission state machine.
//!
//! The machine is driven entirely by the caller: wall-clock time comes in with
//! every event and everything the robot should do comes back out as
//! [`MissionAction`]s. Delayed work (arm script steps, "script finished"
//! transitions) is queued internally and released by later ticks.

use fieldnav_core::{distance, ensure_finite_point, Point2D, Pose2D};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::arm::{removal_script, ArmCommand, BallLocation, ARM_REMOVAL_TIME_MS};
use crate::seek::{seek_wheel_speed, SeekParams};
use crate::{BallColor, BallReport, MissionError, WheelSpeed};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionState {
    ReadyForMission,
    NearBallScript,
    DriveTowardsFarBall,
    FarBallScript,
    DriveTowardHome,
    WaitingForPickup,
    SeekingHome,
}

impl MissionState {
    pub const ALL: [MissionState; 7] = [
        MissionState::ReadyForMission,
        MissionState::NearBallScript,
        MissionState::DriveTowardsFarBall,
        MissionState::FarBallScript,
        MissionState::DriveTowardHome,
        MissionState::WaitingForPickup,
        MissionState::SeekingHome,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MissionState::ReadyForMission => "READY_FOR_MISSION",
            MissionState::NearBallScript => "NEAR_BALL_SCRIPT",
            MissionState::DriveTowardsFarBall => "DRIVE_TOWARDS_FAR_BALL",
            MissionState::FarBallScript => "FAR_BALL_SCRIPT",
            MissionState::DriveTowardHome => "DRIVE_TOWARD_HOME",
            MissionState::WaitingForPickup => "WAITING_FOR_PICKUP",
            MissionState::SeekingHome => "SEEKING_HOME",
        }
    }

    /// Name as it should be read out loud, e.g. `"near ball script"`.
    pub fn spoken(self) -> String {
        self.name().replace('_', " ").to_lowercase()
    }

    pub fn is_active(self) -> bool {
        self != MissionState::ReadyForMission
    }
}

/// Internal reasons to change state; the rows of [`TRANSITIONS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Go,
    Stop,
    MatchOver,
    NearScriptDone,
    ArrivedAtFarBall,
    FarScriptDone,
    ArrivedHome,
    PickupTimeout,
}

use MissionState as S;
use Trigger as T;

/// `(from, trigger, to)`. Pairs not listed leave the state unchanged.
pub const TRANSITIONS: &[(MissionState, Trigger, MissionState)] = &[
    (S::ReadyForMission, T::Go, S::NearBallScript),
    (S::NearBallScript, T::NearScriptDone, S::DriveTowardsFarBall),
    (S::DriveTowardsFarBall, T::ArrivedAtFarBall, S::FarBallScript),
    (S::FarBallScript, T::FarScriptDone, S::DriveTowardHome),
    (S::DriveTowardHome, T::ArrivedHome, S::WaitingForPickup),
    (S::WaitingForPickup, T::PickupTimeout, S::SeekingHome),
    (S::SeekingHome, T::ArrivedHome, S::WaitingForPickup),
    (S::NearBallScript, T::Stop, S::ReadyForMission),
    (S::DriveTowardsFarBall, T::Stop, S::ReadyForMission),
    (S::FarBallScript, T::Stop, S::ReadyForMission),
    (S::DriveTowardHome, T::Stop, S::ReadyForMission),
    (S::WaitingForPickup, T::Stop, S::ReadyForMission),
    (S::SeekingHome, T::Stop, S::ReadyForMission),
    (S::NearBallScript, T::MatchOver, S::ReadyForMission),
    (S::DriveTowardsFarBall, T::MatchOver, S::ReadyForMission),
    (S::FarBallScript, T::MatchOver, S::ReadyForMission),
    (S::DriveTowardHome, T::MatchOver, S::ReadyForMission),
    (S::WaitingForPickup, T::MatchOver, S::ReadyForMission),
    (S::SeekingHome, T::MatchOver, S::ReadyForMission),
];

pub fn next_state(from: MissionState, trigger: Trigger) -> Option<MissionState> {
    TRANSITIONS
        .iter()
        .find(|(f, t, _)| *f == from && *t == trigger)
        .map(|&(_, _, to)| to)
}

/// Whether a direct jump is allowed. Everything is, except leaving
/// `ReadyForMission` for anything but `NearBallScript`.
pub fn transition_is_legal(from: MissionState, to: MissionState) -> bool {
    from != MissionState::ReadyForMission || to == MissionState::NearBallScript
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MissionEvent {
    /// Start button.
    Go,
    /// Stop button.
    Stop,
    /// Periodic control-loop tick with the current best pose estimate.
    Tick { pose: Pose2D },
    /// New GPS position in field feet.
    Fix { x_ft: f64, y_ft: f64 },
    /// Colour sensor reading for one stand.
    BallReport(BallReport),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MissionAction {
    Wheel(WheelSpeed),
    Arm(ArmCommand),
    Announce(String),
    StateChanged {
        from: MissionState,
        to: MissionState,
    },
}

impl MissionAction {
    /// Text line for the motor/arm controller, for actions that are commands.
    pub fn command_line(&self) -> Option<String> {
        match self {
            MissionAction::Wheel(w) => Some(w.to_string()),
            MissionAction::Arm(a) => Some(a.to_string()),
            MissionAction::Announce(_) | MissionAction::StateChanged { .. } => None,
        }
    }
}

/// Mission geometry and timing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub near_ball_x_ft: f64,
    pub near_ball_y_ft: f64,
    pub far_ball_x_ft: f64,
    pub far_ball_y_ft: f64,
    pub near_ball_location: BallLocation,
    pub far_ball_location: BallLocation,
    /// A target this close counts as reached.
    pub accepted_distance_ft: f64,
    pub match_length_ms: u64,
    pub pickup_wait_ms: u64,
    /// Open-loop drive time from the start line to the near ball.
    pub near_ball_drive_ms: u64,
    pub arm_removal_ms: u64,
    pub seek: SeekParams,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            near_ball_x_ft: 90.0,
            near_ball_y_ft: -50.0,
            far_ball_x_ft: 240.0,
            far_ball_y_ft: 50.0,
            near_ball_location: BallLocation::ALL[0],
            far_ball_location: BallLocation::ALL[2],
            accepted_distance_ft: 10.0,
            match_length_ms: 300_000,
            pickup_wait_ms: 8000,
            near_ball_drive_ms: 3000,
            arm_removal_ms: ARM_REMOVAL_TIME_MS,
            seek: SeekParams::default(),
        }
    }
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), MissionError> {
        for (name, v) in [
            ("near_ball_x_ft", self.near_ball_x_ft),
            ("near_ball_y_ft", self.near_ball_y_ft),
            ("far_ball_x_ft", self.far_ball_x_ft),
            ("far_ball_y_ft", self.far_ball_y_ft),
        ] {
            if !v.is_finite() {
                return Err(MissionError::InvalidConfig {
                    name,
                    reason: format!("must be finite (got {v})"),
                });
            }
        }
        if !(self.accepted_distance_ft.is_finite() && self.accepted_distance_ft > 0.0) {
            return Err(MissionError::InvalidConfig {
                name: "accepted_distance_ft",
                reason: format!("must be finite and > 0 (got {})", self.accepted_distance_ft),
            });
        }
        if self.match_length_ms == 0 {
            return Err(MissionError::InvalidConfig {
                name: "match_length_ms",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Targets fixed when the mission starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionPlan {
    pub near_ball: Point2D,
    pub far_ball: Point2D,
    pub near_location: BallLocation,
    pub far_location: BallLocation,
    /// Stand holding the white ball, which is always removed at the far end.
    pub white_location: Option<BallLocation>,
}

impl MissionPlan {
    fn new(config: &MissionConfig, colors: &[BallColor; 3]) -> Self {
        let white_location = BallLocation::ALL
            .into_iter()
            .filter(|l| colors[l.index()] == BallColor::White)
            .last();
        Self {
            near_ball: Point2D::new(config.near_ball_x_ft, config.near_ball_y_ft),
            far_ball: Point2D::new(config.far_ball_x_ft, config.far_ball_y_ft),
            near_location: config.near_ball_location,
            far_location: config.far_ball_location,
            white_location,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Work {
    Arm(ArmCommand),
    ClearLocation(BallLocation),
    RemoveBall(BallLocation),
    RemoveWhiteBall,
    Trigger { only_in: MissionState, trigger: Trigger },
}

#[derive(Clone, Debug)]
struct Pending {
    due_ms: u64,
    seq: u64,
    work: Work,
}

#[derive(Clone, Debug)]
pub struct Mission {
    config: MissionConfig,
    state: MissionState,
    state_started_ms: u64,
    match_started_ms: u64,
    colors: [BallColor; 3],
    plan: MissionPlan,
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Mission {
    pub fn new(config: MissionConfig) -> Result<Self, MissionError> {
        config.validate()?;
        let colors = [BallColor::None; 3];
        Ok(Self {
            plan: MissionPlan::new(&config, &colors),
            config,
            state: MissionState::ReadyForMission,
            state_started_ms: 0,
            match_started_ms: 0,
            colors,
            pending: Vec::new(),
            next_seq: 0,
        })
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn plan(&self) -> &MissionPlan {
        &self.plan
    }

    pub fn colors(&self) -> &[BallColor; 3] {
        &self.colors
    }

    pub fn location_color(&self, location: BallLocation) -> BallColor {
        self.colors[location.index()]
    }

    pub fn set_location_color(&mut self, location: BallLocation, color: BallColor) {
        self.colors[location.index()] = color;
    }

    pub fn state_time_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_started_ms)
    }

    /// Full match length while idle.
    pub fn match_time_remaining_ms(&self, now_ms: u64) -> u64 {
        if !self.state.is_active() {
            return self.config.match_length_ms;
        }
        self.config
            .match_length_ms
            .saturating_sub(now_ms.saturating_sub(self.match_started_ms))
    }

    /// Number of queued delayed actions.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self), fields(state = ?self.state))
    )]
    pub fn handle(
        &mut self,
        now_ms: u64,
        event: MissionEvent,
    ) -> Result<Vec<MissionAction>, MissionError> {
        let mut out = Vec::new();
        match event {
            MissionEvent::Go => self.fire(T::Go, now_ms, &mut out)?,
            MissionEvent::Stop => self.fire(T::Stop, now_ms, &mut out)?,
            MissionEvent::Tick { pose } => self.tick(now_ms, pose, &mut out)?,
            MissionEvent::Fix { x_ft, y_ft } => {
                let p = Point2D::new(x_ft, y_ft);
                ensure_finite_point("fix", p)?;
                self.on_fix(now_ms, p, &mut out)?;
            }
            MissionEvent::BallReport(r) => {
                debug!("stand {} reports {:?}", r.location, r.color);
                self.set_location_color(r.location, r.color);
            }
        }
        Ok(out)
    }

    /// Jump straight to `to`, running its entry actions.
    pub fn set_state(
        &mut self,
        now_ms: u64,
        to: MissionState,
    ) -> Result<Vec<MissionAction>, MissionError> {
        let mut out = Vec::new();
        self.enter(to, now_ms, &mut out)?;
        Ok(out)
    }

    fn fire(
        &mut self,
        trigger: Trigger,
        now_ms: u64,
        out: &mut Vec<MissionAction>,
    ) -> Result<(), MissionError> {
        match next_state(self.state, trigger) {
            Some(to) => self.enter(to, now_ms, out),
            None => {
                debug!("{:?} ignored in {}", trigger, self.state.name());
                Ok(())
            }
        }
    }

    fn enter(
        &mut self,
        to: MissionState,
        now_ms: u64,
        out: &mut Vec<MissionAction>,
    ) -> Result<(), MissionError> {
        let from = self.state;
        if !transition_is_legal(from, to) {
            return Err(MissionError::IllegalTransition { from, to });
        }
        info!("{} -> {} at {} ms", from.name(), to.name(), now_ms);

        self.state = to;
        self.state_started_ms = now_ms;
        out.push(MissionAction::StateChanged { from, to });
        out.push(MissionAction::Announce(to.spoken()));

        match to {
            S::ReadyForMission => {
                self.pending.clear();
                out.push(MissionAction::Wheel(WheelSpeed::stop()));
            }
            S::NearBallScript => {
                self.match_started_ms = now_ms;
                self.plan = MissionPlan::new(&self.config, &self.colors);
                debug!("mission plan: {:?}", self.plan);

                out.push(MissionAction::Wheel(self.config.seek.straight()));
                let arrive = now_ms.saturating_add(self.config.near_ball_drive_ms);
                self.schedule(arrive, Work::RemoveBall(self.plan.near_location));
                self.schedule(
                    arrive.saturating_add(self.config.arm_removal_ms),
                    Work::Trigger {
                        only_in: S::NearBallScript,
                        trigger: T::NearScriptDone,
                    },
                );
            }
            S::FarBallScript => {
                out.push(MissionAction::Wheel(WheelSpeed::stop()));
                self.remove_ball(self.plan.far_location, now_ms, out);
                let done = now_ms.saturating_add(self.config.arm_removal_ms);
                self.schedule(done, Work::RemoveWhiteBall);
                self.schedule(
                    done,
                    Work::Trigger {
                        only_in: S::FarBallScript,
                        trigger: T::FarScriptDone,
                    },
                );
            }
            S::WaitingForPickup => out.push(MissionAction::Wheel(WheelSpeed::stop())),
            S::DriveTowardsFarBall | S::DriveTowardHome | S::SeekingHome => {}
        }
        Ok(())
    }

    fn tick(
        &mut self,
        now_ms: u64,
        pose: Pose2D,
        out: &mut Vec<MissionAction>,
    ) -> Result<(), MissionError> {
        pose.validate()?;

        if self.state.is_active()
            && now_ms.saturating_sub(self.match_started_ms) > self.config.match_length_ms
        {
            self.fire(T::MatchOver, now_ms, out)?;
        }

        self.run_due(now_ms, out)?;

        let home = Point2D::origin();
        match self.state {
            S::DriveTowardsFarBall => out.push(MissionAction::Wheel(seek_wheel_speed(
                &pose,
                self.plan.far_ball,
                &self.config.seek,
            ))),
            S::DriveTowardHome | S::SeekingHome => out.push(MissionAction::Wheel(
                seek_wheel_speed(&pose, home, &self.config.seek),
            )),
            S::WaitingForPickup => {
                if self.state_time_ms(now_ms) > self.config.pickup_wait_ms {
                    self.fire(T::PickupTimeout, now_ms, out)?;
                }
            }
            S::ReadyForMission | S::NearBallScript | S::FarBallScript => {}
        }
        Ok(())
    }

    fn on_fix(
        &mut self,
        now_ms: u64,
        position: Point2D,
        out: &mut Vec<MissionAction>,
    ) -> Result<(), MissionError> {
        let close = |target: Point2D| distance(position, target) < self.config.accepted_distance_ft;
        let trigger = match self.state {
            S::DriveTowardsFarBall if close(self.plan.far_ball) => Some(T::ArrivedAtFarBall),
            S::DriveTowardHome | S::SeekingHome if close(Point2D::origin()) => Some(T::ArrivedHome),
            _ => None,
        };
        match trigger {
            Some(t) => self.fire(t, now_ms, out),
            None => Ok(()),
        }
    }

    fn schedule(&mut self, due_ms: u64, work: Work) {
        self.pending.push(Pending {
            due_ms,
            seq: self.next_seq,
            work,
        });
        self.next_seq += 1;
    }

    /// Start the removal script for `location` at `start_ms`. Zero-offset
    /// steps are emitted right away; the rest are queued.
    fn remove_ball(&mut self, location: BallLocation, start_ms: u64, out: &mut Vec<MissionAction>) {
        debug!("removing ball at stand {location}");
        for step in removal_script(location) {
            if step.offset_ms == 0 {
                out.push(MissionAction::Arm(step.command));
            } else {
                self.schedule(start_ms.saturating_add(step.offset_ms), Work::Arm(step.command));
            }
        }
        self.schedule(
            start_ms.saturating_add(self.config.arm_removal_ms),
            Work::ClearLocation(location),
        );
    }

    /// Run queued work due at or before `now_ms`, oldest first. Work may queue
    /// more work that is itself already due; that runs in the same call.
    fn run_due(&mut self, now_ms: u64, out: &mut Vec<MissionAction>) -> Result<(), MissionError> {
        loop {
            let (mut due, rest): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|p| p.due_ms <= now_ms);
            self.pending = rest;
            if due.is_empty() {
                return Ok(());
            }
            due.sort_by_key(|p| (p.due_ms, p.seq));

            for p in due {
                match p.work {
                    Work::Arm(cmd) => out.push(MissionAction::Arm(cmd)),
                    Work::ClearLocation(l) => self.set_location_color(l, BallColor::None),
                    Work::RemoveBall(l) => self.remove_ball(l, p.due_ms, out),
                    Work::RemoveWhiteBall => {
                        if let Some(l) = self.plan.white_location {
                            self.remove_ball(l, p.due_ms, out);
                        }
                    }
                    Work::Trigger { only_in, trigger } => {
                        if self.state == only_in {
                            self.fire(trigger, now_ms, out)?;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicate_rows() {
        for (i, a) in TRANSITIONS.iter().enumerate() {
            for b in &TRANSITIONS[i + 1..] {
                assert!(!(a.0 == b.0 && a.1 == b.1), "duplicate {:?}/{:?}", a.0, a.1);
            }
        }
    }

    #[test]
    fn table_respects_ready_rule() {
        for &(from, _, to) in TRANSITIONS {
            assert!(transition_is_legal(from, to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn every_active_state_can_stop() {
        for s in MissionState::ALL.into_iter().filter(|s| s.is_active()) {
            assert_eq!(next_state(s, T::Stop), Some(S::ReadyForMission));
            assert_eq!(next_state(s, T::MatchOver), Some(S::ReadyForMission));
        }
        assert_eq!(next_state(S::ReadyForMission, T::Stop), None);
    }

    #[test]
    fn spoken_names() {
        assert_eq!(S::DriveTowardsFarBall.spoken(), "drive towards far ball");
        assert_eq!(S::ReadyForMission.name(), "READY_FOR_MISSION");
    }

    #[test]
    fn illegal_jump_out_of_ready_is_refused() {
        let mut m = Mission::new(MissionConfig::default()).expect("config");
        let err = m.set_state(0, S::DriveTowardHome).unwrap_err();
        assert_eq!(
            err,
            MissionError::IllegalTransition {
                from: S::ReadyForMission,
                to: S::DriveTowardHome
            }
        );
        assert_eq!(m.state(), S::ReadyForMission);
    }

    #[test]
    fn go_when_running_is_ignored() {
        let mut m = Mission::new(MissionConfig::default()).expect("config");
        m.handle(0, MissionEvent::Go).expect("go");
        let out = m.handle(10, MissionEvent::Go).expect("go again");
        assert!(out.is_empty());
        assert_eq!(m.state(), S::NearBallScript);
    }

    #[test]
    fn start_near_the_end_of_the_clock_saturates() {
        let mut m = Mission::new(MissionConfig::default()).expect("config");
        let start = u64::MAX - 10;
        m.handle(start, MissionEvent::Go).expect("go");
        assert_eq!(m.state(), S::NearBallScript);
        assert!(m.pending_len() > 0);

        let pose = Pose2D::new(0.0, 0.0, 0.0);
        m.handle(u64::MAX, MissionEvent::Tick { pose }).expect("tick");
        assert!(m.state().is_active());
        assert_eq!(m.match_time_remaining_ms(u64::MAX), 300_000 - 10);
    }

    #[test]
    fn white_location_comes_from_reports() {
        let mut colors = [BallColor::None; 3];
        colors[1] = BallColor::White;
        let plan = MissionPlan::new(&MissionConfig::default(), &colors);
        assert_eq!(plan.white_location.map(|l| l.get()), Some(2));

        let plan = MissionPlan::new(&MissionConfig::default(), &[BallColor::Red; 3]);
        assert_eq!(plan.white_location, None);
    }

    #[test]
    fn bad_config_is_rejected() {
        let cfg = MissionConfig {
            accepted_distance_ft: -1.0,
            ..MissionConfig::default()
        };
        assert!(matches!(
            Mission::new(cfg),
            Err(MissionError::InvalidConfig {
                name: "accepted_distance_ft",
                ..
            })
        ));
    }
}
