use fieldnav_mission::{Mission, MissionAction, MissionError, MissionEvent, MissionState};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A mission event stamped with the time it happened.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub t_ms: u64,
    pub event: MissionEvent,
}

/// What the mission did in response to one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub t_ms: u64,
    pub state: MissionState,
    pub actions: Vec<MissionAction>,
    /// Controller lines for the command actions, in order.
    pub commands: Vec<String>,
}

/// Feed `events` through `mission` in time order (stable for equal stamps).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(mission, events), fields(n = events.len()))
)]
pub fn replay(mission: &mut Mission, events: &[TimedEvent]) -> Result<Vec<ReplayStep>, MissionError> {
    let mut ordered = events.to_vec();
    ordered.sort_by_key(|e| e.t_ms);

    let mut steps = Vec::with_capacity(ordered.len());
    for TimedEvent { t_ms, event } in ordered {
        let actions = mission.handle(t_ms, event)?;
        let commands = actions.iter().filter_map(MissionAction::command_line).collect();
        steps.push(ReplayStep {
            t_ms,
            state: mission.state(),
            actions,
            commands,
        });
    }
    log::debug!("replayed {} events, final state {}", steps.len(), mission.state().name());
    Ok(steps)
}
