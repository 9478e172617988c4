use crate::audio::{route_session_event, Soundtrack};
use crate::config::GameConfig;
use crate::controller::ControllerInput;
use crate::session::{SessionEvent, World, REVIVE_KEY};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted input for headless runs. Together with the seed, a script fully
/// determines the resulting world.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    #[serde(default)]
    pub seed: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub jump: bool,
    /// Press the revive key before this frame's tick.
    #[serde(default)]
    pub revive: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTick {
    pub input: ControllerInput,
    pub revive: bool,
}

impl ReplayScript {
    pub fn expanded_ticks(&self) -> Vec<ReplayTick> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(ReplayTick {
                    input: ControllerInput {
                        right: frame.right,
                        left: frame.left,
                        jump: frame.jump,
                    },
                    // One press edge per frame entry, not per repeated tick.
                    revive: frame.revive && i == 0,
                });
            }
        }
        out
    }

    /// Run the script from a fresh world, routing lifecycle events into
    /// `soundtrack` the way the windowed host does.
    pub fn run(&self, config: GameConfig, soundtrack: &mut dyn Soundtrack) -> ReplayOutcome {
        let mut world = World::new(config, self.seed);
        let mut events = Vec::new();
        soundtrack.play();
        for tick in self.expanded_ticks() {
            if tick.revive {
                if let Some(event) = world.key_pressed(REVIVE_KEY) {
                    route_session_event(soundtrack, event);
                    events.push(event);
                }
            }
            if let Some(event) = world.tick(tick.input).event {
                route_session_event(soundtrack, event);
                events.push(event);
            }
        }
        ReplayOutcome { world, events }
    }
}

pub struct ReplayOutcome {
    pub world: World,
    pub events: Vec<SessionEvent>,
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplayScript) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}
