//! Run lifecycle: the `World` owns every piece of simulation state and
//! advances it one tick at a time.
//!
//! ```text
//!   Running --(player y past viewport bottom)--> GameOver
//!   GameOver --(revive key press edge)--------> Running (world reset)
//! ```
//!
//! While Running each tick steps the player, scrolls the camera, bumps the
//! score and maintains the platform stream. While GameOver ticks are no-ops;
//! only the revive edge delivered through `key_pressed` moves things again.

use skyrun_core::input::{InputState, Key};

use crate::collision::Landing;
use crate::config::GameConfig;
use crate::controller::{ControllerInput, Player};
use crate::platforms::{Churn, PlatformField};

pub const RIGHT_KEYS: &[Key] = &[Key::D, Key::Right];
pub const LEFT_KEYS: &[Key] = &[Key::A, Key::Left];
pub const JUMP_KEYS: &[Key] = &[Key::W, Key::Up];
pub const REVIVE_KEY: Key = Key::Space;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    GameOver,
}

/// Lifecycle transitions the host reacts to (audio, logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    FellOut,
    Revived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub event: Option<SessionEvent>,
    pub landing: Option<Landing>,
    pub churn: Churn,
}

/// Poll the held movement keys. Revive is not part of this snapshot.
pub fn sample_controller_input(input: &InputState) -> ControllerInput {
    ControllerInput {
        right: input.any_held(RIGHT_KEYS),
        left: input.any_held(LEFT_KEYS),
        jump: input.any_held(JUMP_KEYS),
    }
}

pub struct World {
    pub config: GameConfig,
    pub player: Player,
    pub platforms: PlatformField,
    pub camera_offset: f32,
    pub score: u64,
    pub state: SessionState,
}

impl World {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let player = Player::spawn(&config);
        let platforms = PlatformField::new(&config, seed);
        Self {
            config,
            player,
            platforms,
            camera_offset: 0.0,
            score: 0,
            state: SessionState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn display_score(&self) -> u64 {
        self.score / self.config.score_divisor
    }

    /// Advance one tick.
    pub fn tick(&mut self, input: ControllerInput) -> TickReport {
        let mut report = TickReport::default();
        if self.state == SessionState::GameOver {
            return report;
        }

        report.landing = self.player.step(
            input,
            self.camera_offset,
            self.platforms.as_deque(),
            &self.config,
        );

        self.camera_offset += self.config.scroll_speed;
        self.score += 1;

        report.churn = self.platforms.maintain(self.camera_offset, &self.config);
        if report.churn.appended || report.churn.evicted {
            log::debug!(
                "Platform churn at camera {:.0}: appended={} evicted={} live={}",
                self.camera_offset,
                report.churn.appended,
                report.churn.evicted,
                self.platforms.len()
            );
        }

        if self.player.has_fallen_out(self.config.viewport_height) {
            self.state = SessionState::GameOver;
            report.event = Some(SessionEvent::FellOut);
            log::info!(
                "Player fell at camera {:.0}; final score {}",
                self.camera_offset,
                self.display_score()
            );
        }
        report
    }

    /// Handle the press edge of `key`. Only the revive key does anything,
    /// and only after a game over.
    pub fn key_pressed(&mut self, key: Key) -> Option<SessionEvent> {
        if key == REVIVE_KEY && self.state == SessionState::GameOver {
            self.restart();
            return Some(SessionEvent::Revived);
        }
        None
    }

    /// Back to the opening state of a run.
    pub fn restart(&mut self) {
        self.player = Player::spawn(&self.config);
        self.platforms.reset(&self.config);
        self.camera_offset = 0.0;
        self.score = 0;
        self.state = SessionState::Running;
        log::info!("Revived");
    }
}
