use crate::collision::{find_landing, FeetProbe, Landing, Platform};
use crate::config::GameConfig;

/// Held-key snapshot sampled once at the start of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerInput {
    pub right: bool,
    pub left: bool,
    pub jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Idle,
    Running,
}

/// The runner. `x` is relative to the left edge of the viewport while `y`
/// is in world space; the camera only ever scrolls horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    /// Airborne flag; a jump is only accepted while this is false.
    pub jumping: bool,
    pub pose: Pose,
}

impl Player {
    /// Standing on the ground at the configured start column.
    pub fn spawn(config: &GameConfig) -> Self {
        Self {
            x: config.player_start_x,
            y: config.floor_y() - config.player_height,
            dx: 0.0,
            dy: 0.0,
            width: config.player_width,
            height: config.player_height,
            facing: Facing::Right,
            jumping: false,
            pose: Pose::Idle,
        }
    }

    pub fn world_x(&self, camera_offset: f32) -> f32 {
        camera_offset + self.x
    }

    pub fn feet_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_grounded(&self) -> bool {
        !self.jumping
    }

    pub fn has_fallen_out(&self, viewport_height: f32) -> bool {
        self.y > viewport_height
    }

    /// Advance one tick: intent, jump, gravity, landing, then horizontal
    /// move and clamp. Returns the platform landed on, if any.
    pub fn step<'a, I>(
        &mut self,
        input: ControllerInput,
        camera_offset: f32,
        platforms: I,
        config: &GameConfig,
    ) -> Option<Landing>
    where
        I: IntoIterator<Item = &'a Platform>,
    {
        // Right is checked first, so it wins when both directions are held.
        if input.right {
            self.dx = config.run_speed;
            self.facing = Facing::Right;
        } else if input.left {
            self.dx = -config.run_speed;
            self.facing = Facing::Left;
        } else {
            self.dx = 0.0;
        }

        if input.jump && !self.jumping {
            self.dy = config.jump_impulse;
            self.jumping = true;
        }

        // Gravity runs even when standing; the landing pass zeroes it again.
        self.dy += config.gravity;
        self.y += self.dy;

        let landing = find_landing(
            platforms,
            FeetProbe {
                left: self.world_x(camera_offset),
                width: self.width,
                feet_y: self.feet_y(),
                dy: self.dy,
            },
        );
        if let Some(landing) = landing {
            self.y = landing.surface_y - self.height;
            self.dy = 0.0;
        }
        self.jumping = landing.is_none();

        self.pose = if self.dx != 0.0 {
            Pose::Running
        } else {
            Pose::Idle
        };

        self.x = (self.x + self.dx).clamp(0.0, config.max_player_x());
        landing
    }
}
