//! World -> draw list.
//!
//! Produces world-space quads in paint order for the sprite renderer; the
//! camera transform maps `camera_offset` to the left edge of the screen.
//! Text (score, game-over banner) is painted by the HUD, not here.

use crate::controller::{Facing, Pose};
use crate::session::World;

pub const SKY: u32 = 0xfce7f3;
pub const PLATFORM_TOP: u32 = 0xffb6c1;
pub const PLATFORM_BOTTOM: u32 = 0xd8b4fe;
pub const PLATFORM_BORDER: u32 = 0xc084fc;
pub const BORDER_WIDTH: f32 = 1.5;
pub const GAME_OVER_DIM: f32 = 0.6;

/// Which texture a quad samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Solid white; the vertex colours carry the fill.
    Blank,
    Idle,
    Running,
}

impl TextureSlot {
    pub fn key(self) -> &'static str {
        match self {
            Self::Blank => "__blank",
            Self::Idle => "player_idle",
            Self::Running => "player_run",
        }
    }
}

/// Which player sprites are uploaded. A pose whose image failed to load is
/// simply not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedSprites {
    pub idle: bool,
    pub running: bool,
}

impl LoadedSprites {
    pub const ALL: Self = Self {
        idle: true,
        running: true,
    };

    pub fn has(self, slot: TextureSlot) -> bool {
        match slot {
            TextureSlot::Blank => true,
            TextureSlot::Idle => self.idle,
            TextureSlot::Running => self.running,
        }
    }
}

/// Axis-aligned quad, top-left anchored, with a vertical colour gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub top_color: [f32; 4],
    pub bottom_color: [f32; 4],
    pub texture: TextureSlot,
    pub flip_x: bool,
}

impl Quad {
    fn solid(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
            top_color: color,
            bottom_color: color,
            texture: TextureSlot::Blank,
            flip_x: false,
        }
    }
}

pub fn build_frame(world: &World, sprites: LoadedSprites) -> Vec<Quad> {
    let config = &world.config;
    let left = world.camera_offset;
    let mut quads = Vec::with_capacity(2 + world.platforms.len() * 5);

    quads.push(Quad::solid(
        left,
        0.0,
        config.viewport_width,
        config.viewport_height,
        srgb_hex(SKY, 1.0),
    ));

    let right = left + config.viewport_width;
    for plat in world.platforms.iter() {
        if plat.right() < left || plat.x > right {
            continue;
        }
        quads.push(Quad {
            top_color: srgb_hex(PLATFORM_TOP, 1.0),
            bottom_color: srgb_hex(PLATFORM_BOTTOM, 1.0),
            ..Quad::solid(plat.x, plat.y, plat.width, plat.height, [0.0; 4])
        });
        push_border(
            &mut quads,
            plat.x,
            plat.y,
            plat.width,
            plat.height,
            srgb_hex(PLATFORM_BORDER, 1.0),
        );
    }

    let player = &world.player;
    let pose = match player.pose {
        Pose::Idle => TextureSlot::Idle,
        Pose::Running => TextureSlot::Running,
    };
    if sprites.has(pose) {
        quads.push(Quad {
            texture: pose,
            flip_x: player.facing == Facing::Left,
            ..Quad::solid(
                player.world_x(world.camera_offset),
                player.y,
                player.width,
                player.height,
                [1.0; 4],
            )
        });
    }

    if !world.is_running() {
        quads.push(Quad::solid(
            left,
            0.0,
            config.viewport_width,
            config.viewport_height,
            [0.0, 0.0, 0.0, GAME_OVER_DIM],
        ));
    }
    quads
}

/// Stroke a rectangle outline centred on its edges.
fn push_border(quads: &mut Vec<Quad>, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
    let half = BORDER_WIDTH * 0.5;
    quads.push(Quad::solid(x - half, y - half, w + BORDER_WIDTH, BORDER_WIDTH, color));
    quads.push(Quad::solid(x - half, y + h - half, w + BORDER_WIDTH, BORDER_WIDTH, color));
    quads.push(Quad::solid(x - half, y + half, BORDER_WIDTH, h - BORDER_WIDTH, color));
    quads.push(Quad::solid(x + w - half, y + half, BORDER_WIDTH, h - BORDER_WIDTH, color));
}

/// `0xRRGGBB` in sRGB to linear RGBA for an sRGB render target.
pub fn srgb_hex(rgb: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| srgb_to_linear(((rgb >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0), alpha]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::controller::ControllerInput;
    use crate::session::SessionState;

    fn world() -> World {
        World::new(GameConfig::default(), 8)
    }

    fn player_quad(quads: &[Quad]) -> Quad {
        *quads
            .iter()
            .find(|q| q.texture != TextureSlot::Blank)
            .expect("player quad")
    }

    #[test]
    fn sky_comes_first_and_covers_viewport() {
        let world = world();
        let quads = build_frame(&world, LoadedSprites::ALL);
        let sky = quads[0];
        assert!((sky.x).abs() < f32::EPSILON);
        assert!((sky.width - 800.0).abs() < f32::EPSILON);
        assert!((sky.height - 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn each_visible_platform_gets_fill_and_four_border_strips() {
        let world = world();
        let quads = build_frame(&world, LoadedSprites::ALL);
        // sky + 3 platforms * (fill + 4 strips) + player
        assert_eq!(quads.len(), 1 + 3 * 5 + 1);
        let fill = quads[1];
        assert_ne!(fill.top_color, fill.bottom_color);
    }

    #[test]
    fn offscreen_platforms_are_skipped() {
        let mut world = world();
        world.camera_offset = 5000.0;
        let quads = build_frame(&world, LoadedSprites::ALL);
        assert_eq!(quads.len(), 2, "only sky and player");
    }

    #[test]
    fn player_quad_tracks_pose_and_facing() {
        let mut world = world();
        let quads = build_frame(&world, LoadedSprites::ALL);
        let player = player_quad(&quads);
        assert_eq!(player.texture, TextureSlot::Idle);
        assert!(!player.flip_x);

        world.tick(ControllerInput {
            left: true,
            ..ControllerInput::default()
        });
        let player = player_quad(&build_frame(&world, LoadedSprites::ALL));
        assert_eq!(player.texture, TextureSlot::Running);
        assert!(player.flip_x);
        assert!((player.x - (world.camera_offset + world.player.x)).abs() < 0.001);
    }

    #[test]
    fn game_over_adds_dim_overlay_last() {
        let mut world = world();
        world.state = SessionState::GameOver;
        let quads = build_frame(&world, LoadedSprites::ALL);
        let dim = quads.last().expect("overlay");
        assert!((dim.top_color[3] - GAME_OVER_DIM).abs() < f32::EPSILON);
        assert_eq!(dim.texture, TextureSlot::Blank);
    }

    #[test]
    fn srgb_hex_converts_endpoints() {
        assert_eq!(srgb_hex(0x000000, 1.0), [0.0, 0.0, 0.0, 1.0]);
        let white = srgb_hex(0xffffff, 0.5);
        for c in &white[..3] {
            assert!((c - 1.0).abs() < 1e-5);
        }
        assert!((white[3] - 0.5).abs() < f32::EPSILON);
        let mid = srgb_hex(0x808080, 1.0)[0];
        assert!(mid > 0.2 && mid < 0.23, "mid grey linear {mid}");
    }

    #[test]
    fn missing_pose_sprite_skips_the_player() {
        let mut world = world();
        let idle_only = LoadedSprites {
            idle: true,
            running: false,
        };
        let quads = build_frame(&world, idle_only);
        assert_eq!(player_quad(&quads).texture, TextureSlot::Idle);

        world.tick(ControllerInput {
            right: true,
            ..ControllerInput::default()
        });
        let quads = build_frame(&world, idle_only);
        assert!(quads.iter().all(|q| q.texture == TextureSlot::Blank));
        // sky + 3 platforms * (fill + 4 strips), nothing stands in for the player
        assert_eq!(quads.len(), 1 + 3 * 5);
    }

    #[test]
    fn no_sprites_loaded_draws_scene_without_player() {
        let world = world();
        let none = LoadedSprites {
            idle: false,
            running: false,
        };
        let quads = build_frame(&world, none);
        assert!(quads.iter().all(|q| q.texture == TextureSlot::Blank));
        assert!(!quads
            .iter()
            .any(|q| q.top_color == [1.0; 4] && (q.width - world.player.width).abs() < 0.001));
    }
}
