//! Procedural platform stream.
//!
//! Platforms live in a `VecDeque` ordered by world x: new geometry is pushed
//! at the back ahead of the camera, stale geometry is popped from the front
//! once it has scrolled well past the left edge. Each `maintain` call appends
//! at most one platform and evicts at most one, so the window slides by a
//! bounded amount per tick.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collision::Platform;
use crate::config::GameConfig;

/// What one `maintain` call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Churn {
    pub appended: bool,
    pub evicted: bool,
}

pub struct PlatformField {
    platforms: VecDeque<Platform>,
    rng: StdRng,
}

impl PlatformField {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            platforms: initial_layout(config),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Start from an explicit layout. Empty layouts are replaced with the
    /// default one so the stream always has an anchor to extend from.
    pub fn from_platforms(platforms: Vec<Platform>, config: &GameConfig, seed: u64) -> Self {
        let mut field = Self::new(config, seed);
        if !platforms.is_empty() {
            field.platforms = platforms.into();
        }
        field
    }

    /// Put the opening layout back. The RNG keeps running so the next run
    /// generates fresh geometry.
    pub fn reset(&mut self, config: &GameConfig) {
        self.platforms = initial_layout(config);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn as_deque(&self) -> &VecDeque<Platform> {
        &self.platforms
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    #[allow(dead_code)]
    pub fn first(&self) -> Option<&Platform> {
        self.platforms.front()
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<&Platform> {
        self.platforms.back()
    }

    /// Extend ahead of `camera_offset` and retire what fell behind it.
    pub fn maintain(&mut self, camera_offset: f32, config: &GameConfig) -> Churn {
        let mut churn = Churn::default();
        let Some(last) = self.platforms.back().copied() else {
            return churn;
        };
        if last.x >= camera_offset + config.lookahead {
            return churn;
        }

        let next = Platform::new(
            last.x + config.platform_gap.sample(&mut self.rng),
            config.floor_y() - config.platform_rise.sample(&mut self.rng),
            config.platform_width.sample(&mut self.rng),
            config.platform_height,
        );
        self.platforms.push_back(next);
        churn.appended = true;
        log::trace!(
            "Platform appended at x={:.1} y={:.1} w={:.1}",
            next.x,
            next.y,
            next.width
        );

        // The append above runs first, so popping the front can never
        // leave the stream empty.
        if let Some(first) = self.platforms.front() {
            if first.right() < camera_offset - config.eviction_margin {
                self.platforms.pop_front();
                churn.evicted = true;
            }
        }
        churn
    }
}

/// Ground slab spanning the first screen, plus two stepping stones.
pub fn initial_layout(config: &GameConfig) -> VecDeque<Platform> {
    let floor_y = config.floor_y();
    VecDeque::from(vec![
        Platform::new(0.0, floor_y, config.viewport_width, config.ground_height),
        Platform::new(400.0, floor_y - 100.0, 120.0, config.platform_height),
        Platform::new(700.0, floor_y - 150.0, 100.0, config.platform_height),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_layout_starts_with_ground() {
        let config = GameConfig::default();
        let field = PlatformField::new(&config, 1);
        assert_eq!(field.len(), 3);
        let ground = field.first().expect("ground platform");
        assert_eq!(*ground, Platform::new(0.0, 550.0, 800.0, 50.0));
        assert_eq!(*field.last().expect("last"), Platform::new(700.0, 400.0, 100.0, 20.0));
    }

    #[test]
    fn appends_when_last_platform_is_within_lookahead() {
        let config = GameConfig::default();
        let mut field = PlatformField::new(&config, 1);
        let churn = field.maintain(0.0, &config);
        assert!(churn.appended);
        assert!(!churn.evicted);
        assert_eq!(field.len(), 4);
    }

    #[test]
    fn no_append_when_coverage_is_far_enough() {
        let config = GameConfig::default();
        let layout = vec![
            Platform::new(0.0, 550.0, 800.0, 50.0),
            Platform::new(1200.0, 450.0, 100.0, 20.0),
        ];
        let mut field = PlatformField::from_platforms(layout, &config, 1);
        let churn = field.maintain(100.0, &config);
        assert_eq!(churn, Churn::default());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn generated_geometry_respects_ranges() {
        let config = GameConfig::default();
        let mut field = PlatformField::new(&config, 42);
        let mut camera = 0.0;
        for _ in 0..5000 {
            let before = *field.last().expect("non-empty");
            let churn = field.maintain(camera, &config);
            if churn.appended {
                let plat = *field.last().expect("non-empty");
                assert!(config.platform_gap.contains(plat.x - before.x));
                assert!(config.platform_rise.contains(config.floor_y() - plat.y));
                assert!(config.platform_width.contains(plat.width));
                assert!((plat.height - 20.0).abs() < f32::EPSILON);
            }
            camera += config.scroll_speed;
        }
    }

    #[test]
    fn evicts_only_far_behind_camera() {
        let config = GameConfig::default();
        let layout = vec![
            Platform::new(0.0, 550.0, 100.0, 50.0),
            Platform::new(250.0, 450.0, 100.0, 20.0),
        ];
        let mut field = PlatformField::from_platforms(layout.clone(), &config, 3);
        // Right edge 100 is not behind 299 - 200 = 99.
        let churn = field.maintain(299.0, &config);
        assert!(churn.appended);
        assert!(!churn.evicted);

        let mut field = PlatformField::from_platforms(layout, &config, 3);
        let churn = field.maintain(301.0, &config);
        assert!(churn.appended);
        assert!(churn.evicted);
        assert!((field.first().expect("first").x - 250.0).abs() < f32::EPSILON);
    }

    #[test]
    fn at_most_one_append_and_one_eviction_per_call() {
        let config = GameConfig::default();
        // Everything is far behind a camera that jumped ahead.
        let layout = vec![
            Platform::new(0.0, 550.0, 50.0, 50.0),
            Platform::new(100.0, 450.0, 50.0, 20.0),
            Platform::new(200.0, 450.0, 50.0, 20.0),
        ];
        let mut field = PlatformField::from_platforms(layout, &config, 9);
        let before = field.len();
        let churn = field.maintain(10_000.0, &config);
        assert!(churn.appended && churn.evicted);
        assert_eq!(field.len(), before);
    }

    #[test]
    fn sole_platform_is_never_evicted() {
        let config = GameConfig::default();
        let mut field = PlatformField::from_platforms(
            vec![Platform::new(0.0, 550.0, 50.0, 50.0)],
            &config,
            5,
        );
        for step in 0..100 {
            field.maintain(10_000.0 + step as f32 * 2.0, &config);
            assert!(!field.is_empty());
        }
    }

    #[test]
    fn steady_scrolling_keeps_window_bounded() {
        let config = GameConfig::default();
        let mut field = PlatformField::new(&config, 11);
        let mut camera = 0.0;
        for _ in 0..20_000 {
            let before = field.len() as i64;
            field.maintain(camera, &config);
            let after = field.len() as i64;
            assert!((after - before).abs() <= 1);
            camera += config.scroll_speed;
        }
        // Coverage reaches past the lookahead and the window stays small.
        let last = field.last().expect("non-empty");
        assert!(last.x >= camera - config.scroll_speed + config.lookahead - config.platform_gap.max);
        assert!(field.len() < 64, "window grew to {}", field.len());
    }

    #[test]
    fn same_seed_generates_same_layout() {
        let config = GameConfig::default();
        let mut a = PlatformField::new(&config, 77);
        let mut b = PlatformField::new(&config, 77);
        for tick in 0..2000 {
            let camera = tick as f32 * 2.0;
            a.maintain(camera, &config);
            b.maintain(camera, &config);
        }
        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn reset_restores_opening_layout() {
        let config = GameConfig::default();
        let mut field = PlatformField::new(&config, 2);
        for tick in 0..3000 {
            field.maintain(tick as f32 * 2.0, &config);
        }
        field.reset(&config);
        assert!(field.iter().eq(initial_layout(&config).iter()));
    }
}
