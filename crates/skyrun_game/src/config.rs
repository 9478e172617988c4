//! Game constants, overridable from a JSON file.
//!
//! Every field has a default equal to the classic tuning, and the file may
//! name any subset of fields. All velocities and accelerations are per tick.

use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use skyrun_platform::window::PlatformConfig;

/// Half-open sampling range `[min, max)`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..self.max)
    }

    #[allow(dead_code)]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub ground_height: f32,

    pub gravity: f32,
    pub jump_impulse: f32,
    pub run_speed: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_start_x: f32,

    pub scroll_speed: f32,
    /// Generate while the last platform starts closer than this to the camera.
    pub lookahead: f32,
    /// Evict once the first platform's right edge is this far behind the camera.
    pub eviction_margin: f32,
    pub platform_gap: Span,
    pub platform_rise: Span,
    pub platform_width: Span,
    pub platform_height: f32,

    /// Raw ticks per displayed score point.
    pub score_divisor: u64,
    pub tick_rate_hz: f64,
    pub music_volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            ground_height: 50.0,
            gravity: 1.0,
            jump_impulse: -18.0,
            run_speed: 8.0,
            player_width: 50.0,
            player_height: 60.0,
            player_start_x: 100.0,
            scroll_speed: 2.0,
            lookahead: 1000.0,
            eviction_margin: 200.0,
            platform_gap: Span::new(150.0, 350.0),
            platform_rise: Span::new(50.0, 200.0),
            platform_width: Span::new(80.0, 180.0),
            platform_height: 20.0,
            score_divisor: 10,
            tick_rate_hz: 60.0,
            music_volume: 0.5,
        }
    }
}

impl GameConfig {
    /// World y of the ground surface.
    pub fn floor_y(&self) -> f32 {
        self.viewport_height - self.ground_height
    }

    /// Largest legal screen-relative player x.
    pub fn max_player_x(&self) -> f32 {
        self.viewport_width - self.player_width
    }

    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: "Skyrun".to_string(),
            width: self.viewport_width.round() as u32,
            height: self.viewport_height.round() as u32,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the defaults.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!(
            "No config at '{}', using built-in defaults",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    let config = load_config_from_path(path)?;
    log::info!("Loaded config from '{}'", path.display());
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    let positive = [
        ("viewport_width", config.viewport_width),
        ("viewport_height", config.viewport_height),
        ("ground_height", config.ground_height),
        ("player_width", config.player_width),
        ("player_height", config.player_height),
        ("platform_height", config.platform_height),
        ("run_speed", config.run_speed),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(format!(
                "Config validation failed: {name} must be > 0 (got {value})"
            ));
        }
    }
    let finite = [
        ("gravity", config.gravity),
        ("jump_impulse", config.jump_impulse),
        ("player_start_x", config.player_start_x),
        ("scroll_speed", config.scroll_speed),
        ("lookahead", config.lookahead),
        ("eviction_margin", config.eviction_margin),
    ];
    for (name, value) in finite {
        if !value.is_finite() {
            return Err(format!(
                "Config validation failed: {name} must be finite (got {value})"
            ));
        }
    }
    if config.ground_height >= config.viewport_height {
        return Err("Config validation failed: ground_height must be below viewport_height".to_string());
    }
    if config.player_width > config.viewport_width {
        return Err("Config validation failed: player_width exceeds viewport_width".to_string());
    }
    if config.player_start_x < 0.0 || config.player_start_x > config.max_player_x() {
        return Err(format!(
            "Config validation failed: player_start_x {} is outside [0, {}]",
            config.player_start_x,
            config.max_player_x()
        ));
    }
    if config.scroll_speed < 0.0 {
        return Err("Config validation failed: scroll_speed must be >= 0".to_string());
    }
    for (name, span) in [
        ("platform_gap", config.platform_gap),
        ("platform_rise", config.platform_rise),
        ("platform_width", config.platform_width),
    ] {
        if !(span.min.is_finite() && span.max.is_finite() && span.min < span.max) {
            return Err(format!(
                "Config validation failed: {name} span is empty ({}..{})",
                span.min, span.max
            ));
        }
    }
    if config.platform_gap.min <= 0.0 || config.platform_width.min <= 0.0 {
        return Err(
            "Config validation failed: platform_gap and platform_width must be positive"
                .to_string(),
        );
    }
    if config.score_divisor == 0 {
        return Err("Config validation failed: score_divisor must be > 0".to_string());
    }
    if !(config.tick_rate_hz.is_finite() && config.tick_rate_hz > 0.0) {
        return Err("Config validation failed: tick_rate_hz must be > 0".to_string());
    }
    if !(0.0..=1.0).contains(&config.music_volume) {
        return Err("Config validation failed: music_volume must be within [0, 1]".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "skyrun_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_place_floor_fifty_above_bottom() {
        let config = GameConfig::default();
        assert!((config.floor_y() - 550.0).abs() < f32::EPSILON);
        assert!((config.max_player_x() - 750.0).abs() < f32::EPSILON);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file_path("partial");
        fs::write(&path, r#"{ "gravity": 0.8, "platform_gap": { "min": 120.0, "max": 300.0 } }"#)
            .expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert!((config.gravity - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.platform_gap, Span::new(120.0, 300.0));
        assert!((config.jump_impulse + 18.0).abs() < f32::EPSILON);
        assert_eq!(config.score_divisor, 10);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_empty_span() {
        let path = temp_file_path("empty_span");
        fs::write(&path, r#"{ "platform_width": { "min": 180.0, "max": 80.0 } }"#)
            .expect("write temp file");
        let err = load_config_from_path(&path).expect_err("inverted span should fail");
        assert!(err.contains("platform_width span is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_start_outside_viewport() {
        let path = temp_file_path("start_x");
        fs::write(&path, r#"{ "player_start_x": 790.0 }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("start x past the edge should fail");
        assert!(err.contains("player_start_x"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_malformed_json() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ gravity: ").expect("write temp file");
        let err = load_config_from_path(&path).expect_err("bad JSON should fail");
        assert!(err.contains("Failed to parse config JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_file_path("missing");
        let config = load_config_or_default(&path).expect("absent file is not an error");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn span_samples_stay_half_open() {
        let span = Span::new(150.0, 350.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(span.contains(span.sample(&mut rng)));
        }
    }

    #[test]
    fn platform_config_matches_viewport() {
        let window = GameConfig::default().platform_config();
        assert_eq!((window.width, window.height), (800, 600));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/skyrun.json");
        let config = load_config_from_path(&path).expect("shipped config should load");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn rejects_overflowing_lookahead() {
        let path = temp_file_path("inf_lookahead");
        fs::write(&path, r#"{ "lookahead": 1e39 }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("infinite lookahead should fail");
        assert!(err.contains("lookahead must be finite"), "got: {err}");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_non_finite_motion_constants() {
        for field in ["gravity", "jump_impulse", "eviction_margin"] {
            let config = match field {
                "gravity" => GameConfig {
                    gravity: f32::INFINITY,
                    ..GameConfig::default()
                },
                "jump_impulse" => GameConfig {
                    jump_impulse: f32::NEG_INFINITY,
                    ..GameConfig::default()
                },
                _ => GameConfig {
                    eviction_margin: f32::NAN,
                    ..GameConfig::default()
                },
            };
            let err = validate_config(&config).expect_err("non-finite value should fail");
            assert!(err.contains(field), "got: {err}");
        }
    }
}
