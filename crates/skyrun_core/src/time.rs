//! Fixed-step frame clock.
//!
//! Every simulation constant is expressed per tick, so the clock converts
//! wall-clock frame time into a whole number of ticks at `tick_dt`. Display
//! refresh rate only changes how many ticks run per frame, never the speed
//! of the game.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

pub struct FrameClock {
    pub tick_dt: f64,
    pub max_frame_dt: f64,
    accumulator: f64,
    pub tick_count: u64,
    pub frame_count: u64,
    pub ticks_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new(tick_rate_hz: f64) -> Self {
        Self::starting_at(tick_rate_hz, Instant::now())
    }

    pub fn starting_at(tick_rate_hz: f64, start: Instant) -> Self {
        let tick_dt = 1.0 / tick_rate_hz;
        Self {
            tick_dt,
            max_frame_dt: 0.25,
            accumulator: 0.0,
            tick_count: 0,
            frame_count: 0,
            ticks_this_frame: 0,
            real_dt: 0.0,
            last_instant: start,
            fps_samples: [tick_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: tick_rate_hz,
            smoothed_frame_time_ms: tick_dt * 1000.0,
        }
    }

    pub fn begin_frame(&mut self) {
        self.begin_frame_at(Instant::now());
    }

    pub fn begin_frame_at(&mut self, now: Instant) {
        self.real_dt = now
            .checked_duration_since(self.last_instant)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        self.last_instant = now;

        // A long stall (window drag, debugger) would otherwise replay
        // seconds of ticks in one frame.
        if self.real_dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                self.real_dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            self.real_dt = self.max_frame_dt;
        }

        self.accumulator += self.real_dt;
        self.ticks_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    /// Consume one tick from the accumulator if enough time has built up.
    pub fn should_tick(&mut self) -> bool {
        if self.accumulator >= self.tick_dt {
            self.accumulator -= self.tick_dt;
            self.tick_count += 1;
            self.ticks_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(clock: &mut FrameClock) -> u32 {
        let mut ticks = 0;
        while clock.should_tick() {
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn one_refresh_interval_yields_one_tick() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(60.0, start);
        clock.begin_frame_at(start + Duration::from_micros(16_700));
        assert_eq!(drain(&mut clock), 1);
        assert_eq!(clock.ticks_this_frame, 1);
    }

    #[test]
    fn fast_refresh_accumulates_before_ticking() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(60.0, start);
        // 144 Hz display: the first frame is too short for a tick.
        clock.begin_frame_at(start + Duration::from_micros(6_944));
        assert_eq!(drain(&mut clock), 0);
        clock.begin_frame_at(start + Duration::from_micros(13_888));
        assert_eq!(drain(&mut clock), 0);
        clock.begin_frame_at(start + Duration::from_micros(20_832));
        assert_eq!(drain(&mut clock), 1);
    }

    #[test]
    fn slow_refresh_runs_several_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(60.0, start);
        clock.begin_frame_at(start + Duration::from_millis(55));
        assert_eq!(drain(&mut clock), 3);
        assert_eq!(clock.tick_count, 3);
    }

    #[test]
    fn long_stall_is_capped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(60.0, start);
        clock.begin_frame_at(start + Duration::from_secs(5));
        assert!((clock.real_dt - clock.max_frame_dt).abs() < f64::EPSILON);
        let ticks = drain(&mut clock);
        assert!((14..=15).contains(&ticks), "capped frame ran {ticks} ticks");
    }

    #[test]
    fn frame_count_advances_per_frame() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(60.0, start);
        clock.begin_frame_at(start + Duration::from_millis(1));
        clock.begin_frame_at(start + Duration::from_millis(2));
        assert_eq!(clock.frame_count, 2);
    }
}
