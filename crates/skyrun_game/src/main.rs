//! Skyrun: endless side-scrolling platformer.
//!
//! winit drives the event loop via `ApplicationHandler`. The simulation runs
//! inside `RedrawRequested` on a fixed 60 Hz tick (see `FrameClock`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_tick()` -- sample held keys, advance the `World`
//!   3. Build world-space quads from the `World`, batch them by texture
//!   4. Upload camera uniform, issue draw calls, composite the egui HUD
//!
//! Revive, quit and the debug toggle are dispatched straight from the
//! key-down event so a press is never lost or repeated by the tick cadence.
//!
//! `skyrun --replay <file>` runs a replay script headless and exits.

mod audio;
mod collision;
mod config;
mod controller;
mod frame;
mod platforms;
mod replay;
mod session;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use audio::{route_session_event, SilentSoundtrack, Soundtrack};
use config::{load_config_or_default, GameConfig};
use frame::{build_frame, srgb_hex, LoadedSprites, TextureSlot, SKY};
use replay::load_replay_from_path;
use session::{sample_controller_input, SessionEvent, World};
use skyrun_core::input::{InputState, Key};
use skyrun_core::time::FrameClock;
use skyrun_hud::{Hud, HudStats};
use skyrun_render::{
    Camera2D, DrawCall, GpuContext, QuadBatch, QuadParams, SpritePipeline, SpriteVertex, Texture,
};

const CONFIG_PATH: &str = "assets/config/skyrun.json";
const IDLE_SPRITE_PATH: &str = "assets/sprites/idle.png";
const RUN_SPRITE_PATH: &str = "assets/sprites/run.png";
#[cfg(feature = "audio")]
const MUSIC_PATH: &str = "assets/audio/music.wav";

struct GpuSpriteTexture {
    // Keeps the GPU texture alive for as long as its bind group.
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Everything the running window needs. Built in `ApplicationHandler::resumed`
/// once the window and GPU surface exist.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    hud: Hud,
    world: World,
    soundtrack: Box<dyn Soundtrack>,
    textures: HashMap<String, GpuSpriteTexture>,
    sprites: LoadedSprites,

    // The quad mesh is rebuilt on the CPU after each tick batch, then streamed
    // into these buffers. Buffers grow (power-of-two) but never shrink.
    batch: QuadBatch,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let clock = FrameClock::new(config.tick_rate_hz);
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = Hud::new(&gpu.device, gpu.surface_format, &window);
        let camera = Camera2D::new(config.viewport_width, config.viewport_height);

        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let textures = load_textures(&gpu, &sprite_pipeline);
        let sprites = LoadedSprites {
            idle: textures.contains_key(TextureSlot::Idle.key()),
            running: textures.contains_key(TextureSlot::Running.key()),
        };
        let mut soundtrack = open_soundtrack(&config);
        soundtrack.play();

        let seed: u64 = rand::random();
        log::info!("World seed: {seed}");
        let world = World::new(config, seed);

        let mut state = Self {
            window,
            gpu,
            clock,
            input: InputState::new(),
            camera,
            sprite_pipeline,
            hud,
            world,
            soundtrack,
            textures,
            sprites,
            batch: QuadBatch::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
        };
        state.rebuild_mesh();
        Ok(state)
    }

    /// Returns false when the player asked to quit.
    fn handle_key(&mut self, key: Key, pressed: bool) -> bool {
        let outcome = apply_key(&mut self.input, &mut self.world, key, pressed);
        if let Some(event) = outcome.event {
            route_session_event(self.soundtrack.as_mut(), event);
            self.rebuild_mesh();
        }
        match outcome.host {
            Some(HostAction::Quit) => return false,
            Some(HostAction::ToggleDebug) => self.hud.toggle_debug(),
            None => {}
        }
        true
    }

    fn rebuild_mesh(&mut self) {
        self.batch.clear();
        for quad in build_frame(&self.world, self.sprites) {
            self.batch.push_quad(QuadParams {
                texture_key: quad.texture.key(),
                x: quad.x,
                y: quad.y,
                width: quad.width,
                height: quad.height,
                top_color: quad.top_color,
                bottom_color: quad.bottom_color,
                flip_x: quad.flip_x,
            });
        }

        let vertex_count = self.batch.vertices.len();
        let index_count = self.batch.indices.len();
        self.ensure_mesh_capacity(vertex_count, index_count);
        if vertex_count > 0 {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.batch.vertices),
            );
        }
        if index_count > 0 {
            self.gpu.queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&self.batch.indices),
            );
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn hud_stats(&self) -> HudStats {
        HudStats {
            display_score: self.world.display_score(),
            game_over: !self.world.is_running(),
            camera_offset: self.world.camera_offset,
            platform_count: self.world.platforms.len(),
            grounded: self.world.player.is_grounded(),
            viewport_width: self.world.config.viewport_width,
            viewport_height: self.world.config.viewport_height,
        }
    }

    fn run_ticks(&mut self) {
        self.clock.begin_frame();
        while self.clock.should_tick() {
            let report = self.world.tick(sample_controller_input(&self.input));
            if let Some(event) = report.event {
                route_session_event(self.soundtrack.as_mut(), event);
            }
            if let Some(landing) = report.landing {
                log::trace!(
                    "Standing on platform {} at y={:.1}",
                    landing.index,
                    landing.surface_y
                );
            }
            log::trace!(
                "Tick {}: player ({:.1}, {:.1}) dy={:.2}",
                self.clock.tick_count,
                self.world.player.x,
                self.world.player.y,
                self.world.player.dy
            );
        }

        if self.clock.ticks_this_frame > 0 {
            self.rebuild_mesh();
        }
    }

    fn render(&mut self) {
        self.camera.position.x = self.world.camera_offset;
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.hud_stats();
        let (egui_primitives, egui_textures_delta) =
            self.hud.prepare(&self.window, &self.clock, &stats);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder =
            self.gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        {
            let [r, g, b, _] = srgb_hex(SKY, 1.0);
            let clear_color = wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: 1.0,
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            let mut last_bound: Option<&Arc<str>> = None;
            for draw in &self.batch.draw_calls {
                let Some(texture) = self.textures.get(&*draw.texture_key) else {
                    continue;
                };
                if last_bound.is_none_or(|last| **last != *draw.texture_key) {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound = Some(&draw.texture_key);
                }
                render_pass.draw_indexed(draw_range(draw), 0, 0..1);
            }
        }

        self.hud.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.hud
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.hud.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    config: GameConfig,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let platform_config = self.config.platform_config();
        let window = skyrun_platform::window::create_window(event_loop, &platform_config);
        log::info!(
            "Window created: {}x{}",
            platform_config.width,
            platform_config.height
        );
        match EngineState::new(window, self.config.clone()) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Failed to start renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.input.release_all(),

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        if !state.handle_key(key, event.state == ElementState::Pressed) {
                            log::info!("Escape pressed, exiting.");
                            event_loop.exit();
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                state.run_ticks();
                state.render();
                state.input.end_frame();
            }

            _ => {}
        }
    }
}

/// One-shot actions owned by the window rather than the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostAction {
    Quit,
    ToggleDebug,
}

#[derive(Debug, Default, PartialEq)]
struct KeyOutcome {
    host: Option<HostAction>,
    event: Option<SessionEvent>,
}

/// Record a key event and fire whatever one-shot action its press edge
/// carries. Autorepeat arrives as further presses and fires nothing.
fn apply_key(input: &mut InputState, world: &mut World, key: Key, pressed: bool) -> KeyOutcome {
    let mut outcome = KeyOutcome::default();
    if !pressed {
        input.key_up(key);
        return outcome;
    }
    if !input.key_down(key) {
        return outcome;
    }
    outcome.host = match key {
        Key::Escape => Some(HostAction::Quit),
        Key::F3 => Some(HostAction::ToggleDebug),
        _ => None,
    };
    outcome.event = world.key_pressed(key);
    outcome
}

fn draw_range(draw: &DrawCall) -> std::ops::Range<u32> {
    draw.index_start..(draw.index_start + draw.index_count)
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Upload the blank fill texture and whichever player sprites load. A
/// sprite that fails to load gets no entry, and its pose is not drawn.
fn load_textures(
    gpu: &GpuContext,
    pipeline: &SpritePipeline,
) -> HashMap<String, GpuSpriteTexture> {
    let mut textures = HashMap::new();
    let upload = |texture: Texture| GpuSpriteTexture {
        bind_group: pipeline.create_texture_bind_group(&gpu.device, &texture),
        _texture: texture,
    };

    textures.insert(
        TextureSlot::Blank.key().to_string(),
        upload(Texture::white(&gpu.device, &gpu.queue)),
    );
    for (slot, path) in [
        (TextureSlot::Idle, IDLE_SPRITE_PATH),
        (TextureSlot::Running, RUN_SPRITE_PATH),
    ] {
        match Texture::from_path(&gpu.device, &gpu.queue, Path::new(path)) {
            Ok(texture) => {
                log::info!(
                    "Loaded sprite '{}' ({}x{})",
                    path,
                    texture.size.0,
                    texture.size.1
                );
                textures.insert(slot.key().to_string(), upload(texture));
            }
            Err(err) => log::warn!("{err}; '{}' will not be drawn", slot.key()),
        }
    }
    textures
}

fn open_soundtrack(config: &GameConfig) -> Box<dyn Soundtrack> {
    #[cfg(feature = "audio")]
    {
        match audio::RodioSoundtrack::open(Path::new(MUSIC_PATH), config.music_volume) {
            Ok(soundtrack) => {
                log::info!("Music: {MUSIC_PATH}");
                return Box::new(soundtrack);
            }
            Err(err) => log::warn!("Music disabled: {err}"),
        }
    }
    #[cfg(not(feature = "audio"))]
    log::debug!(
        "Built without audio; music volume {} unused",
        config.music_volume
    );
    Box::new(SilentSoundtrack::default())
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        _ => None,
    }
}

fn run_replay(config: GameConfig, path: &Path) -> Result<(), String> {
    let script = load_replay_from_path(path)?;
    let mut soundtrack = SilentSoundtrack::default();
    let outcome = script.run(config, &mut soundtrack);
    log::info!(
        "Replay '{}' finished: score {}, camera {:.0}, state {:?}, {} lifecycle events",
        path.display(),
        outcome.world.display_score(),
        outcome.world.camera_offset,
        outcome.world.state,
        outcome.events.len()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Skyrun starting...");

    let config = match load_config_or_default(Path::new(CONFIG_PATH)) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [flag, path] = args.as_slice() {
        if flag == "--replay" {
            if let Err(err) = run_replay(config, Path::new(path)) {
                log::error!("{err}");
                std::process::exit(1);
            }
            return;
        }
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
