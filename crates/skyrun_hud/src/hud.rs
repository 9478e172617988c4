//! Score text, game-over banner and the F3 debug panel, drawn with egui on
//! top of the game scene.
//!
//! egui needs a split render because `egui_wgpu::Renderer::render()` wants a
//! `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic, tessellate
//!   2. `upload()`  -- textures and buffers (borrows the encoder mutably)
//!   3. `paint()`   -- draw into a pass made `'static` with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped
//!
//! HUD text is laid out in game viewport units and scaled to the window.

use skyrun_core::time::FrameClock;
use winit::window::Window;

use crate::layout::{hud_texts, TextAnchor};

/// Snapshot of the simulation for one frame of HUD.
#[derive(Debug, Clone, Default)]
pub struct HudStats {
    pub display_score: u64,
    pub game_over: bool,
    pub camera_offset: f32,
    pub platform_count: usize,
    pub grounded: bool,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

pub struct Hud {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl Hud {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug panel: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: &HudStats,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_texts(ctx, stats);
            if debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 60.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms));
                        ui.label(format!("Ticks this frame: {}", clock.ticks_this_frame));
                        ui.label(format!("Total ticks: {}", clock.tick_count));
                        ui.label(format!("Frame: {}", clock.frame_count));
                        ui.separator();
                        ui.label(format!("Camera: {:.0}", stats.camera_offset));
                        ui.label(format!("Platforms: {}", stats.platform_count));
                        ui.label(format!("Grounded: {}", stats.grounded));
                        ui.label(if stats.game_over {
                            "Session: game over"
                        } else {
                            "Session: running"
                        });
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_texts(ctx: &egui::Context, stats: &HudStats) {
    let screen = ctx.screen_rect();
    if stats.viewport_width <= 0.0 || stats.viewport_height <= 0.0 {
        return;
    }
    let scale_x = screen.width() / stats.viewport_width;
    let scale_y = screen.height() / stats.viewport_height;
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("skyrun_hud_text"),
    ));

    for text in hud_texts(
        stats.display_score,
        stats.game_over,
        stats.viewport_width,
        stats.viewport_height,
    ) {
        let pos = egui::pos2(
            screen.min.x + text.pos[0] * scale_x,
            screen.min.y + text.pos[1] * scale_y,
        );
        let anchor = match text.anchor {
            TextAnchor::LeftBaseline => egui::Align2::LEFT_BOTTOM,
        };
        painter.text(
            pos,
            anchor,
            text.text,
            egui::FontId::proportional(text.size * scale_y),
            egui::Color32::WHITE,
        );
    }
}
