use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Skyrun".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Open the game window. The simulation works in a fixed logical viewport,
/// so the window starts at exactly that size and stretches on resize.
pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
        .with_min_inner_size(winit::dpi::LogicalSize::new(
            config.width / 4,
            config.height / 4,
        ));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    log::debug!("Window scale factor: {}", window.scale_factor());
    Arc::new(window)
}
