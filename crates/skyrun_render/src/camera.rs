use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Screen-style 2D camera: `position` is the world point shown at the
/// top-left corner and y grows downward. `view_size` is the logical
/// viewport, independent of the window's pixel size.
pub struct Camera2D {
    pub position: Vec2,
    pub view_size: Vec2,
}

impl Camera2D {
    pub fn new(view_width: f32, view_height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            view_size: Vec2::new(view_width, view_height),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.position.x,
            self.position.x + self.view_size.x,
            self.position.y + self.view_size.y,
            self.position.y,
            -1.0,
            1.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
        }
    }
}
