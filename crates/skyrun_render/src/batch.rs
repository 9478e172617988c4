//! CPU-side quad mesh with texture-batched draw calls.
//!
//! Quads are appended in paint order. Consecutive quads that sample the same
//! texture collapse into one `DrawCall`, so a frame of solid fills costs a
//! single `draw_indexed` no matter how many rectangles it contains.

use std::sync::Arc;

use crate::vertex::SpriteVertex;

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

/// Top-left anchored quad with a vertical gradient.
#[derive(Debug, Clone, Copy)]
pub struct QuadParams<'a> {
    pub texture_key: &'a str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub top_color: [f32; 4],
    pub bottom_color: [f32; 4],
    pub flip_x: bool,
}

#[derive(Debug, Default)]
pub struct QuadBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn push_quad(&mut self, quad: QuadParams<'_>) {
        let (u_left, u_right) = if quad.flip_x { (1.0, 0.0) } else { (0.0, 1.0) };
        let x0 = quad.x;
        let x1 = quad.x + quad.width;
        let y0 = quad.y;
        let y1 = quad.y + quad.height;
        let base_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [x0, y0],
                tex_coords: [u_left, 0.0],
                color: quad.top_color,
            },
            SpriteVertex {
                position: [x1, y0],
                tex_coords: [u_right, 0.0],
                color: quad.top_color,
            },
            SpriteVertex {
                position: [x1, y1],
                tex_coords: [u_right, 1.0],
                color: quad.bottom_color,
            },
            SpriteVertex {
                position: [x0, y1],
                tex_coords: [u_left, 1.0],
                color: quad.bottom_color,
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);

        self.push_draw_call(quad.texture_key, draw_start, 6);
    }

    /// Append a draw call, merging with the previous one when the texture
    /// matches and the indices are contiguous.
    fn push_draw_call(&mut self, texture_key: &str, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if &*last.texture_key == texture_key && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key: Arc::from(texture_key),
            index_start,
            index_count,
        });
    }
}
