//! Mesh vertex format
//!
//! Positions are in playfield pixels until the pipeline maps them to clip space.

use bytemuck::{Pod, Zeroable};

/// Position + straight-alpha RGBA
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Same color at another position
    pub fn moved_to(self, (x, y): (f32, f32)) -> Self {
        Self::new(x, y, self.color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Fixed scene colors (palette colors come from `sim::palette`)
pub mod colors {
    /// Stroke around the player and obstacles (#333)
    pub const OUTLINE: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
    /// Glossy highlight on the player
    pub const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.3];
    /// Playfield (#2C2C3E)
    pub const BACKGROUND: [f32; 4] = [0.173, 0.173, 0.243, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_struct() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(
            bytemuck::cast_slice::<Vertex, f32>(&[Vertex::new(1.0, 2.0, [0.5; 4])]).len(),
            6
        );
    }

    #[test]
    fn test_moved_to_keeps_color() {
        let v = Vertex::new(1.0, 2.0, colors::OUTLINE).moved_to((-0.5, 0.5));
        assert_eq!(v, Vertex::new(-0.5, 0.5, colors::OUTLINE));
    }
}
