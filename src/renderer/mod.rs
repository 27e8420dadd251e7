//! Rendering
//!
//! The simulation never depends on this module. Each frame the host hands the
//! player and the live obstacles to a [`Renderer`]; the WebGPU backend
//! tessellates them into flat-colored triangles.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use vertex::Vertex;

use crate::sim::{Obstacle, Player};

/// Draws one frame. Pure consumer of simulation state.
pub trait Renderer {
    fn render(&mut self, player: &Player, obstacles: &[Obstacle]);
}

/// CPU-only renderer that keeps the last frame's mesh (headless runs, tests)
#[derive(Debug, Default)]
pub struct MeshRenderer {
    pub vertices: Vec<Vertex>,
    pub frames: u64,
}

impl Renderer for MeshRenderer {
    fn render(&mut self, player: &Player, obstacles: &[Obstacle]) {
        self.vertices = shapes::scene(player, obstacles);
        self.frames += 1;
    }
}
