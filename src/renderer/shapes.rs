//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::palette;
use crate::sim::{Obstacle, Player};

/// Segments used for the player circle
pub const CIRCLE_SEGMENTS: u32 = 32;
/// Outline stroke widths (pixels)
const PLAYER_STROKE: f32 = 3.0;
const OBSTACLE_STROKE: f32 = 2.0;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let at = |r: f32, theta: f32| center + Vec2::new(r * theta.cos(), r * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = at(inner_radius, theta1);
        let outer1 = at(outer_radius, theta1);
        let inner2 = at(inner_radius, theta2);
        let outer2 = at(outer_radius, theta2);

        push_quad(&mut vertices, inner1, outer1, inner2, outer2, color);
    }

    vertices
}

/// Half-disc cap (angles in screen space, y down), drawn as a fan
pub fn arc_fan(
    center: Vec2,
    radius: f32,
    theta_start: f32,
    theta_end: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    let span = theta_end - theta_start;

    for i in 0..segments {
        let theta1 = theta_start + span * i as f32 / segments as f32;
        let theta2 = theta_start + span * (i + 1) as f32 / segments as f32;
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Filled axis-aligned rectangle from its top-left corner
pub fn rect(pos: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        pos,
        pos + Vec2::new(size.x, 0.0),
        pos + Vec2::new(0.0, size.y),
        pos + size,
        color,
    );
    vertices
}

/// Rectangle border of the given stroke width, centered on the edges
pub fn rect_outline(pos: Vec2, size: Vec2, stroke: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = stroke / 2.0;
    let outer_pos = pos - Vec2::splat(half);
    let outer_size = size + Vec2::splat(stroke);

    let mut vertices = Vec::with_capacity(24);
    // Top and bottom span the full outer width, sides fill between them
    vertices.extend(rect(outer_pos, Vec2::new(outer_size.x, stroke), color));
    vertices.extend(rect(
        outer_pos + Vec2::new(0.0, outer_size.y - stroke),
        Vec2::new(outer_size.x, stroke),
        color,
    ));
    vertices.extend(rect(
        outer_pos + Vec2::new(0.0, stroke),
        Vec2::new(stroke, outer_size.y - 2.0 * stroke),
        color,
    ));
    vertices.extend(rect(
        outer_pos + Vec2::new(outer_size.x - stroke, stroke),
        Vec2::new(stroke, outer_size.y - 2.0 * stroke),
        color,
    ));
    vertices
}

/// Two triangles covering a quad given as (a, b, c, d) with a-b and c-d opposite edges
fn push_quad(vertices: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    vertices.push(Vertex::new(a.x, a.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(c.x, c.y, color));

    vertices.push(Vertex::new(c.x, c.y, color));
    vertices.push(Vertex::new(b.x, b.y, color));
    vertices.push(Vertex::new(d.x, d.y, color));
}

/// Player: filled disc, dark stroke, glossy highlight above center
pub fn player(player: &Player) -> Vec<Vertex> {
    let fill = palette::color(player.color_index).rgba();
    let mut vertices = circle(player.pos, player.radius, fill, CIRCLE_SEGMENTS);
    vertices.extend(ring(
        player.pos,
        player.radius - PLAYER_STROKE / 2.0,
        player.radius + PLAYER_STROKE / 2.0,
        colors::OUTLINE,
        CIRCLE_SEGMENTS,
    ));
    vertices.extend(arc_fan(
        player.pos - Vec2::new(0.0, 5.0),
        player.radius * 0.6,
        0.3,
        PI - 0.3,
        colors::HIGHLIGHT,
        CIRCLE_SEGMENTS / 2,
    ));
    vertices
}

/// Obstacle: filled bar with a dark border
pub fn obstacle(obstacle: &Obstacle) -> Vec<Vertex> {
    let fill = palette::color(obstacle.color_index).rgba();
    let mut vertices = rect(obstacle.pos, obstacle.size, fill);
    vertices.extend(rect_outline(
        obstacle.pos,
        obstacle.size,
        OBSTACLE_STROKE,
        colors::OUTLINE,
    ));
    vertices
}

/// Whole frame: obstacles in spawn order, then the player on top
pub fn scene(player_state: &Player, obstacles: &[Obstacle]) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    for o in obstacles {
        vertices.extend(obstacle(o));
    }
    vertices.extend(player(player_state));
    vertices
}
