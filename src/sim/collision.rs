//! Collision detection between obstacles and the player
//!
//! The player is drawn as a circle but collides as its bounding square
//! (center ± radius). Overlap uses strict inequalities, so touching edges do
//! not collide.

use glam::Vec2;

use super::state::{Obstacle, Player};

/// Axis-aligned rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_corner(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn from_center(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Strict overlap test
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

impl Player {
    /// Bounding square used for collisions
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.radius))
    }
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_corner(self.pos, self.size)
    }
}

/// Outcome of an obstacle touching the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Colors agree, the obstacle is caught
    Match,
    /// Colors differ, the run ends
    Lethal,
}

/// Check one obstacle against the player
pub fn obstacle_contact(obstacle: &Obstacle, player: &Player) -> Option<Contact> {
    if !obstacle.bounds().overlaps(&player.bounds()) {
        return None;
    }
    if obstacle.color_index == player.color_index {
        Some(Contact::Match)
    } else {
        Some(Contact::Lethal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(color_index: usize) -> Player {
        Player {
            pos: Vec2::new(400.0, 520.0),
            radius: 15.0,
            color_index,
        }
    }

    fn bar(x: f32, y: f32, color_index: usize) -> Obstacle {
        Obstacle::new(1, Vec2::new(x, y), Vec2::new(80.0, 20.0), color_index, 3.0)
    }

    #[test]
    fn test_overlap_match_and_lethal() {
        let p = player(2);
        assert_eq!(obstacle_contact(&bar(360.0, 510.0, 2), &p), Some(Contact::Match));
        assert_eq!(obstacle_contact(&bar(360.0, 510.0, 0), &p), Some(Contact::Lethal));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let p = player(0);
        // Obstacle bottom edge exactly at the player's top (520 - 15 = 505)
        assert_eq!(obstacle_contact(&bar(360.0, 485.0, 1), &p), None);
        // Obstacle right edge exactly at the player's left (400 - 15 = 385)
        assert_eq!(obstacle_contact(&bar(305.0, 510.0, 1), &p), None);
    }

    #[test]
    fn test_square_corner_counts_as_hit() {
        // Corner region of the bounding square lies outside the circle but still collides
        let p = player(0);
        let corner = Obstacle::new(1, Vec2::new(413.0, 533.0), Vec2::new(80.0, 20.0), 1, 3.0);
        let dist = (corner.pos - p.pos).length();
        assert!(dist > p.radius);
        assert_eq!(obstacle_contact(&corner, &p), Some(Contact::Lethal));
    }

    #[test]
    fn test_miss_far_away() {
        assert_eq!(obstacle_contact(&bar(0.0, 0.0, 0), &player(1)), None);
    }
}
