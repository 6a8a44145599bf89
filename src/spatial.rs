//! Spatialization types for FernSonic

pub use glam::{Vec2, Vec3};

/// 3D attributes pushed to the engine before a spatial instance starts.
///
/// Built fresh for every spatialization call rather than reused from a
/// shared scratch buffer, so no two instances ever alias the same
/// record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attributes3d {
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

impl Attributes3d {
    pub const FORWARD: Vec3 = Vec3::Z;
    pub const UP: Vec3 = Vec3::Y;

    /// Attributes for a stationary emitter at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            forward: Self::FORWARD,
            up: Self::UP,
        }
    }
}

impl Default for Attributes3d {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Where an event instance sits relative to the listening origin
/// (typically the listener or camera position).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    /// No positioning. A 3D event description still receives attributes
    /// at the origin.
    #[default]
    NonSpatial,
    /// Positioned at `position`, heard from `origin`.
    Spatial { position: Vec2, origin: Vec2 },
}

impl Placement {
    /// Spatial placement heard from the world origin.
    pub fn at(position: Vec2) -> Self {
        Self::Spatial {
            position,
            origin: Vec2::ZERO,
        }
    }

    pub fn relative_to(position: Vec2, origin: Vec2) -> Self {
        Self::Spatial { position, origin }
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, Self::Spatial { .. })
    }

    /// The engine-side position: `(position - origin)` on the ground
    /// plane, zero elevation.
    pub fn world_position(&self) -> Vec3 {
        match self {
            Self::NonSpatial => Vec3::ZERO,
            Self::Spatial { position, origin } => {
                let rel = *position - *origin;
                Vec3::new(rel.x, rel.y, 0.0)
            }
        }
    }
}
