//! Geometric shapes for materials.
//!
//! Shapes are an opaque capability from the material system's point of view:
//! a volume, a placement, and clone-style repositioning. The variant set is
//! deliberately small.

use serde::{Deserialize, Serialize};

/// Position or rotation triple, in metres / radians.
pub type Vec3 = [f64; 3];

const ORIGIN: Vec3 = [0.0, 0.0, 0.0];

/// A placed geometric shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    /// A dimensionless point; the empty material's shape.
    Point {
        #[serde(default)]
        position: Vec3,
        #[serde(default)]
        rotation: Vec3,
    },
    Sphere {
        radius: f64,
        #[serde(default)]
        position: Vec3,
        #[serde(default)]
        rotation: Vec3,
    },
    Cuboid {
        /// Edge lengths along the local axes.
        extents: Vec3,
        #[serde(default)]
        position: Vec3,
        #[serde(default)]
        rotation: Vec3,
    },
}

impl Shape {
    /// The point at the origin, volume 0.
    pub fn origin() -> Self {
        Shape::Point {
            position: ORIGIN,
            rotation: ORIGIN,
        }
    }

    pub fn sphere(radius: f64) -> Self {
        Shape::Sphere {
            radius,
            position: ORIGIN,
            rotation: ORIGIN,
        }
    }

    pub fn cuboid(extents: Vec3) -> Self {
        Shape::Cuboid {
            extents,
            position: ORIGIN,
            rotation: ORIGIN,
        }
    }

    /// Volume in m³.
    pub fn volume(&self) -> f64 {
        match self {
            Shape::Point { .. } => 0.0,
            Shape::Sphere { radius, .. } => 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3),
            Shape::Cuboid { extents, .. } => extents[0] * extents[1] * extents[2],
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Shape::Point { position, .. }
            | Shape::Sphere { position, .. }
            | Shape::Cuboid { position, .. } => *position,
        }
    }

    pub fn rotation(&self) -> Vec3 {
        match self {
            Shape::Point { rotation, .. }
            | Shape::Sphere { rotation, .. }
            | Shape::Cuboid { rotation, .. } => *rotation,
        }
    }

    /// An identical shape placed elsewhere; the original is untouched.
    pub fn at_position(&self, position: Vec3) -> Self {
        let mut clone = self.clone();
        match &mut clone {
            Shape::Point { position: p, .. }
            | Shape::Sphere { position: p, .. }
            | Shape::Cuboid { position: p, .. } => *p = position,
        }
        clone
    }

    /// An identical shape with another rotation; the original is untouched.
    pub fn with_rotation(&self, rotation: Vec3) -> Self {
        let mut clone = self.clone();
        match &mut clone {
            Shape::Point { rotation: r, .. }
            | Shape::Sphere { rotation: r, .. }
            | Shape::Cuboid { rotation: r, .. } => *r = rotation,
        }
        clone
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::origin()
    }
}
