//! Brush geometry.
//!
//! Brushes here are convex axis-aligned cuboids described by six planes, one per axis
//! direction. A face plane satisfies `normal · p = distance`, so the `+X` face of a box
//! spanning `min..max` has distance `max.x` and the `-X` face has distance `-min.x`.

use crate::bbox::BBox3;
use crate::error::ModelError;
use crate::types::NodeId;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Brushes thinner than this along any axis are degenerate.
pub const MIN_BRUSH_THICKNESS: f64 = 0.125;

pub const NO_TEXTURE: &str = "__none";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceDirection {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// 0 for X, 1 for Y, 2 for Z.
    pub const fn axis(self) -> usize {
        self.index() / 2
    }

    pub const fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    pub fn normal(self) -> DVec3 {
        let mut normal = DVec3::ZERO;
        normal[self.axis()] = if self.is_positive() { 1.0 } else { -1.0 };
        normal
    }

    pub const fn opposite(self) -> FaceDirection {
        match self {
            FaceDirection::PosX => FaceDirection::NegX,
            FaceDirection::NegX => FaceDirection::PosX,
            FaceDirection::PosY => FaceDirection::NegY,
            FaceDirection::NegY => FaceDirection::PosY,
            FaceDirection::PosZ => FaceDirection::NegZ,
            FaceDirection::NegZ => FaceDirection::PosZ,
        }
    }

    /// The two axes spanning the face plane, used as texture u/v axes.
    const fn texture_axes(self) -> (usize, usize) {
        match self.axis() {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureAttributes {
    pub texture: String,
    pub offset: DVec2,
    pub scale: DVec2,
    pub rotation: f64,
}

impl TextureAttributes {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            offset: DVec2::ZERO,
            scale: DVec2::ONE,
            rotation: 0.0,
        }
    }

    /// Shift the offset so the texture stays fixed relative to a face moved by `delta`.
    fn compensate(&mut self, direction: FaceDirection, delta: DVec3) {
        let (u, v) = direction.texture_axes();
        self.offset -= DVec2::new(delta[u] / self.scale.x, delta[v] / self.scale.y);
    }
}

impl Default for TextureAttributes {
    fn default() -> Self {
        Self::new(NO_TEXTURE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushFace {
    pub direction: FaceDirection,
    pub distance: f64,
    pub attributes: TextureAttributes,
}

impl BrushFace {
    pub fn new(direction: FaceDirection, distance: f64, attributes: TextureAttributes) -> Self {
        Self {
            direction,
            distance,
            attributes,
        }
    }

    pub fn normal(&self) -> DVec3 {
        self.direction.normal()
    }
}

/// Addresses one face of one brush node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrushFaceHandle {
    pub brush: NodeId,
    pub face: FaceDirection,
}

impl BrushFaceHandle {
    pub const fn new(brush: NodeId, face: FaceDirection) -> Self {
        Self { brush, face }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    // Ordered by `FaceDirection::index`.
    faces: Vec<BrushFace>,
}

impl Brush {
    /// A box brush with every face using `texture`.
    pub fn cuboid(bounds: BBox3, texture: impl Into<String>) -> Self {
        let texture = texture.into();
        let faces = FaceDirection::ALL
            .iter()
            .map(|&direction| {
                let distance = if direction.is_positive() {
                    bounds.max[direction.axis()]
                } else {
                    -bounds.min[direction.axis()]
                };
                BrushFace::new(direction, distance, TextureAttributes::new(texture.clone()))
            })
            .collect();
        Self { faces }
    }

    /// Build from an arbitrary list of faces; every direction must appear exactly once.
    pub fn from_faces(faces: Vec<BrushFace>) -> Result<Self, ModelError> {
        let mut slots: Vec<Option<BrushFace>> = vec![None; FaceDirection::ALL.len()];
        for face in faces {
            let slot = &mut slots[face.direction.index()];
            if slot.is_some() {
                return Err(ModelError::InvalidBrush(format!(
                    "duplicate face {:?}",
                    face.direction
                )));
            }
            *slot = Some(face);
        }

        let faces = slots
            .into_iter()
            .zip(FaceDirection::ALL)
            .map(|(face, direction)| {
                face.ok_or_else(|| ModelError::InvalidBrush(format!("missing face {direction:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let brush = Self { faces };
        if !brush.is_thick_enough() {
            return Err(ModelError::InvalidBrush("degenerate extent".to_string()));
        }
        Ok(brush)
    }

    pub fn faces(&self) -> &[BrushFace] {
        &self.faces
    }

    pub fn face(&self, direction: FaceDirection) -> &BrushFace {
        &self.faces[direction.index()]
    }

    pub fn bounds(&self) -> BBox3 {
        let mut min = DVec3::ZERO;
        let mut max = DVec3::ZERO;
        for axis in 0..3 {
            max[axis] = self.faces[axis * 2].distance;
            min[axis] = -self.faces[axis * 2 + 1].distance;
        }
        BBox3::new(min, max)
    }

    pub fn can_move_boundary(
        &self,
        world_bounds: &BBox3,
        face: FaceDirection,
        delta: DVec3,
    ) -> bool {
        self.moved_boundary(world_bounds, face, delta, false).is_ok()
    }

    /// Move `face` along its normal by the normal component of `delta`.
    ///
    /// Fails without touching the brush if the result would be degenerate or leave
    /// `world_bounds`.
    pub fn move_boundary(
        &mut self,
        world_bounds: &BBox3,
        face: FaceDirection,
        delta: DVec3,
        lock_textures: bool,
    ) -> Result<(), ModelError> {
        *self = self.moved_boundary(world_bounds, face, delta, lock_textures)?;
        Ok(())
    }

    fn moved_boundary(
        &self,
        world_bounds: &BBox3,
        direction: FaceDirection,
        delta: DVec3,
        lock_textures: bool,
    ) -> Result<Brush, ModelError> {
        let normal = direction.normal();
        let distance = delta.dot(normal);

        let mut moved = self.clone();
        let face = &mut moved.faces[direction.index()];
        face.distance += distance;
        if lock_textures {
            face.attributes.compensate(direction, delta - normal * distance);
        }

        if !moved.is_thick_enough() {
            return Err(ModelError::BoundaryRejected(format!(
                "moving {direction:?} by {distance} makes the brush degenerate"
            )));
        }
        if !world_bounds.contains(&moved.bounds()) {
            return Err(ModelError::BoundaryRejected(format!(
                "moving {direction:?} by {distance} leaves the world bounds"
            )));
        }
        Ok(moved)
    }

    pub fn can_translate(&self, world_bounds: &BBox3, delta: DVec3) -> bool {
        world_bounds.contains(&self.bounds().translate(delta))
    }

    /// Move every face by `delta`. With texture lock, offsets follow the brush.
    pub fn translate(&mut self, delta: DVec3, lock_textures: bool) {
        for face in &mut self.faces {
            let normal = face.direction.normal();
            let along = delta.dot(normal);
            face.distance += along;
            if lock_textures {
                face.attributes.compensate(face.direction, delta - normal * along);
            }
        }
    }

    fn is_thick_enough(&self) -> bool {
        self.bounds().size().min_element() >= MIN_BRUSH_THICKNESS
    }
}
