use glam::{Mat4, Quat, Vec3};

/// Local transform of a bone.
///
/// Stores position, rotation, and scale, plus an optional scale-rotation:
/// the frame in which `scale` is applied. Without a scale-rotation the scale
/// acts along the bone's own axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Non-uniform scale.
    pub scale: Vec3,
    /// Orientation of the scale axes, if they differ from the bone axes.
    pub scale_rotation: Option<Quat>,
}

impl Transform {
    /// Identity transform: origin position, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        scale_rotation: None,
    };

    /// Create from position, rotation, and scale.
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            scale_rotation: None,
        }
    }

    /// Create from position only (identity rotation and scale).
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create from rotation only (origin position and unit scale).
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Create from scale only.
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Returns this transform with a scale-rotation.
    #[must_use]
    pub fn with_scale_rotation(mut self, scale_rotation: Quat) -> Self {
        self.scale_rotation = Some(scale_rotation);
        self
    }

    /// Compute the local 4x4 matrix.
    ///
    /// `T * R * S`, or `T * R * SR * S * SR⁻¹` when a scale-rotation is set.
    pub fn to_matrix(&self) -> Mat4 {
        match self.scale_rotation {
            None => Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position),
            Some(scale_rotation) => {
                Mat4::from_rotation_translation(self.rotation, self.position)
                    * Mat4::from_quat(scale_rotation)
                    * Mat4::from_scale(self.scale)
                    * Mat4::from_quat(scale_rotation.conjugate())
            }
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Transform {
    /// Decompose an affine matrix. Shear is lost and no scale-rotation is set.
    fn from(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self::new(position, rotation, scale)
    }
}
