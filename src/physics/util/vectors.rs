use bevy::math::Vec3;

/// Orthonormal camera basis for a camera at `position` looking at `target`.
///
/// `right` is `forward × world-up`. When the view direction is parallel to
/// world-up, world-z is used in its place so the basis never contains NaN.
/// Returns `None` if `position` and `target` coincide.
pub fn look_basis(position: Vec3, target: Vec3) -> Option<LookBasis> {
    let forward = (target - position).try_normalize()?;
    let right = forward
        .cross(Vec3::Y)
        .try_normalize()
        .or_else(|| forward.cross(Vec3::Z).try_normalize())?;
    let up = right.cross(forward);
    Some(LookBasis { forward, right, up })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Up vector to hand to `Transform::looking_at`, avoiding the degenerate
/// case where the view direction is parallel to world-up.
pub fn safe_up(position: Vec3, target: Vec3) -> Vec3 {
    match (target - position).try_normalize() {
        Some(forward) if forward.cross(Vec3::Y).length_squared() < 1e-8 => Vec3::Z,
        _ => Vec3::Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_orthonormal() {
        let basis = look_basis(Vec3::new(0.0, 10.0, 30.0), Vec3::ZERO).unwrap();
        assert!((basis.forward.length() - 1.0).abs() < 1e-6);
        assert!((basis.right.length() - 1.0).abs() < 1e-6);
        assert!((basis.up.length() - 1.0).abs() < 1e-6);
        assert!(basis.forward.dot(basis.right).abs() < 1e-6);
        assert!(basis.forward.dot(basis.up).abs() < 1e-6);
        assert!(basis.up.y > 0.0);
    }

    #[test]
    fn test_looking_straight_down() {
        let basis = look_basis(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO).unwrap();
        assert!(!basis.right.is_nan());
        assert!(!basis.up.is_nan());
        assert_eq!(safe_up(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO), Vec3::Z);
    }

    #[test]
    fn test_coincident_points() {
        assert!(look_basis(Vec3::ONE, Vec3::ONE).is_none());
    }
}
