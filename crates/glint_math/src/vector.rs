//! Small helpers on top of `glam::Vec3` used by the scattering code.

use crate::Vec3;

/// Threshold below which a vector component counts as zero.
const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// Extra vector operations not provided by glam.
pub trait VectorExt {
    /// True if the vector is close to zero in every dimension.
    fn near_zero(&self) -> bool;

    /// Mirror reflection of `self` about the normal `n`.
    fn reflect(&self, n: Vec3) -> Vec3;

    /// Refract a unit vector through a surface with normal `n`.
    ///
    /// `eta_ratio` is the ratio of refractive indices (incident over
    /// transmitted).
    fn refract(&self, n: Vec3, eta_ratio: f32) -> Vec3;
}

impl VectorExt for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        self.abs().cmplt(Vec3::splat(NEAR_ZERO_EPSILON)).all()
    }

    #[inline]
    fn reflect(&self, n: Vec3) -> Vec3 {
        *self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract(&self, n: Vec3, eta_ratio: f32) -> Vec3 {
        let cos_theta = (-*self).dot(n).min(1.0);
        let r_out_perp = eta_ratio * (*self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_zero() {
        assert!(Vec3::ZERO.near_zero());
        assert!(Vec3::new(1e-9, -1e-9, 0.0).near_zero());
        assert!(!Vec3::new(1e-9, 1e-3, 0.0).near_zero());
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(v.reflect(Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_same_medium_is_straight() {
        let uv = Vec3::new(1.0, -2.0, 0.5).normalize();
        let refracted = uv.refract(Vec3::Y, 1.0);

        assert!((refracted - uv).length() < 1e-5);
    }

    #[test]
    fn test_refract_normal_incidence() {
        let refracted = Vec3::NEG_Y.refract(Vec3::Y, 1.0 / 1.5);

        assert!((refracted - Vec3::NEG_Y).length() < 1e-5);
    }
}
