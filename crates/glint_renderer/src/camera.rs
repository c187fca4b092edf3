//! Camera for ray generation.

use crate::sampling::random_in_unit_disk;
use glint_math::{Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors raised when camera parameters cannot produce a valid view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("look_from and look_at are the same point ({0})")]
    DegenerateView(Vec3),

    #[error("Up vector {up} is parallel to the view direction")]
    UpParallelToView { up: Vec3 },

    #[error("Vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("Aspect ratio must be positive and finite, got {0}")]
    InvalidAspectRatio(f32),

    #[error("Aperture must be non-negative and finite, got {0}")]
    InvalidAperture(f32),

    #[error("Focus distance must be positive and finite, got {0}")]
    InvalidFocusDistance(f32),

    #[error("Camera position vectors must be finite")]
    NonFinitePosition,
}

pub type CameraResult<T> = Result<T, CameraError>;

/// Parameters a [`Camera`] is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    pub vfov: f32,         // Vertical field of view in degrees
    pub aspect_ratio: f32, // Viewport width over height
    pub aperture: f32,     // Lens diameter, 0 = pinhole
    pub focus_dist: f32,   // Distance from camera to plane of perfect focus
}

impl CameraSettings {
    /// Default settings: pinhole at the origin looking down -Z, 90 degree
    /// vertical field of view, 16:9.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 16.0 / 9.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the viewport aspect ratio (width / height).
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    fn validate(&self) -> CameraResult<()> {
        if !(self.look_from.is_finite() && self.look_at.is_finite() && self.vup.is_finite()) {
            return Err(CameraError::NonFinitePosition);
        }
        if self.look_from == self.look_at {
            return Err(CameraError::DegenerateView(self.look_from));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(CameraError::InvalidFov(self.vfov));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(CameraError::InvalidAspectRatio(self.aspect_ratio));
        }
        if !(self.aperture.is_finite() && self.aperture >= 0.0) {
            return Err(CameraError::InvalidAperture(self.aperture));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(CameraError::InvalidFocusDistance(self.focus_dist));
        }
        Ok(())
    }

    /// Validate the settings and derive the camera basis.
    pub fn build(&self) -> CameraResult<Camera> {
        self.validate()?;

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self
            .vup
            .cross(w)
            .try_normalize()
            .ok_or(CameraError::UpParallelToView { up: self.vup })?;
        let v = w.cross(u);

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio * viewport_height;

        let origin = self.look_from;
        let horizontal = self.focus_dist * viewport_width * u;
        let vertical = self.focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - self.focus_dist * w;

        log::debug!(
            "Camera built: from {} to {}, vfov {} deg, aperture {}, focus {}",
            self.look_from,
            self.look_at,
            self.vfov,
            self.aperture,
            self.focus_dist
        );

        Ok(Camera {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: self.aperture / 2.0,
        })
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera for generating rays into the scene.
///
/// Immutable once built; all derived values are computed by
/// [`CameraSettings::build`].
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Fixed pinhole camera at the origin looking down -Z with a viewport
    /// two units tall, one unit away.
    pub fn pinhole(aspect_ratio: f32) -> CameraResult<Self> {
        CameraSettings::new().with_aspect_ratio(aspect_ratio).build()
    }

    /// Generate a ray through normalized image-plane coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner of the viewport, `(1, 1)` the
    /// upper-right. With a non-zero aperture the origin is jittered across
    /// the lens disk.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(self.origin + offset, target - self.origin - offset)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Camera basis: right, up, and backwards (away from the view direction).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}
