//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with a configurable depth cap
//! - Gamma correction
//! - Anti-aliasing via jittered multi-sampling

use crate::sampling::gen_f32;
use crate::{Camera, Color, Hittable};
use glint_math::{Interval, Ray};
use rand::RngCore;
use thiserror::Error;

/// Minimum ray parameter for scene queries; keeps a bounced ray from
/// re-hitting the surface it just left.
pub const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// Errors for render settings that cannot produce an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Image must be at least 2x2 pixels, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("Bucket size must be at least 1 pixel")]
    ZeroBucketSize,
}

/// Errors that can stop a render.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Render cancelled after {completed} of {total} buckets")]
    Cancelled { completed: usize, total: usize },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// What a camera sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Full light transport through the materials.
    #[default]
    PathTraced,
    /// Surface normals mapped to RGB; no bounces, materials ignored.
    Normals,
}

/// Vertical background gradient seen by rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGradient {
    /// Color for rays pointing straight down
    pub horizon: Color,
    /// Color straight up
    pub zenith: Color,
}

impl SkyGradient {
    /// Background color for an escaping ray.
    pub fn color(&self, ray: &Ray) -> Color {
        let unit_direction = ray.direction().normalize();
        let a = 0.5 * (unit_direction.y + 1.0);
        (1.0 - a) * self.horizon + a * self.zenith
    }
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output width in pixels
    pub image_width: u32,
    /// Output height in pixels
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Path tracing or normal visualization
    pub shading: ShadingMode,
    /// Background seen by escaping rays
    pub sky: SkyGradient,
    /// Seed for the per-bucket random streams
    pub seed: u64,
    /// Bucket edge length for tiled rendering
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            shading: ShadingMode::PathTraced,
            sky: SkyGradient::default(),
            seed: 0,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set the width and derive the height from an aspect ratio.
    pub fn with_width_and_aspect(self, width: u32, aspect_ratio: f32) -> Self {
        let height = (width as f32 / aspect_ratio) as u32;
        self.with_resolution(width, height)
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that the settings can produce an image.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Sample coordinates divide by (resolution - 1)
        if self.image_width < 2 || self.image_height < 2 {
            return Err(ConfigError::InvalidResolution {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::ZeroBucketSize);
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// Follows the ray through the scene for at most `config.max_depth`
/// bounces, multiplying in each material's attenuation. Escaping rays pick
/// up the sky, absorbed rays and rays that run out of bounces carry no
/// light.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    let mut throughput = Color::ONE;

    for _ in 0..config.max_depth {
        let Some(rec) = world.hit(&ray, Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY)) else {
            return throughput * config.sky.color(&ray);
        };

        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            None => return Color::ZERO,
        }
    }

    // Out of bounces
    Color::ZERO
}

/// Color a ray by the normal of the first surface it hits.
pub fn normal_color(ray: &Ray, world: &dyn Hittable, config: &RenderConfig) -> Color {
    match world.hit(ray, Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY)) {
        Some(rec) => 0.5 * (rec.normal + Color::ONE),
        None => config.sky.color(ray),
    }
}

/// Linear color of one camera sample, according to the shading mode.
pub fn sample_color(
    ray: &Ray,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    match config.shading {
        ShadingMode::PathTraced => ray_color(ray, world, config, rng),
        ShadingMode::Normals => normal_color(ray, world, config),
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Render a single pixel with multi-sampling.
///
/// `y` counts image rows from the top; the returned color is averaged and
/// gamma corrected. `config` must pass [`RenderConfig::validate`] and
/// `(x, y)` must lie inside the image.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    debug_assert!(config.validate().is_ok(), "invalid render config");
    debug_assert!(
        x < config.image_width && y < config.image_height,
        "pixel outside image"
    );

    let mut pixel_color = Color::ZERO;

    // Viewport t runs bottom to top
    let j = config.image_height - 1 - y;
    let width_span = (config.image_width - 1) as f32;
    let height_span = (config.image_height - 1) as f32;

    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + gen_f32(rng)) / width_span;
        let t = (j as f32 + gen_f32(rng)) / height_span;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += sample_color(&ray, world, config, rng);
    }

    // Average the samples
    let averaged = pixel_color / config.samples_per_pixel as f32;
    Color::new(
        linear_to_gamma(averaged.x),
        linear_to_gamma(averaged.y),
        linear_to_gamma(averaged.z),
    )
}

/// Gamma-corrected render output in row-major order, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Position of pixel (x, y) in `pixels`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Iterate over rows from the top of the image.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks(self.width as usize)
    }
}

/// Render the entire scene on the calling thread.
///
/// Pixels are visited row by row from the top, all samples drawn from `rng`.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> RenderResult<ImageBuffer> {
    config.validate()?;

    log::info!(
        "Rendering {}x{} @ {} spp, depth {} (single-threaded)",
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
        config.max_depth
    );
    let start = std::time::Instant::now();

    let mut image = ImageBuffer::new(config.image_width, config.image_height);

    for y in 0..config.image_height {
        log::trace!("Scanlines remaining: {}", config.image_height - y);
        for x in 0..config.image_width {
            let color = render_pixel(camera, world, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}
