//! Glint Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for scenes made of spheres with diffuse,
//! metal and glass materials.
//!
//! The pieces fit together like this: a [`Camera`] turns normalized image
//! coordinates into rays, a [`HittableList`] answers closest-hit queries, the
//! hit's [`Material`] decides whether and where light continues, and
//! [`ray_color`] iterates that chain up to the bounce limit.
//!
//! Randomness is never global. Every function that samples takes an explicit
//! `&mut dyn RngCore`, so a seeded stream reproduces an image bit for bit.

mod bucket;
mod camera;
mod hittable;
mod material;
mod output;
mod renderer;
mod sampling;
mod sphere;

pub use bucket::{
    generate_buckets, render_bucket, render_buckets, Bucket, BucketResult, CancelToken,
    DEFAULT_BUCKET_SIZE,
};
pub use camera::{Camera, CameraError, CameraResult, CameraSettings};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, DiffuseModel, Lambertian, Material, Metal, ScatterResult};
pub use output::{color_to_rgb8, save_image, write_ppm, OutputError, OutputResult};
pub use renderer::{
    linear_to_gamma, normal_color, ray_color, render, render_pixel, sample_color, ConfigError,
    ImageBuffer, RenderConfig, RenderError, RenderResult, ShadingMode, SkyGradient,
    SHADOW_ACNE_EPSILON,
};
pub use sampling::{
    gen_f32, gen_range_f32, random_in_hemisphere, random_in_unit_disk, random_in_unit_sphere,
    random_unit_vector,
};
pub use sphere::{SceneError, SceneResult, Sphere};

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Interval, Ray, Vec3, VectorExt};
