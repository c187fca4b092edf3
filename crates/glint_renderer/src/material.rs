//! Material trait for surface scattering.

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_hemisphere, random_in_unit_sphere, random_unit_vector};
use crate::sphere::{SceneError, SceneResult};
use glint_math::{Ray, Vec3, VectorExt};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter: where the light goes next and how much
/// of each channel survives the bounce.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub scattered: Ray,
    pub attenuation: Color,
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// Materials hold only their construction parameters. Every random decision
/// draws from the stream passed in by the caller.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Albedo must be finite and within [0, 1] so attenuation never adds energy.
fn check_albedo(albedo: Color) -> SceneResult<Color> {
    if albedo.is_finite() && albedo.min_element() >= 0.0 && albedo.max_element() <= 1.0 {
        Ok(albedo)
    } else {
        Err(SceneError::InvalidAlbedo(albedo))
    }
}

/// How a diffuse surface picks its bounce direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffuseModel {
    /// Normal plus a random point inside the unit ball.
    Simple,
    /// Normal plus a random point on the unit sphere (cosine-weighted).
    #[default]
    TrueLambertian,
    /// Random point inside the unit ball, flipped to the normal's side.
    Hemisphere,
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
    model: DiffuseModel,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> SceneResult<Self> {
        Self::with_model(albedo, DiffuseModel::default())
    }

    /// Create a diffuse material using a specific scattering formula.
    pub fn with_model(albedo: Color, model: DiffuseModel) -> SceneResult<Self> {
        Ok(Self {
            albedo: check_albedo(albedo)?,
            model,
        })
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn model(&self) -> DiffuseModel {
        self.model
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = match self.model {
            DiffuseModel::Simple => rec.normal + random_in_unit_sphere(rng),
            DiffuseModel::TrueLambertian => rec.normal + random_unit_vector(rng),
            DiffuseModel::Hemisphere => random_in_hemisphere(rng, rec.normal),
        };

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            scattered: Ray::new(rec.p, scatter_direction),
            attenuation: self.albedo,
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough. Clamped
    ///   to that range.
    pub fn new(albedo: Color, fuzz: f32) -> SceneResult<Self> {
        if fuzz.is_nan() {
            return Err(SceneError::InvalidFuzz(fuzz));
        }

        Ok(Self {
            albedo: check_albedo(albedo)?,
            fuzz: fuzz.clamp(0.0, 1.0),
        })
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = ray_in.direction().normalize().reflect(rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz can push the reflection below the surface; that light is absorbed
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                scattered: Ray::new(rec.p, scattered_dir),
                attenuation: self.albedo,
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> SceneResult<Self> {
        if !(ior.is_finite() && ior > 0.0) {
            return Err(SceneError::InvalidIor(ior));
        }
        Ok(Self { ior })
    }

    /// Schlick's approximation for reflectance
    pub fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                unit_direction.reflect(rec.normal)
            } else {
                unit_direction.refract(rec.normal, refraction_ratio)
            };

        Some(ScatterResult {
            scattered: Ray::new(rec.p, direction),
            attenuation: Color::ONE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Replays a fixed list of words, cycling when it runs out.
    struct SequenceRng {
        words: Vec<u32>,
        next: usize,
    }

    impl SequenceRng {
        fn new(words: Vec<u32>) -> Self {
            Self { words, next: 0 }
        }
    }

    impl RngCore for SequenceRng {
        fn next_u32(&mut self) -> u32 {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            word
        }

        fn next_u64(&mut self) -> u64 {
            (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(4) {
                let bytes = self.next_u32().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn front_hit<'a>(material: &'a dyn Material, ray: &Ray) -> HitRecord<'a> {
        // Flat surface at the origin facing +Y
        HitRecord::new(ray, 1.0, Vec3::Y, material)
    }

    #[test]
    fn test_lambertian_models_always_scatter_with_albedo() {
        let mut rng = StdRng::seed_from_u64(10);
        let albedo = Color::new(0.8, 0.3, 0.1);
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);

        for model in [
            DiffuseModel::Simple,
            DiffuseModel::TrueLambertian,
            DiffuseModel::Hemisphere,
        ] {
            let material = Lambertian::with_model(albedo, model).unwrap();
            let rec = front_hit(&material, &ray);
            for _ in 0..500 {
                let result = material.scatter(&ray, &rec, &mut rng).unwrap();
                assert_eq!(result.attenuation, albedo);
                assert_eq!(result.scattered.origin(), rec.p);
                assert!(!result.scattered.direction().near_zero());
            }
        }
    }

    #[test]
    fn test_lambertian_degenerate_direction_uses_normal() {
        // Floats 0.5, 0.25, 0.5 give the unit-ball point (0, -0.5, 0), which
        // normalizes to exactly -normal
        let mut rng = SequenceRng::new(vec![1 << 31, 1 << 30, 1 << 31]);
        let material = Lambertian::new(Color::ONE).unwrap();
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        let rec = front_hit(&material, &ray);

        assert_eq!(random_unit_vector(&mut rng), Vec3::NEG_Y);

        let result = material.scatter(&ray, &rec, &mut rng).unwrap();
        assert_eq!(result.scattered.direction(), Vec3::Y);
    }

    #[test]
    fn test_lambertian_scatters_above_surface() {
        let mut rng = StdRng::seed_from_u64(11);
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);

        for model in [DiffuseModel::TrueLambertian, DiffuseModel::Hemisphere] {
            let material = Lambertian::with_model(Color::ONE, model).unwrap();
            let rec = front_hit(&material, &ray);
            for _ in 0..500 {
                let result = material.scatter(&ray, &rec, &mut rng).unwrap();
                assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
            }
        }
    }

    #[test]
    fn test_lambertian_default_model() {
        let material = Lambertian::new(Color::ONE).unwrap();
        assert_eq!(material.model(), DiffuseModel::TrueLambertian);
        assert_eq!(material.albedo(), Color::ONE);
    }

    #[test]
    fn test_albedo_out_of_range_rejected() {
        assert_eq!(
            Lambertian::new(Color::splat(2.0)).err(),
            Some(SceneError::InvalidAlbedo(Color::splat(2.0)))
        );
        assert!(matches!(
            Lambertian::new(Color::new(0.5, -0.1, 0.5)),
            Err(SceneError::InvalidAlbedo(_))
        ));
        assert!(matches!(
            Metal::new(Color::new(f32::NAN, 0.5, 0.5), 0.0),
            Err(SceneError::InvalidAlbedo(_))
        ));
        assert!(Lambertian::new(Color::ZERO).is_ok());
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0).unwrap().fuzz(), 1.0);
        assert_eq!(Metal::new(Color::ONE, -0.5).unwrap().fuzz(), 0.0);
        assert_eq!(Metal::new(Color::ONE, 0.3).unwrap().fuzz(), 0.3);
        assert!(matches!(
            Metal::new(Color::ONE, f32::NAN),
            Err(SceneError::InvalidFuzz(_))
        ));
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mut rng = StdRng::seed_from_u64(12);
        let material = Metal::new(Color::new(0.7, 0.6, 0.5), 0.0).unwrap();
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let rec = front_hit(&material, &ray);

        let result = material.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();

        assert!((result.scattered.direction() - expected).length() < 1e-6);
        assert_eq!(result.attenuation, Color::new(0.7, 0.6, 0.5));
    }

    #[test]
    fn test_metal_absorbs_below_surface() {
        let mut rng = StdRng::seed_from_u64(13);
        let material = Metal::new(Color::ONE, 0.0).unwrap();

        // Grazing ray travelling along the surface reflects onto the surface itself
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        let rec = front_hit(&material, &ray);

        assert!(material.scatter(&ray, &rec, &mut rng).is_none());
    }

    #[test]
    fn test_metal_fuzzy_reflections_stay_above_surface() {
        let mut rng = StdRng::seed_from_u64(14);
        let material = Metal::new(Color::ONE, 1.0).unwrap();
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let rec = front_hit(&material, &ray);

        for _ in 0..500 {
            if let Some(result) = material.scatter(&ray, &rec, &mut rng) {
                assert!(result.scattered.direction().dot(rec.normal) > 0.0);
            }
        }
    }

    #[test]
    fn test_invalid_ior_rejected() {
        assert_eq!(
            Dielectric::new(0.0).err(),
            Some(SceneError::InvalidIor(0.0))
        );
        assert!(matches!(Dielectric::new(-1.5), Err(SceneError::InvalidIor(_))));
        assert!(matches!(
            Dielectric::new(f32::INFINITY),
            Err(SceneError::InvalidIor(_))
        ));
        assert!(Dielectric::new(1.0 / 1.5).is_ok());
    }

    #[test]
    fn test_dielectric_ior_one_passes_straight_through() {
        let mut rng = StdRng::seed_from_u64(15);
        let material = Dielectric::new(1.0).unwrap();
        let direction = Vec3::new(0.3, -1.0, 0.2);
        let ray = Ray::new(Vec3::new(-0.3, 1.0, -0.2), direction);
        let rec = front_hit(&material, &ray);

        for _ in 0..100 {
            let result = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert!((result.scattered.direction() - direction.normalize()).length() < 1e-5);
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_reflectance_normal_incidence() {
        assert!(Dielectric::reflectance(1.0, 1.0).abs() < 1e-6);

        // Glass reflects about 4% head on, and everything at grazing angles
        assert!((Dielectric::reflectance(1.0, 1.5) - 0.04).abs() < 1e-4);
        assert!((Dielectric::reflectance(0.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reflectance_symmetric_in_ratio() {
        let a = Dielectric::reflectance(0.6, 1.5);
        let b = Dielectric::reflectance(0.6, 1.0 / 1.5);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mut rng = StdRng::seed_from_u64(16);
        let material = Dielectric::new(1.5).unwrap();

        // Leaving glass at a shallow angle: back face hit, ratio 1.5
        let direction = Vec3::new(1.0, 0.3, 0.0).normalize();
        let ray = Ray::new(Vec3::new(-1.0, -0.3, 0.0), direction);
        let rec = HitRecord::new(&ray, 1.0, Vec3::Y, &material);
        assert!(!rec.front_face);

        for _ in 0..100 {
            let result = material.scatter(&ray, &rec, &mut rng).unwrap();
            let expected = direction.reflect(rec.normal);
            assert!((result.scattered.direction() - expected).length() < 1e-5);
        }
    }
}
