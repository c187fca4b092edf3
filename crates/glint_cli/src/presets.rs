//! Built-in scenes.

use glint_renderer::{
    CameraSettings, Color, Dielectric, DiffuseModel, HittableList, Lambertian, Material, Metal,
    SceneResult, ShadingMode, Sphere, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// A world plus the camera and shading it is meant to be viewed with.
pub struct SceneSetup {
    pub world: HittableList,
    pub camera: CameraSettings,
    pub shading: ShadingMode,
}

/// Names of the built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// One sphere on a ground plane, colored by surface normal
    Normals,
    /// Diffuse, metal and glass spheres on a ground plane
    Materials,
    /// The materials scene through a wide-open lens
    Defocus,
    /// A field of small random spheres around three large ones
    Cover,
}

impl Preset {
    /// Build the scene. `seed` drives the random layout of the cover scene.
    pub fn build(self, seed: u64) -> SceneResult<SceneSetup> {
        match self {
            Preset::Normals => normals_scene(),
            Preset::Materials => Ok(SceneSetup {
                world: materials_world()?,
                camera: CameraSettings::new(),
                shading: ShadingMode::PathTraced,
            }),
            Preset::Defocus => defocus_scene(),
            Preset::Cover => cover_scene(seed),
        }
    }
}

fn sphere(center: Vec3, radius: f32, material: &Arc<dyn Material>) -> SceneResult<Box<Sphere>> {
    Ok(Box::new(Sphere::new(center, radius, material.clone())?))
}

fn normals_scene() -> SceneResult<SceneSetup> {
    let gray: Arc<dyn Material> = Arc::new(Lambertian::with_model(
        Color::splat(0.5),
        DiffuseModel::Simple,
    )?);

    let mut world = HittableList::new();
    world.add(sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, &gray)?);
    world.add(sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, &gray)?);

    Ok(SceneSetup {
        world,
        camera: CameraSettings::new(),
        shading: ShadingMode::Normals,
    })
}

fn materials_world() -> SceneResult<HittableList> {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0))?);
    let center: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5))?);
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5)?);
    // Air pocket inside the glass: a hollow shell
    let bubble: Arc<dyn Material> = Arc::new(Dielectric::new(1.0 / 1.5)?);
    let gold: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.0)?);

    let mut world = HittableList::new();
    world.add(sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, &ground)?);
    world.add(sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, &center)?);
    world.add(sphere(Vec3::new(-1.0, 0.0, -1.0), 0.5, &glass)?);
    world.add(sphere(Vec3::new(-1.0, 0.0, -1.0), 0.4, &bubble)?);
    world.add(sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, &gold)?);
    Ok(world)
}

fn defocus_scene() -> SceneResult<SceneSetup> {
    let look_from = Vec3::new(3.0, 3.0, 2.0);
    let look_at = Vec3::new(0.0, 0.0, -1.0);
    let focus_dist = (look_from - look_at).length();

    Ok(SceneSetup {
        world: materials_world()?,
        camera: CameraSettings::new()
            .with_position(look_from, look_at, Vec3::Y)
            .with_lens(20.0, 2.0, focus_dist),
        shading: ShadingMode::PathTraced,
    })
}

fn cover_scene(seed: u64) -> SceneResult<SceneSetup> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = HittableList::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5))?);
    world.add(sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, &ground)?);

    // One glass material serves every small glass sphere
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5)?);

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                let albedo = Color::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                Arc::new(Lambertian::new(albedo)?)
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                );
                Arc::new(Metal::new(albedo, rng.gen_range(0.0..0.5))?)
            } else {
                glass.clone()
            };
            world.add(sphere(center, 0.2, &material)?);
        }
    }

    let brown: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))?);
    let steel: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)?);
    world.add(sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, &glass)?);
    world.add(sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, &brown)?);
    world.add(sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, &steel)?);

    log::info!("Cover scene: {} spheres", world.len());

    Ok(SceneSetup {
        world,
        camera: CameraSettings::new()
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.1, 10.0)
            .with_aspect_ratio(3.0 / 2.0),
        shading: ShadingMode::PathTraced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_build() {
        for preset in [Preset::Normals, Preset::Materials, Preset::Defocus, Preset::Cover] {
            let setup = preset.build(0).unwrap();
            assert!(!setup.world.is_empty());
            assert!(setup.camera.build().is_ok());
        }
    }

    #[test]
    fn test_normals_preset_uses_normal_shading() {
        let setup = Preset::Normals.build(0).unwrap();
        assert_eq!(setup.shading, ShadingMode::Normals);
        assert_eq!(setup.world.len(), 2);
    }

    #[test]
    fn test_cover_layout_follows_seed() {
        let a = Preset::Cover.build(5).unwrap();
        let b = Preset::Cover.build(5).unwrap();
        assert_eq!(a.world.len(), b.world.len());
        assert!(a.world.len() > 300);
    }
}
