//! JSON scene descriptions.
//!
//! A scene file names its materials once and lets any number of spheres
//! refer to them:
//!
//! ```json
//! {
//!   "camera": { "look_from": [13, 2, 3], "look_at": [0, 0, 0], "vfov": 20,
//!               "aperture": 0.1, "focus_distance": 10, "aspect_ratio": 1.5 },
//!   "materials": {
//!     "ground": { "type": "lambertian", "albedo": [0.5, 0.5, 0.5] },
//!     "glass":  { "type": "dielectric", "ior": 1.5 }
//!   },
//!   "spheres": [
//!     { "center": [0, -1000, 0], "radius": 1000, "material": "ground" },
//!     { "center": [0, 1, 0], "radius": 1, "material": "glass" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use glint_renderer::{
    CameraError, CameraSettings, Color, Dielectric, DiffuseModel, HittableList, Lambertian,
    Material, Metal, SceneError, SceneResult, ShadingMode, Sphere, Vec3,
};
use serde::Deserialize;
use thiserror::Error;

use crate::presets::SceneSetup;

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Sphere {index} refers to unknown material '{name}'")]
    UnknownMaterial { index: usize, name: String },

    #[error("Material '{name}' is invalid: {source}")]
    InvalidMaterial { name: String, source: SceneError },

    #[error("Sphere {index} is invalid: {source}")]
    InvalidSphere { index: usize, source: SceneError },

    #[error("Camera is invalid: {0}")]
    Camera(#[from] CameraError),
}

pub type SceneFileResult<T> = Result<T, SceneFileError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDesc {
    #[serde(default)]
    camera: CameraDesc,
    #[serde(default)]
    materials: BTreeMap<String, MaterialDesc>,
    #[serde(default)]
    spheres: Vec<SphereDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CameraDesc {
    look_from: [f32; 3],
    look_at: [f32; 3],
    up: [f32; 3],
    vfov: f32,
    aspect_ratio: f32,
    aperture: f32,
    /// Defaults to the distance between look_from and look_at
    focus_distance: Option<f32>,
}

impl Default for CameraDesc {
    fn default() -> Self {
        let settings = CameraSettings::new();
        Self {
            look_from: settings.look_from.to_array(),
            look_at: settings.look_at.to_array(),
            up: settings.vup.to_array(),
            vfov: settings.vfov,
            aspect_ratio: settings.aspect_ratio,
            aperture: settings.aperture,
            focus_distance: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MaterialDesc {
    Lambertian {
        albedo: [f32; 3],
        #[serde(default)]
        model: ModelDesc,
    },
    Metal {
        albedo: [f32; 3],
        #[serde(default)]
        fuzz: f32,
    },
    Dielectric {
        ior: f32,
    },
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModelDesc {
    Simple,
    #[default]
    Lambertian,
    Hemisphere,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SphereDesc {
    center: [f32; 3],
    radius: f32,
    material: String,
}

impl From<ModelDesc> for DiffuseModel {
    fn from(model: ModelDesc) -> Self {
        match model {
            ModelDesc::Simple => DiffuseModel::Simple,
            ModelDesc::Lambertian => DiffuseModel::TrueLambertian,
            ModelDesc::Hemisphere => DiffuseModel::Hemisphere,
        }
    }
}

impl MaterialDesc {
    fn build(&self) -> SceneResult<Arc<dyn Material>> {
        let material: Arc<dyn Material> = match *self {
            MaterialDesc::Lambertian { albedo, model } => Arc::new(Lambertian::with_model(
                Color::from_array(albedo),
                model.into(),
            )?),
            MaterialDesc::Metal { albedo, fuzz } => {
                Arc::new(Metal::new(Color::from_array(albedo), fuzz)?)
            }
            MaterialDesc::Dielectric { ior } => Arc::new(Dielectric::new(ior)?),
        };
        Ok(material)
    }
}

impl CameraDesc {
    fn settings(&self) -> CameraSettings {
        let look_from = Vec3::from_array(self.look_from);
        let look_at = Vec3::from_array(self.look_at);
        let focus_dist = self
            .focus_distance
            .unwrap_or_else(|| (look_from - look_at).length());

        CameraSettings::new()
            .with_position(look_from, look_at, Vec3::from_array(self.up))
            .with_lens(self.vfov, self.aperture, focus_dist)
            .with_aspect_ratio(self.aspect_ratio)
    }
}

/// Parse a scene from JSON text.
pub fn parse_scene(text: &str) -> SceneFileResult<SceneSetup> {
    let desc: SceneDesc = serde_json::from_str(text)?;

    let mut materials = BTreeMap::new();
    for (name, material) in &desc.materials {
        let material = material
            .build()
            .map_err(|source| SceneFileError::InvalidMaterial {
                name: name.clone(),
                source,
            })?;
        materials.insert(name.as_str(), material);
    }

    let mut world = HittableList::new();
    for (index, sphere) in desc.spheres.iter().enumerate() {
        let material = materials.get(sphere.material.as_str()).ok_or_else(|| {
            SceneFileError::UnknownMaterial {
                index,
                name: sphere.material.clone(),
            }
        })?;
        let sphere = Sphere::new(Vec3::from_array(sphere.center), sphere.radius, material.clone())
            .map_err(|source| SceneFileError::InvalidSphere { index, source })?;
        world.add(Box::new(sphere));
    }

    let camera = desc.camera.settings();
    // Fail on a bad camera now rather than at render time
    camera.build()?;

    log::info!(
        "Loaded scene: {} materials, {} spheres",
        materials.len(),
        world.len()
    );

    Ok(SceneSetup {
        world,
        camera,
        shading: ShadingMode::PathTraced,
    })
}

/// Load a scene from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneFileResult<SceneSetup> {
    let path = path.as_ref();
    log::info!("Loading scene file: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_scene(&text)
}
