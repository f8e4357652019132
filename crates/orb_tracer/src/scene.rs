//! Scene ownership and scene files.
//!
//! [`World`] keeps the editable sphere and material records together with
//! the [`SphereBatch`] built from them. [`SceneDescription`] is the JSON form
//! a scene is loaded from.

use std::path::Path;

use crate::batch::{BatchError, SphereBatch};
use crate::camera::{Camera, CameraDescription};
use crate::renderer::RenderConfig;
use crate::{Color, Hit, Material, Sphere};
use orb_math::{Interval, Ray, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sphere batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Invalid scene: {0}")]
    Invalid(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Spheres, their materials and the intersection batch built from them.
#[derive(Debug, Clone)]
pub struct World {
    spheres: Vec<Sphere>,
    materials: Vec<Material>,
    batch: SphereBatch,
}

impl World {
    /// Create a world whose batch holds exactly these spheres.
    pub fn new(spheres: Vec<Sphere>, materials: Vec<Material>) -> Result<Self, BatchError> {
        let capacity = spheres.len();
        Self::with_capacity(capacity, spheres, materials)
    }

    /// Create a world whose batch is allocated for up to `capacity` spheres.
    pub fn with_capacity(
        capacity: usize,
        spheres: Vec<Sphere>,
        materials: Vec<Material>,
    ) -> Result<Self, BatchError> {
        let mut world = Self {
            spheres,
            materials,
            batch: SphereBatch::new(capacity),
        };
        world.rebuild()?;
        Ok(world)
    }

    /// Refresh the batch after editing spheres or materials.
    pub fn rebuild(&mut self) -> Result<(), BatchError> {
        self.batch.update(&self.spheres, &self.materials)?;
        log::debug!(
            "Rebuilt sphere batch: {} spheres, {} emissive",
            self.batch.len(),
            self.batch.emissive_count()
        );
        Ok(())
    }

    /// Closest hit along `ray`; see [`SphereBatch::hit_spheres`].
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval, hit: &mut Hit) -> Option<usize> {
        self.batch.hit_spheres(ray, ray_t, hit)
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Mutable access to the spheres. Call [`World::rebuild`] afterwards.
    pub fn spheres_mut(&mut self) -> &mut [Sphere] {
        &mut self.spheres
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Mutable access to the materials. Call [`World::rebuild`] afterwards.
    pub fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }

    #[inline]
    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    pub fn batch(&self) -> &SphereBatch {
        &self.batch
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

/// One sphere entry in a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

/// A complete scene: camera, render settings and objects.
///
/// Missing sections fall back to their defaults; a scene without objects
/// is valid and renders only the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraDescription,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl SceneDescription {
    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scene = Self::from_json(&text)?;
        log::info!("Loaded {} objects from {}", scene.objects.len(), path.display());
        Ok(scene)
    }

    /// Parse and validate a scene from a JSON string.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        let scene: Self = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> SceneResult<()> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(SceneError::Invalid(format!(
                "image size {}x{} is empty",
                render.width, render.height
            )));
        }
        if render.samples_per_pixel == 0 {
            return Err(SceneError::Invalid("samples_per_pixel must be at least 1".into()));
        }
        let camera = &self.camera;
        let view = camera.look_from - camera.look_at;
        if view.length_squared() == 0.0 {
            return Err(SceneError::Invalid(format!(
                "camera look_from and look_at are both {}",
                camera.look_from
            )));
        }
        if camera.vup.cross(view.normalize()).length_squared() < 1e-8 {
            return Err(SceneError::Invalid(format!(
                "camera vup {} is parallel to the view direction",
                camera.vup
            )));
        }
        if let Some((i, object)) = self
            .objects
            .iter()
            .enumerate()
            .find(|(_, o)| !(o.radius > 0.0))
        {
            return Err(SceneError::Invalid(format!(
                "object {i} has non-positive radius {}",
                object.radius
            )));
        }
        Ok(())
    }

    /// Build the world for this scene.
    pub fn build_world(&self) -> SceneResult<World> {
        let spheres = self
            .objects
            .iter()
            .map(|o| Sphere::new(o.center, o.radius))
            .collect();
        let materials = self.objects.iter().map(|o| o.material).collect();
        let world = World::new(spheres, materials)?;
        if world.batch().emissive_count() == 0 && !self.render.use_sky_gradient && self.render.background == Color::ZERO {
            log::warn!("Scene has no lights and a black background; the image will be black");
        }
        Ok(world)
    }

    /// Build the camera for this scene's image aspect.
    pub fn build_camera(&self) -> Camera {
        self.camera.build(self.render.aspect())
    }

    /// The built-in demo scene.
    ///
    /// A large ground sphere, rows of diffuse and metal spheres, a glass
    /// sphere and one small light.
    pub fn default_scene() -> Self {
        let object = |center: Vec3, radius: f32, material: Material| SceneObject {
            center,
            radius,
            material,
        };

        let objects = vec![
            object(
                Vec3::new(0.0, -100.5, -1.0),
                100.0,
                Material::lambertian(Color::new(0.8, 0.8, 0.8)),
            ),
            object(Vec3::new(2.0, 0.0, -1.0), 0.5, Material::lambertian(Color::new(0.8, 0.4, 0.4))),
            object(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::lambertian(Color::new(0.4, 0.8, 0.4))),
            object(Vec3::new(-2.0, 0.0, -1.0), 0.5, Material::metal(Color::new(0.4, 0.4, 0.8), 0.0)),
            object(Vec3::new(2.0, 0.0, 1.0), 0.5, Material::metal(Color::new(0.4, 0.8, 0.4), 0.0)),
            object(Vec3::new(0.0, 0.0, 1.0), 0.5, Material::metal(Color::new(0.4, 0.8, 0.4), 0.2)),
            object(Vec3::new(-2.0, 0.0, 1.0), 0.5, Material::metal(Color::new(0.4, 0.8, 0.4), 0.6)),
            object(Vec3::new(0.5, 1.0, 0.5), 0.5, Material::dielectric(1.5)),
            object(
                Vec3::new(-1.5, 1.5, 0.0),
                0.3,
                Material::light(Color::new(0.8, 0.6, 0.2), Color::new(30.0, 25.0, 15.0)),
            ),
        ];

        Self {
            camera: CameraDescription {
                look_from: Vec3::new(0.0, 2.0, 3.0),
                look_at: Vec3::ZERO,
                vup: Vec3::Y,
                vfov: 60.0,
                aperture: 0.1,
                focus_dist: Some(3.0),
            },
            render: RenderConfig::default(),
            objects,
        }
    }
}
