use std::path::PathBuf;

use crate::camera::{Camera, Projection};

/// Everything the demo application can be told from the outside.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory textures are resolved against.
    pub assets_dir: PathBuf,
    /// Texture file inside `assets_dir`.
    pub texture_file: String,
    pub clear_colour: wgpu::Color,
    pub camera_position: [f32; 3],
    pub camera_yaw_degrees: f32,
    pub camera_pitch_degrees: f32,
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl SceneConfig {
    pub const ASSETS_ENV: &'static str = "DESK_SCENE_ASSETS";
    pub const TEXTURE_ENV: &'static str = "DESK_SCENE_TEXTURE";

    /// Defaults with `DESK_SCENE_ASSETS` and `DESK_SCENE_TEXTURE` applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(Self::ASSETS_ENV).filter(|v| !v.is_empty()) {
            self.assets_dir = dir.into();
        }
        if let Some(file) = lookup(Self::TEXTURE_ENV).filter(|v| !v.is_empty()) {
            self.texture_file = file;
        }
        self
    }

    pub fn texture_path(&self) -> PathBuf {
        crate::resources::asset_path(&self.assets_dir, &self.texture_file)
    }

    pub fn camera(&self) -> Camera {
        Camera::new(
            self.camera_position,
            cgmath::Deg(self.camera_yaw_degrees),
            cgmath::Deg(self.camera_pitch_degrees),
        )
    }

    pub fn projection(&self, width: u32, height: u32) -> Projection {
        Projection::new(width, height, cgmath::Deg(self.fovy_degrees), self.znear, self.zfar)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "Desk Scene".to_string(),
            width: 1280,
            height: 720,
            assets_dir: PathBuf::from("./assets"),
            texture_file: "textures/metal.jpeg".to_string(),
            clear_colour: wgpu::Color {
                r: 0.55,
                g: 0.6,
                b: 0.65,
                a: 1.0,
            },
            // in front of the desk, slightly above the monitor, looking down at it
            camera_position: [0.0, 4.5, 7.0],
            camera_yaw_degrees: -90.0,
            camera_pitch_degrees: -20.0,
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}
