//! Scene attachment for fetched models
//!
//! A fetched GLB is parsed with the `gltf` crate into a [`SceneModel`], the
//! summary the rendering layer attaches to its scene graph. Parsed scenes are
//! kept in a [`SceneCache`], separate from the raw byte cache.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use parking_lot::RwLock;
use thiserror::Error;

use crate::catalog::AssetId;

/// Error type for scene parsing
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("GLB parse error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Model has no scene: {0}")]
    NoScene(AssetId),
}

/// Where every model sits in the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPlacement {
    /// Uniform scale applied to the model root
    pub scale: f32,
    /// Translation applied after scaling
    pub offset: Vec3,
}

impl Default for ModelPlacement {
    fn default() -> Self {
        // Tuned for a medium zoom with the default camera
        Self {
            scale: 9.0,
            offset: Vec3::new(0.0, -0.35, 0.0),
        }
    }
}

impl ModelPlacement {
    /// Model-to-world transform
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), Quat::IDENTITY, self.offset)
    }
}

/// A parsed model ready to attach to the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct SceneModel {
    pub id: AssetId,
    pub node_count: usize,
    pub mesh_count: usize,
    pub primitive_count: usize,
    pub material_count: usize,
    pub byte_len: usize,
    pub placement: ModelPlacement,
}

impl SceneModel {
    /// Parse GLB bytes
    pub fn from_glb(id: AssetId, data: &[u8]) -> Result<Self, SceneError> {
        let gltf = gltf::Gltf::from_slice(data)?;
        let document = &gltf.document;

        if document.scenes().len() == 0 {
            return Err(SceneError::NoScene(id));
        }

        let primitive_count = document.meshes().map(|mesh| mesh.primitives().len()).sum();

        log::debug!(
            "Parsed {}: {} nodes, {} meshes, {} bytes",
            id,
            document.nodes().len(),
            document.meshes().len(),
            data.len()
        );

        Ok(Self {
            node_count: document.nodes().len(),
            mesh_count: document.meshes().len(),
            primitive_count,
            material_count: document.materials().len(),
            byte_len: data.len(),
            placement: ModelPlacement::default(),
            id,
        })
    }
}

/// Parsed scenes keyed by canonical identifier
#[derive(Debug, Default)]
pub struct SceneCache {
    scenes: RwLock<HashMap<AssetId, Arc<SceneModel>>>,
}

impl SceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &AssetId) -> Option<Arc<SceneModel>> {
        self.scenes.read().get(id).cloned()
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.scenes.read().contains_key(id)
    }

    pub fn insert(&self, scene: SceneModel) -> Arc<SceneModel> {
        let scene = Arc::new(scene);
        self.scenes
            .write()
            .insert(scene.id.clone(), Arc::clone(&scene));
        scene
    }

    pub fn len(&self) -> usize {
        self.scenes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.read().is_empty()
    }

    pub fn clear(&self) {
        self.scenes.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::placeholder_glb;

    #[test]
    fn test_parse_placeholder_glb() {
        let id = AssetId::parse("/X_Egg.glb").unwrap();
        let glb = placeholder_glb();
        let scene = SceneModel::from_glb(id.clone(), &glb).unwrap();

        assert_eq!(scene.id, id);
        assert_eq!(scene.node_count, 1);
        assert_eq!(scene.mesh_count, 0);
        assert_eq!(scene.byte_len, glb.len());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let id = AssetId::parse("/broken.glb").unwrap();
        assert!(SceneModel::from_glb(id.clone(), &[]).is_err());
        assert!(SceneModel::from_glb(id, b"definitely not a model").is_err());
    }

    #[test]
    fn test_placement_transform() {
        let placement = ModelPlacement::default();
        let moved = placement.transform().transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!((moved - Vec3::new(0.0, 8.65, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_scene_cache_insert_and_get() {
        let cache = SceneCache::new();
        let id = AssetId::parse("/a.glb").unwrap();
        assert!(cache.is_empty());

        let scene = SceneModel::from_glb(id.clone(), &placeholder_glb()).unwrap();
        cache.insert(scene);
        assert!(cache.contains(&id));
        assert_eq!(cache.get(&id).map(|s| s.node_count), Some(1));

        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
